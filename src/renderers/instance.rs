//! Instance renderer
//!
//! Materializes object builders as dynamic [`Instance`] values: the class
//! name the element's declaration maps to, its text and attributes, and
//! the already rendered children grouped by field name.

use std::rc::Rc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::builders::{ObjectGraph, ObjectId};
use crate::error::{Error, Result};
use crate::names::field_name;
use crate::schema::Schema;

use super::ObjectRenderer;

/// A live object built from an instance element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instance {
    /// Class the element renders as
    pub class_name: String,
    /// Local tag name of the element
    pub tag_name: String,
    /// Text content of leaf elements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Attribute values by local name
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    /// Child objects by field name, in document order
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, Vec<Rc<Instance>>>,
}

impl Instance {
    /// Create an empty instance
    pub fn new(class_name: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            tag_name: tag_name.into(),
            content: None,
            attributes: IndexMap::new(),
            fields: IndexMap::new(),
        }
    }

    /// Text content, empty when there is none
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    /// Attribute value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// First value of a field
    pub fn field(&self, name: &str) -> Option<&Instance> {
        self.field_all(name).first().map(|value| value.as_ref())
    }

    /// All values of a field
    pub fn field_all(&self, name: &str) -> &[Rc<Instance>] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check whether a field has at least one value
    pub fn has_field(&self, name: &str) -> bool {
        !self.field_all(name).is_empty()
    }

    /// Append a value to a field
    pub fn push_field(&mut self, name: impl Into<String>, value: impl Into<Rc<Instance>>) {
        self.fields.entry(name.into()).or_default().push(value.into());
    }
}

/// Renders object builders into [`Instance`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceRenderer;

impl InstanceRenderer {
    /// Create a renderer
    pub fn new() -> Self {
        Self
    }
}

impl ObjectRenderer for InstanceRenderer {
    type Output = Rc<Instance>;

    fn render(
        &self,
        objects: &ObjectGraph<Rc<Instance>>,
        id: ObjectId,
        schema: &Schema,
    ) -> Result<Rc<Instance>> {
        let object = objects.get(id);
        let mut instance = Instance::new(
            schema.class_name_for_element(&object.tag_name)?,
            object.tag_name.clone(),
        );
        instance.content = object.content.clone();
        instance.attributes = object.attributes.clone();

        for &child in &object.children {
            let child = objects.get(child);
            let value = child.obj.clone().ok_or_else(|| {
                Error::Value(format!(
                    "<{}> rendered before its child <{}>",
                    object.tag_name, child.tag_name
                ))
            })?;
            instance.push_field(field_name(&child.tag_name), value);
        }

        tracing::trace!(
            class = %instance.class_name,
            tag = %instance.tag_name,
            "instance rendered"
        );
        Ok(Rc::new(instance))
    }
}
