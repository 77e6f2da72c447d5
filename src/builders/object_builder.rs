//! Object builders
//!
//! An [`ObjectBuilder`] describes one element of an instance document:
//! its tag, text, attributes and children. The builders of a document form
//! an [`ObjectGraph`]; rendering the graph fills every builder's `obj`
//! slot, children before parents.

use std::fmt;

use indexmap::IndexMap;

use crate::documents::{Document, SourceElement};
use crate::error::{Error, Result};
use crate::renderers::ObjectRenderer;
use crate::schema::Schema;

/// Handle of an object builder in an [`ObjectGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ob{}", self.0)
    }
}

/// Descriptor of one instance to materialize
#[derive(Debug, Clone)]
pub struct ObjectBuilder<T> {
    /// Local tag name of the element
    pub tag_name: String,
    /// Text content, for text-bearing leaf elements
    pub content: Option<String>,
    /// Rendered object, once the graph has been built
    pub obj: Option<T>,
    /// Attribute values by local name, in document order
    pub attributes: IndexMap<String, String>,
    /// Child builders in document order
    pub children: Vec<ObjectId>,
    /// Enclosing builder
    pub parent: Option<ObjectId>,
}

/// Object builders of one instance document
#[derive(Debug, Clone)]
pub struct ObjectGraph<T> {
    objects: Vec<ObjectBuilder<T>>,
    root: Option<ObjectId>,
}

impl<T> Default for ObjectGraph<T> {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            root: None,
        }
    }
}

impl<T> ObjectGraph<T> {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for an instance document, checking every element
    /// against the schema's element declarations
    pub fn from_instance(doc: &Document, schema: &Schema) -> Result<Self> {
        let root = doc
            .root()
            .ok_or_else(|| Error::Value("instance document has no root element".to_string()))?;

        check_declarations(root, schema)?;
        let mut graph = Self::new();
        graph.add_source(root, None);
        tracing::debug!(objects = graph.len(), "object graph built");
        Ok(graph)
    }

    /// Build the graph for any element tree, without schema checks
    pub fn from_source(root: SourceElement<'_>) -> Self {
        let mut graph = Self::new();
        graph.add_source(root, None);
        graph
    }

    fn add_source(&mut self, src: SourceElement<'_>, parent: Option<ObjectId>) -> ObjectId {
        let id = self.add(parent, src.name());
        {
            let object = self.get_mut(id);
            object.attributes = src
                .attributes()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            if !src.has_elements() {
                object.content = src.text().map(str::to_string);
            }
        }

        for child in src.elements() {
            self.add_source(child, Some(id));
        }
        id
    }

    /// Add a builder under `parent` (or as the root)
    pub fn add(&mut self, parent: Option<ObjectId>, tag_name: impl Into<String>) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(ObjectBuilder {
            tag_name: tag_name.into(),
            content: None,
            obj: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
            parent,
        });
        match parent {
            Some(parent) => self.objects[parent.0].children.push(id),
            None => {
                if self.root.is_none() {
                    self.root = Some(id);
                }
            }
        }
        id
    }

    /// Root builder
    pub fn root(&self) -> Option<ObjectId> {
        self.root
    }

    /// Get a builder
    pub fn get(&self, id: ObjectId) -> &ObjectBuilder<T> {
        &self.objects[id.0]
    }

    /// Get a builder mutably
    pub fn get_mut(&mut self, id: ObjectId) -> &mut ObjectBuilder<T> {
        &mut self.objects[id.0]
    }

    /// Number of builders
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Builders ordered children-first, from the root
    pub fn post_order(&self) -> Vec<ObjectId> {
        let mut order = Vec::with_capacity(self.objects.len());
        let Some(root) = self.root else {
            return order;
        };

        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            for &child in self.get(id).children.iter().rev() {
                stack.push((child, false));
            }
        }
        order
    }
}

impl<T: Clone> ObjectGraph<T> {
    /// Render every builder, children first, and return the root's object
    pub fn build<R>(&mut self, renderer: &R, schema: &Schema) -> Result<Option<T>>
    where
        R: ObjectRenderer<Output = T>,
    {
        for id in self.post_order() {
            let obj = renderer.render(self, id, schema)?;
            self.get_mut(id).obj = Some(obj);
        }
        Ok(self.root.and_then(|root| self.get(root).obj.clone()))
    }
}

/// Every element of the tree must have a declaration in the schema
fn check_declarations(src: SourceElement<'_>, schema: &Schema) -> Result<()> {
    if schema.element_declaration(src.name()).is_none() {
        return Err(Error::UndeclaredElement(src.name().to_string()));
    }
    src.elements().try_for_each(|child| check_declarations(child, schema))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_source_structure() {
        let doc = Document::from_string(
            r#"<order id="7"><item sku="a">first</item><item sku="b"/><note>hi</note></order>"#,
        )
        .unwrap();
        let graph: ObjectGraph<()> = ObjectGraph::from_source(doc.root().unwrap());

        let root = graph.root().unwrap();
        let order = graph.get(root);
        assert_eq!(order.tag_name, "order");
        assert_eq!(order.attributes.get("id").map(String::as_str), Some("7"));
        assert_eq!(order.content, None);
        assert_eq!(order.children.len(), 3);

        let first = graph.get(order.children[0]);
        assert_eq!(first.tag_name, "item");
        assert_eq!(first.content.as_deref(), Some("first"));
        assert_eq!(first.parent, Some(root));
    }

    #[test]
    fn test_nested_undeclared_element_fails() {
        let schema = Schema::from_str(
            r#"<schema><element name="order"><complexType><sequence>
                <element name="item" type="string" maxOccurs="unbounded"/>
            </sequence></complexType></element></schema>"#,
        )
        .unwrap();

        let valid = Document::from_string("<order><item>a</item><item>b</item></order>").unwrap();
        let graph: ObjectGraph<()> = ObjectGraph::from_instance(&valid, &schema).unwrap();
        assert_eq!(graph.len(), 3);

        let invalid = Document::from_string("<order><item>a</item><item><gift/></item></order>")
            .unwrap();
        let err = ObjectGraph::<()>::from_instance(&invalid, &schema).unwrap_err();
        assert!(matches!(err, Error::UndeclaredElement(ref tag) if tag == "gift"));
    }

    #[test]
    fn test_post_order_visits_children_first() {
        let mut graph: ObjectGraph<()> = ObjectGraph::new();
        let a = graph.add(None, "a");
        let b = graph.add(Some(a), "b");
        let c = graph.add(Some(b), "c");
        let d = graph.add(Some(a), "d");

        assert_eq!(graph.post_order(), vec![c, b, d, a]);
    }

    #[test]
    fn test_empty_graph() {
        let graph: ObjectGraph<()> = ObjectGraph::new();
        assert!(graph.is_empty());
        assert!(graph.post_order().is_empty());
    }
}
