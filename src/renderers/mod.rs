//! Renderers
//!
//! A renderer turns builders into a target representation. Class renderers
//! work on one [`ClassBuilder`](crate::builders::ClassBuilder) at a time and
//! may decline; object renderers are driven children-first by
//! [`ObjectGraph::build`] and can read the objects already rendered for the
//! children.

pub mod definition;
pub mod instance;

pub use definition::{
    Accessor, Check, ClassDefinition, DefinitionRenderer, DefinitionSet, RenderConfig,
};
pub use instance::{Instance, InstanceRenderer};

use crate::builders::{BuilderId, ClassBuilders, ObjectGraph, ObjectId};
use crate::error::Result;
use crate::schema::Schema;

/// Renders class builders
pub trait ClassRenderer {
    /// Rendered representation
    type Output;

    /// Render one builder; `None` when it is not renderable
    ///
    /// Rendering has no side effects besides logging.
    fn render(&self, builders: &ClassBuilders, id: BuilderId) -> Option<Self::Output>;
}

/// Renders object builders
pub trait ObjectRenderer {
    /// Rendered object, stored in each builder's `obj` slot
    type Output: Clone;

    /// Render one builder whose children are already rendered
    fn render(
        &self,
        objects: &ObjectGraph<Self::Output>,
        id: ObjectId,
        schema: &Schema,
    ) -> Result<Self::Output>;
}
