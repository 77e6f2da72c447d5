//! # xsd-classgen
//!
//! Resolve XML Schema (XSD) type grammars into linked builder graphs and
//! render them into class definitions or live objects.
//!
//! ## Pipeline
//!
//! - **Parse**: the schema document becomes a flat arena of typed nodes
//!   (elements, complex and simple types, restrictions, groups ...).
//! - **Resolve**: type names and `ref`s are linked to built-ins or to the
//!   declaring nodes; forward and recursive references resolve like any other.
//! - **Derive**: every node yields a format-agnostic class builder, lazily
//!   and memoized, so recursive types terminate.
//! - **Render**: a [`ClassRenderer`] turns builders into a target
//!   representation; an [`ObjectRenderer`] does the same for the object
//!   builders of an instance document.
//!
//! ## Example
//!
//! ```rust,ignore
//! use xsd_classgen::{
//!     DefinitionRenderer, DefinitionSet, Document, InstanceRenderer, ObjectGraph, Schema,
//! };
//!
//! let mut schema = Schema::from_file("library.xsd")?;
//! let definitions: DefinitionSet = schema
//!     .render_classes(&DefinitionRenderer::default())
//!     .into_iter()
//!     .collect();
//!
//! let doc = Document::from_file("library.xml")?;
//! let mut objects = ObjectGraph::from_instance(&doc, &schema)?;
//! if let Some(library) = objects.build(&InstanceRenderer, &schema)? {
//!     assert!(definitions.is_valid(&library));
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod limits;

pub mod builtins;
pub mod documents;
pub mod names;

pub mod builders;
pub mod renderers;
pub mod schema;

pub use builders::{
    BuilderId, ClassBuilder, ClassBuilders, ClassTarget, ObjectBuilder, ObjectGraph, ObjectId,
    Validation,
};
pub use builtins::{is_builtin, resolve_builtin, BuiltinType};
pub use documents::{Document, SourceElement};
pub use error::{Error, ParseError, Result};
pub use limits::Limits;
pub use renderers::{
    Check, ClassDefinition, ClassRenderer, DefinitionRenderer, DefinitionSet, Instance,
    InstanceRenderer, ObjectRenderer, RenderConfig,
};
pub use schema::{Kind, NodeId, Schema};

/// Version of the xsd-classgen library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD namespace
pub const XSD_NAMESPACE: &str = builtins::XSD_NAMESPACE;
