//! Format-agnostic builders
//!
//! Class builders describe types to generate; object builders describe
//! instances to materialize. Both are rendered by the implementations in
//! [`crate::renderers`].

pub mod class_builder;
pub mod object_builder;

pub use class_builder::{
    BuilderId, ClassBuilder, ClassBuilders, ClassTarget, Validation, ValidationSetId,
};
pub use object_builder::{ObjectBuilder, ObjectGraph, ObjectId};
