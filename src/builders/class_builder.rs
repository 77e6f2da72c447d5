//! Class builders
//!
//! A [`ClassBuilder`] describes the shape of a type to generate: its
//! supertype, the type it wraps, its fields and its validation rules.
//! Builders reference each other freely (including cycles for recursive
//! schemas), so they live in a [`ClassBuilders`] arena and are addressed by
//! [`BuilderId`]; the id is the builder's identity.
//!
//! Validation rules are stored in separate bags that builders point at.
//! Cloning a builder shares its bag; [`ClassBuilders::replace_validations`]
//! gives a builder a bag of its own.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexSet;
use serde::Serialize;

use crate::builtins::BuiltinType;
use crate::names::field_name;

/// Handle of a builder in a [`ClassBuilders`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuilderId(pub(crate) usize);

impl fmt::Display for BuilderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cb{}", self.0)
    }
}

/// Handle of a validation bag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValidationSetId(usize);

/// A validation rule derived from a facet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "param", rename_all = "snake_case")]
pub enum Validation {
    /// Value must be greater than the parameter
    MinExclusive(i64),
    /// Value must be greater than or equal to the parameter
    MinInclusive(i64),
    /// Value must be less than the parameter
    MaxExclusive(i64),
    /// Value must be less than or equal to the parameter
    MaxInclusive(i64),
    /// Maximum number of digits
    TotalDigits(i64),
    /// Exact number of fraction digits
    FractionDigits(i64),
    /// Exact length
    Length(i64),
    /// Minimum length
    MinLength(i64),
    /// Maximum length
    MaxLength(i64),
    /// Allowed values
    Enumerations(Vec<String>),
    /// White space handling
    Whitespace(String),
    /// Regular expression
    Pattern(String),
    /// Exactly one of the named fields must be present
    Choice(Vec<String>),
}

impl Validation {
    /// Rule kind tag, named after the facet it came from
    pub fn kind(&self) -> &'static str {
        match self {
            Validation::MinExclusive(_) => "min_exclusive",
            Validation::MinInclusive(_) => "min_inclusive",
            Validation::MaxExclusive(_) => "max_exclusive",
            Validation::MaxInclusive(_) => "max_inclusive",
            Validation::TotalDigits(_) => "total_digits",
            Validation::FractionDigits(_) => "fraction_digits",
            Validation::Length(_) => "length",
            Validation::MinLength(_) => "min_length",
            Validation::MaxLength(_) => "max_length",
            Validation::Enumerations(_) => "enumerations",
            Validation::Whitespace(_) => "whitespace",
            Validation::Pattern(_) => "pattern",
            Validation::Choice(_) => "choice",
        }
    }
}

/// What a builder's target class is, when it is not a generated class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassTarget {
    /// A built-in type
    Builtin(BuiltinType),
    /// A list of the associated builder's type
    List,
}

/// Shape of a type to generate
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    /// Target class marker
    pub klass: Option<ClassTarget>,
    /// Name of the class to generate
    pub klass_name: Option<String>,
    /// Builder of the wrapped type (list items)
    pub associated_builder: Option<BuilderId>,
    /// Builder of the supertype
    pub base_builder: Option<BuilderId>,
    /// Builders of the fields, in declaration order
    pub attribute_builders: Vec<BuilderId>,
    /// Field name when this builder is used as a field
    pub attribute_name: Option<String>,
    validations: ValidationSetId,
}

impl ClassBuilder {
    /// Built-in type this builder targets, if any
    pub fn builtin(&self) -> Option<BuiltinType> {
        match self.klass {
            Some(ClassTarget::Builtin(b)) => Some(b),
            _ => None,
        }
    }

    /// Check whether this builder is a list wrapper
    pub fn is_list(&self) -> bool {
        self.klass == Some(ClassTarget::List)
    }

    /// Bag holding this builder's validations
    pub fn validation_set(&self) -> ValidationSetId {
        self.validations
    }
}

/// Arena of class builders and their validation bags
#[derive(Debug, Clone, Default)]
pub struct ClassBuilders {
    builders: Vec<ClassBuilder>,
    validation_sets: Vec<Vec<Validation>>,
}

impl ClassBuilders {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty builder with a fresh validation bag
    pub fn create(&mut self) -> BuilderId {
        let validations = self.new_validation_set(Vec::new());
        self.insert(ClassBuilder {
            klass: None,
            klass_name: None,
            associated_builder: None,
            base_builder: None,
            attribute_builders: Vec::new(),
            attribute_name: None,
            validations,
        })
    }

    /// Add a builder targeting a built-in type
    pub fn create_builtin(&mut self, builtin: BuiltinType) -> BuilderId {
        let id = self.create();
        self.get_mut(id).klass = Some(ClassTarget::Builtin(builtin));
        id
    }

    /// Add an empty builder with a class name
    pub fn create_named(&mut self, klass_name: impl Into<String>) -> BuilderId {
        let id = self.create();
        self.get_mut(id).klass_name = Some(klass_name.into());
        id
    }

    fn insert(&mut self, builder: ClassBuilder) -> BuilderId {
        let id = BuilderId(self.builders.len());
        self.builders.push(builder);
        id
    }

    fn new_validation_set(&mut self, rules: Vec<Validation>) -> ValidationSetId {
        let id = ValidationSetId(self.validation_sets.len());
        self.validation_sets.push(rules);
        id
    }

    /// Get a builder
    pub fn get(&self, id: BuilderId) -> &ClassBuilder {
        &self.builders[id.0]
    }

    /// Get a builder mutably
    pub fn get_mut(&mut self, id: BuilderId) -> &mut ClassBuilder {
        &mut self.builders[id.0]
    }

    /// Number of builders
    pub fn len(&self) -> usize {
        self.builders.len()
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Accessor name of a builder used as a field
    ///
    /// Taken from the attribute name, else the class name, else the
    /// built-in type name.
    pub fn field_name(&self, id: BuilderId) -> Option<String> {
        let builder = self.get(id);
        builder
            .attribute_name
            .as_deref()
            .or(builder.klass_name.as_deref())
            .or_else(|| builder.builtin().map(|b| b.name()))
            .map(field_name)
    }

    /// Set the supertype to a built-in type
    pub fn set_base(&mut self, id: BuilderId, builtin: BuiltinType) {
        let base = self.create_builtin(builtin);
        self.get_mut(id).base_builder = Some(base);
    }

    /// Append a field builder
    pub fn push_attribute(&mut self, id: BuilderId, attribute: BuilderId) {
        self.get_mut(id).attribute_builders.push(attribute);
    }

    /// Validation rules of a builder
    pub fn validations(&self, id: BuilderId) -> &[Validation] {
        &self.validation_sets[self.get(id).validations.0]
    }

    /// Mutable access to a builder's bag; visible to every builder sharing it
    pub fn validations_mut(&mut self, id: BuilderId) -> &mut Vec<Validation> {
        let set = self.get(id).validations;
        &mut self.validation_sets[set.0]
    }

    /// Append a validation rule to a builder's bag
    pub fn push_validation(&mut self, id: BuilderId, validation: Validation) {
        self.validations_mut(id).push(validation);
    }

    /// Give a builder a new bag holding `rules`, detaching it from any sharers
    pub fn replace_validations(&mut self, id: BuilderId, rules: Vec<Validation>) {
        let set = self.new_validation_set(rules);
        self.get_mut(id).validations = set;
    }

    /// Check whether two builders share one validation bag
    pub fn shares_validations(&self, a: BuilderId, b: BuilderId) -> bool {
        self.get(a).validations == self.get(b).validations
    }

    /// Deep copy of the graph rooted at `id`
    pub fn clone_graph(&mut self, id: BuilderId) -> BuilderId {
        let mut cloned = HashMap::new();
        self.deep_clone(id, &mut cloned)
    }

    /// Deep copy of the graph rooted at `id`, reusing clones from `cloned`
    ///
    /// Every original builder is copied at most once: the copy is registered
    /// in `cloned` before its children are visited, so shared builders stay
    /// shared and cycles close on the copies. Validation bags are shared with
    /// the originals.
    pub fn deep_clone(
        &mut self,
        id: BuilderId,
        cloned: &mut HashMap<BuilderId, BuilderId>,
    ) -> BuilderId {
        if let Some(&copy) = cloned.get(&id) {
            return copy;
        }

        let original = self.get(id).clone();
        let copy = self.insert(ClassBuilder {
            attribute_builders: Vec::with_capacity(original.attribute_builders.len()),
            associated_builder: None,
            base_builder: None,
            ..original.clone()
        });
        cloned.insert(id, copy);

        let associated = original
            .associated_builder
            .map(|ab| self.deep_clone(ab, cloned));
        let base = original.base_builder.map(|bb| self.deep_clone(bb, cloned));
        let attributes: Vec<BuilderId> = original
            .attribute_builders
            .iter()
            .map(|&ab| self.deep_clone(ab, cloned))
            .collect();

        let builder = self.get_mut(copy);
        builder.associated_builder = associated;
        builder.base_builder = base;
        builder.attribute_builders = attributes;
        copy
    }

    /// Every distinct builder reachable from `id`
    ///
    /// Depth-first: base chain, then associated chain, then fields. The
    /// root itself only appears when a cycle leads back to it.
    pub fn associated(&self, id: BuilderId) -> Vec<BuilderId> {
        let mut builders = IndexSet::new();
        self.collect_associated(id, &mut builders);
        builders.into_iter().collect()
    }

    fn collect_associated(&self, id: BuilderId, builders: &mut IndexSet<BuilderId>) {
        let builder = self.get(id);
        let linked = builder
            .base_builder
            .into_iter()
            .chain(builder.associated_builder)
            .chain(builder.attribute_builders.iter().copied());

        for next in linked {
            if builders.insert(next) {
                self.collect_associated(next, builders);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_copies_scalars_and_shares_validations() {
        let mut builders = ClassBuilders::new();
        let root = builders.create_named("Book");
        builders.get_mut(root).attribute_name = Some("book".to_string());
        builders.set_base(root, BuiltinType::String);
        builders.push_validation(root, Validation::MaxLength(10));

        let copy = builders.clone_graph(root);

        assert_ne!(copy, root);
        assert_eq!(builders.get(copy).klass_name.as_deref(), Some("Book"));
        assert_eq!(builders.get(copy).attribute_name.as_deref(), Some("book"));
        let base = builders.get(copy).base_builder.unwrap();
        assert_ne!(Some(base), builders.get(root).base_builder);
        assert_eq!(builders.get(base).builtin(), Some(BuiltinType::String));
        assert!(builders.shares_validations(root, copy));
    }

    #[test]
    fn test_clone_preserves_sharing() {
        let mut builders = ClassBuilders::new();
        let shared = builders.create_named("Address");
        let root = builders.create_named("Order");
        builders.push_attribute(root, shared);
        builders.push_attribute(root, shared);

        let copy = builders.clone_graph(root);
        let fields = &builders.get(copy).attribute_builders;

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], fields[1]);
        assert_ne!(fields[0], shared);
    }

    #[test]
    fn test_clone_terminates_on_cycles() {
        let mut builders = ClassBuilders::new();
        let node = builders.create_named("Node");
        let child = builders.create();
        builders.get_mut(child).attribute_name = Some("child".to_string());
        builders.get_mut(child).base_builder = Some(node);
        builders.push_attribute(node, child);

        let before = builders.len();
        let copy = builders.clone_graph(node);

        assert_eq!(builders.len(), before + 2);
        let copied_child = builders.get(copy).attribute_builders[0];
        assert_eq!(builders.get(copied_child).base_builder, Some(copy));
    }

    #[test]
    fn test_associated_deduplicates() {
        let mut builders = ClassBuilders::new();
        let root = builders.create_named("Root");
        let base = builders.create_named("Base");
        builders.get_mut(root).base_builder = Some(base);
        builders.push_attribute(root, base);

        assert_eq!(builders.associated(root), vec![base]);
    }

    #[test]
    fn test_associated_covers_base_chain_and_fields_once() {
        let mut builders = ClassBuilders::new();
        let root = builders.create_named("Invoice");
        let document = builders.create_named("Document");
        let record = builders.create_named("Record");
        let entity = builders.create_named("Entity");
        builders.get_mut(root).base_builder = Some(document);
        builders.get_mut(document).base_builder = Some(record);
        builders.get_mut(record).base_builder = Some(entity);

        let total = builders.create_named("Total");
        builders.get_mut(total).attribute_name = Some("total".to_string());
        builders.get_mut(total).base_builder = Some(entity);
        builders.push_attribute(root, total);
        builders.push_attribute(root, document);

        assert_eq!(
            builders.associated(root),
            vec![document, record, entity, total]
        );
    }

    #[test]
    fn test_associated_includes_root_on_cycle() {
        let mut builders = ClassBuilders::new();
        let root = builders.create_named("Tree");
        let list = builders.create();
        builders.get_mut(list).klass = Some(ClassTarget::List);
        builders.get_mut(list).associated_builder = Some(root);
        builders.push_attribute(root, list);

        assert_eq!(builders.associated(root), vec![list, root]);
        assert!(builders.get(list).is_list());
    }

    #[test]
    fn test_field_name_fallbacks() {
        let mut builders = ClassBuilders::new();
        let named = builders.create_named("PostalCode");
        let builtin = builders.create_builtin(BuiltinType::Integer);
        let attribute = builders.create_named("Type");
        builders.get_mut(attribute).attribute_name = Some("type".to_string());

        assert_eq!(builders.field_name(named).as_deref(), Some("postal_code"));
        assert_eq!(builders.field_name(builtin).as_deref(), Some("integer"));
        assert_eq!(builders.field_name(attribute).as_deref(), Some("r#type"));
        let empty = builders.create();
        assert_eq!(builders.field_name(empty), None);
    }

    #[test]
    fn test_validation_kinds() {
        assert_eq!(Validation::MinExclusive(1).kind(), "min_exclusive");
        assert_eq!(Validation::Enumerations(vec![]).kind(), "enumerations");
        assert_eq!(Validation::Choice(vec![]).kind(), "choice");
    }

    #[test]
    fn test_validation_serializes_with_kind_tag() {
        let json = serde_json::to_value(Validation::MaxLength(10)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "max_length", "param": 10}));
    }
}
