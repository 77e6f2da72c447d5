//! Class definition renderer
//!
//! Renders a class builder into a [`ClassDefinition`]: Rust source text for
//! the type (via `Display`) together with the compiled validity checks, so
//! the same rules that are printed can be evaluated against live
//! [`Instance`]s.
//!
//! Facets map to checks as follows:
//!
//! | rule                                       | check                                |
//! |--------------------------------------------|--------------------------------------|
//! | min/max exclusive/inclusive                | decimal comparison with the value    |
//! | length, min_length, max_length             | character count of the value         |
//! | fraction_digits                            | one `.` and exactly n digits after it |
//! | enumerations                               | value is one of the listed values    |
//! | choice                                     | exactly one option field is present  |
//! | total_digits, whitespace, pattern          | unsupported: warned about, omitted   |

use std::fmt::{self, Write as _};
use std::str::FromStr;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::builders::{BuilderId, ClassBuilders, Validation};

use super::instance::Instance;
use super::ClassRenderer;

/// Configuration for [`DefinitionRenderer`]
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Supertype of classes without a base
    root_type_name: String,
    /// Indentation of rendered source
    indent: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            root_type_name: "AnyType".to_string(),
            indent: 4,
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the root type name
    pub fn root_type_name(&self) -> &str {
        &self.root_type_name
    }

    /// Get the indentation width
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Set the root type name
    pub fn with_root_type_name(mut self, name: impl Into<String>) -> Self {
        self.root_type_name = name.into();
        self
    }

    /// Set the indentation width
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

/// One accessor of a rendered class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Accessor {
    /// snake_case field name
    pub name: String,
    /// Rust type of the field
    pub type_name: String,
}

/// A compiled validity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "check", content = "param", rename_all = "snake_case")]
pub enum Check {
    /// Every value of the field must itself be valid
    FieldValid(String),
    /// Value > limit
    MinExclusive(i64),
    /// Value >= limit
    MinInclusive(i64),
    /// Value < limit
    MaxExclusive(i64),
    /// Value <= limit
    MaxInclusive(i64),
    /// Exactly this many digits after the decimal point
    FractionDigits(i64),
    /// Exactly this many characters
    Length(i64),
    /// At least this many characters
    MinLength(i64),
    /// At most this many characters
    MaxLength(i64),
    /// Value is one of these
    Enumeration(Vec<String>),
    /// Exactly one of these fields is present
    Choice(Vec<String>),
}

impl Check {
    /// Compile a validation rule; `None` for unsupported kinds
    pub fn from_validation(validation: &Validation) -> Option<Self> {
        let check = match validation {
            Validation::MinExclusive(v) => Check::MinExclusive(*v),
            Validation::MinInclusive(v) => Check::MinInclusive(*v),
            Validation::MaxExclusive(v) => Check::MaxExclusive(*v),
            Validation::MaxInclusive(v) => Check::MaxInclusive(*v),
            Validation::FractionDigits(v) => Check::FractionDigits(*v),
            Validation::Length(v) => Check::Length(*v),
            Validation::MinLength(v) => Check::MinLength(*v),
            Validation::MaxLength(v) => Check::MaxLength(*v),
            Validation::Enumerations(values) => Check::Enumeration(values.clone()),
            Validation::Choice(fields) => Check::Choice(fields.clone()),
            Validation::TotalDigits(_) | Validation::Whitespace(_) | Validation::Pattern(_) => {
                return None
            }
        };
        Some(check)
    }

    /// Evaluate the check against an instance's own value and fields
    ///
    /// Field validity is recursive and evaluated by [`DefinitionSet`]; here
    /// it always passes.
    pub fn passes(&self, instance: &Instance) -> bool {
        let text = instance.text();
        match self {
            Check::FieldValid(_) => true,
            Check::MinExclusive(limit) => compare(text, |v| v > Decimal::from(*limit)),
            Check::MinInclusive(limit) => compare(text, |v| v >= Decimal::from(*limit)),
            Check::MaxExclusive(limit) => compare(text, |v| v < Decimal::from(*limit)),
            Check::MaxInclusive(limit) => compare(text, |v| v <= Decimal::from(*limit)),
            Check::FractionDigits(digits) => {
                let parts: Vec<&str> = text.trim().split('.').collect();
                matches!(
                    parts.as_slice(),
                    [_, fraction] if !fraction.is_empty()
                        && fraction.chars().count() as i64 == *digits
                )
            }
            Check::Length(len) => text.chars().count() as i64 == *len,
            Check::MinLength(len) => text.chars().count() as i64 >= *len,
            Check::MaxLength(len) => text.chars().count() as i64 <= *len,
            Check::Enumeration(values) => values.iter().any(|v| v == text),
            Check::Choice(fields) => {
                fields
                    .iter()
                    .filter(|field| instance.has_field(field))
                    .count()
                    == 1
            }
        }
    }

    /// Source expression of the check, as used in the rendered `is_valid`
    fn expression(&self) -> String {
        match self {
            Check::FieldValid(field) => format!("self.{}.is_valid()", field),
            Check::MinExclusive(limit) => {
                format!("self.decimal_value() > Decimal::from({})", limit)
            }
            Check::MinInclusive(limit) => {
                format!("self.decimal_value() >= Decimal::from({})", limit)
            }
            Check::MaxExclusive(limit) => {
                format!("self.decimal_value() < Decimal::from({})", limit)
            }
            Check::MaxInclusive(limit) => {
                format!("self.decimal_value() <= Decimal::from({})", limit)
            }
            Check::FractionDigits(digits) => format!(
                "matches!(self.text().split('.').collect::<Vec<_>>().as_slice(), \
                 [_, f] if !f.is_empty() && f.chars().count() == {})",
                digits
            ),
            Check::Length(len) => format!("self.text().chars().count() == {}", len),
            Check::MinLength(len) => format!("self.text().chars().count() >= {}", len),
            Check::MaxLength(len) => format!("self.text().chars().count() <= {}", len),
            Check::Enumeration(values) => format!("{:?}.contains(&self.text())", values),
            Check::Choice(fields) => {
                let present: Vec<String> = fields
                    .iter()
                    .map(|f| format!("self.{}.is_present()", f))
                    .collect();
                format!(
                    "[{}].iter().filter(|present| **present).count() == 1",
                    present.join(", ")
                )
            }
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::FieldValid(field) => write!(f, "field_valid({})", field),
            Check::MinExclusive(v) => write!(f, "min_exclusive({})", v),
            Check::MinInclusive(v) => write!(f, "min_inclusive({})", v),
            Check::MaxExclusive(v) => write!(f, "max_exclusive({})", v),
            Check::MaxInclusive(v) => write!(f, "max_inclusive({})", v),
            Check::FractionDigits(v) => write!(f, "fraction_digits({})", v),
            Check::Length(v) => write!(f, "length({})", v),
            Check::MinLength(v) => write!(f, "min_length({})", v),
            Check::MaxLength(v) => write!(f, "max_length({})", v),
            Check::Enumeration(values) => write!(f, "enumeration({})", values.join("|")),
            Check::Choice(fields) => write!(f, "choice({})", fields.join("|")),
        }
    }
}

fn compare(text: &str, predicate: impl Fn(Decimal) -> bool) -> bool {
    Decimal::from_str(text.trim()).map_or(false, predicate)
}

/// A rendered class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDefinition {
    /// Class name
    pub name: String,
    /// Supertype name; `None` for built-in scaffolds
    pub superclass: Option<String>,
    /// Rust type a built-in scaffold aliases
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builtin_type: Option<String>,
    /// Accessors in field order
    pub accessors: Vec<Accessor>,
    /// Compiled checks: field validity first, then facet rules
    pub checks: Vec<Check>,
    /// Rules that could not be compiled
    pub warnings: Vec<String>,
    #[serde(skip)]
    root_type_name: String,
    #[serde(skip)]
    indent: usize,
}

impl ClassDefinition {
    /// Check whether this is a bare built-in scaffold
    pub fn is_builtin(&self) -> bool {
        self.builtin_type.is_some()
    }

    /// Check whether a validity method is emitted
    pub fn has_validity_check(&self) -> bool {
        !self.checks.is_empty()
    }

    /// Accessor by name
    pub fn accessor(&self, name: &str) -> Option<&Accessor> {
        self.accessors.iter().find(|a| a.name == name)
    }
}

impl fmt::Display for ClassDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pad = " ".repeat(self.indent);

        if let Some(rust_type) = &self.builtin_type {
            writeln!(f, "#[allow(non_camel_case_types)]")?;
            return writeln!(f, "pub type {} = {};", self.name, rust_type);
        }

        let base = self
            .superclass
            .as_deref()
            .filter(|superclass| *superclass != self.root_type_name);
        if base.is_none() && self.accessors.is_empty() {
            writeln!(f, "pub struct {};", self.name)?;
        } else {
            writeln!(f, "pub struct {} {{", self.name)?;
            if let Some(base) = base {
                writeln!(f, "{}pub base: {},", pad, base)?;
            }
            for accessor in &self.accessors {
                writeln!(f, "{}pub {}: {},", pad, accessor.name, accessor.type_name)?;
            }
            writeln!(f, "}}")?;
        }

        if self.has_validity_check() {
            let mut body = String::new();
            for (i, check) in self.checks.iter().enumerate() {
                let lead = if i == 0 {
                    pad.repeat(2)
                } else {
                    format!("{}&& ", pad.repeat(3))
                };
                let _ = writeln!(body, "{}{}", lead, check.expression());
            }
            writeln!(f)?;
            writeln!(f, "impl {} {{", self.name)?;
            writeln!(f, "{}pub fn is_valid(&self) -> bool {{", pad)?;
            write!(f, "{}", body)?;
            writeln!(f, "{}}}", pad)?;
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}

/// Renders class builders into [`ClassDefinition`]s
#[derive(Debug, Clone, Default)]
pub struct DefinitionRenderer {
    config: RenderConfig,
}

impl DefinitionRenderer {
    /// Create a renderer with a configuration
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Rust type of a builder used as a field
    fn type_name(&self, builders: &ClassBuilders, id: BuilderId) -> String {
        let builder = builders.get(id);
        if builder.is_list() {
            let item = builder
                .associated_builder
                .map(|item| self.type_name(builders, item))
                .unwrap_or_else(|| self.config.root_type_name.clone());
            return format!("Vec<{}>", item);
        }
        if let Some(builtin) = builder.builtin() {
            return builtin.name().to_string();
        }
        if let Some(name) = &builder.klass_name {
            return name.clone();
        }
        self.config.root_type_name.clone()
    }

    fn superclass(&self, builders: &ClassBuilders, id: BuilderId) -> String {
        let Some(base) = builders.get(id).base_builder else {
            return self.config.root_type_name.clone();
        };
        let base = builders.get(base);
        base.klass_name
            .clone()
            .or_else(|| base.builtin().map(|b| b.name().to_string()))
            .unwrap_or_else(|| self.config.root_type_name.clone())
    }

    fn definition(&self, name: String) -> ClassDefinition {
        ClassDefinition {
            name,
            superclass: None,
            builtin_type: None,
            accessors: Vec::new(),
            checks: Vec::new(),
            warnings: Vec::new(),
            root_type_name: self.config.root_type_name.clone(),
            indent: self.config.indent,
        }
    }
}

impl ClassRenderer for DefinitionRenderer {
    type Output = ClassDefinition;

    fn render(&self, builders: &ClassBuilders, id: BuilderId) -> Option<ClassDefinition> {
        let builder = builders.get(id);

        if let Some(builtin) = builder.builtin() {
            let mut definition = self.definition(builtin.name().to_string());
            definition.builtin_type = Some(builtin.rust_type().to_string());
            return Some(definition);
        }

        let name = builder.klass_name.clone()?;
        let mut definition = self.definition(name);
        definition.superclass = Some(self.superclass(builders, id));

        for &field in &builder.attribute_builders {
            let Some(accessor) = builders.field_name(field) else {
                tracing::debug!(
                    class = %definition.name,
                    builder = %field,
                    "field without a name skipped"
                );
                continue;
            };
            definition.accessors.push(Accessor {
                name: accessor.clone(),
                type_name: self.type_name(builders, field),
            });
            definition.checks.push(Check::FieldValid(accessor));
        }

        for validation in builders.validations(id) {
            match Check::from_validation(validation) {
                Some(check) => definition.checks.push(check),
                None => {
                    tracing::warn!(
                        class = %definition.name,
                        kind = validation.kind(),
                        "unsupported validation omitted"
                    );
                    definition.warnings.push(format!(
                        "{}: unsupported validation '{}' omitted",
                        definition.name,
                        validation.kind()
                    ));
                }
            }
        }

        Some(definition)
    }
}

/// Rendered definitions by class name
#[derive(Debug, Clone, Default)]
pub struct DefinitionSet {
    definitions: IndexMap<String, ClassDefinition>,
}

impl DefinitionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition; the first definition of a name is kept
    pub fn insert(&mut self, definition: ClassDefinition) -> bool {
        if self.definitions.contains_key(&definition.name) {
            return false;
        }
        self.definitions.insert(definition.name.clone(), definition);
        true
    }

    /// Definition by class name
    pub fn get(&self, name: &str) -> Option<&ClassDefinition> {
        self.definitions.get(name)
    }

    /// Definitions in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ClassDefinition> {
        self.definitions.values()
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Failed checks of an instance and, through its fields, of every
    /// nested instance
    ///
    /// A field failure is reported as `Class::field`, followed by the
    /// failures found inside it. Instances of unknown classes pass.
    pub fn validate(&self, instance: &Instance) -> Vec<String> {
        let mut failures = Vec::new();
        let Some(definition) = self.get(&instance.class_name) else {
            return failures;
        };

        for check in &definition.checks {
            match check {
                Check::FieldValid(field) => {
                    let nested: Vec<String> = instance
                        .field_all(field)
                        .iter()
                        .flat_map(|value| self.validate(value))
                        .collect();
                    if !nested.is_empty() {
                        failures.push(format!("{}::{}", definition.name, field));
                        failures.extend(nested);
                    }
                }
                check if !check.passes(instance) => {
                    failures.push(format!("{}: {}", definition.name, check));
                }
                _ => {}
            }
        }
        failures
    }

    /// Check whether an instance passes every check
    pub fn is_valid(&self, instance: &Instance) -> bool {
        self.validate(instance).is_empty()
    }
}

impl FromIterator<ClassDefinition> for DefinitionSet {
    fn from_iter<I: IntoIterator<Item = ClassDefinition>>(iter: I) -> Self {
        let mut set = Self::new();
        for definition in iter {
            set.insert(definition);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::ClassTarget;
    use crate::builtins::BuiltinType;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn text_instance(class_name: &str, text: &str) -> Instance {
        let mut instance = Instance::new(class_name, "value");
        instance.content = Some(text.to_string());
        instance
    }

    fn max_length_definition() -> (ClassDefinition, DefinitionSet) {
        let mut builders = ClassBuilders::new();
        let cb = builders.create_named("Code");
        builders.set_base(cb, BuiltinType::String);
        builders.push_validation(cb, Validation::MaxLength(10));

        let definition = DefinitionRenderer::default().render(&builders, cb).unwrap();
        let set: DefinitionSet = std::iter::once(definition.clone()).collect();
        (definition, set)
    }

    #[test]
    fn test_builtin_short_circuit() {
        let mut builders = ClassBuilders::new();
        let cb = builders.create_builtin(BuiltinType::Integer);
        builders.get_mut(cb).klass_name = Some("Year".to_string());
        builders.push_validation(cb, Validation::MaxInclusive(3000));

        let definition = DefinitionRenderer::default().render(&builders, cb).unwrap();
        assert!(definition.is_builtin());
        assert_eq!(definition.name, "integer");
        assert!(definition.checks.is_empty());
        assert_eq!(
            definition.to_string(),
            "#[allow(non_camel_case_types)]\npub type integer = i64;\n"
        );
    }

    #[test]
    fn test_unnamed_builder_is_not_renderable() {
        let mut builders = ClassBuilders::new();
        let cb = builders.create();
        builders.get_mut(cb).attribute_name = Some("items".to_string());
        assert_eq!(DefinitionRenderer::default().render(&builders, cb), None);
    }

    #[test]
    fn test_superclass_fallbacks() {
        let mut builders = ClassBuilders::new();
        let plain = builders.create_named("Plain");
        let derived = builders.create_named("Derived");
        builders.get_mut(derived).base_builder = Some(plain);
        let text = builders.create_named("Text");
        builders.set_base(text, BuiltinType::String);

        let renderer = DefinitionRenderer::new(RenderConfig::new().with_root_type_name("Object"));
        let superclass = |id| renderer.render(&builders, id).unwrap().superclass;
        assert_eq!(superclass(plain).as_deref(), Some("Object"));
        assert_eq!(superclass(derived).as_deref(), Some("Plain"));
        assert_eq!(superclass(text).as_deref(), Some("string"));
    }

    #[test]
    fn test_source_text() {
        let mut builders = ClassBuilders::new();
        let book = builders.create_named("Book");
        let title = builders.create_named("Title");
        builders.get_mut(title).attribute_name = Some("title".to_string());
        let authors = builders.create();
        builders.get_mut(authors).klass = Some(ClassTarget::List);
        builders.get_mut(authors).attribute_name = Some("author".to_string());
        let author = builders.create_builtin(BuiltinType::String);
        builders.get_mut(authors).associated_builder = Some(author);
        builders.push_attribute(book, title);
        builders.push_attribute(book, authors);

        let definition = DefinitionRenderer::default().render(&builders, book).unwrap();
        assert_eq!(
            definition.to_string(),
            "pub struct Book {
    pub title: Title,
    pub author: Vec<string>,
}

impl Book {
    pub fn is_valid(&self) -> bool {
        self.title.is_valid()
            && self.author.is_valid()
    }
}
"
        );
    }

    #[test]
    fn test_no_checks_no_validity_method() {
        let mut builders = ClassBuilders::new();
        let cb = builders.create_named("Empty");
        let definition = DefinitionRenderer::default().render(&builders, cb).unwrap();

        assert!(!definition.has_validity_check());
        assert_eq!(definition.to_string(), "pub struct Empty;\n");
    }

    #[test]
    fn test_unsupported_validation_is_non_fatal() {
        let mut builders = ClassBuilders::new();
        let cb = builders.create_named("Zip");
        builders.push_validation(cb, Validation::Pattern("[0-9]{5}".to_string()));
        builders.push_validation(cb, Validation::Length(5));

        let definition = DefinitionRenderer::default().render(&builders, cb).unwrap();
        assert_eq!(definition.checks, vec![Check::Length(5)]);
        assert_eq!(definition.warnings.len(), 1);
        assert!(definition.warnings[0].contains("pattern"));
    }

    #[test]
    fn test_max_length_boundary() {
        let (definition, set) = max_length_definition();
        assert_eq!(definition.checks, vec![Check::MaxLength(10)]);
        assert!(set.is_valid(&text_instance("Code", "abcdefghij")));
        assert!(!set.is_valid(&text_instance("Code", "abcdefghijk")));
    }

    #[test]
    fn test_numeric_checks() {
        let value = text_instance("Price", " 10.50 ");
        assert!(Check::MinExclusive(10).passes(&value));
        assert!(Check::MaxInclusive(11).passes(&value));
        assert!(!Check::MaxExclusive(10).passes(&value));
        assert!(Check::FractionDigits(2).passes(&value));
        assert!(!Check::MinInclusive(0).passes(&text_instance("Price", "n/a")));
    }

    #[test]
    fn test_fraction_digits_needs_one_separator() {
        assert!(Check::FractionDigits(1).passes(&text_instance("Price", "1.5")));
        assert!(!Check::FractionDigits(0).passes(&text_instance("Price", "10")));
        assert!(!Check::FractionDigits(0).passes(&text_instance("Price", "1.")));
        assert!(!Check::FractionDigits(3).passes(&text_instance("Price", "1.2.3")));
        assert!(!Check::FractionDigits(1).passes(&text_instance("Price", "1.2.3")));
    }

    #[test]
    fn test_enumeration_check() {
        let check = Check::Enumeration(vec!["red".to_string(), "green".to_string()]);
        assert!(check.passes(&text_instance("Color", "red")));
        assert!(!check.passes(&text_instance("Color", "blue")));
    }

    #[test]
    fn test_choice_exclusivity() {
        let check = Check::Choice(vec!["email".to_string(), "phone".to_string()]);
        let mut contact = Instance::new("Contact", "contact");
        assert!(!check.passes(&contact));

        contact.push_field("email", Instance::new("string", "email"));
        assert!(check.passes(&contact));

        contact.push_field("phone", Instance::new("string", "phone"));
        assert!(!check.passes(&contact));
    }

    #[test]
    fn test_field_failures_are_reported_with_class_and_field() {
        let (code, _) = max_length_definition();
        let mut builders = ClassBuilders::new();
        let item = builders.create_named("Item");
        let field = builders.create_named("Code");
        builders.get_mut(field).attribute_name = Some("code".to_string());
        builders.push_attribute(item, field);
        let renderer = DefinitionRenderer::default();
        let set: DefinitionSet = [renderer.render(&builders, item).unwrap(), code]
            .into_iter()
            .collect();

        let mut instance = Instance::new("Item", "item");
        instance.push_field("code", text_instance("Code", "far too long value"));

        assert_eq!(
            set.validate(&instance),
            vec!["Item::code".to_string(), "Code: max_length(10)".to_string()]
        );
    }

    #[test]
    fn test_definition_serializes() {
        let (definition, _) = max_length_definition();
        let json = serde_json::to_value(&definition).unwrap();
        assert_eq!(json["name"], "Code");
        assert_eq!(json["superclass"], "string");
        assert_eq!(json["checks"][0], serde_json::json!({"check": "max_length", "param": 10}));
    }

    proptest! {
        #[test]
        fn prop_max_length_matches_char_count(value in "\\PC{0,20}") {
            let (_, set) = max_length_definition();
            let valid = set.is_valid(&text_instance("Code", &value));
            prop_assert_eq!(valid, value.chars().count() <= 10);
        }
    }
}
