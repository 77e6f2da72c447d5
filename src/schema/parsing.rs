//! XSD document parsing
//!
//! Structural parsing of a schema document into the node arena. Each node
//! kind has a `from_source` factory that registers the new node in the
//! source element's related slot before it parses its children, so a child
//! can look at what kind of node its parent is. Type references are kept as
//! raw names; the resolver links them afterwards.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::documents::{Document, SourceElement};
use crate::error::{Error, ParseError, Result};
use crate::limits::Limits;

use super::nodes::{
    Attribute, AttributeGroup, AttributeUse, ComplexType, Content, Element, Extension, Facets,
    Group, Kind, List, ModelGroup, NodeId, NodeKind, NodeRef, Occurs, Restriction, SchemaNodes,
    SchemaRoot, SimpleType, TypeRef, Union,
};

/// XSD attribute names
mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const REF: &str = "ref";
    pub const ID: &str = "id";
    pub const BASE: &str = "base";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const NILLABLE: &str = "nillable";
    pub const ABSTRACT: &str = "abstract";
    pub const MIXED: &str = "mixed";
    pub const DEFAULT: &str = "default";
    pub const FIXED: &str = "fixed";
    pub const USE: &str = "use";
    pub const ITEM_TYPE: &str = "itemType";
    pub const MEMBER_TYPES: &str = "memberTypes";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
}

/// XSD facet element names
mod xsd_facets {
    pub const MIN_EXCLUSIVE: &str = "minExclusive";
    pub const MIN_INCLUSIVE: &str = "minInclusive";
    pub const MAX_EXCLUSIVE: &str = "maxExclusive";
    pub const MAX_INCLUSIVE: &str = "maxInclusive";
    pub const TOTAL_DIGITS: &str = "totalDigits";
    pub const FRACTION_DIGITS: &str = "fractionDigits";
    pub const LENGTH: &str = "length";
    pub const MIN_LENGTH: &str = "minLength";
    pub const MAX_LENGTH: &str = "maxLength";
    pub const ENUMERATION: &str = "enumeration";
    pub const WHITE_SPACE: &str = "whiteSpace";
    pub const WHITESPACE: &str = "whitespace";
    pub const PATTERN: &str = "pattern";
}

/// Parse a schema document into a node arena, returning the schema root
pub(crate) fn parse_document(doc: &Document, limits: &Limits) -> Result<(SchemaNodes, NodeId)> {
    let root = doc
        .root()
        .ok_or_else(|| ParseError::new("Empty schema document"))?;

    if root.name() != Kind::Schema.tag_name() {
        return Err(ParseError::new(format!(
            "Expected root element 'schema', found '{}'",
            root.name()
        ))
        .into());
    }

    let mut parser = Parser::new(limits);
    let schema = parser.parse(root, Kind::Schema)?;
    tracing::debug!(nodes = parser.nodes.len(), "schema parsed");
    Ok((parser.nodes, schema))
}

/// Parsing state: the arena being filled
pub(crate) struct Parser<'l> {
    pub(crate) nodes: SchemaNodes,
    limits: &'l Limits,
}

impl<'l> Parser<'l> {
    fn new(limits: &'l Limits) -> Self {
        Self {
            nodes: SchemaNodes::new(),
            limits,
        }
    }

    /// Parse `src` as a node of `kind`
    pub(crate) fn parse(&mut self, src: SourceElement<'_>, kind: Kind) -> Result<NodeId> {
        match kind {
            Kind::Schema => SchemaRoot::from_source(src, self),
            Kind::Element => Element::from_source(src, self),
            Kind::ComplexType => ComplexType::from_source(src, self),
            Kind::SimpleType => SimpleType::from_source(src, self),
            Kind::Attribute => Attribute::from_source(src, self),
            Kind::AttributeGroup => AttributeGroup::from_source(src, self),
            Kind::Group => Group::from_source(src, self),
            Kind::Sequence | Kind::Choice | Kind::All => ModelGroup::from_source(src, kind, self),
            Kind::SimpleContent | Kind::ComplexContent => Content::from_source(src, kind, self),
            Kind::Restriction => Restriction::from_source(src, self),
            Kind::Extension => Extension::from_source(src, self),
            Kind::List => List::from_source(src, self),
            Kind::Union => Union::from_source(src, self),
        }
    }

    /// Parse the first child of `src` that is a `kind` construct
    fn child(&mut self, src: SourceElement<'_>, kind: Kind) -> Result<Option<NodeId>> {
        match src.child(kind.tag_name()) {
            Some(child) => self.parse(child, kind).map(Some),
            None => Ok(None),
        }
    }

    /// Parse every child of `src` that is a `kind` construct
    fn children(&mut self, src: SourceElement<'_>, kind: Kind) -> Result<Vec<NodeId>> {
        src.children(kind.tag_name())
            .into_iter()
            .map(|child| self.parse(child, kind))
            .collect()
    }

    /// Allocate the node for `src` and record it in the related slot
    fn begin(&mut self, src: SourceElement<'_>, kind: Kind) -> Result<NodeId> {
        self.limits.check_schema_nodes(self.nodes.len() + 1)?;

        let parent = src.parent().and_then(|p| p.related());
        let id = self.nodes.insert(parent, NodeKind::empty(kind));
        self.nodes.get_mut(id).id = src.attribute(xsd_attrs::ID).map(str::to_string);
        src.set_related(id);
        Ok(id)
    }

    /// Store the parsed payload of a node
    fn finish(&mut self, id: NodeId, kind: NodeKind) -> NodeId {
        self.nodes.get_mut(id).kind = kind;
        id
    }

    fn parent_kind(&self, id: NodeId) -> Option<Kind> {
        self.nodes.get(id).parent.map(|p| self.nodes.kind_of(p))
    }
}

// =============================================================================
// Attribute helpers
// =============================================================================

fn string_attr(src: SourceElement<'_>, name: &str) -> Option<String> {
    src.attribute(name).map(str::to_string)
}

fn type_attr(src: SourceElement<'_>, name: &str) -> Option<TypeRef> {
    src.attribute(name).map(TypeRef::named)
}

fn ref_attr(src: SourceElement<'_>) -> Option<NodeRef> {
    src.attribute(xsd_attrs::REF)
        .map(|r| NodeRef::Named(r.to_string()))
}

fn bool_attr(src: SourceElement<'_>, name: &str) -> Result<bool> {
    match src.attribute(name).map(str::trim) {
        None => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(ParseError::new(format!(
            "Invalid boolean '{}' for attribute '{}'",
            other, name
        ))
        .with_location(src.name())
        .into()),
    }
}

fn parse_occurs(src: SourceElement<'_>) -> Result<Occurs> {
    let mut occurs = Occurs::default();

    if let Some(min) = src.attribute(xsd_attrs::MIN_OCCURS) {
        occurs.min = min.trim().parse().map_err(|_| {
            Error::from(
                ParseError::new(format!("Invalid minOccurs '{}'", min)).with_location(src.name()),
            )
        })?;
    }

    if let Some(max) = src.attribute(xsd_attrs::MAX_OCCURS) {
        occurs.max = match max.trim() {
            "unbounded" => None,
            value => Some(value.parse().map_err(|_| {
                Error::from(
                    ParseError::new(format!("Invalid maxOccurs '{}'", max))
                        .with_location(src.name()),
                )
            })?),
        };
    }

    Ok(occurs)
}

fn parse_attribute_use(src: SourceElement<'_>) -> Result<AttributeUse> {
    match src.attribute(xsd_attrs::USE).map(str::trim) {
        None | Some("optional") => Ok(AttributeUse::Optional),
        Some("required") => Ok(AttributeUse::Required),
        Some("prohibited") => Ok(AttributeUse::Prohibited),
        Some(other) => Err(ParseError::new(format!("Invalid attribute use '{}'", other))
            .with_location(src.name())
            .into()),
    }
}

/// Integer facet value; absent when empty
///
/// Decimal values are truncated towards zero with a warning, values that are
/// not numbers at all are dropped with a warning.
fn int_facet(src: SourceElement<'_>, tag: &str) -> Option<i64> {
    let text = src.child_text(tag)?.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(value) = text.parse() {
        return Some(value);
    }

    match Decimal::from_str(text).ok().and_then(|d| d.trunc().to_i64()) {
        Some(value) => {
            tracing::warn!(
                facet = tag,
                value = text,
                truncated = value,
                "truncating decimal facet value"
            );
            Some(value)
        }
        None => {
            tracing::warn!(facet = tag, value = text, "ignoring non-numeric facet value");
            None
        }
    }
}

fn text_facet(src: SourceElement<'_>, tag: &str) -> Option<String> {
    src.child_text(tag)
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
}

fn parse_facets(src: SourceElement<'_>) -> Facets {
    use xsd_facets::*;

    let enumerations: Vec<String> = src
        .child_texts(ENUMERATION)
        .into_iter()
        .map(str::to_string)
        .collect();

    Facets {
        min_exclusive: int_facet(src, MIN_EXCLUSIVE),
        min_inclusive: int_facet(src, MIN_INCLUSIVE),
        max_exclusive: int_facet(src, MAX_EXCLUSIVE),
        max_inclusive: int_facet(src, MAX_INCLUSIVE),
        total_digits: int_facet(src, TOTAL_DIGITS),
        fraction_digits: int_facet(src, FRACTION_DIGITS),
        length: int_facet(src, LENGTH),
        min_length: int_facet(src, MIN_LENGTH),
        max_length: int_facet(src, MAX_LENGTH),
        enumerations: if enumerations.is_empty() {
            None
        } else {
            Some(enumerations)
        },
        whitespace: text_facet(src, WHITE_SPACE).or_else(|| text_facet(src, WHITESPACE)),
        pattern: text_facet(src, PATTERN),
    }
}

// =============================================================================
// Node factories
// =============================================================================

impl SchemaRoot {
    fn from_source(src: SourceElement<'_>, parser: &mut Parser<'_>) -> Result<NodeId> {
        let id = parser.begin(src, Kind::Schema)?;
        let mut schema = SchemaRoot {
            target_namespace: string_attr(src, xsd_attrs::TARGET_NAMESPACE),
            ..Default::default()
        };

        for child in src.elements() {
            match child.name() {
                "element" => schema.elements.push(parser.parse(child, Kind::Element)?),
                "complexType" => schema
                    .complex_types
                    .push(parser.parse(child, Kind::ComplexType)?),
                "simpleType" => schema
                    .simple_types
                    .push(parser.parse(child, Kind::SimpleType)?),
                "attribute" => schema.attributes.push(parser.parse(child, Kind::Attribute)?),
                "attributeGroup" => schema
                    .attribute_groups
                    .push(parser.parse(child, Kind::AttributeGroup)?),
                "group" => schema.groups.push(parser.parse(child, Kind::Group)?),
                "annotation" => {}
                other => tracing::debug!(tag = other, "skipping unsupported schema child"),
            }
        }

        Ok(parser.finish(id, NodeKind::Schema(schema)))
    }
}

impl Element {
    fn from_source(src: SourceElement<'_>, parser: &mut Parser<'_>) -> Result<NodeId> {
        let id = parser.begin(src, Kind::Element)?;
        let element = Element {
            name: string_attr(src, xsd_attrs::NAME),
            type_ref: type_attr(src, xsd_attrs::TYPE),
            reference: ref_attr(src),
            occurs: parse_occurs(src)?,
            nillable: bool_attr(src, xsd_attrs::NILLABLE)?,
            is_abstract: bool_attr(src, xsd_attrs::ABSTRACT)?,
            default: string_attr(src, xsd_attrs::DEFAULT),
            fixed: string_attr(src, xsd_attrs::FIXED),
            simple_type: parser.child(src, Kind::SimpleType)?,
            complex_type: parser.child(src, Kind::ComplexType)?,
        };
        Ok(parser.finish(id, NodeKind::Element(element)))
    }
}

impl ComplexType {
    fn from_source(src: SourceElement<'_>, parser: &mut Parser<'_>) -> Result<NodeId> {
        let id = parser.begin(src, Kind::ComplexType)?;
        let complex = ComplexType {
            name: string_attr(src, xsd_attrs::NAME),
            mixed: bool_attr(src, xsd_attrs::MIXED)?,
            is_abstract: bool_attr(src, xsd_attrs::ABSTRACT)?,
            simple_content: parser.child(src, Kind::SimpleContent)?,
            complex_content: parser.child(src, Kind::ComplexContent)?,
            group: parser.child(src, Kind::Group)?,
            choice: parser.child(src, Kind::Choice)?,
            sequence: parser.child(src, Kind::Sequence)?,
            all: parser.child(src, Kind::All)?,
            attributes: parser.children(src, Kind::Attribute)?,
            attribute_groups: parser.children(src, Kind::AttributeGroup)?,
        };
        Ok(parser.finish(id, NodeKind::ComplexType(complex)))
    }
}

impl SimpleType {
    fn from_source(src: SourceElement<'_>, parser: &mut Parser<'_>) -> Result<NodeId> {
        let id = parser.begin(src, Kind::SimpleType)?;
        let simple = SimpleType {
            name: string_attr(src, xsd_attrs::NAME),
            restriction: parser.child(src, Kind::Restriction)?,
            list: parser.child(src, Kind::List)?,
            union: parser.child(src, Kind::Union)?,
        };
        Ok(parser.finish(id, NodeKind::SimpleType(simple)))
    }
}

impl Attribute {
    fn from_source(src: SourceElement<'_>, parser: &mut Parser<'_>) -> Result<NodeId> {
        let id = parser.begin(src, Kind::Attribute)?;
        let attribute = Attribute {
            name: string_attr(src, xsd_attrs::NAME),
            type_ref: type_attr(src, xsd_attrs::TYPE),
            reference: ref_attr(src),
            usage: parse_attribute_use(src)?,
            default: string_attr(src, xsd_attrs::DEFAULT),
            fixed: string_attr(src, xsd_attrs::FIXED),
            simple_type: parser.child(src, Kind::SimpleType)?,
        };
        Ok(parser.finish(id, NodeKind::Attribute(attribute)))
    }
}

impl AttributeGroup {
    fn from_source(src: SourceElement<'_>, parser: &mut Parser<'_>) -> Result<NodeId> {
        let id = parser.begin(src, Kind::AttributeGroup)?;
        let group = AttributeGroup {
            name: string_attr(src, xsd_attrs::NAME),
            reference: ref_attr(src),
            attributes: parser.children(src, Kind::Attribute)?,
            attribute_groups: parser.children(src, Kind::AttributeGroup)?,
        };
        Ok(parser.finish(id, NodeKind::AttributeGroup(group)))
    }
}

impl Group {
    fn from_source(src: SourceElement<'_>, parser: &mut Parser<'_>) -> Result<NodeId> {
        let id = parser.begin(src, Kind::Group)?;
        let group = Group {
            name: string_attr(src, xsd_attrs::NAME),
            reference: ref_attr(src),
            occurs: parse_occurs(src)?,
            choice: parser.child(src, Kind::Choice)?,
            sequence: parser.child(src, Kind::Sequence)?,
            all: parser.child(src, Kind::All)?,
        };
        Ok(parser.finish(id, NodeKind::Group(group)))
    }
}

impl ModelGroup {
    fn from_source(src: SourceElement<'_>, kind: Kind, parser: &mut Parser<'_>) -> Result<NodeId> {
        let id = parser.begin(src, kind)?;
        let mut group = ModelGroup {
            occurs: parse_occurs(src)?,
            particles: Vec::new(),
        };

        for child in src.elements() {
            let particle = match child.name() {
                "element" => Kind::Element,
                "group" => Kind::Group,
                "choice" => Kind::Choice,
                "sequence" => Kind::Sequence,
                "annotation" => continue,
                other => {
                    tracing::debug!(tag = other, "skipping unsupported particle");
                    continue;
                }
            };
            group.particles.push(parser.parse(child, particle)?);
        }

        let payload = match kind {
            Kind::Choice => NodeKind::Choice(group),
            Kind::All => NodeKind::All(group),
            _ => NodeKind::Sequence(group),
        };
        Ok(parser.finish(id, payload))
    }
}

impl Content {
    fn from_source(src: SourceElement<'_>, kind: Kind, parser: &mut Parser<'_>) -> Result<NodeId> {
        let id = parser.begin(src, kind)?;
        let content = Content {
            mixed: bool_attr(src, xsd_attrs::MIXED)?,
            restriction: parser.child(src, Kind::Restriction)?,
            extension: parser.child(src, Kind::Extension)?,
        };

        let payload = match kind {
            Kind::SimpleContent => NodeKind::SimpleContent(content),
            _ => NodeKind::ComplexContent(content),
        };
        Ok(parser.finish(id, payload))
    }
}

impl Restriction {
    fn from_source(src: SourceElement<'_>, parser: &mut Parser<'_>) -> Result<NodeId> {
        let id = parser.begin(src, Kind::Restriction)?;
        let mut restriction = Restriction {
            base: type_attr(src, xsd_attrs::BASE),
            ..Default::default()
        };

        match parser.parent_kind(id) {
            Some(Kind::ComplexContent) => {
                restriction.group = parser.child(src, Kind::Group)?;
                restriction.choice = parser.child(src, Kind::Choice)?;
                restriction.sequence = parser.child(src, Kind::Sequence)?;
                restriction.attributes = parser.children(src, Kind::Attribute)?;
                restriction.attribute_groups = parser.children(src, Kind::AttributeGroup)?;
            }
            Some(Kind::SimpleContent) => {
                restriction.attributes = parser.children(src, Kind::Attribute)?;
                restriction.attribute_groups = parser.children(src, Kind::AttributeGroup)?;
                restriction.simple_type = parser.child(src, Kind::SimpleType)?;
                restriction.facets = parse_facets(src);
            }
            _ => {
                restriction.simple_type = parser.child(src, Kind::SimpleType)?;
                restriction.facets = parse_facets(src);
            }
        }

        Ok(parser.finish(id, NodeKind::Restriction(restriction)))
    }
}

impl Extension {
    fn from_source(src: SourceElement<'_>, parser: &mut Parser<'_>) -> Result<NodeId> {
        let id = parser.begin(src, Kind::Extension)?;
        let extension = Extension {
            base: type_attr(src, xsd_attrs::BASE),
            group: parser.child(src, Kind::Group)?,
            choice: parser.child(src, Kind::Choice)?,
            sequence: parser.child(src, Kind::Sequence)?,
            attributes: parser.children(src, Kind::Attribute)?,
            attribute_groups: parser.children(src, Kind::AttributeGroup)?,
        };
        Ok(parser.finish(id, NodeKind::Extension(extension)))
    }
}

impl List {
    fn from_source(src: SourceElement<'_>, parser: &mut Parser<'_>) -> Result<NodeId> {
        let id = parser.begin(src, Kind::List)?;
        let list = List {
            item_type: type_attr(src, xsd_attrs::ITEM_TYPE),
            simple_type: parser.child(src, Kind::SimpleType)?,
        };
        Ok(parser.finish(id, NodeKind::List(list)))
    }
}

impl Union {
    fn from_source(src: SourceElement<'_>, parser: &mut Parser<'_>) -> Result<NodeId> {
        let id = parser.begin(src, Kind::Union)?;
        let union = Union {
            member_types: src
                .attribute(xsd_attrs::MEMBER_TYPES)
                .map(|types| types.split_whitespace().map(TypeRef::named).collect())
                .unwrap_or_default(),
            simple_types: parser.children(src, Kind::SimpleType)?,
        };
        Ok(parser.finish(id, NodeKind::Union(union)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xsd: &str) -> (SchemaNodes, NodeId) {
        let doc = Document::from_string(xsd).unwrap();
        parse_document(&doc, &Limits::default()).unwrap()
    }

    fn first_of(nodes: &SchemaNodes, kind: Kind) -> NodeId {
        nodes.ids().find(|&id| nodes.kind_of(id) == kind).unwrap()
    }

    #[test]
    fn test_non_schema_root_fails() {
        let doc = Document::from_string("<root/>").unwrap();
        let result = parse_document(&doc, &Limits::default());
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_simple_type_facets() {
        let (nodes, _) = parse(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:simpleType name="code">
                    <xs:restriction base="xs:string">
                        <xs:minLength value="2"/>
                        <xs:maxLength value="10"/>
                        <xs:totalDigits value=""/>
                        <xs:whiteSpace value="collapse"/>
                        <xs:pattern value="[A-Z]+"/>
                        <xs:enumeration value="AB"/>
                        <xs:enumeration value="CD"/>
                    </xs:restriction>
                </xs:simpleType>
            </xs:schema>"#,
        );

        let id = first_of(&nodes, Kind::Restriction);
        let NodeKind::Restriction(r) = &nodes.get(id).kind else {
            panic!("expected restriction");
        };
        assert_eq!(r.base, Some(TypeRef::named("xs:string")));
        assert_eq!(r.facets.min_length, Some(2));
        assert_eq!(r.facets.max_length, Some(10));
        assert_eq!(r.facets.total_digits, None);
        assert_eq!(r.facets.whitespace.as_deref(), Some("collapse"));
        assert_eq!(r.facets.pattern.as_deref(), Some("[A-Z]+"));
        assert_eq!(
            r.facets.enumerations,
            Some(vec!["AB".to_string(), "CD".to_string()])
        );
        assert!(r.attributes.is_empty());
    }

    #[test]
    fn test_empty_enumerations_are_absent() {
        let (nodes, _) = parse(
            r#"<schema><simpleType name="n"><restriction base="integer">
                <minInclusive value="1"/>
            </restriction></simpleType></schema>"#,
        );
        let id = first_of(&nodes, Kind::Restriction);
        let NodeKind::Restriction(r) = &nodes.get(id).kind else {
            panic!("expected restriction");
        };
        assert_eq!(r.facets.min_inclusive, Some(1));
        assert_eq!(r.facets.enumerations, None);
    }

    #[test]
    fn test_decimal_facet_values_are_truncated() {
        let (nodes, _) = parse(
            r#"<schema><simpleType name="rate"><restriction base="decimal">
                <minExclusive value="-0.5"/>
                <maxInclusive value="10.5"/>
                <maxLength value="many"/>
            </restriction></simpleType></schema>"#,
        );
        let id = first_of(&nodes, Kind::Restriction);
        let NodeKind::Restriction(r) = &nodes.get(id).kind else {
            panic!("expected restriction");
        };
        assert_eq!(r.facets.min_exclusive, Some(0));
        assert_eq!(r.facets.max_inclusive, Some(10));
        assert_eq!(r.facets.max_length, None);
    }

    #[test]
    fn test_restriction_under_complex_content_skips_facets() {
        let (nodes, _) = parse(
            r#"<schema>
                <complexType name="t">
                    <complexContent>
                        <restriction base="base">
                            <sequence><element name="a" type="string"/></sequence>
                            <attribute name="x" type="string"/>
                            <maxLength value="3"/>
                        </restriction>
                    </complexContent>
                </complexType>
            </schema>"#,
        );

        let id = first_of(&nodes, Kind::Restriction);
        let node = nodes.get(id);
        assert_eq!(node.parent.map(|p| nodes.kind_of(p)), Some(Kind::ComplexContent));
        let NodeKind::Restriction(r) = &node.kind else {
            panic!("expected restriction");
        };
        assert!(r.sequence.is_some());
        assert_eq!(r.attributes.len(), 1);
        assert!(r.facets.is_empty());
    }

    #[test]
    fn test_restriction_under_simple_content() {
        let (nodes, _) = parse(
            r#"<schema>
                <complexType name="price">
                    <simpleContent>
                        <restriction base="decimal">
                            <attribute name="currency" type="string"/>
                            <maxInclusive value="100"/>
                        </restriction>
                    </simpleContent>
                </complexType>
            </schema>"#,
        );

        let id = first_of(&nodes, Kind::Restriction);
        let NodeKind::Restriction(r) = &nodes.get(id).kind else {
            panic!("expected restriction");
        };
        assert_eq!(r.attributes.len(), 1);
        assert_eq!(r.facets.max_inclusive, Some(100));
    }

    #[test]
    fn test_particles_keep_declaration_order() {
        let (nodes, _) = parse(
            r#"<schema>
                <complexType name="t">
                    <sequence>
                        <element name="a" type="string"/>
                        <choice><element name="b" type="string"/></choice>
                        <group ref="g"/>
                        <any/>
                        <element name="c" type="string" minOccurs="0" maxOccurs="unbounded"/>
                    </sequence>
                </complexType>
            </schema>"#,
        );

        let id = first_of(&nodes, Kind::Sequence);
        let NodeKind::Sequence(seq) = &nodes.get(id).kind else {
            panic!("expected sequence");
        };
        let kinds: Vec<Kind> = seq.particles.iter().map(|&p| nodes.kind_of(p)).collect();
        assert_eq!(
            kinds,
            vec![Kind::Element, Kind::Choice, Kind::Group, Kind::Element]
        );

        let NodeKind::Element(c) = &nodes.get(seq.particles[3]).kind else {
            panic!("expected element");
        };
        assert_eq!(c.occurs, Occurs { min: 0, max: None });
    }

    #[test]
    fn test_parent_links_and_ids() {
        let (nodes, schema) = parse(
            r#"<schema id="s"><element name="root" id="e1"><complexType/></element></schema>"#,
        );

        let element = first_of(&nodes, Kind::Element);
        let complex = first_of(&nodes, Kind::ComplexType);
        assert_eq!(nodes.get(schema).id.as_deref(), Some("s"));
        assert_eq!(nodes.get(element).id.as_deref(), Some("e1"));
        assert_eq!(nodes.get(element).parent, Some(schema));
        assert_eq!(nodes.get(complex).parent, Some(element));
    }

    #[test]
    fn test_invalid_occurs_fails() {
        let doc = Document::from_string(
            r#"<schema><element name="a" maxOccurs="many"/></schema>"#,
        )
        .unwrap();
        assert!(parse_document(&doc, &Limits::default()).is_err());
    }

    #[test]
    fn test_node_limit() {
        let doc = Document::from_string(
            r#"<schema><element name="a"/><element name="b"/></schema>"#,
        )
        .unwrap();
        let limits = Limits::new().with_max_schema_nodes(2);
        assert!(matches!(
            parse_document(&doc, &limits),
            Err(Error::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_union_member_types() {
        let (nodes, _) = parse(
            r#"<schema><simpleType name="u">
                <union memberTypes="xs:int  sizeType"><simpleType><restriction base="string"/></simpleType></union>
            </simpleType></schema>"#,
        );
        let id = first_of(&nodes, Kind::Union);
        let NodeKind::Union(u) = &nodes.get(id).kind else {
            panic!("expected union");
        };
        assert_eq!(
            u.member_types,
            vec![TypeRef::named("xs:int"), TypeRef::named("sizeType")]
        );
        assert_eq!(u.simple_types.len(), 1);
    }
}
