//! Schema node model
//!
//! Every XSD grammar construct becomes one [`SchemaNode`] in a flat arena
//! ([`SchemaNodes`]), addressed by [`NodeId`]. Children are owned through
//! forward ids; the parent link is a plain id used for context and
//! diagnostics. Type references start out as raw names and are rewritten
//! in place by the resolver.

use std::cell::Cell;
use std::fmt;

use crate::builders::BuilderId;
use crate::builtins::BuiltinType;
use crate::error::{Error, Result};

/// Handle of a node in the schema arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// References
// =============================================================================

/// Reference to a type, by name until resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// Raw name; after resolution this marks a name that matched nothing
    Named(String),
    /// Built-in type
    Builtin(BuiltinType),
    /// Named simple type
    Simple(NodeId),
    /// Named complex type
    Complex(NodeId),
}

impl TypeRef {
    /// Create an unresolved reference
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    /// Check whether the reference points at something
    pub fn is_resolved(&self) -> bool {
        !matches!(self, TypeRef::Named(_))
    }

    /// Built-in marker, if this is one
    pub fn builtin(&self) -> Option<BuiltinType> {
        match self {
            TypeRef::Builtin(b) => Some(*b),
            _ => None,
        }
    }

    /// Dereference to a schema node
    ///
    /// Built-ins have no node and yield `Ok(None)`; a name that was never
    /// resolved is an error.
    pub fn node(&self) -> Result<Option<NodeId>> {
        match self {
            TypeRef::Named(name) => Err(Error::UnresolvedReference(name.clone())),
            TypeRef::Builtin(_) => Ok(None),
            TypeRef::Simple(id) | TypeRef::Complex(id) => Ok(Some(*id)),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::Builtin(b) => write!(f, "{}", b),
            TypeRef::Simple(id) => write!(f, "simpleType {}", id),
            TypeRef::Complex(id) => write!(f, "complexType {}", id),
        }
    }
}

/// `ref` attribute of an element, attribute, group or attribute group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRef {
    /// Raw name; after resolution this marks a name that matched nothing
    Named(String),
    /// Referenced declaration
    Resolved(NodeId),
}

impl NodeRef {
    /// Dereference to a schema node
    pub fn node(&self) -> Result<NodeId> {
        match self {
            NodeRef::Named(name) => Err(Error::UnresolvedReference(name.clone())),
            NodeRef::Resolved(id) => Ok(*id),
        }
    }
}

// =============================================================================
// Node variants
// =============================================================================

/// Occurrence bounds of a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    /// minOccurs
    pub min: u64,
    /// maxOccurs, `None` when unbounded
    pub max: Option<u64>,
}

impl Default for Occurs {
    fn default() -> Self {
        Self {
            min: 1,
            max: Some(1),
        }
    }
}

impl Occurs {
    /// Check whether more than one occurrence is allowed
    pub fn is_multiple(&self) -> bool {
        self.max.map_or(true, |max| max > 1)
    }
}

/// `use` of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeUse {
    /// May be absent
    #[default]
    Optional,
    /// Must be present
    Required,
    /// Must be absent
    Prohibited,
}

/// The `<schema>` root
#[derive(Debug, Clone, Default)]
pub struct SchemaRoot {
    /// targetNamespace
    pub target_namespace: Option<String>,
    /// Top-level element declarations
    pub elements: Vec<NodeId>,
    /// Top-level complex types
    pub complex_types: Vec<NodeId>,
    /// Top-level simple types
    pub simple_types: Vec<NodeId>,
    /// Top-level attribute declarations
    pub attributes: Vec<NodeId>,
    /// Top-level attribute groups
    pub attribute_groups: Vec<NodeId>,
    /// Top-level model groups
    pub groups: Vec<NodeId>,
}

/// `<element>`
#[derive(Debug, Clone, Default)]
pub struct Element {
    /// Element name
    pub name: Option<String>,
    /// `type` attribute
    pub type_ref: Option<TypeRef>,
    /// `ref` attribute
    pub reference: Option<NodeRef>,
    /// Occurrence bounds
    pub occurs: Occurs,
    /// nillable
    pub nillable: bool,
    /// abstract
    pub is_abstract: bool,
    /// Default value
    pub default: Option<String>,
    /// Fixed value
    pub fixed: Option<String>,
    /// Inline anonymous simple type
    pub simple_type: Option<NodeId>,
    /// Inline anonymous complex type
    pub complex_type: Option<NodeId>,
}

/// `<complexType>`
#[derive(Debug, Clone, Default)]
pub struct ComplexType {
    /// Type name, absent for anonymous types
    pub name: Option<String>,
    /// mixed
    pub mixed: bool,
    /// abstract
    pub is_abstract: bool,
    /// `<simpleContent>` child
    pub simple_content: Option<NodeId>,
    /// `<complexContent>` child
    pub complex_content: Option<NodeId>,
    /// `<group>` child
    pub group: Option<NodeId>,
    /// `<choice>` child
    pub choice: Option<NodeId>,
    /// `<sequence>` child
    pub sequence: Option<NodeId>,
    /// `<all>` child
    pub all: Option<NodeId>,
    /// Attribute declarations
    pub attributes: Vec<NodeId>,
    /// Attribute group references
    pub attribute_groups: Vec<NodeId>,
}

/// `<simpleType>`
#[derive(Debug, Clone, Default)]
pub struct SimpleType {
    /// Type name, absent for anonymous types
    pub name: Option<String>,
    /// `<restriction>` child
    pub restriction: Option<NodeId>,
    /// `<list>` child
    pub list: Option<NodeId>,
    /// `<union>` child
    pub union: Option<NodeId>,
}

/// `<attribute>`
#[derive(Debug, Clone, Default)]
pub struct Attribute {
    /// Attribute name
    pub name: Option<String>,
    /// `type` attribute
    pub type_ref: Option<TypeRef>,
    /// `ref` attribute
    pub reference: Option<NodeRef>,
    /// `use` attribute
    pub usage: AttributeUse,
    /// Default value
    pub default: Option<String>,
    /// Fixed value
    pub fixed: Option<String>,
    /// Inline anonymous simple type
    pub simple_type: Option<NodeId>,
}

/// `<attributeGroup>`
#[derive(Debug, Clone, Default)]
pub struct AttributeGroup {
    /// Group name (definitions only)
    pub name: Option<String>,
    /// `ref` attribute (references only)
    pub reference: Option<NodeRef>,
    /// Attribute declarations
    pub attributes: Vec<NodeId>,
    /// Nested attribute group references
    pub attribute_groups: Vec<NodeId>,
}

/// `<group>`
#[derive(Debug, Clone, Default)]
pub struct Group {
    /// Group name (definitions only)
    pub name: Option<String>,
    /// `ref` attribute (references only)
    pub reference: Option<NodeRef>,
    /// Occurrence bounds
    pub occurs: Occurs,
    /// `<choice>` child
    pub choice: Option<NodeId>,
    /// `<sequence>` child
    pub sequence: Option<NodeId>,
    /// `<all>` child
    pub all: Option<NodeId>,
}

/// `<sequence>`, `<choice>` or `<all>`
#[derive(Debug, Clone, Default)]
pub struct ModelGroup {
    /// Occurrence bounds
    pub occurs: Occurs,
    /// Elements, groups and nested model groups in declaration order
    pub particles: Vec<NodeId>,
}

/// `<simpleContent>` or `<complexContent>`
#[derive(Debug, Clone, Default)]
pub struct Content {
    /// mixed (complexContent only)
    pub mixed: bool,
    /// `<restriction>` child
    pub restriction: Option<NodeId>,
    /// `<extension>` child
    pub extension: Option<NodeId>,
}

/// Constraining facets of a restriction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    /// minExclusive
    pub min_exclusive: Option<i64>,
    /// minInclusive
    pub min_inclusive: Option<i64>,
    /// maxExclusive
    pub max_exclusive: Option<i64>,
    /// maxInclusive
    pub max_inclusive: Option<i64>,
    /// totalDigits
    pub total_digits: Option<i64>,
    /// fractionDigits
    pub fraction_digits: Option<i64>,
    /// length
    pub length: Option<i64>,
    /// minLength
    pub min_length: Option<i64>,
    /// maxLength
    pub max_length: Option<i64>,
    /// enumeration values, `None` when there are none
    pub enumerations: Option<Vec<String>>,
    /// whiteSpace
    pub whitespace: Option<String>,
    /// pattern
    pub pattern: Option<String>,
}

impl Facets {
    /// Check whether no facet is present
    pub fn is_empty(&self) -> bool {
        *self == Facets::default()
    }
}

/// `<restriction>`
#[derive(Debug, Clone, Default)]
pub struct Restriction {
    /// `base` attribute
    pub base: Option<TypeRef>,
    /// `<group>` child (complexContent only)
    pub group: Option<NodeId>,
    /// `<choice>` child (complexContent only)
    pub choice: Option<NodeId>,
    /// `<sequence>` child (complexContent only)
    pub sequence: Option<NodeId>,
    /// Attribute declarations
    pub attributes: Vec<NodeId>,
    /// Attribute group references
    pub attribute_groups: Vec<NodeId>,
    /// Embedded simple type
    pub simple_type: Option<NodeId>,
    /// Facets (not parsed under complexContent)
    pub facets: Facets,
}

/// `<extension>`
#[derive(Debug, Clone, Default)]
pub struct Extension {
    /// `base` attribute
    pub base: Option<TypeRef>,
    /// `<group>` child
    pub group: Option<NodeId>,
    /// `<choice>` child
    pub choice: Option<NodeId>,
    /// `<sequence>` child
    pub sequence: Option<NodeId>,
    /// Attribute declarations
    pub attributes: Vec<NodeId>,
    /// Attribute group references
    pub attribute_groups: Vec<NodeId>,
}

/// `<list>`
#[derive(Debug, Clone, Default)]
pub struct List {
    /// `itemType` attribute
    pub item_type: Option<TypeRef>,
    /// Inline item simple type
    pub simple_type: Option<NodeId>,
}

/// `<union>`
#[derive(Debug, Clone, Default)]
pub struct Union {
    /// `memberTypes` attribute
    pub member_types: Vec<TypeRef>,
    /// Inline member simple types
    pub simple_types: Vec<NodeId>,
}

/// Kind of a schema node, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `<schema>`
    Schema,
    /// `<element>`
    Element,
    /// `<complexType>`
    ComplexType,
    /// `<simpleType>`
    SimpleType,
    /// `<attribute>`
    Attribute,
    /// `<attributeGroup>`
    AttributeGroup,
    /// `<group>`
    Group,
    /// `<sequence>`
    Sequence,
    /// `<choice>`
    Choice,
    /// `<all>`
    All,
    /// `<simpleContent>`
    SimpleContent,
    /// `<complexContent>`
    ComplexContent,
    /// `<restriction>`
    Restriction,
    /// `<extension>`
    Extension,
    /// `<list>`
    List,
    /// `<union>`
    Union,
}

impl Kind {
    /// XSD tag name of the construct
    pub fn tag_name(&self) -> &'static str {
        match self {
            Kind::Schema => "schema",
            Kind::Element => "element",
            Kind::ComplexType => "complexType",
            Kind::SimpleType => "simpleType",
            Kind::Attribute => "attribute",
            Kind::AttributeGroup => "attributeGroup",
            Kind::Group => "group",
            Kind::Sequence => "sequence",
            Kind::Choice => "choice",
            Kind::All => "all",
            Kind::SimpleContent => "simpleContent",
            Kind::ComplexContent => "complexContent",
            Kind::Restriction => "restriction",
            Kind::Extension => "extension",
            Kind::List => "list",
            Kind::Union => "union",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag_name())
    }
}

/// Payload of a schema node
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// `<schema>`
    Schema(SchemaRoot),
    /// `<element>`
    Element(Element),
    /// `<complexType>`
    ComplexType(ComplexType),
    /// `<simpleType>`
    SimpleType(SimpleType),
    /// `<attribute>`
    Attribute(Attribute),
    /// `<attributeGroup>`
    AttributeGroup(AttributeGroup),
    /// `<group>`
    Group(Group),
    /// `<sequence>`
    Sequence(ModelGroup),
    /// `<choice>`
    Choice(ModelGroup),
    /// `<all>`
    All(ModelGroup),
    /// `<simpleContent>`
    SimpleContent(Content),
    /// `<complexContent>`
    ComplexContent(Content),
    /// `<restriction>`
    Restriction(Restriction),
    /// `<extension>`
    Extension(Extension),
    /// `<list>`
    List(List),
    /// `<union>`
    Union(Union),
}

impl NodeKind {
    /// Empty payload for a kind
    pub fn empty(kind: Kind) -> Self {
        match kind {
            Kind::Schema => NodeKind::Schema(SchemaRoot::default()),
            Kind::Element => NodeKind::Element(Element::default()),
            Kind::ComplexType => NodeKind::ComplexType(ComplexType::default()),
            Kind::SimpleType => NodeKind::SimpleType(SimpleType::default()),
            Kind::Attribute => NodeKind::Attribute(Attribute::default()),
            Kind::AttributeGroup => NodeKind::AttributeGroup(AttributeGroup::default()),
            Kind::Group => NodeKind::Group(Group::default()),
            Kind::Sequence => NodeKind::Sequence(ModelGroup::default()),
            Kind::Choice => NodeKind::Choice(ModelGroup::default()),
            Kind::All => NodeKind::All(ModelGroup::default()),
            Kind::SimpleContent => NodeKind::SimpleContent(Content::default()),
            Kind::ComplexContent => NodeKind::ComplexContent(Content::default()),
            Kind::Restriction => NodeKind::Restriction(Restriction::default()),
            Kind::Extension => NodeKind::Extension(Extension::default()),
            Kind::List => NodeKind::List(List::default()),
            Kind::Union => NodeKind::Union(Union::default()),
        }
    }

    /// Kind of this payload
    pub fn kind(&self) -> Kind {
        match self {
            NodeKind::Schema(_) => Kind::Schema,
            NodeKind::Element(_) => Kind::Element,
            NodeKind::ComplexType(_) => Kind::ComplexType,
            NodeKind::SimpleType(_) => Kind::SimpleType,
            NodeKind::Attribute(_) => Kind::Attribute,
            NodeKind::AttributeGroup(_) => Kind::AttributeGroup,
            NodeKind::Group(_) => Kind::Group,
            NodeKind::Sequence(_) => Kind::Sequence,
            NodeKind::Choice(_) => Kind::Choice,
            NodeKind::All(_) => Kind::All,
            NodeKind::SimpleContent(_) => Kind::SimpleContent,
            NodeKind::ComplexContent(_) => Kind::ComplexContent,
            NodeKind::Restriction(_) => Kind::Restriction,
            NodeKind::Extension(_) => Kind::Extension,
            NodeKind::List(_) => Kind::List,
            NodeKind::Union(_) => Kind::Union,
        }
    }
}

// =============================================================================
// Arena
// =============================================================================

/// One node of the schema graph
#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// `id` attribute
    pub id: Option<String>,
    /// Enclosing node
    pub parent: Option<NodeId>,
    /// Variant payload
    pub kind: NodeKind,
    /// Class builder derived from this node, once computed
    pub(crate) class_builder: Cell<Option<BuilderId>>,
}

impl SchemaNode {
    /// Kind of the node
    pub fn kind(&self) -> Kind {
        self.kind.kind()
    }

    /// Declared name, for kinds that carry one
    pub fn name(&self) -> Option<&str> {
        let name = match &self.kind {
            NodeKind::Element(e) => &e.name,
            NodeKind::ComplexType(t) => &t.name,
            NodeKind::SimpleType(t) => &t.name,
            NodeKind::Attribute(a) => &a.name,
            NodeKind::AttributeGroup(g) => &g.name,
            NodeKind::Group(g) => &g.name,
            _ => return None,
        };
        name.as_deref()
    }

    /// Cached class builder, if derivation already ran
    pub fn cached_class_builder(&self) -> Option<BuilderId> {
        self.class_builder.get()
    }

    /// Structural children in declaration order
    pub fn children(&self) -> Vec<NodeId> {
        let mut c = Vec::new();
        match &self.kind {
            NodeKind::Schema(s) => {
                c.extend(&s.elements);
                c.extend(&s.complex_types);
                c.extend(&s.simple_types);
                c.extend(&s.attributes);
                c.extend(&s.attribute_groups);
                c.extend(&s.groups);
            }
            NodeKind::Element(e) => {
                c.extend(e.simple_type);
                c.extend(e.complex_type);
            }
            NodeKind::ComplexType(t) => {
                c.extend(t.simple_content);
                c.extend(t.complex_content);
                c.extend(t.group);
                c.extend(t.choice);
                c.extend(t.sequence);
                c.extend(t.all);
                c.extend(&t.attributes);
                c.extend(&t.attribute_groups);
            }
            NodeKind::SimpleType(t) => {
                c.extend(t.restriction);
                c.extend(t.list);
                c.extend(t.union);
            }
            NodeKind::Attribute(a) => c.extend(a.simple_type),
            NodeKind::AttributeGroup(g) => {
                c.extend(&g.attributes);
                c.extend(&g.attribute_groups);
            }
            NodeKind::Group(g) => {
                c.extend(g.choice);
                c.extend(g.sequence);
                c.extend(g.all);
            }
            NodeKind::Sequence(m) | NodeKind::Choice(m) | NodeKind::All(m) => {
                c.extend(&m.particles)
            }
            NodeKind::SimpleContent(content) | NodeKind::ComplexContent(content) => {
                c.extend(content.restriction);
                c.extend(content.extension);
            }
            NodeKind::Restriction(r) => {
                c.extend(r.group);
                c.extend(r.choice);
                c.extend(r.sequence);
                c.extend(&r.attributes);
                c.extend(&r.attribute_groups);
                c.extend(r.simple_type);
            }
            NodeKind::Extension(x) => {
                c.extend(x.group);
                c.extend(x.choice);
                c.extend(x.sequence);
                c.extend(&x.attributes);
                c.extend(&x.attribute_groups);
            }
            NodeKind::List(l) => c.extend(l.simple_type),
            NodeKind::Union(u) => c.extend(&u.simple_types),
        }
        c
    }

    /// One-line description for diagnostics
    pub fn info(&self) -> String {
        let mut info = self.kind().to_string();
        if let Some(id) = &self.id {
            info.push_str(&format!(" id: {}", id));
        }
        if let Some(name) = self.name() {
            info.push_str(&format!(" name: {}", name));
        }
        let base = match &self.kind {
            NodeKind::Restriction(r) => r.base.as_ref(),
            NodeKind::Extension(x) => x.base.as_ref(),
            NodeKind::Element(e) => e.type_ref.as_ref(),
            NodeKind::Attribute(a) => a.type_ref.as_ref(),
            _ => None,
        };
        if let Some(base) = base {
            info.push_str(&format!(" type: {}", base));
        }
        info
    }
}

/// Arena of schema nodes
#[derive(Debug, Clone, Default)]
pub struct SchemaNodes {
    nodes: Vec<SchemaNode>,
}

impl SchemaNodes {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its id
    pub fn insert(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SchemaNode {
            id: None,
            parent,
            kind,
            class_builder: Cell::new(None),
        });
        id
    }

    /// Get a node
    ///
    /// Ids are only handed out by this arena, so lookups never miss.
    pub fn get(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    /// Get a node mutably
    pub fn get_mut(&mut self, id: NodeId) -> &mut SchemaNode {
        &mut self.nodes[id.0]
    }

    /// Kind of a node
    pub fn kind_of(&self, id: NodeId) -> Kind {
        self.get(id).kind()
    }

    /// Iterate over all nodes with their ids
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SchemaNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// All node ids
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
