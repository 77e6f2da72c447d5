//! XSD schemas
//!
//! A [`Schema`] owns the parsed node arena of one XSD document and the
//! class builders derived from it. Loading runs the two phases back to
//! back: structural parsing into [`SchemaNodes`], then one resolution pass
//! over every type and declaration reference. Class builders are derived
//! on demand and memoized on the nodes.
//!
//! ```rust,ignore
//! use xsd_classgen::{DefinitionRenderer, Schema};
//!
//! let mut schema = Schema::from_file("library.xsd")?;
//! for definition in schema.render_classes(&DefinitionRenderer::default()) {
//!     println!("{}", definition);
//! }
//! ```

pub mod nodes;
pub(crate) mod parsing;
pub mod resolver;

mod derive;

pub use nodes::{
    Attribute, AttributeGroup, AttributeUse, ComplexType, Content, Element, Extension, Facets,
    Group, Kind, List, ModelGroup, NodeId, NodeKind, NodeRef, Occurs, Restriction, SchemaNode,
    SchemaNodes, SchemaRoot, SimpleType, TypeRef, Union,
};
pub use resolver::ResolutionTable;

use std::path::Path;

use indexmap::{IndexMap, IndexSet};

use crate::builders::{BuilderId, ClassBuilders};
use crate::documents::Document;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::names::{camelize, local_name};
use crate::renderers::ClassRenderer;

use derive::Deriver;

/// A parsed and resolved XSD document
#[derive(Debug, Clone)]
pub struct Schema {
    nodes: SchemaNodes,
    root: NodeId,
    builders: ClassBuilders,
    /// Element declarations by local name, top-level ones first
    declarations: IndexMap<String, NodeId>,
}

impl Schema {
    /// Parse a schema from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(xsd: &str) -> Result<Self> {
        Self::from_str_with_limits(xsd, &Limits::default())
    }

    /// Parse a schema from a string with custom limits
    pub fn from_str_with_limits(xsd: &str, limits: &Limits) -> Result<Self> {
        let doc = Document::parse_with_limits(xsd.as_bytes(), limits)?;
        Self::from_document_with_limits(&doc, limits)
    }

    /// Load a schema from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading schema");
        let doc = Document::from_file(path)?;
        Self::from_document(&doc)
    }

    /// Build a schema from an already parsed document
    pub fn from_document(doc: &Document) -> Result<Self> {
        Self::from_document_with_limits(doc, &Limits::default())
    }

    /// Build a schema from an already parsed document with custom limits
    pub fn from_document_with_limits(doc: &Document, limits: &Limits) -> Result<Self> {
        let (mut nodes, root) = parsing::parse_document(doc, limits)?;
        let unresolved = resolver::resolve(&mut nodes);
        if unresolved > 0 {
            tracing::warn!(unresolved, "schema has unresolved references");
        }

        let declarations = collect_declarations(&nodes, root);
        Ok(Self {
            nodes,
            root,
            builders: ClassBuilders::new(),
            declarations,
        })
    }

    /// Node arena
    pub fn nodes(&self) -> &SchemaNodes {
        &self.nodes
    }

    /// The `<schema>` node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// targetNamespace of the document
    pub fn target_namespace(&self) -> Option<&str> {
        match &self.nodes.get(self.root).kind {
            NodeKind::Schema(s) => s.target_namespace.as_deref(),
            _ => None,
        }
    }

    /// Builders derived so far
    pub fn builders(&self) -> &ClassBuilders {
        &self.builders
    }

    /// Mutable builder arena, for cloning and editing derived builders
    pub fn builders_mut(&mut self) -> &mut ClassBuilders {
        &mut self.builders
    }

    /// Class builder of a node, derived on first use
    pub fn to_class_builder(&mut self, id: NodeId) -> BuilderId {
        Deriver::new(&self.nodes, &mut self.builders).to_class_builder(id)
    }

    /// Field builders of a node, in declaration order
    ///
    /// Model groups and attribute groups yield their members; any other
    /// node yields its own builder.
    pub fn to_class_builders(&mut self, id: NodeId) -> Vec<BuilderId> {
        Deriver::new(&self.nodes, &mut self.builders).to_class_builders(id)
    }

    /// Builders of every top-level element, complex type and simple type
    pub fn class_builders(&mut self) -> Vec<BuilderId> {
        self.to_class_builders(self.root)
    }

    /// Top-level element names mapped to their builders
    pub fn tags(&mut self) -> IndexMap<String, BuilderId> {
        let elements = match &self.nodes.get(self.root).kind {
            NodeKind::Schema(s) => s.elements.clone(),
            _ => Vec::new(),
        };

        let mut tags = IndexMap::new();
        for element in elements {
            let Some(name) = self.nodes.get(element).name().map(str::to_string) else {
                continue;
            };
            let builder = self.to_class_builder(element);
            tags.insert(name, builder);
        }
        tags
    }

    /// Render every top-level builder and everything reachable from it
    ///
    /// Each builder is rendered once; builders the renderer declines are
    /// skipped.
    pub fn render_classes<R: ClassRenderer>(&mut self, renderer: &R) -> Vec<R::Output> {
        let mut reachable = IndexSet::new();
        for root in self.class_builders() {
            reachable.insert(root);
            reachable.extend(self.builders.associated(root));
        }

        tracing::debug!(builders = reachable.len(), "rendering class builders");
        reachable
            .into_iter()
            .filter_map(|id| renderer.render(&self.builders, id))
            .collect()
    }

    /// Find a named node of a kind
    pub fn find(&self, kind: Kind, name: &str) -> Option<NodeId> {
        let name = local_name(name);
        self.nodes.ids().find(|&id| {
            let node = self.nodes.get(id);
            node.kind() == kind && node.name().map(local_name) == Some(name)
        })
    }

    /// Element declaration for an instance tag
    ///
    /// Top-level declarations win over local ones of the same name.
    pub fn element_declaration(&self, tag: &str) -> Option<NodeId> {
        self.declarations.get(local_name(tag)).copied()
    }

    /// Class name an instance element of `tag` renders as
    ///
    /// The declared type's class name, else the built-in type name, else
    /// the camel-cased element name.
    pub fn class_name_for_element(&self, tag: &str) -> Result<String> {
        let declaration = self
            .element_declaration(tag)
            .ok_or_else(|| Error::UndeclaredElement(tag.to_string()))?;

        let NodeKind::Element(element) = &self.nodes.get(declaration).kind else {
            return Err(Error::Value(format!("{} is not an element", declaration)));
        };

        let class_name = match &element.type_ref {
            Some(TypeRef::Builtin(builtin)) => builtin.name().to_string(),
            Some(TypeRef::Simple(t)) | Some(TypeRef::Complex(t)) => {
                match self.nodes.get(*t).name() {
                    Some(name) => camelize(name),
                    None => camelize(tag),
                }
            }
            Some(TypeRef::Named(_)) | None => camelize(element.name.as_deref().unwrap_or(tag)),
        };
        Ok(class_name)
    }

    /// Every reference name that matched no declaration
    pub fn unresolved(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut type_name = |type_ref: Option<&TypeRef>| {
            if let Some(TypeRef::Named(name)) = type_ref {
                names.push(name.clone());
            }
        };

        for (_, node) in self.nodes.iter() {
            match &node.kind {
                NodeKind::Element(e) => type_name(e.type_ref.as_ref()),
                NodeKind::Attribute(a) => type_name(a.type_ref.as_ref()),
                NodeKind::Restriction(r) => type_name(r.base.as_ref()),
                NodeKind::Extension(x) => type_name(x.base.as_ref()),
                NodeKind::List(l) => type_name(l.item_type.as_ref()),
                NodeKind::Union(u) => u.member_types.iter().for_each(|m| type_name(Some(m))),
                _ => {}
            }
        }

        for (_, node) in self.nodes.iter() {
            let reference = match &node.kind {
                NodeKind::Element(e) => e.reference.as_ref(),
                NodeKind::Attribute(a) => a.reference.as_ref(),
                NodeKind::Group(g) => g.reference.as_ref(),
                NodeKind::AttributeGroup(g) => g.reference.as_ref(),
                _ => None,
            };
            if let Some(NodeRef::Named(name)) = reference {
                names.push(name.clone());
            }
        }
        names
    }
}

/// Named element declarations, top-level first, first declaration wins
fn collect_declarations(nodes: &SchemaNodes, root: NodeId) -> IndexMap<String, NodeId> {
    let mut declarations = IndexMap::new();

    if let NodeKind::Schema(s) = &nodes.get(root).kind {
        for &element in &s.elements {
            if let Some(name) = nodes.get(element).name() {
                declarations
                    .entry(local_name(name).to_string())
                    .or_insert(element);
            }
        }
    }

    for (id, node) in nodes.iter() {
        if let (Kind::Element, Some(name)) = (node.kind(), node.name()) {
            declarations.entry(local_name(name).to_string()).or_insert(id);
        }
    }
    declarations
}
