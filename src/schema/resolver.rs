//! Reference resolution
//!
//! Runs once, after the whole document has been parsed: every named type
//! and declaration already exists in the arena, so forward references and
//! recursive type chains resolve like any other name. A name that matches
//! nothing stays a [`TypeRef::Named`] / [`NodeRef::Named`] marker.

use indexmap::IndexMap;

use crate::builtins::resolve_builtin;
use crate::names::local_name;

use super::nodes::{Kind, NodeId, NodeKind, NodeRef, SchemaNodes, TypeRef};

/// Named nodes by kind, for lookups during resolution
#[derive(Debug, Default)]
pub struct ResolutionTable {
    named: IndexMap<Kind, IndexMap<String, NodeId>>,
}

impl ResolutionTable {
    /// Index every named node that can be the target of a reference
    ///
    /// Elements and attributes are only referable when declared at the top
    /// level of the schema.
    pub fn build(nodes: &SchemaNodes) -> Self {
        let mut table = Self::default();

        for (id, node) in nodes.iter() {
            let Some(name) = node.name() else { continue };
            let kind = node.kind();

            if matches!(kind, Kind::Element | Kind::Attribute) {
                let top_level = node
                    .parent
                    .map_or(false, |p| nodes.kind_of(p) == Kind::Schema);
                if !top_level {
                    continue;
                }
            }

            let by_name = table.named.entry(kind).or_default();
            if by_name.contains_key(local_name(name)) {
                tracing::warn!(kind = %kind, name, "duplicate declaration, keeping the first");
                continue;
            }
            by_name.insert(local_name(name).to_string(), id);
        }

        table
    }

    /// Find a named node of a kind
    pub fn find(&self, kind: Kind, name: &str) -> Option<NodeId> {
        self.named
            .get(&kind)
            .and_then(|by_name| by_name.get(local_name(name)))
            .copied()
    }

    /// Resolve a type name: built-ins first, then simple types, then complex types
    pub fn resolve_type(&self, name: &str) -> TypeRef {
        if let Some(builtin) = resolve_builtin(name) {
            TypeRef::Builtin(builtin)
        } else if let Some(id) = self.find(Kind::SimpleType, name) {
            TypeRef::Simple(id)
        } else if let Some(id) = self.find(Kind::ComplexType, name) {
            TypeRef::Complex(id)
        } else {
            TypeRef::named(name)
        }
    }

    fn resolve_type_ref(&self, type_ref: &mut Option<TypeRef>, unresolved: &mut usize) {
        if let Some(r) = type_ref {
            self.resolve_type_in_place(r, unresolved);
        }
    }

    fn resolve_type_in_place(&self, type_ref: &mut TypeRef, unresolved: &mut usize) {
        if let TypeRef::Named(name) = type_ref {
            let resolved = self.resolve_type(name);
            if !resolved.is_resolved() {
                tracing::warn!(name = %name, "type reference matches no declaration");
                *unresolved += 1;
            }
            *type_ref = resolved;
        }
    }

    fn resolve_node_ref(&self, kind: Kind, node_ref: &mut Option<NodeRef>, unresolved: &mut usize) {
        if let Some(NodeRef::Named(name)) = node_ref {
            match self.find(kind, name) {
                Some(id) => *node_ref = Some(NodeRef::Resolved(id)),
                None => {
                    tracing::warn!(kind = %kind, name = %name, "reference matches no declaration");
                    *unresolved += 1;
                }
            }
        }
    }
}

/// Rewrite every reference in the arena; returns how many stayed unresolved
pub(crate) fn resolve(nodes: &mut SchemaNodes) -> usize {
    let table = ResolutionTable::build(nodes);
    let mut unresolved = 0;

    for id in nodes.ids().collect::<Vec<_>>() {
        match &mut nodes.get_mut(id).kind {
            NodeKind::Element(e) => {
                table.resolve_type_ref(&mut e.type_ref, &mut unresolved);
                table.resolve_node_ref(Kind::Element, &mut e.reference, &mut unresolved);
            }
            NodeKind::Attribute(a) => {
                table.resolve_type_ref(&mut a.type_ref, &mut unresolved);
                table.resolve_node_ref(Kind::Attribute, &mut a.reference, &mut unresolved);
            }
            NodeKind::Group(g) => {
                table.resolve_node_ref(Kind::Group, &mut g.reference, &mut unresolved)
            }
            NodeKind::AttributeGroup(g) => {
                table.resolve_node_ref(Kind::AttributeGroup, &mut g.reference, &mut unresolved)
            }
            NodeKind::Restriction(r) => table.resolve_type_ref(&mut r.base, &mut unresolved),
            NodeKind::Extension(x) => table.resolve_type_ref(&mut x.base, &mut unresolved),
            NodeKind::List(l) => table.resolve_type_ref(&mut l.item_type, &mut unresolved),
            NodeKind::Union(u) => {
                for member in &mut u.member_types {
                    table.resolve_type_in_place(member, &mut unresolved);
                }
            }
            _ => {}
        }
    }

    tracing::debug!(unresolved, "references resolved");
    unresolved
}
