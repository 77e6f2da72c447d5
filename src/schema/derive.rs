//! Class builder derivation
//!
//! Turns resolved schema nodes into class builders. Derivation is lazy and
//! memoized on the node: the builder id is cached before any child is
//! derived, so a type that reaches itself again (directly or through other
//! types) gets the cached builder back instead of recursing forever.
//!
//! Single-valued constructs (types, elements, attributes, restrictions ...)
//! map to one builder. Model groups and attribute groups map to a list of
//! field builders that the enclosing construct appends in declaration
//! order.

use std::collections::HashSet;

use crate::builders::{BuilderId, ClassBuilders, ClassTarget, Validation};
use crate::builtins::BuiltinType;
use crate::names::camelize;

use super::nodes::{
    AttributeUse, Facets, Kind, NodeId, NodeKind, NodeRef, Occurs, SchemaNodes, TypeRef,
};

/// Derivation pass over one schema
pub(crate) struct Deriver<'a> {
    nodes: &'a SchemaNodes,
    builders: &'a mut ClassBuilders,
    /// Group expansions in progress since the last memoized node, to stop
    /// groups that refer to themselves
    expanding: HashSet<NodeId>,
}

impl<'a> Deriver<'a> {
    pub(crate) fn new(nodes: &'a SchemaNodes, builders: &'a mut ClassBuilders) -> Self {
        Self {
            nodes,
            builders,
            expanding: HashSet::new(),
        }
    }

    /// Builder of a node, derived on first use
    pub(crate) fn to_class_builder(&mut self, id: NodeId) -> BuilderId {
        self.derive(id, None)
    }

    /// Field builders of a node, in declaration order
    pub(crate) fn to_class_builders(&mut self, id: NodeId) -> Vec<BuilderId> {
        let mut choices = Vec::new();
        self.derive_list(id, &mut choices)
    }

    /// Derive `id`, filling `target` instead of a new builder when given
    ///
    /// Returns the cached builder when the node was derived before; in that
    /// case `target` is left untouched.
    fn derive(&mut self, id: NodeId, target: Option<BuilderId>) -> BuilderId {
        if let Some(cached) = self.nodes.get(id).class_builder.get() {
            return cached;
        }

        // Memoization cuts cycles through this node, so group expansions
        // above it do not count as re-entrant below it
        let outer = std::mem::take(&mut self.expanding);
        let cb = self.derive_uncached(id, target);
        self.expanding = outer;
        cb
    }

    fn derive_uncached(&mut self, id: NodeId, target: Option<BuilderId>) -> BuilderId {
        let nodes = self.nodes;
        let node = nodes.get(id);

        match &node.kind {
            NodeKind::Element(e) => {
                if let Some(reference) = &e.reference {
                    return self.derive_element_ref(id, reference, e.occurs, target);
                }
            }
            NodeKind::Attribute(a) => {
                if let Some(NodeRef::Resolved(referenced)) = &a.reference {
                    let cb = self.to_class_builder(*referenced);
                    node.class_builder.set(Some(cb));
                    return cb;
                }
            }
            _ => {}
        }

        let cb = target.unwrap_or_else(|| self.builders.create());
        node.class_builder.set(Some(cb));
        tracing::trace!(node = %node.info(), builder = %cb, "deriving class builder");

        match &node.kind {
            NodeKind::Element(e) => {
                let item = if e.occurs.is_multiple() {
                    self.list_wrapper(cb, e.name.as_deref())
                } else {
                    cb
                };
                self.fill_declaration(item, e.name.as_deref(), e.type_ref.as_ref());
                if let Some(complex) = e.complex_type {
                    self.derive(complex, Some(item));
                }
                if let Some(simple) = e.simple_type {
                    self.derive(simple, Some(item));
                }
            }
            NodeKind::Attribute(a) => {
                self.fill_declaration(cb, a.name.as_deref(), a.type_ref.as_ref());
                if let Some(simple) = a.simple_type {
                    self.derive(simple, Some(cb));
                }
            }
            NodeKind::ComplexType(t) => {
                if let Some(name) = &t.name {
                    self.builders.get_mut(cb).klass_name = Some(camelize(name));
                }
                for content in t.simple_content.into_iter().chain(t.complex_content) {
                    self.derive(content, Some(cb));
                }
                self.append_model(cb, t.group, t.choice, t.sequence);
                if let Some(all) = t.all {
                    self.append_list(cb, all);
                }
                self.append_attributes(cb, &t.attributes, &t.attribute_groups);
            }
            NodeKind::SimpleType(t) => {
                if let Some(name) = &t.name {
                    self.builders.get_mut(cb).klass_name = Some(camelize(name));
                }
                if let Some(restriction) = t.restriction {
                    self.derive(restriction, Some(cb));
                }
                if let Some(list) = t.list {
                    self.derive(list, Some(cb));
                }
                if t.union.is_some() {
                    self.builders.set_base(cb, BuiltinType::AnySimpleType);
                }
            }
            NodeKind::SimpleContent(c) | NodeKind::ComplexContent(c) => {
                for derivation in c.restriction.into_iter().chain(c.extension) {
                    self.derive(derivation, Some(cb));
                }
            }
            NodeKind::Restriction(r) => {
                self.set_base(cb, r.base.as_ref());
                self.append_model(cb, r.group, r.choice, r.sequence);
                self.append_attributes(cb, &r.attributes, &r.attribute_groups);
                if let Some(simple) = r.simple_type {
                    let st = self.to_class_builder(simple);
                    self.builders.push_attribute(cb, st);
                }
                for validation in facet_validations(&r.facets) {
                    self.builders.push_validation(cb, validation);
                }
            }
            NodeKind::Extension(x) => {
                self.set_base(cb, x.base.as_ref());
                self.append_model(cb, x.group, x.choice, x.sequence);
                self.append_attributes(cb, &x.attributes, &x.attribute_groups);
            }
            NodeKind::List(l) => {
                let item = match (&l.item_type, l.simple_type) {
                    (Some(item_type), _) => self.type_builder(item_type),
                    (None, Some(simple)) => Some(self.to_class_builder(simple)),
                    (None, None) => None,
                };
                let builder = self.builders.get_mut(cb);
                builder.klass = Some(ClassTarget::List);
                builder.associated_builder = item;
            }
            NodeKind::Union(_) => {
                self.builders.set_base(cb, BuiltinType::AnySimpleType);
            }
            NodeKind::Schema(_)
            | NodeKind::Group(_)
            | NodeKind::AttributeGroup(_)
            | NodeKind::Sequence(_)
            | NodeKind::Choice(_)
            | NodeKind::All(_) => {
                // Containers without a type of their own: collect their fields
                let mut choices = Vec::new();
                let fields = self.derive_list(id, &mut choices);
                self.builders.get_mut(cb).attribute_builders.extend(fields);
                for options in choices {
                    self.builders.push_validation(cb, Validation::Choice(options));
                }
            }
        }

        cb
    }

    fn derive_element_ref(
        &mut self,
        id: NodeId,
        reference: &NodeRef,
        occurs: Occurs,
        target: Option<BuilderId>,
    ) -> BuilderId {
        let referenced = match reference {
            NodeRef::Resolved(referenced) => *referenced,
            NodeRef::Named(name) => {
                tracing::warn!(name = %name, "element reference is unresolved");
                let cb = target.unwrap_or_else(|| self.builders.create());
                self.builders.get_mut(cb).attribute_name = Some(name.clone());
                self.nodes.get(id).class_builder.set(Some(cb));
                return cb;
            }
        };

        if occurs.is_multiple() {
            let cb = target.unwrap_or_else(|| self.builders.create());
            self.nodes.get(id).class_builder.set(Some(cb));
            let name = self.nodes.get(referenced).name().map(str::to_string);
            let item = self.to_class_builder(referenced);
            let wrapper = self.builders.get_mut(cb);
            wrapper.klass = Some(ClassTarget::List);
            wrapper.attribute_name = name;
            wrapper.associated_builder = Some(item);
            return cb;
        }

        let cb = self.to_class_builder(referenced);
        self.nodes.get(id).class_builder.set(Some(cb));
        cb
    }

    /// Turn `cb` into a list wrapper and return the new item builder
    fn list_wrapper(&mut self, cb: BuilderId, name: Option<&str>) -> BuilderId {
        let item = self.builders.create();
        let wrapper = self.builders.get_mut(cb);
        wrapper.klass = Some(ClassTarget::List);
        wrapper.attribute_name = name.map(str::to_string);
        wrapper.associated_builder = Some(item);
        item
    }

    /// Name and type of an element or attribute declaration
    fn fill_declaration(&mut self, cb: BuilderId, name: Option<&str>, type_ref: Option<&TypeRef>) {
        {
            let builder = self.builders.get_mut(cb);
            builder.klass_name = name.map(camelize);
            builder.attribute_name = name.map(str::to_string);
        }

        match type_ref {
            Some(TypeRef::Builtin(builtin)) => {
                self.builders.get_mut(cb).klass = Some(ClassTarget::Builtin(*builtin));
            }
            Some(TypeRef::Simple(t)) | Some(TypeRef::Complex(t)) => {
                let base = self.to_class_builder(*t);
                self.builders.get_mut(cb).base_builder = Some(base);
            }
            Some(TypeRef::Named(unresolved)) => {
                tracing::warn!(
                    name = ?name,
                    type_name = %unresolved,
                    "declaration type is unresolved"
                );
            }
            None => {}
        }
    }

    fn set_base(&mut self, cb: BuilderId, base: Option<&TypeRef>) {
        match base {
            Some(TypeRef::Builtin(builtin)) => self.builders.set_base(cb, *builtin),
            Some(TypeRef::Simple(t)) | Some(TypeRef::Complex(t)) => {
                let base = self.to_class_builder(*t);
                self.builders.get_mut(cb).base_builder = Some(base);
            }
            Some(TypeRef::Named(unresolved)) => {
                tracing::warn!(base = %unresolved, "base type is unresolved");
            }
            None => {}
        }
    }

    /// Builder standing for a referenced type
    fn type_builder(&mut self, type_ref: &TypeRef) -> Option<BuilderId> {
        match type_ref {
            TypeRef::Builtin(builtin) => Some(self.builders.create_builtin(*builtin)),
            TypeRef::Simple(t) | TypeRef::Complex(t) => Some(self.to_class_builder(*t)),
            TypeRef::Named(unresolved) => {
                tracing::warn!(type_name = %unresolved, "item type is unresolved");
                None
            }
        }
    }

    /// Append group, choice and sequence fields, in that order
    fn append_model(
        &mut self,
        cb: BuilderId,
        group: Option<NodeId>,
        choice: Option<NodeId>,
        sequence: Option<NodeId>,
    ) {
        for particle in group.into_iter().chain(choice).chain(sequence) {
            self.append_list(cb, particle);
        }
    }

    fn append_list(&mut self, cb: BuilderId, id: NodeId) {
        let mut choices = Vec::new();
        let fields = self.derive_list(id, &mut choices);
        self.builders.get_mut(cb).attribute_builders.extend(fields);
        for options in choices {
            self.builders.push_validation(cb, Validation::Choice(options));
        }
    }

    fn append_attributes(&mut self, cb: BuilderId, attributes: &[NodeId], groups: &[NodeId]) {
        for &attribute in attributes {
            if self.is_prohibited(attribute) {
                continue;
            }
            let ab = self.to_class_builder(attribute);
            self.builders.push_attribute(cb, ab);
        }
        for &group in groups {
            let fields = self.to_class_builders(group);
            self.builders.get_mut(cb).attribute_builders.extend(fields);
        }
    }

    fn is_prohibited(&self, attribute: NodeId) -> bool {
        matches!(
            &self.nodes.get(attribute).kind,
            NodeKind::Attribute(a) if a.usage == AttributeUse::Prohibited
        )
    }

    /// Field builders of a node; exactly-once choices record their option
    /// field names in `choices`
    fn derive_list(&mut self, id: NodeId, choices: &mut Vec<Vec<String>>) -> Vec<BuilderId> {
        let nodes = self.nodes;
        let node = nodes.get(id);
        if !self.expanding.insert(id) {
            tracing::warn!(node = %node.info(), "group refers to itself, ignoring the inner use");
            return Vec::new();
        }

        let mut fields = Vec::new();
        match &node.kind {
            NodeKind::Schema(s) => {
                for &top in s.elements.iter().chain(&s.complex_types).chain(&s.simple_types) {
                    fields.push(self.to_class_builder(top));
                }
            }
            NodeKind::Group(g) => match &g.reference {
                Some(NodeRef::Resolved(referenced)) => {
                    fields.extend(self.derive_list(*referenced, choices));
                }
                Some(NodeRef::Named(name)) => {
                    tracing::warn!(name = %name, "group reference is unresolved");
                }
                None => {
                    for particle in g.choice.into_iter().chain(g.sequence).chain(g.all) {
                        fields.extend(self.derive_list(particle, choices));
                    }
                }
            },
            NodeKind::AttributeGroup(g) => match &g.reference {
                Some(NodeRef::Resolved(referenced)) => {
                    fields.extend(self.derive_list(*referenced, choices));
                }
                Some(NodeRef::Named(name)) => {
                    tracing::warn!(name = %name, "attribute group reference is unresolved");
                }
                None => {
                    for &attribute in &g.attributes {
                        if !self.is_prohibited(attribute) {
                            fields.push(self.to_class_builder(attribute));
                        }
                    }
                    for &nested in &g.attribute_groups {
                        fields.extend(self.derive_list(nested, choices));
                    }
                }
            },
            NodeKind::Sequence(m) | NodeKind::All(m) => {
                for &particle in &m.particles {
                    fields.extend(self.particle_fields(particle, choices));
                }
            }
            NodeKind::Choice(m) => {
                for &particle in &m.particles {
                    fields.extend(self.particle_fields(particle, choices));
                }
                if m.occurs == Occurs::default() {
                    choices.push(
                        fields
                            .iter()
                            .filter_map(|&f| self.builders.field_name(f))
                            .collect(),
                    );
                }
            }
            _ => fields.push(self.to_class_builder(id)),
        }

        self.expanding.remove(&id);
        fields
    }

    fn particle_fields(
        &mut self,
        particle: NodeId,
        choices: &mut Vec<Vec<String>>,
    ) -> Vec<BuilderId> {
        match self.nodes.kind_of(particle) {
            Kind::Element => vec![self.to_class_builder(particle)],
            _ => self.derive_list(particle, choices),
        }
    }
}

/// Validation rules for the facets present, in facet order
pub(crate) fn facet_validations(facets: &Facets) -> Vec<Validation> {
    let mut validations = Vec::new();
    let numeric: [(Option<i64>, fn(i64) -> Validation); 9] = [
        (facets.min_exclusive, Validation::MinExclusive),
        (facets.min_inclusive, Validation::MinInclusive),
        (facets.max_exclusive, Validation::MaxExclusive),
        (facets.max_inclusive, Validation::MaxInclusive),
        (facets.total_digits, Validation::TotalDigits),
        (facets.fraction_digits, Validation::FractionDigits),
        (facets.length, Validation::Length),
        (facets.min_length, Validation::MinLength),
        (facets.max_length, Validation::MaxLength),
    ];
    for (value, rule) in numeric {
        if let Some(value) = value {
            validations.push(rule(value));
        }
    }

    if let Some(values) = &facets.enumerations {
        validations.push(Validation::Enumerations(values.clone()));
    }
    if let Some(whitespace) = &facets.whitespace {
        validations.push(Validation::Whitespace(whitespace.clone()));
    }
    if let Some(pattern) = &facets.pattern {
        validations.push(Validation::Pattern(pattern.clone()));
    }
    validations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_validations_order() {
        let facets = Facets {
            max_length: Some(10),
            min_inclusive: Some(1),
            pattern: Some("[a-z]+".to_string()),
            enumerations: Some(vec!["a".to_string()]),
            ..Default::default()
        };

        let kinds: Vec<&str> = facet_validations(&facets).iter().map(|v| v.kind()).collect();
        assert_eq!(kinds, vec!["min_inclusive", "max_length", "enumerations", "pattern"]);
    }

    #[test]
    fn test_no_facets_no_validations() {
        assert!(facet_validations(&Facets::default()).is_empty());
    }
}
