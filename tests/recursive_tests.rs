//! Recursive schema tests
//!
//! Self-referential and mutually recursive types must derive finite
//! builder graphs, and rendering them must terminate.

use std::path::PathBuf;

use xsd_classgen::{BuilderId, DefinitionRenderer, Kind, Schema};

fn recursive() -> Schema {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures/recursive.xsd");
    Schema::from_file(path).unwrap()
}

#[test]
fn test_self_referential_type() {
    let mut schema = recursive();
    let node_type = schema.find(Kind::ComplexType, "nodeType").unwrap();
    let cb = schema.to_class_builder(node_type);
    let builders = schema.builders();

    let nodes = builders.get(cb).attribute_builders[1];
    assert!(builders.get(nodes).is_list());
    let item = builders.get(nodes).associated_builder.unwrap();
    assert_eq!(builders.get(item).base_builder, Some(cb));
    assert!(builders.associated(cb).contains(&cb));
}

#[test]
fn test_mutually_recursive_types() {
    let mut schema = recursive();
    let folder = schema.find(Kind::ComplexType, "folderType").unwrap();
    let file = schema.find(Kind::ComplexType, "fileType").unwrap();

    let folder_cb = schema.to_class_builder(folder);
    let file_cb = schema.to_class_builder(file);
    let builders = schema.builders();

    let parent = builders.get(file_cb).attribute_builders[0];
    assert_eq!(builders.get(parent).base_builder, Some(folder_cb));

    let files = builders.get(folder_cb).attribute_builders[0];
    let item = builders.get(files).associated_builder.unwrap();
    assert_eq!(builders.get(item).base_builder, Some(file_cb));
}

#[test]
fn test_derivation_order_does_not_matter() {
    let mut forward = recursive();
    let mut backward = recursive();

    let folder = forward.find(Kind::ComplexType, "folderType").unwrap();
    let file = forward.find(Kind::ComplexType, "fileType").unwrap();
    forward.to_class_builder(folder);
    let forward_count = forward.builders().len();

    backward.to_class_builder(file);
    backward.to_class_builder(folder);
    assert_eq!(backward.builders().len(), forward_count);
}

#[test]
fn test_self_referencing_group_is_cut() {
    let mut schema = recursive();
    let loop_type = schema.find(Kind::ComplexType, "loopType").unwrap();
    let cb = schema.to_class_builder(loop_type);
    let builders = schema.builders();

    let fields: Vec<String> = builders
        .get(cb)
        .attribute_builders
        .iter()
        .filter_map(|&f| builders.field_name(f))
        .collect();
    assert_eq!(fields, vec!["step"]);
}

/// A named group whose element is typed with a type that uses the group
const GROUP_THROUGH_TYPE: &str = r#"<schema>
  <complexType name="outline"><group ref="sections"/></complexType>
  <group name="sections">
    <sequence><element name="section" type="sectionType"/></sequence>
  </group>
  <complexType name="sectionType"><group ref="sections"/></complexType>
</schema>"#;

fn field_names(schema: &Schema, cb: BuilderId) -> Vec<String> {
    let builders = schema.builders();
    builders
        .get(cb)
        .attribute_builders
        .iter()
        .filter_map(|&f| builders.field_name(f))
        .collect()
}

#[test]
fn test_group_recursion_through_a_type_keeps_fields() {
    let mut schema = Schema::from_str(GROUP_THROUGH_TYPE).unwrap();
    let outline = schema.find(Kind::ComplexType, "outline").unwrap();
    let section = schema.find(Kind::ComplexType, "sectionType").unwrap();

    let outline_cb = schema.to_class_builder(outline);
    let section_cb = schema.to_class_builder(section);
    assert_eq!(field_names(&schema, outline_cb), vec!["section"]);
    assert_eq!(field_names(&schema, section_cb), vec!["section"]);
}

#[test]
fn test_group_recursion_is_order_independent() {
    let mut direct = Schema::from_str(GROUP_THROUGH_TYPE).unwrap();
    let section = direct.find(Kind::ComplexType, "sectionType").unwrap();
    let direct_cb = direct.to_class_builder(section);

    let mut via_outline = Schema::from_str(GROUP_THROUGH_TYPE).unwrap();
    let outline = via_outline.find(Kind::ComplexType, "outline").unwrap();
    via_outline.to_class_builder(outline);
    let section = via_outline.find(Kind::ComplexType, "sectionType").unwrap();
    let via_outline_cb = via_outline.to_class_builder(section);

    assert_eq!(
        field_names(&direct, direct_cb),
        field_names(&via_outline, via_outline_cb)
    );

    // The element's type is the section type itself
    let builders = via_outline.builders();
    let field = builders.get(via_outline_cb).attribute_builders[0];
    assert_eq!(builders.get(field).base_builder, Some(via_outline_cb));
}

#[test]
fn test_clone_of_cyclic_graph_is_closed() {
    let mut schema = recursive();
    let node_type = schema.find(Kind::ComplexType, "nodeType").unwrap();
    let cb = schema.to_class_builder(node_type);

    let before = schema.builders().len();
    let reachable = schema.builders().associated(cb).len();
    let copy = schema.builders_mut().clone_graph(cb);
    let builders = schema.builders();

    // The root is part of its own closure here, so nothing extra is copied
    assert_eq!(builders.len(), before + reachable);
    let nodes = builders.get(copy).attribute_builders[1];
    let item = builders.get(nodes).associated_builder.unwrap();
    assert_eq!(builders.get(item).base_builder, Some(copy));
}

#[test]
fn test_rendering_terminates() {
    let mut schema = recursive();
    let definitions = schema.render_classes(&DefinitionRenderer::default());

    let names: Vec<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
    for expected in ["Tree", "NodeType", "Node", "Folder", "FolderType", "FileType", "LoopType"] {
        assert!(names.contains(&expected), "missing {}", expected);
    }
}
