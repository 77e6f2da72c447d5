//! Instance document tests
//!
//! Build objects from XML instances against the library schema and
//! validate them with the rendered class definitions.

use std::path::PathBuf;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use xsd_classgen::{
    DefinitionRenderer, DefinitionSet, Document, Error, Instance, InstanceRenderer, ObjectGraph,
    Schema,
};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn load(instance: &str) -> (Schema, DefinitionSet, Rc<Instance>) {
    let mut schema = Schema::from_file(fixture("library.xsd")).unwrap();
    let definitions: DefinitionSet = schema
        .render_classes(&DefinitionRenderer::default())
        .into_iter()
        .collect();

    let doc = Document::from_file(fixture(instance)).unwrap();
    let mut objects = ObjectGraph::from_instance(&doc, &schema).unwrap();
    let root = objects.build(&InstanceRenderer, &schema).unwrap().unwrap();
    (schema, definitions, root)
}

#[test]
fn test_objects_mirror_the_document() {
    let (_, _, library) = load("library.xml");

    assert_eq!(library.class_name, "LibraryType");
    assert_eq!(library.attribute("name"), Some("City Library"));

    let books = library.field_all("book");
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].class_name, "BookType");
    assert_eq!(books[0].attribute("id"), Some("b1"));
    assert_eq!(books[0].field("title").unwrap().text(), "Dune");
    assert_eq!(books[0].field("title").unwrap().class_name, "TitleType");
    assert_eq!(books[1].field("issn").unwrap().class_name, "string");
    assert!(!books[1].has_field("format"));
}

#[test]
fn test_graph_slots_are_filled() {
    let schema = Schema::from_file(fixture("library.xsd")).unwrap();
    let doc = Document::from_file(fixture("library.xml")).unwrap();
    let mut objects = ObjectGraph::from_instance(&doc, &schema).unwrap();
    objects.build(&InstanceRenderer, &schema).unwrap();

    for id in objects.post_order() {
        assert!(objects.get(id).obj.is_some());
    }
    let root = objects.root().unwrap();
    assert_eq!(objects.get(root).children.len(), 2);
}

#[test]
fn test_valid_instance() {
    let (_, definitions, library) = load("library.xml");
    assert_eq!(definitions.validate(&library), Vec::<String>::new());
}

#[test]
fn test_invalid_instance_reports_every_failure() {
    let (_, definitions, library) = load("invalid_library.xml");

    assert_eq!(
        definitions.validate(&library),
        vec![
            "LibraryType::book",
            "BookType::title",
            "TitleType: max_length(10)",
            "BookType::year",
            "YearType: min_inclusive(1450)",
            "BookType::price",
            "PriceType: fraction_digits(2)",
            "BookType::format",
            "FormatType: enumeration(hardcover|paperback)",
            "BookType: choice(isbn|issn)",
        ]
    );
}

#[test]
fn test_undeclared_element() {
    let schema = Schema::from_file(fixture("library.xsd")).unwrap();
    let doc = Document::from_string(r#"<library name="x"><magazine/></library>"#).unwrap();

    let err = ObjectGraph::<Rc<Instance>>::from_instance(&doc, &schema).unwrap_err();
    assert!(matches!(err, Error::UndeclaredElement(ref tag) if tag == "magazine"));
    assert_eq!(err.to_string(), "element 'magazine' is not declared in the schema");
}

#[test]
fn test_instance_json() {
    let (_, _, library) = load("library.xml");
    let json = serde_json::to_value(library.as_ref()).unwrap();

    assert_eq!(json["class_name"], "LibraryType");
    assert_eq!(json["fields"]["book"][1]["fields"]["year"][0]["content"], "1869");
}
