//! Schema file loading tests

use std::fs;
use std::path::PathBuf;

use recordkit_engine::{
    fields_of, parse_literal, replace, Args, FieldOrder, RecordError, SchemaError, SchemaFile,
    Value,
};
use tempfile::TempDir;

const SCENE: &str = r#"
[config]
strict_order = true

[[record]]
name = "Vector"
frozen = true
order = true

[[record.field]]
name = "x"
type = "float"
default = 0.0

[[record.field]]
name = "y"
type = "float"
default = 0.0

[[record]]
name = "Scene"

[[record.field]]
name = "title"
type = "str"

[[record.field]]
name = "objects"
default_factory = "list"

[[record.field]]
name = "frame"
default = 0
init = false
"#;

fn write_schema(content: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("records.toml");
    fs::write(&path, content).unwrap();
    (temp, path)
}

#[test]
fn test_load_and_compile_from_file() {
    let (_temp, path) = write_schema(SCENE);
    let schema = SchemaFile::from_file(&path).unwrap();
    assert!(schema.config.strict_order);
    assert_eq!(schema.config.field_order, FieldOrder::Alphabetical);

    let registry = schema.compile().unwrap();
    let vector = registry.get_by_name("Vector").unwrap();
    assert!(vector.is_frozen());

    let v = vector
        .instantiate(Args::new().with("x", parse_literal("1.5").unwrap()))
        .unwrap();
    assert_eq!(v.repr().unwrap(), "Vector(x=1.5, y=0.0)");
    assert!(matches!(v.set("x", 2.0), Err(RecordError::ImmutableField(_))));
}

#[test]
fn test_schema_records_behave_like_code_records() {
    let (_temp, path) = write_schema(SCENE);
    let registry = SchemaFile::from_file(&path).unwrap().compile().unwrap();
    let scene = registry.get_by_name("Scene").unwrap();

    let names: Vec<String> = fields_of(scene).unwrap().into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["frame", "objects", "title"]);
    assert_eq!(fields_of(scene).unwrap()[2].type_info.name, "str");

    let a = scene.instantiate(Args::new().with("title", "intro")).unwrap();
    let b = scene.instantiate(Args::new().with("title", "intro")).unwrap();
    assert!(a.equals(&b).unwrap());
    a.get("objects").unwrap().as_list().unwrap().push(Value::Int(1));
    assert!(!a.equals(&b).unwrap());

    let renamed = replace(&a, [("title", "outro")]).unwrap();
    assert_eq!(
        renamed.repr().unwrap(),
        "Scene(frame=0, objects=[1], title='outro')"
    );
    assert!(matches!(
        scene.instantiate(Args::new()),
        Err(RecordError::MissingArgument { .. })
    ));
}

#[test]
fn test_strict_config_applies_to_every_record() {
    let (_temp, path) = write_schema(
        r#"
[config]
strict_order = true

[[record]]
name = "Loose"
eq = false
order = true
"#,
    );
    let schema = SchemaFile::from_file(&path).unwrap();
    match schema.compile() {
        Err(SchemaError::Record { name, source }) => {
            assert_eq!(name, "Loose");
            assert_eq!(source, RecordError::OrderWithoutEq("Loose".to_string()));
        }
        other => panic!("expected record error, got {other:?}"),
    }
}

#[test]
fn test_missing_file() {
    let temp = TempDir::new().unwrap();
    let result = SchemaFile::from_file(&temp.path().join("absent.toml"));
    assert!(matches!(result, Err(SchemaError::Io(_))));
}

#[test]
fn test_malformed_file() {
    let (_temp, path) = write_schema("[[record]\nname = ");
    assert!(matches!(
        SchemaFile::from_file(&path),
        Err(SchemaError::Parse(_))
    ));
}
