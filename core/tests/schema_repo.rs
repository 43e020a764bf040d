use apiculi_core::{
    build_schema_repo, get_schema, Describe, Format, Node, Nullable, WalkResult, Walker,
};
use pretty_assertions::assert_eq;
use serde::Serialize;
use serde_json::json;

struct TestParam;

impl Describe for TestParam {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.field::<String>("ParamProp");
        })
    }
}

struct Param;

impl Describe for Param {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.field::<String>("SomeValue")
                .field::<Vec<i64>>("AnotherValue")
                .field::<TestParam>("Props");
        })
    }
}

struct Direct;

impl Describe for Direct {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.field::<TestParam>("Props")
                .field::<String>("Label")
                .field::<Vec<bool>>("Flags");
        })
    }
}

struct Wrapped;

impl Describe for Wrapped {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.field::<Option<TestParam>>("Props")
                .field::<Option<String>>("Label")
                .field::<Option<Vec<bool>>>("Flags");
        })
    }
}

#[derive(Serialize)]
struct Omittable {
    #[serde(skip_serializing_if = "String::is_empty")]
    note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    maybe: Option<String>,
    score: Nullable<i64>,
}

impl Describe for Omittable {
    fn describe(walker: &mut Walker) -> WalkResult {
        walker.object::<Self>(|o| {
            o.field::<String>("note")
                .field::<Option<String>>("maybe")
                .field::<Nullable<i64>>("score");
        })
    }
}

#[test]
fn test_walker_snapshot() {
    let node = get_schema::<Param>().unwrap();
    let leaf = |type_name: &str, format: &str, name: &str, children: serde_json::Value| {
        json!({
            "Package": "",
            "Type": type_name,
            "Format": format,
            "Name": name,
            "Description": "",
            "Example": "",
            "Children": children
        })
    };

    assert_eq!(
        serde_json::to_value(&node).unwrap(),
        json!({
            "Package": "schema_repo",
            "Type": "Param",
            "Format": "object",
            "Name": "",
            "Description": "",
            "Example": "",
            "Children": [
                leaf("String", "string", "SomeValue", json!([])),
                leaf("", "array", "AnotherValue", json!([leaf("i64", "number", "", json!([]))])),
                {
                    "Package": "schema_repo",
                    "Type": "TestParam",
                    "Format": "object",
                    "Name": "Props",
                    "Description": "",
                    "Example": "",
                    "Children": [leaf("String", "string", "ParamProp", json!([]))]
                }
            ]
        })
    );
}

#[test]
fn test_build_schema_repo() {
    let repo = build_schema_repo(&get_schema::<Param>().unwrap());

    assert_eq!(
        serde_json::to_value(&repo.repo).unwrap(),
        json!({
            "schema_repo_Param": {
                "type": "object",
                "title": "schema_repo_Param",
                "format": "Param",
                "properties": {
                    "SomeValue": {"type": "string", "format": "String"},
                    "AnotherValue": {
                        "type": "array",
                        "items": {"type": "number", "format": "i64"}
                    },
                    "Props": {"$ref": "#/components/schemas/schema_repo_TestParam"}
                },
                "required": ["SomeValue", "AnotherValue", "Props"]
            },
            "schema_repo_TestParam": {
                "type": "object",
                "title": "schema_repo_TestParam",
                "format": "TestParam",
                "properties": {
                    "ParamProp": {"type": "string", "format": "String"}
                },
                "required": ["ParamProp"]
            }
        })
    );

    assert_eq!(repo.start.title, None);
    assert_eq!(repo.start.format.as_deref(), Some("Param"));
}

#[test]
fn test_build_is_deterministic() {
    let render = || {
        let repo = build_schema_repo(&get_schema::<Param>().unwrap());
        serde_json::to_string(&repo.repo).unwrap()
    };
    let first = render();
    for _ in 0..5 {
        assert_eq!(render(), first);
    }
}

#[test]
fn test_pointer_fields_unwrap_and_are_optional() {
    let direct = build_schema_repo(&get_schema::<Direct>().unwrap()).start;
    let wrapped = build_schema_repo(&get_schema::<Wrapped>().unwrap()).start;

    assert_eq!(wrapped.properties, direct.properties);
    assert_eq!(direct.required, vec!["Props", "Label", "Flags"]);
    assert!(wrapped.required.is_empty());
}

#[test]
fn test_first_registration_wins() {
    let dup = |field: &str| Node {
        children: vec![Node {
            name: field.to_string(),
            ..Node::leaf("", "String", Format::String)
        }],
        ..Node::leaf("pkg", "Dup", Format::Object)
    };
    let root = Node {
        children: vec![
            Node {
                name: "first".into(),
                ..dup("original")
            },
            Node {
                name: "second".into(),
                ..dup("impostor")
            },
        ],
        ..Node::leaf("pkg", "Root", Format::Object)
    };

    let mut repo = build_schema_repo(&root);
    let kept = repo.get("pkg_Dup").unwrap().clone();
    assert_eq!(kept.required, vec!["original"]);

    let later = build_schema_repo(&dup("intruder"));
    repo.absorb(later.repo);
    assert_eq!(repo.get("pkg_Dup"), Some(&kept));
}

#[test]
fn test_omittable_fields_stay_required() {
    let empty = Omittable {
        note: String::new(),
        maybe: None,
        score: Nullable::default(),
    };
    assert_eq!(serde_json::to_value(&empty).unwrap(), json!({"score": null}));

    let repo = build_schema_repo(&get_schema::<Omittable>().unwrap());
    assert_eq!(repo.start.required, vec!["note"]);

    let properties = serde_json::to_value(&repo.start.properties).unwrap();
    assert_eq!(
        properties["score"],
        json!({"type": "number", "format": "Nullable<i64>"})
    );
    assert_eq!(
        properties["maybe"],
        json!({"type": "string", "format": "String"})
    );
}
