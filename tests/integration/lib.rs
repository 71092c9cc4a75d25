use std::io::Write;

use indoc::indoc;
use serde_json::json;
use similar_asserts::assert_eq;
use splitter::{
    app::Pipeline,
    config::{load_from_path, GenerateConfig},
    event::LogEvent,
    transforms::split::{SplitConfig, PARSE_FAILURE_TAG},
};

fn config_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn pipeline_from(suffix: &str, content: &str) -> Pipeline {
    let file = config_file(suffix, content);
    let config = load_from_path(file.path()).unwrap();
    Pipeline::new(config.build().unwrap())
}

fn process(pipeline: &mut Pipeline, event: serde_json::Value) -> Vec<serde_json::Value> {
    pipeline
        .process(LogEvent::try_from(event).unwrap())
        .into_events()
        .map(|event| serde_json::to_value(&event).unwrap())
        .collect()
}

#[test]
fn toml_config_splits_arrays_into_target() {
    let mut pipeline = pipeline_from(
        ".toml",
        indoc! {r#"
            [transforms.orders]
            type = "split"
            field = "orders"
            target = "order"
            merge_hash = true
            delete_field = true
        "#},
    );

    let events = process(
        &mut pipeline,
        json!({
            "customer": "ana",
            "order": {"currency": "EUR"},
            "orders": [{"id": 1}, null, {"id": 2, "currency": "USD"}],
        }),
    );

    assert_eq!(
        events,
        vec![
            json!({"customer": "ana", "order": {"currency": "EUR", "id": 1}}),
            json!({"customer": "ana", "order": {"currency": "USD", "id": 2}}),
        ]
    );
}

#[test]
fn yaml_config_with_interpolated_terminator() {
    let mut pipeline = pipeline_from(
        ".yaml",
        indoc! {r#"
            transforms:
              csv:
                type: split
                field: "{{ column }}"
                terminator: "${SPLITTER_TEST_UNSET_TERMINATOR:-,}"
        "#},
    );

    let events = process(&mut pipeline, json!({"column": "row", "row": "a,b"}));
    assert_eq!(
        events,
        vec![
            json!({"column": "row", "row": "a"}),
            json!({"column": "row", "row": "b"}),
        ]
    );
}

#[test]
fn json_config_tags_unsplittable_events() {
    let mut pipeline = pipeline_from(
        ".json",
        r#"{"transforms": {"lines": {"type": "split"}}}"#,
    );

    let events = process(&mut pipeline, json!({"message": 42}));
    assert_eq!(events, vec![json!({"message": 42, "tags": [PARSE_FAILURE_TAG]})]);
}

#[test]
fn pipeline_streams_ndjson() {
    let mut pipeline = pipeline_from(
        ".toml",
        indoc! {r#"
            [transforms.lines]
            type = "split"
        "#},
    );

    let mut output = Vec::new();
    let stats = pipeline
        .run("{\"message\":\"x\\ny\"}\n".as_bytes(), &mut output)
        .unwrap();

    assert_eq!(
        String::from_utf8(output).unwrap(),
        "{\"message\":\"x\"}\n{\"message\":\"y\"}\n"
    );
    assert_eq!(stats.events_out, 2);
}

#[test]
fn generated_config_builds() {
    let generated = toml::to_string(&SplitConfig::generate_config()).unwrap();
    let mut pipeline = pipeline_from(
        ".toml",
        &format!("[transforms.generated]\ntype = \"split\"\n{generated}"),
    );

    let events = process(&mut pipeline, json!({"items": ["a", "b"]}));
    assert_eq!(events.len(), 2);
}

#[test]
fn unknown_extension_is_rejected() {
    let file = config_file(".ini", "");
    let errors = load_from_path(file.path()).unwrap_err();
    assert_eq!(errors.len(), 1);
}
