use p7run_core::{encode_parameters, CodecError, Inputs, ParameterSlot, SchemaType};
use serde_json::{json, Value};

fn slots(v: Value) -> Vec<ParameterSlot> {
    serde_json::from_value(v).unwrap()
}

fn inputs(v: Value) -> Inputs {
    v.as_object().unwrap().clone()
}

fn run_parameters() -> Vec<ParameterSlot> {
    slots(json!([
        {
            "name": "a",
            "schemas": [{"@type": "Real"}],
            "value": {"value": 3, "unit": "m"}
        },
        {
            "name": "b",
            "schemas": [{"@type": "Integer"}],
            "value": {"value": 5}
        },
        {
            "name": "c",
            "schemas": [{"@type": "List"}],
            "value": {"value": [{"value": 0}, {"value": 0}, {"value": 0}]}
        },
        {
            "name": "d",
            "schemas": [{"@type": "Dictionary"}],
            "value": {"value": [
                {"key": "k1", "value": {"value": 0}},
                {"key": "k2", "value": {"value": 0}}
            ]}
        },
        {
            "name": "empty",
            "schemas": [{"@type": "List"}],
            "value": null
        }
    ]))
}

#[test]
fn scalar_input_overwrites_only_matching_slot() {
    let existing = run_parameters();
    let out = encode_parameters(&existing, &inputs(json!({"a": 8}))).unwrap();

    assert_eq!(out[0].value, json!({"value": 8, "unit": "m"}));
    assert_eq!(&out[1..], &existing[1..]);
}

#[test]
fn list_input_overwrites_elements_in_order() {
    let existing = run_parameters();
    let out = encode_parameters(&existing, &inputs(json!({"c": [1, 2, 3]}))).unwrap();

    assert_eq!(
        out[2].value,
        json!({"value": [{"value": 1}, {"value": 2}, {"value": 3}]})
    );
}

#[test]
fn list_input_with_wrong_length_is_size_mismatch() {
    let err = encode_parameters(&run_parameters(), &inputs(json!({"c": [1, 2]}))).unwrap_err();
    assert_eq!(
        err,
        CodecError::SizeMismatch {
            slot: "c".to_string(),
            expected: 3,
            actual: 2
        }
    );

    let err =
        encode_parameters(&run_parameters(), &inputs(json!({"c": [1, 2, 3, 4]}))).unwrap_err();
    assert!(matches!(err, CodecError::SizeMismatch { expected: 3, actual: 4, .. }));
}

#[test]
fn dictionary_input_overwrites_keys_and_values_in_caller_order() {
    let out = encode_parameters(
        &run_parameters(),
        &inputs(json!({"zeta": 1.5, "alpha": "x"})),
    )
    .unwrap();
    // unmatched names are ignored
    assert_eq!(out, run_parameters());

    let out = encode_parameters(
        &run_parameters(),
        &inputs(json!({"d": {"zeta": 1.5, "alpha": "x"}})),
    )
    .unwrap();
    assert_eq!(
        out[3].value,
        json!({"value": [
            {"key": "zeta", "value": {"value": 1.5}},
            {"key": "alpha", "value": {"value": "x"}}
        ]})
    );
}

#[test]
fn dictionary_entry_without_value_wrapper_gets_one() {
    let params = slots(json!([{
        "name": "d",
        "schemas": [{"@type": "Dictionary"}],
        "value": {"value": [
            {"key": ""},
            {"key": "", "value": 0},
            {"key": "", "value": {"value": 0, "unit": "s"}}
        ]}
    }]));

    let out = encode_parameters(&params, &inputs(json!({"d": {"p": 1, "q": 2, "r": 3}}))).unwrap();
    assert_eq!(
        out[0].value["value"],
        json!([
            {"key": "p", "value": {"value": 1}},
            {"key": "q", "value": {"value": 2}},
            {"key": "r", "value": {"value": 3, "unit": "s"}}
        ])
    );
}

#[test]
fn dictionary_input_with_wrong_length_is_size_mismatch() {
    let err =
        encode_parameters(&run_parameters(), &inputs(json!({"d": {"only": 1}}))).unwrap_err();
    assert!(matches!(err, CodecError::SizeMismatch { expected: 2, actual: 1, .. }));
}

#[test]
fn container_slot_without_template_is_unconfigured() {
    let err = encode_parameters(&run_parameters(), &inputs(json!({"empty": [1]}))).unwrap_err();
    assert_eq!(
        err,
        CodecError::UnconfiguredSlot {
            slot: "empty".to_string()
        }
    );

    let existing = slots(json!([
        {"name": "d", "schemas": [{"@type": "Dictionary"}], "value": {"value": []}}
    ]));
    let err = encode_parameters(&existing, &inputs(json!({"d": {}}))).unwrap_err();
    assert!(matches!(err, CodecError::UnconfiguredSlot { .. }));
}

#[test]
fn container_input_of_wrong_shape_is_rejected() {
    let err = encode_parameters(&run_parameters(), &inputs(json!({"c": 7}))).unwrap_err();
    assert_eq!(
        err,
        CodecError::InputShape {
            slot: "c".to_string(),
            expected: SchemaType::List
        }
    );

    let err = encode_parameters(&run_parameters(), &inputs(json!({"d": [1, 2]}))).unwrap_err();
    assert!(matches!(
        err,
        CodecError::InputShape {
            expected: SchemaType::Dictionary,
            ..
        }
    ));
}

#[test]
fn unknown_schema_tag_is_rejected_when_targeted() {
    let existing = slots(json!([
        {"name": "m", "schemas": [{"@type": "Matrix"}], "value": {"value": [[1]]}},
        {"name": "n", "schemas": [], "value": {"value": 1}}
    ]));

    let err = encode_parameters(&existing, &inputs(json!({"m": [[2]]}))).unwrap_err();
    assert_eq!(
        err,
        CodecError::UnsupportedSchema {
            slot: "m".to_string(),
            tag: "Matrix".to_string()
        }
    );
    let err = encode_parameters(&existing, &inputs(json!({"n": 2}))).unwrap_err();
    assert!(matches!(err, CodecError::MissingSchema { .. }));

    // untouched slots are never inspected
    assert!(encode_parameters(&existing, &Inputs::new()).is_ok());
}

#[test]
fn encoding_is_idempotent() {
    let existing = run_parameters();
    let i = inputs(json!({"a": 8, "c": [1, 2, 3], "d": {"p": 1, "q": 2}}));

    let once = encode_parameters(&existing, &i).unwrap();
    let twice = encode_parameters(&once, &i).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn encoding_does_not_touch_the_input_snapshot() {
    let existing = run_parameters();
    let before = existing.clone();
    let _ = encode_parameters(&existing, &inputs(json!({"a": 1, "c": [4, 5, 6]}))).unwrap();
    assert_eq!(existing, before);
}

#[test]
fn unknown_slot_fields_survive_round_trip() {
    let existing = slots(json!([
        {"name": "a", "schemas": [{"@type": "Real", "unit": "s"}], "value": {"value": 1}, "id": 42}
    ]));
    let out = encode_parameters(&existing, &inputs(json!({"a": 2}))).unwrap();
    assert_eq!(
        serde_json::to_value(&out).unwrap(),
        json!([
            {"name": "a", "schemas": [{"@type": "Real", "unit": "s"}], "value": {"value": 2}, "id": 42}
        ])
    );
}
