//! Tests for payload validation.

use rstest::{fixture, rstest};
use serde_json::{Map, Value, json};

use super::*;
use crate::domain::forms::field::{FieldOption, FieldType};

fn field(name: &str, field_type: FieldType) -> FieldDefinition {
    FieldDefinition {
        name: name.to_owned(),
        label: name.to_owned(),
        field_type,
        placeholder: String::new(),
        help_text: String::new(),
        required: false,
        order: 0,
        options: Vec::new(),
        rules: ValidationRules::None,
    }
}

fn with_rules(mut definition: FieldDefinition, raw: Value) -> FieldDefinition {
    let Value::Object(map) = raw else {
        panic!("rules must be an object");
    };
    definition.rules =
        ValidationRules::parse(definition.field_type, &map).expect("rules should parse");
    definition
}

fn payload(value: Value) -> Map<String, Value> {
    payload_object(value).expect("object payload")
}

#[fixture]
fn colours() -> FieldDefinition {
    let mut definition = field("colours", FieldType::Checkbox);
    definition.options = ["red", "green", "blue"]
        .into_iter()
        .map(FieldOption::plain)
        .collect();
    definition
}

#[rstest]
fn table_covers_every_field_type() {
    assert_eq!(VALIDATORS.len(), FieldType::ALL.len());
}

#[rstest]
fn missing_required_fields_are_all_reported_in_order() {
    let mut email = field("email", FieldType::Email);
    email.required = true;
    let mut age = field("age", FieldType::Number);
    age.required = true;

    let errors = validate_payload(&[email, age], &Map::new()).expect_err("both missing");

    assert_eq!(errors.fields().collect::<Vec<_>>(), ["email", "age"]);
    assert_eq!(errors.messages("age"), Some(&[REQUIRED.to_owned()][..]));
}

#[rstest]
fn type_errors_and_unknown_keys_are_collected_together() {
    let fields = [
        field("email", FieldType::Email),
        field("visited", FieldType::Date),
    ];
    let errors = validate_payload(
        &fields,
        &payload(json!({"email": "nope", "visited": "31/12/2024", "extra": 1})),
    )
    .expect_err("invalid payload");

    assert_eq!(
        errors.fields().collect::<Vec<_>>(),
        ["email", "visited", "extra"]
    );
    assert_eq!(
        errors.messages("extra"),
        Some(&[UNKNOWN_FIELD.to_owned()][..])
    );
}

#[rstest]
#[case(json!(""))]
#[case(json!(null))]
#[case(json!([]))]
#[case(json!("   "))]
fn blank_values_fail_required_fields(#[case] value: Value) {
    let mut name = field("name", FieldType::Text);
    name.required = true;
    let errors = validate_payload(&[name], &payload(json!({"name": value})))
        .expect_err("blank should be missing");
    assert!(errors.contains("name"));
}

#[rstest]
fn blank_optional_values_skip_type_checks() {
    let fields = [field("when", FieldType::Date)];
    assert!(validate_payload(&fields, &payload(json!({"when": ""}))).is_ok());
}

#[rstest]
#[case(FieldType::Email, json!("ops@example.com"), true)]
#[case(FieldType::Email, json!("ops@"), false)]
#[case(FieldType::Phone, json!("+919876543210"), true)]
#[case(FieldType::Phone, json!("98-76"), false)]
#[case(FieldType::Url, json!("https://kpa.example/x"), true)]
#[case(FieldType::Url, json!("ftp://kpa.example"), false)]
#[case(FieldType::Number, json!(12.5), true)]
#[case(FieldType::Number, json!("12.5"), true)]
#[case(FieldType::Number, json!("twelve"), false)]
#[case(FieldType::Date, json!("2024-01-31"), true)]
#[case(FieldType::Time, json!("23:59"), true)]
#[case(FieldType::Datetime, json!("2024-01-31T10:00:00Z"), true)]
#[case(FieldType::Datetime, json!("tomorrow"), false)]
#[case(FieldType::File, json!("report.pdf"), true)]
#[case(FieldType::File, json!({"name": "scan.png", "size": 10}), true)]
#[case(FieldType::File, json!(42), false)]
#[case(FieldType::Textarea, json!(["a"]), false)]
fn type_checks(#[case] kind: FieldType, #[case] value: Value, #[case] valid: bool) {
    assert_eq!(validate_value(&field("f", kind), &value).is_ok(), valid);
}

#[rstest]
#[case(json!(5), true)]
#[case(json!(5.5), false)]
#[case(json!(-1), false)]
#[case(json!(121), false)]
fn number_rules(#[case] value: Value, #[case] valid: bool) {
    let age = with_rules(
        field("age", FieldType::Number),
        json!({"min": 0, "max": 120, "integer": true}),
    );
    assert_eq!(validate_value(&age, &value).is_ok(), valid);
}

#[rstest]
fn text_rules_enforce_length_then_pattern() {
    let code = with_rules(
        field("code", FieldType::Text),
        json!({"min_length": 4, "pattern": "[A-Z]+-\\d+"}),
    );
    let short = validate_value(&code, &json!("A-1")).expect_err("too short");
    assert_eq!(short, "Ensure this field has at least 4 characters.");
    assert!(validate_value(&code, &json!("abc-12")).is_err());
    assert!(validate_value(&code, &json!("ABC-12")).is_ok());
}

#[rstest]
fn single_choice_must_match_an_option() {
    let mut shift = field("shift", FieldType::Radio);
    shift.options = vec![FieldOption::plain("day"), FieldOption::plain("night")];
    assert!(validate_value(&shift, &json!("day")).is_ok());
    let err = validate_value(&shift, &json!("dusk")).expect_err("unknown option");
    assert!(err.contains("dusk"));
}

#[rstest]
fn checkbox_accepts_lists_and_counts_selections(colours: FieldDefinition) {
    assert!(validate_value(&colours, &json!(["red", "blue"])).is_ok());
    assert!(validate_value(&colours, &json!("green")).is_ok());
    assert!(validate_value(&colours, &json!(["red", "pink"])).is_err());

    let bounded = with_rules(colours, json!({"min_selected": 2, "max_selected": 2}));
    assert!(validate_value(&bounded, &json!(["red"])).is_err());
    assert!(validate_value(&bounded, &json!(["red", "green", "blue"])).is_err());
    assert!(validate_value(&bounded, &json!(["red", "green"])).is_ok());
}

#[rstest]
fn temporal_bounds_are_inclusive() {
    let visit = with_rules(
        field("visit", FieldType::Date),
        json!({"min": "2024-01-01", "max": "2024-12-31"}),
    );
    assert!(validate_value(&visit, &json!("2024-01-01")).is_ok());
    assert!(validate_value(&visit, &json!("2024-12-31")).is_ok());
    assert!(validate_value(&visit, &json!("2025-01-01")).is_err());
}

#[rstest]
fn file_rules_check_extension_and_size() {
    let scan = with_rules(
        field("scan", FieldType::File),
        json!({"allowed_extensions": ["pdf"], "max_size": 100}),
    );
    assert!(validate_value(&scan, &json!("Report.PDF")).is_ok());
    assert!(validate_value(&scan, &json!("report.exe")).is_err());
    assert!(validate_value(&scan, &json!({"name": "a.pdf", "size": 101})).is_err());
}

#[rstest]
fn non_object_payloads_are_rejected() {
    let errors = payload_object(json!([1, 2])).expect_err("array");
    assert!(errors.contains("payload"));
}
