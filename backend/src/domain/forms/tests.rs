//! Tests for form definition drafts.

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;

fn draft_field(label: &str, field_type: &str) -> FieldDraft {
    FieldDraft {
        label: label.to_owned(),
        field_type: field_type.to_owned(),
        ..FieldDraft::default()
    }
}

#[fixture]
fn draft() -> FormDraft {
    FormDraft {
        title: "Depot visit".to_owned(),
        description: "Weekly depot inspection".to_owned(),
        form_type: "survey".to_owned(),
        is_active: true,
        fields: vec![
            draft_field("Inspector Email", "email"),
            FieldDraft {
                options: vec![FieldOption::plain("day"), FieldOption::plain("night")],
                ..draft_field("Shift", "radio")
            },
        ],
    }
}

#[rstest]
fn valid_draft_derives_names_and_orders(draft: FormDraft) {
    let input = FormDefinitionInput::try_from(draft).expect("valid draft");
    assert_eq!(input.form_type, FormType::Survey);
    let names: Vec<_> = input.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["inspector_email", "shift"]);
    assert_eq!(input.fields[1].order, 1);
}

#[rstest]
fn explicit_order_sorts_fields(mut draft: FormDraft) {
    draft.fields[0].order = Some(5);
    draft.fields[1].order = Some(1);
    let input = FormDefinitionInput::try_from(draft).expect("valid draft");
    assert_eq!(input.fields[0].name, "shift");
}

#[rstest]
fn choice_fields_need_options(mut draft: FormDraft) {
    draft.fields[1].options.clear();
    let errors = FormDefinitionInput::try_from(draft).expect_err("no options");
    assert!(errors.contains("fields[1].options"));
}

#[rstest]
fn collects_problems_across_fields(mut draft: FormDraft) {
    draft.title = "  ".to_owned();
    draft.form_type = "poll".to_owned();
    draft.fields[0].field_type = "colour".to_owned();
    draft.fields[1].validation_rules = json!({"min": 1})
        .as_object()
        .cloned()
        .expect("object");

    let errors = FormDefinitionInput::try_from(draft).expect_err("invalid draft");

    assert_eq!(
        errors.fields().collect::<Vec<_>>(),
        [
            "title",
            "form_type",
            "fields[0].field_type",
            "fields[1].validation_rules"
        ]
    );
}

#[rstest]
fn duplicate_names_are_rejected(mut draft: FormDraft) {
    draft.fields[1] = draft_field("Inspector email", "text");
    let errors = FormDefinitionInput::try_from(draft).expect_err("duplicate");
    assert!(errors.contains("fields[1].name"));
}

#[rstest]
fn duplicate_option_values_are_rejected(mut draft: FormDraft) {
    draft.fields[1].options.push(FieldOption::plain("day"));
    let errors = FormDefinitionInput::try_from(draft).expect_err("duplicate option");
    assert!(errors.contains("fields[1].options"));
}

#[rstest]
fn padded_option_values_are_trimmed_and_selectable(mut draft: FormDraft) {
    draft.fields[1].options = vec![FieldOption::plain(" day "), FieldOption::plain("night")];
    let input = FormDefinitionInput::try_from(draft).expect("valid draft");
    let shift = &input.fields[1];

    assert_eq!(shift.options[0].value, "day");
    assert_eq!(shift.options[0].label, "day");
    assert_eq!(validate_value(shift, &json!(" day ")), Ok(()));
}

#[rstest]
fn options_equal_once_trimmed_are_duplicates(mut draft: FormDraft) {
    draft.fields[1].options.push(FieldOption::plain(" night "));
    let errors = FormDefinitionInput::try_from(draft).expect_err("duplicate option");
    assert!(errors.contains("fields[1].options"));
}

#[rstest]
#[case(0)]
#[case(MAX_FORM_FIELDS + 1)]
fn field_count_is_bounded(mut draft: FormDraft, #[case] count: usize) {
    draft.fields = (0..count)
        .map(|i| draft_field(&format!("Field {i}"), "text"))
        .collect();
    let errors = FormDefinitionInput::try_from(draft).expect_err("bad count");
    assert!(errors.contains("fields"));
}

#[rstest]
fn option_count_is_bounded(mut draft: FormDraft) {
    draft.fields[1].options = (0..=MAX_FIELD_OPTIONS)
        .map(|i| FieldOption::plain(i.to_string()))
        .collect();
    let errors = FormDefinitionInput::try_from(draft).expect_err("too many options");
    assert!(errors.contains("fields[1].options"));
}

#[rstest]
fn non_choice_fields_drop_options(mut draft: FormDraft) {
    draft.fields[0].options = vec![FieldOption::plain("ignored")];
    let input = FormDefinitionInput::try_from(draft).expect("valid draft");
    assert!(input.fields[0].options.is_empty());
}
