//! PostgreSQL-backed form definitions.
//!
//! A form and its fields are written in one transaction. Field options and
//! validation rules live in JSONB columns; rules are re-parsed on read so
//! stored patterns are compiled again.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{FormRepository, FormRepositoryError};
use crate::domain::{FieldDefinition, FieldType, Form, FormId, FormType, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::json_serializers::{
    field_options_to_json, json_to_field_options, json_to_validation_rules,
};
use super::models::{FormFieldRow, FormRow, NewFormFieldRow, NewFormRow};
use super::pool::{DbPool, PoolError};
use super::schema::{form_fields, forms};

/// Diesel-backed implementation of the [`FormRepository`] port.
#[derive(Clone)]
pub struct DieselFormRepository {
    pool: DbPool,
}

impl DieselFormRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FormRepositoryError {
    map_basic_pool_error(error, FormRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> FormRepositoryError {
    map_basic_diesel_error(
        error,
        FormRepositoryError::query,
        FormRepositoryError::connection,
    )
}

/// Rows for `form.fields`, ranked by their position in the domain list so a
/// reload reproduces the order exactly, ties on `order` included.
fn field_rows(form: &Form) -> Vec<NewFormFieldRow<'_>> {
    form.fields
        .iter()
        .zip(0_i32..)
        .map(|(field, position)| NewFormFieldRow {
            form_id: *form.id.as_uuid(),
            name: &field.name,
            label: &field.label,
            field_type: field.field_type.as_str(),
            placeholder: &field.placeholder,
            help_text: &field.help_text,
            required: field.required,
            display_order: field.order,
            position,
            options: field_options_to_json(&field.options),
            validation_rules: field.rules.to_json(),
        })
        .collect()
}

fn row_to_field(row: FormFieldRow) -> Result<FieldDefinition, FormRepositoryError> {
    let field_type = FieldType::from_str(&row.field_type).map_err(|err| {
        FormRepositoryError::query(format!("invalid field type in database: {}", err.0))
    })?;
    let options = json_to_field_options(row.options).map_err(FormRepositoryError::query)?;
    let rules = json_to_validation_rules(field_type, &row.validation_rules)
        .map_err(FormRepositoryError::query)?;
    Ok(FieldDefinition {
        name: row.name,
        label: row.label,
        field_type,
        placeholder: row.placeholder,
        help_text: row.help_text,
        required: row.required,
        order: row.display_order,
        options,
        rules,
    })
}

/// Assemble a domain form from its row and its fields in display order.
fn row_to_form(row: FormRow, fields: Vec<FormFieldRow>) -> Result<Form, FormRepositoryError> {
    let form_type = FormType::from_str(&row.form_type).map_err(|err| {
        FormRepositoryError::query(format!("invalid form type in database: {err}"))
    })?;
    let fields = fields
        .into_iter()
        .map(row_to_field)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Form {
        id: FormId::from_uuid(row.id),
        title: row.title,
        description: row.description,
        form_type,
        is_active: row.is_active,
        created_by: UserId::from_uuid(row.created_by),
        created_at: row.created_at,
        updated_at: row.updated_at,
        fields,
    })
}

fn group_fields(rows: Vec<FormFieldRow>) -> HashMap<Uuid, Vec<FormFieldRow>> {
    let mut grouped: HashMap<Uuid, Vec<FormFieldRow>> = HashMap::new();
    for row in rows {
        grouped.entry(row.form_id).or_default().push(row);
    }
    grouped
}

#[async_trait]
impl FormRepository for DieselFormRepository {
    async fn create(&self, form: &Form) -> Result<(), FormRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let form_row = NewFormRow {
            id: *form.id.as_uuid(),
            title: &form.title,
            description: &form.description,
            form_type: form.form_type.as_str(),
            is_active: form.is_active,
            created_by: *form.created_by.as_uuid(),
            created_at: form.created_at,
            updated_at: form.updated_at,
        };
        let field_rows = field_rows(form);

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(forms::table)
                    .values(&form_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(form_fields::table)
                    .values(&field_rows)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &FormId) -> Result<Option<Form>, FormRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(row) = forms::table
            .filter(forms::id.eq(id.as_uuid()))
            .select(FormRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };
        let fields: Vec<FormFieldRow> = form_fields::table
            .filter(form_fields::form_id.eq(id.as_uuid()))
            .order(form_fields::position.asc())
            .select(FormFieldRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_form(row, fields).map(Some)
    }

    async fn list(&self, include_inactive: bool) -> Result<Vec<Form>, FormRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = forms::table.into_boxed();
        if !include_inactive {
            query = query.filter(forms::is_active.eq(true));
        }
        let rows: Vec<FormRow> = query
            .order((forms::created_at.desc(), forms::id))
            .select(FormRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let field_rows: Vec<FormFieldRow> = form_fields::table
            .filter(form_fields::form_id.eq_any(&ids))
            .order(form_fields::position.asc())
            .select(FormFieldRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let mut grouped = group_fields(field_rows);

        rows.into_iter()
            .map(|row| {
                let fields = grouped.remove(&row.id).unwrap_or_default();
                row_to_form(row, fields)
            })
            .collect()
    }

    async fn set_active(
        &self,
        id: &FormId,
        is_active: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, FormRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(forms::table.filter(forms::id.eq(id.as_uuid())))
            .set((forms::is_active.eq(is_active), forms::updated_at.eq(at)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    use crate::domain::{FieldOption, ValidationRules};

    #[fixture]
    fn form_row() -> FormRow {
        let now = Utc::now();
        FormRow {
            id: Uuid::new_v4(),
            title: "Wheel inspection".into(),
            description: String::new(),
            form_type: "survey".into(),
            is_active: true,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    fn field_row(form_id: Uuid, name: &str, field_type: &str, order: i32) -> FormFieldRow {
        FormFieldRow {
            form_id,
            name: name.into(),
            label: name.into(),
            field_type: field_type.into(),
            placeholder: String::new(),
            help_text: String::new(),
            required: true,
            display_order: order,
            position: 0,
            options: json!([]),
            validation_rules: json!({}),
        }
    }

    #[rstest]
    fn forms_assemble_with_typed_fields(form_row: FormRow) {
        let id = form_row.id;
        let mut choice = field_row(id, "grade", "select", 1);
        choice.options = json!([{ "value": "a", "label": "A" }]);
        let mut count = field_row(id, "count", "number", 0);
        count.validation_rules = json!({ "min": 0 });

        let form = row_to_form(form_row, vec![count, choice]).expect("valid rows");

        assert_eq!(form.form_type, FormType::Survey);
        assert_eq!(form.fields[0].field_type, FieldType::Number);
        assert!(matches!(form.fields[0].rules, ValidationRules::Number(_)));
        assert_eq!(form.fields[1].options, vec![FieldOption {
            value: "a".into(),
            label: "A".into(),
        }]);
    }

    #[rstest]
    fn unknown_field_types_are_query_errors(form_row: FormRow) {
        let id = form_row.id;
        let err = row_to_form(form_row, vec![field_row(id, "x", "hologram", 0)])
            .expect_err("unknown type");
        assert!(matches!(err, FormRepositoryError::Query { .. }));
    }

    #[rstest]
    fn field_rows_round_trip(form_row: FormRow) {
        let id = form_row.id;
        let mut rules_row = field_row(id, "code", "text", 0);
        rules_row.validation_rules = json!({ "max_length": 5 });
        let form = row_to_form(form_row, vec![rules_row]).expect("valid rows");

        let rows = field_rows(&form);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].field_type, "text");
        assert_eq!(rows[0].validation_rules, json!({ "max_length": 5 }));
    }

    #[rstest]
    fn tied_orders_keep_their_rank(form_row: FormRow) {
        let id = form_row.id;
        let form = row_to_form(
            form_row,
            vec![
                field_row(id, "zeta", "text", 0),
                field_row(id, "alpha", "text", 0),
            ],
        )
        .expect("valid rows");

        let rows = field_rows(&form);
        let ranked: Vec<_> = rows.iter().map(|row| (row.name, row.position)).collect();
        assert_eq!(ranked, vec![("zeta", 0), ("alpha", 1)]);
    }

    #[rstest]
    fn fields_group_by_form() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let grouped = group_fields(vec![
            field_row(a, "one", "text", 0),
            field_row(b, "two", "text", 0),
            field_row(a, "three", "text", 1),
        ]);
        assert_eq!(grouped[&a].len(), 2);
        assert_eq!(grouped[&b].len(), 1);
    }
}
