//! Query strings and camelCase bodies for wheel specifications and bogie
//! checksheets.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    BmbcChecksheet, BogieChecksheet, BogieChecksheetFilter, BogieConditions, BogieDetails,
    FieldErrors, FormNumber, RecordStatus, UserId, WheelMeasurements, WheelSpecification,
    WheelSpecificationFilter,
};

const INVALID_DATE: &str = "Date has wrong format. Use YYYY-MM-DD.";
const INVALID_USER: &str = "Must be a valid UUID.";

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_user(errors: &mut FieldErrors, field: &str, raw: Option<&str>) -> Option<UserId> {
    let raw = non_blank(raw)?;
    UserId::new(raw)
        .map_err(|_| errors.push(field, INVALID_USER))
        .ok()
}

fn parse_date(errors: &mut FieldErrors, field: &str, raw: Option<&str>) -> Option<NaiveDate> {
    let raw = non_blank(raw)?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| errors.push(field, INVALID_DATE))
        .ok()
}

fn parse_status(errors: &mut FieldErrors, raw: Option<&str>) -> Option<RecordStatus> {
    let raw = non_blank(raw)?;
    RecordStatus::from_str(raw)
        .map_err(|message| errors.push("status", message))
        .ok()
}

/// Query string of `GET /api/forms/wheel-specifications`.
///
/// Values arrive as text so malformed ones are reported per field.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct WheelSpecificationQuery {
    /// Case-insensitive substring of the form number.
    pub form_number: Option<String>,
    /// Submitting user id.
    pub submitted_by: Option<String>,
    /// Exact date, `YYYY-MM-DD`.
    pub submitted_date: Option<String>,
    pub status: Option<String>,
}

impl WheelSpecificationQuery {
    /// Parse into a filter, collecting every malformed value.
    pub fn into_filter(self) -> Result<WheelSpecificationFilter, FieldErrors> {
        let mut errors = FieldErrors::new();
        let filter = WheelSpecificationFilter {
            form_number: non_blank(self.form_number.as_deref()).map(str::to_owned),
            submitted_by: parse_user(&mut errors, "submitted_by", self.submitted_by.as_deref()),
            submitted_date: parse_date(
                &mut errors,
                "submitted_date",
                self.submitted_date.as_deref(),
            ),
            status: parse_status(&mut errors, self.status.as_deref()),
        };
        errors.into_result(filter)
    }
}

/// Query string of `GET /api/forms/bogie-checksheets`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct BogieChecksheetQuery {
    /// Case-insensitive substring of the form number.
    pub form_number: Option<String>,
    /// Inspecting user id.
    pub inspection_by: Option<String>,
    /// Exact date, `YYYY-MM-DD`.
    pub inspection_date: Option<String>,
    /// Case-insensitive substring of the bogie number.
    pub bogie_no: Option<String>,
    pub status: Option<String>,
}

impl BogieChecksheetQuery {
    /// Parse into a filter, collecting every malformed value.
    pub fn into_filter(self) -> Result<BogieChecksheetFilter, FieldErrors> {
        let mut errors = FieldErrors::new();
        let filter = BogieChecksheetFilter {
            form_number: non_blank(self.form_number.as_deref()).map(str::to_owned),
            inspection_by: parse_user(&mut errors, "inspection_by", self.inspection_by.as_deref()),
            inspection_date: parse_date(
                &mut errors,
                "inspection_date",
                self.inspection_date.as_deref(),
            ),
            bogie_no: non_blank(self.bogie_no.as_deref()).map(str::to_owned),
            status: parse_status(&mut errors, self.status.as_deref()),
        };
        errors.into_result(filter)
    }
}

/// Body of the record status endpoints.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct RecordStatusRequest {
    #[schema(example = "reviewed")]
    pub status: String,
}

impl RecordStatusRequest {
    pub fn parse(&self) -> Result<RecordStatus, FieldErrors> {
        if self.status.trim().is_empty() {
            return Err(FieldErrors::single("status", "This field is required."));
        }
        RecordStatus::from_str(&self.status).map_err(|message| FieldErrors::single("status", message))
    }
}

/// Wheel specification as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WheelSpecificationResponse {
    #[schema(value_type = String, example = "WS-2024-001")]
    pub form_number: FormNumber,
    #[schema(value_type = String, format = Uuid)]
    pub submitted_by: UserId,
    #[schema(value_type = String, format = Date)]
    pub submitted_date: NaiveDate,
    pub status: RecordStatus,
    pub fields: WheelMeasurements,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WheelSpecification> for WheelSpecificationResponse {
    fn from(record: WheelSpecification) -> Self {
        Self {
            form_number: record.form_number,
            submitted_by: record.submitted_by,
            submitted_date: record.submitted_date,
            status: record.status,
            fields: record.measurements,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Bogie checksheet as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BogieChecksheetResponse {
    #[schema(value_type = String, example = "BOGIE-2024-001")]
    pub form_number: FormNumber,
    #[schema(value_type = String, format = Uuid)]
    pub inspection_by: UserId,
    #[schema(value_type = String, format = Date)]
    pub inspection_date: NaiveDate,
    pub status: RecordStatus,
    pub bogie_details: BogieDetails,
    pub bogie_checksheet: BogieConditions,
    pub bmbc_checksheet: BmbcChecksheet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BogieChecksheet> for BogieChecksheetResponse {
    fn from(record: BogieChecksheet) -> Self {
        Self {
            form_number: record.form_number,
            inspection_by: record.inspection_by,
            inspection_date: record.inspection_date,
            status: record.status,
            bogie_details: record.details,
            bogie_checksheet: record.conditions,
            bmbc_checksheet: record.bmbc,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn blank_query_values_are_ignored() {
        let query = WheelSpecificationQuery {
            form_number: Some("  ".into()),
            status: Some(String::new()),
            ..WheelSpecificationQuery::default()
        };
        assert!(query.into_filter().expect("valid").is_empty());
    }

    #[rstest]
    fn malformed_values_are_reported_together() {
        let query = WheelSpecificationQuery {
            submitted_by: Some("someone".into()),
            submitted_date: Some("01/06/2024".into()),
            status: Some("archived".into()),
            ..WheelSpecificationQuery::default()
        };
        let errors = query.into_filter().expect_err("invalid");
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["submitted_by", "submitted_date", "status"]
        );
    }

    #[rstest]
    fn bogie_filters_keep_partial_matches() {
        let query = BogieChecksheetQuery {
            bogie_no: Some(" BG-12 ".into()),
            inspection_date: Some("2024-06-02".into()),
            ..BogieChecksheetQuery::default()
        };
        let filter = query.into_filter().expect("valid");
        assert_eq!(filter.bogie_no.as_deref(), Some("BG-12"));
        assert_eq!(
            filter.inspection_date,
            NaiveDate::from_ymd_opt(2024, 6, 2)
        );
    }

    #[rstest]
    #[case("", "This field is required.")]
    #[case("done", "\"done\" is not a valid choice.")]
    fn status_requests_must_name_a_status(#[case] raw: &str, #[case] message: &str) {
        let errors = RecordStatusRequest { status: raw.into() }
            .parse()
            .expect_err("invalid");
        assert_eq!(errors.messages("status"), Some(&[message.to_owned()][..]));
    }
}
