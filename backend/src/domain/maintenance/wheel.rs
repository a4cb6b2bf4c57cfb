//! Wheel specification records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{
    FormNumber, RecordStatus, contains_ignore_case, initial_status, optional_user, required_date,
    required_text,
};
use crate::domain::field_errors::FieldErrors;
use crate::domain::user::UserId;

/// Generate the measurement struct, its draft twin, and draft validation
/// from one field table.
macro_rules! wheel_measurements {
    ($($field:ident => $key:literal, $max:literal, $example:literal;)+) => {
        /// The fifteen wheel and bearing measurements, each a nominal value
        /// with its tolerance as free text.
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
        pub struct WheelMeasurements {
            $(
                #[serde(rename = $key)]
                #[schema(example = $example)]
                pub $field: String,
            )+
        }

        /// Measurements as received; every value is optional until checked.
        #[derive(Debug, Clone, Default, Deserialize, ToSchema)]
        pub struct WheelMeasurementsDraft {
            $(
                #[serde(rename = $key, default)]
                #[schema(example = $example)]
                pub $field: Option<String>,
            )+
        }

        impl WheelMeasurementsDraft {
            /// Wire keys in declaration order.
            pub const KEYS: &'static [&'static str] = &[$($key),+];

            fn validate(self, errors: &mut FieldErrors) -> WheelMeasurements {
                WheelMeasurements {
                    $(
                        $field: required_text(
                            errors,
                            concat!("fields.", $key),
                            self.$field,
                            $max,
                        ),
                    )+
                }
            }
        }
    };
}

wheel_measurements! {
    tread_diameter_new => "treadDiameterNew", 100, "915 (900-1000)";
    last_shop_issue_size => "lastShopIssueSize", 100, "837 (800-900)";
    condemning_dia => "condemningDia", 100, "825 (800-900)";
    wheel_gauge => "wheelGauge", 100, "1600 (+2,-1)";
    variation_same_axle => "variationSameAxle", 50, "0.5";
    variation_same_bogie => "variationSameBogie", 50, "5";
    variation_same_coach => "variationSameCoach", 50, "13";
    wheel_profile => "wheelProfile", 100, "29.4 Flange Thickness";
    intermediate_wwp => "intermediateWWP", 100, "20 TO 28";
    bearing_seat_diameter => "bearingSeatDiameter", 100, "130.043 TO 130.068";
    roller_bearing_outer_dia => "rollerBearingOuterDia", 100, "280 (+0.0/-0.035)";
    roller_bearing_bore_dia => "rollerBearingBoreDia", 100, "130 (+0.0/-0.025)";
    roller_bearing_width => "rollerBearingWidth", 100, "93 (+0/-0.250)";
    axle_box_housing_bore_dia => "axleBoxHousingBoreDia", 100, "280 (+0.030/+0.052)";
    wheel_disc_width => "wheelDiscWidth", 100, "127 (+4/-0)";
}

/// Wheel specification request body before validation.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WheelSpecificationDraft {
    #[serde(alias = "form_number")]
    #[schema(example = "WS-2024-001")]
    pub form_number: Option<String>,
    /// Defaults to the caller when omitted.
    #[serde(alias = "submitted_by")]
    pub submitted_by: Option<String>,
    #[serde(alias = "submitted_date")]
    #[schema(example = "2024-06-01")]
    pub submitted_date: Option<String>,
    /// `saved` or `submitted` (default).
    pub status: Option<String>,
    #[serde(default)]
    pub fields: Option<WheelMeasurementsDraft>,
}

/// Validated wheel specification awaiting attribution checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWheelSpecification {
    pub form_number: FormNumber,
    pub submitted_by: Option<UserId>,
    pub submitted_date: NaiveDate,
    pub status: RecordStatus,
    pub measurements: WheelMeasurements,
}

impl TryFrom<WheelSpecificationDraft> for NewWheelSpecification {
    type Error = FieldErrors;

    fn try_from(draft: WheelSpecificationDraft) -> Result<Self, Self::Error> {
        let mut errors = FieldErrors::new();
        let form_number = FormNumber::new(draft.form_number.unwrap_or_default())
            .map_err(|message| errors.push("formNumber", message))
            .ok();
        let submitted_by = optional_user(&mut errors, "submittedBy", draft.submitted_by.as_deref());
        let submitted_date =
            required_date(&mut errors, "submittedDate", draft.submitted_date.as_deref());
        let status = initial_status(&mut errors, draft.status.as_deref());
        if draft.fields.is_none() {
            errors.push("fields", "This field is required.");
        }
        let measurements = draft.fields.unwrap_or_default().validate(&mut errors);

        match (form_number, submitted_date) {
            (Some(form_number), Some(submitted_date)) if errors.is_empty() => Ok(Self {
                form_number,
                submitted_by,
                submitted_date,
                status,
                measurements,
            }),
            _ => Err(errors),
        }
    }
}

impl NewWheelSpecification {
    /// Attribute the record and stamp creation times.
    #[must_use]
    pub fn into_record(self, submitted_by: UserId, now: DateTime<Utc>) -> WheelSpecification {
        WheelSpecification {
            form_number: self.form_number,
            submitted_by,
            submitted_date: self.submitted_date,
            status: self.status,
            measurements: self.measurements,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Stored wheel specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelSpecification {
    pub form_number: FormNumber,
    pub submitted_by: UserId,
    pub submitted_date: NaiveDate,
    pub status: RecordStatus,
    pub measurements: WheelMeasurements,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Conjunctive wheel specification filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WheelSpecificationFilter {
    /// Case-insensitive substring of the form number.
    pub form_number: Option<String>,
    pub submitted_by: Option<UserId>,
    pub submitted_date: Option<NaiveDate>,
    pub status: Option<RecordStatus>,
}

impl WheelSpecificationFilter {
    /// Return `true` when no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Return `true` when `record` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, record: &WheelSpecification) -> bool {
        self.form_number
            .as_deref()
            .is_none_or(|needle| contains_ignore_case(record.form_number.as_str(), needle))
            && self.submitted_by.is_none_or(|id| record.submitted_by == id)
            && self
                .submitted_date
                .is_none_or(|date| record.submitted_date == date)
            && self.status.is_none_or(|status| record.status == status)
    }
}
