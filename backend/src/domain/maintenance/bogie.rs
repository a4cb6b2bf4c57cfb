//! Bogie checksheet records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{
    FormNumber, RecordStatus, condition_grade, contains_ignore_case, initial_status,
    optional_user, required_choice, required_date, required_text,
};
use crate::domain::field_errors::FieldErrors;
use crate::domain::user::UserId;

/// Default recorded when no deficit components are reported.
pub const NO_DEFICIT_COMPONENTS: &str = "None";

condition_grade! {
    /// Grade for frame, bolster, and spring seat inspections.
    ComponentCondition {
        Good => "Good",
        Fair => "Fair",
        Poor => "Poor",
        Damaged => "Damaged",
    }
}

condition_grade! {
    /// Grade for the bolster suspension bracket.
    BracketCondition {
        Good => "Good",
        Fair => "Fair",
        Poor => "Poor",
        Cracked => "Cracked",
        Damaged => "Damaged",
    }
}

condition_grade! {
    /// Grade for the axle guide.
    AxleGuideCondition {
        Good => "Good",
        Fair => "Fair",
        Worn => "Worn",
        Damaged => "Damaged",
    }
}

condition_grade! {
    /// Grade for brake mounted brake cylinder parts.
    BmbcCondition {
        Good => "GOOD",
        Fair => "FAIR",
        WornOut => "WORN OUT",
        Damaged => "DAMAGED",
    }
}

/// Identification and overhaul details of the inspected bogie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BogieDetails {
    #[schema(example = "BG-1234")]
    pub bogie_no: String,
    #[schema(example = "ICF/2018")]
    pub maker_year_built: String,
    #[schema(example = "NR 2024-05-12")]
    pub incoming_div_and_date: String,
    pub deficit_components: String,
    #[serde(rename = "dateOfIOH")]
    pub date_of_ioh: NaiveDate,
}

/// Structural condition grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BogieConditions {
    pub bogie_frame_condition: ComponentCondition,
    pub bolster: ComponentCondition,
    pub bolster_suspension_bracket: BracketCondition,
    pub lower_spring_seat: ComponentCondition,
    pub axle_guide: AxleGuideCondition,
}

/// Brake cylinder component grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BmbcChecksheet {
    pub cylinder_body: BmbcCondition,
    pub piston_trunnion: BmbcCondition,
    pub adjusting_tube: BmbcCondition,
    pub plunger_spring: BmbcCondition,
}

/// Bogie details as received.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BogieDetailsDraft {
    pub bogie_no: Option<String>,
    pub maker_year_built: Option<String>,
    pub incoming_div_and_date: Option<String>,
    /// Defaults to `None` when omitted.
    pub deficit_components: Option<String>,
    #[serde(rename = "dateOfIOH", alias = "dateOfIoh")]
    pub date_of_ioh: Option<String>,
}

/// Structural grades as received.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BogieConditionsDraft {
    pub bogie_frame_condition: Option<String>,
    pub bolster: Option<String>,
    pub bolster_suspension_bracket: Option<String>,
    pub lower_spring_seat: Option<String>,
    pub axle_guide: Option<String>,
}

/// Brake cylinder grades as received.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BmbcChecksheetDraft {
    pub cylinder_body: Option<String>,
    pub piston_trunnion: Option<String>,
    pub adjusting_tube: Option<String>,
    pub plunger_spring: Option<String>,
}

/// Bogie checksheet request body before validation.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BogieChecksheetDraft {
    #[serde(alias = "form_number")]
    #[schema(example = "BC-2024-001")]
    pub form_number: Option<String>,
    /// Defaults to the caller when omitted.
    #[serde(alias = "inspection_by")]
    pub inspection_by: Option<String>,
    #[serde(alias = "inspection_date")]
    #[schema(example = "2024-06-01")]
    pub inspection_date: Option<String>,
    /// `saved` or `submitted` (default).
    pub status: Option<String>,
    pub bogie_details: Option<BogieDetailsDraft>,
    pub bogie_checksheet: Option<BogieConditionsDraft>,
    pub bmbc_checksheet: Option<BmbcChecksheetDraft>,
}

fn section<T: Default>(errors: &mut FieldErrors, key: &str, value: Option<T>) -> T {
    if value.is_none() {
        errors.push(key, "This field is required.");
    }
    value.unwrap_or_default()
}

impl BogieDetailsDraft {
    fn validate(self, errors: &mut FieldErrors) -> Option<BogieDetails> {
        let bogie_no = required_text(errors, "bogieDetails.bogieNo", self.bogie_no, 50);
        let maker_year_built = required_text(
            errors,
            "bogieDetails.makerYearBuilt",
            self.maker_year_built,
            100,
        );
        let incoming_div_and_date = required_text(
            errors,
            "bogieDetails.incomingDivAndDate",
            self.incoming_div_and_date,
            200,
        );
        let deficit_components = self
            .deficit_components
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| NO_DEFICIT_COMPONENTS.to_owned());
        let date_of_ioh =
            required_date(errors, "bogieDetails.dateOfIOH", self.date_of_ioh.as_deref())?;
        Some(BogieDetails {
            bogie_no,
            maker_year_built,
            incoming_div_and_date,
            deficit_components,
            date_of_ioh,
        })
    }
}

impl BogieConditionsDraft {
    fn validate(self, errors: &mut FieldErrors) -> Option<BogieConditions> {
        let bogie_frame_condition = required_choice(
            errors,
            "bogieChecksheet.bogieFrameCondition",
            self.bogie_frame_condition.as_deref(),
        );
        let bolster = required_choice(errors, "bogieChecksheet.bolster", self.bolster.as_deref());
        let bolster_suspension_bracket = required_choice(
            errors,
            "bogieChecksheet.bolsterSuspensionBracket",
            self.bolster_suspension_bracket.as_deref(),
        );
        let lower_spring_seat = required_choice(
            errors,
            "bogieChecksheet.lowerSpringSeat",
            self.lower_spring_seat.as_deref(),
        );
        let axle_guide = required_choice(
            errors,
            "bogieChecksheet.axleGuide",
            self.axle_guide.as_deref(),
        );
        Some(BogieConditions {
            bogie_frame_condition: bogie_frame_condition?,
            bolster: bolster?,
            bolster_suspension_bracket: bolster_suspension_bracket?,
            lower_spring_seat: lower_spring_seat?,
            axle_guide: axle_guide?,
        })
    }
}

impl BmbcChecksheetDraft {
    fn validate(self, errors: &mut FieldErrors) -> Option<BmbcChecksheet> {
        let mut grade = |key: &str, value: Option<String>| -> Option<BmbcCondition> {
            required_choice(errors, key, value.as_deref())
        };
        let cylinder_body = grade("bmbcChecksheet.cylinderBody", self.cylinder_body);
        let piston_trunnion = grade("bmbcChecksheet.pistonTrunnion", self.piston_trunnion);
        let adjusting_tube = grade("bmbcChecksheet.adjustingTube", self.adjusting_tube);
        let plunger_spring = grade("bmbcChecksheet.plungerSpring", self.plunger_spring);
        Some(BmbcChecksheet {
            cylinder_body: cylinder_body?,
            piston_trunnion: piston_trunnion?,
            adjusting_tube: adjusting_tube?,
            plunger_spring: plunger_spring?,
        })
    }
}

/// Validated bogie checksheet awaiting attribution checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBogieChecksheet {
    pub form_number: FormNumber,
    pub inspection_by: Option<UserId>,
    pub inspection_date: NaiveDate,
    pub status: RecordStatus,
    pub details: BogieDetails,
    pub conditions: BogieConditions,
    pub bmbc: BmbcChecksheet,
}

impl TryFrom<BogieChecksheetDraft> for NewBogieChecksheet {
    type Error = FieldErrors;

    fn try_from(draft: BogieChecksheetDraft) -> Result<Self, Self::Error> {
        let mut errors = FieldErrors::new();
        let form_number = FormNumber::new(draft.form_number.unwrap_or_default())
            .map_err(|message| errors.push("formNumber", message))
            .ok();
        let inspection_by =
            optional_user(&mut errors, "inspectionBy", draft.inspection_by.as_deref());
        let inspection_date =
            required_date(&mut errors, "inspectionDate", draft.inspection_date.as_deref());
        let status = initial_status(&mut errors, draft.status.as_deref());
        let details = section(&mut errors, "bogieDetails", draft.bogie_details);
        let conditions = section(&mut errors, "bogieChecksheet", draft.bogie_checksheet);
        let bmbc = section(&mut errors, "bmbcChecksheet", draft.bmbc_checksheet);
        let details = details.validate(&mut errors);
        let conditions = conditions.validate(&mut errors);
        let bmbc = bmbc.validate(&mut errors);

        match (form_number, inspection_date, details, conditions, bmbc) {
            (Some(form_number), Some(inspection_date), Some(details), Some(conditions), Some(bmbc))
                if errors.is_empty() =>
            {
                Ok(Self {
                    form_number,
                    inspection_by,
                    inspection_date,
                    status,
                    details,
                    conditions,
                    bmbc,
                })
            }
            _ => Err(errors),
        }
    }
}

impl NewBogieChecksheet {
    /// Attribute the record and stamp creation times.
    #[must_use]
    pub fn into_record(self, inspection_by: UserId, now: DateTime<Utc>) -> BogieChecksheet {
        BogieChecksheet {
            form_number: self.form_number,
            inspection_by,
            inspection_date: self.inspection_date,
            status: self.status,
            details: self.details,
            conditions: self.conditions,
            bmbc: self.bmbc,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Stored bogie checksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BogieChecksheet {
    pub form_number: FormNumber,
    pub inspection_by: UserId,
    pub inspection_date: NaiveDate,
    pub status: RecordStatus,
    pub details: BogieDetails,
    pub conditions: BogieConditions,
    pub bmbc: BmbcChecksheet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Conjunctive bogie checksheet filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BogieChecksheetFilter {
    /// Case-insensitive substring of the form number.
    pub form_number: Option<String>,
    pub inspection_by: Option<UserId>,
    pub inspection_date: Option<NaiveDate>,
    /// Case-insensitive substring of the bogie number.
    pub bogie_no: Option<String>,
    pub status: Option<RecordStatus>,
}

impl BogieChecksheetFilter {
    /// Return `true` when no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Return `true` when `record` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, record: &BogieChecksheet) -> bool {
        self.form_number
            .as_deref()
            .is_none_or(|needle| contains_ignore_case(record.form_number.as_str(), needle))
            && self.inspection_by.is_none_or(|id| record.inspection_by == id)
            && self
                .inspection_date
                .is_none_or(|date| record.inspection_date == date)
            && self
                .bogie_no
                .as_deref()
                .is_none_or(|needle| contains_ignore_case(&record.details.bogie_no, needle))
            && self.status.is_none_or(|status| record.status == status)
    }
}
