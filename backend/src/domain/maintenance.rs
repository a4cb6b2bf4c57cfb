//! Fixed-schema maintenance records.
//!
//! Wheel specifications and bogie checksheets share a unique form number,
//! an attributed user, a calendar date, and a status workflow. Measurement
//! values are opaque strings such as `915 (900-1000)`; only presence and
//! length are checked.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::field_errors::FieldErrors;
use super::forms::values::parse_date;
use super::user::{UserId, check_length};

pub mod bogie;
pub mod wheel;

pub use self::bogie::{
    AxleGuideCondition, BmbcChecksheet, BmbcChecksheetDraft, BmbcCondition, BogieChecksheet,
    BogieChecksheetDraft, BogieChecksheetFilter, BogieConditions, BogieConditionsDraft,
    BogieDetails, BogieDetailsDraft, BracketCondition, ComponentCondition, NewBogieChecksheet,
};
pub use self::wheel::{
    NewWheelSpecification, WheelMeasurements, WheelMeasurementsDraft, WheelSpecification,
    WheelSpecificationDraft, WheelSpecificationFilter,
};

/// Maximum length of a form number.
pub const FORM_NUMBER_MAX: usize = 50;
/// Message attached to a form number that is already taken.
pub const FORM_NUMBER_TAKEN: &str = "This form number is already in use";
/// Message attached to an attribution that names no user.
pub const USER_NOT_FOUND: &str = "User not found";

/// Globally unique, human-assigned record number such as `WS-2024-001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "WS-2024-001")]
pub struct FormNumber(String);

impl FormNumber {
    /// Validate and construct a form number.
    ///
    /// # Errors
    /// Returns a client-facing message for blank or overlong input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, String> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err("This field is required.".to_owned());
        }
        if trimmed.chars().count() > FORM_NUMBER_MAX {
            return Err(format!(
                "Ensure this field has no more than {FORM_NUMBER_MAX} characters."
            ));
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for FormNumber {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FormNumber> for String {
    fn from(value: FormNumber) -> Self {
        value.0
    }
}

/// Workflow state shared by maintenance records.
///
/// `saved → submitted → reviewed → {approved, rejected}`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Saved,
    #[default]
    Submitted,
    Reviewed,
    Approved,
    Rejected,
}

impl RecordStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::Submitted => "submitted",
            Self::Reviewed => "reviewed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Return `true` when moving from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Saved, Self::Submitted)
                | (Self::Submitted, Self::Reviewed)
                | (Self::Reviewed, Self::Approved)
                | (Self::Reviewed, Self::Rejected)
        )
    }

    /// Status a record may be created with.
    #[must_use]
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::Saved | Self::Submitted)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "saved" => Ok(Self::Saved),
            "submitted" => Ok(Self::Submitted),
            "reviewed" => Ok(Self::Reviewed),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("\"{s}\" is not a valid choice.")),
        }
    }
}

/// Declare an enumerated condition grade with its wire spelling.
macro_rules! condition_grade {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize, utoipa::ToSchema,
        )]
        pub enum $name {
            $(#[serde(rename = $text)] $variant,)+
        }

        impl $name {
            /// Every grade in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|grade| grade.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        let choices: Vec<&str> =
                            Self::ALL.iter().map(|grade| grade.as_str()).collect();
                        format!(
                            "\"{s}\" is not a valid choice. Choose one of: {}.",
                            choices.join(", ")
                        )
                    })
            }
        }
    };
}
pub(crate) use condition_grade;

/// Read a required free-text value, recording a message when it is missing
/// or too long.
pub(crate) fn required_text(
    errors: &mut FieldErrors,
    key: &str,
    value: Option<String>,
    max: usize,
) -> String {
    let text = value.map(|v| v.trim().to_owned()).unwrap_or_default();
    if text.is_empty() {
        errors.push(key, "This field is required.");
    } else {
        check_length(errors, key, &text, max);
    }
    text
}

/// Parse a required `YYYY-MM-DD` value.
pub(crate) fn required_date(
    errors: &mut FieldErrors,
    key: &str,
    value: Option<&str>,
) -> Option<chrono::NaiveDate> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => {
            errors.push(key, "This field is required.");
            None
        }
        Some(text) => {
            let parsed = parse_date(text);
            if parsed.is_none() {
                errors.push(
                    key,
                    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.",
                );
            }
            parsed
        }
    }
}

/// Parse a required enumerated value.
pub(crate) fn required_choice<T: FromStr<Err = String>>(
    errors: &mut FieldErrors,
    key: &str,
    value: Option<&str>,
) -> Option<T> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => {
            errors.push(key, "This field is required.");
            None
        }
        Some(text) => text
            .parse()
            .map_err(|message: String| errors.push(key, message))
            .ok(),
    }
}

/// Parse an optional attribution id; malformed ids name no user.
pub(crate) fn optional_user(
    errors: &mut FieldErrors,
    key: &str,
    value: Option<&str>,
) -> Option<UserId> {
    let text = value.map(str::trim).filter(|v| !v.is_empty())?;
    UserId::new(text)
        .map_err(|_| errors.push(key, USER_NOT_FOUND))
        .ok()
}

/// Parse the requested initial status; records default to `submitted`.
pub(crate) fn initial_status(
    errors: &mut FieldErrors,
    value: Option<&str>,
) -> RecordStatus {
    let Some(text) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return RecordStatus::default();
    };
    match text.parse::<RecordStatus>() {
        Ok(status) if status.is_initial() => status,
        Ok(_) => {
            errors.push("status", "New records may only be saved or submitted.");
            RecordStatus::default()
        }
        Err(message) => {
            errors.push("status", message);
            RecordStatus::default()
        }
    }
}

/// Case-insensitive substring match used by record filters.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_lowercase()
        .contains(needle.trim().to_lowercase().as_str())
}
