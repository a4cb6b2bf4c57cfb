//! Ready-made accounts for service and HTTP tests.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

use crate::domain::{Actor, Employment, PhoneNumber, User, UserId, UserProfile};

fn joined() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single() {
        Some(at) => at,
        None => panic!("fixture timestamp is ambiguous"),
    }
}

/// Active, non-staff account with the given phone number.
pub fn account(phone: &str) -> User {
    let phone_number = match PhoneNumber::new(phone) {
        Ok(phone_number) => phone_number,
        Err(err) => panic!("fixture phone {phone}: {err}"),
    };
    User {
        id: UserId::random(),
        phone_number,
        email: None,
        profile: UserProfile {
            first_name: "Asha".to_owned(),
            last_name: "Kumar".to_owned(),
            ..UserProfile::default()
        },
        employment: Employment::default(),
        is_staff: false,
        is_active: true,
        date_joined: joined(),
        last_login: None,
    }
}

/// Active staff account with the given phone number.
pub fn staff_account(phone: &str) -> User {
    User {
        is_staff: true,
        ..account(phone)
    }
}

/// Caller identity for `user`.
pub fn actor_for(user: &User) -> Actor {
    Actor {
        user_id: user.id,
        is_staff: user.is_staff,
    }
}

/// Complete wheel specification request body with all 15 measurements.
pub fn wheel_specification_json(form_number: &str) -> Value {
    json!({
        "formNumber": form_number,
        "submittedDate": "2024-06-01",
        "fields": {
            "treadDiameterNew": "915 (900-1000)",
            "lastShopIssueSize": "837 (800-900)",
            "condemningDia": "825 (800-900)",
            "wheelGauge": "1600 (+2,-1)",
            "variationSameAxle": "0.5",
            "variationSameBogie": "5",
            "variationSameCoach": "13",
            "wheelProfile": "29.4 Flange Thickness",
            "intermediateWWP": "20 TO 28",
            "bearingSeatDiameter": "130.043 TO 130.068",
            "rollerBearingOuterDia": "280 (+0.0/-0.035)",
            "rollerBearingBoreDia": "130 (+0.0/-0.025)",
            "rollerBearingWidth": "93 (+0/-0.250)",
            "axleBoxHousingBoreDia": "280 (+0.030/+0.052)",
            "wheelDiscWidth": "127 (+4/-0)"
        }
    })
}

/// Complete bogie checksheet request body.
pub fn bogie_checksheet_json(form_number: &str) -> Value {
    json!({
        "formNumber": form_number,
        "inspectionDate": "2024-06-02",
        "bogieDetails": {
            "bogieNo": "BG-1234",
            "makerYearBuilt": "ICF/2018",
            "incomingDivAndDate": "NR 2024-05-12",
            "dateOfIOH": "2023-11-30"
        },
        "bogieChecksheet": {
            "bogieFrameCondition": "Good",
            "bolster": "fair",
            "bolsterSuspensionBracket": "Cracked",
            "lowerSpringSeat": "Poor",
            "axleGuide": "Worn"
        },
        "bmbcChecksheet": {
            "cylinderBody": "WORN OUT",
            "pistonTrunnion": "GOOD",
            "adjustingTube": "DAMAGED",
            "plungerSpring": "FAIR"
        }
    })
}
