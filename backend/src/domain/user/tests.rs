//! Regression coverage for user value types and update application.

use super::*;
use rstest::{fixture, rstest};

#[fixture]
fn user() -> User {
    User {
        id: UserId::random(),
        phone_number: PhoneNumber::new("+1234567890").expect("valid phone"),
        email: None,
        profile: UserProfile {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            ..UserProfile::default()
        },
        employment: Employment::default(),
        is_staff: false,
        is_active: true,
        date_joined: Utc::now(),
        last_login: None,
    }
}

#[rstest]
#[case("+1234567890", true)]
#[case("1234567890", true)]
#[case("+11234567890123", true)]
#[case("  +123456789 ", true)]
#[case("12345678", false)]
#[case("+12345678901234567", false)]
#[case("+12-345-678-90", false)]
#[case("", false)]
fn phone_number_format(#[case] raw: &str, #[case] valid: bool) {
    assert_eq!(PhoneNumber::new(raw).is_ok(), valid, "{raw}");
}

#[rstest]
fn phone_number_is_trimmed() {
    let phone = PhoneNumber::new(" +1234567890 ").expect("valid phone");
    assert_eq!(phone.as_str(), "+1234567890");
}

#[rstest]
#[case("ada@example.com", true)]
#[case("ada@example", false)]
#[case("ada example.com", false)]
#[case("@example.com", false)]
fn email_format(#[case] raw: &str, #[case] valid: bool) {
    assert_eq!(EmailAddress::new(raw).is_ok(), valid, "{raw}");
}

#[rstest]
fn employee_id_rejects_blank_and_long_values() {
    assert_eq!(
        EmployeeId::new("  "),
        Err(UserValidationError::EmptyEmployeeId)
    );
    assert_eq!(
        EmployeeId::new("x".repeat(EMPLOYEE_ID_MAX + 1)),
        Err(UserValidationError::TooLong {
            max: EMPLOYEE_ID_MAX
        })
    );
}

#[rstest]
fn user_id_rejects_padded_input() {
    let id = Uuid::new_v4().to_string();
    assert!(UserId::new(&id).is_ok());
    assert_eq!(
        UserId::new(format!(" {id}")),
        Err(UserValidationError::InvalidId)
    );
}

#[rstest]
fn full_name_and_address_skip_blanks(mut user: User) {
    user.profile.address.city = "Nagpur".into();
    user.profile.address.country = "India".into();
    assert_eq!(user.full_name(), "Ada Lovelace");
    assert_eq!(user.full_address(), "Nagpur, India");
}

#[rstest]
fn profile_update_collects_every_violation(mut user: User) {
    let update = ProfileUpdate {
        email: Some("not-an-email".into()),
        first_name: Some("   ".into()),
        bio: Some("b".repeat(BIO_MAX + 1)),
        city: Some("Pune".into()),
        ..ProfileUpdate::default()
    };
    let mut errors = FieldErrors::new();
    update.apply(&mut user, &mut errors);

    assert_eq!(
        errors.fields().collect::<Vec<_>>(),
        vec!["email", "first_name", "bio"]
    );
    assert_eq!(user.profile.first_name, "Ada");
    assert_eq!(user.profile.address.city, "Pune");
}

#[rstest]
fn profile_update_clears_email_with_blank_value(mut user: User) {
    user.email = Some(EmailAddress::new("ada@example.com").expect("valid email"));
    let mut errors = FieldErrors::new();
    ProfileUpdate {
        email: Some(String::new()),
        ..ProfileUpdate::default()
    }
    .apply(&mut user, &mut errors);
    assert!(errors.is_empty());
    assert!(user.email.is_none());
}

#[rstest]
fn admin_update_changes_flags_and_manager(mut user: User) {
    let manager = UserId::random();
    let update = AdminUserUpdate {
        employee_id: Some("EMP-7".into()),
        manager: Some(ManagerChange::Assign(manager)),
        is_staff: Some(true),
        is_active: Some(false),
        ..AdminUserUpdate::default()
    };
    let mut errors = FieldErrors::new();
    update.apply(&mut user, &mut errors);

    assert!(errors.is_empty());
    assert_eq!(
        user.employment.employee_id.as_ref().map(EmployeeId::as_str),
        Some("EMP-7")
    );
    assert_eq!(user.employment.manager_id, Some(manager));
    assert!(user.is_staff);
    assert!(!user.is_active);
}

#[rstest]
fn admin_update_reports_bad_phone(mut user: User) {
    let mut errors = FieldErrors::new();
    AdminUserUpdate {
        phone_number: Some("abc".into()),
        ..AdminUserUpdate::default()
    }
    .apply(&mut user, &mut errors);
    assert!(errors.contains("phone_number"));
    assert_eq!(user.phone_number.as_str(), "+1234567890");
}

#[rstest]
fn filter_combines_conditions(mut user: User) {
    user.employment.department = "Wheel Shop".into();
    let matching = UserFilter {
        is_active: Some(true),
        department: Some("wheel shop".into()),
        ..UserFilter::default()
    };
    let excluding = UserFilter {
        is_active: Some(true),
        is_staff: Some(true),
        ..UserFilter::default()
    };
    assert!(matching.matches(&user));
    assert!(!excluding.matches(&user));
}

#[rstest]
fn profile_only_updates_do_not_touch_admin_fields() {
    let profile_only = AdminUserUpdate {
        profile: ProfileUpdate {
            bio: Some("Wheel shop lead".into()),
            ..ProfileUpdate::default()
        },
        ..AdminUserUpdate::default()
    };
    let promotion = AdminUserUpdate {
        is_staff: Some(true),
        ..AdminUserUpdate::default()
    };
    assert!(!profile_only.touches_admin_fields());
    assert!(promotion.touches_admin_fields());
}
