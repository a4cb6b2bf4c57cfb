//! Tests for the authentication service.

use std::sync::Arc;

use rstest::{fixture, rstest};
use zeroize::Zeroizing;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{AccountFlags, MockUserRepository, UserPersistenceError};
use crate::test_support::fixtures::{account, actor_for};
use crate::test_support::{
    InMemoryRefreshTokenRepository, InMemoryUserRepository, MutableClock, PlainTextHasher,
    TransparentTokenCodec,
};

type Service = AuthenticationService<InMemoryUserRepository, InMemoryRefreshTokenRepository>;

struct Harness {
    users: Arc<InMemoryUserRepository>,
    tokens: Arc<InMemoryRefreshTokenRepository>,
    clock: Arc<MutableClock>,
    service: Service,
}

#[fixture]
fn harness() -> Harness {
    let users = Arc::new(InMemoryUserRepository::new());
    let tokens = Arc::new(InMemoryRefreshTokenRepository::new());
    let clock = Arc::new(MutableClock::fixed());
    let service = AuthenticationService::new(
        Arc::clone(&users),
        Arc::clone(&tokens),
        Arc::new(PlainTextHasher),
        Arc::new(TransparentTokenCodec::new(clock.clone())),
        clock.clone(),
    );
    Harness {
        users,
        tokens,
        clock,
        service,
    }
}

fn registration(phone: &str) -> RegistrationRequest {
    RegistrationRequest {
        phone_number: phone.to_owned(),
        password: Zeroizing::new("correct-horse".to_owned()),
        confirm_password: Zeroizing::new("correct-horse".to_owned()),
        first_name: "Ravi".to_owned(),
        last_name: "Menon".to_owned(),
        email: None,
    }
}

fn credentials(phone: &str, password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(phone, password).expect("non-blank credentials")
}

#[rstest]
#[tokio::test]
async fn register_stores_the_account_and_signs_it_in(harness: Harness) {
    let grant = harness
        .service
        .register(registration("+1234567890"))
        .await
        .expect("registration succeeds");

    assert_eq!(grant.user.phone_number.as_str(), "+1234567890");
    assert!(!grant.user.is_staff);
    assert_eq!(grant.tokens.token_type, "Bearer");
    assert_eq!(grant.tokens.expires_in, 3_600);
    assert_eq!(harness.users.count(), 1);
    assert_eq!(harness.tokens.outstanding(&grant.user.id), 1);
}

#[rstest]
#[tokio::test]
async fn duplicate_phone_registration_conflicts_without_a_second_row(harness: Harness) {
    harness
        .service
        .register(registration("+1234567890"))
        .await
        .expect("first registration");

    let error = harness
        .service
        .register(registration("+1234567890"))
        .await
        .expect_err("duplicate phone");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert!(error.errors().contains("phone_number"));
    assert_eq!(harness.users.count(), 1);
}

#[rstest]
#[tokio::test]
async fn registration_reports_every_invalid_field(harness: Harness) {
    let request = RegistrationRequest {
        phone_number: "12-34".to_owned(),
        password: Zeroizing::new("short".to_owned()),
        confirm_password: Zeroizing::new("other".to_owned()),
        first_name: " ".to_owned(),
        last_name: "Menon".to_owned(),
        email: Some("not-an-email".to_owned()),
    };

    let error = harness
        .service
        .register(request)
        .await
        .expect_err("invalid registration");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    for field in ["phone_number", "password", "confirm_password", "first_name", "email"] {
        assert!(error.errors().contains(field), "missing {field}");
    }
    assert_eq!(harness.users.count(), 0);
}

#[rstest]
#[tokio::test]
async fn login_issues_tokens_and_stamps_last_login(harness: Harness) {
    harness
        .service
        .register(registration("+1234567890"))
        .await
        .expect("registration");
    harness.clock.advance_seconds(60);

    let grant = harness
        .service
        .login(credentials("+1234567890", "correct-horse"))
        .await
        .expect("login succeeds");

    let stored = harness.users.get(&grant.user.id).expect("stored user");
    assert_eq!(stored.last_login, Some(harness.clock.utc()));
    assert_eq!(grant.user.last_login, stored.last_login);
}

#[rstest]
#[case::unknown_phone("+1987654321", "correct-horse", true)]
#[case::wrong_password("+1234567890", "wrong-horse", true)]
#[case::malformed_phone("12-34", "correct-horse", true)]
#[case::inactive_account("+1234567890", "correct-horse", false)]
#[tokio::test]
async fn login_failures_are_indistinguishable(
    harness: Harness,
    #[case] phone: &str,
    #[case] password: &str,
    #[case] active: bool,
) {
    let user = User {
        is_active: active,
        ..account("+1234567890")
    };
    harness.users.seed(user, "plain$correct-horse");

    let error = harness
        .service
        .login(credentials(phone, password))
        .await
        .expect_err("login rejected");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), INVALID_CREDENTIALS);
}

#[rstest]
#[tokio::test]
async fn refresh_tokens_are_single_use(harness: Harness) {
    let grant = harness
        .service
        .register(registration("+1234567890"))
        .await
        .expect("registration");

    let rotated = harness
        .service
        .refresh(&grant.tokens.refresh_token)
        .await
        .expect("first refresh succeeds");
    assert_ne!(rotated.refresh_token, grant.tokens.refresh_token);

    let error = harness
        .service
        .refresh(&grant.tokens.refresh_token)
        .await
        .expect_err("reuse rejected");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), INVALID_REFRESH_TOKEN);

    harness
        .service
        .refresh(&rotated.refresh_token)
        .await
        .expect("replacement still valid");
}

#[rstest]
#[tokio::test]
async fn concurrent_refreshes_with_one_token_rotate_once(harness: Harness) {
    let grant = harness
        .service
        .register(registration("+1234567890"))
        .await
        .expect("registration");
    let token = grant.tokens.refresh_token.as_str();

    let (first, second) = tokio::join!(
        harness.service.refresh(token),
        harness.service.refresh(token)
    );

    let (winner, loser) = match (first, second) {
        (Ok(pair), Err(error)) | (Err(error), Ok(pair)) => (pair, error),
        (first, second) => panic!("expected one rotation, got {first:?} and {second:?}"),
    };
    assert_eq!(loser.code(), ErrorCode::Unauthorized);
    assert_eq!(harness.tokens.outstanding(&grant.user.id), 1);
    harness
        .service
        .refresh(&winner.refresh_token)
        .await
        .expect("winning token rotates");
}

#[rstest]
#[tokio::test]
async fn rotation_prunes_dead_tokens(harness: Harness) {
    let grant = harness
        .service
        .register(registration("+1234567890"))
        .await
        .expect("registration");
    let issued_at = harness.clock.utc() - TimeDelta::days(30);
    harness
        .tokens
        .store(&RefreshTokenRecord {
            token_id: Uuid::new_v4(),
            user_id: grant.user.id,
            issued_at,
            expires_at: issued_at + TimeDelta::days(7),
        })
        .await
        .expect("stale token stored");
    assert_eq!(harness.tokens.held(&grant.user.id), 2);

    harness
        .service
        .refresh(&grant.tokens.refresh_token)
        .await
        .expect("refresh");

    assert_eq!(harness.tokens.held(&grant.user.id), 1);
}

#[rstest]
#[tokio::test]
async fn expired_refresh_tokens_are_rejected(harness: Harness) {
    let grant = harness
        .service
        .register(registration("+1234567890"))
        .await
        .expect("registration");
    harness.clock.advance_seconds(7 * 24 * 3_600 + 1);

    let error = harness
        .service
        .refresh(&grant.tokens.refresh_token)
        .await
        .expect_err("expired");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn refresh_is_refused_once_the_account_is_deactivated(harness: Harness) {
    let grant = harness
        .service
        .register(registration("+1234567890"))
        .await
        .expect("registration");
    harness
        .users
        .set_flags(&grant.user.id, AccountFlags::deactivated())
        .await
        .expect("deactivate");

    let error = harness
        .service
        .refresh(&grant.tokens.refresh_token)
        .await
        .expect_err("inactive");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn authenticate_reads_the_current_staff_flag(harness: Harness) {
    let grant = harness
        .service
        .register(registration("+1234567890"))
        .await
        .expect("registration");
    harness
        .users
        .set_flags(
            &grant.user.id,
            AccountFlags {
                is_staff: Some(true),
                ..AccountFlags::default()
            },
        )
        .await
        .expect("promote");

    let actor = harness
        .service
        .authenticate(&grant.tokens.access_token)
        .await
        .expect("token resolves");

    assert_eq!(actor.user_id, grant.user.id);
    assert!(actor.is_staff);
}

#[rstest]
#[tokio::test]
async fn authenticate_rejects_garbage_tokens(harness: Harness) {
    let error = harness
        .service
        .authenticate("not-a-token")
        .await
        .expect_err("rejected");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn refresh_tokens_do_not_authenticate_requests(harness: Harness) {
    let grant = harness
        .service
        .register(registration("+1234567890"))
        .await
        .expect("registration");

    let error = harness
        .service
        .authenticate(&grant.tokens.refresh_token)
        .await
        .expect_err("wrong token type");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn changing_the_password_revokes_refresh_tokens(harness: Harness) {
    let grant = harness
        .service
        .register(registration("+1234567890"))
        .await
        .expect("registration");
    let actor = actor_for(&grant.user);

    harness
        .service
        .change_password(
            &actor,
            PasswordChange {
                old_password: Zeroizing::new("correct-horse".to_owned()),
                new_password: Zeroizing::new("battery-staple".to_owned()),
                confirm_password: Zeroizing::new("battery-staple".to_owned()),
            },
        )
        .await
        .expect("password changed");

    assert_eq!(harness.tokens.outstanding(&grant.user.id), 0);
    assert_eq!(
        harness.tokens.revocations(&grant.user.id),
        vec![Some(harness.clock.utc())]
    );
    harness
        .service
        .login(credentials("+1234567890", "battery-staple"))
        .await
        .expect("new password works");
    let error = harness
        .service
        .refresh(&grant.tokens.refresh_token)
        .await
        .expect_err("old refresh token revoked");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn changing_the_password_requires_the_old_one(harness: Harness) {
    let grant = harness
        .service
        .register(registration("+1234567890"))
        .await
        .expect("registration");

    let error = harness
        .service
        .change_password(
            &actor_for(&grant.user),
            PasswordChange {
                old_password: Zeroizing::new("guess-work".to_owned()),
                new_password: Zeroizing::new("battery-staple".to_owned()),
                confirm_password: Zeroizing::new("battery-staple".to_owned()),
            },
        )
        .await
        .expect_err("wrong old password");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert!(error.errors().contains("old_password"));
    assert_eq!(harness.tokens.outstanding(&grant.user.id), 1);
}

#[tokio::test]
async fn repository_outages_surface_as_service_unavailable() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_credentials()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::connection("refused")));
    let clock = Arc::new(MutableClock::fixed());
    let service = AuthenticationService::new(
        Arc::new(users),
        Arc::new(InMemoryRefreshTokenRepository::new()),
        Arc::new(PlainTextHasher),
        Arc::new(TransparentTokenCodec::new(clock.clone())),
        clock,
    );

    let error = service
        .login(credentials("+1234567890", "correct-horse"))
        .await
        .expect_err("outage");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
