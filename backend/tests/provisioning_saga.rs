//! End-to-end behaviour of the provisioning saga over the in-memory store.

use std::sync::Arc;

use accounts::domain::ports::{IdentityStore, ProfileServiceError, UserProvisioning};
use accounts::domain::{
    EmailAddress, Envelope, Error, ErrorCode, LoginCredentials, Password, Status, UserId,
    UserProvisioningService,
};
use rstest::rstest;

mod support;

use support::{Harness, ProfileBehaviour, RecordingProfileService, creation_request};

const EMAIL: &str = "a@x.com";
const PASSWORD: &str = "P@ssw0rd";

fn password() -> Option<Password> {
    Some(Password::new(PASSWORD).expect("non-empty password"))
}

fn email() -> EmailAddress {
    EmailAddress::new(EMAIL).expect("valid email")
}

#[rstest]
#[tokio::test]
async fn new_account_is_created_in_both_stores() {
    let harness = Harness::new(ProfileBehaviour::Accept);

    let envelope = harness
        .service
        .create_user(creation_request(EMAIL), password())
        .await;

    assert_eq!(envelope.status(), Status::Created);
    let user = envelope.into_data().expect("created payload");
    assert_eq!(user.email.as_ref(), EMAIL);

    let stored = harness
        .store
        .find_by_email(&email())
        .await
        .expect("lookup succeeds")
        .expect("identity committed");
    assert_eq!(stored.id(), user.id);
    assert_eq!(stored.created(), user.created);

    let requests = harness.profiles.requests();
    assert_eq!(requests.len(), 1);
    let profile = requests.first().expect("one profile request");
    assert_eq!(profile.user_id, user.id);
    assert_eq!(profile.city.as_deref(), Some("London"));
}

#[rstest]
#[tokio::test]
async fn repeated_request_conflicts_without_calling_profile_service() {
    let harness = Harness::new(ProfileBehaviour::Accept);
    let first = harness
        .service
        .create_user(creation_request(EMAIL), password())
        .await;
    assert!(first.succeeded());

    let second = harness
        .service
        .create_user(creation_request(" A@X.COM "), password())
        .await;

    assert_eq!(second.status(), Status::Conflict);
    assert_eq!(
        second.error_message(),
        Some("User with given email already exists")
    );
    assert_eq!(harness.profiles.calls(), 1);
    assert_eq!(harness.store.committed_count().expect("store readable"), 1);
}

#[rstest]
#[tokio::test]
async fn rejected_profile_rolls_back_local_identity() {
    let harness = Harness::new(ProfileBehaviour::Reject);

    let envelope = harness
        .service
        .create_user(creation_request(EMAIL), password())
        .await;

    assert_eq!(envelope.status(), Status::InternalError);
    assert!(envelope.data().is_none());
    let after = harness
        .store
        .find_by_email(&email())
        .await
        .expect("lookup succeeds");
    assert!(after.is_none(), "rollback must remove the staged identity");
    assert_eq!(harness.store.committed_count().expect("store readable"), 0);
}

#[rstest]
#[case(ProfileServiceError::transport("connection reset"))]
#[case(ProfileServiceError::timeout("deadline elapsed"))]
#[case(ProfileServiceError::status(503_u16, "unavailable"))]
#[case(ProfileServiceError::decode("expected value at line 1"))]
#[tokio::test]
async fn profile_failures_leave_no_identity_behind(#[case] failure: ProfileServiceError) {
    let harness = Harness::new(ProfileBehaviour::Fail(failure));

    let envelope = harness
        .service
        .create_user(creation_request(EMAIL), password())
        .await;

    assert_eq!(envelope.status(), Status::InternalError);
    assert_eq!(harness.store.committed_count().expect("store readable"), 0);

    let retried = UserProvisioningService::new(
        Arc::clone(&harness.store),
        Arc::new(RecordingProfileService::new(ProfileBehaviour::Accept)),
    )
    .create_user(creation_request(EMAIL), password())
    .await;
    assert_eq!(
        retried.status(),
        Status::Created,
        "a rolled back email must be reusable"
    );
}

#[rstest]
#[tokio::test]
async fn provisioned_account_can_sign_in() {
    let harness = Harness::new(ProfileBehaviour::Accept);
    let created = harness
        .service
        .create_user(creation_request(EMAIL), password())
        .await
        .into_data()
        .expect("created payload");

    let credentials =
        LoginCredentials::try_from_parts(EMAIL, PASSWORD).expect("valid credentials");
    let envelope = harness.service.login_user(credentials).await;

    assert_eq!(envelope.status(), Status::Ok);
    let authenticated = envelope.into_data().expect("login payload");
    assert_eq!(authenticated.user_id, created.id);
    assert!(!authenticated.email_confirmed);
}

#[rstest]
#[case(EMAIL, "wrong-password")]
#[case("nobody@x.com", PASSWORD)]
#[tokio::test]
async fn failed_sign_in_does_not_reveal_which_part_was_wrong(
    #[case] login_email: &str,
    #[case] login_password: &str,
) {
    let harness = Harness::new(ProfileBehaviour::Accept);
    let created = harness
        .service
        .create_user(creation_request(EMAIL), password())
        .await;
    assert!(created.succeeded());

    let credentials = LoginCredentials::try_from_parts(login_email, login_password)
        .expect("valid credentials");
    let envelope = harness.service.login_user(credentials).await;

    assert_eq!(envelope.status(), Status::Unauthorized);
    assert_eq!(envelope.error_message(), Some("authentication failed"));
}

#[rstest]
#[tokio::test]
async fn account_without_password_cannot_sign_in() {
    let harness = Harness::new(ProfileBehaviour::Accept);
    let created = harness
        .service
        .create_user(creation_request(EMAIL), None)
        .await;
    assert!(created.succeeded());

    let credentials =
        LoginCredentials::try_from_parts(EMAIL, PASSWORD).expect("valid credentials");
    let envelope = harness.service.login_user(credentials).await;
    assert_eq!(envelope.status(), Status::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn concurrent_requests_for_one_email_create_one_account() {
    let harness = Harness::new(ProfileBehaviour::Accept);
    let service = Arc::new(harness.service.clone());

    let attempts = (0..8).map(|_| {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .create_user(creation_request(EMAIL), password())
                .await
        })
    });
    let outcomes: Vec<Envelope<_>> = futures::future::join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("task completes"))
        .collect();

    let created = outcomes
        .iter()
        .filter(|outcome| outcome.status() == Status::Created)
        .count();
    assert_eq!(created, 1);
    for outcome in outcomes.iter().filter(|o| !o.succeeded()) {
        assert_eq!(outcome.status(), Status::Conflict);
    }
    assert_eq!(harness.store.committed_count().expect("store readable"), 1);
}

#[rstest]
#[tokio::test]
async fn lookup_by_id_reports_unknown_accounts() {
    let harness = Harness::new(ProfileBehaviour::Accept);
    let created = harness
        .service
        .create_user(creation_request(EMAIL), password())
        .await
        .into_data()
        .expect("created payload");

    let found = harness.service.find_user(created.id).await;
    assert_eq!(found.data(), Some(&created));

    let missing = harness.service.find_user(UserId::random()).await;
    assert_eq!(
        missing.error().map(Error::code),
        Some(ErrorCode::NotFound)
    );
}
