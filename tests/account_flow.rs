//! End-to-end account lifecycle over the public API.

use ingresso::{
    AccountService, Error, ErrorKind, MemorySession, MemoryUserStore, SessionContext, UserRole,
    USER_SESSION_KEY,
};

fn service() -> AccountService<MemoryUserStore> {
    AccountService::new(MemoryUserStore::new())
}

#[tokio::test]
async fn full_account_lifecycle() {
    let service = service();
    let mut session = MemorySession::new();

    let id = service
        .register("alice1", "password1", "password1")
        .await
        .expect("registration succeeds");
    assert_eq!(id, 1);

    let view = service
        .login("alice1", "password1", &mut session)
        .await
        .expect("login succeeds");
    assert_eq!(view.id, id);
    assert_eq!(view.account, "alice1");
    assert_eq!(view.role, UserRole::User);

    let user = service
        .current_user(&session)
        .await
        .expect("current user resolves after login");
    assert_eq!(user.id, id);
    assert_eq!(user.account, "alice1");

    assert!(service.logout(&mut session).expect("logout succeeds"));
    assert!(session.get(USER_SESSION_KEY).is_none());

    let err = service.current_user(&session).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let service = service();
    service
        .register("alice1", "password1", "password1")
        .await
        .unwrap();

    let err = service
        .register("alice1", "password1", "password1")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AccountExists));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn login_failures_do_not_reveal_which_field_was_wrong() {
    let service = service();
    let mut session = MemorySession::new();
    service
        .register("alice1", "password1", "password1")
        .await
        .unwrap();

    let wrong_password = service
        .login("alice1", "wrongpass", &mut session)
        .await
        .unwrap_err();
    let unknown_account = service
        .login("nobody99", "password1", &mut session)
        .await
        .unwrap_err();

    assert_eq!(wrong_password.to_string(), unknown_account.to_string());
    assert_eq!(wrong_password.kind(), unknown_account.kind());
}

#[tokio::test]
async fn logout_requires_a_prior_login() {
    let service = service();
    let mut session = MemorySession::new();

    let err = service.logout(&mut session).unwrap_err();
    assert!(matches!(err, Error::NotLoggedIn));

    service
        .register("alice1", "password1", "password1")
        .await
        .unwrap();
    service
        .login("alice1", "password1", &mut session)
        .await
        .unwrap();
    assert!(service.logout(&mut session).unwrap());

    // The second logout finds no session state and fails like the first.
    let err = service.logout(&mut session).unwrap_err();
    assert!(matches!(err, Error::NotLoggedIn));
}

#[tokio::test]
async fn serialized_views_never_carry_the_digest() {
    let service = service();
    let mut session = MemorySession::new();
    service
        .register("alice1", "password1", "password1")
        .await
        .unwrap();

    let view = service
        .login("alice1", "password1", &mut session)
        .await
        .unwrap();
    let json = serde_json::to_value(&view).expect("view serializes");

    assert!(json.get("password_digest").is_none());
    assert!(json.get("password").is_none());
    assert_eq!(json["account"], "alice1");
    assert_eq!(json["display_name"], "no name");
}
