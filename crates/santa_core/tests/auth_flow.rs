use santa_core::db::open_db_in_memory;
use santa_core::{AuthError, AuthService, SqliteUserRepository, TokenSigner, ValidationError};
use std::time::Duration;

fn signer() -> TokenSigner {
    TokenSigner::new("test-secret", Duration::from_secs(600))
}

#[test]
fn register_then_login_issues_tokens_for_same_user() {
    let conn = open_db_in_memory().unwrap();
    let signer = signer();
    let service = AuthService::new(SqliteUserRepository::new(&conn), &signer);

    let registered = service
        .register(" Admin@SecretSanta.it ", "password123", "Admin")
        .unwrap();
    assert_eq!(registered.user.email, "admin@secretsanta.it");
    assert_eq!(registered.user.name, "Admin");
    assert_ne!(registered.user.password_hash, "password123");

    let logged_in = service
        .login("ADMIN@secretsanta.it", "password123")
        .unwrap();
    assert_eq!(logged_in.user.id, registered.user.id);

    let user = service.authenticate(&logged_in.access_token).unwrap();
    assert_eq!(user.id, registered.user.id);
}

#[test]
fn duplicate_email_is_rejected_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let signer = signer();
    let service = AuthService::new(SqliteUserRepository::new(&conn), &signer);

    service
        .register("elf@north.pole", "password123", "Elf")
        .unwrap();
    let err = service
        .register("ELF@north.pole", "password456", "Other elf")
        .unwrap_err();
    assert!(matches!(err, AuthError::EmailTaken));
}

#[test]
fn login_failures_are_indistinguishable() {
    let conn = open_db_in_memory().unwrap();
    let signer = signer();
    let service = AuthService::new(SqliteUserRepository::new(&conn), &signer);
    service
        .register("elf@north.pole", "password123", "Elf")
        .unwrap();

    let wrong_password = service.login("elf@north.pole", "nope-nope").unwrap_err();
    let unknown_email = service.login("ghost@north.pole", "password123").unwrap_err();
    let malformed_email = service.login("not-an-email", "password123").unwrap_err();

    for err in [wrong_password, unknown_email, malformed_email] {
        assert!(matches!(err, AuthError::InvalidCredentials), "{err}");
    }
}

#[test]
fn register_validates_input() {
    let conn = open_db_in_memory().unwrap();
    let signer = signer();
    let service = AuthService::new(SqliteUserRepository::new(&conn), &signer);

    let short = service.register("a@b.co", "short", "A").unwrap_err();
    assert!(matches!(
        short,
        AuthError::Validation(ValidationError::PasswordTooShort { .. })
    ));

    let bad_email = service.register("a@b", "password123", "A").unwrap_err();
    assert!(matches!(
        bad_email,
        AuthError::Validation(ValidationError::InvalidEmail(_))
    ));

    let blank_name = service.register("a@b.co", "password123", "  ").unwrap_err();
    assert!(matches!(
        blank_name,
        AuthError::Validation(ValidationError::EmptyName(_))
    ));
}

#[test]
fn token_for_deleted_user_is_unknown() {
    let conn = open_db_in_memory().unwrap();
    let signer = signer();
    let service = AuthService::new(SqliteUserRepository::new(&conn), &signer);
    let session = service
        .register("elf@north.pole", "password123", "Elf")
        .unwrap();

    conn.execute("DELETE FROM users;", []).unwrap();
    let err = service.authenticate(&session.access_token).unwrap_err();
    assert!(matches!(err, AuthError::UnknownUser));

    let err = service.authenticate("garbage").unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(_)));
}
