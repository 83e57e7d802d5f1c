use rollcall_core::{
    AccountError, AccountService, ManualClock, MemoryKvStore, PersistentStore, SessionService,
    UserValidationError,
};

const START_MS: i64 = 1_700_000_000_000;

#[test]
fn register_trims_email_and_stores_user() {
    let store = PersistentStore::new(MemoryKvStore::new());
    let clock = ManualClock::new(START_MS);
    let accounts = AccountService::new(&store, &clock);

    let user = accounts
        .register("  Teacher@School.org ", "secret1", "secret1")
        .unwrap();
    assert_eq!(user.email, "Teacher@School.org");
    assert_eq!(user.created_at, START_MS);
    assert_eq!(store.load_users().unwrap(), vec![user]);
}

#[test]
fn register_rejects_case_insensitive_duplicate_without_writing() {
    let store = PersistentStore::new(MemoryKvStore::new());
    let clock = ManualClock::new(START_MS);
    let accounts = AccountService::new(&store, &clock);
    accounts
        .register("teacher@school.org", "secret1", "secret1")
        .unwrap();

    let err = accounts
        .register("TEACHER@School.ORG", "another1", "another1")
        .unwrap_err();
    assert!(matches!(err, AccountError::DuplicateEmail(_)));
    assert_eq!(store.load_users().unwrap().len(), 1);
}

#[test]
fn register_validates_password_rules() {
    let store = PersistentStore::new(MemoryKvStore::new());
    let clock = ManualClock::new(START_MS);
    let accounts = AccountService::new(&store, &clock);

    let short = accounts.register("a@b.io", "12345", "12345").unwrap_err();
    assert!(matches!(
        short,
        AccountError::Validation(UserValidationError::PasswordTooShort { min_chars: 6 })
    ));

    let mismatch = accounts.register("a@b.io", "123456", "1234567").unwrap_err();
    assert!(matches!(mismatch, AccountError::PasswordMismatch));

    let bad_email = accounts.register("not-an-email", "123456", "123456").unwrap_err();
    assert!(matches!(
        bad_email,
        AccountError::Validation(UserValidationError::InvalidEmail(_))
    ));

    assert!(store.load_users().unwrap().is_empty());
}

#[test]
fn sign_in_checks_credentials_and_uses_canonical_email() {
    let store = PersistentStore::new(MemoryKvStore::new());
    let clock = ManualClock::new(START_MS);
    let accounts = AccountService::new(&store, &clock);
    let sessions = SessionService::new(&store, &clock);
    accounts
        .register("Teacher@School.org", "secret1", "secret1")
        .unwrap();

    let missing = accounts
        .sign_in(&sessions, "nobody@school.org", "secret1", false)
        .unwrap_err();
    assert!(matches!(missing, AccountError::UserNotFound(_)));

    let wrong = accounts
        .sign_in(&sessions, "teacher@school.org", "secret2", false)
        .unwrap_err();
    assert!(matches!(wrong, AccountError::WrongPassword));
    assert_eq!(sessions.current_user().unwrap(), None);

    accounts
        .sign_in(&sessions, "teacher@school.org", "secret1", true)
        .unwrap();
    assert_eq!(
        sessions.current_user().unwrap().as_deref(),
        Some("Teacher@School.org")
    );
    assert!(store.load_session().unwrap().unwrap().remember);
}

#[test]
fn change_password_requires_current_and_confirmation() {
    let store = PersistentStore::new(MemoryKvStore::new());
    let clock = ManualClock::new(START_MS);
    let accounts = AccountService::new(&store, &clock);
    accounts.register("a@b.io", "secret1", "secret1").unwrap();

    let wrong = accounts
        .change_password("a@b.io", "nope", "secret2", "secret2")
        .unwrap_err();
    assert!(matches!(wrong, AccountError::WrongPassword));

    let mismatch = accounts
        .change_password("a@b.io", "secret1", "secret2", "secret3")
        .unwrap_err();
    assert!(matches!(mismatch, AccountError::PasswordMismatch));

    accounts
        .change_password("a@b.io", "secret1", "secret2", "secret2")
        .unwrap();
    assert!(accounts.authenticate("a@b.io", "secret2").is_ok());
    assert!(matches!(
        accounts.authenticate("a@b.io", "secret1"),
        Err(AccountError::WrongPassword)
    ));
}

#[test]
fn change_email_renames_user_and_session() {
    let store = PersistentStore::new(MemoryKvStore::new());
    let clock = ManualClock::new(START_MS);
    let accounts = AccountService::new(&store, &clock);
    let sessions = SessionService::new(&store, &clock);
    accounts.register("a@b.io", "secret1", "secret1").unwrap();
    accounts.register("taken@b.io", "secret1", "secret1").unwrap();
    accounts.sign_in(&sessions, "a@b.io", "secret1", false).unwrap();

    let taken = accounts
        .change_email(&sessions, "a@b.io", "TAKEN@b.io")
        .unwrap_err();
    assert!(matches!(taken, AccountError::DuplicateEmail(_)));

    let renamed = accounts
        .change_email(&sessions, "a@b.io", " new@b.io ")
        .unwrap();
    assert_eq!(renamed, "new@b.io");
    assert_eq!(sessions.current_user().unwrap().as_deref(), Some("new@b.io"));
    assert!(accounts.authenticate("new@b.io", "secret1").is_ok());
    assert!(matches!(
        accounts.authenticate("a@b.io", "secret1"),
        Err(AccountError::UserNotFound(_))
    ));
}

#[test]
fn change_email_to_own_address_in_other_case_is_allowed() {
    let store = PersistentStore::new(MemoryKvStore::new());
    let clock = ManualClock::new(START_MS);
    let accounts = AccountService::new(&store, &clock);
    let sessions = SessionService::new(&store, &clock);
    accounts.register("a@b.io", "secret1", "secret1").unwrap();

    let renamed = accounts.change_email(&sessions, "a@b.io", "A@B.io").unwrap();
    assert_eq!(renamed, "A@B.io");
}

#[test]
fn delete_account_removes_user_and_signs_out() {
    let store = PersistentStore::new(MemoryKvStore::new());
    let clock = ManualClock::new(START_MS);
    let accounts = AccountService::new(&store, &clock);
    let sessions = SessionService::new(&store, &clock);
    accounts.register("a@b.io", "secret1", "secret1").unwrap();
    accounts.sign_in(&sessions, "a@b.io", "secret1", false).unwrap();

    accounts.delete_account(&sessions, "a@b.io").unwrap();
    assert!(store.load_users().unwrap().is_empty());
    assert_eq!(sessions.current_user().unwrap(), None);

    let again = accounts.delete_account(&sessions, "a@b.io").unwrap_err();
    assert!(matches!(again, AccountError::UserNotFound(_)));
}

#[test]
fn delete_account_for_unknown_email_still_signs_out() {
    let store = PersistentStore::new(MemoryKvStore::new());
    let clock = ManualClock::new(START_MS);
    let accounts = AccountService::new(&store, &clock);
    let sessions = SessionService::new(&store, &clock);
    accounts.register("a@b.io", "secret1", "secret1").unwrap();
    sessions.login("gone@b.io", false).unwrap();

    let err = accounts.delete_account(&sessions, "gone@b.io").unwrap_err();
    assert!(matches!(err, AccountError::UserNotFound(_)));
    assert_eq!(store.load_session().unwrap(), None);
    assert_eq!(store.load_users().unwrap().len(), 1);
}
