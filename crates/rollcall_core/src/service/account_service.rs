//! Account use-cases: register, sign in, settings.
//!
//! # Responsibility
//! - Validate account input and keep the Users collection consistent.
//! - Keep the session in step with email changes and account deletion.
//!
//! # Invariants
//! - Emails are unique case-insensitively.
//! - A rejected operation writes nothing.
//! - Passwords never appear in log events.

use crate::clock::Clock;
use crate::model::user::{normalize_email, validate_password, User, UserValidationError};
use crate::service::session_service::SessionService;
use crate::store::{KeyValueStore, PersistentStore, StoreError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Account operation failure.
#[derive(Debug)]
pub enum AccountError {
    Validation(UserValidationError),
    PasswordMismatch,
    DuplicateEmail(String),
    UserNotFound(String),
    WrongPassword,
    Store(StoreError),
}

impl Display for AccountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::PasswordMismatch => write!(f, "passwords do not match"),
            Self::DuplicateEmail(email) => write!(f, "an account already exists for `{email}`"),
            Self::UserNotFound(email) => write!(f, "account not found: `{email}`"),
            Self::WrongPassword => write!(f, "wrong password"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AccountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UserValidationError> for AccountError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for AccountError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

pub type AccountResult<T> = Result<T, AccountError>;

/// Account service over an injected store and clock.
pub struct AccountService<'a, S: KeyValueStore> {
    store: &'a PersistentStore<S>,
    clock: &'a dyn Clock,
}

impl<'a, S: KeyValueStore> AccountService<'a, S> {
    pub fn new(store: &'a PersistentStore<S>, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Creates an account.
    ///
    /// Checks, in order: email shape, password length, confirmation,
    /// case-insensitive uniqueness.
    pub fn register(&self, email: &str, password: &str, confirm: &str) -> AccountResult<User> {
        let user = User::new(email, password, self.clock.now_ms())?;
        if password != confirm {
            return Err(AccountError::PasswordMismatch);
        }

        let mut users = self.store.load_users()?;
        if users.iter().any(|existing| existing.has_email(&user.email)) {
            return Err(AccountError::DuplicateEmail(user.email));
        }

        users.push(user.clone());
        self.store.save_users(&users)?;
        info!(
            "event=account_register module=account status=ok user_count={}",
            users.len()
        );
        Ok(user)
    }

    /// Looks up `email` case-insensitively and checks `password`.
    pub fn authenticate(&self, email: &str, password: &str) -> AccountResult<User> {
        let user = self.find(email)?;
        if user.password != password {
            info!("event=account_auth module=account status=rejected reason=wrong_password");
            return Err(AccountError::WrongPassword);
        }
        Ok(user)
    }

    /// Authenticates and opens a session for the stored (canonical) email.
    pub fn sign_in(
        &self,
        sessions: &SessionService<'_, S>,
        email: &str,
        password: &str,
        remember: bool,
    ) -> AccountResult<User> {
        let user = self.authenticate(email, password)?;
        sessions.login(&user.email, remember)?;
        Ok(user)
    }

    pub fn change_password(
        &self,
        email: &str,
        current: &str,
        new_password: &str,
        confirm: &str,
    ) -> AccountResult<()> {
        let mut users = self.store.load_users()?;
        let user = users
            .iter_mut()
            .find(|user| user.email == email)
            .ok_or_else(|| AccountError::UserNotFound(email.to_string()))?;

        if user.password != current {
            return Err(AccountError::WrongPassword);
        }
        validate_password(new_password)?;
        if new_password != confirm {
            return Err(AccountError::PasswordMismatch);
        }

        user.password = new_password.to_string();
        self.store.save_users(&users)?;
        info!("event=account_password module=account status=ok");
        Ok(())
    }

    /// Renames the account and, when signed in, the session.
    ///
    /// Returns the stored (trimmed) new email.
    pub fn change_email(
        &self,
        sessions: &SessionService<'_, S>,
        email: &str,
        new_email: &str,
    ) -> AccountResult<String> {
        let new_email = normalize_email(new_email)?;
        let mut users = self.store.load_users()?;
        if users
            .iter()
            .any(|user| user.has_email(&new_email) && user.email != email)
        {
            return Err(AccountError::DuplicateEmail(new_email));
        }

        let user = users
            .iter_mut()
            .find(|user| user.email == email)
            .ok_or_else(|| AccountError::UserNotFound(email.to_string()))?;
        user.email = new_email.clone();
        self.store.save_users(&users)?;
        sessions.rename(&new_email)?;

        info!("event=account_email module=account status=ok");
        Ok(new_email)
    }

    /// Removes the account and signs out.
    ///
    /// The session is cleared even when no account matches `email`.
    pub fn delete_account(&self, sessions: &SessionService<'_, S>, email: &str) -> AccountResult<()> {
        let mut users = self.store.load_users()?;
        let before = users.len();
        users.retain(|user| user.email != email);
        if users.len() == before {
            sessions.logout()?;
            return Err(AccountError::UserNotFound(email.to_string()));
        }

        self.store.save_users(&users)?;
        sessions.logout()?;
        info!(
            "event=account_delete module=account status=ok user_count={}",
            users.len()
        );
        Ok(())
    }

    fn find(&self, email: &str) -> AccountResult<User> {
        self.store
            .load_users()?
            .into_iter()
            .find(|user| user.has_email(email))
            .ok_or_else(|| AccountError::UserNotFound(email.trim().to_string()))
    }
}
