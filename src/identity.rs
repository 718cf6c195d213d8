//! Identity store: mocked login and registration.
//!
//! Demo accounts are matched first, then accounts created through
//! [`IdentityStore::register`]. Registered passwords are kept as salted Argon2
//! hashes; the session record never carries a password.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Role, User};
use crate::storage::{load_json, save_json, KeyValueStore, REGISTERED_USERS_KEY, SESSION_USER_KEY};
use crate::{Result, StorefrontError};

pub const MIN_PASSWORD_LENGTH: u64 = 6;
pub const DEFAULT_AVATAR: &str = "/placeholder.svg";

/// Fixed demo credentials
#[derive(Clone, Debug)]
pub struct DemoAccount {
    pub user: User,
    pub password: &'static str,
}

pub fn demo_accounts() -> Vec<DemoAccount> {
    vec![
        DemoAccount {
            user: User::new("1", "Demo User", "user@example.com", Role::User).with_avatar(DEFAULT_AVATAR),
            password: "user",
        },
        DemoAccount {
            user: User::new("2", "Admin User", "admin@example.com", Role::Admin).with_avatar(DEFAULT_AVATAR),
            password: "admin",
        },
        DemoAccount {
            user: User::new("5", "Demo Seller", "seller@example.com", Role::Seller).with_avatar(DEFAULT_AVATAR),
            password: "seller",
        },
    ]
}

/// Account created through registration, as persisted
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredAccount {
    #[serde(flatten)]
    pub user: User,
    pub password_hash: String,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl Registration {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { name: name.into(), email: email.into(), password: password.into(), confirm_password: None, role: None }
    }

    pub fn confirmed(mut self, confirm_password: impl Into<String>) -> Self {
        self.confirm_password = Some(confirm_password.into());
        self
    }

    pub fn as_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}

#[derive(Clone, Debug)]
pub struct IdentityStore {
    demo: Vec<DemoAccount>,
    current: Option<User>,
}

impl IdentityStore {
    /// Restore the session user, if one was persisted.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self> {
        let current = match load_json::<User, _>(store, SESSION_USER_KEY) {
            Ok(user) => user,
            Err(StorefrontError::Serialization(e)) => {
                tracing::warn!(error = %e, "discarding unreadable session record");
                None
            }
            Err(e) => return Err(e),
        };
        Ok(Self { demo: demo_accounts(), current })
    }

    pub fn current_user(&self) -> Option<&User> { self.current.as_ref() }

    pub fn require_user(&self) -> Result<&User> { self.current.as_ref().ok_or(StorefrontError::Unauthenticated) }

    /// Signed in and holding the admin role.
    pub fn require_admin(&self) -> Result<&User> {
        let user = self.require_user()?;
        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, role = %user.role, "admin access denied");
            return Err(StorefrontError::Unauthorized);
        }
        Ok(user)
    }

    pub fn login<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, email: &str, password: &str, role_hint: Option<Role>) -> Result<User> {
        let matched = match self.demo.iter().find(|a| a.user.email == email && a.password == password) {
            Some(account) => Some(account.user.clone()),
            None => registered_accounts(&*store)?
                .into_iter()
                .find(|a| a.user.email.eq_ignore_ascii_case(email) && verify_password(password, &a.password_hash))
                .map(|a| a.user),
        };
        let user = match matched {
            Some(user) if role_hint.map_or(true, |role| role == user.role) => user,
            _ => {
                tracing::warn!(email, "login rejected");
                return Err(StorefrontError::InvalidCredentials);
            }
        };
        self.start_session(store, user.clone())?;
        tracing::info!(user_id = %user.id, role = %user.role, "logged in");
        Ok(user)
    }

    pub fn register<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, registration: Registration) -> Result<User> {
        registration.validate()?;
        if registration.confirm_password.as_deref().is_some_and(|c| c != registration.password) {
            return Err(StorefrontError::validation("Passwords do not match"));
        }
        let role = registration.role.unwrap_or_default();
        if role.is_admin() {
            return Err(StorefrontError::validation("Admin accounts cannot be self-registered"));
        }

        let email = registration.email.trim().to_string();
        let mut accounts = registered_accounts(&*store)?;
        let taken = self.demo.iter().any(|a| a.user.email.eq_ignore_ascii_case(&email))
            || accounts.iter().any(|a| a.user.email.eq_ignore_ascii_case(&email));
        if taken { return Err(StorefrontError::EmailAlreadyExists); }

        let user = User::new(Uuid::new_v4().to_string(), registration.name.trim(), email, role).with_avatar(DEFAULT_AVATAR);
        accounts.push(RegisteredAccount { user: user.clone(), password_hash: hash_password(&registration.password)? });
        save_json(store, REGISTERED_USERS_KEY, &accounts)?;
        self.start_session(store, user.clone())?;
        tracing::info!(user_id = %user.id, role = %user.role, "registered");
        Ok(user)
    }

    pub fn logout<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) -> Result<()> {
        if let Some(user) = self.current.take() {
            tracing::info!(user_id = %user.id, "logged out");
        }
        store.remove(SESSION_USER_KEY)
    }

    fn start_session<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, user: User) -> Result<()> {
        save_json(store, SESSION_USER_KEY, &user)?;
        self.current = Some(user);
        Ok(())
    }
}

fn registered_accounts<S: KeyValueStore + ?Sized>(store: &S) -> Result<Vec<RegisteredAccount>> {
    Ok(load_json(store, REGISTERED_USERS_KEY)?.unwrap_or_default())
}

fn hash_password(plain_text: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain_text.as_bytes(), &salt)
        .map_err(|e| StorefrontError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

fn verify_password(plain_text: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| Argon2::default().verify_password(plain_text.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_demo_admin_login() {
        let mut store = MemoryStore::new();
        let mut identity = IdentityStore::load(&store).unwrap();
        let admin = identity.login(&mut store, "admin@example.com", "admin", None).unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(identity.require_admin().is_ok());

        let err = identity.login(&mut store, "admin@example.com", "wrong", None).unwrap_err();
        assert!(matches!(err, StorefrontError::InvalidCredentials));
    }

    #[test]
    fn test_role_hint_must_match() {
        let mut store = MemoryStore::new();
        let mut identity = IdentityStore::load(&store).unwrap();
        let err = identity.login(&mut store, "user@example.com", "user", Some(Role::Admin)).unwrap_err();
        assert!(matches!(err, StorefrontError::InvalidCredentials));
        assert!(identity.current_user().is_none());
    }

    #[test]
    fn test_register_twice_conflicts() {
        let mut store = MemoryStore::new();
        let mut identity = IdentityStore::load(&store).unwrap();
        let user = identity.register(&mut store, Registration::new("Ann", "a@b.com", "secret1")).unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(identity.current_user(), Some(&user));

        let err = identity.register(&mut store, Registration::new("Ann", "A@B.com", "secret2")).unwrap_err();
        assert!(matches!(err, StorefrontError::EmailAlreadyExists));
    }

    #[test]
    fn test_registered_account_can_log_back_in() {
        let mut store = MemoryStore::new();
        let mut identity = IdentityStore::load(&store).unwrap();
        identity.register(&mut store, Registration::new("Ann", "ann@example.com", "secret1").as_role(Role::Seller)).unwrap();
        identity.logout(&mut store).unwrap();
        assert!(store.get(SESSION_USER_KEY).unwrap().is_none());

        let user = identity.login(&mut store, "ann@example.com", "secret1", None).unwrap();
        assert_eq!(user.role, Role::Seller);
        assert!(matches!(identity.require_admin(), Err(StorefrontError::Unauthorized)));
        assert!(identity.login(&mut store, "ann@example.com", "Secret1", None).is_err());
    }

    #[test]
    fn test_passwords_are_never_stored_in_plain_text() {
        let mut store = MemoryStore::new();
        let mut identity = IdentityStore::load(&store).unwrap();
        identity.register(&mut store, Registration::new("Ann", "ann@example.com", "hunter22")).unwrap();
        assert!(!store.get(REGISTERED_USERS_KEY).unwrap().unwrap().contains("hunter22"));
        assert!(!store.get(SESSION_USER_KEY).unwrap().unwrap().contains("password"));
    }

    #[test]
    fn test_registration_validation() {
        let mut store = MemoryStore::new();
        let mut identity = IdentityStore::load(&store).unwrap();
        let mismatch = Registration::new("Ann", "ann@example.com", "secret1").confirmed("secret2");
        assert!(matches!(identity.register(&mut store, mismatch), Err(StorefrontError::Validation(_))));
        let bad_email = Registration::new("Ann", "not-an-email", "secret1");
        assert!(matches!(identity.register(&mut store, bad_email), Err(StorefrontError::Validation(_))));
        let admin = Registration::new("Ann", "ann@example.com", "secret1").as_role(Role::Admin);
        assert!(matches!(identity.register(&mut store, admin), Err(StorefrontError::Validation(_))));
    }

    #[test]
    fn test_session_survives_reload() {
        let mut store = MemoryStore::new();
        let mut identity = IdentityStore::load(&store).unwrap();
        identity.login(&mut store, "user@example.com", "user", None).unwrap();
        let reloaded = IdentityStore::load(&store).unwrap();
        assert_eq!(reloaded.current_user().map(|u| u.email.as_str()), Some("user@example.com"));
    }
}
