//! Account service: registration, login, profile settings, and history.

use std::sync::Arc;

use crate::domain::password::{hash_password, verify_password};
use crate::domain::{HealthRecord, NewUser, User, UserUpdate, GUEST_USERNAME};
use crate::ports::Storage;
use crate::HealixError;

/// Trimmed, non-empty form value.
fn provided(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

pub struct AccountService<S>
where
    S: Storage,
{
    storage: Arc<S>,
}

impl<S> AccountService<S>
where
    S: Storage,
    S::Error: Into<crate::adapters::StorageError>,
{
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Create an account.
    ///
    /// # Errors
    /// `Validation` for a blank username or password or the reserved guest
    /// name, `Conflict` if taken.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        phone: Option<&str>,
    ) -> Result<User, HealixError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(HealixError::Validation(
                "username and password are required".to_string(),
            ));
        }
        if username.eq_ignore_ascii_case(GUEST_USERNAME) {
            return Err(HealixError::Validation(format!(
                "username '{GUEST_USERNAME}' is reserved"
            )));
        }

        let user = self
            .storage
            .create_user(&NewUser {
                username: username.to_string(),
                password_hash: hash_password(password)?,
                phone: provided(phone),
            })
            .map_err(HealixError::from_storage)?;
        tracing::info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Check credentials; a non-blank `phone` replaces the stored one.
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown user or a wrong password.
    pub fn login(
        &self,
        username: &str,
        password: &str,
        phone: Option<&str>,
    ) -> Result<User, HealixError> {
        let user = self
            .storage
            .find_user(username.trim())
            .map_err(HealixError::from_storage)?
            .ok_or(HealixError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            tracing::info!("Rejected login for user {}", user.id);
            return Err(HealixError::InvalidCredentials);
        }

        match provided(phone) {
            Some(phone) => self
                .storage
                .update_user(
                    &user.username,
                    &UserUpdate {
                        phone: Some(phone),
                        password_hash: None,
                    },
                )
                .map_err(HealixError::from_storage),
            None => Ok(user),
        }
    }

    /// Apply the non-blank fields of a settings form.
    ///
    /// # Errors
    /// `NotFound` if the user no longer exists.
    pub fn update_settings(
        &self,
        username: &str,
        phone: Option<&str>,
        password: Option<&str>,
    ) -> Result<User, HealixError> {
        let update = UserUpdate {
            phone: provided(phone),
            password_hash: match password.filter(|p| !p.is_empty()) {
                Some(p) => Some(hash_password(p)?),
                None => None,
            },
        };

        if update.is_empty() {
            return self.profile(username);
        }
        self.storage
            .update_user(username, &update)
            .map_err(HealixError::from_storage)
    }

    /// # Errors
    /// `NotFound` if the user does not exist.
    pub fn profile(&self, username: &str) -> Result<User, HealixError> {
        self.storage
            .find_user(username)
            .map_err(HealixError::from_storage)?
            .ok_or_else(|| HealixError::NotFound(format!("user {username}")))
    }

    /// Records for a user, newest first.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    pub fn history(&self, username: &str) -> Result<Vec<HealthRecord>, HealixError> {
        self.storage
            .records_for_user(username)
            .map_err(HealixError::from_storage)
    }

    /// Any stored record by id, for the public report view.
    ///
    /// # Errors
    /// `NotFound` for unknown ids.
    pub fn report(&self, record_id: i64) -> Result<HealthRecord, HealixError> {
        self.storage
            .get_record(record_id)
            .map_err(HealixError::from_storage)?
            .ok_or_else(|| HealixError::NotFound(format!("record {record_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::SqliteStorage;
    use crate::domain::{NewHealthRecord, RiskTriple};

    fn create_test_service() -> (AccountService<SqliteStorage>, Arc<SqliteStorage>) {
        let storage = Arc::new(SqliteStorage::in_memory().expect("Should create storage"));
        (AccountService::new(storage.clone()), storage)
    }

    #[test]
    fn test_register_and_login() {
        let (service, _) = create_test_service();
        let user = service
            .register("asha", "s3cret", Some(" +919876543210 "))
            .expect("Should register");
        assert_eq!(user.phone.as_deref(), Some("+919876543210"));
        assert_ne!(user.password_hash, "s3cret");

        let logged_in = service.login("asha", "s3cret", None).expect("Should log in");
        assert_eq!(logged_in.id, user.id);
    }

    #[test]
    fn test_duplicate_username_conflicts() {
        let (service, _) = create_test_service();
        service.register("asha", "a", None).expect("Should register");
        assert!(matches!(
            service.register("asha", "b", None),
            Err(HealixError::Conflict(_))
        ));
    }

    #[test]
    fn test_blank_registration_rejected() {
        let (service, _) = create_test_service();
        assert!(matches!(
            service.register("  ", "pw", None),
            Err(HealixError::Validation(_))
        ));
    }

    #[test]
    fn test_guest_name_is_reserved() {
        let (service, storage) = create_test_service();
        storage
            .append_record(&NewHealthRecord::new(
                None,
                "private chest pain story",
                RiskTriple::from_values(10, 80, 10),
            ))
            .expect("Should append");

        for name in ["Guest", "guest", " GUEST "] {
            assert!(matches!(
                service.register(name, "pw", None),
                Err(HealixError::Validation(_))
            ));
        }
        assert!(matches!(
            service.login("Guest", "pw", None),
            Err(HealixError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let (service, _) = create_test_service();
        service.register("asha", "right", None).expect("Should register");

        assert!(matches!(
            service.login("asha", "wrong", None),
            Err(HealixError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("nobody", "right", None),
            Err(HealixError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_login_updates_phone() {
        let (service, _) = create_test_service();
        service.register("asha", "pw", None).expect("Should register");

        let user = service
            .login("asha", "pw", Some("+919812345678"))
            .expect("Should log in");
        assert_eq!(user.phone.as_deref(), Some("+919812345678"));

        // blank phone leaves it alone
        let user = service.login("asha", "pw", Some("")).expect("Should log in");
        assert_eq!(user.phone.as_deref(), Some("+919812345678"));
    }

    #[test]
    fn test_settings_change_password_and_phone() {
        let (service, _) = create_test_service();
        service.register("asha", "old", Some("111")).expect("Should register");

        let user = service
            .update_settings("asha", Some("222"), Some("new"))
            .expect("Should update");
        assert_eq!(user.phone.as_deref(), Some("222"));
        assert!(service.login("asha", "new", None).is_ok());
        assert!(service.login("asha", "old", None).is_err());

        let unchanged = service
            .update_settings("asha", Some(" "), Some(""))
            .expect("Should be no-op");
        assert_eq!(unchanged.phone.as_deref(), Some("222"));
    }

    #[test]
    fn test_history_and_report() {
        let (service, storage) = create_test_service();
        let record = storage
            .append_record(&NewHealthRecord::new(
                Some("asha"),
                "tired",
                RiskTriple::from_values(10, 20, 30),
            ))
            .expect("Should append");

        assert_eq!(service.history("asha").expect("Should list").len(), 1);
        assert!(service.history("ravi").expect("Should list").is_empty());
        assert_eq!(service.report(record.id).expect("Should find"), record);
        assert!(matches!(service.report(9999), Err(HealixError::NotFound(_))));
    }
}
