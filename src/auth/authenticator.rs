//! Login driver: credential validation and login hash session checks

use async_trait::async_trait;
use std::sync::Arc;

use crate::auth::clock::{Clock, SystemClock};
use crate::auth::hash;
use crate::auth::models::{
    Credentials, FieldValue, FormInput, NoInput, UserField, UserIdentity, UserRecord,
};
use crate::auth::session::{SessionStore, LOGIN_HASH_KEY, USER_ID_KEY};
use crate::auth::store::UserStore;
use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// Capability the hosting application calls on every request
#[async_trait]
pub trait Authenticator: Send {
    /// Whether the current session is still authenticated
    async fn check(&mut self) -> Result<bool>;

    /// Log in with explicit credentials, or the posted form fields when `None`
    async fn login(&mut self, login_id: Option<&str>, password: Option<&str>) -> Result<bool>;

    async fn logout(&mut self) -> Result<bool>;

    /// Identity of the authenticated user
    fn identity(&self) -> Option<UserIdentity>;
}

/// Authenticates one request against the user table and its session
///
/// The session holds `user_id` and `login_hash`. The session is trusted only
/// while its `login_hash` equals the one stored on the user row; every failed
/// check destroys it.
pub struct SessionAuthenticator<S> {
    config: Arc<AuthConfig>,
    users: Arc<dyn UserStore>,
    session: S,
    clock: Arc<dyn Clock>,
    input: Arc<dyn FormInput>,
    user: Option<UserRecord>,
}

impl<S: SessionStore> SessionAuthenticator<S> {
    pub fn new(config: Arc<AuthConfig>, users: Arc<dyn UserStore>, session: S) -> Self {
        Self {
            config,
            users,
            session,
            clock: Arc::new(SystemClock),
            input: Arc::new(NoInput),
            user: None,
        }
    }

    /// Use a different time source for login hashes
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Posted form fields used when credentials aren't passed explicitly
    pub fn with_input(mut self, input: Arc<dyn FormInput>) -> Self {
        self.input = input;
        self
    }

    /// Currently authenticated record
    pub fn user(&self) -> Option<&UserRecord> {
        self.user.as_ref()
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn into_session(self) -> S {
        self.session
    }

    /// Validate the login hash stored in the session
    pub async fn check_existing_session(&mut self) -> Result<bool> {
        let user_id = non_empty(self.session.get(USER_ID_KEY).await?);
        let login_hash = non_empty(self.session.get(LOGIN_HASH_KEY).await?);

        // only worth a lookup with both a user id and a login hash
        if let (Some(user_id), Some(login_hash)) = (&user_id, &login_hash) {
            self.user = self
                .users
                .find_by(UserField::Id, user_id, self.config.projection())
                .await?;

            if let Some(user) = &self.user {
                if user.login_hash == *login_hash {
                    return Ok(true);
                }
                tracing::warn!("Login hash mismatch for user {}, discarding session", user.id);
            } else {
                tracing::debug!("Session references unknown user {}", user_id);
            }
        }

        self.reset().await?;
        Ok(false)
    }

    /// Look up the user matching the given or posted credentials
    pub async fn validate_credentials(
        &self,
        login_id: Option<&str>,
        password: Option<&str>,
    ) -> Result<Option<UserRecord>> {
        let credentials = Credentials::new(
            self.resolve_input(login_id, UserField::LoginId),
            self.resolve_input(password, UserField::Password),
        );
        if !credentials.is_complete() {
            return Ok(None);
        }

        tracing::debug!(?credentials, "Validating credentials");
        let password_hash = hash::hash_password(&credentials.password, &self.config.password_salt);
        self.users
            .find_by_credentials(&credentials.login_id, &password_hash, self.config.projection())
            .await
    }

    /// Log in a user by credentials and rotate the session id
    pub async fn login(&mut self, login_id: Option<&str>, password: Option<&str>) -> Result<bool> {
        let Some(user) = self.validate_credentials(login_id, password).await? else {
            tracing::info!("Login failed");
            self.reset().await?;
            return Ok(false);
        };

        self.start_session(user).await?;
        self.session.rotate_transport_token().await?;

        Ok(true)
    }

    /// Log in a user by id without checking a password
    ///
    /// Performs no authorization check of its own; callers must restrict who
    /// may impersonate whom. The session id is only rotated when
    /// `rotate_on_force_login` is set.
    pub async fn force_login(&mut self, user_id: &str) -> Result<bool> {
        let user_id = user_id.trim();
        let user = if user_id.is_empty() {
            None
        } else {
            self.users
                .find_by(UserField::Id, user_id, self.config.projection())
                .await?
        };

        let Some(user) = user else {
            tracing::info!("Forced login failed for user id '{}'", user_id);
            self.reset().await?;
            return Ok(false);
        };

        self.start_session(user).await?;
        if self.config.rotate_on_force_login {
            self.session.rotate_transport_token().await?;
        }

        Ok(true)
    }

    /// Log out the current user
    pub async fn logout(&mut self) -> Result<bool> {
        if let Some(user) = &self.user {
            tracing::info!("User {} logged out", user.id);
        }
        self.reset().await?;
        Ok(true)
    }

    /// Issue a new login hash for the bound user and persist it
    pub async fn create_login_hash(&mut self) -> Result<String> {
        let user = self.user.as_mut().ok_or(Error::NotLoggedIn)?;

        let last_login = self.clock.now();
        let login_hash = hash::login_hash(&self.config.login_hash_salt, &user.login_id, last_login);

        self.users
            .update(
                &user.id,
                &[
                    (UserField::LastLogin, FieldValue::Timestamp(last_login)),
                    (UserField::LoginHash, FieldValue::Text(login_hash.clone())),
                ],
            )
            .await?;

        user.last_login = last_login;
        user.login_hash = login_hash.clone();

        Ok(login_hash)
    }

    /// Driver id and numeric user id of the bound user
    pub fn get_user_id(&self) -> Option<UserIdentity> {
        self.user.as_ref().map(|user| UserIdentity {
            driver_id: self.config.driver_id.clone(),
            user_id: user.numeric_id(),
        })
    }

    pub fn get_screen_name(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.screen_name.as_str())
    }

    /// Groups are not supported by this driver
    pub fn get_groups(&self) -> Option<Vec<String>> {
        None
    }

    /// Email addresses are not supported by this driver
    pub fn get_email(&self) -> Option<String> {
        None
    }

    async fn start_session(&mut self, user: UserRecord) -> Result<()> {
        let user_id = user.id.clone();
        self.user = Some(user);

        self.session.set(USER_ID_KEY, user_id.clone()).await?;
        let login_hash = self.create_login_hash().await?;
        self.session.set(LOGIN_HASH_KEY, login_hash).await?;

        tracing::info!("User {} logged in", user_id);
        Ok(())
    }

    async fn reset(&mut self) -> Result<()> {
        self.user = None;
        self.session.destroy().await
    }

    fn resolve_input(&self, explicit: Option<&str>, field: UserField) -> String {
        let explicit = explicit.map(str::trim).unwrap_or_default();
        if !explicit.is_empty() {
            return explicit.to_string();
        }
        self.input
            .post_field(self.config.fields.column(field))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }
}

#[async_trait]
impl<S: SessionStore> Authenticator for SessionAuthenticator<S> {
    async fn check(&mut self) -> Result<bool> {
        self.check_existing_session().await
    }

    async fn login(&mut self, login_id: Option<&str>, password: Option<&str>) -> Result<bool> {
        SessionAuthenticator::login(self, login_id, password).await
    }

    async fn logout(&mut self) -> Result<bool> {
        SessionAuthenticator::logout(self).await
    }

    fn identity(&self) -> Option<UserIdentity> {
        self.get_user_id()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
