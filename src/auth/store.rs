//! User store contract and in-memory implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::models::{FieldValue, UserField, UserRecord};
use crate::error::Result;

/// Keyed access to user rows
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find the first record whose `field` equals `value`
    async fn find_by(
        &self,
        field: UserField,
        value: &str,
        projection: Option<&[String]>,
    ) -> Result<Option<UserRecord>>;

    /// Find a record matching both login id and password hash
    async fn find_by_credentials(
        &self,
        login_id: &str,
        password_hash: &str,
        projection: Option<&[String]>,
    ) -> Result<Option<UserRecord>>;

    /// Write the given fields on the record identified by `id`
    async fn update(&self, id: &str, values: &[(UserField, FieldValue)]) -> Result<()>;
}

/// In-memory user table, shared between clones
///
/// Counts lookups and updates so callers can observe store traffic.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
    lookups: Arc<AtomicUsize>,
    updates: Arc<AtomicUsize>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record
    pub async fn insert(&self, user: UserRecord) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    /// Fetch a record by id without counting it as a lookup
    pub async fn get(&self, id: &str) -> Option<UserRecord> {
        self.users.read().await.get(id).cloned()
    }

    /// Number of `find_by*` calls so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of `update` calls so far
    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by(
        &self,
        field: UserField,
        value: &str,
        _projection: Option<&[String]>,
    ) -> Result<Option<UserRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.get(field) == value).cloned())
    }

    async fn find_by_credentials(
        &self,
        login_id: &str,
        password_hash: &str,
        _projection: Option<&[String]>,
    ) -> Result<Option<UserRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.login_id == login_id && u.password_hash == password_hash)
            .cloned())
    }

    async fn update(&self, id: &str, values: &[(UserField, FieldValue)]) -> Result<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.write().await;
        // A missing row is not an error, same as an UPDATE matching nothing
        let Some(user) = users.get_mut(id) else {
            tracing::debug!("Update matched no user with id {}", id);
            return Ok(());
        };

        for (field, value) in values {
            match (field, value) {
                (UserField::LastLogin, FieldValue::Timestamp(t)) => user.last_login = *t,
                (UserField::LastLogin, FieldValue::Text(s)) => {
                    user.last_login = s.parse().unwrap_or_default()
                }
                (UserField::Id, v) => user.id = v.to_string(),
                (UserField::Username, v) => user.screen_name = v.to_string(),
                (UserField::LoginId, v) => user.login_id = v.to_string(),
                (UserField::Password, v) => user.password_hash = v.to_string(),
                (UserField::LoginHash, v) => user.login_hash = v.to_string(),
            }
        }

        Ok(())
    }
}
