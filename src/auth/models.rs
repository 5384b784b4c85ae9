//! Authentication models

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Logical columns of the user table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserField {
    Id,
    Username,
    LoginId,
    Password,
    LastLogin,
    LoginHash,
}

impl UserField {
    pub const ALL: [UserField; 6] = [
        UserField::Id,
        UserField::Username,
        UserField::LoginId,
        UserField::Password,
        UserField::LastLogin,
        UserField::LoginHash,
    ];

    /// Fields a restricted projection has to select
    pub const REQUIRED: [UserField; 5] = [
        UserField::Id,
        UserField::LoginId,
        UserField::Password,
        UserField::LastLogin,
        UserField::LoginHash,
    ];
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserField::Id => write!(f, "id"),
            UserField::Username => write!(f, "username"),
            UserField::LoginId => write!(f, "login_id"),
            UserField::Password => write!(f, "password"),
            UserField::LastLogin => write!(f, "last_login"),
            UserField::LoginHash => write!(f, "login_hash"),
        }
    }
}

/// A row of the user table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Opaque identifier, kept in string form
    pub id: String,
    /// Unique credential handle
    pub login_id: String,
    /// Stored password hash
    pub password_hash: String,
    /// Unix timestamp of the last login, 0 if never
    pub last_login: i64,
    /// Current session validation token
    pub login_hash: String,
    pub screen_name: String,
}

impl UserRecord {
    /// Create a record that has never logged in
    pub fn new(
        id: impl Into<String>,
        login_id: impl Into<String>,
        password_hash: impl Into<String>,
        screen_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            login_id: login_id.into(),
            password_hash: password_hash.into(),
            last_login: 0,
            login_hash: String::new(),
            screen_name: screen_name.into(),
        }
    }

    /// Value of a logical field in string form
    pub fn get(&self, field: UserField) -> String {
        match field {
            UserField::Id => self.id.clone(),
            UserField::Username => self.screen_name.clone(),
            UserField::LoginId => self.login_id.clone(),
            UserField::Password => self.password_hash.clone(),
            UserField::LastLogin => self.last_login.to_string(),
            UserField::LoginHash => self.login_hash.clone(),
        }
    }

    /// Numeric form of the id, read like an integer cast
    ///
    /// Leading whitespace and an optional sign are accepted, then digits up to
    /// the first non-digit. No digits gives 0; out of range saturates.
    pub fn numeric_id(&self) -> i64 {
        let id = self.id.trim_start();
        let (negative, digits) = match id.as_bytes().first() {
            Some(b'-') => (true, &id[1..]),
            Some(b'+') => (false, &id[1..]),
            _ => (false, id),
        };

        let end = digits
            .bytes()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(digits.len());
        let digits = &digits[..end];
        if digits.is_empty() {
            return 0;
        }

        let signed = if negative {
            format!("-{}", digits)
        } else {
            digits.to_string()
        };
        signed
            .parse()
            .unwrap_or(if negative { i64::MIN } else { i64::MAX })
    }
}

/// Value written to a user column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Timestamp(i64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Timestamp(t) => write!(f, "{}", t),
        }
    }
}

/// Submitted login credentials, trimmed
#[derive(Clone, Default)]
pub struct Credentials {
    pub login_id: String,
    pub password: String,
}

impl Credentials {
    pub fn new(login_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login_id: login_id.into(),
            password: password.into(),
        }
    }

    /// Both the login id and the password are present
    pub fn is_complete(&self) -> bool {
        !self.login_id.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login_id", &self.login_id)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Driver id paired with the numeric user id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    pub driver_id: String,
    pub user_id: i64,
}

/// Posted form values of the current request
pub trait FormInput: Send + Sync {
    fn post_field(&self, name: &str) -> Option<String>;
}

impl FormInput for HashMap<String, String> {
    fn post_field(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Request without a form body
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl FormInput for NoInput {
    fn post_field(&self, _name: &str) -> Option<String> {
        None
    }
}

/// User information in responses
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub user_id: i64,
    pub screen_name: String,
}

impl From<&UserRecord> for UserInfo {
    fn from(user: &UserRecord) -> Self {
        Self {
            user_id: user.numeric_id(),
            screen_name: user.screen_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id() {
        let user = UserRecord::new("42", "bob", "x", "Bob");
        assert_eq!(user.numeric_id(), 42);

        let user = UserRecord::new("abc", "bob", "x", "Bob");
        assert_eq!(user.numeric_id(), 0);
    }

    #[test]
    fn test_numeric_id_reads_leading_digits() {
        let id = |s: &str| UserRecord::new(s, "bob", "x", "Bob").numeric_id();
        assert_eq!(id("12abc"), 12);
        assert_eq!(id("  7"), 7);
        assert_eq!(id("-3x"), -3);
        assert_eq!(id("+5"), 5);
        assert_eq!(id("-"), 0);
        assert_eq!(id(""), 0);
        assert_eq!(id("99999999999999999999"), i64::MAX);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("bob", "hunter2");
        let out = format!("{:?}", creds);
        assert!(out.contains("bob"));
        assert!(!out.contains("hunter2"));
    }

    #[test]
    fn test_credentials_complete() {
        assert!(Credentials::new("bob", "secret").is_complete());
        assert!(!Credentials::new("bob", "").is_complete());
        assert!(!Credentials::new("", "secret").is_complete());
    }

    #[test]
    fn test_form_input_lookup() {
        let mut form = HashMap::new();
        form.insert("login_id".to_string(), "bob".to_string());
        assert_eq!(form.post_field("login_id").as_deref(), Some("bob"));
        assert_eq!(form.post_field("password"), None);
        assert_eq!(NoInput.post_field("login_id"), None);
    }
}
