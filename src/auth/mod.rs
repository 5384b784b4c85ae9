//! Login driver, its collaborators and session management

pub mod authenticator;
pub mod clock;
pub mod hash;
pub mod middleware;
pub mod models;
pub mod postgres;
pub mod session;
pub mod store;

pub use authenticator::{Authenticator, SessionAuthenticator};
pub use clock::{Clock, ManualClock, SystemClock};
pub use middleware::{require_auth, session_id_from_request, CurrentUser};
pub use models::{
    Credentials, FieldValue, FormInput, NoInput, UserField, UserIdentity, UserInfo, UserRecord,
};
pub use postgres::PostgresUserStore;
pub use session::{SessionHandle, SessionManager, SessionStore, LOGIN_HASH_KEY, USER_ID_KEY};
pub use store::{MemoryUserStore, UserStore};
