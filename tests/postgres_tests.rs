//! PostgreSQL user store tests
//!
//! Run with: EASYAUTH_TEST_DATABASE_URL="host=localhost user=postgres password=postgres" \
//!     cargo test --test postgres_tests -- --ignored --test-threads=1

use std::sync::Arc;

use easyauth::auth::hash::hash_password;
use easyauth::auth::{
    FieldValue, ManualClock, PostgresUserStore, SessionAuthenticator, SessionManager, UserField,
    UserStore,
};
use easyauth::config::{AuthConfig, Config, ConnectionConfig};

const TABLE: &str = "easyauth_test_users";

async fn connect() -> Option<(PostgresUserStore, tokio_postgres::Client, Config)> {
    let Ok(url) = std::env::var("EASYAUTH_TEST_DATABASE_URL") else {
        println!("⚠ Skipping test: EASYAUTH_TEST_DATABASE_URL not set");
        return None;
    };

    let mut config = Config::default();
    config.auth = AuthConfig {
        table_name: TABLE.to_string(),
        login_hash_salt: "s".to_string(),
        ..Default::default()
    };
    config
        .database
        .connections
        .insert("default".to_string(), ConnectionConfig { url: url.clone() });

    let (admin, connection) = tokio_postgres::connect(&url, tokio_postgres::NoTls)
        .await
        .expect("Failed to connect");
    tokio::spawn(async move {
        let _ = connection.await;
    });

    admin
        .batch_execute(&format!(
            "DROP TABLE IF EXISTS {TABLE};
             CREATE TABLE {TABLE} (
                 id SERIAL PRIMARY KEY,
                 name VARCHAR(64) NOT NULL,
                 login_id VARCHAR(64) NOT NULL UNIQUE,
                 password VARCHAR(128) NOT NULL,
                 last_login BIGINT NOT NULL DEFAULT 0,
                 login_hash VARCHAR(64) NOT NULL DEFAULT ''
             );"
        ))
        .await
        .expect("Failed to create table");

    let password = hash_password("secret", "");
    admin
        .execute(
            &format!("INSERT INTO {TABLE} (name, login_id, password) VALUES ($1, $2, $3)"),
            &[&"Bob", &"bob", &password.as_str()],
        )
        .await
        .expect("Failed to insert user");

    let store = PostgresUserStore::connect(&config)
        .await
        .expect("Failed to create store");
    Some((store, admin, config))
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored --test-threads=1
async fn test_find_and_update() {
    let Some((store, _admin, _config)) = connect().await else {
        return;
    };

    let user = store
        .find_by(UserField::LoginId, "bob", None)
        .await
        .expect("lookup failed")
        .expect("bob should exist");
    assert_eq!(user.screen_name, "Bob");
    assert_eq!(user.last_login, 0);

    store
        .update(
            &user.id,
            &[
                (UserField::LastLogin, FieldValue::Timestamp(1000)),
                (UserField::LoginHash, FieldValue::Text("abc".to_string())),
            ],
        )
        .await
        .expect("update failed");

    let user = store
        .find_by(UserField::Id, &user.id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.last_login, 1000);
    assert_eq!(user.login_hash, "abc");
}

#[tokio::test]
#[ignore]
async fn test_login_round_trip() {
    let Some((store, admin, config)) = connect().await else {
        return;
    };

    let sessions = SessionManager::default();
    let mut auth = SessionAuthenticator::new(
        Arc::new(config.auth.clone()),
        Arc::new(store),
        sessions.handle(None),
    )
    .with_clock(Arc::new(ManualClock::new(1000)));

    assert!(auth.login(Some("bob"), Some("secret")).await.unwrap());

    let row = admin
        .query_one(&format!("SELECT login_hash, last_login FROM {TABLE} WHERE login_id = 'bob'"), &[])
        .await
        .unwrap();
    let login_hash: String = row.get(0);
    let last_login: i64 = row.get(1);
    assert_eq!(login_hash, easyauth::auth::hash::login_hash("s", "bob", 1000));
    assert_eq!(last_login, 1000);

    let session_id = auth.into_session().session_id().map(str::to_string);
    let mut auth = SessionAuthenticator::new(
        Arc::new(config.auth.clone()),
        Arc::new(PostgresUserStore::connect(&config).await.unwrap()),
        sessions.handle(session_id),
    );
    assert!(auth.check_existing_session().await.unwrap());
    assert_eq!(auth.get_user_id().map(|i| i.user_id), Some(1));
}
