mod common;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};

use folio::error::AuthError;
use folio::routing::{Authorization, Landings};
use folio::session::{AuthApi, AuthSession, SessionState, SessionStore};
use folio::storage::{FileStore, KeyValueStore, MemoryStore};

const KEY: &str = "adminToken";

/// Accepts one password and hands out a fixed credential
struct ScriptedAuth {
    password: &'static str,
    credential: String,
}

#[async_trait]
impl AuthApi for ScriptedAuth {
    async fn login(&self, _email: &str, password: &str) -> Result<String, AuthError> {
        if password == self.password {
            Ok(self.credential.clone())
        } else {
            Err(AuthError::authentication_failed(Some("Invalid email or password".to_string())))
        }
    }
}

fn auth_session(storage: Arc<dyn KeyValueStore>, credential: String) -> AuthSession {
    let store = Arc::new(SessionStore::new(storage, KEY));
    store.rehydrate();
    let api = Arc::new(ScriptedAuth {
        password: common::PASSWORD,
        credential,
    });
    AuthSession::new(store, api, Landings::default())
}

#[test]
fn undecodable_credentials_rehydrate_as_anonymous() {
    let valid = common::mint("u1", "admin", 3600);
    let header_only = valid.split('.').next().unwrap_or_default().to_string();
    let corrupt = [
        "".to_string(),
        "garbage".to_string(),
        "a.b.c".to_string(),
        header_only,
        format!("{}.", valid),
    ];

    for credential in corrupt {
        let storage = Arc::new(MemoryStore::with_entry(KEY, &credential));
        let auth = auth_session(storage.clone(), String::new());

        assert_eq!(auth.current_state(), SessionState::Anonymous, "{credential:?}");
        assert!(!storage.contains(KEY), "slot not cleared for {credential:?}");
    }
}

#[test]
fn expired_credential_downgrades_idempotently() {
    let now = Utc::now();
    let storage = Arc::new(MemoryStore::new());
    let auth = auth_session(storage.clone(), String::new());
    auth.store().set(&common::mint("u1", "admin", 60)).unwrap();

    assert_eq!(auth.current_state_at(now).authorization(), Authorization::Admin);

    let after_expiry = now + Duration::minutes(5);
    for _ in 0..3 {
        assert_eq!(auth.current_state_at(after_expiry), SessionState::Anonymous);
    }
    assert!(!storage.contains(KEY));
}

#[test]
fn rehydrate_adopts_expired_credential_until_first_read() {
    let storage = Arc::new(MemoryStore::with_entry(KEY, &common::mint("u1", "admin", -10)));
    let auth = auth_session(storage.clone(), String::new());

    assert!(auth.store().credential().is_some());
    assert_eq!(auth.current_state(), SessionState::Anonymous);
    assert!(!storage.contains(KEY));
}

#[test]
fn set_clear_rehydrate_leaves_no_residue() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::in_dir(dir.path())?);

    let store = SessionStore::new(Arc::clone(&storage), KEY);
    store.set(&common::mint("u1", "admin", 3600))?;
    store.clear()?;

    // Fresh process over the same file
    let reloaded = Arc::new(SessionStore::new(storage, KEY));
    assert!(reloaded.rehydrate().is_none());
    let auth = AuthSession::new(
        reloaded,
        Arc::new(ScriptedAuth { password: "x", credential: String::new() }),
        Landings::default(),
    );
    assert_eq!(auth.current_state(), SessionState::Anonymous);
    Ok(())
}

#[test]
fn session_survives_reload_through_file_store() -> Result<()> {
    let dir = tempfile::tempdir()?;
    {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::in_dir(dir.path())?);
        SessionStore::new(storage, KEY).set(&common::mint("u9", "client", 3600))?;
    }

    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::in_dir(dir.path())?);
    let auth = auth_session(storage, String::new());
    match auth.current_state() {
        SessionState::Authenticated { subject_id, .. } => assert_eq!(subject_id, "u9"),
        other => panic!("expected authenticated, got {other:?}"),
    }
    assert_eq!(auth.authorization(), Authorization::Client);
    Ok(())
}

#[tokio::test]
async fn wrong_password_reports_server_message_and_keeps_anonymous() {
    let storage = Arc::new(MemoryStore::new());
    let auth = auth_session(storage.clone(), common::mint("u1", "admin", 3600));

    let err = auth.login(common::ADMIN_EMAIL, "wrong").await.unwrap_err();
    assert_eq!(err, AuthError::AuthenticationFailed("Invalid email or password".to_string()));
    assert_eq!(auth.current_state(), SessionState::Anonymous);
    assert!(!storage.contains(KEY));
}

#[tokio::test]
async fn failed_login_does_not_disturb_existing_session() {
    let storage = Arc::new(MemoryStore::new());
    let auth = auth_session(storage.clone(), common::mint("u2", "admin", 3600));
    auth.store().set(&common::mint("u1", "admin", 3600)).unwrap();

    assert!(auth.login(common::ADMIN_EMAIL, "wrong").await.is_err());
    match auth.current_state() {
        SessionState::Authenticated { subject_id, .. } => assert_eq!(subject_id, "u1"),
        other => panic!("expected authenticated, got {other:?}"),
    }
}

#[tokio::test]
async fn corrupt_storage_file_still_allows_login() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = Arc::new(FileStore::in_dir(dir.path())?);
    std::fs::write(storage.path(), "{not json")?;

    let auth = auth_session(storage.clone(), common::mint("u1", "admin", 3600));
    assert_eq!(auth.current_state(), SessionState::Anonymous);

    auth.login(common::ADMIN_EMAIL, common::PASSWORD).await?;
    assert_eq!(auth.authorization(), Authorization::Admin);

    let reloaded = auth_session(Arc::new(FileStore::in_dir(dir.path())?), String::new());
    assert_eq!(reloaded.authorization(), Authorization::Admin);
    Ok(())
}

#[tokio::test]
async fn unusable_credential_from_server_fails_login() {
    for credential in ["garbage".to_string(), common::mint("u1", "admin", -60)] {
        let storage = Arc::new(MemoryStore::new());
        let auth = auth_session(storage.clone(), credential);

        let err = auth.login(common::ADMIN_EMAIL, common::PASSWORD).await.unwrap_err();
        assert_eq!(err.message(), folio::error::LOGIN_FAILED_MESSAGE);
        assert_eq!(auth.current_state(), SessionState::Anonymous);
        assert!(!storage.contains(KEY));
    }
}
