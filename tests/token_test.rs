use std::path::PathBuf;

use chrono::Utc;
use onrepeat::management::TokenManager;
use onrepeat::types::Token;

fn create_test_token(access_token: &str, expires_in: u64) -> Token {
    Token {
        access_token: access_token.to_string(),
        refresh_token: format!("{}_refresh", access_token),
        scope: "user-top-read".to_string(),
        expires_in,
        obtained_at: Utc::now().timestamp() as u64,
    }
}

// Unique scratch directory per test under the system temp dir
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("onrepeat-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test]
async fn test_replace_token_writes_new_token() {
    let path = scratch_dir("replace").join("cache/token.json");
    let mut manager = TokenManager::new(create_test_token("old", 3600)).with_path(&path);

    manager
        .replace_token(create_test_token("new", 3600))
        .await
        .unwrap();

    let saved: Token = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved.access_token, "new");
    assert_eq!(saved.refresh_token, "new_refresh");
}

#[tokio::test]
async fn test_replace_token_keeps_new_token_when_write_fails() {
    let dir = scratch_dir("unwritable");
    // a regular file where the cache directory should be
    let blocker = dir.join("cache");
    std::fs::write(&blocker, "not a directory").unwrap();
    let mut manager =
        TokenManager::new(create_test_token("old", 3600)).with_path(blocker.join("token.json"));

    let result = manager.replace_token(create_test_token("new", 3600)).await;

    assert!(result.is_err());
    assert_eq!(manager.access_token(), "new");
}

#[test]
fn test_is_expired_within_margin() {
    assert!(TokenManager::new(create_test_token("t", 0)).is_expired());
    assert!(TokenManager::new(create_test_token("t", 60)).is_expired());
    assert!(!TokenManager::new(create_test_token("t", 3600)).is_expired());
}
