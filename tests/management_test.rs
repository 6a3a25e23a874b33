use photo2playlist::{management::TokenCache, types::Token};

fn token() -> Token {
    Token {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        scope: "playlist-modify-public".to_string(),
        expires_at: 1_714_564_800,
    }
}

#[tokio::test]
async fn test_token_cache_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache/token.json");

    TokenCache::new(token()).persist_to(&path).await.unwrap();
    let loaded = TokenCache::load_from(&path).await.unwrap();

    assert_eq!(loaded.current_token().access_token, "access");
    assert_eq!(loaded.into_token().expires_at, 1_714_564_800);
}

#[tokio::test]
async fn test_token_cache_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    assert!(TokenCache::load_from(&dir.path().join("nope.json")).await.is_err());
}

#[tokio::test]
async fn test_token_cache_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.json");
    std::fs::write(&path, "not json").unwrap();

    assert!(TokenCache::load_from(&path).await.is_err());
}
