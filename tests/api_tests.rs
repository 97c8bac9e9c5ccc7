//! HTTP-level tests: signup, login, the bearer-gated chirp write path and the
//! supporting admin/static routes, served on an ephemeral port.

use anyhow::Result;
use chrono::Duration;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use chirpy::config::ServerConfig;
use chirpy::identity::{make_jwt, ClaimsCodec, HmacCodec};
use chirpy::server::{router, AppState};
use chirpy::storage::SharedStore;

const SECRET: &str = "integration-secret";

struct TestServer {
    base: String,
    client: reqwest::Client,
}

impl TestServer {
    async fn start(store: SharedStore, file_root: &std::path::Path) -> Result<Self> {
        let mut config = ServerConfig::new(SECRET);
        config.file_root = file_root.to_path_buf();
        let app = router(AppState::new(store, config));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(Self { base: format!("http://{addr}"), client: reqwest::Client::new() })
    }

    async fn with_store(store: SharedStore) -> Result<Self> {
        Self::start(store, std::path::Path::new(".")).await
    }

    async fn send(&self, method: Method, path: &str, bearer: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut req = self.client.request(method, format!("{}{path}", self.base));
        if let Some(token) = bearer {
            req = req.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(v) = body {
            req = req.json(&v);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        Ok((status, value))
    }

    async fn text(&self, path: &str) -> Result<(StatusCode, String)> {
        let resp = self.client.get(format!("{}{path}", self.base)).send().await?;
        let status = resp.status();
        Ok((status, resp.text().await?))
    }

    async fn signup_and_login(&self, email: &str, password: &str) -> Result<(Uuid, String)> {
        let (status, user) = self.send(Method::POST, "/api/users", None, Some(json!({"email": email, "password": password}))).await?;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user["email"], email);
        assert!(user.get("hashed_password").is_none());
        let (status, login) = self.send(Method::POST, "/api/login", None, Some(json!({"email": email, "password": password}))).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(login["id"], user["id"]);
        let id: Uuid = serde_json::from_value(login["id"].clone())?;
        let token = login["token"].as_str().unwrap_or_default().to_string();
        assert!(!token.is_empty());
        Ok((id, token))
    }
}

#[tokio::test]
async fn signup_login_and_post_a_chirp() -> Result<()> {
    let srv = TestServer::with_store(SharedStore::in_memory()).await?;
    let (user_id, token) = srv.signup_and_login("walt@example.com", "04173lol").await?;

    let (status, chirp) = srv.send(Method::POST, "/api/chirps", Some(&token), Some(json!({"body": "this is a kerfuffle opinion"}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(chirp["body"], "this is a **** opinion");
    assert_eq!(chirp["user_id"], user_id.to_string());
    assert!(chirp["created_at"].is_string());

    let path = format!("/api/chirps/{}", chirp["id"].as_str().unwrap_or_default());
    let (status, fetched) = srv.send(Method::GET, &path, None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, chirp);

    let (status, all) = srv.send(Method::GET, "/api/chirps", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all, json!([chirp]));
    Ok(())
}

#[tokio::test]
async fn forged_expired_and_missing_tokens_are_401_and_write_nothing() -> Result<()> {
    let store = SharedStore::in_memory();
    let srv = TestServer::with_store(store.clone()).await?;
    let (user_id, _) = srv.signup_and_login("jesse@example.com", "yo").await?;

    let forged = make_jwt(user_id, b"not-the-server-secret", Duration::hours(1))?;
    let expired = make_jwt(user_id, SECRET.as_bytes(), Duration::seconds(-1))?;
    let body = Some(json!({"body": "hello"}));

    let (s1, e1) = srv.send(Method::POST, "/api/chirps", Some(&forged), body.clone()).await?;
    let (s2, e2) = srv.send(Method::POST, "/api/chirps", Some(&expired), body.clone()).await?;
    let (s3, e3) = srv.send(Method::POST, "/api/chirps", None, body.clone()).await?;
    let (s4, _) = srv.send(Method::POST, "/api/chirps", Some("a b"), body).await?;
    for s in [s1, s2, s3, s4] {
        assert_eq!(s, StatusCode::UNAUTHORIZED);
    }
    // one message for every failure
    assert_eq!(e1, e2);
    assert_eq!(e2, e3);
    assert!(e1["error"].is_string());
    assert!(store.list_chirps()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn chirp_length_boundary() -> Result<()> {
    let srv = TestServer::with_store(SharedStore::in_memory()).await?;
    let (_, token) = srv.signup_and_login("skyler@example.com", "ted").await?;

    let (status, _) = srv.send(Method::POST, "/api/chirps", Some(&token), Some(json!({"body": "a".repeat(140)}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, err) = srv.send(Method::POST, "/api/chirps", Some(&token), Some(json!({"body": "a".repeat(141)}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err, json!({"error": "Chirp is too long"}));
    Ok(())
}

#[tokio::test]
async fn punctuation_glued_words_are_not_redacted() -> Result<()> {
    let srv = TestServer::with_store(SharedStore::in_memory()).await?;
    let (_, token) = srv.signup_and_login("hank@example.com", "minerals").await?;
    let (status, chirp) = srv.send(Method::POST, "/api/chirps", Some(&token), Some(json!({"body": "Sharbert! fornax"}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(chirp["body"], "Sharbert! ****");
    Ok(())
}

#[tokio::test]
async fn login_ttl_is_clamped() -> Result<()> {
    let srv = TestServer::with_store(SharedStore::in_memory()).await?;
    srv.send(Method::POST, "/api/users", None, Some(json!({"email": "mike@example.com", "password": "halfmeasures"}))).await?;
    for (requested, expected) in [(Some(7200), 3600), (Some(0), 3600), (None, 3600), (Some(120), 120)] {
        let mut payload = json!({"email": "mike@example.com", "password": "halfmeasures"});
        if let Some(r) = requested {
            payload["expires_in_seconds"] = json!(r);
        }
        let (status, login) = srv.send(Method::POST, "/api/login", None, Some(payload)).await?;
        assert_eq!(status, StatusCode::OK);
        let claims = HmacCodec::new(SECRET.as_bytes()).decode(login["token"].as_str().unwrap_or_default())?;
        assert_eq!(claims.exp - claims.iat, expected, "requested {requested:?}");
    }
    Ok(())
}

#[tokio::test]
async fn login_errors() -> Result<()> {
    let srv = TestServer::with_store(SharedStore::in_memory()).await?;
    srv.send(Method::POST, "/api/users", None, Some(json!({"email": "gus@example.com", "password": "pollos"}))).await?;

    let (status, err) = srv.send(Method::POST, "/api/login", None, Some(json!({"email": "gus@example.com", "password": "wrong"}))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(err.get("token").is_none());

    let (status, _) = srv.send(Method::POST, "/api/login", None, Some(json!({"email": "nobody@example.com", "password": "x"}))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = srv.send(Method::POST, "/api/login", None, Some(json!({"email": 42}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn chirp_lookup_errors() -> Result<()> {
    let srv = TestServer::with_store(SharedStore::in_memory()).await?;
    let (status, err) = srv.send(Method::GET, "/api/chirps/not-a-uuid", None, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"], "Malformed Chirp UUID");
    let (status, _) = srv.send(Method::GET, &format!("/api/chirps/{}", Uuid::new_v4()), None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn healthz_metrics_and_reset() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("index.html"), "<h1>chirpy</h1>")?;
    let store = SharedStore::in_memory();
    let srv = TestServer::start(store.clone(), dir.path()).await?;

    let (status, body) = srv.text("/api/healthz").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    for _ in 0..3 {
        let (status, _) = srv.text("/app/index.html").await?;
        assert_eq!(status, StatusCode::OK);
    }
    assert!(srv.text("/admin/metrics").await?.1.contains("visited 3 times"));

    srv.signup_and_login("lydia@example.com", "stevia").await?;
    let (status, _) = srv.send(Method::POST, "/admin/reset", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(srv.text("/admin/metrics").await?.1.contains("visited 0 times"));
    assert!(store.get_user_by_email("lydia@example.com").is_err());
    Ok(())
}
