mod common;

use anyhow::Result;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

fn token(secret: &str, exp_offset_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "user_id": 1,
        "email": "ada@example.com",
        "role": "admin",
        "iat": now,
        "exp": now + exp_offset_secs,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}

async fn get_projects(bearer: Option<&str>) -> Result<(StatusCode, Value)> {
    let server = common::ensure_server().await?;
    let mut req = reqwest::Client::new().get(server.url("/api/projects"));
    if let Some(token) = bearer {
        req = req.bearer_auth(token);
    }
    let res = req.send().await?;
    Ok((res.status(), res.json().await?))
}

#[tokio::test]
async fn missing_token_is_rejected() -> Result<()> {
    let (status, body) = get_projects(None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Access token required");
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn token_signed_with_another_secret_is_invalid() -> Result<()> {
    let (status, body) = get_projects(Some(&token("some-other-secret", 3600))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
    Ok(())
}

#[tokio::test]
async fn expired_token_is_reported_as_expired() -> Result<()> {
    let (status, body) = get_projects(Some(&token(common::TEST_JWT_SECRET, -3600))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token expired");
    Ok(())
}

#[tokio::test]
async fn register_rejects_malformed_json() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::Client::new()
        .post(server.url("/api/auth/register"))
        .header("content-type", "application/json")
        .body("{\"username\": ")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn register_reports_every_invalid_field() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::Client::new()
        .post(server.url("/api/auth/register"))
        .json(&json!({ "username": "x", "email": "not-an-email", "password": "short" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    for field in ["username", "email", "password"] {
        assert!(body["field_errors"][field].is_string(), "no message for {}", field);
    }
    Ok(())
}
