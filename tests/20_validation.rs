mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

use common::{offline_app, request, send};

#[tokio::test]
async fn signup_reports_every_invalid_field() -> Result<()> {
    let app = offline_app();
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/users/signup",
            None,
            Some(json!({"username": "a b", "password": "123", "email": "nope"})),
        ),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    for field in ["username", "password", "email"] {
        assert!(body["field_errors"][field].is_string(), "missing {}", field);
    }
    Ok(())
}

#[tokio::test]
async fn signup_with_partial_details_is_rejected() -> Result<()> {
    let app = offline_app();
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/users/signup",
            None,
            Some(json!({"username": "ana", "password": "secreto", "firstname": "Ana"})),
        ),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["dni"].is_string());
    assert!(body["field_errors"]["lastname"].is_string());
    Ok(())
}

#[tokio::test]
async fn malformed_json_uses_the_error_envelope() -> Result<()> {
    let app = offline_app();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/users/loginUser")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\": "))?;
    let (status, body) = send(&app, req).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn payment_listing_validates_before_querying() -> Result<()> {
    let app = offline_app();

    let (status, body) = send(
        &app,
        request(Method::GET, "/payment/paginated?start_date=2024-05-01&end_date=2024-04-01", None, None),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["start_date"].is_string());

    let (status, _) = send(&app, request(Method::GET, "/payment/paginated?limit=0", None, None)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, request(Method::GET, "/payment/paginated?start_date=yesterday", None, None)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["start_date"].is_string());
    Ok(())
}

#[tokio::test]
async fn payment_amount_must_be_positive() -> Result<()> {
    let app = offline_app();
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/payment/add",
            None,
            Some(json!({"user_id": 1, "curso_id": 1, "amount": -5, "affect_month": "2024-03"})),
        ),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["amount"].is_string());
    Ok(())
}

#[tokio::test]
async fn curso_needs_a_name() -> Result<()> {
    let app = offline_app();
    let (status, body) = send(
        &app,
        request(Method::POST, "/curso/AddCurso", None, Some(json!({"name": "   ", "status": "active"}))),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["name"].is_string());
    Ok(())
}

#[tokio::test]
async fn career_name_is_required() -> Result<()> {
    let app = offline_app();
    let (status, body) = send(&app, request(Method::POST, "/career/add", None, Some(json!({"name": ""})))).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["name"], "name is required");
    Ok(())
}
