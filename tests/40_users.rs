mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{count, db_app, enroll, ids, insert_curso, insert_user, request, send, test_pool, token_for};

#[tokio::test]
async fn twenty_five_users_page_by_twenty() -> Result<()> {
    let Some(pool) = test_pool().await? else { return Ok(()) };
    let mut expected = Vec::new();
    for n in 1..=25 {
        expected.push(insert_user(&pool, &format!("user{:02}", n), Some((1000 + n, "Nombre", "Apellido"))).await?);
    }
    let app = db_app(&pool);
    let token = token_for(expected[0], "user01");

    let (status, first) = send(&app, request(Method::GET, "/users/all?limit=20", Some(&token), None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&first["users"]), expected[..20].to_vec());
    assert_eq!(first["next_cursor"], json!(expected[19]));

    let uri = format!("/users/all?limit=20&last_seen_id={}", expected[19]);
    let (status, second) = send(&app, request(Method::GET, &uri, Some(&token), None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&second["users"]), expected[20..].to_vec());
    assert!(second["next_cursor"].is_null());
    Ok(())
}

#[tokio::test]
async fn walking_the_cursor_covers_every_user_once() -> Result<()> {
    let Some(pool) = test_pool().await? else { return Ok(()) };
    let mut expected = Vec::new();
    for n in 1..=7 {
        expected.push(insert_user(&pool, &format!("walker{}", n), Some((2000 + n, "W", "K"))).await?);
    }
    let app = db_app(&pool);
    let token = token_for(expected[0], "walker1");

    let mut seen = Vec::new();
    let mut cursor: Option<i64> = None;
    loop {
        let uri = match cursor {
            Some(c) => format!("/users/all?limit=3&last_seen_id={}", c),
            None => "/users/all?limit=3".to_string(),
        };
        let (status, page) = send(&app, request(Method::GET, &uri, Some(&token), None)).await?;
        assert_eq!(status, StatusCode::OK);
        let page_ids = ids(&page["users"]);
        assert!(page_ids.len() <= 3);
        if let Some(last) = seen.last() {
            assert!(page_ids.iter().all(|id| id > last));
        }
        seen.extend(page_ids);
        match page["next_cursor"].as_i64() {
            Some(c) => cursor = Some(c),
            None => break,
        }
    }
    assert_eq!(seen, expected);
    Ok(())
}

#[tokio::test]
async fn users_without_details_do_not_take_a_slot() -> Result<()> {
    let Some(pool) = test_pool().await? else { return Ok(()) };
    let a = insert_user(&pool, "con_detalle_a", Some((3001, "Ana", "Paz"))).await?;
    insert_user(&pool, "sin_detalle", None).await?;
    let c = insert_user(&pool, "con_detalle_c", Some((3003, "Ciro", "Paz"))).await?;
    let app = db_app(&pool);
    let token = token_for(a, "con_detalle_a");

    let (status, body) = send(&app, request(Method::GET, "/users/all?limit=2", Some(&token), None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["users"]), vec![a, c]);
    assert_eq!(body["next_cursor"], json!(c));
    Ok(())
}

#[tokio::test]
async fn filters_compose_with_and() -> Result<()> {
    let Some(pool) = test_pool().await? else { return Ok(()) };
    let ana = insert_user(&pool, "ana", Some((30111222, "Ana", "Gómez"))).await?;
    let anabel = insert_user(&pool, "anabel", Some((40999888, "Anabel", "Ruiz"))).await?;
    insert_user(&pool, "bruno", Some((30111999, "Bruno", "Díaz"))).await?;
    let piano = insert_curso(&pool, "Piano I").await?;
    let canto = insert_curso(&pool, "Canto").await?;
    enroll(&pool, ana, piano).await?;
    enroll(&pool, anabel, canto).await?;

    let app = db_app(&pool);
    let token = token_for(ana, "ana");
    let filtered = |body: serde_json::Value| {
        request(Method::POST, "/users/paginated/filtered-async", Some(&token), Some(body))
    };

    let (_, body) = send(&app, filtered(json!({"search": "ana"}))).await?;
    assert_eq!(ids(&body["users"]), vec![ana, anabel]);

    let (_, body) = send(&app, filtered(json!({"search": "ana", "curso": "piano"}))).await?;
    assert_eq!(ids(&body["users"]), vec![ana]);
    assert_eq!(body["users"][0]["curso"], "Piano I");
    assert_eq!(body["users"][0]["firstname"], "Ana");

    let (_, body) = send(&app, filtered(json!({"dni": "30111"}))).await?;
    assert_eq!(ids(&body["users"]).len(), 2);

    let (_, body) = send(&app, filtered(json!({"dni": 30111, "search": "ana"}))).await?;
    assert_eq!(ids(&body["users"]), vec![ana]);

    // LIKE wildcards in input match literally
    let (_, body) = send(&app, filtered(json!({"search": "%"}))).await?;
    assert!(ids(&body["users"]).is_empty());
    Ok(())
}

#[tokio::test]
async fn duplicate_signup_is_a_conflict_and_creates_nothing() -> Result<()> {
    let Some(pool) = test_pool().await? else { return Ok(()) };
    let app = db_app(&pool);
    let signup = json!({
        "username": "ana", "password": "secreto", "email": "ana@example.com",
        "dni": 30111222, "firstname": "Ana", "lastname": "Paz"
    });

    let (status, body) = send(&app, request(Method::POST, "/users/signup", None, Some(signup.clone()))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["username"], "ana");

    let (status, body) = send(&app, request(Method::POST, "/users/signup", None, Some(signup))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(count(&pool, "users").await?, 1);
    assert_eq!(count(&pool, "user_details").await?, 1);
    Ok(())
}

#[tokio::test]
async fn failed_detail_insert_rolls_back_the_user() -> Result<()> {
    let Some(pool) = test_pool().await? else { return Ok(()) };
    insert_user(&pool, "primero", Some((5555, "P", "R"))).await?;
    let app = db_app(&pool);

    // username is new but the dni is taken: the user row must not survive
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/users/signup",
            None,
            Some(json!({"username": "segundo", "password": "secreto", "dni": 5555, "firstname": "S", "lastname": "G"})),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "DNI already exists");
    assert_eq!(count(&pool, "users").await?, 1);
    Ok(())
}

#[tokio::test]
async fn login_then_change_password() -> Result<()> {
    let Some(pool) = test_pool().await? else { return Ok(()) };
    let app = db_app(&pool);
    send(
        &app,
        request(
            Method::POST,
            "/users/signup",
            None,
            Some(json!({"username": "ana", "password": "secreto", "dni": 1, "firstname": "Ana", "lastname": "Paz"})),
        ),
    )
    .await?;

    let (status, _) = send(
        &app,
        request(Method::POST, "/users/loginUser", None, Some(json!({"username": "ana", "password": "wrong!"}))),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        request(Method::POST, "/users/loginUser", None, Some(json!({"username": "ana", "password": "secreto"}))),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["user"]["firstname"], "Ana");
    assert_eq!(body["user"]["type"], "student");
    let token = body["token"].as_str().unwrap_or_default().to_string();

    let change = |current: &str, new: &str| {
        request(
            Method::PUT,
            "/users/change-password",
            Some(&token),
            Some(json!({"current_password": current, "new_password": new})),
        )
    };
    let (status, _) = send(&app, change("wrong!", "nueva123")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, change("secreto", "123")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, change("secreto", "nueva123")).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        request(Method::POST, "/users/loginUser", None, Some(json!({"username": "ana", "password": "nueva123"}))),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn profile_update_and_delete() -> Result<()> {
    let Some(pool) = test_pool().await? else { return Ok(()) };
    let id = insert_user(&pool, "sin_datos", None).await?;
    let app = db_app(&pool);
    let token = token_for(id, "sin_datos");

    let (status, body) = send(&app, request(Method::GET, &format!("/users/profile/{}", id), Some(&token), None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["dni"].is_null());

    let (status, body) = send(
        &app,
        request(
            Method::PUT,
            &format!("/users/profile/{}", id),
            Some(&token),
            Some(json!({"email": "nuevo@example.com", "dni": "777", "firstname": "Nue", "lastname": "Vo"})),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dni"], 777);
    assert_eq!(body["email"], "nuevo@example.com");

    let (status, _) = send(&app, request(Method::DELETE, &format!("/users/{}", id), Some(&token), None)).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, request(Method::GET, &format!("/users/{}", id), Some(&token), None)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(count(&pool, "user_details").await?, 0);
    Ok(())
}

#[tokio::test]
async fn profile_update_without_email_keeps_the_stored_address() -> Result<()> {
    let Some(pool) = test_pool().await? else { return Ok(()) };
    let id = insert_user(&pool, "ana", Some((1, "Ana", "Paz"))).await?;
    let app = db_app(&pool);
    let token = token_for(id, "ana");

    let (status, body) = send(
        &app,
        request(
            Method::PUT,
            &format!("/users/profile/{}", id),
            Some(&token),
            Some(json!({"dni": 1, "firstname": "Ana", "lastname": "Paz Nueva"})),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lastname"], "Paz Nueva");
    assert_eq!(body["email"], "ana@example.com");

    let stored: Option<String> = sqlx::query_scalar("SELECT email FROM users WHERE id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await?;
    assert_eq!(stored.as_deref(), Some("ana@example.com"));
    Ok(())
}

#[tokio::test]
async fn profile_update_of_missing_user_is_not_found() -> Result<()> {
    let Some(pool) = test_pool().await? else { return Ok(()) };
    let id = insert_user(&pool, "ana", None).await?;
    let app = db_app(&pool);
    let token = token_for(id, "ana");

    let (status, body) = send(
        &app,
        request(
            Method::PUT,
            &format!("/users/profile/{}", id + 1000),
            Some(&token),
            Some(json!({"dni": 2, "firstname": "Nadie", "lastname": "Nunca"})),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(count(&pool, "user_details").await?, 0);
    Ok(())
}
