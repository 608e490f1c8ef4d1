mod common;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use storefront_api::routes::create_app;
use tower::ServiceExt;

use common::memory_state;

const ORIGIN: &str = "http://localhost:5173";

fn app() -> Router {
    create_app(memory_state(), ORIGIN).expect("build app")
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn signup(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/signup",
        None,
        Some(json!({ "email": email, "password": "12345678" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["message"], "user successfully signed up");
    body["token"].as_str().unwrap().to_string()
}

async fn create_product(app: &Router, title: &str, price: i64) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/products/post",
        None,
        Some(json!({
            "title": title,
            "description": "test product",
            "price": price,
            "category": "books"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn signup_login_and_profile() {
    let app = app();
    let token = signup(&app, "a@b.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": "a@b.com", "password": "12345678" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body["token"].is_string());
    assert!(body.get("data").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": "a@b.com", "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid credentials");

    let (status, body) = send(&app, Method::GET, "/api/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "email": "a@b.com" }));
}

#[tokio::test]
async fn auth_failures_map_to_400_and_401() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/profile", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::GET, "/api/profile", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/cart/get_cart", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cart_round_trip_over_http() {
    let app = app();
    let token = signup(&app, "cart@b.com").await;
    let product_id = create_product(&app, "Rust Book", 3200).await;

    let (status, body) = send(&app, Method::GET, "/api/cart/get_cart", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["total"], 0);

    for quantity in [2, 3] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/cart/add_product",
            Some(&token),
            Some(json!({ "product_id": product_id, "quantity": quantity })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "message": "user's cart products added successfully" })
        );
    }

    let (_, body) = send(&app, Method::GET, "/api/cart/get_cart", Some(&token), None).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 5);
    assert_eq!(items[0]["product"]["title"], "Rust Book");
    assert_eq!(body["total"], 5 * 3200);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/cart/remove_product",
        Some(&token),
        Some(json!({ "product_id": product_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/cart/get_cart", Some(&token), None).await;
    assert_eq!(body["items"][0]["quantity"], 4);
    assert_eq!(body["total"], 4 * 3200);

    let (status, _) = send(&app, Method::DELETE, "/api/cart/clean_cart", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, "/api/cart/clean_cart", Some(&token), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/cart/remove_product",
        Some(&token),
        Some(json!({ "product_id": product_id })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn cart_add_validation_codes() {
    let app = app();
    let token = signup(&app, "codes@b.com").await;
    let product_id = create_product(&app, "Dock", 12500).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/cart/add_product",
        Some(&token),
        Some(json!({ "product_id": uuid::Uuid::new_v4(), "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/cart/add_product",
        Some(&token),
        Some(json!({ "product_id": product_id, "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cart/add_product",
        Some(&token),
        Some(json!({ "product_id": "not-a-uuid" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Bad Request");
}

#[tokio::test]
async fn feedback_and_rating_over_http() {
    let app = app();
    let token = signup(&app, "fb@b.com").await;
    let product_id = create_product(&app, "Keyboard", 8900).await;

    let rating_uri = format!("/api/feedback/get_rating?product_id={product_id}");
    let (status, body) = send(&app, Method::GET, &rating_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "rating": 0.0 }));

    for rating in [5, 3, 4] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/feedback/post",
            Some(&token),
            Some(json!({ "comment": "nice", "rating": rating, "product_id": product_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, Method::GET, &rating_uri, None, None).await;
    assert_eq!(body, json!({ "rating": 4.0 }));

    let list_uri = format!("/api/feedback/get_all?product_id={product_id}");
    let (status, body) = send(&app, Method::GET, &list_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let mine_uri = format!("/api/feedback/get_feedback?product_id={product_id}");
    let (status, body) = send(&app, Method::GET, &mine_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 4.0);

    let (status, _) = send(&app, Method::GET, "/api/feedback/get_all", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/feedback/get_rating?product_id=abc",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/feedback/post",
        Some(&token),
        Some(json!({ "comment": "too good", "rating": 9, "product_id": product_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn products_are_listed_newest_first() {
    let app = app();
    create_product(&app, "First", 100).await;
    create_product(&app, "Second", 200).await;

    let (status, body) = send(&app, Method::GET, "/api/products/get_all", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Second", "First"]);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no route for /api/nope");
}

#[tokio::test]
async fn cors_allows_only_the_configured_origin() {
    let app = app();

    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/cart/add_product")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(preflight(ORIGIN)).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        ORIGIN
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );

    let response = app
        .clone()
        .oneshot(preflight("http://evil.example"))
        .await
        .unwrap();
    assert!(
        !response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = app();
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn add_past_i32_max_is_a_bad_request() {
    let app = app();
    let token = signup(&app, "big@b.com").await;
    let product_id = create_product(&app, "Sticker", 50).await;

    let add = |quantity: i64| json!({ "product_id": product_id, "quantity": quantity });

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/cart/add_product",
        Some(&token),
        Some(add(i64::from(i32::MAX))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cart/add_product",
        Some(&token),
        Some(add(5)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, body) = send(&app, Method::GET, "/api/cart/get_cart", Some(&token), None).await;
    assert_eq!(body["items"][0]["quantity"], i32::MAX);
}
