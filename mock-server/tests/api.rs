use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, User};
use serde_json::Value;
use tower::{Service, ServiceExt};

const BOUNDARY: &str = "----mock-server-test-boundary";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn with_token(mut req: Request<String>, token: &str) -> Request<String> {
    req.headers_mut().insert(
        http::header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    req
}

/// `fields` are text parts; `photo` is `(file_name, content_type, contents)`.
fn multipart_request(uri: &str, fields: &[(&str, &str)], photo: Option<(&str, &str, &str)>) -> Request<String> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    if let Some((file_name, content_type, contents)) = photo {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n{contents}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body)
        .unwrap()
}

async fn call<S>(app: &mut S, req: Request<String>) -> axum::response::Response
where
    S: Service<Request<String>, Response = axum::response::Response, Error = std::convert::Infallible>,
{
    ServiceExt::ready(app).await.unwrap().call(req).await.unwrap()
}

const ANA: &str = r#"{"name":"Ana","email":"ana@example.com","password":"secret123"}"#;

// --- register ---

#[tokio::test]
async fn register_returns_201_with_token_and_user() {
    let resp = app()
        .oneshot(json_request("POST", "/register", ANA))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = body_json(resp).await;
    assert!(!body["token"].as_str().unwrap().is_empty());
    let user: User = serde_json::from_value(body["user"].clone()).unwrap();
    assert_eq!(user.name, "Ana");
    assert_eq!(user.email, "ana@example.com");
    assert!(user.photo.is_none());
}

#[tokio::test]
async fn register_missing_fields_returns_validation_errors() {
    let resp = app()
        .oneshot(json_request("POST", "/register", r#"{"email":""}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "The given data was invalid.");
    let fields: Vec<&String> = body["errors"].as_object().unwrap().keys().collect();
    assert_eq!(fields, ["name", "email", "password"]);
    assert_eq!(body["errors"]["name"][0], "The name field is required.");
}

#[tokio::test]
async fn register_duplicate_email_is_rejected() {
    let mut app = app().into_service::<String>();

    let resp = call(&mut app, json_request("POST", "/register", ANA)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = call(&mut app, json_request("POST", "/register", ANA)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["errors"]["email"][0], "The email has already been taken.");
}

// --- login ---

#[tokio::test]
async fn login_missing_password_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/login", r#"{"email":"ana@example.com"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["errors"]["password"][0], "The password field is required.");
}

#[tokio::test]
async fn login_unknown_user_returns_401() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/login",
            r#"{"email":"ghost@example.com","password":"whatever"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Invalid credentials");
}

// --- update ---

#[tokio::test]
async fn update_without_token_returns_401() {
    let resp = app()
        .oneshot(json_request("PUT", "/update-user/1", r#"{"name":"Bea"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- full account lifecycle ---

#[tokio::test]
async fn account_lifecycle() {
    let mut app = app().into_service::<String>();

    // register two accounts
    let resp = call(&mut app, json_request("POST", "/register", ANA)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let ana: Value = body_json(resp).await;
    let ana_id = ana["user"]["id"].as_u64().unwrap();

    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/register",
            r#"{"name":"Bea","email":"bea@example.com","password":"secret456"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let bea: Value = body_json(resp).await;
    let bea_id = bea["user"]["id"].as_u64().unwrap();

    // login
    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/login",
            r#"{"email":"ana@example.com","password":"secret123"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let login: Value = body_json(resp).await;
    let token = login["token"].as_str().unwrap().to_string();
    assert_eq!(login["user"]["id"], ana_id);

    // update via JSON
    let resp = call(
        &mut app,
        with_token(
            json_request("PUT", &format!("/update-user/{ana_id}"), r#"{"name":"Ana Maria"}"#),
            &token,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["user"]["name"], "Ana Maria");
    assert_eq!(body["user"]["email"], "ana@example.com"); // unchanged

    // someone else's account
    let resp = call(
        &mut app,
        with_token(
            json_request("PUT", &format!("/update-user/{bea_id}"), r#"{"name":"X"}"#),
            &token,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // unknown account
    let resp = call(
        &mut app,
        with_token(json_request("PUT", "/update-user/999", r#"{"name":"X"}"#), &token),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // taken email
    let resp = call(
        &mut app,
        with_token(
            json_request(
                "PUT",
                &format!("/update-user/{ana_id}"),
                r#"{"email":"bea@example.com"}"#,
            ),
            &token,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["errors"]["email"][0], "The email has already been taken.");

    // upload a photo via multipart
    let resp = call(
        &mut app,
        with_token(
            multipart_request(
                &format!("/update-user/{ana_id}"),
                &[("name", "Ana M.")],
                Some(("me.png", "image/png", "PNGDATA")),
            ),
            &token,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["user"]["name"], "Ana M.");
    assert_eq!(body["user"]["photo"], format!("uploads/{ana_id}/me.png"));

    // non-image upload
    let resp = call(
        &mut app,
        with_token(
            multipart_request(
                &format!("/update-user/{ana_id}"),
                &[],
                Some(("notes.txt", "text/plain", "hello")),
            ),
            &token,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["errors"]["photo"][0], "The photo must be an image.");
}
