use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct UpdateInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
pub struct Store {
    next_id: u64,
    accounts: HashMap<u64, Account>,
    tokens: HashMap<String, u64>,
}

impl Store {
    fn email_taken(&self, email: &str, except: Option<u64>) -> bool {
        self.accounts
            .values()
            .any(|a| a.user.email == email && Some(a.user.id) != except)
    }

    fn issue_token(&mut self, user_id: u64) -> String {
        let token = Uuid::new_v4().to_string();
        self.tokens.insert(token.clone(), user_id);
        token
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Failures rendered the way a Laravel API renders them.
#[derive(Debug)]
pub enum ApiError {
    Validation(Vec<(&'static str, String)>),
    BadRequest(String),
    InvalidCredentials,
    Unauthenticated,
    Forbidden,
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(fields) => {
                let mut errors = Map::new();
                for (field, message) in fields {
                    if let Value::Array(list) = errors.entry(field).or_insert_with(|| json!([])) {
                        list.push(Value::String(message));
                    }
                }
                (
                    StatusCode::BAD_REQUEST,
                    json!({"message": "The given data was invalid.", "errors": errors}),
                )
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({"message": message})),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({"message": "Invalid credentials"}),
            ),
            ApiError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, json!({"message": "Unauthenticated."}))
            }
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                json!({"message": "This action is unauthorized."}),
            ),
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({"message": "User not found."})),
        };
        (status, Json(body)).into_response()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/update-user/{id}", put(update_user).post(upload_user))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn required(errors: &mut Vec<(&'static str, String)>, field: &'static str, value: &Option<String>) {
    if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
        errors.push((field, format!("The {field} field is required.")));
    }
}

fn check_email(errors: &mut Vec<(&'static str, String)>, email: &str) {
    if !email.contains('@') {
        errors.push(("email", "The email field must be a valid email address.".to_string()));
    }
}

fn check_password(errors: &mut Vec<(&'static str, String)>, password: &str) {
    if password.len() < 6 {
        errors.push((
            "password",
            "The password field must be at least 6 characters.".to_string(),
        ));
    }
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut errors = Vec::new();
    required(&mut errors, "name", &input.name);
    required(&mut errors, "email", &input.email);
    required(&mut errors, "password", &input.password);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let (name, email, password) = (
        input.name.unwrap_or_default(),
        input.email.unwrap_or_default(),
        input.password.unwrap_or_default(),
    );

    let mut store = db.write().await;
    check_email(&mut errors, &email);
    if store.email_taken(&email, None) {
        errors.push(("email", "The email has already been taken.".to_string()));
    }
    check_password(&mut errors, &password);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    store.next_id += 1;
    let user = User {
        id: store.next_id,
        name,
        email,
        photo: None,
    };
    store.accounts.insert(
        user.id,
        Account {
            user: user.clone(),
            password,
        },
    );
    let token = store.issue_token(user.id);
    info!(user_id = user.id, "registered user");
    Ok((StatusCode::CREATED, Json(json!({"token": token, "user": user}))))
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginInput>,
) -> Result<Json<Value>, ApiError> {
    let mut errors = Vec::new();
    required(&mut errors, "email", &input.email);
    required(&mut errors, "password", &input.password);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let (email, password) = (
        input.email.unwrap_or_default(),
        input.password.unwrap_or_default(),
    );

    let mut store = db.write().await;
    let user = store
        .accounts
        .values()
        .find(|a| a.user.email == email && a.password == password)
        .map(|a| a.user.clone())
        .ok_or(ApiError::InvalidCredentials)?;
    let token = store.issue_token(user.id);
    info!(user_id = user.id, "logged in");
    Ok(Json(json!({"token": token, "user": user})))
}

/// Resolve the bearer token to the account it may modify.
fn authorize(store: &Store, headers: &HeaderMap, id: u64) -> Result<(), ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthenticated)?;
    let owner = *store.tokens.get(token).ok_or(ApiError::Unauthenticated)?;
    if !store.accounts.contains_key(&id) {
        return Err(ApiError::NotFound);
    }
    if owner != id {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

fn apply_update(store: &mut Store, id: u64, input: UpdateInput) -> Result<User, ApiError> {
    let mut errors = Vec::new();
    if let Some(name) = &input.name {
        if name.trim().is_empty() {
            errors.push(("name", "The name field must not be empty.".to_string()));
        }
    }
    if let Some(email) = &input.email {
        check_email(&mut errors, email);
        if store.email_taken(email, Some(id)) {
            errors.push(("email", "The email has already been taken.".to_string()));
        }
    }
    if let Some(password) = &input.password {
        check_password(&mut errors, password);
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let account = store.accounts.get_mut(&id).ok_or(ApiError::NotFound)?;
    if let Some(name) = input.name {
        account.user.name = name;
    }
    if let Some(email) = input.email {
        account.user.email = email;
    }
    if let Some(password) = input.password {
        account.password = password;
    }
    Ok(account.user.clone())
}

fn updated(user: User) -> Json<Value> {
    Json(json!({"message": "User updated successfully", "user": user}))
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(input): Json<UpdateInput>,
) -> Result<Json<Value>, ApiError> {
    let mut store = db.write().await;
    authorize(&store, &headers, id)?;
    let user = apply_update(&mut store, id, input)?;
    info!(user_id = id, "updated user");
    Ok(updated(user))
}

async fn upload_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    authorize(&*db.read().await, &headers, id)?;

    let mut input = UpdateInput::default();
    let mut photo = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if let Some(file_name) = field.file_name().map(str::to_string) {
            let is_image = field
                .content_type()
                .is_some_and(|ct| ct.starts_with("image/"));
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            if name != "photo" {
                continue;
            }
            if !is_image || bytes.is_empty() {
                return Err(ApiError::Validation(vec![(
                    "photo",
                    "The photo must be an image.".to_string(),
                )]));
            }
            photo = Some(format!("uploads/{id}/{file_name}"));
            continue;
        }
        let text = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        match name.as_str() {
            "name" => input.name = Some(text),
            "email" => input.email = Some(text),
            "password" => input.password = Some(text),
            _ => {}
        }
    }

    let mut store = db.write().await;
    let mut user = apply_update(&mut store, id, input)?;
    if let Some(path) = photo {
        if let Some(account) = store.accounts.get_mut(&id) {
            account.user.photo = Some(path);
            user = account.user.clone();
        }
    }
    info!(user_id = id, photo = user.photo.as_deref(), "updated user from form");
    Ok(updated(user))
}
