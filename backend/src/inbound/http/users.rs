//! Login and account HTTP handlers.
//!
//! ```text
//! POST   /login            (form: username, password)
//! POST   /user             {"email":"ops@example.org","username":"ops","password":"..."}
//! GET    /user/self
//! GET    /user/{id}
//! PUT    /user/{id}
//! DELETE /user/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, LoginCredentials, User, UserDraft, auth::credentials_mismatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Principal;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, map_user_error, parse_user_id, require};

/// Form submitted to `POST /login`.
///
/// Missing fields decode as empty strings and are then refused with the
/// same answer as a wrong password.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Account as returned to clients. The password digest is never included;
/// the token is, so a login answer can authenticate later calls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "hostmaster@example.org")]
    pub email: String,
    #[schema(example = "hostmaster")]
    pub username: String,
    pub is_admin: bool,
    pub token: String,
}

impl From<User> for UserBody {
    fn from(value: User) -> Self {
        Self {
            id: value.id().as_i64(),
            email: value.email().to_string(),
            username: value.username().to_string(),
            is_admin: value.is_admin(),
            token: value.token().as_ref().to_owned(),
        }
    }
}

/// Create and update payload for an account.
///
/// On update, absent fields keep their stored values and an absent password
/// keeps the stored digest.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

fn parse_new_user(payload: UserPayload) -> Result<UserDraft, Error> {
    let email = require(payload.email, FieldName::new("email"))?;
    let username = require(payload.username, FieldName::new("username"))?;
    let password = require(payload.password, FieldName::new("password"))?;
    UserDraft::try_from_parts(
        &email,
        &username,
        Some(password.as_str()),
        payload.is_admin.unwrap_or(false),
    )
    .map_err(|err| map_user_error(&err))
}

fn merge_user_changes(current: &User, payload: UserPayload) -> Result<UserDraft, Error> {
    let email = payload
        .email
        .unwrap_or_else(|| current.email().to_string());
    let username = payload
        .username
        .unwrap_or_else(|| current.username().to_string());
    UserDraft::try_from_parts(
        &email,
        &username,
        payload.password.as_deref(),
        payload.is_admin.unwrap_or(current.is_admin()),
    )
    .map_err(|err| map_user_error(&err))
}

/// Exchange a username and password for the account and its token.
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login success", body = UserBody),
        (status = 400, description = "Undecodable form", body = ErrorSchema),
        (status = 403, description = "Credentials don't match", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    form: web::Form<LoginForm>,
) -> ApiResult<web::Json<UserBody>> {
    let form = form.into_inner();
    let credentials = LoginCredentials::try_from_parts(&form.username, &form.password)
        .map_err(|_| credentials_mismatch())?;
    let user = state.login.login(&credentials).await?;
    Ok(web::Json(UserBody::from(user)))
}

/// Create an account. Admin only.
#[utoipa::path(
    post,
    path = "/user",
    request_body = UserPayload,
    responses(
        (status = 200, description = "User created", body = UserBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Email or username taken", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser",
    security(("AccessToken" = []))
)]
#[post("/user")]
pub async fn create_user(
    state: web::Data<HttpState>,
    principal: Principal,
    payload: web::Json<UserPayload>,
) -> ApiResult<web::Json<UserBody>> {
    let draft = parse_new_user(payload.into_inner())?;
    let user = state.users.create_user(&principal, draft).await?;
    Ok(web::Json(UserBody::from(user)))
}

/// The caller's own account.
#[utoipa::path(
    get,
    path = "/user/self",
    responses(
        (status = 200, description = "Current user", body = UserBody),
        (status = 403, description = "Missing or invalid token", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getSelf",
    security(("AccessToken" = []))
)]
#[get("/user/self")]
pub async fn get_self(principal: Principal) -> web::Json<UserBody> {
    web::Json(UserBody::from(principal.into_inner()))
}

/// Fetch one account; callers may read themselves, admins anyone.
#[utoipa::path(
    get,
    path = "/user/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = UserBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security(("AccessToken" = []))
)]
#[get("/user/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserBody>> {
    let id = parse_user_id(&path)?;
    let user = state.users.get_user(&principal, id).await?;
    Ok(web::Json(UserBody::from(user)))
}

/// Update an account and return it.
#[utoipa::path(
    put,
    path = "/user/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    request_body = UserPayload,
    responses(
        (status = 200, description = "User updated", body = UserBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Email or username taken", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser",
    security(("AccessToken" = []))
)]
#[put("/user/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<String>,
    payload: web::Json<UserPayload>,
) -> ApiResult<web::Json<UserBody>> {
    let id = parse_user_id(&path)?;
    let current = state.users.get_user(&principal, id).await?;
    let draft = merge_user_changes(&current, payload.into_inner())?;
    let user = state.users.update_user(&principal, id, draft).await?;
    Ok(web::Json(UserBody::from(user)))
}

/// Delete an account.
#[utoipa::path(
    delete,
    path = "/user/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser",
    security(("AccessToken" = []))
)]
#[delete("/user/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    state.users.delete_user(&principal, id).await?;
    Ok(HttpResponse::NoContent().finish())
}
