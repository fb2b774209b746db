//! # Login and Logout
//!
//! ```text
//! POST /login (form) ─────┐                       ┌──► 303 → /
//!                         ├──► authenticate() ──► │    Set-Cookie: shopfront_session=<jwt>; HttpOnly
//! POST /api/auth/login ───┘        │              └──► 200 {success, data: user}
//!                                  │
//!                                  └── unknown user, inactive, bad password
//!                                        └──► 401 "invalid username or password"
//!                                             (form: 303 → /login?error=1)
//! ```
//!
//! All three failures answer with the same message.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use shopfront_core::requests::LoginRequest;
use shopfront_core::User;
use shopfront_db::verify_password;

use crate::context::{ClientInfo, RequestContext};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, FormOrJson};
use crate::routes::audit;
use crate::state::AppState;
use crate::templates::LoginPage;

const INVALID_CREDENTIALS: &str = "invalid username or password";

async fn authenticate(state: &AppState, req: &LoginRequest, client: &ClientInfo) -> ApiResult<User> {
    req.validate()?;
    let username = req.username.trim();

    let user = state
        .db
        .users()
        .find_by_username(username)
        .await?
        .filter(|u| u.is_active && verify_password(&req.password, &u.password_hash));

    let Some(user) = user else {
        warn!(username, ip = ?client.ip_address, "Failed login attempt");
        return Err(ApiError::unauthenticated(INVALID_CREDENTIALS));
    };

    state.db.users().touch_last_login(user.id).await?;

    let mut entry = shopfront_core::NewActivity::new("login");
    entry.user_id = Some(user.id);
    entry.username = Some(user.username.clone());
    entry.ip_address = client.ip_address.clone();
    entry.user_agent = client.user_agent.clone();
    audit(state, entry).await;

    info!(user_id = user.id, username = %user.username, role = user.role.as_str(), "User logged in");
    Ok(user)
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((state.config.session.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.session.secure_cookie)
        .build()
}

fn clear_cookie(state: &AppState, jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((state.config.session.cookie_name.clone(), "")).path("/"))
}

async fn start_session(state: &AppState, jar: CookieJar, user: &User) -> ApiResult<CookieJar> {
    let token = state.sessions.issue(user).map_err(|e| {
        tracing::error!(error = %e, "Session token not issued");
        ApiError::internal("could not start session")
    })?;
    Ok(jar.add(session_cookie(state, token)))
}

#[derive(Debug, Deserialize)]
pub struct LoginPageParams {
    pub error: Option<String>,
}

/// `GET /login`
pub async fn login_form(
    State(state): State<AppState>,
    Query(params): Query<LoginPageParams>,
) -> ApiResult<Html<String>> {
    let page = LoginPage {
        error: params.error.as_ref().map(|_| INVALID_CREDENTIALS),
    };

    let html = state.pages.login(&page).map_err(|e| {
        tracing::error!(error = %e, "Login form failed to render");
        ApiError::internal("page unavailable")
    })?;
    Ok(Html(html))
}

/// `POST /login` (form)
pub async fn login_submit(
    State(state): State<AppState>,
    client: ClientInfo,
    jar: CookieJar,
    FormOrJson(req): FormOrJson<LoginRequest>,
) -> Response {
    let user = match authenticate(&state, &req, &client).await {
        Ok(user) => user,
        Err(e) if e.status().is_client_error() => {
            return Redirect::to("/login?error=1").into_response()
        }
        Err(e) => return e.into_response(),
    };

    match start_session(&state, jar, &user).await {
        Ok(jar) => (jar, Redirect::to("/")).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `POST /api/auth/login`
pub async fn api_login(
    State(state): State<AppState>,
    client: ClientInfo,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let user = authenticate(&state, &req, &client).await?;
    let jar = start_session(&state, jar, &user).await?;

    Ok((
        jar,
        Json(json!({
            "success": true,
            "data": user,
            "expires_in": state.sessions.lifetime_secs(),
        })),
    ))
}

async fn end_session(state: &AppState, ctx: Option<RequestContext>, jar: CookieJar) -> CookieJar {
    if let Some(ctx) = ctx {
        info!(user_id = ctx.user_id, "User logged out");
        audit(state, ctx.activity("logout")).await;
    }
    clear_cookie(state, jar)
}

/// `GET|POST /logout`
pub async fn logout(
    State(state): State<AppState>,
    ctx: Option<RequestContext>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let jar = end_session(&state, ctx, jar).await;
    (jar, Redirect::to("/login"))
}

/// `POST /api/auth/logout`
pub async fn api_logout(
    State(state): State<AppState>,
    ctx: Option<RequestContext>,
    jar: CookieJar,
) -> (CookieJar, Json<Value>) {
    let jar = end_session(&state, ctx, jar).await;
    (jar, Json(json!({ "success": true })))
}

/// `GET /api/auth/me`
pub async fn me(State(state): State<AppState>, ctx: RequestContext) -> ApiResult<Json<Value>> {
    let user = state
        .db
        .users()
        .get_by_id(ctx.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::unauthenticated("session expired or invalid"))?;

    Ok(Json(json!({ "success": true, "data": user })))
}
