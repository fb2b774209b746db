//! # Request Context
//!
//! Who is asking, and from where. Built per request from the session
//! cookie and headers, then passed to handlers as an extractor.
//!
//! ```text
//! Cookie: shopfront_session=<jwt>     X-Forwarded-For: 10.0.0.7, proxy
//!            │                                  │
//!            ▼                                  ▼
//!   SessionManager::verify             first hop, else socket addr
//!            │                                  │
//!   users row, must be active                   │
//!            │                                  │
//!            └──────────────┬───────────────────┘
//!                           ▼
//!   RequestContext { user_id, username, role, ip_address, user_agent }
//! ```
//!
//! A deactivated account loses access on its next request even while its
//! cookie is still within its lifetime.
//!
//! | Extractor        | Missing/invalid session | Wrong role |
//! |------------------|-------------------------|------------|
//! | `RequestContext` | 401 JSON                | -          |
//! | `AdminContext`   | 401 JSON                | 403 JSON   |
//! | `PageSession`    | redirect to `/login`    | -          |

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use shopfront_core::{NewActivity, UserRole};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// An activity entry attributed to this request.
    pub fn activity(&self, action_type: &str) -> NewActivity {
        let mut entry = NewActivity::new(action_type);
        entry.user_id = Some(self.user_id);
        entry.username = Some(self.username.clone());
        entry.ip_address = self.ip_address.clone();
        entry.user_agent = self.user_agent.clone();
        entry
    }
}

/// Client address: first `X-Forwarded-For` hop, else the socket peer.
pub fn client_ip(parts: &Parts) -> Option<String> {
    let forwarded = parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(ip) = forwarded {
        return Some(ip.to_string());
    }

    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

pub fn user_agent(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn resolve(parts: &Parts, state: &AppState) -> Result<RequestContext, ApiError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar
        .get(&state.config.session.cookie_name)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::unauthenticated("authentication required"))?;

    let claims = state.sessions.verify(&token).map_err(|e| {
        debug!(error = %e, "Rejected session cookie");
        ApiError::unauthenticated("session expired or invalid")
    })?;
    let user_id = claims
        .user_id()
        .map_err(|_| ApiError::unauthenticated("session expired or invalid"))?;

    // Role and active flag come from the users table, not the token.
    let user = state
        .db
        .users()
        .get_by_id(user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| {
            debug!(user_id, "Session belongs to a missing or deactivated user");
            ApiError::unauthenticated("session expired or invalid")
        })?;

    Ok(RequestContext {
        user_id: user.id,
        username: user.username,
        role: user.role,
        ip_address: client_ip(parts),
        user_agent: user_agent(parts),
    })
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequestContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state).await
    }
}

/// Client address and user agent, available without a session.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientInfo {
            ip_address: client_ip(parts),
            user_agent: user_agent(parts),
        })
    }
}

/// A context whose role is admin.
#[derive(Debug, Clone)]
pub struct AdminContext(pub RequestContext);

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ctx = resolve(parts, state).await?;
        if !ctx.is_admin() {
            return Err(ApiError::forbidden("administrator access required"));
        }
        Ok(AdminContext(ctx))
    }
}

/// Session for HTML pages; anonymous visitors are sent to the login form.
#[derive(Debug, Clone)]
pub struct PageSession(pub RequestContext);

pub struct LoginRedirect;

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/login").into_response()
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for PageSession {
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state)
            .await
            .map(PageSession)
            .map_err(|_| LoginRedirect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_forwarded_for_first_hop() {
        let p = parts(Request::builder().header("x-forwarded-for", "10.0.0.7, 172.16.0.1"));
        assert_eq!(client_ip(&p).as_deref(), Some("10.0.0.7"));
    }

    #[test]
    fn test_socket_address_fallback() {
        let mut p = parts(Request::builder());
        assert!(client_ip(&p).is_none());

        let addr: SocketAddr = "192.168.1.20:51234".parse().unwrap();
        p.extensions.insert(ConnectInfo(addr));
        assert_eq!(client_ip(&p).as_deref(), Some("192.168.1.20"));
    }

    #[test]
    fn test_user_agent() {
        let p = parts(Request::builder().header("user-agent", "till-browser/1.0"));
        assert_eq!(user_agent(&p).as_deref(), Some("till-browser/1.0"));
    }
}
