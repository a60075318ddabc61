//! Bearer-token authentication for HTTP handlers.
//!
//! Handlers that need a caller take a [`Principal`] argument; extraction
//! reads the `x-access-token` header and resolves it through the
//! [`LoginService`](crate::domain::ports::LoginService) port, so handlers
//! never see raw credentials.

use std::ops::Deref;

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, INVALID_TOKEN_MESSAGE, User};
use crate::inbound::http::state::HttpState;

/// Header carrying the caller's bearer token.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Authenticated caller of the current request.
#[derive(Debug, Clone)]
pub struct Principal(User);

impl Principal {
    /// Unwrap the resolved user.
    pub fn into_inner(self) -> User {
        self.0
    }
}

impl Deref for Principal {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

enum RawToken {
    Absent,
    Present(String),
    Unreadable,
}

fn raw_token(req: &HttpRequest) -> RawToken {
    match req.headers().get(ACCESS_TOKEN_HEADER) {
        None => RawToken::Absent,
        Some(value) => value
            .to_str()
            .map_or(RawToken::Unreadable, |token| RawToken::Present(token.to_owned())),
    }
}

impl FromRequest for Principal {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = raw_token(req);
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let token = match token {
                RawToken::Absent => String::new(),
                RawToken::Present(token) => token,
                RawToken::Unreadable => return Err(Error::forbidden(INVALID_TOKEN_MESSAGE)),
            };
            state.login.authenticate(&token).await.map(Principal)
        })
    }
}
