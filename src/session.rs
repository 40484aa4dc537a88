use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, sync::Arc};

use crate::{config::AppConfig, error::AppError};

/// SessionData
///
/// The complete state a visitor carries between requests. The shape is fixed;
/// nothing else is ever stored in the cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionData {
    /// Set by a successful login, cleared by logout.
    pub user_id: Option<i32>,
    /// Where to send the visitor after the next successful login.
    pub return_url: Option<String>,
}

/// SessionClaims
///
/// Wire form of [`SessionData`] inside the signed token.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uid: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ret: Option<String>,
    iat: i64,
    exp: i64,
}

struct KeysInner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    cookie_name: String,
    ttl_secs: i64,
    secure: bool,
}

/// SessionKeys
///
/// Signing material and cookie settings, derived once from [`AppConfig`] and
/// shared by every request through `FromRef`.
#[derive(Clone)]
pub struct SessionKeys(Arc<KeysInner>);

impl SessionKeys {
    pub fn new(secret: &[u8], cookie_name: &str, ttl_secs: i64, secure: bool) -> Self {
        Self(Arc::new(KeysInner {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            cookie_name: cookie_name.to_string(),
            ttl_secs,
            secure,
        }))
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.session_secret.as_bytes(),
            &config.session_cookie,
            config.session_ttl_secs,
            config.secure_cookies(),
        )
    }

    pub fn cookie_name(&self) -> &str {
        &self.0.cookie_name
    }

    /// issue
    ///
    /// Signs `data` into a token valid for the configured lifetime.
    pub fn issue(&self, data: &SessionData) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            uid: data.user_id,
            ret: data.return_url.clone(),
            iat: now,
            exp: now + self.0.ttl_secs,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.0.encoding)
    }

    /// decode
    ///
    /// Returns `None` for any token that is malformed, expired or signed with
    /// another secret. The caller then starts from an empty session.
    pub fn decode(&self, token: &str) -> Option<SessionData> {
        match decode::<SessionClaims>(token, &self.0.decoding, &self.0.validation) {
            Ok(data) => Some(SessionData {
                user_id: data.claims.uid,
                return_url: data.claims.ret,
            }),
            Err(e) => {
                tracing::debug!("discarding session token: {}", e);
                None
            }
        }
    }
}

/// Session
///
/// Request-scoped view of the visitor's session. Handlers take it as an
/// extractor, mutate it through the typed accessors, and hand it back as part
/// of the response; the cookie is only re-issued when something changed.
pub struct Session {
    data: SessionData,
    keys: SessionKeys,
    changed: bool,
}

impl Session {
    /// An empty session, as seen by a first-time visitor.
    pub fn new(keys: SessionKeys) -> Self {
        Self::with_data(keys, SessionData::default())
    }

    pub fn with_data(keys: SessionKeys, data: SessionData) -> Self {
        Self {
            data,
            keys,
            changed: false,
        }
    }

    /// Reads the session cookie out of a request's headers.
    pub fn from_headers(headers: &HeaderMap, keys: SessionKeys) -> Self {
        let data = CookieJar::from_headers(headers)
            .get(keys.cookie_name())
            .and_then(|cookie| keys.decode(cookie.value()))
            .unwrap_or_default();
        Self::with_data(keys, data)
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn user_id(&self) -> Option<i32> {
        self.data.user_id
    }

    pub fn set_user_id(&mut self, id: i32) {
        self.data.user_id = Some(id);
        self.changed = true;
    }

    pub fn clear_user_id(&mut self) {
        if self.data.user_id.take().is_some() {
            self.changed = true;
        }
    }

    pub fn return_url(&self) -> Option<&str> {
        self.data.return_url.as_deref()
    }

    pub fn set_return_url(&mut self, url: impl Into<String>) {
        self.data.return_url = Some(url.into());
        self.changed = true;
    }

    /// Reads the pending return URL and removes it in one step.
    pub fn take_return_url(&mut self) -> Option<String> {
        let url = self.data.return_url.take();
        if url.is_some() {
            self.changed = true;
        }
        url
    }

    /// Builds the `Set-Cookie` value carrying the current state.
    pub fn to_cookie(&self) -> Result<Cookie<'static>, jsonwebtoken::errors::Error> {
        let token = self.keys.issue(&self.data)?;
        Ok(Cookie::build((self.keys.cookie_name().to_string(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.keys.0.secure)
            .build())
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        Ok(Session::from_headers(&parts.headers, keys))
    }
}

impl IntoResponseParts for Session {
    type Error = AppError;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if !self.changed {
            return Ok(res);
        }
        let jar = CookieJar::new().add(self.to_cookie()?);
        Ok(jar
            .into_response_parts(res)
            .unwrap_or_else(|never| match never {}))
    }
}
