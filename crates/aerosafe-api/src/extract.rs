//! Request extractors: the acting user's identity and JSON bodies whose
//! rejections use the API's error format.

use aerosafe_core::profile::{Actor, Role};
use axum::{
  Json,
  extract::{FromRequest, FromRequestParts, Request},
  http::{HeaderMap, request::Parts},
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

// ─── Identity ────────────────────────────────────────────────────────────────

/// The acting user, read from trusted identity headers set upstream.
///
/// `x-user-id` is required. `x-user-role` defaults to `reporter` when absent
/// but must name a known role when present.
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub Actor);

/// Read the actor from request headers.
pub fn identity_from_headers(headers: &HeaderMap) -> Result<Actor, ApiError> {
  let user_id = headers
    .get(USER_ID_HEADER)
    .ok_or_else(|| ApiError::Unauthorized(format!("missing {USER_ID_HEADER} header")))?
    .to_str()
    .ok()
    .and_then(|s| Uuid::parse_str(s.trim()).ok())
    .ok_or_else(|| ApiError::Unauthorized(format!("malformed {USER_ID_HEADER} header")))?;

  let role = match headers.get(USER_ROLE_HEADER) {
    None => Role::default(),
    Some(value) => value
      .to_str()
      .ok()
      .and_then(|s| s.trim().parse::<Role>().ok())
      .ok_or_else(|| {
        ApiError::Unauthorized(format!("unknown role in {USER_ROLE_HEADER} header"))
      })?,
  };

  Ok(Actor::new(user_id, role))
}

impl<S> FromRequestParts<S> for Identity
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    identity_from_headers(&parts.headers).map(Identity)
  }
}

// ─── JSON body ───────────────────────────────────────────────────────────────

/// Like [`Json`], but a body that fails to parse is a 400 with the usual
/// `{"error": ...}` payload.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let Json(value) = Json::<T>::from_request(req, state)
      .await
      .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    Ok(Self(value))
  }
}
