use std::convert::Infallible;

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use http::request::Parts;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::fallback::CompletionFlags;
use crate::fallback::local_mirror::parse_local_goals_header;
use crate::state::AppState;
use crate::utils::ids::parse_student_id;
use crate::utils::jwt::Identity;

pub const LOCAL_GOALS_HEADER: &str = "x-local-goals";

/// The verified caller. Never rejects; handlers decide what a missing or
/// invalid token means.
pub struct CurrentUser(pub Identity);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let bearer = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok();
        let token = bearer.as_ref().map(|TypedHeader(Authorization(b))| b.token());
        Ok(CurrentUser(state.jwt.verify(token)))
    }
}

impl CurrentUser {
    pub fn require_authenticated(&self) -> Result<&Identity, ApiError> {
        if self.0.is_authenticated() {
            Ok(&self.0)
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        match &self.0 {
            Identity::Anonymous => Err(ApiError::Unauthorized),
            Identity::Admin { .. } => Ok(()),
            Identity::Student { .. } => Err(ApiError::Forbidden("Admin access required".to_string())),
        }
    }

    /// Students may only touch their own records; admins may touch any.
    pub fn require_self_or_admin(&self, student_id: i64) -> Result<(), ApiError> {
        match &self.0 {
            Identity::Anonymous => Err(ApiError::Unauthorized),
            Identity::Admin { .. } => Ok(()),
            Identity::Student { student_id: own, .. } if *own == student_id => Ok(()),
            Identity::Student { .. } => Err(ApiError::Forbidden(
                "You can only access your own data".to_string(),
            )),
        }
    }
}

/// The browser's copy of today's completions, if it sent one.
pub struct LocalGoals(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for LocalGoals {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(LOCAL_GOALS_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(LocalGoals(value))
    }
}

impl LocalGoals {
    pub fn flags(&self, student_id: i64, today: &str) -> Option<CompletionFlags> {
        self.0
            .as_deref()
            .and_then(|raw| parse_local_goals_header(raw, student_id, today))
    }
}

/// `Json` whose rejections use the error envelope.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

/// `Query` whose rejections use the error envelope.
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

pub fn student_id_param(raw: &str) -> Result<i64, ApiError> {
    parse_student_id(raw).ok_or_else(|| ApiError::BadRequest(format!("Invalid student id {}", raw)))
}
