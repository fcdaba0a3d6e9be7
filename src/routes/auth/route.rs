use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use super::dto::{LoginRequest, LoginResponse, LoginUser, MeResponse};
use crate::config::JWT_EXPRIED_TIME;
use crate::error::{ApiError, ErrorResponse};
use crate::extractor::{CurrentUser, JsonBody};
use crate::services::{Resolved, StudentService};
use crate::state::AppState;
use crate::utils::jwt::{Identity, UserRole};

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}

/// Login endpoint - returns JWT token
///
/// The configured admin identity is checked before any student lookup.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing credentials", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let config = &state.config;
    if email == config.admin_email.to_lowercase() && payload.password == config.admin_password {
        let token = state
            .jwt
            .create_jwt(&email, "Admin", UserRole::Admin, None, JWT_EXPRIED_TIME)
            .map_err(|e| ApiError::Internal(format!("Failed to create token: {:#}", e)))?;

        tracing::info!("Admin {} logged in", email);
        return Ok((
            StatusCode::OK,
            Json(LoginResponse {
                success: true,
                token,
                role: UserRole::Admin,
                user: LoginUser {
                    id: None,
                    email,
                    name: "Admin".to_string(),
                    role: UserRole::Admin,
                    honors: None,
                    group_id: None,
                },
                notice: None,
            }),
        ));
    }

    let resolved = StudentService::new(&state)
        .authenticate(&email, &payload.password)
        .await;
    let notice = resolved.notice();
    let student = match resolved {
        Resolved::Found(student) | Resolved::UsedFallback(student) => student,
        Resolved::NotFound => {
            tracing::warn!("Failed login for {}", email);
            return Err(ApiError::InvalidCredentials);
        }
    };

    let token = state
        .jwt
        .create_jwt(
            &student.email,
            &student.full_name(),
            UserRole::Student,
            Some(student.id),
            JWT_EXPRIED_TIME,
        )
        .map_err(|e| ApiError::Internal(format!("Failed to create token: {:#}", e)))?;

    tracing::info!("Student {} logged in", student.id);
    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            success: true,
            token,
            role: UserRole::Student,
            user: LoginUser {
                id: Some(student.id),
                name: student.full_name(),
                email: student.email,
                role: UserRole::Student,
                honors: Some(student.honors),
                group_id: student.group_id,
            },
            notice,
        }),
    ))
}

/// The identity behind the bearer token
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current identity", body = MeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
pub async fn me(user: CurrentUser) -> Result<(StatusCode, Json<MeResponse>), ApiError> {
    let response = match user.require_authenticated()? {
        Identity::Admin { email } => MeResponse {
            success: true,
            role: UserRole::Admin,
            email: email.clone(),
            student_id: None,
        },
        Identity::Student { student_id, email } => MeResponse {
            success: true,
            role: UserRole::Student,
            email: email.clone(),
            student_id: Some(*student_id),
        },
        Identity::Anonymous => return Err(ApiError::Unauthorized),
    };
    Ok((StatusCode::OK, Json(response)))
}
