use anyhow::Context;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Student,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Student => "student",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub sub: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<i64>,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// The caller behind a request. Verification never fails loudly; a bad or
/// missing token is simply `Anonymous`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Admin { email: String },
    Student { student_id: i64, email: String },
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        matches!(self, Identity::Admin { .. })
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Identity::Anonymous)
    }

    pub fn student_id(&self) -> Option<i64> {
        match self {
            Identity::Student { student_id, .. } => Some(*student_id),
            _ => None,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Identity::Anonymous => None,
            Identity::Admin { email } | Identity::Student { email, .. } => Some(email),
        }
    }
}

#[derive(Clone)]
pub struct JwtManager {
    secret: String,
}

impl JwtManager {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn create_jwt(
        &self,
        email: &str,
        name: &str,
        role: UserRole,
        student_id: Option<i64>,
        expires_in: i64,
    ) -> anyhow::Result<String> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: email.to_string(),
            role,
            student_id,
            name: name.to_string(),
            iat: now,
            exp: now + expires_in,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to encode token")
    }

    pub fn decode_jwt(&self, token: &str) -> anyhow::Result<TokenClaims> {
        let data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .context("Failed to decode token")?;
        Ok(data.claims)
    }

    pub fn verify(&self, token: Option<&str>) -> Identity {
        let Some(token) = token else {
            return Identity::Anonymous;
        };

        let claims = match self.decode_jwt(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("Rejected bearer token: {:#}", e);
                return Identity::Anonymous;
            }
        };

        match (claims.role, claims.student_id) {
            (UserRole::Admin, _) => Identity::Admin { email: claims.sub },
            (UserRole::Student, Some(student_id)) => Identity::Student {
                student_id,
                email: claims.sub,
            },
            (UserRole::Student, None) => Identity::Anonymous,
        }
    }
}
