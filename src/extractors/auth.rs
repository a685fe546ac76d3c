use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

use crate::access::{role_has, AccessScope, Capability};
use crate::models::UserRole;
use crate::{auth, AppError, AppState};

/// The resolved identity behind a request: who is acting, for which
/// company, and what they are assigned to.
///
/// Resolved fresh on every request from the bearer token and the current
/// database rows; nothing here is cached, so deactivating a user or
/// changing an assignment takes effect immediately.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub company_id: Uuid,
    pub role: UserRole,
    pub can_view_all: bool,
    pub location_ids: Vec<Uuid>,
    pub position_ids: Vec<Uuid>,
}

impl Principal {
    /// The set of locations this principal may read or write.
    pub fn scope(&self) -> AccessScope {
        AccessScope::resolve(self.role, self.can_view_all, &self.location_ids)
    }

    /// Fail with Forbidden unless the principal's role grants `capability`.
    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if role_has(self.role, capability) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Your role does not permit this action".to_string(),
            ))
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.to_string())
}

#[derive(sqlx::FromRow)]
struct PrincipalRow {
    id: Uuid,
    company_id: Uuid,
    role: UserRole,
    can_view_all: bool,
    is_active: bool,
}

impl FromRequestParts<Arc<AppState>> for Principal {
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = bearer_token(parts);
        let state = state.clone();

        async move {
            let token = token
                .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

            let claims = auth::verify_token(&token, &state.config.jwt_secret)?;

            let user = sqlx::query_as::<_, PrincipalRow>(
                "SELECT id, company_id, role, can_view_all, is_active FROM users WHERE id = $1",
            )
            .bind(claims.sub)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))?;

            if !user.is_active {
                return Err(AppError::Unauthorized(
                    "This account has been deactivated".to_string(),
                ));
            }

            let location_ids: Vec<Uuid> = sqlx::query_scalar(
                "SELECT location_id FROM user_locations WHERE user_id = $1",
            )
            .bind(user.id)
            .fetch_all(&state.db)
            .await?;

            let position_ids: Vec<Uuid> = sqlx::query_scalar(
                "SELECT position_id FROM user_positions WHERE user_id = $1",
            )
            .bind(user.id)
            .fetch_all(&state.db)
            .await?;

            Ok(Principal {
                id: user.id,
                company_id: user.company_id,
                role: user.role,
                can_view_all: user.can_view_all,
                location_ids,
                position_ids,
            })
        }
    }
}
