use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Verified identity attached to the request once by the middleware.
/// Handlers read it from extensions; no handler re-parses the token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub roles: Vec<String>,
}

pub const AUTHORING_ROLES: &[&str] = &["admin", "examiner"];

/// The single role policy predicate. An empty requirement admits any
/// authenticated caller.
pub fn role_permitted(allowed: &[&str], roles: &[String]) -> bool {
    allowed.is_empty()
        || roles
            .iter()
            .any(|role| allowed.iter().any(|a| a.eq_ignore_ascii_case(role)))
}

fn unauthorized(code: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": code }))).into_response()
}

fn verify_request(req: &Request) -> Result<AuthContext, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(unauthorized("missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(unauthorized("bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(unauthorized("unsupported_scheme"));
    };

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| unauthorized("invalid_token"))?;

    let user_id =
        Uuid::parse_str(&data.claims.sub).map_err(|_| unauthorized("invalid_subject"))?;

    Ok(AuthContext {
        user_id,
        roles: data.claims.roles,
    })
}

pub async fn require_auth(mut req: Request, next: Next) -> Response {
    match verify_request(&req) {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(resp) => resp,
    }
}

pub async fn require_authoring_role(mut req: Request, next: Next) -> Response {
    match verify_request(&req) {
        Ok(ctx) if role_permitted(AUTHORING_ROLES, &ctx.roles) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Ok(_) => (StatusCode::FORBIDDEN, Json(json!({ "error": "forbidden" }))).into_response(),
        Err(resp) => resp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_matches_case_insensitively() {
        let roles = vec!["Admin".to_string()];
        assert!(role_permitted(AUTHORING_ROLES, &roles));
    }

    #[test]
    fn policy_rejects_missing_role() {
        let roles = vec!["student".to_string()];
        assert!(!role_permitted(AUTHORING_ROLES, &roles));
        assert!(!role_permitted(AUTHORING_ROLES, &[]));
    }

    #[test]
    fn empty_requirement_admits_anyone() {
        assert!(role_permitted(&[], &[]));
        assert!(role_permitted(&[], &["student".to_string()]));
    }
}
