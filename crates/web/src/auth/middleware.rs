//! Authorization guard middleware for Axum.
//!
//! Every upstream-fronted route is wrapped by [`require_roles`]; a route
//! without the guard is a security gap, not a shortcut. The guard is a pure
//! function of the request and process configuration: extract the cookie
//! credential, verify it, check the role against the route's allowlist.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use pvegate_common::{Error, Role};

use super::cookie::token_from_headers;
use super::token::{Claims, TokenCodec};
use crate::server::GatewayState;

/// Extension holding the verified claims of the current request.
#[derive(Clone)]
pub struct AuthenticatedClaims(pub Claims);

/// Why a request was denied.
#[derive(Debug)]
pub enum DenialReason {
    /// No `token` cookie on the request
    MissingCredential,
    /// Signature, structure, or expiry check failed
    InvalidCredential,
    /// Verified credential, but the role is not in the route's allowlist
    RoleNotAllowed { identity: String, role: Role },
}

impl DenialReason {
    fn into_error(self) -> Error {
        match self {
            DenialReason::MissingCredential => {
                Error::Unauthenticated("missing token cookie".into())
            }
            DenialReason::InvalidCredential => {
                Error::Unauthenticated("invalid or expired token".into())
            }
            DenialReason::RoleNotAllowed { role, .. } => {
                Error::Forbidden(format!("role {} is not allowed here", role.as_str()))
            }
        }
    }
}

/// One authorization decision, produced per request and then discarded.
#[derive(Debug)]
pub enum AuthzDecision {
    Granted(Claims),
    Denied(DenialReason),
}

impl AuthzDecision {
    pub fn authorized(&self) -> bool {
        matches!(self, AuthzDecision::Granted(_))
    }
}

/// Decide whether a request may proceed.
///
/// Pure: no side effects, no store lookups. Callers map a denial to the
/// 401/403 failure envelope and must not run the protected operation.
pub fn authorize(codec: &TokenCodec, headers: &HeaderMap, allowed: &[Role]) -> AuthzDecision {
    let Some(raw) = token_from_headers(headers) else {
        return AuthzDecision::Denied(DenialReason::MissingCredential);
    };

    let claims = match codec.verify(&raw) {
        Ok(claims) => claims,
        Err(err) => {
            warn!(error = %err, "credential verification failed");
            return AuthzDecision::Denied(DenialReason::InvalidCredential);
        }
    };

    if !allowed.contains(&claims.role) {
        return AuthzDecision::Denied(DenialReason::RoleNotAllowed {
            identity: claims.identity,
            role: claims.role,
        });
    }

    AuthzDecision::Granted(claims)
}

/// Middleware factory that requires one of the given roles.
///
/// Used with `middleware::from_fn_with_state`; on success the verified
/// claims are attached to request extensions for the handler.
pub fn require_roles(
    allowed: &'static [Role],
) -> impl Fn(
    State<Arc<GatewayState>>,
    Request,
    Next,
) -> Pin<Box<dyn Future<Output = Response> + Send>>
       + Clone {
    move |State(state): State<Arc<GatewayState>>, mut request: Request, next: Next| {
        Box::pin(async move {
            match authorize(&state.codec, request.headers(), allowed) {
                AuthzDecision::Granted(claims) => {
                    request.extensions_mut().insert(AuthenticatedClaims(claims));
                    next.run(request).await
                }
                AuthzDecision::Denied(reason) => {
                    if let DenialReason::RoleNotAllowed { identity, .. } = &reason {
                        warn!(identity = %identity, path = %request.uri().path(), "access denied");
                    }
                    reason.into_error().into_response()
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    const ANY_ROLE: &[Role] = &[Role::Admin, Role::User];
    const ADMIN_ONLY: &[Role] = &[Role::Admin];

    fn codec() -> TokenCodec {
        TokenCodec::new("guard-test-secret")
    }

    fn headers_with_token(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("token={token}")).unwrap(),
        );
        headers
    }

    fn user_claims() -> Claims {
        Claims {
            identity: "bob".into(),
            role: Role::User,
            division: "hosting".into(),
            exp: Some(chrono::Utc::now().timestamp() as u64 + 600),
        }
    }

    #[test]
    fn test_grants_with_matching_role() {
        let codec = codec();
        let token = codec.sign(&user_claims()).unwrap();
        let decision = authorize(&codec, &headers_with_token(&token), ANY_ROLE);
        match decision {
            AuthzDecision::Granted(claims) => {
                assert_eq!(claims.identity, "bob");
                assert_eq!(claims.division, "hosting");
            }
            other => panic!("expected grant, got {other:?}"),
        }
    }

    #[test]
    fn test_denies_missing_credential() {
        let decision = authorize(&codec(), &HeaderMap::new(), ANY_ROLE);
        assert!(matches!(
            decision,
            AuthzDecision::Denied(DenialReason::MissingCredential)
        ));
    }

    #[test]
    fn test_denies_foreign_signature() {
        let foreign = TokenCodec::new("some-other-secret");
        let token = foreign.sign(&user_claims()).unwrap();
        let decision = authorize(&codec(), &headers_with_token(&token), ANY_ROLE);
        assert!(matches!(
            decision,
            AuthzDecision::Denied(DenialReason::InvalidCredential)
        ));
    }

    #[test]
    fn test_denies_role_outside_allowlist() {
        let codec = codec();
        let token = codec.sign(&user_claims()).unwrap();
        let decision = authorize(&codec, &headers_with_token(&token), ADMIN_ONLY);
        match decision {
            AuthzDecision::Denied(DenialReason::RoleNotAllowed { identity, role }) => {
                assert_eq!(identity, "bob");
                assert_eq!(role, Role::User);
            }
            other => panic!("expected role denial, got {other:?}"),
        }
        assert!(!authorize(&codec, &headers_with_token(&token), ADMIN_ONLY).authorized());
    }
}
