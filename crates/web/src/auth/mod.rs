//! Cookie-credential authentication and role authorization.
//!
//! The credential is a signed stateless JWT presented in the `token` cookie
//! on every request. It is verified fresh each time; nothing is cached and
//! there is no revocation list. Claims live only for the request.

pub mod cookie;
pub mod middleware;
pub mod token;

pub use cookie::token_from_cookie_header;
pub use middleware::{authorize, require_roles, AuthenticatedClaims, AuthzDecision, DenialReason};
pub use token::{Claims, TokenCodec};
