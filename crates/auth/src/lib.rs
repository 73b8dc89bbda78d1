//! `shopwise-auth`: session tokens and the admin gate.
//!
//! This crate is decoupled from HTTP and storage: it knows how to issue and
//! validate session tokens and how to decide whether a path is reachable for
//! a given session.

pub mod claims;
pub mod gate;
pub mod password;
pub mod roles;
pub mod session;
pub mod token;

pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use gate::{DenialReason, GateDecision, SIGN_IN_PATH, SignInRedirect, admin_gate, is_admin_path};
pub use password::{PasswordError, verify_password};
pub use roles::Role;
pub use session::Session;
pub use token::{Hs256Tokens, TokenError, TokenValidator};
