//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `Session`: token-based session persistence with expiry
//! - `claims`: unverified decoding of the token's identity payload
//! - `CredentialStore`: secure OS-level credential storage via keyring
//!
//! The session token is deleted at logout and whenever the server answers
//! an authenticated request with 401 or 403.

pub mod claims;
pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{Session, SessionData};
