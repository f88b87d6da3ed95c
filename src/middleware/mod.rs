//! HTTP middleware components.
//!
//! Middleware run before route handlers. The session middleware gates every
//! protected route; the admin check gates the back-office subset.

/// Session and admin-role authentication middleware
pub mod auth;
