//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no business vocabulary:
//! - Cryptographic utilities (SHA-256, HMAC, Base64)
//! - Password hashing (Argon2id, NIST SP 800-63B style)
//! - Cookie and client header handling
//! - JSON-over-HTTP client for upstream services

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
pub mod upstream;
