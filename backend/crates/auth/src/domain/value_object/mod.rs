//! Value Object Module

pub mod api_key_secret;
pub mod email;
pub mod public_id;
pub mod user_password;
pub mod user_role;
pub mod user_status;
