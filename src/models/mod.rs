//! Typed DTOs exchanged with the KALE pool backend.
//!
//! The client passes these through without interpreting them; they exist so
//! callers get typed results. Wire names are camelCase unless the backend
//! uses something else.

pub mod auth;
pub mod common;
pub mod health;
pub mod operations;
pub mod pooler;
pub mod registration;

pub use auth::*;
pub use common::*;
pub use health::*;
pub use operations::*;
pub use pooler::*;
pub use registration::*;
