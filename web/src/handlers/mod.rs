//! Handlers shared by every Spacer router.

pub mod health;

pub use health::health_check;
