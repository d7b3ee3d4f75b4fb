//! API Routes
//!
//! Route handlers organized by functionality.

pub mod aggregate;
pub mod charts;
pub mod export;
pub mod filters;
pub mod health;
