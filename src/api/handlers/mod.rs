//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Turn processing and profile inspection handlers.
pub mod chat;
/// Health check handler.
pub mod health;
