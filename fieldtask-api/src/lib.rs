//! # FieldTask API Server Library
//!
//! This library provides the HTTP surface of the FieldTask API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers
//! - `validation`: Request validation rules

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod validation;
