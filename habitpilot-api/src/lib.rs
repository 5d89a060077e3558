//! # HabitPilot API Server Library
//!
//! HTTP layer of HabitPilot: authentication, task CRUD and score endpoints
//! over the stores in `habitpilot_shared`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
