//! Railway complaint management backend
//!
//! Passengers file and track complaints; administrators triage them and watch
//! dashboard aggregates. The binary in `main.rs` wires these modules into an
//! HTTP server.

pub mod auth;
pub mod chatbot;
pub mod config;
pub mod database;
pub mod display;
pub mod error;
pub mod extract;
pub mod filter;
pub mod handler;
pub mod lifecycle;
pub mod metrics;
pub mod middleware;
pub mod model;
pub mod repository;
pub mod route;
