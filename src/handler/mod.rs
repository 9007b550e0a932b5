//! HTTP request handlers for the complaint API
//!
//! - [`complaint`]: public submission and tracking
//! - [`chatbot`]: the scripted intake dialogue
//! - [`auth`]: admin login, refresh, logout and identity
//! - [`admin`]: complaint triage and dashboard aggregates
//! - [`meta`]: health check and dropdown options

pub mod admin;
pub mod auth;
pub mod chatbot;
pub mod complaint;
pub mod meta;
