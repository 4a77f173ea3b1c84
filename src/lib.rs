//! Cost Katana prompt templates
//!
//! This library renders prompt templates, estimates their token cost, keeps a
//! local history of template usage and exposes the editing workflow over a
//! small HTTP API.

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
