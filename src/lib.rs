//! # Chatipelago Admin - operator tooling for the Chatipelago client
//!
//! Chatipelago bridges Archipelago multiworld games into a streamer's chat.
//! This crate holds the pieces an operator needs around it: checking and
//! normalizing the content lists fed to the bundle builder, validating the
//! client configuration and message templates, and talking to the client's
//! admin API.
//!
//! ## Features
//!
//! - **Content lists**: accepts both the nested and the legacy flat layout,
//!   normalizes to the nested one and validates either.
//! - **Client configuration**: typed model with mutually exclusive
//!   integration modes and per-field error reports.
//! - **Message templates**: placeholder whitelist checks for list templates,
//!   key/value templates passed through.
//! - **Admin API** (feature `api`): configuration, templates, status,
//!   restarts and the live console over HTTP.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatipelago_admin::content::load_content_file;
//! use chatipelago_admin::validation::{validate_content, FlatCounts};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let doc = load_content_file("content.yaml").await?;
//!     let report = validate_content(&doc, &FlatCounts::current());
//!     for error in report.errors() {
//!         println!("{error}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`content`] - content document detection, normalization and loading
//! - [`validation`] - content, configuration and template rules
//! - [`client_config`] - client configuration model and edit drafts
//! - [`template`] - message template shapes
//! - [`console`] - console event decoding and history
//! - [`status`] - status snapshot formatting
//! - [`config`] - settings of this tool
//! - `api` - HTTP clients for the admin API and bundle builder

#[cfg(feature = "api")]
pub mod api;
pub mod client_config;
pub mod config;
pub mod console;
pub mod content;
pub mod error;
pub mod logutil;
pub mod status;
pub mod template;
pub mod validation;
