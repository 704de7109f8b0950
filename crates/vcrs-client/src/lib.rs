//! VCRS Client Library
//!
//! Client side of the Village Complaint Redressal System.
//!
//! This crate provides:
//! - Session storage (in-memory and YAML file backed)
//! - HTTP backend for the auth and complaint endpoints
//! - Registration, login, submission and status-change flows
//! - Table and summary rendering for the status and dashboard pages
//! - Page controller with role guards

pub mod api;
pub mod auth;
pub mod complaints;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod page;
pub mod render;
pub mod session;
pub mod ui;

#[cfg(test)]
mod testing;

pub use api::{Backend, HttpBackend};
pub use config::ClientConfig;
pub use controller::{PageController, PageEvent, PageView};
pub use error::{ClientError, ClientResult};
pub use page::Page;
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
pub use ui::{Capabilities, Document, HtmlDocument, Navigator, Notice, Notifier};
