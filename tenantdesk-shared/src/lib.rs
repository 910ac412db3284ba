//! # TenantDesk Shared Library
//!
//! Core of the TenantDesk multi-tenant project and task backend. The HTTP
//! server in `tenantdesk-api` is a thin layer over the services here.
//!
//! ## Module Organization
//!
//! - `models`: Database models and request payloads
//! - `auth`: Credential store, session tokens, authorization guard
//! - `store`: Repository traits with PostgreSQL and in-memory backends
//! - `service`: Tenant registry, session issuer, scoped resources, audit
//! - `quota`: Per-tenant user and project limits
//! - `db`: Connection pool and migrations
//! - `error`: Core error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod quota;
pub mod service;
pub mod store;

pub use error::{CoreError, CoreResult};

/// Current version of the TenantDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
