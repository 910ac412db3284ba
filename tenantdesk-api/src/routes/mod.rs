/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, current user and logout
/// - `tenants`: Tenant listing, details and updates
/// - `users`: User management within the acting tenant
/// - `projects`: Project CRUD
/// - `tasks`: Task CRUD and status changes
/// - `audit`: Audit trail
///
/// Handlers only translate between HTTP and core calls. Tenant scope and role
/// checks happen inside the core services.

pub mod audit;
pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod tenants;
pub mod users;
