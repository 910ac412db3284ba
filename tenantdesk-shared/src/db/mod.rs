/// Database layer for TenantDesk
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with health check
/// - `migrations`: embedded schema migrations
///
/// Queries live with the models in [`crate::models`]; the store traits in
/// [`crate::store`] are what the rest of the crate depends on.

pub mod migrations;
pub mod pool;
