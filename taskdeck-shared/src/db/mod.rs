/// Database layer for taskdeck
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with a health check
/// - `migrations`: sqlx migration runner
///
/// Table gateways live in the `models` module at crate root level.
pub mod migrations;
pub mod pool;
