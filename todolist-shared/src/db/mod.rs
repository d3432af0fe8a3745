/// Database connectivity
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: Embedded schema migrations from `migrations/`

pub mod migrations;
pub mod pool;
