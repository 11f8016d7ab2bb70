/// Database layer for Checkmark
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: Embedded schema migrations
///
/// Models are in the `models` module; the persistence traits that services
/// use are in `repository`.

pub mod migrations;
pub mod pool;
