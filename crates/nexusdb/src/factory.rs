use nexusdb_core::{DatabaseKind, DbDriver};

/// Factory table keyed by [`DatabaseKind`] (spec §4.7). Returns `None` for
/// backends with no driver crate compiled in, or with no driver at all
/// (`DatabaseKind::None`, `DatabaseKind::Oracle`).
pub fn build_driver(kind: DatabaseKind) -> Option<Box<dyn DbDriver>> {
    match kind {
        #[cfg(feature = "sqlite")]
        DatabaseKind::Sqlite => Some(Box::new(nexusdb_driver_sqlite::SqliteDriver::new())),
        #[cfg(feature = "postgres")]
        DatabaseKind::Postgres => Some(Box::new(nexusdb_driver_postgres::PostgresDriver::new())),
        #[cfg(feature = "mysql")]
        DatabaseKind::MySql => Some(Box::new(nexusdb_driver_mysql::MySqlDriver::new())),
        #[cfg(feature = "mongodb")]
        DatabaseKind::MongoDb => Some(Box::new(nexusdb_driver_mongodb::MongoDriver::new())),
        #[cfg(feature = "redis")]
        DatabaseKind::Redis => Some(Box::new(nexusdb_driver_redis::RedisDriver::new())),
        _ => {
            log::error!("nexusdb: no driver available for {kind} (feature disabled or unsupported)");
            None
        }
    }
}
