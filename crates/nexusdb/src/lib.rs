mod config;
mod database;
mod factory;

pub use config::NexusConfig;
pub use database::Database;

pub use nexusdb_core::{DatabaseKind, DbDriver, DbError, QueryResult, Row, Value};

use std::sync::{Arc, OnceLock};

static DEFAULT_INSTANCE: OnceLock<Arc<Database>> = OnceLock::new();

/// Process-scoped shared handle, lazily created on first call (spec §9's
/// backward-compatibility shim for code that wants a single shared
/// instance rather than constructing its own `Database`).
pub fn default_instance() -> Arc<Database> {
    DEFAULT_INSTANCE
        .get_or_init(|| Arc::new(Database::new()))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_instance_is_stable_across_calls() {
        let a = default_instance();
        let b = default_instance();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
