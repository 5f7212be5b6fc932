mod ast;
mod dialect;
mod document;
mod keyvalue;
mod relational;

pub use ast::{CompareOp, Condition, Join, JoinType, OrderBy, SortDirection};
pub use dialect::{Dialect, MySqlDialect, PostgresDialect, SqliteDialect};
pub use document::DocumentQueryBuilder;
pub use keyvalue::KeyValueQueryBuilder;
pub use relational::RelationalQueryBuilder;

use nexusdb_core::DatabaseKind;

/// Selects the underlying builder by [`DatabaseKind`] (spec §4.3). A
/// facade instance is single-dialect once constructed.
pub enum QueryBuilder {
    Relational(RelationalQueryBuilder),
    Document(DocumentQueryBuilder),
    KeyValue(KeyValueQueryBuilder),
}

impl QueryBuilder {
    /// Builds a relational or document query builder ready for `collection`
    /// use depends on the caller; for relational kinds `collection_or_table`
    /// is unused (call [`Self::relational`] directly for full control).
    pub fn relational_for(kind: DatabaseKind) -> Option<RelationalQueryBuilder> {
        let dialect: Box<dyn Dialect> = match kind {
            DatabaseKind::Postgres | DatabaseKind::Oracle => Box::new(PostgresDialect),
            DatabaseKind::MySql => Box::new(MySqlDialect),
            DatabaseKind::Sqlite => Box::new(SqliteDialect),
            _ => return None,
        };
        Some(RelationalQueryBuilder::new(dialect))
    }

    pub fn document_for(kind: DatabaseKind, collection: impl Into<String>) -> Option<DocumentQueryBuilder> {
        match kind {
            DatabaseKind::MongoDb => Some(DocumentQueryBuilder::new(collection)),
            _ => None,
        }
    }

    pub fn key_value_for(kind: DatabaseKind, command: impl Into<String>) -> Option<KeyValueQueryBuilder> {
        match kind {
            DatabaseKind::Redis => Some(KeyValueQueryBuilder::new(command)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_relational_dialect_by_kind() {
        assert!(QueryBuilder::relational_for(DatabaseKind::Postgres).is_some());
        assert!(QueryBuilder::relational_for(DatabaseKind::MongoDb).is_none());
    }

    #[test]
    fn dispatches_document_builder_only_for_mongo() {
        assert!(QueryBuilder::document_for(DatabaseKind::MongoDb, "users").is_some());
        assert!(QueryBuilder::document_for(DatabaseKind::Redis, "users").is_none());
    }
}
