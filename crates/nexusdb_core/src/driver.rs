use crate::{DatabaseKind, QueryResult};

/// Uniform operation surface over heterogeneous backends (spec §4.1).
///
/// Every backend satisfies this capability set; there is no deep
/// inheritance hierarchy (spec §9) — dispatch is via a tagged
/// [`DatabaseKind`] and trait objects (`Box<dyn DbDriver>`), not subtyping.
///
/// Mutation is expected to be internally synchronized (each driver wraps
/// its handle in a `std::sync::Mutex`) so a single driver instance may be
/// shared across threads; the pool instead hands out exclusive loans.
///
/// Failures are never propagated as `Err` from these methods — per spec §7
/// the caller receives a safe default (`false`, `0`, an empty
/// [`QueryResult`]) and the diagnostic is sent to the log sink. This keeps
/// the trait object-safe and mirrors the "no exceptions for control flow"
/// redesign note in spec §9.
pub trait DbDriver: Send + Sync {
    /// Returns the database kind this driver handles. Pure; safe to call at
    /// any time, connected or not.
    fn kind(&self) -> DatabaseKind;

    /// Establish the underlying connection. Idempotent on success — calling
    /// `connect` again on an already-open handle returns `false` and logs
    /// rather than reconnecting.
    fn connect(&self, conn_string: &str) -> bool;

    /// Tear down the underlying connection. Safe to call on a handle that
    /// was never connected (returns `false`).
    fn disconnect(&self) -> bool;

    /// Execute a DDL-like statement with no row result (e.g. `CREATE TABLE`).
    fn create_query(&self, query: &str) -> bool;

    /// Execute an insert; returns the number of rows/documents affected.
    /// `0` is overloaded between "no rows affected" and "error" per spec
    /// §9's open question — callers that need to distinguish should check
    /// the log sink for a concurrent error entry.
    fn insert_query(&self, query: &str) -> u32;

    /// Execute an update; returns the number of rows/documents affected.
    fn update_query(&self, query: &str) -> u32;

    /// Execute a delete; returns the number of rows/documents affected.
    fn delete_query(&self, query: &str) -> u32;

    /// Execute a query expected to return rows.
    fn select_query(&self, query: &str) -> QueryResult;

    /// Generic sink for admin/command strings that don't fit the CRUD verbs
    /// above (e.g. a MongoDB `run_command` JSON, a Redis `FLUSHDB`).
    fn execute_query(&self, query: &str) -> bool;
}
