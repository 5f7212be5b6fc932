use serde::{Deserialize, Serialize};

/// Tagged database backend variant with stable wire numbering (spec §3).
///
/// The discriminants are part of the external contract — metric export and
/// any future wire serialization key off them — so they must never be
/// renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum DatabaseKind {
    None = 0,
    Postgres = 1,
    MySql = 2,
    Sqlite = 3,
    Oracle = 4,
    MongoDb = 5,
    Redis = 6,
}

impl DatabaseKind {
    pub fn as_wire(&self) -> u8 {
        *self as u8
    }

    pub fn from_wire(v: u8) -> Option<Self> {
        Some(match v {
            0 => DatabaseKind::None,
            1 => DatabaseKind::Postgres,
            2 => DatabaseKind::MySql,
            3 => DatabaseKind::Sqlite,
            4 => DatabaseKind::Oracle,
            5 => DatabaseKind::MongoDb,
            6 => DatabaseKind::Redis,
            _ => return None,
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            DatabaseKind::None => "none",
            DatabaseKind::Postgres => "postgres",
            DatabaseKind::MySql => "mysql",
            DatabaseKind::Sqlite => "sqlite",
            DatabaseKind::Oracle => "oracle",
            DatabaseKind::MongoDb => "mongodb",
            DatabaseKind::Redis => "redis",
        }
    }

    /// Whether the backend's dialect family is relational (SQL).
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            DatabaseKind::Postgres | DatabaseKind::MySql | DatabaseKind::Sqlite | DatabaseKind::Oracle
        )
    }
}

impl std::fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_numbering_is_stable() {
        assert_eq!(DatabaseKind::None.as_wire(), 0);
        assert_eq!(DatabaseKind::Postgres.as_wire(), 1);
        assert_eq!(DatabaseKind::MySql.as_wire(), 2);
        assert_eq!(DatabaseKind::Sqlite.as_wire(), 3);
        assert_eq!(DatabaseKind::Oracle.as_wire(), 4);
        assert_eq!(DatabaseKind::MongoDb.as_wire(), 5);
        assert_eq!(DatabaseKind::Redis.as_wire(), 6);
    }

    #[test]
    fn round_trips_through_wire() {
        for kind in [
            DatabaseKind::None,
            DatabaseKind::Postgres,
            DatabaseKind::MySql,
            DatabaseKind::Sqlite,
            DatabaseKind::Oracle,
            DatabaseKind::MongoDb,
            DatabaseKind::Redis,
        ] {
            assert_eq!(DatabaseKind::from_wire(kind.as_wire()), Some(kind));
        }
        assert_eq!(DatabaseKind::from_wire(255), None);
    }
}
