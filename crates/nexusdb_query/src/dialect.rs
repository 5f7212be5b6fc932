use nexusdb_core::Value;

/// Database-specific SQL syntax: identifier quoting and literal rendering
/// (spec §4.3). Keywords are never quoted; string literals are wrapped in
/// single quotes with no embedded escaping beyond what the caller supplies
/// (spec §9 — the SQL-injection-hazard open question is left exactly that,
/// an open question: do not guess caller intent for escaping).
pub trait Dialect: Send + Sync {
    fn quote_identifier(&self, name: &str) -> String;

    fn value_to_literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Value::Int64(i) => i.to_string(),
            Value::Float64(f) => {
                if f.is_nan() || f.is_infinite() {
                    "NULL".to_string()
                } else {
                    f.to_string()
                }
            }
            Value::String(s) => format!("'{s}'"),
            Value::Bytes(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02x}")).collect();
                format!("X'{hex}'")
            }
        }
    }
}

pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }
}

pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn quote_identifier(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_dialect_quotes_its_own_way() {
        assert_eq!(PostgresDialect.quote_identifier("id"), "\"id\"");
        assert_eq!(MySqlDialect.quote_identifier("id"), "`id`");
        assert_eq!(SqliteDialect.quote_identifier("id"), "[id]");
    }

    #[test]
    fn bool_literal_is_true_false() {
        assert_eq!(PostgresDialect.value_to_literal(&Value::Bool(true)), "TRUE");
        assert_eq!(PostgresDialect.value_to_literal(&Value::Bool(false)), "FALSE");
    }

    #[test]
    fn string_literal_is_rendered_verbatim_unescaped() {
        assert_eq!(
            PostgresDialect.value_to_literal(&Value::String("a'b".to_string())),
            "'a'b'"
        );
    }
}
