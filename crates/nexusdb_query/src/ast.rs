use nexusdb_core::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
}

impl CompareOp {
    fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Neq => "!=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Like => "LIKE",
        }
    }
}

/// Tree of WHERE/HAVING leaves and AND/OR nodes (spec §4.3).
#[derive(Debug, Clone)]
pub enum Condition {
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },
    IsNull {
        field: String,
    },
    IsNotNull {
        field: String,
    },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

impl Condition {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Compare {
            field: field.into(),
            op: CompareOp::Eq,
            value: value.into(),
        }
    }

    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Condition::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn and(self, other: Condition) -> Self {
        Condition::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Condition) -> Self {
        Condition::Or(Box::new(self), Box::new(other))
    }

    /// Renders the condition tree. Field names are emitted verbatim
    /// (unquoted) per spec §8 S1's worked example.
    pub fn render(&self, dialect: &dyn crate::dialect::Dialect) -> String {
        match self {
            Condition::Compare { field, op, value } => {
                format!("{} {} {}", field, op.as_sql(), dialect.value_to_literal(value))
            }
            Condition::IsNull { field } => format!("{field} IS NULL"),
            Condition::IsNotNull { field } => format!("{field} IS NOT NULL"),
            Condition::And(a, b) => format!("({} AND {})", a.render(dialect), b.render(dialect)),
            Condition::Or(a, b) => format!("({} OR {})", a.render(dialect), b.render(dialect)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    fn as_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Join {
    pub kind: JoinType,
    pub table: String,
    pub predicate: String,
}

impl Join {
    pub fn render(&self, dialect: &dyn crate::dialect::Dialect) -> String {
        format!(
            "{} {} ON {}",
            self.kind.as_sql(),
            dialect.quote_identifier(&self.table),
            self.predicate
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn render(&self) -> String {
        format!("{} {}", self.column, self.direction.as_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PostgresDialect;

    #[test]
    fn compare_renders_unquoted_field() {
        let cond = Condition::eq("active", true);
        assert_eq!(cond.render(&PostgresDialect), "active = TRUE");
    }

    #[test]
    fn and_wraps_in_parens() {
        let cond = Condition::eq("active", true).and(Condition::eq("id", 1_i64));
        assert_eq!(cond.render(&PostgresDialect), "(active = TRUE AND id = 1)");
    }
}
