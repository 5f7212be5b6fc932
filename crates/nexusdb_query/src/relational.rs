use crate::ast::{Condition, Join, OrderBy};
use crate::dialect::Dialect;
use nexusdb_core::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

/// Accumulates a relational AST (spec §4.3) and renders it against a
/// [`Dialect`]. A single instance is single-operation; call [`Self::reset`]
/// to reuse the allocation for a different statement.
pub struct RelationalQueryBuilder {
    dialect: Box<dyn Dialect>,
    operation: Operation,
    table: String,
    projection: Vec<String>,
    joins: Vec<Join>,
    where_: Option<Condition>,
    group_by: Vec<String>,
    having: Option<Condition>,
    order_by: Vec<OrderBy>,
    limit: Option<u64>,
    offset: Option<u64>,
    insert_columns: Vec<String>,
    insert_values: Vec<Value>,
    update_set: Vec<(String, Value)>,
}

impl RelationalQueryBuilder {
    pub fn new(dialect: Box<dyn Dialect>) -> Self {
        Self {
            dialect,
            operation: Operation::Select,
            table: String::new(),
            projection: Vec::new(),
            joins: Vec::new(),
            where_: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            insert_columns: Vec::new(),
            insert_values: Vec::new(),
            update_set: Vec::new(),
        }
    }

    pub fn reset(&mut self) -> &mut Self {
        self.operation = Operation::Select;
        self.table.clear();
        self.projection.clear();
        self.joins.clear();
        self.where_ = None;
        self.group_by.clear();
        self.having = None;
        self.order_by.clear();
        self.limit = None;
        self.offset = None;
        self.insert_columns.clear();
        self.insert_values.clear();
        self.update_set.clear();
        self
    }

    pub fn select(&mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.operation = Operation::Select;
        self.projection = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn from(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = table.into();
        self
    }

    pub fn insert_into(
        &mut self,
        table: impl Into<String>,
        columns: Vec<String>,
        values: Vec<Value>,
    ) -> &mut Self {
        self.operation = Operation::Insert;
        self.table = table.into();
        self.insert_columns = columns;
        self.insert_values = values;
        self
    }

    pub fn update(&mut self, table: impl Into<String>, set: Vec<(String, Value)>) -> &mut Self {
        self.operation = Operation::Update;
        self.table = table.into();
        self.update_set = set;
        self
    }

    pub fn delete_from(&mut self, table: impl Into<String>) -> &mut Self {
        self.operation = Operation::Delete;
        self.table = table.into();
        self
    }

    pub fn join(&mut self, join: Join) -> &mut Self {
        self.joins.push(join);
        self
    }

    /// Joins with the accumulated WHERE tree via AND.
    pub fn where_(&mut self, cond: Condition) -> &mut Self {
        self.where_ = Some(match self.where_.take() {
            None => cond,
            Some(existing) => existing.and(cond),
        });
        self
    }

    /// Replaces the last (rightmost) node of the WHERE tree with an OR
    /// subtree, per spec §4.3's boolean-combinator rule.
    pub fn or_where(&mut self, cond: Condition) -> &mut Self {
        self.where_ = Some(match self.where_.take() {
            None => cond,
            Some(existing) => replace_last_with_or(existing, cond),
        });
        self
    }

    pub fn group_by(&mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.group_by = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn having(&mut self, cond: Condition) -> &mut Self {
        self.having = Some(cond);
        self
    }

    pub fn order_by(&mut self, order: OrderBy) -> &mut Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// Renders the accumulated AST. Deterministic: identical inputs yield
    /// byte-identical output across any number of calls (spec §8 property 7).
    pub fn build(&self) -> String {
        match self.operation {
            Operation::Select => self.build_select(),
            Operation::Insert => self.build_insert(),
            Operation::Update => self.build_update(),
            Operation::Delete => self.build_delete(),
        }
    }

    fn build_select(&self) -> String {
        let columns = if self.projection.is_empty() {
            "*".to_string()
        } else {
            self.projection
                .iter()
                .map(|c| self.dialect.quote_identifier(c))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!(
            "SELECT {} FROM {}",
            columns,
            self.dialect.quote_identifier(&self.table)
        );

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.render(self.dialect.as_ref()));
        }

        if let Some(where_) = &self.where_ {
            sql.push_str(" WHERE ");
            sql.push_str(&unwrap_top_level(where_.render(self.dialect.as_ref())));
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if let Some(having) = &self.having {
            sql.push_str(" HAVING ");
            sql.push_str(&unwrap_top_level(having.render(self.dialect.as_ref())));
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(
                &self
                    .order_by
                    .iter()
                    .map(OrderBy::render)
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        sql
    }

    fn build_insert(&self) -> String {
        let columns = self
            .insert_columns
            .iter()
            .map(|c| self.dialect.quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let values = self
            .insert_values
            .iter()
            .map(|v| self.dialect.value_to_literal(v))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.dialect.quote_identifier(&self.table),
            columns,
            values
        )
    }

    fn build_update(&self) -> String {
        let set_clause = self
            .update_set
            .iter()
            .map(|(col, val)| {
                format!(
                    "{} = {}",
                    self.dialect.quote_identifier(col),
                    self.dialect.value_to_literal(val)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!(
            "UPDATE {} SET {}",
            self.dialect.quote_identifier(&self.table),
            set_clause
        );

        if let Some(where_) = &self.where_ {
            sql.push_str(" WHERE ");
            sql.push_str(&unwrap_top_level(where_.render(self.dialect.as_ref())));
        }

        sql
    }

    fn build_delete(&self) -> String {
        let mut sql = format!("DELETE FROM {}", self.dialect.quote_identifier(&self.table));

        if let Some(where_) = &self.where_ {
            sql.push_str(" WHERE ");
            sql.push_str(&unwrap_top_level(where_.render(self.dialect.as_ref())));
        }

        sql
    }
}

fn replace_last_with_or(existing: Condition, new: Condition) -> Condition {
    match existing {
        Condition::And(a, b) => Condition::And(a, Box::new(replace_last_with_or(*b, new))),
        other => Condition::Or(Box::new(other), Box::new(new)),
    }
}

/// A lone top-level comparison renders without the enclosing parens that
/// `Condition::render` adds for nested AND/OR nodes.
fn unwrap_top_level(rendered: String) -> String {
    if rendered.starts_with('(') && rendered.ends_with(')') && rendered != "()" {
        let inner = &rendered[1..rendered.len() - 1];
        if balanced(inner) {
            return inner.to_string();
        }
    }
    rendered
}

fn balanced(s: &str) -> bool {
    let mut depth = 0i32;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SortDirection;
    use crate::dialect::{MySqlDialect, PostgresDialect, SqliteDialect};

    fn build_s1(dialect: Box<dyn Dialect>) -> String {
        let mut builder = RelationalQueryBuilder::new(dialect);
        builder
            .select(["id", "name"])
            .from("users")
            .where_(Condition::eq("active", true))
            .order_by(OrderBy {
                column: "name".to_string(),
                direction: SortDirection::Asc,
            })
            .limit(10);
        builder.build()
    }

    #[test]
    fn s1_postgres() {
        assert_eq!(
            build_s1(Box::new(PostgresDialect)),
            r#"SELECT "id", "name" FROM "users" WHERE active = TRUE ORDER BY name ASC LIMIT 10"#
        );
    }

    #[test]
    fn s1_mysql() {
        assert_eq!(
            build_s1(Box::new(MySqlDialect)),
            "SELECT `id`, `name` FROM `users` WHERE active = TRUE ORDER BY name ASC LIMIT 10"
        );
    }

    #[test]
    fn s1_sqlite() {
        assert_eq!(
            build_s1(Box::new(SqliteDialect)),
            "SELECT [id], [name] FROM [users] WHERE active = TRUE ORDER BY name ASC LIMIT 10"
        );
    }

    #[test]
    fn build_is_deterministic() {
        let mut builder = RelationalQueryBuilder::new(Box::new(PostgresDialect));
        builder.select(["id"]).from("t").where_(Condition::eq("a", 1_i64));
        assert_eq!(builder.build(), builder.build());
    }

    #[test]
    fn reset_allows_reuse() {
        let mut builder = RelationalQueryBuilder::new(Box::new(PostgresDialect));
        builder.select(["id"]).from("t");
        builder.reset();
        builder.delete_from("t").where_(Condition::eq("id", 1_i64));
        assert_eq!(builder.build(), r#"DELETE FROM "t" WHERE id = 1"#);
    }

    #[test]
    fn insert_renders_columns_and_values() {
        let mut builder = RelationalQueryBuilder::new(Box::new(PostgresDialect));
        builder.insert_into(
            "users",
            vec!["name".to_string(), "age".to_string()],
            vec![Value::from("Alice"), Value::Int64(30)],
        );
        assert_eq!(
            builder.build(),
            r#"INSERT INTO "users" ("name", "age") VALUES ('Alice', 30)"#
        );
    }

    #[test]
    fn update_renders_set_and_where() {
        let mut builder = RelationalQueryBuilder::new(Box::new(PostgresDialect));
        builder
            .update("users", vec![("name".to_string(), Value::from("Bob"))])
            .where_(Condition::eq("id", 1_i64));
        assert_eq!(
            builder.build(),
            r#"UPDATE "users" SET "name" = 'Bob' WHERE id = 1"#
        );
    }

    #[test]
    fn or_where_replaces_rightmost_node() {
        let mut builder = RelationalQueryBuilder::new(Box::new(PostgresDialect));
        builder
            .select(["id"])
            .from("t")
            .where_(Condition::eq("a", 1_i64))
            .where_(Condition::eq("b", 2_i64))
            .or_where(Condition::eq("c", 3_i64));
        assert_eq!(
            builder.build(),
            r#"SELECT "id" FROM "t" WHERE a = 1 AND (b = 2 OR c = 3)"#
        );
    }
}
