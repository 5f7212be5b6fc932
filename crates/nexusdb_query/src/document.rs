use serde_json::{Value as Json, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Find,
    Insert,
    Update,
    Delete,
    Aggregate,
}

impl Operation {
    fn as_method(&self) -> &'static str {
        match self {
            Operation::Find => "find",
            Operation::Insert => "insertMany",
            Operation::Update => "updateMany",
            Operation::Delete => "deleteMany",
            Operation::Aggregate => "aggregate",
        }
    }
}

/// Accumulates a MongoDB-shaped AST (spec §4.3 document builder).
#[derive(Default)]
pub struct DocumentQueryBuilder {
    collection: String,
    operation: Option<Operation>,
    filter: Json,
    projection: Option<Json>,
    sort: Option<Json>,
    skip: Option<u64>,
    limit: Option<u64>,
    insert_documents: Vec<Json>,
    update_spec: Json,
    pipeline: Vec<Json>,
}

impl DocumentQueryBuilder {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filter: json!({}),
            update_spec: json!({}),
            ..Self::default()
        }
    }

    pub fn find(&mut self, filter: Json) -> &mut Self {
        self.operation = Some(Operation::Find);
        self.filter = filter;
        self
    }

    pub fn insert(&mut self, documents: Vec<Json>) -> &mut Self {
        self.operation = Some(Operation::Insert);
        self.insert_documents = documents;
        self
    }

    pub fn update(&mut self, filter: Json, update: Json) -> &mut Self {
        self.operation = Some(Operation::Update);
        self.filter = filter;
        self.update_spec = update;
        self
    }

    pub fn delete(&mut self, filter: Json) -> &mut Self {
        self.operation = Some(Operation::Delete);
        self.filter = filter;
        self
    }

    pub fn aggregate(&mut self, pipeline: Vec<Json>) -> &mut Self {
        self.operation = Some(Operation::Aggregate);
        self.pipeline = pipeline;
        self
    }

    pub fn projection(&mut self, projection: Json) -> &mut Self {
        self.projection = Some(projection);
        self
    }

    pub fn sort(&mut self, sort: Json) -> &mut Self {
        self.sort = Some(sort);
        self
    }

    pub fn skip(&mut self, skip: u64) -> &mut Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    fn arguments(&self) -> Vec<Json> {
        match self.operation {
            Some(Operation::Find) => {
                let mut args = vec![self.filter.clone()];
                if let Some(projection) = &self.projection {
                    args.push(projection.clone());
                }
                args
            }
            Some(Operation::Insert) => vec![Json::Array(self.insert_documents.clone())],
            Some(Operation::Update) => vec![self.filter.clone(), self.update_spec.clone()],
            Some(Operation::Delete) => vec![self.filter.clone()],
            Some(Operation::Aggregate) => vec![Json::Array(self.pipeline.clone())],
            None => vec![],
        }
    }

    /// Renders `db.<coll>.<op>(<json>, ...)`. `sort`/`skip`/`limit` are
    /// appended as chained cursor calls, mirroring the mongo shell.
    pub fn build(&self) -> String {
        format!("db.{}.{}", self.collection, self.build_json())
    }

    /// As [`Self::build`] but omits the `db.<coll>.` shell prefix.
    pub fn build_json(&self) -> String {
        let method = self
            .operation
            .map(Operation::as_method)
            .unwrap_or("find");
        let args = self
            .arguments()
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let mut call = format!("{method}({args})");

        if matches!(self.operation, Some(Operation::Find) | None) {
            if let Some(sort) = &self.sort {
                call.push_str(&format!(".sort({sort})"));
            }
            if let Some(skip) = self.skip {
                call.push_str(&format!(".skip({skip})"));
            }
            if let Some(limit) = self.limit {
                call.push_str(&format!(".limit({limit})"));
            }
        }

        call
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_renders_shell_call() {
        let mut builder = DocumentQueryBuilder::new("users");
        builder.find(json!({"active": true})).limit(10);
        assert_eq!(builder.build(), r#"db.users.find({"active":true}).limit(10)"#);
    }

    #[test]
    fn build_json_omits_shell_prefix() {
        let mut builder = DocumentQueryBuilder::new("users");
        builder.find(json!({}));
        assert_eq!(builder.build_json(), "find({})");
    }

    #[test]
    fn insert_wraps_documents_in_array() {
        let mut builder = DocumentQueryBuilder::new("users");
        builder.insert(vec![json!({"name": "Alice"})]);
        assert_eq!(
            builder.build(),
            r#"db.users.insertMany([{"name":"Alice"}])"#
        );
    }
}
