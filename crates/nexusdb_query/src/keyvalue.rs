/// Accumulates a Redis command name and positional arguments (spec §4.3).
/// Binary/whitespace-containing values are the caller's responsibility.
#[derive(Debug, Clone, Default)]
pub struct KeyValueQueryBuilder {
    command: String,
    args: Vec<String>,
}

impl KeyValueQueryBuilder {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(&mut self, value: impl Into<String>) -> &mut Self {
        self.args.push(value.into());
        self
    }

    pub fn args(&mut self, values: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    /// Concatenates the command and arguments with single-space delimiters.
    pub fn build(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_renders_command_and_args() {
        let mut builder = KeyValueQueryBuilder::new("SET");
        builder.arg("session:42").arg("active");
        assert_eq!(builder.build(), "SET session:42 active");
    }

    #[test]
    fn bare_command_has_no_trailing_space() {
        let builder = KeyValueQueryBuilder::new("PING");
        assert_eq!(builder.build(), "PING");
    }
}
