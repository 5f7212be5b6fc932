use std::collections::HashMap;

/// Parse a delimiter-separated `key=value` connection string into a map.
///
/// Used by the MySQL driver (semicolon-delimited, spec §6) and available to
/// any other driver that wants the same shape. Whitespace around keys and
/// values is trimmed; malformed segments (no `=`) are skipped.
pub fn parse_kv_pairs(input: &str, delimiter: char) -> HashMap<String, String> {
    input
        .split(delimiter)
        .filter_map(|segment| {
            let segment = segment.trim();
            if segment.is_empty() {
                return None;
            }
            let (key, value) = segment.split_once('=')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_semicolon_delimited_pairs() {
        let parsed = parse_kv_pairs("host=db1;port=3306;database=app", ';');
        assert_eq!(parsed.get("host").map(String::as_str), Some("db1"));
        assert_eq!(parsed.get("port").map(String::as_str), Some("3306"));
        assert_eq!(parsed.get("database").map(String::as_str), Some("app"));
    }

    #[test]
    fn skips_malformed_segments() {
        let parsed = parse_kv_pairs("host=db1;garbage;;port=5432", ';');
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn trims_whitespace() {
        let parsed = parse_kv_pairs(" host = db1 ; user = root ", ';');
        assert_eq!(parsed.get("host").map(String::as_str), Some("db1"));
        assert_eq!(parsed.get("user").map(String::as_str), Some("root"));
    }
}
