//! Parsing of the `--columns` query string
//!
//! Columns are given as `header=selector` pairs joined by `&`, for example
//! `name=.name&address=.addr`. Values are percent-decoded, so selectors that
//! contain `&`, `=` or `#` can be written as `%26`, `%3D` and `%23`.

use crate::config::types::ColumnSpec;
use crate::ConfigError;

/// Parses a query string of `header=selector` pairs, preserving their order
///
/// The result is not checked for duplicates or empty selectors here; that is
/// left to [`validate`](crate::config::validate) so file-based and
/// flag-based columns share the same rules.
pub fn parse_columns(query: &str) -> Result<Vec<ColumnSpec>, ConfigError> {
    let query = query.trim().trim_start_matches('?');
    if query.is_empty() {
        return Err(ConfigError::InvalidColumns(
            "columns is a mandatory parameter".to_string(),
        ));
    }

    let mut columns = Vec::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        if !pair.contains('=') {
            return Err(ConfigError::InvalidColumns(format!(
                "expected header=selector, got '{}'",
                pair
            )));
        }

        for (header, selector) in url::form_urlencoded::parse(pair.as_bytes()) {
            columns.push(ColumnSpec::new(header.trim(), selector.trim()));
        }
    }

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order() {
        let columns = parse_columns("name=.name&address=.addr&phone=.tel").unwrap();
        let headers: Vec<_> = columns.iter().map(|c| c.header.as_str()).collect();
        assert_eq!(headers, vec!["name", "address", "phone"]);
        assert_eq!(columns[1].selector, ".addr");
    }

    #[test]
    fn test_parse_percent_decodes_selectors() {
        let columns = parse_columns("title=div%20%3E%20h1&link=a%5Bhref%5D").unwrap();
        assert_eq!(columns[0], ColumnSpec::new("title", "div > h1"));
        assert_eq!(columns[1], ColumnSpec::new("link", "a[href]"));
    }

    #[test]
    fn test_parse_plus_is_space() {
        let columns = parse_columns("title=div+h1").unwrap();
        assert_eq!(columns[0].selector, "div h1");
    }

    #[test]
    fn test_parse_leading_question_mark() {
        let columns = parse_columns("?name=.n").unwrap();
        assert_eq!(columns, vec![ColumnSpec::new("name", ".n")]);
    }

    #[test]
    fn test_empty_query_is_error() {
        assert!(matches!(
            parse_columns(""),
            Err(ConfigError::InvalidColumns(_))
        ));
        assert!(matches!(
            parse_columns("   "),
            Err(ConfigError::InvalidColumns(_))
        ));
    }

    #[test]
    fn test_pair_without_equals_is_error() {
        assert!(matches!(
            parse_columns("name=.n&broken"),
            Err(ConfigError::InvalidColumns(_))
        ));
    }

    #[test]
    fn test_duplicates_are_kept_for_validation() {
        let columns = parse_columns("name=.a&name=.b").unwrap();
        assert_eq!(columns.len(), 2);
    }
}
