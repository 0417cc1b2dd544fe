//! Linear record search.
//!
//! The pattern is compiled once as a regular expression; when it is not a
//! valid expression it is matched literally instead.  A record matches when
//! the expression matches any of its keys or any of its values, and each
//! record is returned at most once, in vault order.

use regex::Regex;

use super::record::Record;

/// A compiled search pattern.
#[derive(Debug, Clone)]
pub enum Matcher {
    Regex(Regex),
    /// Used when the pattern does not compile as an expression.
    Literal(String),
}

impl Matcher {
    pub fn new(pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(regex) => Matcher::Regex(regex),
            Err(_) => Matcher::Literal(pattern.to_string()),
        }
    }

    fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Regex(regex) => regex.is_match(text),
            Matcher::Literal(needle) => text.contains(needle.as_str()),
        }
    }

    /// `true` when any key or value of `record` matches.
    pub fn matches(&self, record: &Record) -> bool {
        record
            .fields()
            .iter()
            .any(|(key, value)| self.is_match(key) || self.is_match(value))
    }
}

/// Every record matching `pattern`, without duplicates.
pub fn find<'a>(records: &'a [Record], pattern: &str) -> Vec<&'a Record> {
    let matcher = Matcher::new(pattern);
    records.iter().filter(|r| matcher.matches(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, fields: &[(&str, &str)]) -> Record {
        let mut r = Record::with_id(id);
        for (k, v) in fields {
            r.set(*k, *v);
        }
        r
    }

    #[test]
    fn matches_values_as_regex() {
        let records = vec![
            rec("a", &[("Login", "bob")]),
            rec("b", &[("Login", "alice"), ("Notes", "bobcat")]),
            rec("c", &[("Login", "carol")]),
        ];
        let ids: Vec<&str> = find(&records, "bob").iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let ids: Vec<&str> = find(&records, "^ca").iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn matches_keys() {
        let records = vec![rec("a", &[("Recovery codes", "")]), rec("b", &[("Login", "x")])];
        let found = find(&records, "Recovery");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), "a");
    }

    #[test]
    fn record_is_returned_once_even_when_many_fields_match() {
        let records = vec![rec("a", &[("Login", "bob"), ("Notes", "bob again"), ("bob", "")])];
        assert_eq!(find(&records, "bob").len(), 1);
    }

    #[test]
    fn invalid_regex_falls_back_to_literal() {
        let records = vec![rec("a", &[("Notes", "costs (estimate")]), rec("b", &[("Notes", "x")])];
        let found = find(&records, "(estimate");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), "a");
    }

    #[test]
    fn search_is_case_sensitive() {
        let records = vec![rec("a", &[("Login", "Bob")])];
        assert!(find(&records, "bob").is_empty());
        assert_eq!(find(&records, "(?i)bob").len(), 1);
    }

    #[test]
    fn no_records_no_matches() {
        assert!(find(&[], "anything").is_empty());
    }
}
