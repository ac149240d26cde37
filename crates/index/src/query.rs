//! Search query construction.
//!
//! Two shapes, depending on whether the caller is scoped to an owner:
//!
//! - scoped: a `bool` query whose `must` is an exact `term` match on the
//!   scope field and whose `should` clauses are one `wildcard` (`*value*`)
//!   per remaining field, at least one of which has to hit;
//! - unscoped: one `query_string` clause per field, wildcard-wrapped and
//!   OR'd the same way.
//!
//! A query with no usable terms is a caller error ([`SearchError::EmptyQuery`]),
//! distinct from a query that finds nothing.

use serde_json::{json, Value};

/// Errors from the search adapter.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Query must contain at least one search term")]
    EmptyQuery,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Search engine returned {status}: {body}")]
    Engine { status: u16, body: String },
}

/// Input to [`build_search_query`]: an optional owner scope plus the
/// free-text terms, keyed by the field they should match.
#[derive(Debug, Clone, Default)]
pub struct SearchTerms {
    scope: Option<(String, String)>,
    fields: Vec<(String, String)>,
}

impl SearchTerms {
    pub fn new() -> Self {
        SearchTerms::default()
    }

    /// Require an exact match on `field` (the owner scope).
    pub fn scoped(mut self, field: &str, value: impl Into<String>) -> Self {
        self.scope = Some((field.to_string(), value.into()));
        self
    }

    /// Add a fuzzy term for `field`. Empty values are dropped, so callers
    /// can feed optional query parameters straight through.
    pub fn term(mut self, field: &str, value: &str) -> Self {
        if !value.is_empty() {
            self.fields.push((field.to_string(), value.to_string()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Build the engine query body for the given terms.
pub fn build_search_query(terms: &SearchTerms) -> Result<Value, SearchError> {
    if terms.is_empty() {
        return Err(SearchError::EmptyQuery);
    }

    let query = match &terms.scope {
        Some((scope_field, scope_value)) => {
            let should: Vec<Value> = terms
                .fields
                .iter()
                .map(|(field, value)| {
                    json!({ "wildcard": { field.as_str(): format!("*{value}*") } })
                })
                .collect();

            json!({
                "bool": {
                    "must": [{ "term": { scope_field.as_str(): scope_value } }],
                    "should": should,
                    "minimum_should_match": 1,
                }
            })
        }
        None => {
            let should: Vec<Value> = terms
                .fields
                .iter()
                .map(|(field, value)| {
                    json!({
                        "query_string": {
                            "default_field": field,
                            "query": format!("*{value}*"),
                        }
                    })
                })
                .collect();

            json!({
                "bool": {
                    "should": should,
                    "minimum_should_match": 1,
                }
            })
        }
    };

    Ok(json!({ "query": query }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_terms_are_a_caller_error() {
        let err = build_search_query(&SearchTerms::new()).unwrap_err();
        assert!(matches!(err, SearchError::EmptyQuery));

        // A scope alone does not make a query.
        let scoped_only = SearchTerms::new().scoped("user_id", "abc");
        assert!(matches!(
            build_search_query(&scoped_only).unwrap_err(),
            SearchError::EmptyQuery
        ));
    }

    #[test]
    fn blank_term_values_are_dropped() {
        let terms = SearchTerms::new().term("name", "").term("category", "tools");
        let body = build_search_query(&terms).unwrap();

        let should = body["query"]["bool"]["should"].as_array().unwrap();
        assert_eq!(should.len(), 1);
        assert_eq!(
            should[0]["query_string"]["default_field"],
            "category"
        );
    }

    #[test]
    fn scoped_query_requires_term_and_one_wildcard() {
        let terms = SearchTerms::new()
            .scoped("user_id", "2c18f351")
            .term("name", "widget")
            .term("category", "tools");
        let body = build_search_query(&terms).unwrap();

        let bool_query = &body["query"]["bool"];
        assert_eq!(bool_query["must"][0]["term"]["user_id"], "2c18f351");
        assert_eq!(bool_query["minimum_should_match"], 1);

        let should = bool_query["should"].as_array().unwrap();
        assert_eq!(should.len(), 2);
        assert_eq!(should[0]["wildcard"]["name"], "*widget*");
        assert_eq!(should[1]["wildcard"]["category"], "*tools*");
    }

    #[test]
    fn unscoped_query_uses_query_strings() {
        let terms = SearchTerms::new().term("name", "bolt");
        let body = build_search_query(&terms).unwrap();

        let bool_query = &body["query"]["bool"];
        assert!(bool_query.get("must").is_none());
        let should = bool_query["should"].as_array().unwrap();
        assert_eq!(should[0]["query_string"]["default_field"], "name");
        assert_eq!(should[0]["query_string"]["query"], "*bolt*");
    }
}
