//! Typed filters and the generic query interface.
//!
//! Filters translate into JSONB queries: scalar values become containment
//! checks (`doc @> {...}`), list values become set-membership conditions.
//! A filter key of `id` refers to the application-visible sequence number
//! and is rewritten to the stored `pk` field before querying.

use std::marker::PhantomData;

use serde_json::{Map, Value};
use stockroom_core::queryset::QuerySet;
use stockroom_core::value::FieldValue;

use crate::model::{delete, from_document, Document};
use crate::store::{DocumentStore, StoreError};

/// A single filter condition.
#[derive(Debug, Clone)]
pub enum FilterValue {
    /// Exact equality on a field.
    Eq(FieldValue),
    /// Set membership: the field equals any of the listed values.
    In(Vec<FieldValue>),
}

/// An ordered set of filter conditions, ANDed together.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    clauses: Vec<(String, FilterValue)>,
}

impl Filters {
    pub fn new() -> Self {
        Filters::default()
    }

    /// Add an equality condition. The `id` key is rewritten to `pk`.
    pub fn eq(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.clauses
            .push((rewrite_field(field), FilterValue::Eq(value.into())));
        self
    }

    /// Add a set-membership condition. The `id` key is rewritten to `pk`.
    pub fn is_in(mut self, field: &str, values: Vec<FieldValue>) -> Self {
        self.clauses
            .push((rewrite_field(field), FilterValue::In(values)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub(crate) fn clauses(&self) -> &[(String, FilterValue)] {
        &self.clauses
    }
}

/// The store identifies records by `pk`; callers say `id`.
fn rewrite_field(field: &str) -> String {
    if field == "id" {
        "pk".to_string()
    } else {
        field.to_string()
    }
}

/// Rendered WHERE fragment plus its bind values.
#[derive(Debug, PartialEq)]
pub(crate) struct WhereClause {
    /// SQL starting with ` AND ...` (empty when there are no filters).
    pub sql: String,
    pub binds: Vec<Value>,
}

/// Render filters into SQL, numbering bind parameters from `start_index`.
///
/// All equality conditions collapse into a single JSONB containment bind;
/// each membership condition binds one JSON array.
pub(crate) fn build_where(filters: &Filters, start_index: usize) -> WhereClause {
    let mut sql = String::new();
    let mut binds = Vec::new();
    let mut next_index = start_index;

    let mut containment = Map::new();
    for (field, condition) in filters.clauses() {
        if let FilterValue::Eq(value) = condition {
            containment.insert(field.clone(), value.to_json());
        }
    }
    if !containment.is_empty() {
        sql.push_str(&format!(" AND doc @> ${next_index}"));
        binds.push(Value::Object(containment));
        next_index += 1;
    }

    for (field, condition) in filters.clauses() {
        if let FilterValue::In(values) = condition {
            debug_assert!(
                field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
                "filter fields are static identifiers"
            );
            sql.push_str(&format!(
                " AND doc -> '{field}' IN (SELECT value FROM jsonb_array_elements(${next_index}))"
            ));
            binds.push(Value::Array(values.iter().map(FieldValue::to_json).collect()));
            next_index += 1;
        }
    }

    WhereClause { sql, binds }
}

/// Read-side repository for a document type.
///
/// Purely read-only except for [`QueryInterface::delete_queryset`]; store
/// errors propagate uncaught so the handler boundary can translate them.
pub struct QueryInterface<'a, T: Document> {
    store: &'a DocumentStore,
    _marker: PhantomData<T>,
}

impl<'a, T: Document> QueryInterface<'a, T> {
    pub fn new(store: &'a DocumentStore) -> Self {
        QueryInterface {
            store,
            _marker: PhantomData,
        }
    }

    /// First record matching the filters, if any.
    pub async fn get(&self, filters: Filters) -> Result<Option<T>, StoreError> {
        match self.store.fetch_one(T::COLLECTION, &filters).await? {
            Some((id, doc)) => Ok(Some(from_document(id, doc)?)),
            None => Ok(None),
        }
    }

    /// Direct lookup by internal store identifier.
    pub async fn find_by_id(&self, id: stockroom_core::types::DocId) -> Result<Option<T>, StoreError> {
        match self.store.fetch_by_id(T::COLLECTION, id).await? {
            Some((id, doc)) => Ok(Some(from_document(id, doc)?)),
            None => Ok(None),
        }
    }

    /// All records matching the filters, as a queryset in fetch order.
    pub async fn filter(&self, filters: Filters) -> Result<QuerySet<T>, StoreError> {
        let rows = self.store.fetch_many(T::COLLECTION, &filters).await?;
        let items = rows
            .into_iter()
            .map(|(id, doc)| from_document(id, doc))
            .collect::<Result<Vec<T>, _>>()?;
        Ok(QuerySet::new(items))
    }

    /// Every record in the collection.
    pub async fn all(&self) -> Result<QuerySet<T>, StoreError> {
        self.filter(Filters::new()).await
    }

    /// Delete every record in the queryset, one at a time in order.
    ///
    /// The first failure aborts the loop; records deleted before the
    /// failure stay deleted. Returns the number of records removed.
    pub async fn delete_queryset(&self, queryset: QuerySet<T>) -> Result<u64, StoreError> {
        let mut removed = 0u64;
        for item in queryset {
            delete(self.store, &item).await?;
            removed += 1;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_filters_render_no_sql() {
        let clause = build_where(&Filters::new(), 2);
        assert_eq!(clause.sql, "");
        assert!(clause.binds.is_empty());
    }

    #[test]
    fn equality_filters_collapse_into_one_containment_bind() {
        let filters = Filters::new()
            .eq("name", "Widget")
            .eq("category", "Tools");
        let clause = build_where(&filters, 2);

        assert_eq!(clause.sql, " AND doc @> $2");
        assert_eq!(
            clause.binds,
            vec![json!({"name": "Widget", "category": "Tools"})]
        );
    }

    #[test]
    fn id_filter_key_is_rewritten_to_pk() {
        let filters = Filters::new().eq("id", 7i64);
        let clause = build_where(&filters, 2);

        assert_eq!(clause.binds, vec![json!({"pk": 7})]);
    }

    #[test]
    fn list_filter_renders_membership_condition() {
        let filters = Filters::new().is_in(
            "id",
            vec![FieldValue::Int(1), FieldValue::Int(2), FieldValue::Int(3)],
        );
        let clause = build_where(&filters, 2);

        assert_eq!(
            clause.sql,
            " AND doc -> 'pk' IN (SELECT value FROM jsonb_array_elements($2))"
        );
        assert_eq!(clause.binds, vec![json!([1, 2, 3])]);
    }

    #[test]
    fn mixed_filters_number_binds_sequentially() {
        let filters = Filters::new()
            .eq("user_id", "2c18f351-9c5f-4f3a-9f3e-0d9c2f0a0001")
            .is_in("id", vec![FieldValue::Int(4), FieldValue::Int(5)]);
        let clause = build_where(&filters, 2);

        assert_eq!(
            clause.sql,
            " AND doc @> $2 AND doc -> 'pk' IN (SELECT value FROM jsonb_array_elements($3))"
        );
        assert_eq!(clause.binds.len(), 2);
    }
}
