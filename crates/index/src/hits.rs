//! Search hits with queryset-shaped pagination.

use serde::Deserialize;
use serde_json::Value;
use stockroom_core::queryset::page_bounds;

/// A single document returned by the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source")]
    pub source: Value,
}

/// An in-memory sequence of search hits, in engine relevance order.
///
/// Mirrors the document queryset's accessors and pagination so handlers
/// can serve either source through the same envelope.
#[derive(Debug, Clone, Default)]
pub struct HitSet {
    hits: Vec<Hit>,
}

impl HitSet {
    pub fn new(hits: Vec<Hit>) -> Self {
        HitSet { hits }
    }

    pub fn count(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn first(&self) -> Option<&Hit> {
        self.hits.first()
    }

    pub fn last(&self) -> Option<&Hit> {
        self.hits.last()
    }

    /// Slice out a 1-indexed page with the same page math as the document
    /// queryset (floor-division `pages`, minimum one).
    pub fn paginate(self, page: usize, per_page: usize) -> PaginatedHits {
        let total = self.hits.len();
        let bounds = page_bounds(total, page, per_page);

        let items = self
            .hits
            .into_iter()
            .skip(bounds.start)
            .take(per_page.max(1))
            .collect();

        PaginatedHits {
            items,
            total,
            pages: bounds.pages,
            next_page: bounds.next_page,
            prev_page: bounds.prev_page,
        }
    }
}

/// A page of search hits plus pagination metadata.
#[derive(Debug, Clone)]
pub struct PaginatedHits {
    pub items: Vec<Hit>,
    pub total: usize,
    pub pages: usize,
    pub next_page: Option<usize>,
    pub prev_page: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hits(n: usize) -> HitSet {
        HitSet::new(
            (1..=n)
                .map(|i| Hit {
                    id: i.to_string(),
                    source: json!({ "id": i }),
                })
                .collect(),
        )
    }

    #[test]
    fn accessors_match_queryset_semantics() {
        let set = hits(3);
        assert_eq!(set.count(), 3);
        assert_eq!(set.first().unwrap().id, "1");
        assert_eq!(set.last().unwrap().id, "3");

        let empty = hits(0);
        assert!(empty.first().is_none());
        assert!(empty.last().is_none());
    }

    #[test]
    fn pagination_shares_the_floor_division_contract() {
        let page = hits(101).paginate(1, 100);
        assert_eq!(page.total, 101);
        assert_eq!(page.pages, 1);
        assert_eq!(page.next_page, Some(2));
        assert_eq!(page.prev_page, None);

        let page = hits(0).paginate(1, 25);
        assert_eq!(page.pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let page = hits(10).paginate(5, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.next_page, None);
        assert_eq!(page.prev_page, Some(4));
    }
}
