//! In-memory queryset over already-fetched records.
//!
//! A [`QuerySet`] wraps the result of a repository query in fetch order and
//! supports exact-match filtering, single-key ordering, and slicing into a
//! [`Paginated`] page. It never goes back to the store; deletion of a
//! queryset lives in the store layer where the connection is available.

use std::cmp::Ordering;

use crate::entity::{Entity, Owned};
use crate::types::DocId;
use crate::value::FieldValue;

/// Default page size for list endpoints.
pub const DEFAULT_PER_PAGE: usize = 25;

/// Maximum page size for list endpoints.
pub const MAX_PER_PAGE: usize = 100;

/// Clamp a user-provided page number to 1-indexed bounds.
pub fn clamp_page(page: Option<i64>) -> usize {
    page.unwrap_or(1).max(1) as usize
}

/// Clamp a user-provided page size to `[1, MAX_PER_PAGE]`.
pub fn clamp_per_page(per_page: Option<i64>) -> usize {
    per_page
        .unwrap_or(DEFAULT_PER_PAGE as i64)
        .max(1)
        .min(MAX_PER_PAGE as i64) as usize
}

/// Sort direction for [`QuerySet::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive parse. Anything other than `"desc"` is ascending.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

/// Page metadata shared by the document and search-hit queryset flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub start: usize,
    pub end: usize,
    pub pages: usize,
    pub next_page: Option<usize>,
    pub prev_page: Option<usize>,
}

/// Compute slice bounds and page numbers for a 1-indexed page.
///
/// `pages` is `max(total / per_page, 1)` -- floor division, so a collection
/// of 101 items at 100 per page reports a single page. This reproduces the
/// documented contract; it is not ceiling pagination.
pub fn page_bounds(total: usize, page: usize, per_page: usize) -> PageBounds {
    let page = page.max(1);
    let per_page = per_page.max(1);

    let start = (page - 1) * per_page;
    let end = start + per_page;

    PageBounds {
        start,
        end,
        pages: (total / per_page).max(1),
        next_page: (end < total).then(|| page + 1),
        prev_page: (start > 0).then(|| page - 1),
    }
}

/// An ordered, in-memory sequence of records.
#[derive(Debug, Clone)]
pub struct QuerySet<T> {
    items: Vec<T>,
}

impl<T> From<Vec<T>> for QuerySet<T> {
    fn from(items: Vec<T>) -> Self {
        QuerySet { items }
    }
}

impl<T> QuerySet<T> {
    pub fn new(items: Vec<T>) -> Self {
        QuerySet { items }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for QuerySet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T: Entity> QuerySet<T> {
    /// Keep only items where every named field equals the given value.
    ///
    /// Matching is exact equality; a field name the entity does not expose
    /// matches nothing (silently -- no error).
    pub fn filter(&self, predicate: &[(&str, FieldValue)]) -> QuerySet<T>
    where
        T: Clone,
    {
        let items = self
            .items
            .iter()
            .filter(|item| {
                predicate
                    .iter()
                    .all(|(field, value)| item.field(field).as_ref() == Some(value))
            })
            .cloned()
            .collect();

        QuerySet { items }
    }

    /// Stable in-place sort by a single field. Returns the same queryset so
    /// calls can be chained; this mutates, it is not a functional update.
    pub fn order_by(&mut self, field: &str, direction: SortDirection) -> &mut Self {
        self.items.sort_by(|a, b| {
            let ord = match (a.field(field), b.field(field)) {
                (Some(va), Some(vb)) => va.compare(&vb),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        self
    }

    /// Slice out a 1-indexed page, recording the pre-slice total.
    pub fn paginate(self, page: usize, per_page: usize) -> Paginated<T> {
        let total = self.items.len();
        let bounds = page_bounds(total, page, per_page);

        let items = self
            .items
            .into_iter()
            .skip(bounds.start)
            .take(per_page.max(1))
            .collect();

        Paginated {
            items,
            total,
            pages: bounds.pages,
            next_page: bounds.next_page,
            prev_page: bounds.prev_page,
        }
    }
}

impl<T: Owned + Clone> QuerySet<T> {
    /// Keep only items owned by the given user.
    pub fn owned_by(&self, owner: DocId) -> QuerySet<T> {
        let items = self
            .items
            .iter()
            .filter(|item| item.owner_id() == Some(owner))
            .cloned()
            .collect();
        QuerySet { items }
    }
}

/// A queryset slice plus pagination metadata.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// Count before pagination was applied.
    pub total: usize,
    pub pages: usize,
    pub next_page: Option<usize>,
    pub prev_page: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::types::{DocId, Pk};

    #[derive(Debug, Clone)]
    struct Part {
        pk: Pk,
        name: &'static str,
        price: f64,
    }

    impl Entity for Part {
        const COLLECTION: &'static str = "parts";

        fn id(&self) -> Option<DocId> {
            None
        }

        fn pk(&self) -> Option<Pk> {
            Some(self.pk)
        }

        fn field(&self, name: &str) -> Option<FieldValue> {
            match name {
                "pk" => Some(FieldValue::Int(self.pk)),
                "name" => Some(FieldValue::Str(self.name.to_string())),
                "price" => Some(FieldValue::Float(self.price)),
                _ => None,
            }
        }
    }

    fn parts(n: usize) -> QuerySet<Part> {
        let items = (1..=n as i64)
            .map(|pk| Part {
                pk,
                name: "Widget",
                price: pk as f64,
            })
            .collect();
        QuerySet::new(items)
    }

    // -- filter --------------------------------------------------------------

    #[test]
    fn filter_matching_one_record_returns_singleton() {
        let qs = parts(10);
        let hit = qs.filter(&[("pk", FieldValue::Int(7))]);
        assert_eq!(hit.count(), 1);
        assert_eq!(hit.first().unwrap().pk, 7);
    }

    #[test]
    fn filter_matching_none_returns_empty_not_error() {
        let qs = parts(10);
        let miss = qs.filter(&[("pk", FieldValue::Int(99))]);
        assert!(miss.is_empty());
        assert!(miss.first().is_none());
        assert!(miss.last().is_none());
    }

    #[test]
    fn filter_unknown_field_matches_nothing() {
        let qs = parts(3);
        let miss = qs.filter(&[("nonexistent", FieldValue::Int(1))]);
        assert!(miss.is_empty());
    }

    #[test]
    fn filter_requires_every_predicate_to_match() {
        let qs = parts(5);
        let hit = qs.filter(&[
            ("pk", FieldValue::Int(2)),
            ("name", FieldValue::Str("Widget".into())),
        ]);
        assert_eq!(hit.count(), 1);

        let miss = qs.filter(&[
            ("pk", FieldValue::Int(2)),
            ("name", FieldValue::Str("Gadget".into())),
        ]);
        assert!(miss.is_empty());
    }

    // -- order_by ------------------------------------------------------------

    #[test]
    fn order_by_desc_then_asc_reverses_distinct_values() {
        let mut qs = parts(5);
        qs.order_by("pk", SortDirection::Desc);
        let desc: Vec<Pk> = qs.iter().map(|p| p.pk).collect();

        qs.order_by("pk", SortDirection::Asc);
        let asc: Vec<Pk> = qs.iter().map(|p| p.pk).collect();

        let mut reversed = desc.clone();
        reversed.reverse();
        assert_eq!(asc, reversed);
        assert_eq!(asc, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn order_by_is_stable_for_equal_keys() {
        let mut qs = QuerySet::new(vec![
            Part { pk: 1, name: "Widget", price: 5.0 },
            Part { pk: 2, name: "Widget", price: 5.0 },
            Part { pk: 3, name: "Widget", price: 5.0 },
        ]);
        qs.order_by("price", SortDirection::Asc);
        let pks: Vec<Pk> = qs.iter().map(|p| p.pk).collect();
        assert_eq!(pks, vec![1, 2, 3]);
    }

    #[test]
    fn sort_direction_parse_is_case_insensitive_and_lenient() {
        assert_eq!(SortDirection::parse("desc"), SortDirection::Desc);
        assert_eq!(SortDirection::parse("DESC"), SortDirection::Desc);
        assert_eq!(SortDirection::parse("Desc"), SortDirection::Desc);
        assert_eq!(SortDirection::parse("asc"), SortDirection::Asc);
        assert_eq!(SortDirection::parse("sideways"), SortDirection::Asc);
        assert_eq!(SortDirection::parse(""), SortDirection::Asc);
    }

    // -- paginate ------------------------------------------------------------

    #[test]
    fn first_page_total_equals_unpaginated_count() {
        let qs = parts(42);
        let page = qs.paginate(1, 10);
        assert_eq!(page.total, 42);
        assert_eq!(page.items.len(), 10);
    }

    #[test]
    fn pages_is_floor_division_with_minimum_one() {
        assert_eq!(parts(101).paginate(1, 100).pages, 1);
        assert_eq!(parts(0).paginate(1, 100).pages, 1);
        assert_eq!(parts(200).paginate(1, 100).pages, 2);
        assert_eq!(parts(25).paginate(1, 25).pages, 1);
    }

    #[test]
    fn page_past_the_end_is_empty_with_no_next() {
        // 50 records, per_page=25, page=3: start index 50 == total.
        let page = parts(50).paginate(3, 25);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 50);
        assert_eq!(page.next_page, None);
        assert_eq!(page.prev_page, Some(2));
    }

    #[test]
    fn next_and_prev_page_track_slice_bounds() {
        let page = parts(50).paginate(1, 25);
        assert_eq!(page.next_page, Some(2));
        assert_eq!(page.prev_page, None);

        let page = parts(50).paginate(2, 25);
        // end == total, so there is no next page.
        assert_eq!(page.next_page, None);
        assert_eq!(page.prev_page, Some(1));
    }

    #[test]
    fn last_partial_page_contains_the_remainder() {
        let page = parts(23).paginate(3, 10);
        assert_eq!(page.items.len(), 3);
        let pks: Vec<Pk> = page.items.iter().map(|p| p.pk).collect();
        assert_eq!(pks, vec![21, 22, 23]);
    }

    // -- owner scoping -------------------------------------------------------

    #[derive(Debug, Clone)]
    struct Shipment {
        pk: Pk,
        owner: Option<DocId>,
    }

    impl Entity for Shipment {
        const COLLECTION: &'static str = "crates";

        fn id(&self) -> Option<DocId> {
            None
        }

        fn pk(&self) -> Option<Pk> {
            Some(self.pk)
        }

        fn field(&self, name: &str) -> Option<FieldValue> {
            match name {
                "pk" => Some(FieldValue::Int(self.pk)),
                _ => None,
            }
        }
    }

    impl Owned for Shipment {
        fn owner_id(&self) -> Option<DocId> {
            self.owner
        }
    }

    #[test]
    fn owned_by_keeps_only_the_owners_records() {
        let alice = DocId::from_u128(1);
        let bob = DocId::from_u128(2);

        let qs = QuerySet::new(vec![
            Shipment { pk: 1, owner: Some(alice) },
            Shipment { pk: 2, owner: Some(bob) },
            Shipment { pk: 3, owner: Some(alice) },
            Shipment { pk: 4, owner: None },
        ]);

        let mine = qs.owned_by(alice);
        let pks: Vec<Pk> = mine.iter().map(|c| c.pk).collect();
        assert_eq!(pks, vec![1, 3]);

        assert!(qs.owned_by(DocId::from_u128(9)).is_empty());
    }

    // -- clamps --------------------------------------------------------------

    #[test]
    fn clamp_page_floors_at_one() {
        assert_eq!(clamp_page(None), 1);
        assert_eq!(clamp_page(Some(0)), 1);
        assert_eq!(clamp_page(Some(-3)), 1);
        assert_eq!(clamp_page(Some(7)), 7);
    }

    #[test]
    fn clamp_per_page_defaults_and_bounds() {
        assert_eq!(clamp_per_page(None), DEFAULT_PER_PAGE);
        assert_eq!(clamp_per_page(Some(0)), 1);
        assert_eq!(clamp_per_page(Some(1000)), MAX_PER_PAGE);
        assert_eq!(clamp_per_page(Some(50)), 50);
    }
}
