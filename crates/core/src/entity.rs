//! Entity traits implemented by every stored model.

use crate::types::{DocId, Pk};
use crate::value::FieldValue;

/// A persisted record that the generic queryset and store layers can work
/// with: it knows its collection, its identifiers, and can surface any of
/// its fields by name.
pub trait Entity {
    /// Name of the collection the entity is stored in.
    const COLLECTION: &'static str;

    /// Internal store identifier, absent until the record is persisted.
    fn id(&self) -> Option<DocId>;

    /// Application-visible sequence number, assigned exactly once at create.
    fn pk(&self) -> Option<Pk>;

    /// Look up a field by name. Unknown names return `None`, which the
    /// queryset treats as "no match" rather than an error.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// Marker for entities scoped to an owning user.
///
/// List, detail, and delete operations on an `Owned` entity are restricted
/// to records whose owner matches the authenticated user. This replaces
/// any runtime "does it have a user field" probing with a compile-time
/// capability.
pub trait Owned: Entity {
    /// Internal id of the owning user.
    fn owner_id(&self) -> Option<DocId>;
}
