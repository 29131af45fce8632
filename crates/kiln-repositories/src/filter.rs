//! Client-side filtering and ordering for list operations.
//!
//! The store can only scope a list by namespace, so every other predicate is
//! applied here after fetching the whole collection. That is fine at the
//! size of one tenant's objects and is the known scaling limit of the list
//! operations; server-side field selectors would slot in at the store
//! protocol without changing repository signatures.

use std::cmp::Ordering;

use kiln_resources::Object;

use crate::messages::SortOrder;

/// `true` if `allowed` is empty or contains `value`.
pub fn matches_filter<T, U>(allowed: &[T], value: &U) -> bool
where
    T: PartialEq<U>,
    U: ?Sized,
{
    allowed.is_empty() || allowed.iter().any(|a| a == value)
}

fn by_creation<S>(a: &Object<S>, b: &Object<S>) -> Ordering {
    a.meta
        .creation_timestamp
        .cmp(&b.meta.creation_timestamp)
        .then_with(|| a.meta.uid.cmp(&b.meta.uid))
}

/// Order by creation time, breaking ties on the store UID so repeated lists
/// of an unchanged collection iterate identically.
pub fn sort_by_creation<S>(objects: &mut [Object<S>], order: SortOrder) {
    match order {
        SortOrder::Ascending => objects.sort_by(by_creation),
        SortOrder::Descending => objects.sort_by(|a, b| by_creation(b, a)),
    }
}
