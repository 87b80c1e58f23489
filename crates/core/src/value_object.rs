//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity and are compared by their attribute values
/// (a `Location` or `Coordinates` pair, as opposed to an `Installation`). They are
/// replaced rather than mutated in place.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
