//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and defined entirely by their attribute
/// values: two `Price`s of the same amount are the same price. To "modify"
/// one, construct a new value (re-running its validation).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
