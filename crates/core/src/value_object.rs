//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two instances with
/// the same attributes are interchangeable. Task request types and transaction
/// ids are value objects; resources (which carry a repo id) are not.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
