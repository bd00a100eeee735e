//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Entities are identified by a business key rather than by their attribute
/// values: two records with the same key are the same entity, whatever else
/// differs between them.
pub trait Entity {
    /// Business key type (borrowed form, e.g. `str`).
    type Key: ?Sized + Eq + core::fmt::Debug;

    /// Returns the entity key.
    fn key(&self) -> &Self::Key;

    /// Whether this entity is identified by `key`.
    fn has_key(&self, key: &Self::Key) -> bool {
        self.key() == key
    }
}
