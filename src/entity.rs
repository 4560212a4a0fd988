//! Domain entities.

/// The identifier of a stored entity.
///
/// Identifiers are assigned by the storage backend on creation. `0` means the entity has not been
/// stored yet.
pub type EntityId = i64;

/// A domain object addressed by an [`EntityId`].
pub trait Entity: Clone + Send + Sync + 'static {
    /// Human readable name of the entity family, used in error messages.
    const KIND: &'static str;

    /// The identifier of the entity.
    fn id(&self) -> EntityId;

    /// Return the entity with its identifier replaced.
    #[must_use]
    fn with_id(self, id: EntityId) -> Self;
}

/// A single item with a free-text description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Item {
    /// Server-assigned identifier.
    pub id: EntityId,
    /// Free-text description. This is the only mutable field.
    pub description: String,
}

impl Item {
    /// Create an item that has not been stored yet.
    #[inline]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: 0,
            description: description.into(),
        }
    }
}

impl Entity for Item {
    const KIND: &'static str = "item";

    fn id(&self) -> EntityId {
        self.id
    }

    fn with_id(self, id: EntityId) -> Self {
        Self { id, ..self }
    }
}

/// An order.
///
/// The items of an order are its payload. They are stored and returned as given, in the same
/// sequence, and are not resolved against the item store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Order {
    /// Server-assigned identifier.
    pub id: EntityId,
    /// The items making up the order.
    pub items: Vec<Item>,
}

impl Order {
    /// Create an order that has not been stored yet.
    #[inline]
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            id: 0,
            items: items.into_iter().collect(),
        }
    }
}

impl Entity for Order {
    const KIND: &'static str = "order";

    fn id(&self) -> EntityId {
        self.id
    }

    fn with_id(self, id: EntityId) -> Self {
        Self { id, ..self }
    }
}
