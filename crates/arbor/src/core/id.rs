use std::marker::PhantomData;

use slotmap::new_key_type;

new_key_type! {
    /// Opaque identifier for a view stored in the Core arena.
    pub struct NodeId;
}

/// A node identifier that remembers the widget type it was created with.
///
/// Typed ids make `Core::with_widget` calls read naturally at the call site while remaining
/// freely convertible back into a plain [`NodeId`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct TypedId<T> {
    /// Untyped node identifier.
    id: NodeId,
    /// Marker for the widget type.
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedId<T> {
    /// Wrap an untyped node identifier.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// The untyped identifier.
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl<T> Clone for TypedId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedId<T> {}

impl<T> From<TypedId<T>> for NodeId {
    fn from(value: TypedId<T>) -> Self {
        value.id
    }
}
