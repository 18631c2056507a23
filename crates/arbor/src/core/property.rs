//! Observable properties.
//!
//! Widgets keep their state in [`Observable`] cells and publish a table of typed
//! [`Property`] descriptors. The core reads, writes and subscribes through descriptors and
//! invalidates according to what each property [`Affects`]. No reflection is involved: a
//! descriptor is a name, an invalidation class and a plain accessor function.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError, TryLockError},
};

use tracing::debug;

/// Identifies a subscription so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// A change callback.
type Subscriber<T> = Box<dyn FnMut(&T) + Send>;

/// A value with change notification.
pub struct Observable<T> {
    /// Current value.
    value: T,
    /// Registered callbacks.
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
    /// Next subscription id.
    next_id: u64,
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Observable<T> {
    /// Wrap an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// The current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Register a change callback.
    pub fn subscribe(&mut self, f: impl FnMut(&T) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(f)));
        id
    }

    /// Remove a change callback. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        before != self.subscribers.len()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Modify the value in place and notify unconditionally.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.notify();
    }

    /// Run every subscriber against the current value.
    fn notify(&mut self) {
        for (_, s) in &mut self.subscribers {
            s(&self.value);
        }
    }
}

impl<T: PartialEq> Observable<T> {
    /// Replace the value. Subscribers run only if it changed; returns whether it did.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.notify();
        true
    }
}

/// What a property change invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affects {
    /// Only appearance changes: redraw.
    Draw,
    /// Size may change: re-measure the node and its ancestors.
    Measure,
}

/// Untyped metadata for a property, as published in a widget's descriptor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    /// Property name.
    pub name: &'static str,
    /// Invalidation class.
    pub affects: Affects,
}

/// A typed property descriptor for widget `W` holding a `T`.
pub struct Property<W, T> {
    /// Name and invalidation class.
    pub info: PropertyInfo,
    /// Accessor for the backing cell.
    access: fn(&mut W) -> &mut Observable<T>,
}

impl<W, T> Clone for Property<W, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W, T> Copy for Property<W, T> {}

impl<W, T> fmt::Debug for Property<W, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&self.info.name).finish()
    }
}

impl<W, T> Property<W, T> {
    /// Declare a property.
    pub const fn new(
        name: &'static str,
        affects: Affects,
        access: fn(&mut W) -> &mut Observable<T>,
    ) -> Self {
        Self {
            info: PropertyInfo { name, affects },
            access,
        }
    }

    /// Property name.
    pub fn name(&self) -> &'static str {
        self.info.name
    }

    /// Borrow the backing cell on a widget.
    pub fn cell<'a>(&self, widget: &'a mut W) -> &'a mut Observable<T> {
        (self.access)(widget)
    }
}

/// A change to an [`ItemSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    /// An item was inserted at an index.
    Inserted(usize),
    /// An item was removed from an index.
    Removed(usize),
    /// An item was replaced at an index.
    Replaced(usize),
    /// The whole list changed.
    Reset,
}

/// A list change callback. Shared so notification can run without holding the list lock.
type ListSubscriber = Arc<Mutex<dyn FnMut(ListChange) + Send>>;

/// Shared state behind an [`ItemSource`].
struct ItemList<T> {
    /// Items in order.
    items: Vec<T>,
    /// Registered callbacks.
    subscribers: Vec<(SubscriptionId, ListSubscriber)>,
    /// Next subscription id.
    next_id: u64,
}

/// A shared, observable list used as the data source of collection views.
///
/// Clones share the same list. Views subscribe when they mount and unsubscribe when they
/// unmount, so a source may outlive any number of views.
///
/// Each mutation checks and changes the list under a single lock. Subscribers run after the
/// lock is released, so they may read or modify the source. A subscriber is not called again
/// while it is still running; such nested notifications are dropped.
pub struct ItemSource<T> {
    /// Shared list.
    inner: Arc<Mutex<ItemList<T>>>,
}

impl<T> Clone for ItemSource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for ItemSource<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> ItemSource<T> {
    /// A source holding initial items.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ItemList {
                items,
                subscribers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Run a closure against the shared list.
    fn with<R>(&self, f: impl FnOnce(&mut ItemList<T>) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Apply a mutation under one lock, then notify a snapshot of the subscribers with the
    /// lock released. `f` reports the change it made, or `None` if it left the list alone.
    fn mutate<R>(&self, f: impl FnOnce(&mut Vec<T>) -> Option<(ListChange, R)>) -> Option<R> {
        let (change, out, subscribers) = self.with(|list| {
            let (change, out) = f(&mut list.items)?;
            let subscribers: Vec<ListSubscriber> =
                list.subscribers.iter().map(|(_, s)| Arc::clone(s)).collect();
            Some((change, out, subscribers))
        })?;
        for subscriber in subscribers {
            match subscriber.try_lock() {
                Ok(mut callback) => (*callback)(change),
                Err(TryLockError::Poisoned(p)) => (*p.into_inner())(change),
                Err(TryLockError::WouldBlock) => {
                    debug!(?change, "subscriber busy, nested notification dropped");
                }
            }
        }
        Some(out)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.with(|l| l.items.len())
    }

    /// Is the list empty?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read an item.
    pub fn get_with<R>(&self, index: usize, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.with(|l| l.items.get(index).map(f))
    }

    /// Map every item, in order.
    pub fn map<R>(&self, f: impl FnMut(&T) -> R) -> Vec<R> {
        self.with(|l| l.items.iter().map(f).collect())
    }

    /// Append an item.
    pub fn push(&self, item: T) {
        self.mutate(|v| {
            v.push(item);
            Some((ListChange::Inserted(v.len() - 1), ()))
        });
    }

    /// Insert an item. Indices past the end append.
    pub fn insert(&self, index: usize, item: T) {
        self.mutate(|v| {
            let index = index.min(v.len());
            v.insert(index, item);
            Some((ListChange::Inserted(index), ()))
        });
    }

    /// Remove an item. Returns `None` for an out-of-range index.
    pub fn remove(&self, index: usize) -> Option<T> {
        self.mutate(|v| (index < v.len()).then(|| (ListChange::Removed(index), v.remove(index))))
    }

    /// Replace an item. Returns false for an out-of-range index.
    pub fn replace(&self, index: usize, item: T) -> bool {
        self.mutate(|v| {
            *v.get_mut(index)? = item;
            Some((ListChange::Replaced(index), ()))
        })
        .is_some()
    }

    /// Replace every item.
    pub fn reset(&self, items: Vec<T>) {
        self.mutate(|v| {
            *v = items;
            Some((ListChange::Reset, ()))
        });
    }

    /// Register a change callback.
    pub fn subscribe(&self, f: impl FnMut(ListChange) + Send + 'static) -> SubscriptionId {
        let subscriber: ListSubscriber = Arc::new(Mutex::new(f));
        self.with(|l| {
            let id = SubscriptionId(l.next_id);
            l.next_id += 1;
            l.subscribers.push((id, subscriber));
            id
        })
    }

    /// Remove a change callback.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.with(|l| {
            let before = l.subscribers.len();
            l.subscribers.retain(|(sid, _)| *sid != id);
            before != l.subscribers.len()
        })
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.with(|l| l.subscribers.len())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            mpsc,
        },
        thread,
        time::Duration,
    };

    use super::*;

    #[test]
    fn observable_notifies_on_change_only() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut o = Observable::new(1);
        let h = Arc::clone(&hits);
        let id = o.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert!(!o.set(1));
        assert!(o.set(2));
        assert_eq!(*o.get(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(o.unsubscribe(id));
        assert!(!o.unsubscribe(id));
        o.set(3);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn item_source_changes() {
        let src = ItemSource::new(vec!["a", "b"]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let id = src.subscribe(move |c| s.lock().unwrap().push(c));
        src.push("c");
        src.insert(0, "z");
        assert_eq!(src.remove(1), Some("a"));
        assert_eq!(src.remove(10), None);
        assert!(src.replace(0, "y"));
        assert_eq!(src.map(|s| s.to_string()), vec!["y", "b", "c"]);
        assert_eq!(*seen.lock().unwrap(), vec![
            ListChange::Inserted(2),
            ListChange::Inserted(0),
            ListChange::Removed(1),
            ListChange::Replaced(0),
        ]);
        let shared = src.clone();
        assert!(shared.unsubscribe(id));
        assert_eq!(src.subscriber_count(), 0);
    }

    #[test]
    fn subscribers_may_read_and_modify_the_source() {
        let (done_tx, done_rx) = mpsc::channel();
        thread::spawn(move || {
            let src = ItemSource::new(Vec::new());
            let reader = src.clone();
            let seen = Arc::new(Mutex::new(Vec::new()));
            let s = Arc::clone(&seen);
            src.subscribe(move |_| {
                if reader.len() == 1 {
                    // Nested: this push does not call us again.
                    reader.push(2);
                }
                s.lock().unwrap().push(reader.map(|v| *v));
            });
            src.push(1);
            let result = (src.map(|v| *v), seen.lock().unwrap().clone());
            done_tx.send(result).unwrap();
        });
        let (items, seen) = done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("notification deadlocked");
        assert_eq!(items, vec![1, 2]);
        assert_eq!(seen, vec![vec![1, 2]]);
    }

    #[test]
    fn concurrent_removals_never_overrun() {
        let src = ItemSource::new((0..200).collect::<Vec<u32>>());
        let removed = Arc::new(AtomicUsize::new(0));
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let src = src.clone();
                let removed = Arc::clone(&removed);
                thread::spawn(move || {
                    for _ in 0..100 {
                        if src.remove(0).is_some() {
                            removed.fetch_add(1, Ordering::SeqCst);
                        }
                        src.replace(0, 7);
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
        assert_eq!(removed.load(Ordering::SeqCst), 200);
        assert!(src.is_empty());
    }
}
