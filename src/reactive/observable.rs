use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct ObservableInner<T> {
    value: T,
    /// Incremented once per mutation.
    version: u64,
    next_id: u64,
    subscribers: Vec<(u64, Callback<T>)>,
    /// Set while a delivery round is running.
    notifying: bool,
    /// Values published from inside a callback, delivered after the current round.
    pending: VecDeque<T>,
}

/// A shared value that notifies subscribers on every mutation.
///
/// Cloning an `Observable` creates a new handle to the **same** value.
pub struct Observable<T> {
    inner: Arc<Mutex<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + Send + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ObservableInner {
                value,
                version: 0,
                next_id: 0,
                subscribers: Vec::new(),
                notifying: false,
                pending: VecDeque::new(),
            })),
        }
    }

    /// Clone of the current value.
    pub fn get(&self) -> T {
        self.inner.lock().value.clone()
    }

    /// Borrow the current value without cloning.
    ///
    /// The cell is locked for the duration of `f`; `f` must not mutate
    /// this cell.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.lock().value)
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        let mut inner = self.inner.lock();
        inner.value = value;
        self.publish(inner);
    }

    /// Edit the value in place, then notify subscribers once.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut inner = self.inner.lock();
        f(&mut inner.value);
        self.publish(inner);
    }

    /// Edit the value in place; notify once if `f` succeeds.
    ///
    /// On `Err` nothing is published and `f` is responsible for leaving
    /// the value as it found it.
    pub fn try_update<R, E>(&self, f: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E> {
        let mut inner = self.inner.lock();
        let output = f(&mut inner.value)?;
        self.publish(inner);
        Ok(output)
    }

    /// Register `callback` for every future mutation.
    ///
    /// The callback stays registered until the returned [`Subscription`]
    /// is unsubscribed or dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push((id, Arc::new(callback)));
            id
        };

        let weak: Weak<Mutex<ObservableInner<T>>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.lock().subscribers.retain(|(sub_id, _)| *sub_id != id);
            }
        })
    }

    /// Number of mutations so far.
    pub fn version(&self) -> u64 {
        self.inner.lock().version
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }

    fn publish(&self, mut inner: parking_lot::MutexGuard<'_, ObservableInner<T>>) {
        inner.version += 1;
        if inner.subscribers.is_empty() {
            return;
        }
        let value = inner.value.clone();
        if inner.notifying {
            // Reentrant write: the running round delivers it once the
            // current value has reached every subscriber.
            inner.pending.push_back(value);
            return;
        }
        inner.notifying = true;
        drop(inner);

        let round = DeliveryRound { cell: &self.inner };
        let mut next = Some(value);
        while let Some(value) = next {
            let callbacks: Vec<Callback<T>> = round
                .cell
                .lock()
                .subscribers
                .iter()
                .map(|(_, callback)| Arc::clone(callback))
                .collect();
            for callback in callbacks {
                callback(&value);
            }
            let mut inner = round.cell.lock();
            next = inner.pending.pop_front();
            if next.is_none() {
                inner.notifying = false;
            }
        }
    }
}

/// Resets the delivery state when a callback panics mid-round.
struct DeliveryRound<'a, T> {
    cell: &'a Mutex<ObservableInner<T>>,
}

impl<T> Drop for DeliveryRound<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut inner = self.cell.lock();
            inner.notifying = false;
            inner.pending.clear();
        }
    }
}

impl<T: Clone + Default + Send + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Handle to a registered callback.
///
/// Unsubscribes on drop. Holds only a weak reference to the cell, so it
/// never keeps the cell alive.
pub struct Subscription {
    remove: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Subscription {
    fn new(remove: impl FnOnce() + Send + 'static) -> Self {
        Self {
            remove: Mutex::new(Some(Box::new(remove))),
        }
    }

    /// Remove the callback. Calling this again is a no-op.
    pub fn unsubscribe(&self) {
        let remove = self.remove.lock().take();
        if let Some(remove) = remove {
            remove();
        }
    }

    pub fn is_active(&self) -> bool {
        self.remove.lock().is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |value: &T| sink.lock().push(value.clone()))
    }

    #[test]
    fn get_and_set() {
        let cell = Observable::new(1);
        assert_eq!(cell.get(), 1);
        cell.set(2);
        assert_eq!(cell.get(), 2);
        assert_eq!(cell.version(), 1);
    }

    #[test]
    fn every_set_is_observed_in_order() {
        let cell = Observable::new(0);
        let (seen, callback) = recorder();
        let _sub = cell.subscribe(callback);

        cell.set(1);
        cell.set(1);
        cell.set(3);

        assert_eq!(*seen.lock(), vec![1, 1, 3]);
        assert_eq!(cell.version(), 3);
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let cell = Observable::new(0);
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&order);
        let _a = cell.subscribe(move |_| first.lock().push("a"));
        let second = Arc::clone(&order);
        let _b = cell.subscribe(move |_| second.lock().push("b"));

        cell.set(1);
        assert_eq!(*order.lock(), vec!["a", "b"]);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let cell = Observable::new(0);
        let (seen, callback) = recorder();
        let sub = cell.subscribe(callback);
        let (other_seen, other) = recorder();
        let _other = cell.subscribe(other);

        sub.unsubscribe();
        sub.unsubscribe();
        assert!(!sub.is_active());
        assert_eq!(cell.subscriber_count(), 1);

        cell.set(5);
        assert!(seen.lock().is_empty());
        assert_eq!(*other_seen.lock(), vec![5]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let cell = Observable::new(0);
        let (seen, callback) = recorder();
        {
            let _sub = cell.subscribe(callback);
            cell.set(1);
        }
        cell.set(2);
        assert_eq!(*seen.lock(), vec![1]);
        assert_eq!(cell.subscriber_count(), 0);
    }

    #[test]
    fn subscription_does_not_keep_cell_alive() {
        let cell = Observable::new(0);
        let weak = Arc::downgrade(&cell.inner);
        let sub = cell.subscribe(|_| {});
        drop(cell);
        assert!(weak.upgrade().is_none());
        sub.unsubscribe();
    }

    #[test]
    fn callback_may_reenter_cell() {
        let cell = Observable::new(0);
        let handle = cell.clone();
        let reads = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reads);
        let _sub = cell.subscribe(move |_| sink.lock().push(handle.get()));

        cell.set(7);
        assert_eq!(*reads.lock(), vec![7]);
    }

    #[test]
    fn write_from_callback_is_delivered_in_order() {
        let cell = Observable::new(0);
        let writer = cell.clone();
        let _a = cell.subscribe(move |value| {
            if *value == 1 {
                writer.set(2);
            }
        });
        let (seen, callback) = recorder();
        let _b = cell.subscribe(callback);

        cell.set(1);

        assert_eq!(*seen.lock(), vec![1, 2]);
        assert_eq!(cell.get(), 2);
        assert_eq!(cell.version(), 2);
    }

    #[test]
    fn chained_writes_from_callbacks_drain_fully() {
        let cell = Observable::new(0);
        let writer = cell.clone();
        let _a = cell.subscribe(move |value| {
            if *value < 3 {
                writer.update(|v| *v += 1);
            }
        });
        let (seen, callback) = recorder();
        let _b = cell.subscribe(callback);

        cell.set(1);
        assert_eq!(*seen.lock(), vec![1, 2, 3]);

        // The round is over: a later set starts a fresh one.
        cell.set(10);
        assert_eq!(*seen.lock(), vec![1, 2, 3, 10]);
    }

    #[test]
    fn update_notifies_once() {
        let cell = Observable::new(vec![1, 2]);
        let (seen, callback) = recorder();
        let _sub = cell.subscribe(callback);

        cell.update(|v| {
            v.push(3);
            v.push(4);
        });
        assert_eq!(*seen.lock(), vec![vec![1, 2, 3, 4]]);
    }

    #[test]
    fn failed_try_update_is_silent() {
        let cell = Observable::new(10);
        let (seen, callback) = recorder();
        let _sub = cell.subscribe(callback);

        let result: Result<(), &str> = cell.try_update(|_| Err("nope"));
        assert_eq!(result, Err("nope"));
        assert!(seen.lock().is_empty());
        assert_eq!(cell.version(), 0);

        let result: Result<i32, &str> = cell.try_update(|v| {
            *v += 1;
            Ok(*v)
        });
        assert_eq!(result, Ok(11));
        assert_eq!(*seen.lock(), vec![11]);
    }
}
