//! Reactive value cells.
//!
//! - [`Observable`]: a shared, version-tracked value with synchronous
//!   change notification.
//! - [`Subscription`]: handle that removes its callback when unsubscribed
//!   or dropped.
//!
//! # Invariants
//!
//! 1. Every `set`/`update` bumps the version by exactly one and notifies
//!    every current subscriber exactly once, even if the new value equals
//!    the old one.
//! 2. Subscribers are notified in registration order, before `set` returns,
//!    each with the value as of that `set`.
//! 3. No lock is held while callbacks run, so a callback may read or write
//!    the same cell. A write from inside a callback is queued: it returns
//!    at once and is delivered after the current value has reached every
//!    subscriber, so all subscribers see writes in the order they happened
//!    and the last value delivered is the cell's value.
//! 4. Unsubscribing is idempotent.

mod observable;

pub use observable::{Observable, Subscription};
