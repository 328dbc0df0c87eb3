// src/services/observable.rs
// DOCUMENTATION: Observable value holder with an explicit observer list
// PURPOSE: Replay-on-subscribe, ordered fan-out, deregistration on drop

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Callback invoked with every published value
pub type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct State<T> {
    value: T,
    observers: Vec<(u64, Observer<T>)>,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    /// Serializes publication so every observer sees the same ordered
    /// sequence of values, with no gap or duplicate around subscribe
    publish: Mutex<()>,
    next_id: AtomicU64,
}

fn lock<G>(mutex: &Mutex<G>) -> MutexGuard<'_, G> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Value holder observers can subscribe to
/// DOCUMENTATION: Observers run synchronously on the publishing task, while
/// the publish lock is held. They may call `get()` but must not mutate or
/// subscribe to the same observable.
pub struct Observable<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Send + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    value,
                    observers: Vec::new(),
                }),
                publish: Mutex::new(()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Snapshot of the current value
    pub fn get(&self) -> T {
        lock(&self.shared.state).value.clone()
    }

    /// Read the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&lock(&self.shared.state).value)
    }

    /// Register an observer
    /// DOCUMENTATION: The observer receives the current value immediately,
    /// then every later value until the returned handle is dropped
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let _publishing = lock(&self.shared.publish);
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let observer: Observer<T> = Arc::new(observer);

        let current = {
            let mut state = lock(&self.shared.state);
            state.observers.push((id, Arc::clone(&observer)));
            state.value.clone()
        };
        observer(&current);

        let weak: Weak<Shared<T>> = Arc::downgrade(&self.shared);
        Subscription::new(move || {
            if let Some(shared) = weak.upgrade() {
                lock(&shared.state).observers.retain(|(oid, _)| *oid != id);
            }
        })
    }

    /// Channel-backed subscription for async consumers
    /// Same replay and ordering guarantees as `subscribe`.
    pub fn watch(&self) -> (Subscription, UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.subscribe(move |value: &T| {
            // Receiver gone means the consumer stopped listening
            let _ = tx.send(value.clone());
        });
        (subscription, rx)
    }

    /// Replace the value and notify observers
    pub fn set(&self, value: T) {
        let _ = self.update(|current| -> Result<(), std::convert::Infallible> {
            *current = value;
            Ok(())
        });
    }

    /// Apply a fallible mutation atomically
    /// DOCUMENTATION: The mutation runs on a copy. On error nothing is
    /// committed and nobody is notified; on success the new value is
    /// committed and fanned out in registration order.
    pub fn update<R, E>(&self, mutate: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E> {
        let _publishing = lock(&self.shared.publish);

        let (result, snapshot, observers) = {
            let mut state = lock(&self.shared.state);
            let mut next = state.value.clone();
            let result = mutate(&mut next)?;
            state.value = next;
            let observers: Vec<Observer<T>> =
                state.observers.iter().map(|(_, o)| Arc::clone(o)).collect();
            (result, state.value.clone(), observers)
        };

        for observer in observers {
            observer(&snapshot);
        }

        Ok(result)
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.shared.state).observers.len()
    }
}

/// Handle of a registered observer
/// DOCUMENTATION: Dropping it (or calling `unsubscribe`) deregisters the observer
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |v: &T| sink.lock().unwrap().push(v.clone()))
    }

    #[test]
    fn test_replay_then_updates() {
        let observable = Observable::new(1);
        let (seen, observer) = recorder::<i32>();

        let _sub = observable.subscribe(observer);
        observable.set(2);
        observable.set(3);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let observable = Observable::new(0);
        let (seen, observer) = recorder::<i32>();

        let sub = observable.subscribe(observer);
        assert_eq!(observable.subscriber_count(), 1);
        observable.set(1);
        drop(sub);
        observable.set(2);

        assert_eq!(observable.subscriber_count(), 0);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_failed_update_is_not_published() {
        let observable = Observable::new(vec![1]);
        let (seen, observer) = recorder::<Vec<i32>>();
        let _sub = observable.subscribe(observer);

        let result: Result<(), &str> = observable.update(|v| {
            v.push(2);
            Err("rejected")
        });

        assert!(result.is_err());
        assert_eq!(observable.get(), vec![1]);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_observer_can_read_current_value() {
        let observable = Observable::new(0);
        let reader = observable.clone();
        let (seen, sink) = recorder::<i32>();

        let _sub = observable.subscribe(move |_: &i32| sink(&reader.get()));
        observable.set(5);

        assert_eq!(*seen.lock().unwrap(), vec![0, 5]);
    }

    #[tokio::test]
    async fn test_watch_channel() {
        let observable = Observable::new("a".to_string());
        let (_sub, mut rx) = observable.watch();

        observable.set("b".to_string());

        assert_eq!(rx.recv().await.as_deref(), Some("a"));
        assert_eq!(rx.recv().await.as_deref(), Some("b"));
    }
}
