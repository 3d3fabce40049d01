//! Store - holds named state slices and runs the reduce/notify loop
//!
//! Each slice is owned by a `Reducer`: a closed action enum plus one pure
//! function producing the next state. `dispatch` applies that function under
//! the store lock, swaps in the new value (always a fresh `Arc`, so
//! subscribers can detect change with `Arc::ptr_eq`), releases the lock and
//! then notifies the slice's subscribers in registration order.
//!
//! Slices can also be addressed by name (`dispatch_named`, `subscribe_named`,
//! `get_slice_value`) for callers that only know the action table by its
//! string names.

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::collections::HashMap;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use strum::VariantNames;

/// Type-erased slice value as handed to named subscribers
pub type SliceValue = Arc<dyn Any + Send + Sync>;

type Callback = Arc<dyn Fn(&SliceValue) + Send + Sync>;

/// Reducer - pure function that produces new slice state from current state + action
///
/// `Action` is deserialized from `{"action": <name>, "payload": <payload>}`
/// by `dispatch_named`, and its variant names form the slice's action table.
pub trait Reducer: 'static {
    /// Slice name
    const NAME: &'static str;
    type State: Clone + Send + Sync + 'static;
    type Action: DeserializeOwned + VariantNames + Debug + Send + 'static;

    fn reduce(state: Self::State, action: &Self::Action) -> Self::State;
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

trait AnySlice: Send {
    fn value(&self) -> SliceValue;
    fn apply(&mut self, action: Box<dyn Any + Send>) -> Result<SliceValue, StoreError>;
    fn parse_action(
        &self,
        action: &str,
        payload: serde_json::Value,
    ) -> Result<Box<dyn Any + Send>, StoreError>;
}

struct TypedSlice<R: Reducer> {
    state: Arc<R::State>,
    _reducer: PhantomData<fn() -> R>,
}

impl<R: Reducer> AnySlice for TypedSlice<R> {
    fn value(&self) -> SliceValue {
        self.state.clone()
    }

    fn apply(&mut self, action: Box<dyn Any + Send>) -> Result<SliceValue, StoreError> {
        let action = action
            .downcast::<R::Action>()
            .map_err(|_| StoreError::UnknownAction {
                slice: R::NAME.to_string(),
                action: "<foreign action type>".to_string(),
            })?;
        log::trace!("{} <- {:?}", R::NAME, action);
        let next = R::reduce(R::State::clone(&self.state), &action);
        self.state = Arc::new(next);
        Ok(self.value())
    }

    fn parse_action(
        &self,
        action: &str,
        payload: serde_json::Value,
    ) -> Result<Box<dyn Any + Send>, StoreError> {
        if !R::Action::VARIANTS.contains(&action) {
            return Err(StoreError::UnknownAction {
                slice: R::NAME.to_string(),
                action: action.to_string(),
            });
        }
        let tagged = serde_json::json!({ "action": action, "payload": payload });
        let parsed: R::Action =
            serde_json::from_value(tagged).map_err(|source| StoreError::InvalidPayload {
                slice: R::NAME.to_string(),
                action: action.to_string(),
                source,
            })?;
        Ok(Box::new(parsed))
    }
}

struct Subscriber {
    token: SubscriptionToken,
    /// Cleared on unsubscribe so in-flight notifications skip it
    active: Arc<AtomicBool>,
    callback: Callback,
}

#[derive(Default)]
struct Inner {
    slices: HashMap<String, Box<dyn AnySlice>>,
    subscribers: HashMap<String, Vec<Subscriber>>,
    next_subscription: u64,
}

type Notification = Vec<(Arc<AtomicBool>, Callback)>;

impl Inner {
    fn apply(
        &mut self,
        slice: &str,
        action: Box<dyn Any + Send>,
    ) -> Result<(SliceValue, Notification), StoreError> {
        let entry = self
            .slices
            .get_mut(slice)
            .ok_or_else(|| StoreError::UnknownSlice(slice.to_string()))?;
        let value = entry.apply(action)?;
        Ok((value, self.pending_notification(slice)))
    }

    fn pending_notification(&self, slice: &str) -> Notification {
        self.subscribers
            .get(slice)
            .map(|subs| {
                subs.iter()
                    .map(|s| (Arc::clone(&s.active), Arc::clone(&s.callback)))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn add_subscriber(&mut self, slice: &str, callback: Callback) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers
            .entry(slice.to_string())
            .or_default()
            .push(Subscriber {
                token,
                active: Arc::new(AtomicBool::new(true)),
                callback,
            });
        token
    }
}

fn notify(value: &SliceValue, subscribers: Notification) {
    for (active, callback) in subscribers {
        if active.load(Ordering::Acquire) {
            callback(value);
        }
    }
}

fn downcast_state<R: Reducer>(value: SliceValue) -> Result<Arc<R::State>, StoreError> {
    value
        .downcast::<R::State>()
        .map_err(|_| StoreError::UnknownSlice(R::NAME.to_string()))
}

/// Shared handle to the application state
///
/// Cloning is cheap; all clones see the same slices. The lock is only held
/// while a reducer runs, never across an `.await` and never while
/// subscribers are being called.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<Mutex<Inner>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a slice with its initial value
    pub fn register_slice<R: Reducer>(&self, initial: R::State) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.slices.contains_key(R::NAME) {
            return Err(StoreError::DuplicateSlice(R::NAME.to_string()));
        }
        inner.slices.insert(
            R::NAME.to_string(),
            Box::new(TypedSlice::<R> {
                state: Arc::new(initial),
                _reducer: PhantomData,
            }),
        );
        log::debug!("Registered slice {}", R::NAME);
        Ok(())
    }

    /// Apply an action to its slice and notify subscribers
    ///
    /// Returns the new slice value.
    pub fn dispatch<R: Reducer>(&self, action: R::Action) -> Result<Arc<R::State>, StoreError> {
        let (value, subscribers) = self.lock().apply(R::NAME, Box::new(action))?;
        notify(&value, subscribers);
        downcast_state::<R>(value)
    }

    /// Apply an action addressed by slice and action name
    pub fn dispatch_named(
        &self,
        slice: &str,
        action: &str,
        payload: serde_json::Value,
    ) -> Result<SliceValue, StoreError> {
        let (value, subscribers) = {
            let mut inner = self.lock();
            let parsed = inner
                .slices
                .get(slice)
                .ok_or_else(|| StoreError::UnknownSlice(slice.to_string()))?
                .parse_action(action, payload)?;
            inner.apply(slice, parsed)?
        };
        notify(&value, subscribers);
        Ok(value)
    }

    /// Current value of a slice
    pub fn get<R: Reducer>(&self) -> Result<Arc<R::State>, StoreError> {
        downcast_state::<R>(self.get_slice_value(R::NAME)?)
    }

    /// Current value of a slice, by name
    pub fn get_slice_value(&self, slice: &str) -> Result<SliceValue, StoreError> {
        self.lock()
            .slices
            .get(slice)
            .map(|s| s.value())
            .ok_or_else(|| StoreError::UnknownSlice(slice.to_string()))
    }

    /// Names of all registered slices
    pub fn slice_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().slices.keys().cloned().collect();
        names.sort();
        names
    }

    /// Call `callback` with the new value after every dispatch to `R`'s slice
    pub fn subscribe<R: Reducer>(
        &self,
        callback: impl Fn(&Arc<R::State>) + Send + Sync + 'static,
    ) -> Result<SubscriptionToken, StoreError> {
        self.subscribe_named(R::NAME, move |value| {
            if let Ok(state) = Arc::clone(value).downcast::<R::State>() {
                callback(&state);
            }
        })
    }

    /// Call `callback` with the new value after every dispatch to `slice`
    pub fn subscribe_named(
        &self,
        slice: &str,
        callback: impl Fn(&SliceValue) + Send + Sync + 'static,
    ) -> Result<SubscriptionToken, StoreError> {
        let mut inner = self.lock();
        if !inner.slices.contains_key(slice) {
            return Err(StoreError::UnknownSlice(slice.to_string()));
        }
        Ok(inner.add_subscriber(slice, Arc::new(callback)))
    }

    /// Remove a subscription
    ///
    /// Safe to call from inside a subscriber. A subscriber removed while a
    /// notification is in flight is skipped if its turn has not come yet.
    /// Returns false if the token was not subscribed.
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        let mut inner = self.lock();
        for subs in inner.subscribers.values_mut() {
            if let Some(pos) = subs.iter().position(|s| s.token == token) {
                let removed = subs.remove(pos);
                removed.active.store(false, Ordering::Release);
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::Mutex as StdMutex;

    struct Counter;

    #[derive(Debug, Deserialize, VariantNames)]
    #[serde(tag = "action", content = "payload", rename_all = "camelCase")]
    #[strum(serialize_all = "camelCase")]
    enum CounterAction {
        Add { amount: i64 },
        Reset {},
    }

    impl Reducer for Counter {
        const NAME: &'static str = "counter";
        type State = i64;
        type Action = CounterAction;

        fn reduce(state: i64, action: &CounterAction) -> i64 {
            match action {
                CounterAction::Add { amount } => state + amount,
                CounterAction::Reset {} => 0,
            }
        }
    }

    fn store() -> Store {
        let store = Store::new();
        store.register_slice::<Counter>(0).unwrap();
        store
    }

    #[test]
    fn test_duplicate_slice_is_rejected() {
        let store = store();
        let err = store.register_slice::<Counter>(5).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateSlice(name) if name == "counter"));
        assert_eq!(*store.get::<Counter>().unwrap(), 0);
    }

    #[test]
    fn test_dispatch_to_unregistered_slice_fails() {
        let store = Store::new();
        let err = store
            .dispatch::<Counter>(CounterAction::Add { amount: 1 })
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownSlice(_)));
        assert!(matches!(
            store.get_slice_value("nope"),
            Err(StoreError::UnknownSlice(_))
        ));
    }

    #[test]
    fn test_dispatch_returns_fresh_value() {
        let store = store();
        let before = store.get::<Counter>().unwrap();
        let after = store.dispatch::<Counter>(CounterAction::Add { amount: 0 }).unwrap();
        assert_eq!(*before, *after);
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_dispatch_named() {
        let store = store();
        store
            .dispatch_named("counter", "add", serde_json::json!({ "amount": 3 }))
            .unwrap();
        assert_eq!(*store.get::<Counter>().unwrap(), 3);

        store
            .dispatch_named("counter", "reset", serde_json::json!({}))
            .unwrap();
        assert_eq!(*store.get::<Counter>().unwrap(), 0);
    }

    #[test]
    fn test_dispatch_named_lookup_errors() {
        let store = store();
        assert!(matches!(
            store.dispatch_named("other", "add", serde_json::json!({})),
            Err(StoreError::UnknownSlice(_))
        ));
        assert!(matches!(
            store.dispatch_named("counter", "multiply", serde_json::json!({})),
            Err(StoreError::UnknownAction { .. })
        ));
        assert!(matches!(
            store.dispatch_named("counter", "add", serde_json::json!({ "amount": "x" })),
            Err(StoreError::InvalidPayload { .. })
        ));
        assert_eq!(*store.get::<Counter>().unwrap(), 0);
    }

    #[test]
    fn test_subscribers_run_in_registration_order() {
        let store = store();
        let calls = Arc::new(StdMutex::new(Vec::new()));
        for name in ["first", "second", "third"] {
            let calls = Arc::clone(&calls);
            store
                .subscribe::<Counter>(move |value| {
                    calls.lock().unwrap().push(format!("{}:{}", name, value));
                })
                .unwrap();
        }
        store.dispatch::<Counter>(CounterAction::Add { amount: 2 }).unwrap();
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["first:2", "second:2", "third:2"]
        );
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = store();
        let calls = Arc::new(StdMutex::new(0));
        let counter = Arc::clone(&calls);
        let token = store
            .subscribe::<Counter>(move |_| *counter.lock().unwrap() += 1)
            .unwrap();

        store.dispatch::<Counter>(CounterAction::Add { amount: 1 }).unwrap();
        assert!(store.unsubscribe(token));
        assert!(!store.unsubscribe(token));
        store.dispatch::<Counter>(CounterAction::Add { amount: 1 }).unwrap();
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_unsubscribe_during_notification_skips_pending_subscriber() {
        let store = store();
        let calls = Arc::new(StdMutex::new(Vec::new()));
        let victim: Arc<StdMutex<Option<SubscriptionToken>>> = Arc::new(StdMutex::new(None));

        let handle = store.clone();
        let victim_token = Arc::clone(&victim);
        let log = Arc::clone(&calls);
        store
            .subscribe::<Counter>(move |_| {
                log.lock().unwrap().push("killer");
                if let Some(token) = victim_token.lock().unwrap().take() {
                    handle.unsubscribe(token);
                }
            })
            .unwrap();

        let log = Arc::clone(&calls);
        let token = store
            .subscribe::<Counter>(move |_| log.lock().unwrap().push("victim"))
            .unwrap();
        *victim.lock().unwrap() = Some(token);

        store.dispatch::<Counter>(CounterAction::Add { amount: 1 }).unwrap();
        store.dispatch::<Counter>(CounterAction::Add { amount: 1 }).unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["killer", "killer"]);
    }

    #[test]
    fn test_subscriber_can_unsubscribe_itself_and_read_store() {
        let store = store();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let own_token: Arc<StdMutex<Option<SubscriptionToken>>> = Arc::new(StdMutex::new(None));

        let handle = store.clone();
        let seen_in = Arc::clone(&seen);
        let token_in = Arc::clone(&own_token);
        let token = store
            .subscribe_named("counter", move |_| {
                let current = handle.get::<Counter>().unwrap();
                seen_in.lock().unwrap().push(*current);
                if let Some(token) = token_in.lock().unwrap().take() {
                    handle.unsubscribe(token);
                }
            })
            .unwrap();
        *own_token.lock().unwrap() = Some(token);

        store.dispatch::<Counter>(CounterAction::Add { amount: 4 }).unwrap();
        store.dispatch::<Counter>(CounterAction::Add { amount: 4 }).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![4]);
    }

    #[test]
    fn test_subscribe_to_unknown_slice_fails() {
        let store = Store::new();
        assert!(matches!(
            store.subscribe_named("counter", |_| {}),
            Err(StoreError::UnknownSlice(_))
        ));
    }
}
