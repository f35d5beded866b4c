//! Application state controller.
//!
//! [`Tracker`] owns the authoritative subscription list. Every mutation
//! replaces the list, writes it in full through the [`SubscriptionStore`],
//! re-evaluates alerts (except on removal), notifies observers and returns
//! the new snapshot.
//!
//! Lifecycle: `Uninitialized -> Loading -> Ready`. Mutations are rejected
//! with [`CoreError::NotReady`] until [`Tracker::initialize`] has run.

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::alerts::{Alerter, Notification, NotificationHost};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::storage::{KeyValueStore, SubscriptionStore};
use crate::subscription::{Subscription, SubscriptionDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerState {
    Uninitialized,
    Loading,
    Ready,
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrackerState::Uninitialized => "uninitialized",
            TrackerState::Loading => "loading",
            TrackerState::Ready => "ready",
        };
        f.write_str(s)
    }
}

type Observer = Box<dyn FnMut(&Event, &[Subscription])>;
type Clock = Box<dyn Fn() -> NaiveDate>;

pub struct Tracker<S, H> {
    store: SubscriptionStore<S>,
    alerter: Alerter<H>,
    subs: Vec<Subscription>,
    state: TrackerState,
    /// Highest id seen or issued this session.
    last_id: i64,
    clock: Clock,
    observers: Vec<Observer>,
    last_alerts: Vec<Notification>,
    persist_error: Option<String>,
}

impl<S: KeyValueStore, H: NotificationHost> Tracker<S, H> {
    pub fn new(store: SubscriptionStore<S>, alerter: Alerter<H>) -> Self {
        Self {
            store,
            alerter,
            subs: Vec::new(),
            state: TrackerState::Uninitialized,
            last_id: 0,
            clock: Box::new(|| Local::now().date_naive()),
            observers: Vec::new(),
            last_alerts: Vec::new(),
            persist_error: None,
        }
    }

    /// Replace the source of "today" used for alert evaluation.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == TrackerState::Loading
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subs
    }

    pub fn get(&self, id: i64) -> Option<&Subscription> {
        self.subs.iter().find(|sub| sub.id == id)
    }

    pub fn alerter(&self) -> &Alerter<H> {
        &self.alerter
    }

    /// Notifications shown by the most recent alert evaluation.
    pub fn last_alerts(&self) -> &[Notification] {
        &self.last_alerts
    }

    /// Error message of the last failed write, cleared by the next success.
    pub fn last_persist_error(&self) -> Option<&str> {
        self.persist_error.as_deref()
    }

    /// Register an observer called after every state change.
    pub fn subscribe(&mut self, observer: impl FnMut(&Event, &[Subscription]) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Load the stored collection and run one alert evaluation.
    ///
    /// Calling it again reloads from storage.
    pub fn initialize(&mut self) -> &[Subscription] {
        self.state = TrackerState::Loading;
        self.subs = self.store.load();
        self.last_id = self
            .subs
            .iter()
            .map(|sub| sub.id)
            .fold(self.last_id, i64::max);
        self.state = TrackerState::Ready;

        self.evaluate_alerts();
        self.publish(Event::Loaded {
            count: self.subs.len(),
            at: Utc::now(),
        });
        &self.subs
    }

    /// Append a new subscription with a fresh id.
    ///
    /// # Errors
    /// [`CoreError::NotReady`] before initialization, a validation error
    /// for an invalid draft, or [`CoreError::IdsExhausted`] when a stored id
    /// already sits at `i64::MAX`. The collection is untouched in each case.
    pub fn add(&mut self, draft: SubscriptionDraft) -> Result<&[Subscription]> {
        self.ensure_ready()?;
        draft.validate()?;

        let id = self.next_id()?;
        self.subs.push(Subscription::from_draft(id, draft));
        log::debug!("added subscription {id}");

        self.persist();
        self.evaluate_alerts();
        self.publish(Event::Added { id, at: Utc::now() });
        Ok(&self.subs)
    }

    /// Replace the fields of subscription `id`. An unknown id leaves the
    /// collection unchanged and is not an error.
    pub fn update(&mut self, id: i64, draft: SubscriptionDraft) -> Result<&[Subscription]> {
        self.ensure_ready()?;
        draft.validate()?;

        let found = match self.subs.iter_mut().find(|sub| sub.id == id) {
            Some(sub) => {
                sub.apply(draft);
                true
            }
            None => {
                log::debug!("update: no subscription with id {id}");
                false
            }
        };

        self.persist();
        self.evaluate_alerts();
        self.publish(Event::Updated {
            id,
            found,
            at: Utc::now(),
        });
        Ok(&self.subs)
    }

    /// Remove subscription `id` if present. Alerts are not re-evaluated.
    pub fn remove(&mut self, id: i64) -> Result<&[Subscription]> {
        self.ensure_ready()?;

        let before = self.subs.len();
        self.subs.retain(|sub| sub.id != id);
        let found = self.subs.len() != before;

        self.persist();
        self.publish(Event::Removed {
            id,
            found,
            at: Utc::now(),
        });
        Ok(&self.subs)
    }

    /// Run an alert evaluation on the current collection.
    pub fn check_alerts(&mut self) -> &[Notification] {
        self.evaluate_alerts();
        &self.last_alerts
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            TrackerState::Ready => Ok(()),
            other => Err(CoreError::NotReady(other)),
        }
    }

    /// Millisecond timestamp, bumped past every id seen so far.
    fn next_id(&mut self) -> Result<i64> {
        let floor = self
            .last_id
            .checked_add(1)
            .ok_or(CoreError::IdsExhausted(self.last_id))?;
        let id = Utc::now().timestamp_millis().max(floor);
        self.last_id = id;
        Ok(id)
    }

    fn persist(&mut self) {
        match self.store.save(&self.subs) {
            Ok(()) => self.persist_error = None,
            Err(e) => {
                log::error!("failed to persist subscriptions: {e}");
                self.persist_error = Some(e.to_string());
            }
        }
    }

    fn evaluate_alerts(&mut self) {
        let today = (self.clock)();
        self.last_alerts = self.alerter.evaluate(&self.subs, today);
    }

    fn publish(&mut self, event: Event) {
        for observer in self.observers.iter_mut() {
            observer(&event, &self.subs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{MemoryHost, Permission};
    use crate::query;
    use crate::storage::MemoryStore;
    use crate::subscription::{parse_next_date, DEFAULT_CATEGORY};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn date(s: &str) -> NaiveDate {
        parse_next_date(s).unwrap()
    }

    fn tracker(mem: &MemoryStore, host: &MemoryHost) -> Tracker<MemoryStore, MemoryHost> {
        Tracker::new(SubscriptionStore::new(mem.clone()), Alerter::new(host.clone()))
            .with_clock(|| parse_next_date("2024-01-05").unwrap())
    }

    fn netflix() -> SubscriptionDraft {
        SubscriptionDraft::new("Netflix", 39.90, date("2024-01-10")).with_category("Streaming")
    }

    #[test]
    fn mutations_before_initialize_are_rejected() {
        let mut t = tracker(&MemoryStore::new(), &MemoryHost::granted());
        assert_eq!(t.state(), TrackerState::Uninitialized);
        assert!(matches!(
            t.add(netflix()),
            Err(CoreError::NotReady(TrackerState::Uninitialized))
        ));
        assert!(t.remove(1).is_err());
        assert!(t.update(1, netflix()).is_err());
    }

    #[test]
    fn initialize_loads_and_alerts_once() {
        let mem = MemoryStore::new();
        let host = MemoryHost::granted();
        {
            let mut t = tracker(&mem, &host);
            t.initialize();
            t.add(netflix()).unwrap();
        }
        host.clear();

        let mut t = tracker(&mem, &host);
        let snapshot = t.initialize();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(t.state(), TrackerState::Ready);
        assert!(!t.is_loading());
        assert_eq!(host.shown().len(), 1);
        assert_eq!(t.last_alerts().len(), 1);
    }

    #[test]
    fn add_spotify_with_blank_category() {
        let mut t = tracker(&MemoryStore::new(), &MemoryHost::granted());
        t.initialize();
        t.add(netflix()).unwrap();
        let before = query::total_monthly(t.subscriptions());

        let spotify = SubscriptionDraft::new("Spotify", 19.90, date("2024-02-01")).with_category("");
        let snapshot = t.add(spotify).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].effective_category(), DEFAULT_CATEGORY);

        let after = query::total_monthly(t.subscriptions());
        assert!((after - before - 19.90).abs() < 1e-9);
    }

    #[test]
    fn add_persists_full_collection() {
        let mem = MemoryStore::new();
        let mut t = tracker(&mem, &MemoryHost::granted());
        t.initialize();
        t.add(netflix()).unwrap();
        t.add(SubscriptionDraft::new("Gym", 80.0, date("2024-03-01"))).unwrap();

        let stored = SubscriptionStore::new(mem).try_load().unwrap();
        assert_eq!(stored, t.subscriptions());
    }

    #[test]
    fn invalid_draft_leaves_collection_untouched() {
        let mem = MemoryStore::new();
        let mut t = tracker(&mem, &MemoryHost::granted());
        t.initialize();
        assert!(t.add(SubscriptionDraft::new("", 10.0, date("2024-01-10"))).is_err());
        assert!(t.add(SubscriptionDraft::new("x", -1.0, date("2024-01-10"))).is_err());
        assert!(t.subscriptions().is_empty());
        assert!(mem.raw("subscriptions").is_none());
    }

    #[test]
    fn ids_are_unique_and_not_reused() {
        let mut t = tracker(&MemoryStore::new(), &MemoryHost::granted());
        t.initialize();
        let a = t.add(netflix()).unwrap()[0].id;
        let b = t.add(netflix()).unwrap()[1].id;
        assert_ne!(a, b);
        t.remove(b).unwrap();
        let c = t.add(netflix()).unwrap()[1].id;
        assert!(c > b);
    }

    #[test]
    fn ids_stay_above_loaded_ones() {
        let mem = MemoryStore::new();
        let far_future = Subscription::from_draft(i64::MAX / 2, netflix());
        SubscriptionStore::new(mem.clone()).save(&[far_future]).unwrap();

        let mut t = tracker(&mem, &MemoryHost::granted());
        t.initialize();
        let snapshot = t.add(netflix()).unwrap();
        assert_eq!(snapshot[1].id, i64::MAX / 2 + 1);
    }

    #[test]
    fn add_fails_cleanly_when_ids_run_out() {
        let mem = MemoryStore::new();
        let last = Subscription::from_draft(i64::MAX, netflix());
        SubscriptionStore::new(mem.clone()).save(&[last]).unwrap();

        let mut t = tracker(&mem, &MemoryHost::granted());
        t.initialize();
        assert!(matches!(t.add(netflix()), Err(CoreError::IdsExhausted(i64::MAX))));
        assert_eq!(t.subscriptions().len(), 1);
        assert_eq!(t.subscriptions()[0].id, i64::MAX);

        t.update(i64::MAX, netflix()).unwrap();
        t.remove(i64::MAX).unwrap();
        assert!(t.subscriptions().is_empty());
    }

    #[test]
    fn update_replaces_fields_and_keeps_id() {
        let mut t = tracker(&MemoryStore::new(), &MemoryHost::granted());
        t.initialize();
        let id = t.add(netflix()).unwrap()[0].id;

        let edited = SubscriptionDraft::new("Netflix Premium", 55.9, date("2024-01-20"));
        let snapshot = t.update(id, edited).unwrap();
        assert_eq!(snapshot[0].id, id);
        assert_eq!(snapshot[0].name, "Netflix Premium");
        assert_eq!(snapshot[0].category, None);
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let mut t = tracker(&MemoryStore::new(), &MemoryHost::granted());
        t.initialize();
        t.add(netflix()).unwrap();
        let before = t.subscriptions().to_vec();
        let after = t.update(42, SubscriptionDraft::new("x", 1.0, date("2024-01-01"))).unwrap();
        assert_eq!(after, before.as_slice());
    }

    #[test]
    fn remove_does_not_reevaluate_alerts() {
        let host = MemoryHost::granted();
        let mut t = tracker(&MemoryStore::new(), &host);
        t.initialize();
        t.add(netflix()).unwrap();
        let id = t.add(SubscriptionDraft::new("Gym", 80.0, date("2024-03-01"))).unwrap()[1].id;
        let shown = host.shown().len();

        let snapshot = t.remove(id).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(host.shown().len(), shown);

        t.remove(id).unwrap();
        assert_eq!(t.subscriptions().len(), 1);
    }

    #[test]
    fn write_failure_is_swallowed_and_reported() {
        let mem = MemoryStore::new();
        let mut t = tracker(&mem, &MemoryHost::granted());
        t.initialize();
        mem.set_available(false);

        let snapshot = t.add(netflix()).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(t.last_persist_error().is_some());

        mem.set_available(true);
        t.add(netflix()).unwrap();
        assert!(t.last_persist_error().is_none());
    }

    #[test]
    fn observers_see_each_event_with_snapshot() {
        let seen: Rc<RefCell<Vec<(String, usize)>>> = Rc::default();
        let sink = seen.clone();

        let mut t = tracker(&MemoryStore::new(), &MemoryHost::new(Permission::Denied));
        t.subscribe(move |event, subs| {
            let kind = serde_json::to_value(event).unwrap()["type"].as_str().unwrap().to_string();
            sink.borrow_mut().push((kind, subs.len()));
        });
        t.initialize();
        let id = t.add(netflix()).unwrap()[0].id;
        t.update(id, netflix()).unwrap();
        t.remove(id).unwrap();

        let kinds: Vec<_> = seen.borrow().iter().map(|(k, n)| (k.clone(), *n)).collect();
        assert_eq!(
            kinds,
            vec![
                ("Loaded".to_string(), 0),
                ("Added".to_string(), 1),
                ("Updated".to_string(), 1),
                ("Removed".to_string(), 0),
            ]
        );
    }

    #[test]
    fn check_alerts_notifies_again_without_mutation() {
        let host = MemoryHost::granted();
        let mut t = tracker(&MemoryStore::new(), &host);
        t.initialize();
        t.add(netflix()).unwrap();
        assert_eq!(t.check_alerts().len(), 1);
        assert_eq!(host.shown().len(), 2);
    }

    #[test]
    fn corrupt_store_initializes_empty() {
        let mem = MemoryStore::new();
        mem.set("subscriptions", b"garbage").unwrap();
        let mut t = tracker(&mem, &MemoryHost::granted());
        assert!(t.initialize().is_empty());
        assert_eq!(t.state(), TrackerState::Ready);
    }
}
