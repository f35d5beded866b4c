//! Upcoming-charge alerts.
//!
//! The alerter picks subscriptions due within the lookahead window and asks a
//! [`NotificationHost`] to show one notification per entry. Delivery is best
//! effort: without permission nothing is shown, and a failing host is logged
//! and skipped.
//!
//! There is no de-duplication. Evaluating twice with the same due entry shows
//! its notification twice.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;
use crate::query::{self, DEFAULT_HORIZON_DAYS};
use crate::subscription::Subscription;

/// Host-level notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Not asked yet.
    #[default]
    Default,
    Granted,
    Denied,
}

/// A notification about to be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn for_subscription(sub: &Subscription) -> Self {
        Self {
            title: format!("Alerta: {} cobra em breve!", sub.name),
            body: format!(
                "R$ {} em {}",
                sub.value,
                sub.next_date.format("%d/%m/%Y")
            ),
        }
    }
}

/// Host capability able to display notifications.
pub trait NotificationHost {
    fn permission(&self) -> Permission;

    /// Ask the user for permission. Returns the resulting state.
    fn request_permission(&mut self) -> Permission;

    fn show(&mut self, notification: &Notification) -> Result<()>;
}

/// Host that records what it was asked to show. Clones share the log.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    permission: Rc<RefCell<Permission>>,
    /// Answer given when permission is requested.
    answer: Permission,
    shown: Rc<RefCell<Vec<Notification>>>,
}

impl MemoryHost {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission: Rc::new(RefCell::new(permission)),
            answer: Permission::Granted,
            shown: Rc::default(),
        }
    }

    pub fn granted() -> Self {
        Self::new(Permission::Granted)
    }

    /// Set what a permission request resolves to.
    pub fn answering(mut self, answer: Permission) -> Self {
        self.answer = answer;
        self
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.borrow().clone()
    }

    pub fn clear(&self) {
        self.shown.borrow_mut().clear();
    }
}

impl NotificationHost for MemoryHost {
    fn permission(&self) -> Permission {
        *self.permission.borrow()
    }

    fn request_permission(&mut self) -> Permission {
        *self.permission.borrow_mut() = self.answer;
        self.answer
    }

    fn show(&mut self, notification: &Notification) -> Result<()> {
        self.shown.borrow_mut().push(notification.clone());
        Ok(())
    }
}

/// Selects due subscriptions and notifies through a host.
#[derive(Debug)]
pub struct Alerter<H> {
    host: H,
    horizon_days: i64,
    enabled: bool,
}

impl<H: NotificationHost> Alerter<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            horizon_days: DEFAULT_HORIZON_DAYS,
            enabled: true,
        }
    }

    pub fn with_horizon(mut self, horizon_days: i64) -> Self {
        self.horizon_days = horizon_days;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn horizon_days(&self) -> i64 {
        self.horizon_days
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// One-time permission request. Only asks while permission is undetermined.
    pub fn bootstrap(&mut self) -> Permission {
        match self.host.permission() {
            Permission::Default => {
                let answer = self.host.request_permission();
                log::debug!("notification permission requested: {answer:?}");
                answer
            }
            decided => decided,
        }
    }

    /// Notify for every entry due within the window. Returns what was shown.
    pub fn evaluate(&mut self, subs: &[Subscription], today: NaiveDate) -> Vec<Notification> {
        if !self.enabled {
            return Vec::new();
        }
        let due = query::upcoming(subs, today, self.horizon_days);
        if due.is_empty() {
            return Vec::new();
        }
        if self.host.permission() != Permission::Granted {
            log::debug!("{} upcoming charges, notifications not permitted", due.len());
            return Vec::new();
        }

        let mut shown = Vec::with_capacity(due.len());
        for sub in due {
            let notification = Notification::for_subscription(sub);
            match self.host.show(&notification) {
                Ok(()) => shown.push(notification),
                Err(e) => log::warn!("failed to show alert for '{}': {e}", sub.name),
            }
        }
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::{parse_next_date, SubscriptionDraft};
    use crate::CoreError;

    fn date(s: &str) -> NaiveDate {
        parse_next_date(s).unwrap()
    }

    fn subs() -> Vec<Subscription> {
        vec![
            Subscription::from_draft(1, SubscriptionDraft::new("Netflix", 39.9, date("2024-01-10"))),
            Subscription::from_draft(2, SubscriptionDraft::new("Gym", 80.0, date("2024-03-01"))),
        ]
    }

    struct FailingHost;

    impl NotificationHost for FailingHost {
        fn permission(&self) -> Permission {
            Permission::Granted
        }
        fn request_permission(&mut self) -> Permission {
            Permission::Granted
        }
        fn show(&mut self, _: &Notification) -> Result<()> {
            Err(CoreError::Custom("display unavailable".into()))
        }
    }

    #[test]
    fn notification_payload_format() {
        let n = Notification::for_subscription(&subs()[0]);
        assert_eq!(n.title, "Alerta: Netflix cobra em breve!");
        assert_eq!(n.body, "R$ 39.90 em 10/01/2024");

        let half = Subscription::from_draft(3, SubscriptionDraft::new("x", 0.125, date("2024-01-10")));
        assert_eq!(Notification::for_subscription(&half).body, "R$ 0.13 em 10/01/2024");
    }

    #[test]
    fn granted_host_gets_one_notification_per_due_entry() {
        let host = MemoryHost::granted();
        let mut alerter = Alerter::new(host.clone());
        let shown = alerter.evaluate(&subs(), date("2024-01-05"));
        assert_eq!(shown.len(), 1);
        assert_eq!(host.shown(), shown);
    }

    #[test]
    fn repeated_evaluation_notifies_again() {
        let host = MemoryHost::granted();
        let mut alerter = Alerter::new(host.clone());
        alerter.evaluate(&subs(), date("2024-01-05"));
        alerter.evaluate(&subs(), date("2024-01-05"));
        assert_eq!(host.shown().len(), 2);
    }

    #[test]
    fn denied_or_undetermined_shows_nothing() {
        for permission in [Permission::Denied, Permission::Default] {
            let host = MemoryHost::new(permission);
            let mut alerter = Alerter::new(host.clone());
            assert!(alerter.evaluate(&subs(), date("2024-01-05")).is_empty());
            assert!(host.shown().is_empty());
        }
    }

    #[test]
    fn bootstrap_only_asks_when_undetermined() {
        let mut alerter = Alerter::new(MemoryHost::new(Permission::Default).answering(Permission::Denied));
        assert_eq!(alerter.bootstrap(), Permission::Denied);
        assert_eq!(alerter.host().permission(), Permission::Denied);

        let mut granted = Alerter::new(MemoryHost::new(Permission::Default));
        assert_eq!(granted.bootstrap(), Permission::Granted);

        let mut denied = Alerter::new(MemoryHost::new(Permission::Denied).answering(Permission::Granted));
        assert_eq!(denied.bootstrap(), Permission::Denied);
    }

    #[test]
    fn disabled_alerter_is_silent() {
        let host = MemoryHost::granted();
        let mut alerter = Alerter::new(host.clone()).with_enabled(false);
        assert!(alerter.evaluate(&subs(), date("2024-01-05")).is_empty());
        assert!(host.shown().is_empty());
    }

    #[test]
    fn horizon_is_configurable() {
        let mut alerter = Alerter::new(MemoryHost::granted()).with_horizon(60);
        assert_eq!(alerter.evaluate(&subs(), date("2024-01-05")).len(), 2);
    }

    #[test]
    fn failing_host_is_skipped() {
        let mut alerter = Alerter::new(FailingHost);
        assert!(alerter.evaluate(&subs(), date("2024-01-05")).is_empty());
    }
}
