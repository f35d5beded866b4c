//! Shared plumbing for CLI commands: opening the tracker and the terminal
//! notification host.

use std::io::{BufRead, IsTerminal, Write};

use subtrack_core::{
    Alerter, Config, FileStore, Notification, NotificationHost, Permission, Subscription,
    SubscriptionStore, Tracker,
};

pub type CliTracker = Tracker<FileStore, TerminalHost>;

/// Shows notifications on stderr. Permission lives in the config file.
pub struct TerminalHost {
    config: Config,
}

impl TerminalHost {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn ask() -> Option<bool> {
        eprint!("Allow subtrack to show charge reminders? [y/N] ");
        std::io::stderr().flush().ok()?;
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).ok()?;
        Some(matches!(line.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "sim"))
    }
}

impl NotificationHost for TerminalHost {
    fn permission(&self) -> Permission {
        self.config.alerts.permission
    }

    fn request_permission(&mut self) -> Permission {
        // Without a terminal there is nobody to ask; stay undetermined.
        if !std::io::stdin().is_terminal() {
            return Permission::Default;
        }
        let answer = match Self::ask() {
            Some(true) => Permission::Granted,
            Some(false) => Permission::Denied,
            None => return Permission::Default,
        };
        self.config.alerts.permission = answer;
        if let Err(e) = self.config.save() {
            log::warn!("could not remember notification permission: {e}");
        }
        answer
    }

    fn show(&mut self, notification: &Notification) -> subtrack_core::Result<()> {
        eprintln!("[!] {}", notification.title);
        eprintln!("    {}", notification.body);
        Ok(())
    }
}

/// Load config, open the file store and initialize the tracker.
pub fn open_tracker() -> Result<(CliTracker, Config), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = SubscriptionStore::with_slot(FileStore::open()?, config.storage.slot.clone());
    let mut alerter = Alerter::new(TerminalHost::new(config.clone()))
        .with_horizon(config.alerts.horizon_days)
        .with_enabled(config.alerts.enabled);
    if config.alerts.enabled {
        alerter.bootstrap();
    }

    let mut tracker = Tracker::new(store, alerter);
    tracker.initialize();
    Ok((tracker, config))
}

/// Print a warning when the last write did not reach the store.
pub fn warn_if_unsaved(tracker: &CliTracker) {
    if let Some(e) = tracker.last_persist_error() {
        eprintln!("warning: changes were not saved: {e}");
    }
}

/// One table row.
pub fn format_row(sub: &Subscription, today: chrono::NaiveDate) -> String {
    let status = subtrack_core::query::status_of(sub, today);
    format!(
        "{:>14}  {:<24}  R$ {:>9}  {}  {:<12}  {}",
        sub.id,
        sub.name,
        sub.value,
        sub.next_date,
        sub.effective_category(),
        status.label()
    )
}
