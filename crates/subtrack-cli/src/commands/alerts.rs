use clap::Subcommand;
use subtrack_core::{Config, NotificationHost, Permission};

use crate::common::open_tracker;

#[derive(Subcommand)]
pub enum AlertsAction {
    /// Evaluate reminders now
    Check,
    /// Allow reminders to be shown
    Enable,
    /// Never show reminders
    Disable,
    /// Show permission and alert settings
    Status,
}

pub fn run(action: AlertsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AlertsAction::Check => {
            // Opening the tracker already runs one evaluation.
            let (tracker, _) = open_tracker()?;
            let permission = tracker.alerter().host().permission();
            let shown = tracker.last_alerts().len();
            let horizon = tracker.alerter().horizon_days();
            match permission {
                Permission::Granted => println!("{shown} reminder(s) shown (next {horizon} days)"),
                Permission::Denied => println!("reminders are disabled (run `subtrack alerts enable`)"),
                Permission::Default => println!("reminders not permitted yet (run `subtrack alerts enable`)"),
            }
        }
        AlertsAction::Enable => set_permission(Permission::Granted)?,
        AlertsAction::Disable => set_permission(Permission::Denied)?,
        AlertsAction::Status => {
            let config = Config::load()?;
            println!("permission: {}", permission_name(config.alerts.permission));
            println!("enabled: {}", config.alerts.enabled);
            println!("horizon_days: {}", config.alerts.horizon_days);
        }
    }
    Ok(())
}

fn set_permission(permission: Permission) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    config.alerts.permission = permission;
    config.save()?;
    println!("permission: {}", permission_name(permission));
    Ok(())
}

fn permission_name(permission: Permission) -> &'static str {
    match permission {
        Permission::Default => "default",
        Permission::Granted => "granted",
        Permission::Denied => "denied",
    }
}
