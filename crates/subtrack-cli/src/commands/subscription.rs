//! Subscription CRUD commands for CLI.

use chrono::NaiveDate;
use clap::Args;
use subtrack_core::{format_amount, parse_next_date, query, StatusFilter, SubscriptionDraft};

use crate::common::{format_row, open_tracker, warn_if_unsaved};

#[derive(Args)]
pub struct AddArgs {
    /// Subscription name
    pub name: String,
    /// Monthly value
    #[arg(long)]
    pub value: f64,
    /// Next charge date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_next_date)]
    pub next_date: NaiveDate,
    /// Category (defaults to "Geral" when grouping)
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Filter by status: all, active or overdue
    #[arg(long, default_value = "all")]
    pub status: StatusFilter,
    /// Case-insensitive name search
    #[arg(long, default_value = "")]
    pub search: String,
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Subscription ID
    pub id: i64,
    /// New name
    #[arg(long)]
    pub name: Option<String>,
    /// New monthly value
    #[arg(long)]
    pub value: Option<f64>,
    /// New next charge date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_next_date)]
    pub next_date: Option<NaiveDate>,
    /// New category (empty string clears it)
    #[arg(long)]
    pub category: Option<String>,
}

pub fn add(args: AddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (mut tracker, _) = open_tracker()?;

    let draft = SubscriptionDraft {
        name: args.name,
        value: args.value.into(),
        next_date: args.next_date,
        category: args.category,
    };
    let snapshot = tracker.add(draft)?;
    let created = snapshot.last().ok_or("subscription was not added")?;
    println!("Subscription created: {}", created.id);
    println!("{}", serde_json::to_string_pretty(created)?);
    warn_if_unsaved(&tracker);
    Ok(())
}

pub fn list(args: ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (tracker, _) = open_tracker()?;
    let today = tracker.today();
    let view = query::filter_view(tracker.subscriptions(), &args.search, args.status, today);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if view.is_empty() {
        println!("No subscriptions.");
        return Ok(());
    }
    for sub in &view {
        println!("{}", format_row(sub, today));
    }
    println!("Total: R$ {}", format_amount(query::total_monthly(view.iter().copied())));
    Ok(())
}

pub fn get(id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let (tracker, _) = open_tracker()?;
    let sub = tracker
        .get(id)
        .ok_or_else(|| format!("Subscription not found: {id}"))?;
    println!("{}", serde_json::to_string_pretty(sub)?);
    Ok(())
}

pub fn update(args: UpdateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (mut tracker, _) = open_tracker()?;
    let mut draft = tracker
        .get(args.id)
        .ok_or_else(|| format!("Subscription not found: {}", args.id))?
        .to_draft();

    if let Some(name) = args.name {
        draft.name = name;
    }
    if let Some(value) = args.value {
        draft.value = value.into();
    }
    if let Some(next_date) = args.next_date {
        draft.next_date = next_date;
    }
    if let Some(c) = args.category {
        draft.category = if c.is_empty() { None } else { Some(c) };
    }

    let snapshot = tracker.update(args.id, draft)?;
    let updated = snapshot
        .iter()
        .find(|sub| sub.id == args.id)
        .ok_or_else(|| format!("Subscription not found: {}", args.id))?;
    println!("Subscription updated:");
    println!("{}", serde_json::to_string_pretty(updated)?);
    warn_if_unsaved(&tracker);
    Ok(())
}

pub fn delete(id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let (mut tracker, _) = open_tracker()?;
    let existed = tracker.get(id).is_some();
    tracker.remove(id)?;
    if existed {
        println!("Subscription deleted: {id}");
    } else {
        println!("No subscription with id {id}");
    }
    warn_if_unsaved(&tracker);
    Ok(())
}
