use clap::Args;
use subtrack_core::{format_amount, query, StatusFilter};

use crate::common::open_tracker;

#[derive(Args)]
pub struct SummaryArgs {
    /// Filter by status: all, active or overdue
    #[arg(long, default_value = "all")]
    pub status: StatusFilter,
    /// Case-insensitive name search
    #[arg(long, default_value = "")]
    pub search: String,
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: SummaryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (tracker, config) = open_tracker()?;
    let today = tracker.today();
    let view = query::filter_view(tracker.subscriptions(), &args.search, args.status, today);
    let summary = query::summarize(&view, today, config.alerts.horizon_days);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Subscriptions: {}", summary.count);
    println!("Monthly total: R$ {}", format_amount(summary.total_monthly));
    println!("Overdue: {}", summary.overdue_count);

    if !summary.by_category.is_empty() {
        println!();
        println!("By category:");
        for entry in &summary.by_category {
            println!("  {:<16} R$ {:>9}", entry.category, format_amount(entry.total));
        }
    }

    println!();
    println!("Due in the next {} days:", config.alerts.horizon_days);
    if summary.upcoming.is_empty() {
        println!("  nothing");
    }
    for sub in &summary.upcoming {
        println!(
            "  {:<24} R$ {:>9}  {} (in {} days)",
            sub.name,
            sub.value,
            sub.next_date,
            query::days_until(sub, today)
        );
    }
    Ok(())
}
