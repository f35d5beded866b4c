//! Pure aggregation and filtering over subscription collections.
//!
//! Nothing here touches storage or the clock: the caller passes `today`.
//! Status and window checks are done on calendar dates:
//!
//! - overdue: `next_date < today`
//! - upcoming: `today <= next_date <= today + horizon_days`
//!
//! so an entry is never both overdue and upcoming for the same `today`.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::subscription::{Status, Subscription};

/// Default lookahead window for upcoming charges, in days.
pub const DEFAULT_HORIZON_DAYS: i64 = 7;

/// Status filter applied to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Overdue,
}

impl StatusFilter {
    pub fn matches(self, sub: &Subscription, today: NaiveDate) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !is_overdue(sub, today),
            StatusFilter::Overdue => is_overdue(sub, today),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "todas" => Ok(StatusFilter::All),
            "active" | "ativo" => Ok(StatusFilter::Active),
            "overdue" | "vencido" => Ok(StatusFilter::Overdue),
            other => Err(ValidationError::InvalidValue {
                field: "status".into(),
                message: format!("expected all, active or overdue, got '{other}'"),
            }),
        }
    }
}

/// Per-category sum, in first-occurrence order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Dashboard aggregate over a (possibly filtered) view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub total_monthly: f64,
    pub by_category: Vec<CategoryTotal>,
    pub upcoming: Vec<Subscription>,
    pub overdue_count: usize,
}

/// Sum of effective values. Zero for an empty input.
pub fn total_monthly<'a, I>(subs: I) -> f64
where
    I: IntoIterator<Item = &'a Subscription>,
{
    subs.into_iter().map(Subscription::effective_value).sum()
}

/// Sum effective values per effective category.
pub fn group_by_category<'a, I>(subs: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a Subscription>,
{
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for sub in subs {
        let category = sub.effective_category();
        match totals.iter_mut().find(|t| t.category == category) {
            Some(entry) => entry.total += sub.effective_value(),
            None => totals.push(CategoryTotal {
                category: category.to_string(),
                total: sub.effective_value(),
            }),
        }
    }
    totals
}

pub fn is_overdue(sub: &Subscription, today: NaiveDate) -> bool {
    sub.next_date < today
}

pub fn status_of(sub: &Subscription, today: NaiveDate) -> Status {
    if is_overdue(sub, today) {
        Status::Overdue
    } else {
        Status::Active
    }
}

/// Days from `today` to the next charge; negative when overdue.
pub fn days_until(sub: &Subscription, today: NaiveDate) -> i64 {
    (sub.next_date - today).num_days()
}

/// Last day of the lookahead window. `None` when it lies past the last
/// representable date, meaning the window has no upper bound.
fn window_end(today: NaiveDate, horizon_days: i64) -> Option<NaiveDate> {
    match Duration::try_days(horizon_days).and_then(|span| today.checked_add_signed(span)) {
        Some(end) => Some(end),
        None if horizon_days < 0 => Some(NaiveDate::MIN),
        None => None,
    }
}

fn in_window(sub: &Subscription, today: NaiveDate, end: Option<NaiveDate>) -> bool {
    !is_overdue(sub, today) && end.map_or(true, |end| sub.next_date <= end)
}

/// Entries due within `[today, today + horizon_days]`.
pub fn upcoming(subs: &[Subscription], today: NaiveDate, horizon_days: i64) -> Vec<&Subscription> {
    let end = window_end(today, horizon_days);
    subs.iter().filter(|sub| in_window(sub, today, end)).collect()
}

/// Keep entries matching `status`, preserving order.
pub fn filter_by_status(
    subs: &[Subscription],
    status: StatusFilter,
    today: NaiveDate,
) -> Vec<&Subscription> {
    subs.iter()
        .filter(|sub| status.matches(sub, today))
        .collect()
}

/// Case-insensitive substring match on the name. Empty query matches all.
pub fn filter_by_name<'a>(subs: &'a [Subscription], query: &str) -> Vec<&'a Subscription> {
    let needle = query.to_lowercase();
    subs.iter()
        .filter(|sub| sub.name.to_lowercase().contains(&needle))
        .collect()
}

/// Name search followed by status filter, the listing view.
pub fn filter_view<'a>(
    subs: &'a [Subscription],
    query: &str,
    status: StatusFilter,
    today: NaiveDate,
) -> Vec<&'a Subscription> {
    let needle = query.to_lowercase();
    subs.iter()
        .filter(|sub| sub.name.to_lowercase().contains(&needle))
        .filter(|sub| status.matches(sub, today))
        .collect()
}

pub fn summarize(subs: &[&Subscription], today: NaiveDate, horizon_days: i64) -> Summary {
    let end = window_end(today, horizon_days);
    Summary {
        count: subs.len(),
        total_monthly: total_monthly(subs.iter().copied()),
        by_category: group_by_category(subs.iter().copied()),
        upcoming: subs
            .iter()
            .filter(|sub| in_window(sub, today, end))
            .map(|sub| (*sub).clone())
            .collect(),
        overdue_count: subs.iter().filter(|sub| is_overdue(sub, today)).count(),
    }
}
