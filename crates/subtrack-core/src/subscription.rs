//! Subscription entity and the draft used to create or edit one.
//!
//! A subscription is a recurring monthly charge. The stored layout uses
//! camelCase keys (`nextDate`) and ISO `YYYY-MM-DD` dates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Category used for grouping when a subscription has none.
pub const DEFAULT_CATEGORY: &str = "Geral";

/// Date format for the stored `nextDate` field and CLI input.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A recurring charge tracked by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Amount::is_missing")]
    pub value: Amount,
    pub next_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Everything about a subscription except its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Amount::is_missing")]
    pub value: Amount,
    pub next_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Monthly amount as stored.
///
/// Collections written by hand or by older builds may hold a value that is
/// not a number. It is kept verbatim, so it survives a save and is shown as
/// written, and it counts as 0 in sums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Raw(serde_json::Value),
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Raw(serde_json::Value::Null)
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount::Number(value)
    }
}

impl Amount {
    /// Numeric reading: numbers as-is, numeric text parsed, anything else 0.
    pub fn as_f64(&self) -> f64 {
        match self {
            Amount::Number(n) => *n,
            Amount::Raw(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            Amount::Raw(_) => 0.0,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Amount::Raw(serde_json::Value::Null))
    }
}

/// Numbers with two decimals, raw values as written.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Number(n) => f.pad(&format_amount(*n)),
            Amount::Raw(serde_json::Value::String(s)) => f.pad(s),
            Amount::Raw(serde_json::Value::Null) => f.pad(""),
            Amount::Raw(other) => f.pad(&other.to_string()),
        }
    }
}

/// Two decimals, exact halves rounded away from zero (`0.125` -> `0.13`).
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", (value * 100.0).round() / 100.0)
}

/// Charge status relative to a reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Overdue,
}

impl Status {
    /// Label shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Status::Active => "Ativo",
            Status::Overdue => "Vencido",
        }
    }
}

impl Subscription {
    pub fn from_draft(id: i64, draft: SubscriptionDraft) -> Self {
        Self {
            id,
            name: draft.name,
            value: draft.value,
            next_date: draft.next_date,
            category: draft.category,
        }
    }

    /// Overwrite every field except `id` with the draft's.
    pub fn apply(&mut self, draft: SubscriptionDraft) {
        self.name = draft.name;
        self.value = draft.value;
        self.next_date = draft.next_date;
        self.category = draft.category;
    }

    /// The category used for grouping: the stored one, or [`DEFAULT_CATEGORY`].
    pub fn effective_category(&self) -> &str {
        match self.category.as_deref().map(str::trim) {
            Some(cat) if !cat.is_empty() => cat,
            _ => DEFAULT_CATEGORY,
        }
    }

    /// The value used in sums. Never negative.
    pub fn effective_value(&self) -> f64 {
        let value = self.value.as_f64();
        if value.is_finite() && value > 0.0 {
            value
        } else {
            0.0
        }
    }

    pub fn to_draft(&self) -> SubscriptionDraft {
        SubscriptionDraft {
            name: self.name.clone(),
            value: self.value.clone(),
            next_date: self.next_date,
            category: self.category.clone(),
        }
    }
}

impl SubscriptionDraft {
    pub fn new(name: impl Into<String>, value: f64, next_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            value: Amount::Number(value),
            next_date,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Check the draft can enter the collection.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyName`] for a blank name and
    /// [`ValidationError::InvalidAmount`] for a negative or non-finite number.
    /// A raw stored value carried over from an existing entry is accepted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if let Amount::Number(n) = self.value {
            if !n.is_finite() || n < 0.0 {
                return Err(ValidationError::InvalidAmount(n));
            }
        }
        Ok(())
    }
}

/// Parse a user-supplied `YYYY-MM-DD` date.
pub fn parse_next_date(input: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|source| {
        ValidationError::InvalidDate {
            input: input.to_string(),
            source,
        }
    })
}
