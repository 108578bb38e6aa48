//! Domain models for Subtrack

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Category labels offered by the front-ends. Any other label is accepted.
pub const SUGGESTED_CATEGORIES: &[&str] = &[
    "OTT",
    "Utility",
    "Recharge",
    "SaaS",
    "Insurance",
    "Education",
    "Fitness",
    "Other",
];

/// Billing frequency of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cycle {
    Monthly,
    Annual,
    /// A single payment; excluded from recurring-spend projections
    OneTime,
}

impl Cycle {
    pub const ALL: [Cycle; 3] = [Cycle::Monthly, Cycle::Annual, Cycle::OneTime];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
            Self::OneTime => "one-time",
        }
    }

    /// Number of days `next_due` moves forward when a payment is recorded
    pub fn days_per_cycle(&self) -> Option<i64> {
        match self {
            Self::Monthly => Some(30),
            Self::Annual => Some(365),
            Self::OneTime => None,
        }
    }

    /// Human label for "per <unit>" phrasing
    pub fn period_label(&self) -> &'static str {
        match self {
            Self::Monthly => "month",
            Self::Annual => "year",
            Self::OneTime => "one-time payment",
        }
    }
}

impl std::str::FromStr for Cycle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "annual" => Ok(Self::Annual),
            "one-time" | "one_time" | "onetime" => Ok(Self::OneTime),
            _ => Err(format!(
                "Unknown billing cycle '{}' (expected monthly, annual or one-time)",
                s
            )),
        }
    }
}

impl std::fmt::Display for Cycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored subscription or bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub name: String,
    pub amount: Decimal,
    pub cycle: Cycle,
    pub next_due: NaiveDate,
    pub category: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a subscription (before validation)
///
/// `cycle` is kept as the raw token so an unrecognized value is reported as a
/// validation failure instead of being dropped during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubscription {
    pub name: String,
    pub amount: Decimal,
    pub cycle: String,
    pub next_due: NaiveDate,
    pub category: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Validated, normalized subscription fields ready for storage
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionFields {
    pub name: String,
    pub amount: Decimal,
    pub cycle: Cycle,
    pub next_due: NaiveDate,
    pub category: String,
    pub notes: Option<String>,
}

impl NewSubscription {
    /// Check required fields and normalize text (trimmed, empty notes dropped)
    pub fn validate(&self) -> Result<SubscriptionFields> {
        Ok(SubscriptionFields {
            name: validate_name(&self.name)?,
            amount: validate_amount(self.amount)?,
            cycle: parse_cycle(&self.cycle)?,
            next_due: self.next_due,
            category: validate_category(&self.category)?,
            notes: normalize_notes(self.notes.as_deref()),
        })
    }
}

/// Partial update: only supplied fields change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriptionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_due: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// `None` leaves notes untouched, `Some(None)` clears them
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

impl SubscriptionUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.amount.is_none()
            && self.cycle.is_none()
            && self.next_due.is_none()
            && self.category.is_none()
            && self.notes.is_none()
    }

    /// Validate supplied fields and merge them over an existing record
    pub fn apply_to(&self, existing: &Subscription) -> Result<SubscriptionFields> {
        Ok(SubscriptionFields {
            name: match &self.name {
                Some(name) => validate_name(name)?,
                None => existing.name.clone(),
            },
            amount: match self.amount {
                Some(amount) => validate_amount(amount)?,
                None => existing.amount,
            },
            cycle: match &self.cycle {
                Some(cycle) => parse_cycle(cycle)?,
                None => existing.cycle,
            },
            next_due: self.next_due.unwrap_or(existing.next_due),
            category: match &self.category {
                Some(category) => validate_category(category)?,
                None => existing.category.clone(),
            },
            notes: match &self.notes {
                Some(notes) => normalize_notes(notes.as_deref()),
                None => existing.notes.clone(),
            },
        })
    }
}

/// Distinguish an explicit `null` from an absent field
fn deserialize_present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Smallest accepted amount (one cent)
pub fn minimum_amount() -> Decimal {
    Decimal::new(1, 2)
}

/// Largest accepted amount
///
/// Keeps every monthly and annual aggregate far inside `Decimal`'s range so
/// sums over the whole collection cannot overflow.
pub fn maximum_amount() -> Decimal {
    Decimal::from(1_000_000_000_000_i64)
}

pub(crate) fn parse_cycle(token: &str) -> Result<Cycle> {
    token.parse().map_err(Error::Validation)
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

fn validate_category(category: &str) -> Result<String> {
    let category = category.trim();
    if category.is_empty() {
        return Err(Error::Validation("category must not be empty".to_string()));
    }
    Ok(category.to_string())
}

fn validate_amount(amount: Decimal) -> Result<Decimal> {
    if amount < minimum_amount() {
        return Err(Error::Validation(format!(
            "amount must be at least 0.01 (got {})",
            amount
        )));
    }
    if amount > maximum_amount() {
        return Err(Error::Validation(format!(
            "amount must be at most {} (got {})",
            maximum_amount(),
            amount
        )));
    }
    Ok(amount)
}

fn normalize_notes(notes: Option<&str>) -> Option<String> {
    notes
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Per-category aggregate for the analytics view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDetail {
    pub category: String,
    pub subscriptions: usize,
    pub monthly_cost: Decimal,
    pub annual_cost: Decimal,
    /// Share of the overall monthly total, 0-100
    pub percentage: Decimal,
}

/// Headline numbers for a dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendSummary {
    pub total_subscriptions: usize,
    pub total_monthly: Decimal,
    pub total_annual: Decimal,
    pub due_today: usize,
    pub due_soon: usize,
    pub due_soon_days: u32,
}
