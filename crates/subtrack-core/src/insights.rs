//! Insight text
//!
//! Insights are deterministic sentences filled in from the accounting
//! aggregates. No model or inference is involved: the same records always
//! produce the same text.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accounting::{category_breakdown, due_within, monthly_equivalent, total_monthly};
use crate::models::{Cycle, Subscription};

/// Window used by the upcoming-renewals insight
pub const RENEWAL_WINDOW_DAYS: u32 = 7;

/// Renewal count that must be exceeded before the renewals insight appears
pub const RENEWAL_ALERT_THRESHOLD: usize = 3;

/// Which dashboard sentence an [`Insight`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    TopCategory,
    AnnualPlans,
    UpcomingRenewals,
    TotalSpend,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopCategory => "top_category",
            Self::AnnualPlans => "annual_plans",
            Self::UpcomingRenewals => "upcoming_renewals",
            Self::TotalSpend => "total_spend",
        }
    }
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
}

impl Insight {
    fn new(kind: InsightKind, message: String) -> Self {
        Self { kind, message }
    }
}

/// Amount rendered with two decimals
pub fn format_money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// One-sentence summary of a subscription against its category's spend
///
/// `category_subs` may contain records from other categories; only those
/// sharing `sub.category` are summed.
pub fn insight_for(sub: &Subscription, category_subs: &[Subscription]) -> String {
    let category_total: Decimal = category_subs
        .iter()
        .filter(|s| s.category == sub.category)
        .map(monthly_equivalent)
        .sum();

    let cost = match sub.cycle {
        Cycle::OneTime => format!("{} as a one-time payment", format_money(sub.amount)),
        cycle => format!("{} per {}", format_money(sub.amount), cycle.period_label()),
    };

    format!(
        "You spend {} per month on {}. {} costs {}.",
        format_money(category_total),
        sub.category,
        sub.name,
        cost
    )
}

/// Summary sentences for a dashboard, in display order
pub fn dashboard_insights(subs: &[Subscription], today: NaiveDate) -> Vec<Insight> {
    if subs.is_empty() {
        return Vec::new();
    }

    let mut insights = Vec::new();

    // Ties resolve to the alphabetically first category
    let mut top: Option<(String, Decimal)> = None;
    for (category, monthly) in category_breakdown(subs) {
        if top.as_ref().map_or(true, |(_, best)| monthly > *best) {
            top = Some((category, monthly));
        }
    }
    if let Some((category, monthly)) = top {
        insights.push(Insight::new(
            InsightKind::TopCategory,
            format!(
                "Your highest spending category is {} ({}/month)",
                category,
                format_money(monthly)
            ),
        ));
    }

    let annual_count = subs.iter().filter(|s| s.cycle == Cycle::Annual).count();
    if annual_count > 0 {
        insights.push(Insight::new(
            InsightKind::AnnualPlans,
            format!(
                "You have {} annual subscription{}. Consider switching to monthly for better cash flow.",
                annual_count,
                if annual_count == 1 { "" } else { "s" }
            ),
        ));
    }

    let renewals = due_within(subs, today, RENEWAL_WINDOW_DAYS).len();
    if renewals > RENEWAL_ALERT_THRESHOLD {
        insights.push(Insight::new(
            InsightKind::UpcomingRenewals,
            format!(
                "You have {} renewals in the next {} days. Budget accordingly!",
                renewals, RENEWAL_WINDOW_DAYS
            ),
        ));
    }

    insights.push(Insight::new(
        InsightKind::TotalSpend,
        format!(
            "Your total monthly subscription cost is {}",
            format_money(total_monthly(subs))
        ),
    ));

    insights
}
