//! Subscription accounting
//!
//! Pure functions over subscription records: cost normalization, due-window
//! classification and per-category aggregation. Nothing here touches the
//! database; callers load records from the store and recompute on demand.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{CategoryDetail, Cycle, SpendSummary, Subscription};

const MONTHS_PER_YEAR: i64 = 12;

/// Normalized monthly cost used to compare subscriptions across cycles
///
/// One-time charges are not recurring spend and contribute zero.
pub fn monthly_equivalent(sub: &Subscription) -> Decimal {
    match sub.cycle {
        Cycle::Monthly => sub.amount,
        Cycle::Annual => sub.amount / Decimal::from(MONTHS_PER_YEAR),
        Cycle::OneTime => Decimal::ZERO,
    }
}

/// Yearly projection of the monthly-equivalent cost
pub fn annual_equivalent(sub: &Subscription) -> Decimal {
    match sub.cycle {
        // Avoid the round trip through amount / 12
        Cycle::Annual => sub.amount,
        _ => monthly_equivalent(sub) * Decimal::from(MONTHS_PER_YEAR),
    }
}

/// Signed number of whole days from `today` until the subscription is due
pub fn days_until(sub: &Subscription, today: NaiveDate) -> i64 {
    (sub.next_due - today).num_days()
}

/// Records due exactly on `today`
pub fn due_today(subs: &[Subscription], today: NaiveDate) -> Vec<&Subscription> {
    subs.iter().filter(|s| s.next_due == today).collect()
}

/// Records due after `today` and no later than `today + days`
///
/// Items due today or already overdue are excluded, so `days = 0` is always
/// empty.
pub fn due_within(subs: &[Subscription], today: NaiveDate, days: u32) -> Vec<&Subscription> {
    let end = window_end(today, days);
    subs.iter()
        .filter(|s| s.next_due > today && s.next_due <= end)
        .collect()
}

/// Last date (inclusive) of a due window starting after `today`
pub fn window_end(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Monthly-equivalent spend summed per category
///
/// Only categories that appear in `subs` are present. Values carry no
/// trailing zeros.
pub fn category_breakdown(subs: &[Subscription]) -> BTreeMap<String, Decimal> {
    let mut breakdown: BTreeMap<String, Decimal> = BTreeMap::new();
    for sub in subs {
        *breakdown.entry(sub.category.clone()).or_default() += monthly_equivalent(sub);
    }
    for value in breakdown.values_mut() {
        *value = value.normalize();
    }
    breakdown
}

/// Total monthly-equivalent spend; always equal to the breakdown's sum
pub fn total_monthly(subs: &[Subscription]) -> Decimal {
    category_breakdown(subs).values().sum::<Decimal>().normalize()
}

/// Count, monthly, annual and share of total for each category, by name
pub fn category_details(subs: &[Subscription]) -> Vec<CategoryDetail> {
    let breakdown = category_breakdown(subs);
    let total: Decimal = breakdown.values().sum();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for sub in subs {
        *counts.entry(sub.category.as_str()).or_default() += 1;
    }

    breakdown
        .into_iter()
        .map(|(category, monthly)| {
            let percentage = if total.is_zero() {
                Decimal::ZERO
            } else {
                (monthly / total * Decimal::ONE_HUNDRED).round_dp(2)
            };
            CategoryDetail {
                subscriptions: counts.get(category.as_str()).copied().unwrap_or(0),
                annual_cost: (monthly * Decimal::from(MONTHS_PER_YEAR)).normalize(),
                monthly_cost: monthly,
                percentage,
                category,
            }
        })
        .collect()
}

/// Headline numbers for a dashboard as of `today`
pub fn spend_summary(subs: &[Subscription], today: NaiveDate, window_days: u32) -> SpendSummary {
    let total = total_monthly(subs);
    SpendSummary {
        total_subscriptions: subs.len(),
        total_monthly: total,
        total_annual: (total * Decimal::from(MONTHS_PER_YEAR)).normalize(),
        due_today: due_today(subs, today).len(),
        due_soon: due_within(subs, today, window_days).len(),
        due_soon_days: window_days,
    }
}

/// Due date after recording a payment: one cycle past the current due date
///
/// Monthly moves 30 days and annual 365 days. One-time items keep their date.
pub fn mark_paid(sub: &Subscription, today: NaiveDate) -> NaiveDate {
    let Some(days) = sub.cycle.days_per_cycle() else {
        return sub.next_due;
    };

    let overdue = days_until(sub, today);
    if overdue < 0 {
        debug!(
            "Subscription {} paid {} day(s) after due date",
            sub.id, -overdue
        );
    }

    sub.next_due
        .checked_add_days(Days::new(days.unsigned_abs()))
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quickcheck_macros::quickcheck;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sub(id: i64, amount: &str, cycle: Cycle, next_due: &str, category: &str) -> Subscription {
        let now = Utc::now();
        Subscription {
            id,
            name: format!("Sub {}", id),
            amount: Decimal::from_str(amount).unwrap(),
            cycle,
            next_due: date(next_due),
            category: category.to_string(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn cents(raw: u32) -> Decimal {
        Decimal::new(i64::from(raw % 10_000_000) + 1, 2)
    }

    fn cycle_from(raw: u8) -> Cycle {
        Cycle::ALL[usize::from(raw) % Cycle::ALL.len()]
    }

    #[test]
    fn test_monthly_equivalent_per_cycle() {
        let monthly = sub(1, "199", Cycle::Monthly, "2025-01-01", "OTT");
        let annual = sub(2, "1200", Cycle::Annual, "2025-01-01", "OTT");
        let once = sub(3, "5000", Cycle::OneTime, "2025-01-01", "Other");

        assert_eq!(monthly_equivalent(&monthly), Decimal::from(199));
        assert_eq!(monthly_equivalent(&annual), Decimal::from(100));
        assert_eq!(monthly_equivalent(&once), Decimal::ZERO);
    }

    #[test]
    fn test_annual_equivalent() {
        let monthly = sub(1, "10.50", Cycle::Monthly, "2025-01-01", "SaaS");
        let annual = sub(2, "99.99", Cycle::Annual, "2025-01-01", "SaaS");
        assert_eq!(annual_equivalent(&monthly), Decimal::from_str("126.00").unwrap());
        assert_eq!(annual_equivalent(&annual), Decimal::from_str("99.99").unwrap());
    }

    #[test]
    fn test_category_breakdown_mixed_cycles() {
        let subs = vec![
            sub(1, "1200", Cycle::Annual, "2025-01-01", "OTT"),
            sub(2, "100", Cycle::Monthly, "2025-01-05", "OTT"),
        ];
        let breakdown = category_breakdown(&subs);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown["OTT"], Decimal::from(200));
        assert_eq!(total_monthly(&subs), Decimal::from(200));
    }

    #[test]
    fn test_category_breakdown_has_no_zero_fill() {
        let subs = vec![sub(1, "10", Cycle::Monthly, "2025-01-01", "Utility")];
        let breakdown = category_breakdown(&subs);
        assert!(!breakdown.contains_key("OTT"));
        assert!(category_breakdown(&[]).is_empty());
        assert_eq!(total_monthly(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_one_time_category_is_present_with_zero() {
        let subs = vec![sub(1, "300", Cycle::OneTime, "2025-01-01", "Insurance")];
        assert_eq!(category_breakdown(&subs)["Insurance"], Decimal::ZERO);
    }

    #[test]
    fn test_due_today_and_due_within() {
        let today = date("2025-03-10");
        let subs = vec![
            sub(1, "1", Cycle::Monthly, "2025-03-09", "A"),
            sub(2, "1", Cycle::Monthly, "2025-03-10", "A"),
            sub(3, "1", Cycle::Monthly, "2025-03-11", "A"),
            sub(4, "1", Cycle::Monthly, "2025-03-17", "A"),
            sub(5, "1", Cycle::Monthly, "2025-03-18", "A"),
        ];

        let today_ids: Vec<i64> = due_today(&subs, today).iter().map(|s| s.id).collect();
        assert_eq!(today_ids, vec![2]);

        let soon_ids: Vec<i64> = due_within(&subs, today, 7).iter().map(|s| s.id).collect();
        assert_eq!(soon_ids, vec![3, 4]);

        assert!(due_within(&subs, today, 0).is_empty());
    }

    #[test]
    fn test_days_until() {
        let s = sub(1, "1", Cycle::Monthly, "2025-03-15", "A");
        assert_eq!(days_until(&s, date("2025-03-10")), 5);
        assert_eq!(days_until(&s, date("2025-03-20")), -5);
    }

    #[test]
    fn test_mark_paid_advances_by_cycle() {
        let today = date("2025-01-01");
        let monthly = sub(1, "199", Cycle::Monthly, "2025-01-01", "OTT");
        let annual = sub(2, "1200", Cycle::Annual, "2025-01-01", "OTT");
        let once = sub(3, "50", Cycle::OneTime, "2025-01-01", "Other");

        assert_eq!(mark_paid(&monthly, today), date("2025-01-31"));
        assert_eq!(mark_paid(&annual, today), date("2026-01-01"));
        assert_eq!(mark_paid(&once, today), date("2025-01-01"));
    }

    #[test]
    fn test_mark_paid_counts_from_due_date_not_today() {
        let late = sub(1, "10", Cycle::Monthly, "2025-01-01", "Utility");
        assert_eq!(mark_paid(&late, date("2025-01-20")), date("2025-01-31"));
    }

    #[test]
    fn test_category_details() {
        let subs = vec![
            sub(1, "300", Cycle::Monthly, "2025-01-01", "Utility"),
            sub(2, "1200", Cycle::Annual, "2025-01-01", "OTT"),
            sub(3, "100", Cycle::Monthly, "2025-01-01", "Utility"),
        ];
        let details = category_details(&subs);
        assert_eq!(details.len(), 2);

        assert_eq!(details[0].category, "OTT");
        assert_eq!(details[0].subscriptions, 1);
        assert_eq!(details[0].monthly_cost, Decimal::from(100));
        assert_eq!(details[0].annual_cost, Decimal::from(1200));
        assert_eq!(details[0].percentage, Decimal::from(20));

        assert_eq!(details[1].category, "Utility");
        assert_eq!(details[1].subscriptions, 2);
        assert_eq!(details[1].monthly_cost, Decimal::from(400));
        assert_eq!(details[1].percentage, Decimal::from(80));
    }

    #[test]
    fn test_category_details_zero_total() {
        let subs = vec![sub(1, "40", Cycle::OneTime, "2025-01-01", "Other")];
        let details = category_details(&subs);
        assert_eq!(details[0].percentage, Decimal::ZERO);
    }

    #[test]
    fn test_spend_summary() {
        let today = date("2025-06-01");
        let subs = vec![
            sub(1, "10", Cycle::Monthly, "2025-06-01", "SaaS"),
            sub(2, "120", Cycle::Annual, "2025-06-05", "SaaS"),
            sub(3, "7", Cycle::OneTime, "2025-07-01", "Other"),
        ];
        let summary = spend_summary(&subs, today, 7);
        assert_eq!(summary.total_subscriptions, 3);
        assert_eq!(summary.total_monthly, Decimal::from(20));
        assert_eq!(summary.total_annual, Decimal::from(240));
        assert_eq!(summary.due_today, 1);
        assert_eq!(summary.due_soon, 1);
        assert_eq!(summary.due_soon_days, 7);
    }

    #[quickcheck]
    fn prop_monthly_cycle_is_identity(raw: u32) -> bool {
        let mut s = sub(1, "1", Cycle::Monthly, "2025-01-01", "A");
        s.amount = cents(raw);
        monthly_equivalent(&s) == s.amount
    }

    #[quickcheck]
    fn prop_annual_cycle_is_twelfth(raw: u32) -> bool {
        let mut s = sub(1, "1", Cycle::Annual, "2025-01-01", "A");
        s.amount = cents(raw);
        monthly_equivalent(&s) == s.amount / Decimal::from(12)
    }

    #[quickcheck]
    fn prop_one_time_is_zero(raw: u32) -> bool {
        let mut s = sub(1, "1", Cycle::OneTime, "2025-01-01", "A");
        s.amount = cents(raw);
        monthly_equivalent(&s).is_zero()
    }

    #[quickcheck]
    fn prop_total_matches_breakdown(items: Vec<(u32, u8, u8)>) -> bool {
        let subs: Vec<Subscription> = items
            .iter()
            .enumerate()
            .map(|(i, (raw, cycle, category))| {
                let mut s = sub(i as i64, "1", cycle_from(*cycle), "2025-01-01", "A");
                s.amount = cents(*raw);
                s.category = format!("cat-{}", category % 5);
                s
            })
            .collect();
        let breakdown_sum: Decimal = category_breakdown(&subs).values().sum();
        total_monthly(&subs) == breakdown_sum
    }

    #[test]
    fn test_aggregates_at_maximum_amount() {
        let max = crate::models::maximum_amount().to_string();
        let subs: Vec<Subscription> = (0..1_000)
            .map(|i| {
                let cycle = if i % 2 == 0 { Cycle::Monthly } else { Cycle::Annual };
                sub(i, &max, cycle, "2025-01-01", "Housing")
            })
            .collect();

        let breakdown = category_breakdown(&subs);
        assert_eq!(breakdown.len(), 1);
        assert!(breakdown["Housing"] > Decimal::from(500) * crate::models::maximum_amount());

        let details = category_details(&subs);
        assert_eq!(details[0].subscriptions, 1_000);
        assert_eq!(details[0].percentage, Decimal::ONE_HUNDRED);

        let summary = spend_summary(&subs, date("2025-01-01"), 7);
        assert_eq!(summary.due_today, 1_000);
        assert_eq!(summary.total_monthly, total_monthly(&subs));
    }

    #[test]
    fn test_aggregates_drop_trailing_zeros() {
        let subs = vec![
            sub(1, "1200.00", Cycle::Annual, "2025-01-01", "OTT"),
            sub(2, "100.00", Cycle::Monthly, "2025-01-01", "OTT"),
        ];

        assert_eq!(category_breakdown(&subs)["OTT"].to_string(), "200");
        assert_eq!(total_monthly(&subs).to_string(), "200");

        let details = category_details(&subs);
        assert_eq!(details[0].monthly_cost.to_string(), "200");
        assert_eq!(details[0].annual_cost.to_string(), "2400");

        let summary = spend_summary(&subs, date("2025-01-01"), 7);
        assert_eq!(summary.total_annual.to_string(), "2400");
    }

    #[quickcheck]
    fn prop_due_today_and_due_within_are_disjoint(offsets: Vec<i16>, days: u16) -> bool {
        let today = date("2025-06-15");
        let subs: Vec<Subscription> = offsets
            .iter()
            .enumerate()
            .map(|(i, offset)| {
                let mut s = sub(i as i64, "1", Cycle::Monthly, "2025-06-15", "A");
                s.next_due = today + chrono::Duration::days(i64::from(*offset));
                s
            })
            .collect();

        let today_ids: Vec<i64> = due_today(&subs, today).iter().map(|s| s.id).collect();
        due_within(&subs, today, u32::from(days))
            .iter()
            .all(|s| !today_ids.contains(&s.id))
    }
}
