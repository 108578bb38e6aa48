//! Database tests

use super::*;
use crate::models::*;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn new_sub(name: &str, amount: &str, cycle: &str, next_due: &str, category: &str) -> NewSubscription {
    NewSubscription {
        name: name.to_string(),
        amount: Decimal::from_str(amount).unwrap(),
        cycle: cycle.to_string(),
        next_due: date(next_due),
        category: category.to_string(),
        notes: None,
    }
}

#[test]
fn test_in_memory_db() {
    let db = Database::in_memory().unwrap();
    assert!(db.list_subscriptions().unwrap().is_empty());
    assert_eq!(db.count_subscriptions().unwrap(), 0);
    assert!(!db.is_encrypted());
}

#[test]
fn test_schema_exists() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    let columns: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('subscriptions') WHERE name IN ('id', 'name', 'amount', 'cycle', 'next_due', 'category', 'notes', 'created_at', 'updated_at')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(columns, 9, "subscriptions table should have 9 expected columns");

    let indexes: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name IN ('idx_subscriptions_next_due', 'idx_subscriptions_category')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(indexes, 2);
}

#[test]
fn test_create_and_get() {
    let db = Database::in_memory().unwrap();
    let mut new = new_sub(" Netflix ", "199.00", "monthly", "2025-01-15", "OTT");
    new.notes = Some("family plan".to_string());

    let created = db.create_subscription(&new).unwrap();
    assert!(created.id > 0);
    assert_eq!(created.name, "Netflix");
    assert_eq!(created.cycle, Cycle::Monthly);
    assert_eq!(created.created_at, created.updated_at);

    let fetched = db.get_subscription(created.id).unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.amount.to_string(), "199.00");
    assert_eq!(fetched.notes.as_deref(), Some("family plan"));
}

#[test]
fn test_create_rejects_invalid() {
    let db = Database::in_memory().unwrap();

    let err = db
        .create_subscription(&new_sub("Gym", "0", "monthly", "2025-01-01", "Fitness"))
        .unwrap_err();
    assert!(err.is_validation());

    let err = db
        .create_subscription(&new_sub("Gym", "20", "weekly", "2025-01-01", "Fitness"))
        .unwrap_err();
    assert!(err.is_validation());

    assert_eq!(db.count_subscriptions().unwrap(), 0);
}

#[test]
fn test_amount_upper_bound_on_create_and_update() {
    let db = Database::in_memory().unwrap();

    let at_bound = new_sub("Mortgage", "1000000000000", "monthly", "2025-01-01", "Housing");
    let created = db.create_subscription(&at_bound).unwrap();
    assert_eq!(created.amount, maximum_amount());

    let mut too_large = at_bound.clone();
    too_large.amount = Decimal::MAX;
    assert!(db.create_subscription(&too_large).unwrap_err().is_validation());

    let update = SubscriptionUpdate {
        amount: Some(maximum_amount() + Decimal::ONE),
        ..Default::default()
    };
    assert!(db.update_subscription(created.id, &update).unwrap_err().is_validation());
    assert_eq!(db.count_subscriptions().unwrap(), 1);

    // Two records at the bound still aggregate
    db.create_subscription(&at_bound).unwrap();
    let all = db.list_subscriptions().unwrap();
    assert_eq!(
        crate::accounting::total_monthly(&all),
        maximum_amount() * Decimal::TWO
    );
}

#[test]
fn test_get_missing_is_not_found() {
    let db = Database::in_memory().unwrap();
    let err = db.get_subscription(42).unwrap_err();
    assert!(err.is_not_found());
    assert!(db.find_subscription(42).unwrap().is_none());
}

#[test]
fn test_list_orders_by_due_then_insertion() {
    let db = Database::in_memory().unwrap();
    let late = db
        .create_subscription(&new_sub("Late", "5", "monthly", "2025-03-01", "A"))
        .unwrap();
    let first = db
        .create_subscription(&new_sub("First", "5", "monthly", "2025-02-01", "A"))
        .unwrap();
    let second = db
        .create_subscription(&new_sub("Second", "5", "monthly", "2025-02-01", "A"))
        .unwrap();

    let ids: Vec<i64> = db.list_subscriptions().unwrap().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![first.id, second.id, late.id]);
}

#[test]
fn test_update_changes_only_supplied_fields() {
    let db = Database::in_memory().unwrap();
    let mut new = new_sub("Spotify", "119", "monthly", "2025-05-05", "OTT");
    new.notes = Some("student".to_string());
    let created = db.create_subscription(&new).unwrap();

    let update = SubscriptionUpdate {
        amount: Some(Decimal::from(50)),
        ..Default::default()
    };
    let updated = db.update_subscription(created.id, &update).unwrap();

    assert_eq!(updated.amount, Decimal::from(50));
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.cycle, created.cycle);
    assert_eq!(updated.next_due, created.next_due);
    assert_eq!(updated.category, created.category);
    assert_eq!(updated.notes, created.notes);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    assert_eq!(db.get_subscription(created.id).unwrap(), updated);
}

#[test]
fn test_update_clears_notes() {
    let db = Database::in_memory().unwrap();
    let mut new = new_sub("Spotify", "119", "monthly", "2025-05-05", "OTT");
    new.notes = Some("student".to_string());
    let created = db.create_subscription(&new).unwrap();

    let update = SubscriptionUpdate {
        notes: Some(None),
        ..Default::default()
    };
    let updated = db.update_subscription(created.id, &update).unwrap();
    assert_eq!(updated.notes, None);
}

#[test]
fn test_update_validates_and_reports_missing() {
    let db = Database::in_memory().unwrap();
    let created = db
        .create_subscription(&new_sub("Cloud", "3", "monthly", "2025-05-05", "SaaS"))
        .unwrap();

    let bad = SubscriptionUpdate {
        cycle: Some("fortnightly".to_string()),
        ..Default::default()
    };
    assert!(db.update_subscription(created.id, &bad).unwrap_err().is_validation());
    assert_eq!(db.get_subscription(created.id).unwrap(), created);

    let err = db
        .update_subscription(999, &SubscriptionUpdate::default())
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_delete_then_get_fails() {
    let db = Database::in_memory().unwrap();
    let created = db
        .create_subscription(&new_sub("Gym", "25", "monthly", "2025-01-01", "Fitness"))
        .unwrap();

    db.delete_subscription(created.id).unwrap();
    assert!(db.get_subscription(created.id).unwrap_err().is_not_found());
    assert!(db.delete_subscription(created.id).unwrap_err().is_not_found());
}

#[test]
fn test_ids_not_reused_after_delete() {
    let db = Database::in_memory().unwrap();
    let a = db
        .create_subscription(&new_sub("A", "1", "monthly", "2025-01-01", "X"))
        .unwrap();
    db.delete_subscription(a.id).unwrap();
    let b = db
        .create_subscription(&new_sub("B", "1", "monthly", "2025-01-01", "X"))
        .unwrap();
    assert!(b.id > a.id);
}

#[test]
fn test_due_window_queries() {
    let db = Database::in_memory().unwrap();
    for (name, due) in [
        ("Past", "2025-03-09"),
        ("Today", "2025-03-10"),
        ("Tomorrow", "2025-03-11"),
        ("Edge", "2025-03-17"),
        ("Beyond", "2025-03-18"),
    ] {
        db.create_subscription(&new_sub(name, "1", "monthly", due, "A"))
            .unwrap();
    }

    let today = date("2025-03-10");
    let on: Vec<String> = db
        .subscriptions_due_on(today)
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(on, vec!["Today"]);

    let window: Vec<String> = db
        .subscriptions_due_between(today, date("2025-03-17"))
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(window, vec!["Tomorrow", "Edge"]);
}

#[test]
fn test_category_and_search() {
    let db = Database::in_memory().unwrap();
    db.create_subscription(&new_sub("Netflix", "199", "monthly", "2025-01-01", "OTT"))
        .unwrap();
    db.create_subscription(&new_sub("Electricity", "900", "monthly", "2025-01-02", "Utility"))
        .unwrap();
    db.create_subscription(&new_sub("Hotstar", "899", "annual", "2025-01-03", "OTT"))
        .unwrap();

    assert_eq!(db.list_subscriptions_by_category("OTT").unwrap().len(), 2);
    assert!(db.list_subscriptions_by_category("ott").unwrap().is_empty());

    let by_name = db.search_subscriptions("NETF").unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Netflix");

    let by_category = db.search_subscriptions("util").unwrap();
    assert_eq!(by_category[0].name, "Electricity");

    assert_eq!(db.search_subscriptions("  ").unwrap().len(), 3);
    assert!(db.search_subscriptions("100%").unwrap().is_empty());
}

#[test]
fn test_mark_paid_persists() {
    let db = Database::in_memory().unwrap();
    let monthly = db
        .create_subscription(&new_sub("Phone", "299", "monthly", "2025-01-01", "Recharge"))
        .unwrap();
    let annual = db
        .create_subscription(&new_sub("Domain", "800", "annual", "2025-01-01", "SaaS"))
        .unwrap();

    let today = date("2025-01-01");
    let paid = db.mark_subscription_paid(monthly.id, today).unwrap();
    assert_eq!(paid.next_due, date("2025-01-31"));
    assert_eq!(db.get_subscription(monthly.id).unwrap().next_due, date("2025-01-31"));

    let paid = db.mark_subscription_paid(annual.id, today).unwrap();
    assert_eq!(paid.next_due, date("2026-01-01"));
}

#[test]
fn test_mark_paid_one_time_is_noop() {
    let db = Database::in_memory().unwrap();
    let once = db
        .create_subscription(&new_sub("Laptop repair", "2500", "one-time", "2025-02-01", "Other"))
        .unwrap();

    let result = db.mark_subscription_paid(once.id, date("2025-02-01")).unwrap();
    assert_eq!(result, once);
    assert_eq!(db.get_subscription(once.id).unwrap().updated_at, once.updated_at);

    assert!(db
        .mark_subscription_paid(12345, date("2025-02-01"))
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_clear_subscriptions() {
    let db = Database::in_memory().unwrap();
    db.create_subscription(&new_sub("A", "1", "monthly", "2025-01-01", "X"))
        .unwrap();
    db.create_subscription(&new_sub("B", "1", "annual", "2025-01-01", "X"))
        .unwrap();
    assert_eq!(db.clear_subscriptions().unwrap(), 2);
    assert_eq!(db.count_subscriptions().unwrap(), 0);
}

#[test]
fn test_encrypted_database_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("enc.db");
    let path = path.to_str().unwrap();

    {
        let db = Database::new_with_key(path, Some("correct horse")).unwrap();
        assert!(db.is_encrypted());
        db.create_subscription(&new_sub("Vault", "9.99", "monthly", "2025-01-01", "SaaS"))
            .unwrap();
    }

    let db = Database::new_with_key(path, Some("correct horse")).unwrap();
    assert_eq!(db.list_subscriptions().unwrap()[0].name, "Vault");

    assert!(Database::new_with_key(path, Some("wrong")).is_err());
}
