//! Subscription store operations

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, Params};
use tracing::{debug, info};

use super::{format_date, row_to_subscription, Database, SUBSCRIPTION_COLUMNS};
use crate::accounting;
use crate::error::{Error, Result};
use crate::models::{NewSubscription, Subscription, SubscriptionFields, SubscriptionUpdate};

impl Database {
    /// Validate and store a new subscription, assigning its id
    pub fn create_subscription(&self, new: &NewSubscription) -> Result<Subscription> {
        let fields = new.validate()?;
        let now = Utc::now();
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO subscriptions (name, amount, cycle, next_due, category, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                fields.name,
                fields.amount.to_string(),
                fields.cycle.as_str(),
                format_date(fields.next_due),
                fields.category,
                fields.notes,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;
        let id = conn.last_insert_rowid();

        info!("Created subscription {} ({})", id, fields.name);

        let SubscriptionFields {
            name,
            amount,
            cycle,
            next_due,
            category,
            notes,
        } = fields;
        Ok(Subscription {
            id,
            name,
            amount,
            cycle,
            next_due,
            category,
            notes,
            created_at: now,
            updated_at: now,
        })
    }

    /// Fetch one subscription, failing with `NotFound` for an unknown id
    pub fn get_subscription(&self, id: i64) -> Result<Subscription> {
        self.find_subscription(id)?
            .ok_or_else(|| Error::subscription_not_found(id))
    }

    /// Fetch one subscription if it exists
    pub fn find_subscription(&self, id: i64) -> Result<Option<Subscription>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM subscriptions WHERE id = ?", SUBSCRIPTION_COLUMNS);

        match conn.query_row(&sql, params![id], row_to_subscription) {
            Ok(sub) => Ok(Some(sub)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All subscriptions, soonest due first; ties keep insertion order
    pub fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        self.query_subscriptions("", [])
    }

    /// Subscriptions with `start < next_due <= end`
    pub fn subscriptions_due_between(
        &self,
        start_exclusive: NaiveDate,
        end_inclusive: NaiveDate,
    ) -> Result<Vec<Subscription>> {
        self.query_subscriptions(
            "WHERE next_due > ? AND next_due <= ?",
            params![format_date(start_exclusive), format_date(end_inclusive)],
        )
    }

    /// Subscriptions due exactly on `date`
    pub fn subscriptions_due_on(&self, date: NaiveDate) -> Result<Vec<Subscription>> {
        self.query_subscriptions("WHERE next_due = ?", params![format_date(date)])
    }

    /// Subscriptions with exactly this category label
    pub fn list_subscriptions_by_category(&self, category: &str) -> Result<Vec<Subscription>> {
        self.query_subscriptions("WHERE category = ?", params![category])
    }

    /// Case-insensitive substring match on name or category
    pub fn search_subscriptions(&self, term: &str) -> Result<Vec<Subscription>> {
        let term = term.trim();
        if term.is_empty() {
            return self.list_subscriptions();
        }
        self.query_subscriptions(
            "WHERE instr(lower(name), lower(?1)) > 0 OR instr(lower(category), lower(?1)) > 0",
            params![term],
        )
    }

    fn query_subscriptions<P: Params>(&self, filter: &str, params: P) -> Result<Vec<Subscription>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM subscriptions {} ORDER BY next_due ASC, id ASC",
            SUBSCRIPTION_COLUMNS, filter
        );
        debug!("Subscription query: {}", sql);

        let mut stmt = conn.prepare(&sql)?;
        let subscriptions = stmt
            .query_map(params, row_to_subscription)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(subscriptions)
    }

    /// Apply the supplied fields and refresh `updated_at`
    ///
    /// An update with no fields still counts as a mutation.
    pub fn update_subscription(&self, id: i64, update: &SubscriptionUpdate) -> Result<Subscription> {
        let existing = self.get_subscription(id)?;
        let fields = update.apply_to(&existing)?;
        let updated = self.write_fields(existing, fields)?;
        info!("Updated subscription {}", id);
        Ok(updated)
    }

    fn write_fields(&self, existing: Subscription, fields: SubscriptionFields) -> Result<Subscription> {
        let now = Utc::now();
        let conn = self.conn()?;

        let changed = conn.execute(
            r#"
            UPDATE subscriptions
            SET name = ?, amount = ?, cycle = ?, next_due = ?, category = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
            params![
                fields.name,
                fields.amount.to_string(),
                fields.cycle.as_str(),
                format_date(fields.next_due),
                fields.category,
                fields.notes,
                now.to_rfc3339(),
                existing.id,
            ],
        )?;
        // Deleted between read and write
        if changed == 0 {
            return Err(Error::subscription_not_found(existing.id));
        }

        Ok(Subscription {
            id: existing.id,
            name: fields.name,
            amount: fields.amount,
            cycle: fields.cycle,
            next_due: fields.next_due,
            category: fields.category,
            notes: fields.notes,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Hard delete; a second call for the same id fails with `NotFound`
    pub fn delete_subscription(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM subscriptions WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::subscription_not_found(id));
        }
        info!("Deleted subscription {}", id);
        Ok(())
    }

    /// Record a payment: move `next_due` forward one billing cycle
    ///
    /// One-time items are returned unchanged and are not written.
    pub fn mark_subscription_paid(&self, id: i64, today: NaiveDate) -> Result<Subscription> {
        let existing = self.get_subscription(id)?;
        let next_due = accounting::mark_paid(&existing, today);
        if next_due == existing.next_due {
            debug!("Subscription {} is {}, due date unchanged", id, existing.cycle);
            return Ok(existing);
        }

        let fields = SubscriptionFields {
            name: existing.name.clone(),
            amount: existing.amount,
            cycle: existing.cycle,
            next_due,
            category: existing.category.clone(),
            notes: existing.notes.clone(),
        };
        let updated = self.write_fields(existing, fields)?;
        info!("Marked subscription {} paid, next due {}", id, updated.next_due);
        Ok(updated)
    }

    pub fn count_subscriptions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM subscriptions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Remove every subscription, returning how many were deleted
    pub fn clear_subscriptions(&self) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM subscriptions", [])?;
        info!("Cleared {} subscriptions", deleted);
        Ok(deleted)
    }
}

/// Store a complete record, keeping its id and timestamps (restore path)
pub(crate) fn insert_subscription_record(conn: &Connection, sub: &Subscription) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO subscriptions (id, name, amount, cycle, next_due, category, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            sub.id,
            sub.name,
            sub.amount.to_string(),
            sub.cycle.as_str(),
            format_date(sub.next_due),
            sub.category,
            sub.notes,
            sub.created_at.to_rfc3339(),
            sub.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}
