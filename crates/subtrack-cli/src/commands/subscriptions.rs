//! Subscription command implementations

use anyhow::Result;
use chrono::NaiveDate;
use subtrack_core::db::Database;
use subtrack_core::models::{NewSubscription, Subscription, SubscriptionUpdate};
use subtrack_core::{accounting, insights::format_money};

use super::{parse_amount_arg, parse_date_arg, truncate};

/// Optional field changes collected from `subscriptions update`
#[derive(Debug, Default)]
pub struct UpdateArgs {
    pub name: Option<String>,
    pub amount: Option<String>,
    pub cycle: Option<String>,
    pub due: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub clear_notes: bool,
}

impl UpdateArgs {
    fn into_update(self) -> Result<SubscriptionUpdate> {
        let notes = if self.clear_notes {
            Some(None)
        } else {
            self.notes.map(Some)
        };

        Ok(SubscriptionUpdate {
            name: self.name,
            amount: self.amount.as_deref().map(parse_amount_arg).transpose()?,
            cycle: self.cycle,
            next_due: self
                .due
                .as_deref()
                .map(|d| parse_date_arg(d, "--due"))
                .transpose()?,
            category: self.category,
            notes,
        })
    }
}

/// Print one subscription as a table row
pub(crate) fn print_row(sub: &Subscription) {
    println!(
        "   #{:<4} {:20} │ {:>10}/{:<8} │ due {} │ {}",
        sub.id,
        truncate(&sub.name, 20),
        format_money(sub.amount),
        sub.cycle.as_str(),
        sub.next_due,
        truncate(&sub.category, 16)
    );
}

pub(crate) fn print_table(title: &str, subs: &[&Subscription]) {
    println!();
    println!("{}", title);
    println!("   ─────────────────────────────────────────────────────────────────────────");
    for sub in subs {
        print_row(sub);
    }
}

fn print_detail(sub: &Subscription) {
    println!("   ID:        {}", sub.id);
    println!("   Name:      {}", sub.name);
    println!("   Amount:    {} ({})", format_money(sub.amount), sub.cycle);
    println!("   Monthly:   {}", format_money(accounting::monthly_equivalent(sub)));
    println!("   Next due:  {}", sub.next_due);
    println!("   Category:  {}", sub.category);
    if let Some(notes) = &sub.notes {
        println!("   Notes:     {}", notes);
    }
}

pub fn cmd_subscriptions_list(db: &Database) -> Result<()> {
    let subscriptions = db.list_subscriptions()?;

    if subscriptions.is_empty() {
        println!("No subscriptions yet. Add one with:");
        println!("  subtrack subscriptions add --name Netflix --amount 199 --due 2025-05-01 --category OTT");
        return Ok(());
    }

    let rows: Vec<&Subscription> = subscriptions.iter().collect();
    print_table("📋 Subscriptions", &rows);
    println!();
    println!(
        "   {} subscription(s), {} per month",
        subscriptions.len(),
        format_money(accounting::total_monthly(&subscriptions))
    );

    Ok(())
}

pub fn cmd_subscriptions_add(
    db: &Database,
    name: &str,
    amount: &str,
    cycle: &str,
    due: &str,
    category: &str,
    notes: Option<&str>,
) -> Result<()> {
    let new = NewSubscription {
        name: name.to_string(),
        amount: parse_amount_arg(amount)?,
        cycle: cycle.to_string(),
        next_due: parse_date_arg(due, "--due")?,
        category: category.to_string(),
        notes: notes.map(String::from),
    };

    let sub = db.create_subscription(&new)?;
    println!("✅ Added subscription #{}: {}", sub.id, sub.name);
    print_detail(&sub);

    Ok(())
}

pub fn cmd_subscriptions_show(db: &Database, id: i64) -> Result<()> {
    let sub = db.get_subscription(id)?;
    println!();
    print_detail(&sub);
    Ok(())
}

pub fn cmd_subscriptions_update(db: &Database, id: i64, args: UpdateArgs) -> Result<()> {
    let update = args.into_update()?;
    if update.is_empty() {
        db.get_subscription(id)?;
        println!("Nothing to change. Pass at least one field flag (see --help).");
        return Ok(());
    }

    let sub = db.update_subscription(id, &update)?;
    println!("✅ Updated subscription #{}", sub.id);
    print_detail(&sub);

    Ok(())
}

pub fn cmd_subscriptions_delete(db: &Database, id: i64) -> Result<()> {
    db.delete_subscription(id)?;
    println!("🗑️  Deleted subscription #{}", id);
    Ok(())
}

pub fn cmd_subscriptions_paid(db: &Database, id: i64, today: NaiveDate) -> Result<()> {
    let before = db.get_subscription(id)?;
    let sub = db.mark_subscription_paid(id, today)?;

    if sub.next_due == before.next_due {
        println!(
            "✅ Recorded payment for {} ({} has no next due date)",
            sub.name,
            sub.cycle.period_label()
        );
    } else {
        println!(
            "✅ Recorded payment for {}: next due {} → {}",
            sub.name, before.next_due, sub.next_due
        );
    }

    Ok(())
}

pub fn cmd_subscriptions_search(db: &Database, term: &str) -> Result<()> {
    let matches = db.search_subscriptions(term)?;

    if matches.is_empty() {
        println!("No subscriptions match '{}'", term);
        return Ok(());
    }

    let rows: Vec<&Subscription> = matches.iter().collect();
    print_table(&format!("🔎 Matches for '{}'", term), &rows);
    Ok(())
}
