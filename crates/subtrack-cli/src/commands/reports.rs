//! Report command implementations

use anyhow::Result;
use chrono::NaiveDate;
use subtrack_core::db::Database;
use subtrack_core::insights::{self, format_money};
use subtrack_core::{accounting, Subscription};

use super::subscriptions::print_table;
use super::truncate;

pub fn cmd_due(db: &Database, today: NaiveDate, days: u32) -> Result<()> {
    let subscriptions = db.list_subscriptions()?;
    let due_today = accounting::due_today(&subscriptions, today);
    let due_soon = accounting::due_within(&subscriptions, today, days);

    if due_today.is_empty() {
        println!("✅ Nothing due today ({})", today);
    } else {
        print_table(&format!("🔔 Due today ({})", today), &due_today);
    }

    if due_soon.is_empty() {
        println!("   Nothing else due in the next {} day(s)", days);
    } else {
        println!();
        println!("📅 Due in the next {} day(s)", days);
        println!("   ─────────────────────────────────────────────────────────────────────────");
        for sub in due_soon {
            println!(
                "   #{:<4} {:20} │ {:>10}/{:<8} │ {} ({})",
                sub.id,
                truncate(&sub.name, 20),
                format_money(sub.amount),
                sub.cycle.as_str(),
                sub.next_due,
                due_in_label(accounting::days_until(sub, today))
            );
        }
    }

    Ok(())
}

/// Human label for a signed day count from `days_until`
pub fn due_in_label(days: i64) -> String {
    let plural = |n: i64| if n == 1 { "day" } else { "days" };
    match days {
        0 => "today".to_string(),
        d if d > 0 => format!("in {} {}", d, plural(d)),
        d => format!("{} {} overdue", -d, plural(-d)),
    }
}

pub fn cmd_summary(db: &Database) -> Result<()> {
    let subscriptions = db.list_subscriptions()?;

    if subscriptions.is_empty() {
        println!("No subscriptions yet.");
        return Ok(());
    }

    println!();
    println!("💰 Monthly spend by category");
    println!("   ─────────────────────────────────────────────────────────────");

    for detail in accounting::category_details(&subscriptions) {
        println!(
            "   {:20} │ {:>3} item(s) │ {:>10}/month │ {:>10}/year │ {:>6}%",
            truncate(&detail.category, 20),
            detail.subscriptions,
            format_money(detail.monthly_cost),
            format_money(detail.annual_cost),
            detail.percentage
        );
    }

    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Total: {}/month, {}/year",
        format_money(accounting::total_monthly(&subscriptions)),
        format_money(subscriptions.iter().map(accounting::annual_equivalent).sum())
    );

    Ok(())
}

pub fn cmd_insight(db: &Database, id: i64) -> Result<()> {
    let sub = db.get_subscription(id)?;
    let same_category = db.list_subscriptions_by_category(&sub.category)?;
    let text = insights::insight_for(&sub, &same_category);

    println!("💡 {}", text);
    Ok(())
}

pub fn cmd_dashboard(db: &Database, today: NaiveDate, days: u32) -> Result<()> {
    let subscriptions = db.list_subscriptions()?;
    let summary = accounting::spend_summary(&subscriptions, today, days);

    println!();
    println!("📊 Subtrack dashboard ({})", today);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Subscriptions:   {}", summary.total_subscriptions);
    println!("   Monthly spend:   {}", format_money(summary.total_monthly));
    println!("   Annual spend:    {}", format_money(summary.total_annual));
    println!("   Due today:       {}", summary.due_today);
    println!(
        "   Due in {} day(s): {}",
        summary.due_soon_days, summary.due_soon
    );

    let upcoming: Vec<&Subscription> = accounting::due_today(&subscriptions, today)
        .into_iter()
        .chain(accounting::due_within(&subscriptions, today, days))
        .collect();
    if !upcoming.is_empty() {
        print_table("📅 Coming up", &upcoming);
    }

    let insights = insights::dashboard_insights(&subscriptions, today);
    if !insights.is_empty() {
        println!();
        println!("💡 Insights");
        for insight in insights {
            println!("   • {}", insight.message);
        }
    }

    Ok(())
}
