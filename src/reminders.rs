use crate::models::{Reminder, Subscription};
use chrono::{Local, NaiveDate};

/// Inclusive number of days before a renewal during which a reminder fires.
pub const REMINDER_WINDOW_DAYS: i64 = 2;

pub fn due_reminders(subscriptions: &[Subscription]) -> Vec<Reminder> {
    due_reminders_at(Local::now().date_naive(), subscriptions)
}

/// Subscriptions renewing between `today` and `today + REMINDER_WINDOW_DAYS`.
///
/// Nothing is remembered between calls, so the same subscription is reported
/// on every evaluation while it stays inside the window.
pub fn due_reminders_at(today: NaiveDate, subscriptions: &[Subscription]) -> Vec<Reminder> {
    subscriptions
        .iter()
        .filter_map(|sub| {
            let days_left = (sub.date - today).num_days();
            (0..=REMINDER_WINDOW_DAYS)
                .contains(&days_left)
                .then(|| reminder_for(sub, days_left))
        })
        .collect()
}

fn reminder_for(sub: &Subscription, days_left: i64) -> Reminder {
    Reminder {
        subscription_id: sub.id.clone(),
        title: format!("Reminder: {}", sub.name),
        body: format!(
            "{} payment due on {}",
            format_price(sub.price, &sub.currency),
            sub.date.format("%Y-%m-%d")
        ),
        due_on: sub.date,
        days_left,
    }
}

pub fn format_price(price: f64, currency: &str) -> String {
    format!("{price:.2} {currency}")
}
