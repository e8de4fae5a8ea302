use crate::models::{Category, CategorySlice, Subscription, SummaryResponse};

const PALETTE: [&str; 7] = [
    "#6c5ce7", "#00cec9", "#ff7675", "#a29bfe", "#fab1a0", "#fdcb6e", "#e17055",
];
const EMPTY_LABEL: &str = "No expenses";
const EMPTY_COLOR: &str = "#2d3436";
const UNCATEGORIZED_LABEL: &str = "Uncategorized";

pub fn total_monthly(subscriptions: &[Subscription]) -> f64 {
    subscriptions.iter().map(Subscription::monthly_equivalent).sum()
}

pub fn total_yearly(subscriptions: &[Subscription]) -> f64 {
    total_monthly(subscriptions) * 12.0
}

/// Monthly-equivalent spend per category string, in first-seen order. A
/// missing category is its own bucket, separate from an empty name.
///
/// An empty list yields a single placeholder slice so the chart always has
/// something to draw.
pub fn category_breakdown(subscriptions: &[Subscription], categories: &[Category]) -> Vec<CategorySlice> {
    let mut totals: Vec<(Option<&str>, f64)> = Vec::new();
    for sub in subscriptions {
        let weight = sub.monthly_equivalent();
        let key = sub.category.as_deref();
        match totals.iter_mut().find(|(label, _)| *label == key) {
            Some((_, total)) => *total += weight,
            None => totals.push((key, weight)),
        }
    }

    if totals.is_empty() {
        return vec![CategorySlice {
            label: EMPTY_LABEL.to_string(),
            value: 1.0,
            color: EMPTY_COLOR.to_string(),
            placeholder: true,
        }];
    }

    totals
        .into_iter()
        .enumerate()
        .map(|(index, (key, value))| {
            let color = categories
                .iter()
                .find(|category| Some(category.name.as_str()) == key)
                .map(|category| category.color.clone())
                .unwrap_or_else(|| PALETTE[index % PALETTE.len()].to_string());
            CategorySlice {
                label: key.unwrap_or(UNCATEGORIZED_LABEL).to_string(),
                value,
                color,
                placeholder: false,
            }
        })
        .collect()
}

pub fn build_summary(subscriptions: &[Subscription], categories: &[Category]) -> SummaryResponse {
    let total_monthly = total_monthly(subscriptions);
    SummaryResponse {
        total_monthly,
        total_yearly: total_monthly * 12.0,
        slices: category_breakdown(subscriptions, categories),
    }
}
