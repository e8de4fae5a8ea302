use crate::models::{Cycle, Subscription};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleFilter {
    #[default]
    All,
    Only(Cycle),
}

impl CycleFilter {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("monthly") => Self::Only(Cycle::Monthly),
            Some("yearly") => Self::Only(Cycle::Yearly),
            _ => Self::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Date,
    PriceDesc,
    PriceAsc,
    Name,
    /// Unrecognised key: keep the stored order.
    Unsorted,
}

impl SortKey {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("date") => Self::Date,
            Some("price_desc") => Self::PriceDesc,
            Some("price_asc") => Self::PriceAsc,
            Some("name") => Self::Name,
            Some(_) => Self::Unsorted,
        }
    }
}

/// Derived view of the list. The input is never reordered; ties keep their
/// original relative order.
pub fn filter_and_sort(subscriptions: &[Subscription], filter: CycleFilter, sort: SortKey) -> Vec<Subscription> {
    let mut view: Vec<Subscription> = subscriptions
        .iter()
        .filter(|sub| match filter {
            CycleFilter::All => true,
            CycleFilter::Only(cycle) => sub.cycle == cycle,
        })
        .cloned()
        .collect();

    match sort {
        SortKey::Date => view.sort_by_key(|sub| sub.date),
        SortKey::PriceDesc => view.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortKey::PriceAsc => view.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortKey::Name => view.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortKey::Unsorted => {}
    }
    view
}

/// Case-insensitive, accent-folded ordering with a plain comparison as tiebreak.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}
