use std::collections::BTreeMap;

use crate::model::StockEvent;

/// Event counts keyed by product identifier.
///
/// Events without a product identifier are tallied in `unassigned` and never
/// reach the per-product map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductCounts {
    counts: BTreeMap<String, usize>,
    unassigned: usize,
}

impl ProductCounts {
    /// Count for `product_id`; 0 when no event references it.
    pub fn get(&self, product_id: &str) -> usize {
        self.counts.get(product_id).copied().unwrap_or(0)
    }

    pub fn unassigned(&self) -> usize {
        self.unassigned
    }

    /// Number of distinct product identifiers seen.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Sum over all identified events.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Count events per product identifier.
pub fn count_by_product(events: &[StockEvent]) -> ProductCounts {
    let mut out = ProductCounts::default();
    for event in events {
        match event.product_key() {
            Some(id) => *out.counts.entry(id.to_string()).or_insert(0) += 1,
            None => out.unassigned += 1,
        }
    }
    out
}
