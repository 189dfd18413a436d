use std::collections::BTreeMap;

use crate::aggregate::{count_by_product, ProductCounts};
use crate::model::{CategoryGroup, Product, ProductSummary, StockEvent, StockStatus, SummaryOutput};
use crate::totals::compute_totals;

/// True when a threshold is set and the balance falls under it.
///
/// Shared by the classifier and the below-minimum integrity check.
pub fn is_below_minimum(balance: i64, min_stock: Option<f64>) -> bool {
    match min_stock {
        Some(min) => (balance as f64) < min,
        None => false,
    }
}

/// Assign a status to a balance. First matching rule wins:
///
/// 1. threshold set and balance under it → `BelowMinimum`
/// 2. balance == 0 → `OutOfStock`
/// 3. balance < 0 → `Anomalous`
/// 4. balance > 0 → `Normal`
///
/// A negative balance with a threshold is therefore `BelowMinimum`, not `Anomalous`.
pub fn classify_balance(balance: i64, min_stock: Option<f64>) -> StockStatus {
    if is_below_minimum(balance, min_stock) {
        StockStatus::BelowMinimum
    } else if balance == 0 {
        StockStatus::OutOfStock
    } else if balance < 0 {
        StockStatus::Anomalous
    } else if balance > 0 {
        StockStatus::Normal
    } else {
        StockStatus::NoActivity
    }
}

/// Join per-product counts against the catalog. One summary per product, catalog order.
pub fn summarize(
    products: &[Product],
    in_counts: &ProductCounts,
    out_counts: &ProductCounts,
) -> Vec<ProductSummary> {
    products
        .iter()
        .map(|p| {
            let key = p.id.trim();
            let qty_in = in_counts.get(key);
            let qty_out = out_counts.get(key);
            let status = classify_balance(qty_in as i64 - qty_out as i64, p.min_stock);
            ProductSummary {
                product_id: p.id.clone(),
                category: p.category.clone(),
                brand: p.brand.clone(),
                model: p.model.clone(),
                unit: p.unit.clone(),
                qty_in,
                qty_out,
                min_stock: p.min_stock,
                status,
                note: status.note().to_string(),
            }
        })
        .collect()
}

/// Aggregate both event tables, classify every catalog product and total the run.
pub fn compute_summaries(
    products: &[Product],
    stock_in: &[StockEvent],
    stock_out: &[StockEvent],
) -> SummaryOutput {
    let in_counts = count_by_product(stock_in);
    let out_counts = count_by_product(stock_out);
    let summaries = summarize(products, &in_counts, &out_counts);
    let totals = compute_totals(&summaries);
    SummaryOutput { summaries, totals }
}

/// Group summaries by category (lexicographic), keeping catalog order inside each group.
pub fn group_by_category(summaries: &[ProductSummary]) -> Vec<CategoryGroup<'_>> {
    let mut groups: BTreeMap<&str, Vec<&ProductSummary>> = BTreeMap::new();
    for s in summaries {
        groups.entry(s.category.as_str()).or_default().push(s);
    }
    groups
        .into_iter()
        .map(|(category, summaries)| CategoryGroup { category, summaries })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, category: &str, min_stock: Option<f64>) -> Product {
        Product {
            id: id.into(),
            category: category.into(),
            brand: "Acme".into(),
            model: format!("M-{id}"),
            unit: "pcs".into(),
            min_stock,
        }
    }

    fn events(ids: &[&str]) -> Vec<StockEvent> {
        ids.iter().map(|id| StockEvent::new(Some(id), None)).collect()
    }

    #[test]
    fn rule_order() {
        assert_eq!(classify_balance(2, Some(3.0)), StockStatus::BelowMinimum);
        assert_eq!(classify_balance(0, None), StockStatus::OutOfStock);
        assert_eq!(classify_balance(-1, None), StockStatus::Anomalous);
        assert_eq!(classify_balance(4, None), StockStatus::Normal);
        assert_eq!(classify_balance(3, Some(3.0)), StockStatus::Normal);
    }

    #[test]
    fn threshold_wins_over_negative_balance() {
        assert_eq!(classify_balance(-5, Some(3.0)), StockStatus::BelowMinimum);
    }

    #[test]
    fn zero_balance_with_zero_threshold_is_out_of_stock() {
        // 0 < 0 is false, so rule 2 applies.
        assert_eq!(classify_balance(0, Some(0.0)), StockStatus::OutOfStock);
    }

    #[test]
    fn fractional_threshold() {
        assert_eq!(classify_balance(2, Some(2.5)), StockStatus::BelowMinimum);
        assert_eq!(classify_balance(3, Some(2.5)), StockStatus::Normal);
    }

    #[test]
    fn summaries_follow_catalog_order() {
        let products = vec![
            product("P2", "Panel", None),
            product("P1", "Inverter", Some(2.0)),
            product("P3", "Panel", None),
        ];
        let out = compute_summaries(&products, &events(&["P1", "P2", "P2"]), &events(&["P2"]));
        let ids: Vec<&str> = out.summaries.iter().map(|s| s.product_id.as_str()).collect();
        assert_eq!(ids, vec!["P2", "P1", "P3"]);

        let p2 = &out.summaries[0];
        assert_eq!((p2.qty_in, p2.qty_out, p2.balance()), (2, 1, 1));
        assert_eq!(p2.status, StockStatus::Normal);
        assert_eq!(p2.note, "");

        let p1 = &out.summaries[1];
        assert_eq!(p1.status, StockStatus::BelowMinimum);
        assert_eq!(p1.note, "replenishment required");

        let p3 = &out.summaries[2];
        assert_eq!(p3.balance(), 0);
        assert_eq!(p3.status, StockStatus::OutOfStock);
        assert_eq!(p3.note, "no inventory");
    }

    #[test]
    fn unmatched_events_do_not_leak_into_summaries() {
        let products = vec![product("P1", "Panel", None)];
        let out = compute_summaries(&products, &events(&["P1", "GHOST"]), &[]);
        assert_eq!(out.summaries[0].qty_in, 1);
        assert_eq!(out.totals.total_in, 1);
    }

    #[test]
    fn grouping_is_lexicographic() {
        let products = vec![
            product("P1", "Panel", None),
            product("P2", "Inverter", None),
            product("P3", "Panel", None),
            product("P4", "Battery", None),
        ];
        let out = compute_summaries(&products, &[], &[]);
        let groups = group_by_category(&out.summaries);
        let cats: Vec<&str> = groups.iter().map(|g| g.category).collect();
        assert_eq!(cats, vec!["Battery", "Inverter", "Panel"]);
        let panel: Vec<&str> = groups[2].summaries.iter().map(|s| s.product_id.as_str()).collect();
        assert_eq!(panel, vec!["P1", "P3"]);
    }
}
