use std::collections::HashSet;

use crate::aggregate::{count_by_product, ProductCounts};
use crate::classify::summarize;
use crate::config::StockConfig;
use crate::integrity::check_integrity;
use crate::model::{InputStats, ReportMeta, StockInput, StockReport};
use crate::movement::{category_balances, daily_movement};
use crate::serials::build_serial_ledger;
use crate::totals::compute_totals;

/// Run one reconciliation pass: aggregate, classify, check, and derive the
/// serial ledger and movement views. Pure and deterministic.
pub fn run(config: &StockConfig, input: &StockInput) -> StockReport {
    let in_counts = count_by_product(&input.stock_in);
    let out_counts = count_by_product(&input.stock_out);
    log::debug!(
        "aggregated {} stock-in events over {} products, {} stock-out events over {} products",
        in_counts.total(),
        in_counts.distinct(),
        out_counts.total(),
        out_counts.distinct()
    );

    let summaries = summarize(&input.products, &in_counts, &out_counts);
    let totals = compute_totals(&summaries);
    let integrity = check_integrity(&input.stock_in, &input.stock_out, &summaries);

    let catalog: HashSet<&str> = input.products.iter().map(|p| p.id.trim()).collect();
    let stats = InputStats {
        products: input.products.len(),
        stock_in_events: input.stock_in.len(),
        stock_out_events: input.stock_out.len(),
        products_with_stock_in: in_counts.distinct(),
        products_with_stock_out: out_counts.distinct(),
        unassigned_in: in_counts.unassigned(),
        unassigned_out: out_counts.unassigned(),
        unmatched_in: count_unmatched(&in_counts, &catalog),
        unmatched_out: count_unmatched(&out_counts, &catalog),
    };
    if stats.unmatched_in + stats.unmatched_out > 0 {
        log::warn!(
            "{} stock-in and {} stock-out events reference products missing from the catalog",
            stats.unmatched_in,
            stats.unmatched_out
        );
    }

    let report = StockReport {
        meta: ReportMeta {
            name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        input: stats,
        category_balances: category_balances(&summaries),
        serials: build_serial_ledger(&input.products, &input.stock_in, &input.stock_out),
        movement: daily_movement(&input.stock_in, &input.stock_out, config.report.trend_days),
        totals,
        summaries,
        integrity,
    };

    log::info!(
        "reconciled {} products: {} normal, {} warning, {} critical, {} findings",
        report.totals.total_products,
        report.totals.normal,
        report.totals.warning,
        report.totals.critical,
        report.integrity.len()
    );
    report
}

/// Events with a product identifier that the catalog does not contain.
fn count_unmatched(counts: &ProductCounts, catalog: &HashSet<&str>) -> usize {
    counts
        .iter()
        .filter(|(id, _)| !catalog.contains(id))
        .map(|(_, n)| n)
        .sum()
}
