use crate::model::{ProductSummary, RunTotals, StockStatus};

/// Compute run totals from classified summaries.
pub fn compute_totals(summaries: &[ProductSummary]) -> RunTotals {
    let mut totals = RunTotals {
        total_products: summaries.len(),
        ..RunTotals::default()
    };

    for s in summaries {
        totals.total_in += s.qty_in;
        totals.total_out += s.qty_out;
        totals.total_balance += s.balance();

        match s.status {
            StockStatus::Anomalous => totals.critical += 1,
            StockStatus::BelowMinimum | StockStatus::OutOfStock => totals.warning += 1,
            StockStatus::Normal => totals.normal += 1,
            StockStatus::NoActivity => {}
        }
    }

    totals
}
