use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{CategoryBalance, DailyMovement, ProductSummary, StockEvent};

const UNCATEGORIZED: &str = "Uncategorized";

/// Per-day stock-in/stock-out counts, ascending by date, keeping the last `days` dates.
///
/// Events without a parsed date are left out.
pub fn daily_movement(stock_in: &[StockEvent], stock_out: &[StockEvent], days: usize) -> Vec<DailyMovement> {
    let mut by_date: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
    for date in stock_in.iter().filter_map(|e| e.date) {
        by_date.entry(date).or_default().0 += 1;
    }
    for date in stock_out.iter().filter_map(|e| e.date) {
        by_date.entry(date).or_default().1 += 1;
    }

    let skip = by_date.len().saturating_sub(days);
    by_date
        .into_iter()
        .skip(skip)
        .map(|(date, (stock_in, stock_out))| DailyMovement { date, stock_in, stock_out })
        .collect()
}

/// Sum of balances per category, largest first (ties by name).
pub fn category_balances(summaries: &[ProductSummary]) -> Vec<CategoryBalance> {
    let mut sums: BTreeMap<&str, i64> = BTreeMap::new();
    for s in summaries {
        let category = match s.category.trim() {
            "" => UNCATEGORIZED,
            c => c,
        };
        *sums.entry(category).or_insert(0) += s.balance();
    }

    let mut out: Vec<CategoryBalance> = sums
        .into_iter()
        .map(|(category, balance)| CategoryBalance { category: category.to_string(), balance })
        .collect();
    out.sort_by(|a, b| b.balance.cmp(&a.balance));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StockStatus;

    fn dated(day: Option<u32>) -> StockEvent {
        StockEvent {
            product_id: Some("P1".into()),
            date: day.and_then(|d| NaiveDate::from_ymd_opt(2025, 1, d)),
            ..StockEvent::default()
        }
    }

    fn summary(category: &str, qty_in: usize, qty_out: usize) -> ProductSummary {
        ProductSummary {
            product_id: "P".into(),
            category: category.into(),
            brand: String::new(),
            model: String::new(),
            unit: "pcs".into(),
            qty_in,
            qty_out,
            min_stock: None,
            status: StockStatus::Normal,
            note: String::new(),
        }
    }

    #[test]
    fn movement_counts_by_day() {
        let stock_in = vec![dated(Some(2)), dated(Some(1)), dated(Some(2)), dated(None)];
        let stock_out = vec![dated(Some(3)), dated(Some(2))];
        let trend = daily_movement(&stock_in, &stock_out, 15);
        let rows: Vec<(u32, usize, usize)> = trend
            .iter()
            .map(|m| (chrono::Datelike::day(&m.date), m.stock_in, m.stock_out))
            .collect();
        assert_eq!(rows, vec![(1, 1, 0), (2, 2, 1), (3, 0, 1)]);
    }

    #[test]
    fn movement_keeps_most_recent_days() {
        let stock_in: Vec<StockEvent> = (1..=20).map(|d| dated(Some(d))).collect();
        let trend = daily_movement(&stock_in, &[], 15);
        assert_eq!(trend.len(), 15);
        assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
    }

    #[test]
    fn balances_by_category() {
        let summaries = vec![
            summary("Panel", 5, 1),
            summary("", 2, 0),
            summary("Inverter", 4, 0),
            summary("Panel", 1, 1),
            summary("Battery", 1, 3),
        ];
        let balances = category_balances(&summaries);
        let rows: Vec<(&str, i64)> = balances.iter().map(|c| (c.category.as_str(), c.balance)).collect();
        assert_eq!(
            rows,
            vec![("Inverter", 4), ("Panel", 4), ("Uncategorized", 2), ("Battery", -2)]
        );
    }
}
