//! Human-readable text report.

use std::collections::HashSet;
use std::fmt::Write;

use stockcheck_recon::model::{FindingKind, IntegrityFinding, SerialRecord, SerialState, StockReport};
use stockcheck_recon::{group_by_category, ProductSummary};

const RULE_WIDTH: usize = 72;

pub struct RenderOptions {
    /// Entries listed per duplicate/dangling check.
    pub sample_limit: usize,
    pub show_serials: bool,
}

/// Whole numbers without a trailing `.0`.
pub fn format_threshold(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
}

pub fn render_report(report: &StockReport, opts: &RenderOptions) -> String {
    let mut out = String::new();
    render_header(&mut out, report);
    render_products(&mut out, &report.summaries);
    render_overview(&mut out, report);
    render_integrity(&mut out, report, opts.sample_limit);
    render_distribution(&mut out, report);
    if opts.show_serials {
        render_serials(&mut out, report);
    }
    out
}

fn render_header(out: &mut String, report: &StockReport) {
    let s = &report.input;
    let _ = writeln!(out, "Stock analysis: {}", report.meta.name);
    let _ = writeln!(
        out,
        "Loaded {} products, {} stock-in events, {} stock-out events",
        s.products, s.stock_in_events, s.stock_out_events
    );
    let _ = writeln!(
        out,
        "Products with stock-in: {}, with stock-out: {}",
        s.products_with_stock_in, s.products_with_stock_out
    );
    if s.unassigned_in + s.unassigned_out > 0 {
        let _ = writeln!(
            out,
            "Events without product id: {} in, {} out (not counted)",
            s.unassigned_in, s.unassigned_out
        );
    }
    if s.unmatched_in + s.unmatched_out > 0 {
        let _ = writeln!(
            out,
            "Events for products not in the catalog: {} in, {} out (not counted)",
            s.unmatched_in, s.unmatched_out
        );
    }
}

fn render_products(out: &mut String, summaries: &[ProductSummary]) {
    for group in group_by_category(summaries) {
        heading(out, &format!("Category: {}", group.category));
        for s in group.summaries {
            let unit = &s.unit;
            let _ = writeln!(out, "\n{} - {} {}", s.product_id, s.brand, s.model);
            let _ = writeln!(out, "   In:      {} {unit}", s.qty_in);
            let _ = writeln!(out, "   Out:     {} {unit}", s.qty_out);
            let _ = writeln!(out, "   Balance: {} {unit}", s.balance());
            if let Some(min) = s.min_stock {
                let _ = writeln!(out, "   Minimum: {} {unit}", format_threshold(min));
            }
            if s.note.is_empty() {
                let _ = writeln!(out, "   {}", s.status.label());
            } else {
                let _ = writeln!(out, "   {} - {}", s.status.label(), s.note);
            }
        }
    }
}

fn render_overview(out: &mut String, report: &StockReport) {
    let t = &report.totals;
    heading(out, "Overview");
    let _ = writeln!(out, "Products:           {}", t.total_products);
    let _ = writeln!(out, "Total received:     {}", t.total_in);
    let _ = writeln!(out, "Total dispatched:   {}", t.total_out);
    let _ = writeln!(out, "Total balance:      {}", t.total_balance);
    let _ = writeln!(out);
    let _ = writeln!(out, "Normal:             {}", t.normal);
    let _ = writeln!(out, "Low / out of stock: {}", t.warning);
    let _ = writeln!(out, "Anomalous:          {}", t.critical);
}

fn list(out: &mut String, findings: &[IntegrityFinding], limit: Option<usize>) {
    let shown = limit.unwrap_or(findings.len()).min(findings.len());
    for f in &findings[..shown] {
        let _ = writeln!(out, "   - {f}");
    }
    if findings.len() > shown {
        let _ = writeln!(out, "   ... and {} more", findings.len() - shown);
    }
}

/// Per check: kind, line when clean, tag and description when findings exist,
/// and whether the listing is capped at the sample limit.
const CHECKS: [(FindingKind, &str, &str, &str, bool); 5] = [
    (FindingKind::NegativeBalance, "No negative balances", "fail", "product(s) dispatched more than received", false),
    (FindingKind::BelowMinimum, "All products at or above minimum stock", "warn", "product(s) below minimum stock", false),
    (FindingKind::DuplicateSerialIn, "No duplicate serials in stock-in", "warn", "duplicate serial(s) in stock-in", true),
    (FindingKind::DuplicateSerialOut, "No duplicate serials in stock-out", "warn", "duplicate serial(s) in stock-out", true),
    (FindingKind::DanglingOutSerial, "Every dispatched serial was received", "warn", "dispatched serial(s) never received", true),
];

fn render_integrity(out: &mut String, report: &StockReport, sample_limit: usize) {
    heading(out, "Integrity checks");
    for (kind, clean, tag, what, capped) in CHECKS {
        let findings = report.integrity.of_kind(kind);
        if findings.is_empty() {
            let _ = writeln!(out, "[ok]   {clean}");
        } else {
            let _ = writeln!(out, "[{tag}] {} {what}", findings.len());
            list(out, findings, capped.then_some(sample_limit));
        }
    }
}

fn render_distribution(out: &mut String, report: &StockReport) {
    if !report.category_balances.is_empty() {
        heading(out, "Balance by category");
        for c in &report.category_balances {
            let _ = writeln!(out, "{:<30} {:>8}", c.category, c.balance);
        }
    }

    if !report.movement.is_empty() {
        heading(out, "Daily movement");
        let _ = writeln!(out, "{:<12} {:>8} {:>8}", "Date", "In", "Out");
        for m in &report.movement {
            let _ = writeln!(out, "{:<12} {:>8} {:>8}", m.date, m.stock_in, m.stock_out);
        }
    }
}

fn serial_line(out: &mut String, r: &SerialRecord) {
    match &r.state {
        SerialState::InStock => {
            let received = r.received.as_deref().unwrap_or("-");
            let _ = writeln!(out, "   {:<20} in stock (received {received})", r.serial);
        }
        SerialState::Deployed { project, dispatched } => {
            let dispatched = dispatched.as_deref().unwrap_or("-");
            let _ = writeln!(out, "   {:<20} deployed to {project} ({dispatched})", r.serial);
        }
    }
}

fn render_serials(out: &mut String, report: &StockReport) {
    let ledger = &report.serials;
    heading(
        out,
        &format!(
            "Serial tracking ({} received, {} deployed)",
            ledger.entries.len(),
            ledger.deployed_count()
        ),
    );

    let mut listed = HashSet::new();
    for s in &report.summaries {
        let id = s.product_id.trim();
        if !listed.insert(id) {
            continue;
        }
        let mut records = ledger.for_product(id).peekable();
        if records.peek().is_none() {
            continue;
        }
        let _ = writeln!(out, "\n{} - {} {}", s.product_id, s.brand, s.model);
        for r in records {
            serial_line(out, r);
        }
    }

    let others: Vec<&SerialRecord> = ledger
        .entries
        .iter()
        .filter(|r| !r.product_id.as_deref().is_some_and(|id| listed.contains(id)))
        .collect();
    if !others.is_empty() {
        let _ = writeln!(out, "\nNot in catalog");
        for r in others {
            serial_line(out, r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockcheck_recon::model::{Product, StockEvent, StockInput};
    use stockcheck_recon::StockConfig;

    fn report() -> StockReport {
        let product = |id: &str, category: &str, min: Option<f64>| Product {
            id: id.into(),
            category: category.into(),
            brand: "Acme".into(),
            model: "X1".into(),
            unit: "pcs".into(),
            min_stock: min,
        };
        let out_serials: Vec<StockEvent> = (0..7)
            .map(|i| StockEvent::new(Some("P2"), Some(&format!("D{i}"))))
            .collect();
        let input = StockInput {
            products: vec![product("P1", "Panel", Some(2.0)), product("P2", "Inverter", None)],
            stock_in: vec![StockEvent::new(Some("P1"), Some("S1"))],
            stock_out: out_serials,
        };
        stockcheck_recon::run(&StockConfig::with_files("p", "i", "o"), &input)
    }

    #[test]
    fn threshold_formatting() {
        assert_eq!(format_threshold(10.0), "10");
        assert_eq!(format_threshold(2.5), "2.5");
    }

    #[test]
    fn sections_in_order() {
        let text = render_report(&report(), &RenderOptions { sample_limit: 5, show_serials: false });
        let inverter = text.find("Category: Inverter").unwrap();
        let panel = text.find("Category: Panel").unwrap();
        let overview = text.find("Overview").unwrap();
        let integrity = text.find("Integrity checks").unwrap();
        assert!(inverter < panel && panel < overview && overview < integrity);
        assert!(text.contains("P1 - Acme X1"));
        assert!(text.contains("Below minimum - replenishment required"));
        assert!(text.contains("Anomalous - more dispatched than received"));
        assert!(!text.contains("Serial tracking"));
    }

    #[test]
    fn dangling_list_is_truncated() {
        let text = render_report(&report(), &RenderOptions { sample_limit: 5, show_serials: false });
        assert!(text.contains("[warn] 7 dispatched serial(s) never received"));
        assert!(text.contains("   - D4 (P2)"));
        assert!(!text.contains("   - D5 (P2)"));
        assert!(text.contains("   ... and 2 more"));
    }

    #[test]
    fn serial_section_on_request() {
        let text = render_report(&report(), &RenderOptions { sample_limit: 5, show_serials: true });
        assert!(text.contains("Serial tracking (1 received, 0 deployed)"));
        assert!(text.contains("P1 - Acme X1\n   S1"));
        assert!(text.contains("in stock (received -)"));
        assert!(!text.contains("Not in catalog"));
    }
}
