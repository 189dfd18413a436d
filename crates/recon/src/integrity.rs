//! Cross-dataset integrity checks.
//!
//! Each check is independent and returns its findings in a fixed order, so a
//! rerun over the same input reproduces the same report.

use std::collections::{BTreeMap, BTreeSet};

use crate::classify::is_below_minimum;
use crate::model::{IntegrityFinding, IntegrityReport, ProductSummary, StockEvent};

/// Products dispatched more than received.
pub fn check_negative_balance(summaries: &[ProductSummary]) -> Vec<IntegrityFinding> {
    summaries
        .iter()
        .filter(|s| s.balance() < 0)
        .map(|s| IntegrityFinding::NegativeBalance {
            product_id: s.product_id.clone(),
            qty_in: s.qty_in,
            qty_out: s.qty_out,
            balance: s.balance(),
        })
        .collect()
}

/// Products under their minimum stock threshold, with the shortage to replenish.
pub fn check_below_minimum(summaries: &[ProductSummary]) -> Vec<IntegrityFinding> {
    summaries
        .iter()
        .filter_map(|s| {
            let min_stock = s.min_stock?;
            let balance = s.balance();
            if !is_below_minimum(balance, Some(min_stock)) {
                return None;
            }
            Some(IntegrityFinding::BelowMinimum {
                product_id: s.product_id.clone(),
                unit: s.unit.clone(),
                balance,
                min_stock,
                shortage: (min_stock - balance as f64).max(0.0),
            })
        })
        .collect()
}

/// Serials seen more than once, ordered by count (descending) then serial.
fn duplicate_serials(events: &[StockEvent]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for serial in events.iter().filter_map(StockEvent::serial_key) {
        *counts.entry(serial).or_insert(0) += 1;
    }

    let mut dups: Vec<(String, usize)> = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(s, n)| (s.to_string(), n))
        .collect();
    // BTreeMap already yields serials ascending; a stable sort keeps that for ties.
    dups.sort_by(|a, b| b.1.cmp(&a.1));
    dups
}

pub fn check_duplicate_serials_in(stock_in: &[StockEvent]) -> Vec<IntegrityFinding> {
    duplicate_serials(stock_in)
        .into_iter()
        .map(|(serial, count)| IntegrityFinding::DuplicateSerialIn { serial, count })
        .collect()
}

pub fn check_duplicate_serials_out(stock_out: &[StockEvent]) -> Vec<IntegrityFinding> {
    duplicate_serials(stock_out)
        .into_iter()
        .map(|(serial, count)| IntegrityFinding::DuplicateSerialOut { serial, count })
        .collect()
}

/// Stock-out serials that never came in, ordered by serial.
///
/// Each finding names the product of the first stock-out event carrying the serial.
pub fn check_dangling_out_serials(
    stock_in: &[StockEvent],
    stock_out: &[StockEvent],
) -> Vec<IntegrityFinding> {
    let received: BTreeSet<&str> = stock_in.iter().filter_map(StockEvent::serial_key).collect();

    let mut dangling: BTreeMap<&str, Option<&str>> = BTreeMap::new();
    for event in stock_out {
        let Some(serial) = event.serial_key() else {
            continue;
        };
        if received.contains(serial) {
            continue;
        }
        dangling.entry(serial).or_insert_with(|| event.product_key());
    }

    dangling
        .into_iter()
        .map(|(serial, product_id)| IntegrityFinding::DanglingOutSerial {
            serial: serial.to_string(),
            product_id: product_id.map(str::to_string),
        })
        .collect()
}

/// Run all four checks.
pub fn check_integrity(
    stock_in: &[StockEvent],
    stock_out: &[StockEvent],
    summaries: &[ProductSummary],
) -> IntegrityReport {
    let report = IntegrityReport {
        negative_balance: check_negative_balance(summaries),
        below_minimum: check_below_minimum(summaries),
        duplicate_serial_in: check_duplicate_serials_in(stock_in),
        duplicate_serial_out: check_duplicate_serials_out(stock_out),
        dangling_out_serial: check_dangling_out_serials(stock_in, stock_out),
    };
    log::debug!(
        "integrity: {} negative, {} below minimum, {}/{} duplicate serials (in/out), {} dangling",
        report.negative_balance.len(),
        report.below_minimum.len(),
        report.duplicate_serial_in.len(),
        report.duplicate_serial_out.len(),
        report.dangling_out_serial.len(),
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FindingKind, StockStatus};

    fn serials(product: &str, serials: &[Option<&str>]) -> Vec<StockEvent> {
        serials.iter().map(|s| StockEvent::new(Some(product), *s)).collect()
    }

    fn summary(id: &str, qty_in: usize, qty_out: usize, min_stock: Option<f64>) -> ProductSummary {
        let status = crate::classify::classify_balance(qty_in as i64 - qty_out as i64, min_stock);
        ProductSummary {
            product_id: id.into(),
            category: "Panel".into(),
            brand: "Acme".into(),
            model: "X".into(),
            unit: "pcs".into(),
            qty_in,
            qty_out,
            min_stock,
            status,
            note: status.note().into(),
        }
    }

    #[test]
    fn negative_balance_reported() {
        let findings = check_negative_balance(&[summary("P1", 1, 3, None), summary("P2", 2, 1, None)]);
        assert_eq!(
            findings,
            vec![IntegrityFinding::NegativeBalance {
                product_id: "P1".into(),
                qty_in: 1,
                qty_out: 3,
                balance: -2,
            }]
        );
    }

    #[test]
    fn below_minimum_shortage() {
        let findings = check_below_minimum(&[
            summary("P1", 1, 0, Some(4.0)),
            summary("P2", 5, 0, Some(4.0)),
            summary("P3", 0, 0, None),
        ]);
        assert_eq!(findings.len(), 1);
        match &findings[0] {
            IntegrityFinding::BelowMinimum { product_id, shortage, .. } => {
                assert_eq!(product_id, "P1");
                assert_eq!(*shortage, 3.0);
            }
            other => panic!("unexpected finding {other:?}"),
        }
    }

    #[test]
    fn below_minimum_agrees_with_status_on_negative_balance() {
        let s = summary("P1", 0, 5, Some(3.0));
        assert_eq!(s.status, StockStatus::BelowMinimum);
        let findings = check_below_minimum(std::slice::from_ref(&s));
        assert_eq!(findings.len(), 1);
        match &findings[0] {
            IntegrityFinding::BelowMinimum { shortage, balance, .. } => {
                assert_eq!(*balance, -5);
                assert_eq!(*shortage, 8.0);
            }
            other => panic!("unexpected finding {other:?}"),
        }
    }

    #[test]
    fn duplicate_serial_in() {
        let events = serials("P1", &[Some("A"), Some("A"), Some("B")]);
        let findings = check_duplicate_serials_in(&events);
        assert_eq!(
            findings,
            vec![IntegrityFinding::DuplicateSerialIn { serial: "A".into(), count: 2 }]
        );
    }

    #[test]
    fn null_serials_never_duplicate() {
        let events = serials("P1", &[None, None, Some(""), Some(" ")]);
        assert!(check_duplicate_serials_in(&events).is_empty());
        assert!(check_duplicate_serials_out(&events).is_empty());
    }

    #[test]
    fn duplicates_ordered_by_count_then_serial() {
        let events = serials(
            "P1",
            &[Some("Z"), Some("Z"), Some("B"), Some("B"), Some("B"), Some("A"), Some("A")],
        );
        let order: Vec<(String, usize)> = check_duplicate_serials_out(&events)
            .into_iter()
            .map(|f| match f {
                IntegrityFinding::DuplicateSerialOut { serial, count } => (serial, count),
                other => panic!("unexpected finding {other:?}"),
            })
            .collect();
        assert_eq!(
            order,
            vec![("B".into(), 3), ("A".into(), 2), ("Z".into(), 2)]
        );
    }

    #[test]
    fn dangling_out_serial() {
        let stock_in = serials("P1", &[Some("X"), Some("Y")]);
        let stock_out = serials("P1", &[Some("Y"), Some("Z")]);
        let findings = check_dangling_out_serials(&stock_in, &stock_out);
        assert_eq!(
            findings,
            vec![IntegrityFinding::DanglingOutSerial {
                serial: "Z".into(),
                product_id: Some("P1".into()),
            }]
        );
    }

    #[test]
    fn dangling_resolves_first_out_event() {
        let stock_out = vec![
            StockEvent::new(Some("P7"), Some("Q")),
            StockEvent::new(Some("P8"), Some("Q")),
            StockEvent::new(None, Some("R")),
        ];
        let findings = check_dangling_out_serials(&[], &stock_out);
        assert_eq!(
            findings,
            vec![
                IntegrityFinding::DanglingOutSerial { serial: "Q".into(), product_id: Some("P7".into()) },
                IntegrityFinding::DanglingOutSerial { serial: "R".into(), product_id: None },
            ]
        );
    }

    #[test]
    fn clean_input_is_empty_report() {
        let stock_in = serials("P1", &[Some("A"), Some("B")]);
        let stock_out = serials("P1", &[Some("A")]);
        let report = check_integrity(&stock_in, &stock_out, &[summary("P1", 2, 1, Some(1.0))]);
        assert!(report.is_empty());
    }

    #[test]
    fn checks_do_not_short_circuit() {
        let stock_in = serials("P1", &[Some("A"), Some("A")]);
        let stock_out = serials("P1", &[Some("C"), Some("C"), Some("D")]);
        let report = check_integrity(&stock_in, &stock_out, &[summary("P1", 2, 3, Some(2.0))]);
        assert_eq!(report.negative_balance.len(), 1);
        assert_eq!(report.below_minimum.len(), 1);
        assert_eq!(report.duplicate_serial_in.len(), 1);
        assert_eq!(report.duplicate_serial_out.len(), 1);
        assert_eq!(report.dangling_out_serial.len(), 2);

        let kinds: Vec<FindingKind> = report.all().map(|f| f.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                FindingKind::NegativeBalance,
                FindingKind::BelowMinimum,
                FindingKind::DuplicateSerialIn,
                FindingKind::DuplicateSerialOut,
                FindingKind::DanglingOutSerial,
                FindingKind::DanglingOutSerial,
            ]
        );
    }

    #[test]
    fn padded_serials_match_their_trimmed_form() {
        let stock_in = serials("P1", &[Some("A "), Some("A"), Some(" B")]);
        let stock_out = serials("P1", &[Some("B")]);
        let report = check_integrity(&stock_in, &stock_out, &[]);
        assert_eq!(
            report.duplicate_serial_in,
            vec![IntegrityFinding::DuplicateSerialIn { serial: "A".into(), count: 2 }]
        );
        // " B" came in, so "B" going out is not dangling.
        assert!(report.dangling_out_serial.is_empty());
    }

    #[test]
    fn of_kind_selects_one_check() {
        let stock_in = serials("P1", &[Some("A"), Some("A")]);
        let stock_out = serials("P1", &[Some("Z")]);
        let report = check_integrity(&stock_in, &stock_out, &[summary("P1", 2, 1, None)]);
        assert_eq!(report.of_kind(FindingKind::DuplicateSerialIn), report.duplicate_serial_in.as_slice());
        assert_eq!(report.of_kind(FindingKind::DanglingOutSerial).len(), 1);
        assert!(report.of_kind(FindingKind::NegativeBalance).is_empty());
        assert!(report
            .of_kind(FindingKind::DanglingOutSerial)
            .iter()
            .all(|f| f.kind() == FindingKind::DanglingOutSerial));
    }
}
