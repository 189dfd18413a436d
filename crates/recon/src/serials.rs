use std::collections::HashMap;

use crate::model::{Product, SerialLedger, SerialRecord, SerialState, StockEvent};

const UNKNOWN_PROJECT: &str = "Unknown Project";

/// Track each received serial from stock-in to its dispatch project.
///
/// Entries keep first-seen stock-in order. A repeated stock-in of the same serial
/// overwrites its product and received date. Stock-out events for serials that
/// never came in are skipped; the dangling-serial check reports those.
/// Dates are shown as parsed, or as written when they do not parse.
pub fn build_serial_ledger(
    products: &[Product],
    stock_in: &[StockEvent],
    stock_out: &[StockEvent],
) -> SerialLedger {
    let mut models: HashMap<&str, &str> = HashMap::new();
    for p in products {
        models.entry(p.id.trim()).or_insert(p.model.as_str());
    }

    let mut entries: Vec<SerialRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for event in stock_in {
        let Some(serial) = event.serial_key() else {
            continue;
        };
        let product_id = event.product_key();
        let record = SerialRecord {
            serial: serial.to_string(),
            product_id: product_id.map(str::to_string),
            model: product_id.and_then(|id| models.get(id)).map(|m| m.to_string()),
            received: event.date_label(),
            state: SerialState::InStock,
        };
        match index.get(serial) {
            Some(&i) => entries[i] = record,
            None => {
                index.insert(serial.to_string(), entries.len());
                entries.push(record);
            }
        }
    }

    for event in stock_out {
        let Some(&i) = event.serial_key().and_then(|s| index.get(s)) else {
            continue;
        };
        let project = event
            .project
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(UNKNOWN_PROJECT);
        entries[i].state = SerialState::Deployed {
            project: project.to_string(),
            dispatched: event.date_label(),
        };
    }

    SerialLedger { entries }
}
