//! CSV loading for the three input tables.
//!
//! Structural problems (unreadable CSV, missing required column) are errors.
//! Malformed optional values degrade to `None`.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;

use crate::config::{EventColumns, ProductColumns};
use crate::error::StockError;
use crate::model::{EventSource, Product, StockEvent};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

struct Table<'a> {
    headers: Vec<String>,
    reader: csv::Reader<&'a [u8]>,
    source: String,
}

impl<'a> Table<'a> {
    fn open(source: &str, csv_data: &'a str) -> Result<Self, StockError> {
        let data = csv_data.strip_prefix('\u{feff}').unwrap_or(csv_data);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| csv_err(source, e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        Ok(Self { headers, reader, source: source.into() })
    }

    fn required(&self, name: &str) -> Result<usize, StockError> {
        self.optional(name).ok_or_else(|| StockError::MissingColumn {
            source: self.source.clone(),
            column: name.into(),
        })
    }

    fn optional(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name.trim())
    }
}

fn csv_err(source: &str, e: csv::Error) -> StockError {
    StockError::Csv { source: source.into(), message: e.to_string() }
}

fn cell(record: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Read one input file into memory.
pub fn read_source(path: &Path) -> Result<String, StockError> {
    std::fs::read_to_string(path)
        .map_err(|e| StockError::Io(format!("cannot read {}: {e}", path.display())))
}

/// Parse a minimum stock threshold. Blank, non-numeric and non-finite values are absent.
pub fn parse_min_stock(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an event date in ISO, day-first or month-first form.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Load the product catalog.
pub fn load_products(csv_data: &str, columns: &ProductColumns) -> Result<Vec<Product>, StockError> {
    let mut table = Table::open("products", csv_data)?;

    let id_idx = table.required(&columns.id)?;
    let category_idx = table.required(&columns.category)?;
    let brand_idx = table.required(&columns.brand)?;
    let model_idx = table.required(&columns.model)?;
    let unit_idx = table.required(&columns.unit)?;
    let min_idx = table.optional(&columns.min_stock);
    if min_idx.is_none() {
        log::warn!("products: no '{}' column, thresholds disabled", columns.min_stock);
    }

    let mut products = Vec::new();
    let mut seen = HashSet::new();

    for record in table.reader.records() {
        let record = record.map_err(|e| csv_err("products", e))?;

        // Blank catalog rows carry nothing to reconcile.
        let Some(id) = cell(&record, Some(id_idx)) else {
            if record.iter().any(|v| !v.trim().is_empty()) {
                log::warn!("products: skipping row without '{}'", columns.id);
            }
            continue;
        };

        let min_stock = match cell(&record, min_idx) {
            Some(raw) => {
                let parsed = parse_min_stock(&raw);
                if parsed.is_none() {
                    log::warn!("products: {id}: ignoring malformed min stock '{raw}'");
                }
                parsed
            }
            None => None,
        };

        if !seen.insert(id.clone()) {
            log::warn!("products: duplicate product id '{id}'");
        }

        products.push(Product {
            id,
            category: cell(&record, Some(category_idx)).unwrap_or_default(),
            brand: cell(&record, Some(brand_idx)).unwrap_or_default(),
            model: cell(&record, Some(model_idx)).unwrap_or_default(),
            unit: cell(&record, Some(unit_idx)).unwrap_or_default(),
            min_stock,
        });
    }

    log::info!("products: loaded {} rows", products.len());
    Ok(products)
}

/// Load a stock-in or stock-out table.
pub fn load_events(
    source: EventSource,
    csv_data: &str,
    columns: &EventColumns,
) -> Result<Vec<StockEvent>, StockError> {
    let name = source.to_string();
    let mut table = Table::open(&name, csv_data)?;

    let product_idx = table.required(&columns.product_id)?;
    let serial_idx = table.required(&columns.serial)?;
    let date_idx = table.optional(&columns.date);
    let project_idx = match source {
        EventSource::StockOut => table.optional(&columns.project),
        EventSource::StockIn => None,
    };

    let mut events = Vec::new();
    let mut bad_dates = 0usize;

    for record in table.reader.records() {
        let record = record.map_err(|e| csv_err(&name, e))?;
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        let date_raw = cell(&record, date_idx);
        let date = date_raw.as_deref().and_then(parse_date);
        if date_raw.is_some() && date.is_none() {
            bad_dates += 1;
        }

        events.push(StockEvent {
            product_id: cell(&record, Some(product_idx)),
            serial: cell(&record, Some(serial_idx)),
            date,
            date_raw,
            project: cell(&record, project_idx),
        });
    }

    if bad_dates > 0 {
        log::warn!("{name}: {bad_dates} rows with unparsable dates left out of the movement trend");
    }
    log::info!("{name}: loaded {} rows", events.len());
    Ok(events)
}
