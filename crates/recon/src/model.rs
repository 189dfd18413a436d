use chrono::NaiveDate;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One row of the product catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: String,
    pub category: String,
    pub brand: String,
    pub model: String,
    pub unit: String,
    /// Minimum stock threshold. Malformed values are normalized to `None` on load.
    pub min_stock: Option<f64>,
}

/// Which event table a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    StockIn,
    StockOut,
}

impl std::fmt::Display for EventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StockIn => write!(f, "stock_in"),
            Self::StockOut => write!(f, "stock_out"),
        }
    }
}

/// A single stock-in or stock-out record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockEvent {
    pub product_id: Option<String>,
    pub serial: Option<String>,
    pub date: Option<NaiveDate>,
    /// Date cell as written; the only date left when it does not parse.
    pub date_raw: Option<String>,
    /// Destination project; only meaningful for stock-out.
    pub project: Option<String>,
}

impl StockEvent {
    pub fn new(product_id: Option<&str>, serial: Option<&str>) -> Self {
        Self {
            product_id: product_id.map(str::to_string),
            serial: serial.map(str::to_string),
            ..Self::default()
        }
    }

    /// Product identifier, treating blank strings as absent.
    pub fn product_key(&self) -> Option<&str> {
        non_blank(&self.product_id)
    }

    /// Serial number, treating blank strings as absent.
    pub fn serial_key(&self) -> Option<&str> {
        non_blank(&self.serial)
    }

    /// Parsed date in ISO form, else the unparsed cell text.
    pub fn date_label(&self) -> Option<String> {
        self.date
            .map(|d| d.to_string())
            .or_else(|| self.date_raw.clone())
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// The three pre-loaded datasets for one run.
#[derive(Debug, Clone, Default)]
pub struct StockInput {
    pub products: Vec<Product>,
    pub stock_in: Vec<StockEvent>,
    pub stock_out: Vec<StockEvent>,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    BelowMinimum,
    OutOfStock,
    Anomalous,
    Normal,
    NoActivity,
}

impl StockStatus {
    /// Short reason attached to the status; empty for healthy stock.
    pub fn note(&self) -> &'static str {
        match self {
            Self::BelowMinimum => "replenishment required",
            Self::OutOfStock => "no inventory",
            Self::Anomalous => "more dispatched than received",
            Self::Normal | Self::NoActivity => "",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BelowMinimum => "Below minimum",
            Self::OutOfStock => "Out of stock",
            Self::Anomalous => "Anomalous",
            Self::Normal => "Normal",
            Self::NoActivity => "No activity",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BelowMinimum => write!(f, "below_minimum"),
            Self::OutOfStock => write!(f, "out_of_stock"),
            Self::Anomalous => write!(f, "anomalous"),
            Self::Normal => write!(f, "normal"),
            Self::NoActivity => write!(f, "no_activity"),
        }
    }
}

/// Derived per-product balance line. One per catalog product, in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSummary {
    pub product_id: String,
    pub category: String,
    pub brand: String,
    pub model: String,
    pub unit: String,
    pub qty_in: usize,
    pub qty_out: usize,
    pub min_stock: Option<f64>,
    pub status: StockStatus,
    pub note: String,
}

impl ProductSummary {
    pub fn balance(&self) -> i64 {
        self.qty_in as i64 - self.qty_out as i64
    }
}

// Balance is derived, so it is emitted here rather than stored.
impl Serialize for ProductSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ProductSummary", 11)?;
        s.serialize_field("product_id", &self.product_id)?;
        s.serialize_field("category", &self.category)?;
        s.serialize_field("brand", &self.brand)?;
        s.serialize_field("model", &self.model)?;
        s.serialize_field("unit", &self.unit)?;
        s.serialize_field("qty_in", &self.qty_in)?;
        s.serialize_field("qty_out", &self.qty_out)?;
        s.serialize_field("balance", &self.balance())?;
        s.serialize_field("min_stock", &self.min_stock)?;
        s.serialize_field("status", &self.status)?;
        s.serialize_field("note", &self.note)?;
        s.end()
    }
}

/// Run-level totals over all summaries.
///
/// `normal`, `warning` and `critical` are disjoint: warning covers
/// below-minimum and out-of-stock, critical covers anomalous.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    pub total_products: usize,
    pub total_in: usize,
    pub total_out: usize,
    pub total_balance: i64,
    pub normal: usize,
    pub warning: usize,
    pub critical: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryOutput {
    pub summaries: Vec<ProductSummary>,
    pub totals: RunTotals,
}

/// Summaries sharing a category, in catalog order.
#[derive(Debug, Clone)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub summaries: Vec<&'a ProductSummary>,
}

// ---------------------------------------------------------------------------
// Integrity
// ---------------------------------------------------------------------------

/// Stable tag for downstream filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    NegativeBalance,
    BelowMinimum,
    DuplicateSerialIn,
    DuplicateSerialOut,
    DanglingOutSerial,
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeBalance => write!(f, "negative_balance"),
            Self::BelowMinimum => write!(f, "below_minimum"),
            Self::DuplicateSerialIn => write!(f, "duplicate_serial_in"),
            Self::DuplicateSerialOut => write!(f, "duplicate_serial_out"),
            Self::DanglingOutSerial => write!(f, "dangling_out_serial"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityFinding {
    NegativeBalance {
        product_id: String,
        qty_in: usize,
        qty_out: usize,
        balance: i64,
    },
    BelowMinimum {
        product_id: String,
        unit: String,
        balance: i64,
        min_stock: f64,
        shortage: f64,
    },
    DuplicateSerialIn {
        serial: String,
        count: usize,
    },
    DuplicateSerialOut {
        serial: String,
        count: usize,
    },
    DanglingOutSerial {
        serial: String,
        product_id: Option<String>,
    },
}

impl IntegrityFinding {
    pub fn kind(&self) -> FindingKind {
        match self {
            Self::NegativeBalance { .. } => FindingKind::NegativeBalance,
            Self::BelowMinimum { .. } => FindingKind::BelowMinimum,
            Self::DuplicateSerialIn { .. } => FindingKind::DuplicateSerialIn,
            Self::DuplicateSerialOut { .. } => FindingKind::DuplicateSerialOut,
            Self::DanglingOutSerial { .. } => FindingKind::DanglingOutSerial,
        }
    }
}

impl std::fmt::Display for IntegrityFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeBalance { product_id, qty_in, qty_out, balance } => write!(
                f,
                "{product_id}: received {qty_in} but dispatched {qty_out} (balance {balance})"
            ),
            Self::BelowMinimum { product_id, unit, balance, shortage, .. } => write!(
                f,
                "{product_id}: balance {balance} {unit} (short by {shortage:.0} {unit})"
            ),
            Self::DuplicateSerialIn { serial, count } | Self::DuplicateSerialOut { serial, count } => {
                write!(f, "{serial}: appears {count} times")
            }
            Self::DanglingOutSerial { serial, product_id } => match product_id {
                Some(id) => write!(f, "{serial} ({id})"),
                None => write!(f, "{serial} (no product id)"),
            },
        }
    }
}

/// Findings grouped by check, each group in a deterministic order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IntegrityReport {
    pub negative_balance: Vec<IntegrityFinding>,
    pub below_minimum: Vec<IntegrityFinding>,
    pub duplicate_serial_in: Vec<IntegrityFinding>,
    pub duplicate_serial_out: Vec<IntegrityFinding>,
    pub dangling_out_serial: Vec<IntegrityFinding>,
}

impl IntegrityReport {
    /// All findings, in check order.
    pub fn all(&self) -> impl Iterator<Item = &IntegrityFinding> {
        self.negative_balance
            .iter()
            .chain(&self.below_minimum)
            .chain(&self.duplicate_serial_in)
            .chain(&self.duplicate_serial_out)
            .chain(&self.dangling_out_serial)
    }

    pub fn of_kind(&self, kind: FindingKind) -> &[IntegrityFinding] {
        match kind {
            FindingKind::NegativeBalance => &self.negative_balance,
            FindingKind::BelowMinimum => &self.below_minimum,
            FindingKind::DuplicateSerialIn => &self.duplicate_serial_in,
            FindingKind::DuplicateSerialOut => &self.duplicate_serial_out,
            FindingKind::DanglingOutSerial => &self.dangling_out_serial,
        }
    }

    pub fn len(&self) -> usize {
        self.negative_balance.len()
            + self.below_minimum.len()
            + self.duplicate_serial_in.len()
            + self.duplicate_serial_out.len()
            + self.dangling_out_serial.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Serial ledger + movement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SerialState {
    InStock,
    Deployed {
        project: String,
        dispatched: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SerialRecord {
    pub serial: String,
    pub product_id: Option<String>,
    /// Model of the catalog product, when the product is known.
    pub model: Option<String>,
    pub received: Option<String>,
    #[serde(flatten)]
    pub state: SerialState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SerialLedger {
    pub entries: Vec<SerialRecord>,
}

impl SerialLedger {
    pub fn for_product<'a>(&'a self, product_id: &'a str) -> impl Iterator<Item = &'a SerialRecord> {
        self.entries
            .iter()
            .filter(move |r| r.product_id.as_deref() == Some(product_id))
    }

    pub fn deployed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|r| matches!(r.state, SerialState::Deployed { .. }))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyMovement {
    pub date: NaiveDate,
    pub stock_in: usize,
    pub stock_out: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBalance {
    pub category: String,
    pub balance: i64,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Row and linkage counts over the raw input tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputStats {
    pub products: usize,
    pub stock_in_events: usize,
    pub stock_out_events: usize,
    /// Distinct product identifiers with at least one stock-in event.
    pub products_with_stock_in: usize,
    pub products_with_stock_out: usize,
    /// Events without a product identifier.
    pub unassigned_in: usize,
    pub unassigned_out: usize,
    /// Events whose product identifier is not in the catalog.
    pub unmatched_in: usize,
    pub unmatched_out: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub name: String,
    pub engine_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockReport {
    pub meta: ReportMeta,
    pub input: InputStats,
    pub totals: RunTotals,
    pub summaries: Vec<ProductSummary>,
    pub integrity: IntegrityReport,
    pub category_balances: Vec<CategoryBalance>,
    pub serials: SerialLedger,
    pub movement: Vec<DailyMovement>,
}
