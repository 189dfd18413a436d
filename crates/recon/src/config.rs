use serde::Deserialize;

use crate::error::StockError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StockConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub products: ProductSource,
    pub stock_in: EventSourceConfig,
    pub stock_out: EventSourceConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_name() -> String {
    "stock".into()
}

// ---------------------------------------------------------------------------
// Sources + column mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ProductSource {
    pub file: String,
    #[serde(default)]
    pub columns: ProductColumns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventSourceConfig {
    pub file: String,
    #[serde(default)]
    pub columns: EventColumns,
}

/// Catalog column names. `min_stock` may be missing from the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProductColumns {
    pub id: String,
    pub category: String,
    pub brand: String,
    pub model: String,
    pub unit: String,
    pub min_stock: String,
}

impl Default for ProductColumns {
    fn default() -> Self {
        Self {
            id: "Product ID".into(),
            category: "Category".into(),
            brand: "Brand".into(),
            model: "Model".into(),
            unit: "Unit".into(),
            min_stock: "Min Stock".into(),
        }
    }
}

/// Stock event column names. `date` and `project` may be missing from the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventColumns {
    pub product_id: String,
    pub serial: String,
    pub date: String,
    pub project: String,
}

impl Default for EventColumns {
    fn default() -> Self {
        Self {
            product_id: "Product ID".into(),
            serial: "Serial Number".into(),
            date: "Date".into(),
            project: "Project Name".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Report + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Findings listed per duplicate/dangling check before truncating.
    pub sample_limit: usize,
    /// Most recent dates kept in the movement trend.
    pub trend_days: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            sample_limit: 5,
            trend_days: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub summary_csv: String,
    pub json: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            summary_csv: "stock_analysis_summary.csv".into(),
            json: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl StockConfig {
    /// Config for three files using the default column names.
    pub fn with_files(products: &str, stock_in: &str, stock_out: &str) -> Self {
        Self {
            name: default_name(),
            products: ProductSource {
                file: products.into(),
                columns: ProductColumns::default(),
            },
            stock_in: EventSourceConfig {
                file: stock_in.into(),
                columns: EventColumns::default(),
            },
            stock_out: EventSourceConfig {
                file: stock_out.into(),
                columns: EventColumns::default(),
            },
            report: ReportConfig::default(),
            output: OutputConfig::default(),
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, StockError> {
        let config: StockConfig =
            toml::from_str(input).map_err(|e| StockError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StockError> {
        let files = [
            ("products", &self.products.file),
            ("stock_in", &self.stock_in.file),
            ("stock_out", &self.stock_out.file),
        ];
        for (source, file) in files {
            if file.trim().is_empty() {
                return Err(StockError::ConfigValidation(format!(
                    "{source}: file must not be empty"
                )));
            }
        }

        let p = &self.products.columns;
        let product_cols = [
            ("id", &p.id),
            ("category", &p.category),
            ("brand", &p.brand),
            ("model", &p.model),
            ("unit", &p.unit),
            ("min_stock", &p.min_stock),
        ];
        for (key, name) in product_cols {
            if name.trim().is_empty() {
                return Err(StockError::ConfigValidation(format!(
                    "products.columns.{key} must not be empty"
                )));
            }
        }

        for (source, cols) in [("stock_in", &self.stock_in.columns), ("stock_out", &self.stock_out.columns)] {
            let event_cols = [
                ("product_id", &cols.product_id),
                ("serial", &cols.serial),
                ("date", &cols.date),
                ("project", &cols.project),
            ];
            for (key, name) in event_cols {
                if name.trim().is_empty() {
                    return Err(StockError::ConfigValidation(format!(
                        "{source}.columns.{key} must not be empty"
                    )));
                }
            }
        }

        if self.report.sample_limit == 0 {
            return Err(StockError::ConfigValidation(
                "report.sample_limit must be at least 1".into(),
            ));
        }
        if self.report.trend_days == 0 {
            return Err(StockError::ConfigValidation(
                "report.trend_days must be at least 1".into(),
            ));
        }
        if self.output.summary_csv.trim().is_empty() {
            return Err(StockError::ConfigValidation(
                "output.summary_csv must not be empty".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
