//! Summary table export.
//!
//! Writes one row per product in catalog order. The file starts with a UTF-8
//! BOM so spreadsheet apps detect the encoding of non-ASCII product names.

use std::io::Write;
use std::path::Path;

use stockcheck_recon::ProductSummary;

use crate::render::format_threshold;
use crate::CliError;

const HEADERS: [&str; 11] = [
    "Product ID",
    "Category",
    "Brand",
    "Model",
    "Unit",
    "Qty In",
    "Qty Out",
    "Balance",
    "Min Stock",
    "Status",
    "Note",
];

/// Write the summary table as CSV (no BOM).
pub fn write_summary_csv<W: Write>(out: W, summaries: &[ProductSummary]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADERS)?;
    for s in summaries {
        let qty_in = s.qty_in.to_string();
        let qty_out = s.qty_out.to_string();
        let balance = s.balance().to_string();
        let min_stock = s.min_stock.map(format_threshold).unwrap_or_else(|| "-".into());
        writer.write_record([
            s.product_id.as_str(),
            s.category.as_str(),
            s.brand.as_str(),
            s.model.as_str(),
            s.unit.as_str(),
            qty_in.as_str(),
            qty_out.as_str(),
            balance.as_str(),
            min_stock.as_str(),
            s.status.label(),
            s.note.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the summary table to `path`, creating parent directories as needed.
pub fn write_summary_file(path: &Path, summaries: &[ProductSummary]) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| CliError::runtime(format!("cannot create {}: {e}", parent.display())))?;
    }

    let mut buf: Vec<u8> = "\u{feff}".as_bytes().to_vec();
    write_summary_csv(&mut buf, summaries)
        .map_err(|e| CliError::runtime(format!("CSV write error: {e}")))?;

    std::fs::write(path, buf)
        .map_err(|e| CliError::runtime(format!("cannot write {}: {e}", path.display())))?;
    log::info!("wrote {} summary rows to {}", summaries.len(), path.display());
    Ok(())
}
