use crate::core::ledger::FineLedger;
use crate::db::fines::FineFilter;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::FineExport;
use crate::ui::messages::warning;
use std::path::Path;

/// Logica di alto livello per l'export delle multe.
pub struct ExportLogic;

impl ExportLogic {
    /// Write the neighborhood's fines matching `filter` to `path`.
    /// Returns how many fines were written (0 → no file is created).
    pub fn export(
        pool: &mut DbPool,
        neighborhood_id: i64,
        format: ExportFormat,
        path: &Path,
        filter: &FineFilter,
        force: bool,
    ) -> AppResult<usize> {
        ensure_writable(path, force)?;

        let rows: Vec<FineExport> = FineLedger::list(pool, neighborhood_id, filter)?
            .iter()
            .map(FineExport::from)
            .collect();

        if rows.is_empty() {
            warning("No fines found for the selected filter.");
            return Ok(0);
        }

        match format {
            ExportFormat::Csv => export_csv(&rows, path)?,
            ExportFormat::Json => export_json(&rows, path)?,
        }

        Ok(rows.len())
    }
}
