use crate::errors::{AppError, AppResult};
use crate::export::{FineExport, notify_export_success};
use crate::ui::messages::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Pretty-printed JSON array, one object per fine.
pub(crate) fn export_json(fines: &[FineExport], path: &Path) -> AppResult<()> {
    info(format!("Exporting to JSON: {}", path.display()));

    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, fines)
        .map_err(|e| AppError::Export(format!("JSON serialization error: {e}")))?;
    out.write_all(b"\n")?;
    out.flush()?;

    notify_export_success("JSON", fines.len(), path);
    Ok(())
}

/// CSV with a header row derived from the `FineExport` field names.
pub(crate) fn export_csv(fines: &[FineExport], path: &Path) -> AppResult<()> {
    info(format!("Exporting to CSV: {}", path.display()));

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| AppError::Export(format!("CSV open error: {e}")))?;

    for item in fines {
        wtr.serialize(item)
            .map_err(|e| AppError::Export(format!("CSV write error: {e}")))?;
    }
    wtr.flush()?;

    notify_export_success("CSV", fines.len(), path);
    Ok(())
}
