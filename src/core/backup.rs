use crate::db::log::audit_or_warn;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{confirm, info, success, warning};
use rusqlite::Connection;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Copy the database file to `dest_file`, optionally zipped.
    /// Returns the path actually written.
    pub fn backup(db_path: &str, dest_file: &Path, compress: bool, force: bool) -> AppResult<PathBuf> {
        let src = Path::new(db_path);

        if !src.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Database not found: {}", src.display()),
            )
            .into());
        }

        if let Some(parent) = dest_file.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        if dest_file.exists() && !force {
            warning(format!("The file '{}' already exists.", dest_file.display()));
            if !confirm("Overwrite?")? {
                return Err(AppError::Other("Backup cancelled by user".into()));
            }
        }

        // snapshot through SQLite so a concurrent writer cannot tear the copy
        let conn = Connection::open(src)?;
        if dest_file.exists() {
            fs::remove_file(dest_file)?;
        }
        conn.execute("VACUUM INTO ?1", [dest_file.to_string_lossy().as_ref()])?;
        success(format!("Backup created: {}", dest_file.display()));

        let final_path = if compress {
            let compressed = compress_backup(dest_file)?;
            if let Err(e) = fs::remove_file(dest_file) {
                warning(format!("Failed to remove uncompressed backup: {}", e));
            }
            compressed
        } else {
            dest_file.to_path_buf()
        };

        audit_or_warn(
            &conn,
            "backup",
            &final_path.to_string_lossy(),
            if compress {
                "Backup created and compressed"
            } else {
                "Backup created"
            },
        );

        Ok(final_path)
    }
}

/// Compress a backup using .zip
fn compress_backup(path: &Path) -> AppResult<PathBuf> {
    let zip_path = path.with_extension("zip");
    let file = fs::File::create(&zip_path)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let entry = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "ronda.sqlite".to_string());

    let mut f = fs::File::open(path)?;
    zip.start_file(entry, options).map_err(io::Error::other)?;

    io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(io::Error::other)?;

    info(format!("Compressed: {}", zip_path.display()));

    Ok(zip_path)
}
