use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde_json::Value;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::reference::id_string;

/// Partial-progress file kept next to the output (`<output>.tmp`).
pub fn checkpoint_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write records as pretty JSON atomically.
///
/// Uses atomic-write-file so an interrupted run never leaves a truncated
/// file behind.
pub fn save_records(path: &Path, records: &[Value]) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    {
        let mut writer = BufWriter::new(&mut file);
        serde_json::to_writer_pretty(&mut writer, records)
            .with_context(|| format!("Failed to serialize records to {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to write records to {}", path.display()))?;
    }

    file.commit()
        .with_context(|| format!("Failed to save records to {}", path.display()))?;

    Ok(())
}

/// Load a JSON array of records.
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open records at {}", path.display()))?;
    let records: Vec<Value> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse records at {}", path.display()))?;
    Ok(records)
}

/// Load the checkpoint if one exists.
pub fn load_checkpoint(path: &Path) -> Result<Option<Vec<Value>>> {
    if !path.exists() {
        return Ok(None);
    }
    load_records(path)
        .context("Failed to load checkpoint")
        .map(Some)
}

/// Overlay checkpointed records onto the input records by id.
///
/// Input order is kept; a record whose id is present in the checkpoint is
/// replaced by the checkpointed version. Records without an id are kept
/// from the input.
pub fn merge_checkpoint(records: Vec<Value>, partial: Vec<Value>, id_column: &str) -> Vec<Value> {
    let mut by_id: HashMap<String, Value> = HashMap::new();
    for rec in partial {
        let id = id_string(rec.get(id_column));
        if !id.is_empty() {
            by_id.insert(id, rec);
        }
    }

    records
        .into_iter()
        .map(|rec| {
            let id = id_string(rec.get(id_column));
            match by_id.get(&id) {
                Some(saved) if !id.is_empty() => saved.clone(),
                _ => rec,
            }
        })
        .collect()
}

/// Remove the checkpoint; a missing file is not an error.
pub fn remove_checkpoint(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove checkpoint"),
    }
}
