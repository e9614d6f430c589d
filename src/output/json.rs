//! Pretty JSON array of records

use std::io::Write;
use std::path::Path;

use tracing::info;

use super::ensure_parent;
use crate::error::HarvestResult;
use crate::records::AnnouncementRecord;

pub fn write_json<W: Write>(records: &[AnnouncementRecord], mut writer: W) -> HarvestResult<()> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write `records` to `path`, creating parent directories
pub fn save_json(records: &[AnnouncementRecord], path: &Path) -> HarvestResult<()> {
    ensure_parent(path)?;
    let file = std::fs::File::create(path)?;
    write_json(records, std::io::BufWriter::new(file))?;
    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
