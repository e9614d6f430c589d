//! Semicolon-delimited CSV with the fixed three-column header

use std::io::Write;
use std::path::Path;

use tracing::info;

use super::ensure_parent;
use crate::error::HarvestResult;
use crate::records::AnnouncementRecord;
use crate::utils::constants::{CSV_DELIMITER, CSV_HEADER};

/// Write `records` as CSV to any writer
///
/// The date column carries the server's raw date string.
pub fn write_csv<W: Write>(records: &[AnnouncementRecord], writer: W) -> HarvestResult<()> {
    let mut csv = ::csv::WriterBuilder::new()
        .delimiter(CSV_DELIMITER)
        .from_writer(writer);
    csv.write_record(CSV_HEADER)?;
    for record in records {
        csv.write_record([record.code(), record.title(), record.raw_date()])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `records` to `path`, creating parent directories
pub fn save_csv(records: &[AnnouncementRecord], path: &Path) -> HarvestResult<()> {
    ensure_parent(path)?;
    let file = std::fs::File::create(path)?;
    write_csv(records, std::io::BufWriter::new(file))?;
    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_semicolons() {
        let records = vec![AnnouncementRecord::new(
            "ABC",
            "Keterbukaan; Transaksi Material",
            "2024-01-01T08:00:00",
            "Transaksi Material",
        )];
        let mut out = Vec::new();
        write_csv(&records, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Kode_Emiten;Judul_Pengumuman;Tanggal_Pengumuman"));
        assert_eq!(
            lines.next(),
            Some("ABC;\"Keterbukaan; Transaksi Material\";2024-01-01T08:00:00")
        );
        assert_eq!(lines.next(), None);
    }
}
