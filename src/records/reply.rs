//! Raw reply payload as returned by the announcement API
//!
//! The upstream shape drifts between casings (`pengumuman` vs `Pengumuman`,
//! `JudulPengumuman` vs `Judul_Pengumuman`), and scalar fields are sometimes
//! numbers or `null`. Everything is optional and read leniently.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Top-level API body: `{ "ResultCount": n, "Replies": [...] }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(rename = "ResultCount", default, deserialize_with = "lenient_count")]
    pub result_count: Option<u64>,
    /// Entries that fail to parse are dropped, not the whole page
    #[serde(rename = "Replies", default, deserialize_with = "lenient_list")]
    pub replies: Vec<RawReply>,
}

/// One entry of `Replies`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReply {
    #[serde(
        default,
        alias = "Pengumuman",
        deserialize_with = "null_as_default"
    )]
    pub pengumuman: Announcement,
    #[serde(default, alias = "Attachments", deserialize_with = "lenient_list")]
    pub attachments: Vec<Attachment>,
    /// Issuer code some replies carry beside `pengumuman`
    #[serde(
        rename = "Kode_Emiten",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kode_emiten: Option<String>,
}

/// The `pengumuman` object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    #[serde(rename = "Kode_Emiten", default, deserialize_with = "lenient_string")]
    pub kode_emiten: Option<String>,
    #[serde(
        rename = "JudulPengumuman",
        alias = "Judul_Pengumuman",
        default,
        deserialize_with = "lenient_string"
    )]
    pub judul: Option<String>,
    #[serde(rename = "PerihalPengumuman", default, deserialize_with = "lenient_string")]
    pub perihal: Option<String>,
    #[serde(rename = "NoPengumuman", default, deserialize_with = "lenient_string")]
    pub nomor: Option<String>,
    #[serde(
        rename = "TglPengumuman",
        alias = "Tanggal",
        default,
        deserialize_with = "lenient_string"
    )]
    pub tanggal: Option<String>,
}

/// One attachment entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "OriginalFilename", default, deserialize_with = "lenient_string")]
    pub original_filename: Option<String>,
    #[serde(rename = "PDFFilename", default, deserialize_with = "lenient_string")]
    pub pdf_filename: Option<String>,
}

impl Attachment {
    /// Original filename, falling back to the stored PDF name
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.original_filename
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.pdf_filename.as_deref())
            .filter(|s| !s.is_empty())
    }
}

impl RawReply {
    /// Issuer code, trimmed; the top-level code fills in for a blank one
    #[must_use]
    pub fn code(&self) -> &str {
        [&self.pengumuman.kode_emiten, &self.kode_emiten]
            .into_iter()
            .filter_map(|c| c.as_deref())
            .map(str::trim)
            .find(|c| !c.is_empty())
            .unwrap_or("")
    }

    /// Announcement title, trimmed
    #[must_use]
    pub fn title(&self) -> &str {
        self.pengumuman.judul.as_deref().unwrap_or("").trim()
    }

    /// Server-supplied date string, trimmed
    #[must_use]
    pub fn raw_date(&self) -> &str {
        self.pengumuman.tanggal.as_deref().unwrap_or("").trim()
    }

    /// Candidate fields for keyword matching
    ///
    /// Title, subject, announcement number, issuer code, then attachment
    /// filenames. Empty fields are skipped.
    #[must_use]
    pub fn text_fields(&self) -> Vec<&str> {
        let p = &self.pengumuman;
        [&p.judul, &p.perihal, &p.nomor]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .chain(std::iter::once(self.code()))
            .chain(self.attachments.iter().filter_map(Attachment::filename))
            .filter(|s| !s.trim().is_empty())
            .collect()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Array whose malformed elements are skipped; anything else reads as empty
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => return Ok(Vec::new()),
        Some(other) => {
            warn!("Expected a JSON array, ignoring {}", other);
            return Ok(Vec::new());
        }
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping malformed entry: {}", e);
                None
            }
        })
        .collect())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
