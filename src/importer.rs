use std::borrow::Cow;
use std::path::Path;

use crate::error::{Result, SalesError};
use crate::models::Transaction;

pub const FIELD_DELIMITER: char = '|';
pub const FIELD_COUNT: usize = 8;

// ---------------------------------------------------------------------------
// Encodings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
}

impl TextEncoding {
    pub fn from_label(label: &str) -> Result<Self> {
        match label.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            "cp1252" | "windows-1252" => Ok(Self::Windows1252),
            _ => Err(SalesError::UnknownEncoding(label.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
            Self::Windows1252 => "cp1252",
        }
    }

    /// Strict decode: `None` if any byte sequence is invalid for this encoding.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => encoding_rs::UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(Cow::into_owned),
            // ISO-8859-1 maps every byte to the code point of the same value.
            Self::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
            Self::Windows1252 => encoding_rs::WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(Cow::into_owned),
        }
    }
}

/// Resolve configured encoding labels, dropping the ones we don't know.
pub fn resolve_encodings(labels: &[String]) -> Vec<TextEncoding> {
    labels
        .iter()
        .filter_map(|label| match TextEncoding::from_label(label) {
            Ok(enc) => Some(enc),
            Err(e) => {
                log::warn!("{e}, skipping");
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// File reading
// ---------------------------------------------------------------------------

/// Read the sales file and return its data lines.
///
/// Each encoding is tried in order and the first full decode wins. The first
/// line is the header and is skipped; remaining lines are trimmed and blank
/// ones dropped. A missing file, an unreadable file, or a file no encoding can
/// decode all yield an empty list.
pub fn read_sales_data(path: &Path, encodings: &[TextEncoding]) -> Vec<String> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("File not found: {}", path.display());
            return Vec::new();
        }
        Err(e) => {
            log::warn!("Could not read {}: {e}", path.display());
            return Vec::new();
        }
    };

    for enc in encodings {
        match enc.decode(&bytes) {
            Some(text) => {
                let lines = data_lines(&text);
                log::info!(
                    "Loaded {} with encoding {}, lines: {}",
                    path.display(),
                    enc.label(),
                    lines.len()
                );
                return lines;
            }
            None => log::info!("Failed with encoding {}, trying next...", enc.label()),
        }
    }

    log::warn!("Could not read {} with the given encodings", path.display());
    Vec::new()
}

fn data_lines(text: &str) -> Vec<String> {
    text.lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

pub fn parse_quantity(raw: &str) -> Option<i64> {
    raw.replace(',', "").trim().parse().ok()
}

pub fn parse_price(raw: &str) -> Option<f64> {
    raw.replace(',', "").trim().parse().ok()
}

/// Parse one pipe-delimited line. Wrong field count or unparseable numbers
/// yield `None`.
pub fn parse_line(line: &str) -> Option<Transaction> {
    let parts: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if parts.len() != FIELD_COUNT {
        return None;
    }
    let quantity = parse_quantity(parts[4])?;
    let unit_price = parse_price(parts[5])?;
    Some(Transaction {
        transaction_id: parts[0].to_string(),
        date: parts[1].to_string(),
        product_id: parts[2].to_string(),
        product_name: parts[3].replace(',', ""),
        quantity,
        unit_price,
        customer_id: parts[6].to_string(),
        region: parts[7].to_string(),
    })
}

/// Parse raw lines into transaction candidates, preserving input order.
pub fn parse_transactions<S: AsRef<str>>(lines: &[S]) -> Vec<Transaction> {
    let parsed: Vec<Transaction> = lines
        .iter()
        .filter_map(|line| parse_line(line.as_ref()))
        .collect();
    log::info!("Parsed {} of {} lines", parsed.len(), lines.len());
    parsed
}
