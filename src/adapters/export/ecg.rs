//! ECG file parser
//!
//! The device writes one CSV-like text file per recording:
//!
//! ```text
//! Name,Jane Doe                      ┐
//! Date of Birth,1 Jan 1980           │
//! Recorded Date,2021-05-01 10:00:00  │ 12 metadata lines
//! Sample Rate,512,000 hertz          │ (comma decimals split values in two)
//! ...                                ┘
//!                                    ← blank separator
//! -12,345                            ┐ one sample per line,
//! -11,987                            ┘ comma as decimal separator
//! ```

use super::layout::stem_of;
use crate::domain::{Attributes, Ecg, ParseError, Result};
use std::fs;
use std::path::Path;

/// Number of leading metadata lines
pub const METADATA_LINES: usize = 12;

/// First line holding a sample (after metadata and the blank separator)
const FIRST_SAMPLE_LINE: usize = METADATA_LINES + 1;

/// Parser for exported ECG files
pub struct EcgParser;

impl EcgParser {
    /// Parses the ECG file at `path`, named after the file stem
    pub fn parse_file(path: &Path) -> Result<Ecg> {
        let name = stem_of(path);
        let text = fs::read_to_string(path).map_err(|e| ParseError::EcgFormat {
            name: name.clone(),
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::parse_str(&name, &text)
    }

    /// Reads only the metadata header of the ECG file at `path`
    pub fn parse_header(path: &Path) -> Result<Attributes> {
        let name = stem_of(path);
        let text = fs::read_to_string(path).map_err(|e| ParseError::EcgFormat {
            name: name.clone(),
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        let lines: Vec<&str> = text.lines().take(METADATA_LINES).collect();
        if lines.len() < METADATA_LINES {
            return Err(ParseError::EcgFormat {
                name,
                reason: format!(
                    "expected {METADATA_LINES} header lines, found {}",
                    lines.len()
                ),
            }
            .into());
        }
        Ok(parse_metadata(&lines))
    }

    /// Parses ECG text under the given name
    pub fn parse_str(name: &str, text: &str) -> Result<Ecg> {
        let format_error = |reason: String| ParseError::EcgFormat {
            name: name.to_string(),
            reason,
        };

        let lines: Vec<&str> = text.lines().collect();
        if lines.len() < FIRST_SAMPLE_LINE {
            return Err(format_error(format!(
                "expected at least {FIRST_SAMPLE_LINE} lines, found {}",
                lines.len()
            ))
            .into());
        }

        let meta = parse_metadata(&lines[..METADATA_LINES]);

        let mut samples = Vec::with_capacity(lines.len() - FIRST_SAMPLE_LINE);
        for (offset, line) in lines[FIRST_SAMPLE_LINE..].iter().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let sample = line.replace(',', ".").parse::<f64>().map_err(|e| {
                format_error(format!(
                    "line {}: invalid sample '{line}': {e}",
                    FIRST_SAMPLE_LINE + offset + 1
                ))
            })?;
            samples.push(sample);
        }

        tracing::debug!(ecg = name, samples = samples.len(), "Parsed ECG");
        Ok(Ecg::new(name, samples, meta))
    }
}

/// Reads the `key,value` header lines
///
/// A value written with a comma decimal separator arrives split across two
/// fields and is rejoined with a `.`. Values with more commas are kept whole.
fn parse_metadata(lines: &[&str]) -> Attributes {
    let mut meta = Attributes::new();
    for line in lines {
        if line.trim().is_empty() || !line.contains(',') {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        let key = fields[0].trim();
        let value = match fields.len() {
            2 => fields[1].trim().to_string(),
            3 => format!("{}.{}", fields[1].trim(), fields[2].trim()),
            _ => fields[1..].join(",").trim().to_string(),
        };
        meta.insert(key.to_string(), value);
    }
    meta
}
