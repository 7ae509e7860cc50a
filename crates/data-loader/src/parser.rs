//! Parser for rating files.
//!
//! Two layouts are understood:
//! - `ratings.csv`: `user,item,rating[,timestamp]`, with an optional header row
//! - `ratings.dat`: `user::item::rating[::timestamp]` (MovieLens 1M)
//!
//! Blank lines are skipped. Every other line must parse, and a failure
//! reports the file and line number.

use crate::error::{DataLoadError, Result};
use crate::types::{ItemId, Rating, UserId};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// On-disk layout of a ratings file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingFormat {
    /// Comma separated, header row allowed
    Csv,
    /// `::` separated, no header
    Dat,
}

impl RatingFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("csv") => Ok(RatingFormat::Csv),
            Some("dat") => Ok(RatingFormat::Dat),
            _ => Err(DataLoadError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }

    fn separator(self) -> &'static str {
        match self {
            RatingFormat::Csv => ",",
            RatingFormat::Dat => "::",
        }
    }
}

/// Read a file as ISO-8859-1 (Latin-1) text.
///
/// MovieLens ships Latin-1 files, and every byte maps directly to a Unicode
/// code point, so this never fails on encoding.
fn read_latin1(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    Ok(bytes.iter().map(|&b| b as char).collect())
}

/// Parse a ratings file, choosing the layout from its extension
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let format = RatingFormat::from_path(path)?;
    let content = read_latin1(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_ratings_str(&content, format, &file_name)
}

/// Parse ratings from already-loaded text
///
/// `file_name` is only used in error messages.
pub fn parse_ratings_str(content: &str, format: RatingFormat, file_name: &str) -> Result<Vec<Rating>> {
    let mut ratings = Vec::new();
    let mut seen_record = false;

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = if idx == 0 { strip_bom(line).trim() } else { line.trim() };
        if line_trimmed.is_empty() {
            continue;
        }

        // A CSV header can only be the first non-empty line
        if format == RatingFormat::Csv && !seen_record && is_csv_header(line_trimmed) {
            seen_record = true;
            continue;
        }
        seen_record = true;

        ratings.push(parse_rating_line(line_trimmed, format, file_name, line_no)?);
    }

    Ok(ratings)
}

/// Byte order marks, both as decoded UTF-8 and as Latin-1 bytes
const BOMS: [&str; 2] = ["\u{FEFF}", "\u{EF}\u{BB}\u{BF}"];

fn strip_bom(line: &str) -> &str {
    BOMS.iter()
        .find_map(|bom| line.strip_prefix(bom))
        .unwrap_or(line)
}

/// A header row has no numeric field among user, item and rating,
/// e.g. `userId,movieId,rating,timestamp`
fn is_csv_header(line: &str) -> bool {
    line.split(',')
        .take(3)
        .all(|field| field.trim().parse::<f64>().is_err())
}

fn parse_rating_line(line: &str, format: RatingFormat, file_name: &str, line_no: usize) -> Result<Rating> {
    let parts: Vec<&str> = line.split(format.separator()).map(str::trim).collect();
    if parts.len() < 3 || parts.len() > 4 {
        return Err(DataLoadError::FieldCountMismatch {
            expected: 4,
            found: parts.len(),
            line: line_no,
        });
    }

    let parse_error = |reason: String| DataLoadError::ParseError {
        file: file_name.to_string(),
        line: line_no,
        reason,
    };

    let user_id = parts[0]
        .parse::<UserId>()
        .map_err(|e| parse_error(format!("Invalid userId: {}", e)))?;
    let item_id = parts[1]
        .parse::<ItemId>()
        .map_err(|e| parse_error(format!("Invalid itemId: {}", e)))?;
    let value = parts[2]
        .parse::<f64>()
        .map_err(|e| parse_error(format!("Invalid rating: {}", e)))?;
    let timestamp = match parts.get(3) {
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|e| parse_error(format!("Invalid timestamp: {}", e)))?,
        None => 0,
    };

    Ok(Rating {
        user_id,
        item_id,
        value,
        timestamp,
    })
}
