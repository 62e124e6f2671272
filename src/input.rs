// Reading the book list
use std::path::Path;
use tracing::{info, warn};

use crate::model::{BookRequest, InputError};

pub const NAME_COLUMN: &str = "book_name";
pub const FLIPKART_COLUMN: &str = "flipkart_link";
pub const AMAZON_COLUMN: &str = "amazon_link";

/// Reads at most `max_books` rows from the input table and keeps the usable ones.
///
/// Blank names and rows without any link are skipped with a log line. The
/// cap applies to rows read, skipped rows included.
pub fn read_books(path: &Path, max_books: usize) -> Result<Vec<BookRequest>, InputError> {
    if !path.exists() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }
    info!("Using input file: {}", path.display());

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let name_idx = column(NAME_COLUMN).ok_or_else(|| InputError::MissingColumn {
        column: NAME_COLUMN.to_string(),
        found: headers.clone(),
    })?;
    let flipkart_idx = column(FLIPKART_COLUMN);
    let amazon_idx = column(AMAZON_COLUMN);
    if flipkart_idx.is_none() && amazon_idx.is_none() {
        return Err(InputError::NoLinkColumns);
    }

    let mut books = Vec::new();
    for (line, row) in reader.records().take(max_books).enumerate() {
        let row = row?;
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).and_then(non_blank);

        let Some(title) = cell(Some(name_idx)) else {
            warn!("Skipping row {} - blank book name", line + 1);
            continue;
        };
        let flipkart_url = cell(flipkart_idx);
        let amazon_url = cell(amazon_idx);

        if flipkart_url.is_none() && amazon_url.is_none() {
            warn!("Skipping '{}' - no links provided", title);
            continue;
        }

        books.push(BookRequest {
            title,
            amazon_url,
            flipkart_url,
        });
    }

    if books.is_empty() {
        return Err(InputError::NoUsableRows);
    }
    Ok(books)
}

/// Trimmed cell value, or `None` for blanks and the `nan` spreadsheet marker.
fn non_blank(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() || value == "nan" {
        None
    } else {
        Some(value.to_string())
    }
}
