//! Row filtering: keep the rows of one Pokémon set and project them to
//! [`PlaceholderRecord`]s.

use crate::error::BinderError;
use crate::pipeline::columns::SheetColumns;
use crate::pipeline::table::{cell, CsvTable};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Substring the (folded, lower-cased) game field must contain.
pub const GAME_KEYWORD: &str = "pokemon";

/// One card slot to lay out: name, collector number, raw market price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderRecord {
    pub card_name: String,
    pub card_number: String,
    pub market_price_raw: String,
}

impl PlaceholderRecord {
    pub fn new(
        card_name: impl Into<String>,
        card_number: impl Into<String>,
        market_price_raw: impl Into<String>,
    ) -> Self {
        Self {
            card_name: card_name.into(),
            card_number: card_number.into(),
            market_price_raw: market_price_raw.into(),
        }
    }
}

/// Lower-case and strip common Latin diacritics so `"Pokémon"` matches
/// `"pokemon"`.
pub fn fold(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Whether a row with these game/set values belongs to `target_set`.
pub fn row_matches(game: &str, set: &str, target_set: &str) -> bool {
    fold(game).contains(GAME_KEYWORD) && set.trim().to_lowercase() == target_set.trim().to_lowercase()
}

/// Keep the rows of `target_set`, in feed order.
///
/// Fails with [`BinderError::MissingColumns`] when the game, set, or name
/// column cannot be resolved. Missing number or price columns are not an
/// error: those fields are empty for every record. No match is an empty
/// vector, not an error.
pub fn filter_rows(
    table: &CsvTable,
    columns: &SheetColumns,
    target_set: &str,
) -> Result<Vec<PlaceholderRecord>, BinderError> {
    let missing = columns.missing_required();
    if !missing.is_empty() {
        return Err(BinderError::MissingColumns {
            missing,
            found: table.headers().to_vec(),
        });
    }

    let game = columns.game.as_ref().map(|c| c.index);
    let set = columns.set.as_ref().map(|c| c.index);
    let name = columns.name.as_ref().map(|c| c.index);
    let number = columns.number.as_ref().map(|c| c.index);
    let price = columns.price.as_ref().map(|c| c.index);

    let records: Vec<PlaceholderRecord> = table
        .rows()
        .iter()
        .filter(|row| row_matches(cell(row, game), cell(row, set), target_set))
        .map(|row| PlaceholderRecord {
            card_name: cell(row, name).to_string(),
            card_number: cell(row, number).to_string(),
            market_price_raw: cell(row, price).to_string(),
        })
        .collect();

    info!(
        "Filtered {} of {} rows for set '{}'",
        records.len(),
        table.len(),
        target_set
    );
    if number.is_none() || price.is_none() {
        debug!(
            "Optional columns absent: number={} price={}",
            number.is_none(),
            price.is_none()
        );
    }
    Ok(records)
}

static RE_LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#?\s*(\d+(?:\.\d+)?)").unwrap());

/// Numeric sort key of a collector number (`"001/182"` → 1), if any.
pub fn number_key(card_number: &str) -> Option<f64> {
    RE_LEADING_NUMBER
        .captures(card_number)
        .and_then(|caps| caps[1].parse::<f64>().ok())
}

/// Sort by numeric card number, then name. Rows without a numeric number
/// come last, ordered by name. The sort is stable.
pub fn sort_records(records: &mut [PlaceholderRecord]) {
    records.sort_by(|a, b| {
        let by_number = match (number_key(&a.card_number), number_key(&b.card_number)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_number.then_with(|| a.card_name.cmp(&b.card_name))
    });
}
