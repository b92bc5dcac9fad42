//! Column resolution: find the actual header for a semantic field.
//!
//! Feeds name the same field differently (`"Set Name"`, `"set name"`,
//! `"groupId"`). Each field has an ordered list of candidate names; the first
//! candidate that matches a header (case-insensitive, whitespace-trimmed)
//! wins.

/// Candidate headers for the game / category field.
pub const GAME: &[&str] = &["Game", "game", "categoryId"];

/// Candidate headers for the set name field.
pub const SET: &[&str] = &["Set Name", "Set", "set name", "groupId"];

/// Candidate headers for the card name field.
pub const CARD_NAME: &[&str] = &["name", "Name", "Card name"];

/// Candidate headers for the card number field.
pub const CARD_NUMBER: &[&str] = &["extNumber", "Card Number", "number"];

/// Candidate headers for the market price field.
pub const MARKET_PRICE: &[&str] = &[
    "marketPrice",
    "MarketPrice",
    "market price",
    "market_price",
    "Market",
];

/// Candidate headers for the product image URL.
pub const IMAGE_URL: &[&str] = &["imageUrl", "image url", "image_url"];

/// Candidate headers for the product id used to name downloaded images.
pub const PRODUCT_ID: &[&str] = &["productId", "product id", "product_id"];

/// Candidate headers for the product name recorded in image metadata.
pub const PRODUCT_NAME: &[&str] = &["productName", "product name", "name", "Card name"];

/// A header that matched one of the candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Position of the header in the row.
    pub index: usize,
    /// The header exactly as it appears in the CSV.
    pub header: String,
}

fn normalise(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Return the first candidate (in priority order) present in `headers`.
pub fn resolve_column(headers: &[String], candidates: &[&str]) -> Option<Column> {
    let normalised: Vec<String> = headers.iter().map(|h| normalise(h)).collect();

    candidates.iter().find_map(|candidate| {
        let key = normalise(candidate);
        normalised
            .iter()
            .position(|h| *h == key)
            .map(|index| Column {
                index,
                header: headers[index].clone(),
            })
    })
}

/// Resolved columns for the placeholder sheet.
#[derive(Debug, Clone, Default)]
pub struct SheetColumns {
    pub game: Option<Column>,
    pub set: Option<Column>,
    pub name: Option<Column>,
    pub number: Option<Column>,
    pub price: Option<Column>,
}

impl SheetColumns {
    pub fn resolve(headers: &[String]) -> Self {
        Self {
            game: resolve_column(headers, GAME),
            set: resolve_column(headers, SET),
            name: resolve_column(headers, CARD_NAME),
            number: resolve_column(headers, CARD_NUMBER),
            price: resolve_column(headers, MARKET_PRICE),
        }
    }

    /// Labels of the mandatory fields that did not resolve.
    pub fn missing_required(&self) -> Vec<String> {
        [
            ("Game", &self.game),
            ("Set Name", &self.set),
            ("Card Name", &self.name),
        ]
        .into_iter()
        .filter(|(_, col)| col.is_none())
        .map(|(label, _)| label.to_string())
        .collect()
    }
}
