//! Pipeline stages for placeholder sheets and image binders.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ table ──▶ columns ──▶ filter ──▶ layout ──▶ render
//! (URL/path) (csv)    (resolve)   (set)     (grid)     (canvas)
//!
//! input ──▶ table ──▶ images ──▶ binder
//!                     (fetch)    (3×3 grid)
//! ```
//!
//! 1. [`input`] reads the CSV from a URL or a local path
//! 2. [`table`] parses it into headers plus string rows
//! 3. [`columns`] maps candidate header names onto column indexes
//! 4. [`filter`] keeps the rows of one Pokémon set and sorts them
//! 5. [`layout`] assigns each record a page and slot; pages are lazy
//! 6. [`render`] draws the placeholder slots through a [`crate::canvas::Canvas`]
//!
//! [`images`] and [`binder`] are the download and photo-binder passes;
//! [`price`] and [`text`] are shared formatting helpers.

pub mod binder;
pub mod columns;
pub mod filter;
pub mod images;
pub mod input;
pub mod layout;
pub mod price;
pub mod render;
pub mod table;
pub mod text;
