//! Text measurement for the builtin Helvetica faces, plus truncation and
//! word wrapping.
//!
//! printpdf's builtin fonts carry no metrics, so centred and right-aligned
//! labels are positioned with the standard Adobe AFM advance widths below
//! (units of 1/1000 em, ASCII 32..=126). Characters outside that range use
//! the width of `'n'`-class glyphs.

use crate::canvas::Font;

/// Hard cut applied to card names on the placeholder sheet.
pub const MAX_NAME_CHARS: usize = 45;

const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn advance(font: Font, c: char) -> u16 {
    let table = match font {
        // Oblique faces share the upright advance widths.
        Font::Regular | Font::Oblique => &HELVETICA,
        Font::Bold => &HELVETICA_BOLD,
    };
    match c as u32 {
        code @ 32..=126 => table[(code - 32) as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// Rendered width of `text` in points at `size` pt.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| advance(font, c) as u32).sum();
    units as f32 * size / 1000.0
}

/// First `max_chars` characters of `text`, cut without regard to words.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Greedy word wrap to at most `max_lines` lines of `max_width` points.
///
/// Words longer than a full line are split by character. When the text does
/// not fit, the last line ends with `"..."`.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32, max_lines: usize) -> Vec<String> {
    if max_lines == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, font, size) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        // Split words that cannot fit on a line of their own.
        let mut rest = word;
        while text_width(rest, font, size) > max_width {
            let cut = fit_prefix(rest, font, size, max_width).max(1);
            let (head, tail) = rest.split_at(char_boundary(rest, cut));
            lines.push(head.to_string());
            rest = tail;
        }
        current = rest.to_string();
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = ellipsize(last, font, size, max_width);
        }
    }
    lines
}

/// Number of leading characters of `text` that fit in `max_width`.
fn fit_prefix(text: &str, font: Font, size: f32, max_width: f32) -> usize {
    let mut width = 0.0;
    let mut count = 0;
    for c in text.chars() {
        width += advance(font, c) as f32 * size / 1000.0;
        if width > max_width {
            break;
        }
        count += 1;
    }
    count
}

fn char_boundary(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn ellipsize(line: &str, font: Font, size: f32, max_width: f32) -> String {
    const ELLIPSIS: &str = "...";
    let room = (max_width - text_width(ELLIPSIS, font, size)).max(0.0);
    let keep = fit_prefix(line, font, size, room);
    format!("{}{ELLIPSIS}", truncate_chars(line, keep).trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_is_a_hard_cut() {
        let name = "A".repeat(30) + " " + &"B".repeat(29);
        assert_eq!(name.chars().count(), 60);
        let cut = truncate_chars(&name, MAX_NAME_CHARS);
        assert_eq!(cut.chars().count(), 45);
        assert_eq!(cut, &name[..45]);
        assert!(cut.ends_with('B'));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("Pokémon", 4), "Poké");
        assert_eq!(truncate_chars("short", 45), "short");
    }

    #[test]
    fn widths_use_afm_metrics() {
        // 'W' is 944 units in both faces; bold digits match regular digits.
        assert!((text_width("W", Font::Regular, 10.0) - 9.44).abs() < 1e-4);
        assert_eq!(
            text_width("0123", Font::Bold, 8.0),
            text_width("0123", Font::Regular, 8.0)
        );
        assert!(text_width("mmm", Font::Bold, 8.0) > text_width("mmm", Font::Regular, 8.0));
        assert_eq!(text_width("", Font::Regular, 12.0), 0.0);
    }

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_text("Team Rocket's Mewtwo ex", Font::Regular, 10.0, 80.0, 3);
        assert!(lines.len() >= 2, "{lines:?}");
        for line in &lines {
            assert!(text_width(line, Font::Regular, 10.0) <= 80.0, "{line}");
        }
        assert_eq!(lines.join(" "), "Team Rocket's Mewtwo ex");
    }

    #[test]
    fn overflow_gets_ellipsis() {
        let lines = wrap_text(
            "one two three four five six seven eight nine ten",
            Font::Regular,
            10.0,
            50.0,
            2,
        );
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("..."), "{lines:?}");
        assert!(text_width(&lines[1], Font::Regular, 10.0) <= 50.0);
    }

    #[test]
    fn long_words_are_split() {
        let lines = wrap_text("Supercalifragilistic", Font::Bold, 10.0, 30.0, 10);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "Supercalifragilistic");
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap_text("", Font::Regular, 10.0, 100.0, 2).is_empty());
        assert!(wrap_text("abc", Font::Regular, 10.0, 100.0, 0).is_empty());
    }
}
