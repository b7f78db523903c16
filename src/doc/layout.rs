//! Text layout: greedy word wrap and vertical cursor flow.
//!
//! Wrapping measures through the active typeface, never a character
//! count. The cursor enforces the page's hard floor: once a field
//! would cross into a reserved zone, layout stops emitting lines.

/// Greedy word-wrap of `text` into lines no wider than `max_width`.
///
/// Words are whitespace-delimited. A word is appended to the current
/// line while the measured width of `line + " " + word` stays within
/// the budget; otherwise the line is flushed and the word starts a new
/// one. A single word wider than `max_width` is still emitted as its
/// own line; there is no character-level hyphenation. Empty input
/// yields no lines, and a degenerate budget cannot loop: each word is
/// consumed exactly once.
pub fn wrap(text: &str, measure: impl Fn(&str) -> f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if measure(&candidate) <= max_width {
            current = candidate;
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Vertical layout cursor with a hard lower bound.
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    pub y: f32,
    floor: f32,
}

impl Cursor {
    pub fn new(top: f32, floor: f32) -> Self {
        Self { y: top, floor }
    }

    /// Whether one more line of `line_height` still fits above the floor.
    pub fn fits(&self, line_height: f32) -> bool {
        self.y + line_height <= self.floor
    }

    /// Whether the cursor is still above `bound` (zone gates).
    pub fn above(&self, bound: f32) -> bool {
        self.y < bound
    }

    pub fn advance(&mut self, amount: f32) {
        self.y += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Fixed-advance measurer: 10px per char, spaces included.
    fn ten_per_char(s: &str) -> f32 {
        s.chars().count() as f32 * 10.0
    }

    #[test]
    fn empty_input_yields_no_lines() {
        assert!(wrap("", ten_per_char, 100.0).is_empty());
        assert!(wrap("   ", ten_per_char, 100.0).is_empty());
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap("один два", ten_per_char, 100.0), vec!["один два"]);
    }

    #[test]
    fn lines_respect_the_budget() {
        let lines = wrap("aaa bbb ccc ddd", ten_per_char, 70.0);
        assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);
        for line in &lines {
            assert!(ten_per_char(line) <= 70.0);
        }
    }

    #[test]
    fn words_are_preserved_in_order() {
        let text = "из  множества   слов с разным  пробелом";
        let lines = wrap(text, ten_per_char, 90.0);
        let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split(' ')).collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn overlong_word_gets_its_own_line() {
        let lines = wrap("hi extraordinarily ok", ten_per_char, 50.0);
        assert_eq!(lines, vec!["hi", "extraordinarily", "ok"]);
    }

    #[test]
    fn zero_width_budget_terminates() {
        let lines = wrap("a b c", ten_per_char, 0.0);
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn cursor_floor_is_hard() {
        let mut cursor = Cursor::new(10.0, 100.0);
        assert!(cursor.fits(20.0));
        cursor.advance(75.0);
        assert!(!cursor.fits(20.0));
        assert!(cursor.fits(15.0));
    }

    #[test]
    fn cursor_zone_gates() {
        let cursor = Cursor::new(340.0, 470.0);
        assert!(cursor.above(350.0));
        assert!(!cursor.above(340.0));
    }
}
