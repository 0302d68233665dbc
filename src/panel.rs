// Biography panel under the portrait.
// Visual: a paper-colored box with the configured text, wrapped to fit.

use crate::draw::{draw_rect_outline, draw_text, fill_rect, TextStyle, GLYPH_ADVANCE, GLYPH_H};
use crate::layout::Rect;
use crate::types::FrameBuffer;

const PAPER: u32 = 0x00FAF7F0;
const BORDER: u32 = 0x00BBBBBB;
const INK: u32 = 0x00202020;
const SCALE: usize = 2;
const PADDING: usize = 10;
const LINE_GAP: usize = 4;

/// Greedy word wrap at `columns` characters. Newlines start a new line, blank
/// lines are kept, and words longer than a line are split.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            // hard-split anything that cannot fit on a line by itself
            while word.len() > columns {
                if len > 0 {
                    lines.push(std::mem::take(&mut line));
                    len = 0;
                }
                let rest = word.split_off(columns);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            if word.is_empty() {
                continue;
            }

            let needed = if len == 0 { word.len() } else { len + 1 + word.len() };
            if needed > columns {
                lines.push(std::mem::take(&mut line));
                len = 0;
            }
            if len > 0 {
                line.push(' ');
                len += 1;
            }
            line.extend(word.iter());
            len += word.len();
        }
        lines.push(line);
    }
    lines
}

/// Pre-wrapped text, ready to draw every frame.
pub struct Panel {
    rect: Rect,
    lines: Vec<String>,
}

impl Panel {
    pub fn new(rect: Rect, text: &str) -> Self {
        let columns = rect.width.saturating_sub(2 * PADDING) / (GLYPH_ADVANCE * SCALE);
        Self { rect, lines: wrap_text(text, columns) }
    }

    /// Lines that fit inside the panel.
    fn visible_lines(&self) -> usize {
        let line_height = GLYPH_H * SCALE + LINE_GAP;
        self.rect.height.saturating_sub(2 * PADDING) / line_height
    }

    pub fn render(&self, fb: &mut FrameBuffer) {
        let r = self.rect;
        fill_rect(fb, r.x, r.y, r.width, r.height, PAPER);
        draw_rect_outline(fb, r.x, r.y, r.width, r.height, BORDER);

        let style = TextStyle { color: INK, scale: SCALE, shadow: false };
        let line_height = GLYPH_H * SCALE + LINE_GAP;
        for (i, line) in self.lines.iter().take(self.visible_lines()).enumerate() {
            let y = r.y + PADDING + i * line_height;
            draw_text(fb, (r.x + PADDING) as i32, y as i32, line, &style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_text("the quick brown fox jumps", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn keeps_newlines_and_blank_lines() {
        let lines = wrap_text("Born: 1900\n\nDied: 1980", 20);
        assert_eq!(lines, vec!["Born: 1900", "", "Died: 1980"]);
    }

    #[test]
    fn splits_words_longer_than_a_line() {
        let lines = wrap_text("a abcdefghij b", 4);
        assert_eq!(lines, vec!["a", "abcd", "efgh", "ij b"]);
    }

    #[test]
    fn collapses_runs_of_spaces() {
        assert_eq!(wrap_text("  lots   of   space  ", 40), vec!["lots of space"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let lines = wrap_text("café café", 4);
        assert_eq!(lines, vec!["café", "café"]);
    }

    #[test]
    fn render_stays_inside_its_rect() {
        let rect = Rect { x: 5, y: 5, width: 100, height: 40 };
        let panel = Panel::new(rect, &"word ".repeat(200));
        let mut fb = FrameBuffer::new(120, 60);
        panel.render(&mut fb);
        for y in 0..fb.height {
            for x in 0..fb.width {
                let inside = x >= 5 && x < 105 && y >= 5 && y < 45;
                if !inside {
                    assert_eq!(fb.pixels[y * fb.width + x], 0, "pixel {x},{y} drawn outside");
                }
            }
        }
        assert!(fb.pixels.contains(&INK));
    }
}
