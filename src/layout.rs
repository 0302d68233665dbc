// Where things sit inside the window.
// Visual, top to bottom: HUD bar, the stacked image/stroke frames, the biography panel.

use crate::types::Point;

pub const HUD_HEIGHT: usize = 24;
pub const MARGIN: usize = 16;
pub const PANEL_GAP: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x as f32
            && p.y >= self.y as f32
            && p.x < (self.x + self.width) as f32
            && p.y < (self.y + self.height) as f32
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Layout {
    pub window_width: usize,
    pub window_height: usize,
    /// On-screen rectangle shared by the image frame and the stroke frame.
    pub frame: Rect,
    pub panel: Rect,
}

impl Layout {
    pub fn new(frame_width: usize, frame_height: usize, panel_height: usize) -> Self {
        let frame = Rect { x: MARGIN, y: HUD_HEIGHT + MARGIN, width: frame_width, height: frame_height };
        let panel = Rect {
            x: MARGIN,
            y: frame.y + frame_height + PANEL_GAP,
            width: frame_width,
            height: panel_height,
        };
        Self {
            window_width: frame_width + 2 * MARGIN,
            window_height: panel.y + panel_height + MARGIN,
            frame,
            panel,
        }
    }

    /// Window coordinates -> frame-local coordinates, by subtracting the frame's
    /// top-left corner. `None` when the pointer is not over the frame.
    pub fn to_frame_local(&self, window: Point) -> Option<Point> {
        if !self.frame.contains(window) {
            return None;
        }
        Some(Point::new(window.x - self.frame.x as f32, window.y - self.frame.y as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_with_frame_at(x: usize, y: usize) -> Layout {
        let mut l = Layout::new(100, 100, 40);
        l.frame.x = x;
        l.frame.y = y;
        l
    }

    #[test]
    fn pointer_is_translated_by_the_frame_origin() {
        let l = layout_with_frame_at(50, 50);
        assert_eq!(l.to_frame_local(Point::new(60.0, 60.0)), Some(Point::new(10.0, 10.0)));
        assert_eq!(l.to_frame_local(Point::new(50.0, 50.0)), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn pointer_outside_the_frame_is_rejected() {
        let l = layout_with_frame_at(50, 50);
        assert_eq!(l.to_frame_local(Point::new(49.0, 60.0)), None);
        assert_eq!(l.to_frame_local(Point::new(150.0, 60.0)), None);
        assert_eq!(l.to_frame_local(Point::new(60.0, 150.5)), None);
    }

    #[test]
    fn window_wraps_frame_and_panel() {
        let l = Layout::new(500, 500, 300);
        assert_eq!(l.frame, Rect { x: 16, y: 40, width: 500, height: 500 });
        assert_eq!(l.panel.y, 40 + 500 + PANEL_GAP);
        assert_eq!(l.window_width, 532);
        assert_eq!(l.window_height, l.panel.y + 300 + MARGIN);
    }
}
