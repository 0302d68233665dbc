// Freehand pen / eraser on the transparent stroke frame.
// Visual: dragging leaves a smooth round-capped line (pen) or punches a clean
// hole through the ink back to the portrait underneath (eraser).

use crate::frame::{Composite, Frame, LineStyle};
use crate::input::PointerEvent;
use crate::stamp::StampShape;
use crate::types::{Point, Rgba};

pub const DEFAULT_PEN_WIDTH: f32 = 3.0;
/// Wider than the pen so a quick swipe still clears something.
pub const DEFAULT_ERASER_WIDTH: f32 = 20.0;
pub const DEFAULT_STAMP_SIZE: f32 = 48.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    Pen,
    Eraser,
    Stamp(StampShape),
}

/// Snapshot of the controls, taken when a stroke starts.
/// Toggling the mode mid-stroke does not affect the stroke in progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToolState {
    pub tool: Tool,
    pub color: Rgba,
    pub drawing_enabled: bool,
    pub pen_width: f32,
    pub eraser_width: f32,
    pub stamp_size: f32,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            tool: Tool::Pen,
            color: Rgba::BLACK,
            drawing_enabled: false,
            pen_width: DEFAULT_PEN_WIDTH,
            eraser_width: DEFAULT_ERASER_WIDTH,
            stamp_size: DEFAULT_STAMP_SIZE,
        }
    }
}

impl ToolState {
    /// Segment style for the freehand tools; `None` for stamps.
    pub fn line_style(&self) -> Option<LineStyle> {
        match self.tool {
            Tool::Pen => Some(LineStyle {
                width: self.pen_width,
                color: self.color,
                composite: Composite::SourceOver,
            }),
            Tool::Eraser => Some(LineStyle {
                width: self.eraser_width,
                color: self.color,
                composite: Composite::DestinationOut,
            }),
            Tool::Stamp(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

/// One pointer-down to pointer-up gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    points: Vec<Point>,
    style: LineStyle,
}

impl Stroke {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn style(&self) -> LineStyle {
        self.style
    }

    /// Consecutive point pairs, in drawing order.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.points.windows(2).map(|w| Segment { from: w[0], to: w[1] })
    }
}

/// Owns the stroke frame; nothing else writes to it.
pub struct StrokeEngine {
    frame: Frame,
    /// `Some` while Drawing, `None` while Idle.
    active: Option<Stroke>,
}

impl StrokeEngine {
    pub fn new(width: usize, height: usize) -> Self {
        Self { frame: Frame::new(width, height), active: None }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    /// Start a stroke at `point` (frame-local). Nothing is drawn yet.
    /// Returns false when paint mode is off or the tool is not a stroke tool.
    pub fn begin(&mut self, point: Point, tool: &ToolState) -> bool {
        if !tool.drawing_enabled {
            return false;
        }
        let Some(style) = tool.line_style() else {
            return false;
        };
        if self.active.is_some() {
            // a missed release; seal the old stroke
            self.end();
        }
        self.active = Some(Stroke { points: vec![point], style });
        true
    }

    /// Draw from the last anchor to `point` and make `point` the new anchor.
    /// No-op while Idle.
    pub fn extend(&mut self, point: Point) -> Option<Segment> {
        let stroke = self.active.as_mut()?;
        let from = *stroke.points.last()?;
        self.frame.draw_segment(from, point, &stroke.style);
        stroke.points.push(point);
        Some(Segment { from, to: point })
    }

    /// Seal the current stroke. Calling it while Idle is fine and returns `None`.
    pub fn end(&mut self) -> Option<Stroke> {
        let stroke = self.active.take()?;
        log::debug!(
            "stroke sealed: {} points, {} segments, {:?} at width {}",
            stroke.points().len(),
            stroke.segments().count(),
            stroke.style().composite,
            stroke.style().width
        );
        Some(stroke)
    }

    /// Drop a stamp outline centered on `point` in the pen color.
    pub fn stamp(&mut self, point: Point, tool: &ToolState) -> bool {
        let Tool::Stamp(shape) = tool.tool else {
            return false;
        };
        if !tool.drawing_enabled {
            return false;
        }
        let style = LineStyle {
            width: tool.pen_width,
            color: tool.color,
            composite: Composite::SourceOver,
        };
        for edge in shape.place(point, tool.stamp_size).windows(2) {
            self.frame.draw_segment(edge[0], edge[1], &style);
        }
        true
    }

    /// Visual: all ink disappears; the portrait shows through everywhere.
    pub fn clear(&mut self) {
        self.active = None;
        self.frame.clear();
    }

    /// Route one pointer event to the matching operation.
    pub fn handle(&mut self, event: PointerEvent, tool: &ToolState) {
        match event {
            PointerEvent::Down(p) => {
                if matches!(tool.tool, Tool::Stamp(_)) {
                    self.stamp(p, tool);
                } else {
                    self.begin(p, tool);
                }
            }
            PointerEvent::Move(p) => {
                self.extend(p);
            }
            PointerEvent::Up | PointerEvent::Leave => {
                self.end();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerTracker;
    use crate::layout::Layout;

    const RED: Rgba = Rgba::rgb(255, 0, 0);

    fn pen() -> ToolState {
        ToolState { color: RED, drawing_enabled: true, ..ToolState::default() }
    }

    fn eraser() -> ToolState {
        ToolState { tool: Tool::Eraser, ..pen() }
    }

    fn draw(engine: &mut StrokeEngine, tool: &ToolState, pts: &[(f32, f32)]) -> Option<Stroke> {
        let (first, rest) = pts.split_first()?;
        assert!(engine.begin(Point::new(first.0, first.1), tool));
        for &(x, y) in rest {
            engine.extend(Point::new(x, y));
        }
        engine.end()
    }

    fn all_transparent(frame: &Frame) -> bool {
        frame.read_pixels().data.chunks_exact(4).all(|px| px[3] == 0)
    }

    #[test]
    fn three_points_make_two_connected_segments() {
        let mut engine = StrokeEngine::new(20, 20);
        assert!(engine.begin(Point::new(0.0, 0.0), &pen()));
        assert!(engine.is_drawing());
        let a = engine.extend(Point::new(10.0, 0.0)).unwrap();
        let b = engine.extend(Point::new(10.0, 10.0)).unwrap();
        assert_eq!(a.to, b.from);

        let stroke = engine.end().unwrap();
        assert_eq!(stroke.points().len(), 3);
        let segs: Vec<_> = stroke.segments().collect();
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0], Segment { from: Point::new(0.0, 0.0), to: Point::new(10.0, 0.0) });
        assert_eq!(segs[1], Segment { from: Point::new(10.0, 0.0), to: Point::new(10.0, 10.0) });
        assert_eq!(engine.frame().pixel(5, 0), RED);
        assert_eq!(engine.frame().pixel(10, 5), RED);
    }

    #[test]
    fn begin_draws_nothing_by_itself() {
        let mut engine = StrokeEngine::new(10, 10);
        engine.begin(Point::new(5.0, 5.0), &pen());
        assert!(all_transparent(engine.frame()));
    }

    #[test]
    fn extend_before_begin_is_ignored() {
        let mut engine = StrokeEngine::new(10, 10);
        assert_eq!(engine.extend(Point::new(5.0, 5.0)), None);
        assert!(all_transparent(engine.frame()));
        assert!(!engine.is_drawing());
    }

    #[test]
    fn end_twice_is_harmless() {
        let mut engine = StrokeEngine::new(10, 10);
        assert!(engine.end().is_none());
        engine.begin(Point::new(1.0, 1.0), &pen());
        assert!(engine.end().is_some());
        assert!(engine.end().is_none());
        assert_eq!(engine.extend(Point::new(8.0, 8.0)), None);
    }

    #[test]
    fn paint_mode_off_refuses_to_begin() {
        let mut engine = StrokeEngine::new(10, 10);
        let off = ToolState { drawing_enabled: false, ..pen() };
        assert!(!engine.begin(Point::new(1.0, 1.0), &off));
        assert!(!engine.is_drawing());
    }

    #[test]
    fn eraser_over_the_same_path_restores_transparency() {
        let path = [(5.0, 5.0), (30.0, 5.0), (30.0, 30.0), (8.0, 22.0)];
        let mut engine = StrokeEngine::new(40, 40);
        draw(&mut engine, &pen(), &path);
        assert!(!all_transparent(engine.frame()));

        // erase color is irrelevant
        let white_eraser = ToolState { color: Rgba::WHITE, ..eraser() };
        let stroke = draw(&mut engine, &white_eraser, &path).unwrap();
        assert_eq!(stroke.style().composite, Composite::DestinationOut);
        assert_eq!(stroke.style().width, DEFAULT_ERASER_WIDTH);
        assert!(all_transparent(engine.frame()));
    }

    #[test]
    fn tool_change_mid_stroke_keeps_the_started_style() {
        let mut engine = StrokeEngine::new(20, 20);
        let mut tool = pen();
        engine.begin(Point::new(2.0, 10.0), &tool);
        tool.tool = Tool::Eraser; // the controller toggles, the stroke keeps its snapshot
        engine.extend(Point::new(18.0, 10.0));
        assert_eq!(engine.frame().pixel(10, 10), RED);
    }

    #[test]
    fn window_pointer_maps_to_frame_local_ink() {
        // Frame drawn at window (50,50); a press at (60,60) must ink frame pixel (10,10).
        let mut layout = Layout::new(100, 100, 20);
        layout.frame.x = 50;
        layout.frame.y = 50;

        let mut engine = StrokeEngine::new(100, 100);
        let mut tracker = PointerTracker::new();
        let tool = pen();

        for (down, wx, wy) in [(true, 60.0, 60.0), (true, 80.0, 60.0), (false, 80.0, 60.0)] {
            let local = layout.to_frame_local(Point::new(wx, wy));
            if let Some(ev) = tracker.update(down, local) {
                if let PointerEvent::Down(p) = ev {
                    assert_eq!(p, Point::new(10.0, 10.0));
                }
                engine.handle(ev, &tool);
            }
        }

        let frame = engine.frame();
        assert_eq!(frame.pixel(10, 10), RED);
        assert_eq!(frame.pixel(29, 10), RED);
        // the raw window coordinates would have put the line at y=60
        assert_eq!(frame.pixel(70, 60).a, 0);
        assert_eq!(frame.pixel(40, 10).a, 0);
    }

    #[test]
    fn stamps_only_in_stamp_mode() {
        let mut engine = StrokeEngine::new(100, 100);
        assert!(!engine.stamp(Point::new(50.0, 50.0), &pen()));
        assert!(all_transparent(engine.frame()));

        let star = ToolState { tool: Tool::Stamp(StampShape::Star), ..pen() };
        assert!(!engine.begin(Point::new(50.0, 50.0), &star));
        engine.handle(PointerEvent::Down(Point::new(50.0, 50.0)), &star);
        assert!(!engine.is_drawing());
        // top tip of the star sits size/2 above the center
        assert_eq!(engine.frame().pixel(50, 26).a, 255);
        assert_eq!(engine.frame().pixel(50, 50).a, 0);
    }

    #[test]
    fn clear_drops_ink_and_the_open_stroke() {
        let mut engine = StrokeEngine::new(20, 20);
        engine.begin(Point::new(0.0, 0.0), &pen());
        engine.extend(Point::new(19.0, 19.0));
        engine.clear();
        assert!(!engine.is_drawing());
        assert!(all_transparent(engine.frame()));
    }
}
