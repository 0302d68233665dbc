// Which tool, which color, paint mode on/off, camera on/off.
// Only the key handlers in main.rs change this; the stroke engine gets a
// snapshot via `tool_state()` when a stroke starts.

use crate::config::DrawingConfig;
use crate::stamp::STAMPS;
use crate::stroke::{Tool, ToolState};
use crate::types::Rgba;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoToggle {
    /// Camera was requested; a stream may or may not follow.
    On,
    /// Camera switched off; time to take the photo.
    Off,
}

pub struct ModeController {
    tool: ToolState,
    palette: Vec<Rgba>,
    color_index: usize,
    video_on: bool,
}

impl ModeController {
    pub fn new(drawing: &DrawingConfig) -> Self {
        let palette = drawing.palette_colors();
        let color = drawing.pen_color();
        let color_index = palette.iter().position(|&c| c == color).unwrap_or(0);
        Self {
            tool: ToolState {
                tool: Tool::Pen,
                color,
                drawing_enabled: false,
                pen_width: drawing.pen_width,
                eraser_width: drawing.eraser_width,
                stamp_size: drawing.stamp_size,
            },
            palette,
            color_index,
            video_on: false,
        }
    }

    /// Copy of the current controls.
    pub fn tool_state(&self) -> ToolState {
        self.tool
    }

    pub fn video_on(&self) -> bool {
        self.video_on
    }

    pub fn toggle_paint(&mut self) -> bool {
        self.tool.drawing_enabled = !self.tool.drawing_enabled;
        self.tool.drawing_enabled
    }

    /// Pen <-> eraser. From stamp mode this goes to the eraser.
    pub fn toggle_eraser(&mut self) {
        self.tool.tool = match self.tool.tool {
            Tool::Eraser => Tool::Pen,
            Tool::Pen | Tool::Stamp(_) => Tool::Eraser,
        };
    }

    /// Enter stamp mode with the first stamp, step to the next one, and drop
    /// back to the pen after the last.
    pub fn cycle_stamp(&mut self) {
        self.tool.tool = match self.tool.tool {
            Tool::Stamp(current) => {
                let i = STAMPS.iter().position(|&s| s == current).unwrap_or(0);
                STAMPS.get(i + 1).map_or(Tool::Pen, |&next| Tool::Stamp(next))
            }
            Tool::Pen | Tool::Eraser => Tool::Stamp(STAMPS[0]),
        };
    }

    /// Pick a palette entry (0-based). Out-of-range picks are ignored.
    pub fn select_color(&mut self, index: usize) -> Option<Rgba> {
        let color = *self.palette.get(index)?;
        self.color_index = index;
        self.tool.color = color;
        Some(color)
    }

    pub fn toggle_video(&mut self) -> VideoToggle {
        self.video_on = !self.video_on;
        if self.video_on { VideoToggle::On } else { VideoToggle::Off }
    }

    /// The camera could not be opened: the toggle snaps back to off.
    pub fn video_failed(&mut self) {
        self.video_on = false;
    }

    /// Short HUD description, e.g. "PEN 2 | PAINT ON | CAM OFF".
    pub fn label(&self) -> String {
        let tool = match self.tool.tool {
            Tool::Pen => format!("PEN {}", self.color_index + 1),
            Tool::Eraser => "ERASER".to_string(),
            Tool::Stamp(shape) => format!("STAMP {}", shape.name()),
        };
        let paint = if self.tool.drawing_enabled { "PAINT ON" } else { "PAINT OFF" };
        let cam = if self.video_on { "CAM ON" } else { "CAM OFF" };
        format!("{tool} | {paint} | {cam}")
    }
}
