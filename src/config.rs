//! Optional configuration file for rakugaki.
//!
//! Settings are read from `~/.config/rakugaki/config.toml`. Every field has a
//! default, so a missing file (or a missing section) is fine.
//!
//! # Example TOML
//! ```toml
//! [canvas]
//! width = 500
//! height = 500
//!
//! [drawing]
//! pen_color = "black"
//! palette = ["black", "red", "#3355ff"]
//! pen_width = 3.0
//! eraser_width = 20.0
//!
//! [camera]
//! index = 0
//!
//! [panel]
//! height = 300
//! text = "Born 1900 in a small town by the sea."
//! ```

use crate::stroke::{DEFAULT_ERASER_WIDTH, DEFAULT_PEN_WIDTH, DEFAULT_STAMP_SIZE};
use crate::types::Rgba;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub drawing: DrawingConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub panel: PanelConfig,
}

/// Size of the image frame and the stroke frame (always identical).
#[derive(Debug, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Frame width in pixels (valid range: 64 - 2048)
    #[serde(default = "default_canvas_side")]
    pub width: usize,
    /// Frame height in pixels (valid range: 64 - 2048)
    #[serde(default = "default_canvas_side")]
    pub height: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self { width: default_canvas_side(), height: default_canvas_side() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DrawingConfig {
    /// Starting pen color: `#rrggbb`, `#rrggbbaa` or a palette name
    #[serde(default = "default_pen_color")]
    pub pen_color: String,
    /// Colors bound to keys 1-8
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    /// Pen width in pixels (valid range: 1.0 - 50.0)
    #[serde(default = "default_pen_width")]
    pub pen_width: f32,
    /// Eraser width in pixels (valid range: 4.0 - 200.0)
    #[serde(default = "default_eraser_width")]
    pub eraser_width: f32,
    /// Stamp size in pixels (valid range: 8.0 - 256.0)
    #[serde(default = "default_stamp_size")]
    pub stamp_size: f32,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            pen_color: default_pen_color(),
            palette: default_palette(),
            pen_width: default_pen_width(),
            eraser_width: default_eraser_width(),
            stamp_size: default_stamp_size(),
        }
    }
}

impl DrawingConfig {
    /// Parsed palette; entries that do not parse are skipped.
    pub fn palette_colors(&self) -> Vec<Rgba> {
        let mut colors: Vec<Rgba> = self
            .palette
            .iter()
            .filter_map(|spec| {
                let parsed = Rgba::parse(spec);
                if parsed.is_none() {
                    warn!("Ignoring palette color '{spec}'");
                }
                parsed
            })
            .take(8)
            .collect();
        if colors.is_empty() {
            colors.push(Rgba::BLACK);
        }
        colors
    }

    pub fn pen_color(&self) -> Rgba {
        Rgba::parse(&self.pen_color).unwrap_or(Rgba::BLACK)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Device index (0 = default webcam)
    #[serde(default)]
    pub index: u32,
    /// Requested resolution; the device may pick something close
    #[serde(default = "default_camera_width")]
    pub width: u32,
    #[serde(default = "default_camera_height")]
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { index: 0, width: default_camera_width(), height: default_camera_height() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Panel height in pixels (valid range: 40 - 1024)
    #[serde(default = "default_panel_height")]
    pub height: usize,
    /// Biography text; blank lines separate paragraphs
    #[serde(default = "default_panel_text")]
    pub text: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self { height: default_panel_height(), text: default_panel_text() }
    }
}

fn default_canvas_side() -> usize {
    500
}

fn default_pen_color() -> String {
    "black".to_string()
}

fn default_palette() -> Vec<String> {
    ["black", "red", "blue", "green", "yellow", "orange", "pink", "white"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_pen_width() -> f32 {
    DEFAULT_PEN_WIDTH
}

fn default_eraser_width() -> f32 {
    DEFAULT_ERASER_WIDTH
}

fn default_stamp_size() -> f32 {
    DEFAULT_STAMP_SIZE
}

fn default_camera_width() -> u32 {
    640
}

fn default_camera_height() -> u32 {
    480
}

fn default_panel_height() -> usize {
    300
}

fn default_panel_text() -> String {
    "Name: (unknown)\n\
     Born: ----  Died: ----\n\n\
     Press O or click the frame to load a portrait, V for the camera, \
     P to start doodling. Put your own biography in config.toml under [panel] text."
        .to_string()
}

impl Config {
    /// Clamp values that would make the window or the tools unusable.
    fn validate_and_clamp(&mut self) {
        for (name, side) in [("width", &mut self.canvas.width), ("height", &mut self.canvas.height)] {
            if !(64..=2048).contains(&*side) {
                warn!("Invalid canvas {name} {side}, clamping to 64-2048 range");
                *side = (*side).clamp(64, 2048);
            }
        }

        if !(1.0..=50.0).contains(&self.drawing.pen_width) {
            warn!(
                "Invalid pen_width {:.1}, clamping to 1.0-50.0 range",
                self.drawing.pen_width
            );
            self.drawing.pen_width = clamp_or(self.drawing.pen_width, 1.0, 50.0, DEFAULT_PEN_WIDTH);
        }

        if !(4.0..=200.0).contains(&self.drawing.eraser_width) {
            warn!(
                "Invalid eraser_width {:.1}, clamping to 4.0-200.0 range",
                self.drawing.eraser_width
            );
            self.drawing.eraser_width =
                clamp_or(self.drawing.eraser_width, 4.0, 200.0, DEFAULT_ERASER_WIDTH);
        }

        if !(8.0..=256.0).contains(&self.drawing.stamp_size) {
            warn!(
                "Invalid stamp_size {:.1}, clamping to 8.0-256.0 range",
                self.drawing.stamp_size
            );
            self.drawing.stamp_size =
                clamp_or(self.drawing.stamp_size, 8.0, 256.0, DEFAULT_STAMP_SIZE);
        }

        if Rgba::parse(&self.drawing.pen_color).is_none() {
            warn!(
                "Invalid pen_color '{}', falling back to 'black'",
                self.drawing.pen_color
            );
            self.drawing.pen_color = default_pen_color();
        }

        if !(40..=1024).contains(&self.panel.height) {
            warn!("Invalid panel height {}, clamping to 40-1024 range", self.panel.height);
            self.panel.height = self.panel.height.clamp(40, 1024);
        }
    }

    /// `~/.config/rakugaki/config.toml`
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("rakugaki");
        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, or defaults if there is no file.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load from `path`, or defaults if it does not exist.
    ///
    /// # Errors
    /// The file exists but cannot be read or is not valid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);
        Ok(config)
    }
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() { fallback } else { value.clamp(min, max) }
}
