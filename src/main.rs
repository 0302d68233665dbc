mod camera;
mod capture;
mod config;
mod draw;
mod error;
mod fit;
mod frame;
mod gray;
mod input;
mod layout;
mod loader;
mod mode;
mod notice;
mod panel;
mod session;
mod stamp;
mod stroke;
mod types;

use anyhow::Context;
use camera::{CameraFeed, CameraStatus};
use capture::{CapturePipeline, Source};
use config::Config;
use draw::{blit_rgba, draw_crosshair, draw_text, fill_rect, Drawer, TextStyle, GLYPH_ADVANCE};
use error::Error;
use input::{PointerEvent, PointerTracker};
use layout::{Layout, HUD_HEIGHT};
use loader::ImageLoader;
use minifb::Key;
use mode::ModeController;
use notice::{Level, Notices};
use panel::Panel;
use session::CameraSession;
use std::path::{Path, PathBuf};
use std::time::Instant;
use stroke::{StrokeEngine, Tool};
use types::FrameBuffer;

const BACKGROUND: u32 = 0x00E8E4DC; // window behind everything
const FRAME_BACKDROP: u32 = 0x00FFFFFF; // shows through letterbox bars
const HUD_BG: u32 = 0x00303030;
const HUD_TEXT: u32 = 0x00FFFFFF;
const CURSOR: u32 = 0x00FF3366;
const CURSOR_DRAWING: u32 = 0x0033AAFF;

const COLOR_KEYS: [Key; 8] = [
    Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5, Key::Key6, Key::Key7, Key::Key8,
];

fn main() -> anyhow::Result<()> {
    env_logger::init();

    /* --- Config + layout ---
       Visual: decides how big the portrait frame and the bio panel are. */
    let config = Config::load().context("Failed to load configuration")?;
    let (fw, fh) = (config.canvas.width, config.canvas.height);
    let layout = Layout::new(fw, fh, config.panel.height);

    /* --- Window + screen buffer ---
       Visual: the window opens with an empty white frame and the bio panel. */
    let mut drawer = Drawer::new("Rakugaki", layout.window_width, layout.window_height)?;
    let mut screen = FrameBuffer::new(layout.window_width, layout.window_height);

    /* --- The two stacked frames (same size), plus the camera session ---
       Each frame has one owner: the pipeline paints the portrait, the engine paints ink. */
    let mut pipeline = CapturePipeline::new(fw, fh);
    let mut ink = StrokeEngine::new(fw, fh);
    let mut camera = CameraSession::new(fw, fh);

    let mut modes = ModeController::new(&config.drawing);
    let mut pointer = PointerTracker::new();
    let mut loader = ImageLoader::new();
    let mut notices = Notices::default();
    let panel = Panel::new(layout.panel, &config.panel.text);

    // Optional portrait on the command line: `rakugaki photo.jpg`.
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        match load_startup_image(&mut pipeline, &path) {
            Ok(_) => notices.info(format!("Loaded {}", path.display())),
            Err(e) => notices.error(&e),
        }
    }

    log::info!("Controls:");
    log::info!("  - O (or click the frame while paint is off): open a portrait");
    log::info!("  - V: camera on/off (switching off takes the photo), Space: snap");
    log::info!("  - P: paint mode, E: eraser, S: stamps, 1-8: colors, C: clear ink");
    log::info!("  - Esc: quit");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Keyboard controls */
        if drawer.pressed_once(Key::O) {
            pick_image(&mut loader);
        }
        if drawer.pressed_once(Key::V) {
            // Switching the camera off works like a shutter.
            let cam = &config.camera;
            let shot = camera.toggle(&mut modes, &mut pipeline, || {
                CameraFeed::request(cam.index, cam.width, cam.height)
            });
            if let Some(shot) = shot {
                report_snap(shot, &mut notices);
            }
        }
        if drawer.pressed_once(Key::Space) {
            let shot = camera.snap(&mut modes, &mut pipeline);
            report_snap(shot, &mut notices);
        }
        if drawer.pressed_once(Key::P) {
            let on = modes.toggle_paint();
            log::debug!("paint mode {}", if on { "on" } else { "off" });
        }
        if drawer.pressed_once(Key::E) {
            modes.toggle_eraser();
        }
        if drawer.pressed_once(Key::S) {
            modes.cycle_stamp();
        }
        if drawer.pressed_once(Key::C) {
            ink.clear(); // visual: all doodles vanish
        }
        for (i, key) in COLOR_KEYS.iter().enumerate() {
            if drawer.pressed_once(*key) {
                modes.select_color(i);
            }
        }

        /* 2) Results of background work */
        while let Some(result) = loader.poll() {
            match result.and_then(|still| pipeline.capture(&Source::Still(still))) {
                Ok(_) => notices.info("Portrait loaded"),
                Err(e) => notices.error(&e),
            }
        }
        while let Some(status) = camera.poll(&mut modes) {
            match status {
                CameraStatus::Ready { width, height } => {
                    notices.info(format!("Camera on {width}x{height}: V or Space to snap"));
                }
                // the session has already ended and the toggle is back to off
                CameraStatus::Failed(e) | CameraStatus::Lost(e) => notices.error(&e),
            }
        }

        /* 3) Live preview while the camera runs (color, not captured yet) */
        camera.refresh_preview();

        /* 4) Pointer -> strokes, in frame-local coordinates */
        let mouse = drawer.mouse_pos();
        let local = mouse.and_then(|p| layout.to_frame_local(p));
        let tool = modes.tool_state();
        if let Some(event) = pointer.update(drawer.left_mouse_down(), local) {
            if matches!(event, PointerEvent::Down(_)) && !tool.drawing_enabled {
                // Clicking the portrait outside paint mode opens the picker.
                pick_image(&mut loader);
            } else {
                ink.handle(event, &tool);
            }
        }

        /* 5) Compose: HUD, backdrop, portrait (or preview), ink, cursor, panel */
        screen.fill(BACKGROUND);
        render_hud(&mut screen, &modes, &mut notices, loader.is_busy(), camera.is_live());

        let f = layout.frame;
        fill_rect(&mut screen, f.x, f.y, f.width, f.height, FRAME_BACKDROP);
        blit_rgba(&mut screen, f.x, f.y, camera.base(&pipeline).as_rgba());
        blit_rgba(&mut screen, f.x, f.y, ink.frame().as_rgba());

        if let (Some(m), Some(_)) = (mouse, local) {
            if tool.drawing_enabled {
                let reach = match tool.tool {
                    Tool::Pen => tool.pen_width,
                    Tool::Eraser => tool.eraser_width,
                    Tool::Stamp(_) => tool.stamp_size,
                } / 2.0;
                let color = if ink.is_drawing() { CURSOR_DRAWING } else { CURSOR };
                draw_crosshair(&mut screen, m.x as i32, m.y as i32, reach as i32 + 6, color);
            }
        }

        panel.render(&mut screen);

        /* 6) Present to the window (this is when the on-screen image updates). */
        drawer.present(&screen)?;
    }

    Ok(())
}

/// Native file dialog; the decode itself happens in the background.
fn pick_image(loader: &mut ImageLoader) {
    if let Some(path) = rfd::FileDialog::new()
        .add_filter("Images", &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff"])
        .add_filter("All Files", &["*"])
        .pick_file()
    {
        loader.request(path);
    }
}

/// Read and show a portrait before the loop starts.
fn load_startup_image(pipeline: &mut CapturePipeline, path: &Path) -> Result<types::Placement, Error> {
    let bytes = std::fs::read(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
    pipeline.load_bytes(&bytes)
}

fn report_snap(shot: Result<types::Placement, Error>, notices: &mut Notices) {
    match shot {
        Ok(_) => notices.info("Photo taken"),
        Err(e) => notices.error(&e),
    }
}

/// Visual: dark bar with a color swatch, the mode summary on the left and the
/// latest notice on the right.
fn render_hud(
    screen: &mut FrameBuffer,
    modes: &ModeController,
    notices: &mut Notices,
    busy: bool,
    camera_live: bool,
) {
    fill_rect(screen, 0, 0, screen.width, HUD_HEIGHT, HUD_BG);

    let tool = modes.tool_state();
    fill_rect(screen, 8, 6, 12, 12, tool.color.to_screen());

    let mut label = modes.label();
    if modes.video_on() && !camera_live {
        label.push_str(" (STARTING)");
    }
    if busy {
        label.push_str(" | LOADING");
    }
    let style = TextStyle { color: HUD_TEXT, scale: 1, shadow: true };
    draw_text(screen, 28, 8, &label, &style);

    if let Some(notice) = notices.current(Instant::now()) {
        let left = 28 + (label.chars().count() + 3) * GLYPH_ADVANCE;
        let room = screen.width.saturating_sub(left + 8) / GLYPH_ADVANCE;
        let text: String = notice.text.chars().take(room).collect();
        let x = screen.width.saturating_sub(8 + text.chars().count() * GLYPH_ADVANCE);
        let color = match notice.level {
            Level::Info => 0x00A0E0A0,
            Level::Error => 0x00FF8080,
        };
        draw_text(screen, x as i32, 8, &text, &TextStyle { color, ..style });
    }
}
