// Built-in stamp outlines.
// Visual: in stamp mode a click drops a star / heart / ring in the pen color.

use crate::types::Point;
use std::f32::consts::{PI, TAU};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StampShape {
    Star,
    Heart,
    Ring,
}

/// Order used when cycling with the stamp key.
pub const STAMPS: [StampShape; 3] = [StampShape::Star, StampShape::Heart, StampShape::Ring];

const CURVE_STEPS: usize = 32;

impl StampShape {
    pub fn name(self) -> &'static str {
        match self {
            StampShape::Star => "STAR",
            StampShape::Heart => "HEART",
            StampShape::Ring => "RING",
        }
    }

    /// Closed outline in unit space (roughly [-1,1] on both axes, y down).
    /// The last point repeats the first.
    fn outline(self) -> Vec<Point> {
        let mut pts: Vec<Point> = match self {
            StampShape::Star => (0..10)
                .map(|i| {
                    let r = if i % 2 == 0 { 1.0 } else { 0.4 };
                    let a = -PI / 2.0 + i as f32 * TAU / 10.0;
                    Point::new(r * a.cos(), r * a.sin())
                })
                .collect(),
            StampShape::Heart => (0..CURVE_STEPS)
                .map(|i| {
                    let t = i as f32 * TAU / CURVE_STEPS as f32;
                    let x = 16.0 * t.sin().powi(3);
                    let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos()
                        - (4.0 * t).cos();
                    Point::new(x / 17.0, -y / 17.0)
                })
                .collect(),
            StampShape::Ring => (0..CURVE_STEPS)
                .map(|i| {
                    let a = i as f32 * TAU / CURVE_STEPS as f32;
                    Point::new(a.cos(), a.sin())
                })
                .collect(),
        };
        if let Some(&first) = pts.first() {
            pts.push(first);
        }
        pts
    }

    /// Outline scaled to `size` pixels across and centered on `center`.
    pub fn place(self, center: Point, size: f32) -> Vec<Point> {
        let half = size / 2.0;
        self.outline()
            .into_iter()
            .map(|p| Point::new(center.x + p.x * half, center.y + p.y * half))
            .collect()
    }
}
