// Fixed-size RGBA drawing surface.
// Two of these are stacked on screen: the grey portrait (image frame) and the
// transparent ink layer (stroke frame) above it.

use crate::error::Error;
use crate::types::{PixelBuffer, Placement, Point, Rgba};
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// How new geometry combines with what is already in the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Composite {
    /// Ink is painted over the destination.
    SourceOver,
    /// Covered destination pixels are removed (alpha goes to 0). Color is ignored.
    DestinationOut,
}

/// Width/color/compositing for one line segment. Caps and joins are always
/// round: every segment is a capsule, so consecutive segments meet smoothly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub width: f32,
    pub color: Rgba,
    pub composite: Composite,
}

pub struct Frame {
    image: RgbaImage,
}

impl Frame {
    /// New frame, fully transparent.
    pub fn new(width: usize, height: usize) -> Self {
        Self { image: RgbaImage::new(width as u32, height as u32) }
    }

    pub fn width(&self) -> usize {
        self.image.width() as usize
    }

    pub fn height(&self) -> usize {
        self.image.height() as usize
    }

    /// Raw view used when blitting to the window.
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        let p = self.image.get_pixel(x as u32, y as u32);
        Rgba::rgba(p[0], p[1], p[2], p[3])
    }

    /// Visual: the frame becomes see-through everywhere.
    pub fn clear(&mut self) {
        self.image.pixels_mut().for_each(|p| *p = image::Rgba([0, 0, 0, 0]));
    }

    pub fn read_pixels(&self) -> PixelBuffer {
        PixelBuffer {
            width: self.width(),
            height: self.height(),
            data: self.image.as_raw().clone(),
        }
    }

    /// Replace the whole frame. The buffer must match the frame size exactly.
    pub fn write_pixels(&mut self, buf: &PixelBuffer) -> Result<(), Error> {
        let mismatch = || Error::SizeMismatch {
            width: buf.width,
            height: buf.height,
            expected_width: self.width(),
            expected_height: self.height(),
        };
        if buf.width != self.width() || buf.height != self.height() {
            return Err(mismatch());
        }
        let image = RgbaImage::from_raw(buf.width as u32, buf.height as u32, buf.data.clone())
            .ok_or_else(mismatch)?;
        self.image = image;
        Ok(())
    }

    /// Scale `src` into the placement rectangle and paint it over the frame.
    /// Visual: the photo appears, resized, at `at`.
    pub fn draw_bitmap(&mut self, src: &PixelBuffer, at: Placement) -> Result<(), Error> {
        let src_img = RgbaImage::from_raw(src.width as u32, src.height as u32, src.data.clone())
            .ok_or(Error::SizeMismatch {
                width: src.width,
                height: src.height,
                expected_width: src.width,
                expected_height: src.data.len() / 4 / src.width.max(1),
            })?;

        // A sliver narrower than a pixel still shows up as one.
        let w = at.draw_width.round().max(1.0) as u32;
        let h = at.draw_height.round().max(1.0) as u32;
        let scaled = if (w, h) == src_img.dimensions() {
            src_img
        } else {
            imageops::resize(&src_img, w, h, FilterType::Triangle)
        };

        imageops::overlay(
            &mut self.image,
            &scaled,
            at.offset_x.round() as i64,
            at.offset_y.round() as i64,
        );
        Ok(())
    }

    /// Rasterize one anti-aliased, round-capped segment from `from` to `to`.
    pub fn draw_segment(&mut self, from: Point, to: Point, style: &LineStyle) {
        let half = style.width.max(0.0) / 2.0;
        if half <= 0.0 {
            return;
        }
        let w = self.image.width() as i64;
        let h = self.image.height() as i64;

        // Only scan the capsule's bounding box (plus one pixel of AA fringe).
        let min_x = ((from.x.min(to.x) - half).floor() as i64 - 1).max(0);
        let max_x = ((from.x.max(to.x) + half).ceil() as i64 + 1).min(w - 1);
        let min_y = ((from.y.min(to.y) - half).floor() as i64 - 1).max(0);
        let max_y = ((from.y.max(to.y) + half).ceil() as i64 + 1).min(h - 1);
        if min_x > max_x || min_y > max_y {
            return;
        }

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = distance_to_segment(center, from, to);
                let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let px = self.image.get_pixel_mut(x as u32, y as u32);
                match style.composite {
                    Composite::SourceOver => paint_over(px, style.color, coverage),
                    Composite::DestinationOut => erase(px, coverage),
                }
            }
        }
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    let t = if len2 <= f32::EPSILON {
        0.0 // degenerate segment: a round dot
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx) * (p.x - cx) + (p.y - cy) * (p.y - cy)).sqrt()
}

/// Straight-alpha "source over destination".
#[inline]
fn paint_over(px: &mut image::Rgba<u8>, color: Rgba, coverage: f32) {
    let sa = color.a as f32 / 255.0 * coverage;
    let da = px[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *px = image::Rgba([0, 0, 0, 0]);
        return;
    }
    let mix = |s: u8, d: u8| {
        ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a).round().clamp(0.0, 255.0) as u8
    };
    *px = image::Rgba([
        mix(color.r, px[0]),
        mix(color.g, px[1]),
        mix(color.b, px[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]);
}

/// "Destination out": remove alpha where the segment covers.
#[inline]
fn erase(px: &mut image::Rgba<u8>, coverage: f32) {
    let a = (px[3] as f32 * (1.0 - coverage)).round().clamp(0.0, 255.0) as u8;
    if a == 0 {
        *px = image::Rgba([0, 0, 0, 0]);
    } else {
        px[3] = a;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = Rgba::rgb(255, 0, 0);

    fn pen(width: f32) -> LineStyle {
        LineStyle { width, color: RED, composite: Composite::SourceOver }
    }

    #[test]
    fn new_frame_is_transparent() {
        let f = Frame::new(4, 3);
        assert_eq!((f.width(), f.height()), (4, 3));
        assert!(f.read_pixels().data.iter().all(|&b| b == 0));
    }

    #[test]
    fn write_rejects_wrong_size() {
        let mut f = Frame::new(4, 4);
        let err = f.write_pixels(&PixelBuffer::new(3, 4)).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { width: 3, expected_width: 4, .. }));

        let mut ok = PixelBuffer::new(4, 4);
        ok.set_pixel(1, 2, RED);
        f.write_pixels(&ok).unwrap();
        assert_eq!(f.pixel(1, 2), RED);
        assert_eq!(f.read_pixels(), ok);
    }

    #[test]
    fn segment_paints_its_body_and_nothing_far_away() {
        let mut f = Frame::new(20, 20);
        f.draw_segment(Point::new(2.0, 10.0), Point::new(18.0, 10.0), &pen(3.0));
        assert_eq!(f.pixel(10, 9), RED);
        assert_eq!(f.pixel(10, 10), RED);
        assert_eq!(f.pixel(10, 2).a, 0);
        assert_eq!(f.pixel(10, 16).a, 0);
    }

    #[test]
    fn segment_end_is_rounded() {
        let mut f = Frame::new(40, 40);
        f.draw_segment(Point::new(10.0, 20.0), Point::new(30.0, 20.0), &pen(12.0));
        // straight past the end point: inside the round cap
        assert_eq!(f.pixel(33, 19).a, 255);
        // diagonal corner of a square cap would be painted, a round one is not
        assert_eq!(f.pixel(35, 14).a, 0);
    }

    #[test]
    fn eraser_ignores_color_and_clears_alpha() {
        let mut f = Frame::new(20, 20);
        f.draw_segment(Point::new(0.0, 10.0), Point::new(20.0, 10.0), &pen(4.0));
        let eraser = LineStyle {
            width: 20.0,
            color: Rgba::WHITE,
            composite: Composite::DestinationOut,
        };
        f.draw_segment(Point::new(0.0, 10.0), Point::new(20.0, 10.0), &eraser);
        for x in 0..20 {
            assert_eq!(f.pixel(x, 10), Rgba::TRANSPARENT);
        }
    }

    #[test]
    fn translucent_ink_blends_over_existing_ink() {
        let mut f = Frame::new(10, 10);
        f.draw_segment(Point::new(0.0, 5.0), Point::new(10.0, 5.0), &pen(4.0));
        let blue = LineStyle {
            width: 4.0,
            color: Rgba::rgba(0, 0, 255, 128),
            composite: Composite::SourceOver,
        };
        f.draw_segment(Point::new(0.0, 5.0), Point::new(10.0, 5.0), &blue);
        let p = f.pixel(5, 5);
        assert_eq!(p.a, 255);
        assert!(p.r > 100 && p.r < 155, "{p:?}");
        assert!(p.b > 100 && p.b < 155, "{p:?}");
    }

    #[test]
    fn segments_outside_the_frame_are_clipped() {
        let mut f = Frame::new(8, 8);
        f.draw_segment(Point::new(-50.0, -50.0), Point::new(-40.0, -40.0), &pen(3.0));
        f.draw_segment(Point::new(-5.0, 4.0), Point::new(50.0, 4.0), &pen(2.0));
        assert_eq!(f.pixel(0, 0).a, 0);
        assert_eq!(f.pixel(7, 3), RED);
    }

    #[test]
    fn bitmap_lands_inside_its_placement() {
        let src = PixelBuffer::filled(2, 1, RED);
        let mut f = Frame::new(10, 10);
        let at = Placement { offset_x: 0.0, offset_y: 3.0, draw_width: 10.0, draw_height: 4.0 };
        f.draw_bitmap(&src, at).unwrap();
        assert_eq!(f.pixel(5, 0).a, 0);
        assert_eq!(f.pixel(5, 9).a, 0);
        let inside = f.pixel(5, 5);
        assert!(inside.a >= 250 && inside.r >= 250 && inside.g <= 5, "{inside:?}");
    }

    #[test]
    fn clear_wipes_everything() {
        let mut f = Frame::new(6, 6);
        f.draw_segment(Point::new(0.0, 0.0), Point::new(6.0, 6.0), &pen(3.0));
        f.clear();
        assert!(f.read_pixels().data.iter().all(|&b| b == 0));
    }
}
