// Grayscale filter applied to whatever lands in the image frame.
// Visual: the portrait turns black & white; transparent letterbox bars stay transparent.

use crate::types::PixelBuffer;
use rayon::prelude::*;

/// Rec.601 luma, rounded to the nearest 8-bit level (halves round up).
/// Integer weights in thousandths keep the .5 cases exact.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let y = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
    ((y + 500) / 1000) as u8
}

/// Replace R, G and B of every pixel with its luminance. Alpha is left alone.
pub fn grayscale(buf: &mut PixelBuffer) {
    if buf.width == 0 || buf.height == 0 {
        return;
    }
    let stride = buf.width * 4;

    // Rows are independent, so hand them to the pool.
    buf.data.par_chunks_mut(stride).for_each(|row| {
        for px in row.chunks_exact_mut(4) {
            let l = luminance(px[0], px[1], px[2]);
            px[0] = l;
            px[1] = l;
            px[2] = l;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rgba;

    fn sample() -> PixelBuffer {
        let mut buf = PixelBuffer::new(4, 3);
        let colors = [
            Rgba::rgb(255, 0, 0),
            Rgba::rgb(0, 255, 0),
            Rgba::rgb(0, 0, 255),
            Rgba::rgba(12, 200, 99, 17),
            Rgba::WHITE,
            Rgba::BLACK,
            Rgba::TRANSPARENT,
            Rgba::rgba(128, 64, 32, 200),
        ];
        for y in 0..3 {
            for x in 0..4 {
                buf.set_pixel(x, y, colors[(y * 4 + x) % colors.len()]);
            }
        }
        buf
    }

    #[test]
    fn pure_red_maps_to_76() {
        let mut buf = PixelBuffer::filled(1, 1, Rgba::rgb(255, 0, 0));
        grayscale(&mut buf);
        assert_eq!(buf.pixel(0, 0), Rgba::rgba(76, 76, 76, 255));
    }

    #[test]
    fn extremes_are_preserved() {
        assert_eq!(luminance(255, 255, 255), 255);
        assert_eq!(luminance(0, 0, 0), 0);
        assert_eq!(luminance(0, 255, 0), 150);
        assert_eq!(luminance(0, 0, 255), 29);
    }

    #[test]
    fn exact_halves_round_up() {
        // 0.299*4 + 0.587*40 + 0.114*16 = 26.5
        assert_eq!(luminance(4, 40, 16), 27);
        // 0.299*1 + 0.587*1 + 0.114*2 = 1.114, well below the half
        assert_eq!(luminance(1, 1, 2), 1);
        for r in (0..=255u32).step_by(3) {
            for g in (0..=255u32).step_by(5) {
                for b in (0..=255u32).step_by(7) {
                    let exact = (299 * r + 587 * g + 114 * b + 500) / 1000;
                    assert_eq!(luminance(r as u8, g as u8, b as u8) as u32, exact);
                }
            }
        }
    }

    #[test]
    fn alpha_untouched_and_channels_equal() {
        let before = sample();
        let mut after = before.clone();
        grayscale(&mut after);
        assert_eq!(after.data.len(), before.data.len());
        for y in 0..before.height {
            for x in 0..before.width {
                let a = before.pixel(x, y);
                let b = after.pixel(x, y);
                assert_eq!(a.a, b.a);
                assert_eq!(b.r, b.g);
                assert_eq!(b.g, b.b);
                assert_eq!(b.r, luminance(a.r, a.g, a.b));
            }
        }
    }

    #[test]
    fn applying_twice_is_the_same_as_once() {
        let mut once = sample();
        grayscale(&mut once);
        let mut twice = once.clone();
        grayscale(&mut twice);
        assert_eq!(once, twice);

        // every gray level is a fixed point
        for v in 0..=255u8 {
            assert_eq!(luminance(v, v, v), v);
        }
    }

    #[test]
    fn empty_buffer_is_a_no_op() {
        let mut buf = PixelBuffer::new(0, 5);
        grayscale(&mut buf);
        assert!(buf.data.is_empty());
    }
}
