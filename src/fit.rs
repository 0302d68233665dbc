// Aspect-preserving placement of a bitmap inside a frame.
// Visual: a wide photo gets bars above/below, a tall one gets bars left/right.

use crate::error::Error;
use crate::types::Placement;

fn positive(what: &'static str, value: f32) -> Result<f32, Error> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidDimension { what, value })
    }
}

/// Scale `source` to fit inside `target`, keeping its aspect ratio, and center it
/// on the axis that has spare room.
pub fn fit(
    source_width: f32,
    source_height: f32,
    target_width: f32,
    target_height: f32,
) -> Result<Placement, Error> {
    let sw = positive("source width", source_width)?;
    let sh = positive("source height", source_height)?;
    let tw = positive("target width", target_width)?;
    let th = positive("target height", target_height)?;

    let source_aspect = sw / sh;
    let target_aspect = tw / th;

    if source_aspect > target_aspect {
        // relatively wider: full width, bars top/bottom
        let draw_height = tw / source_aspect;
        Ok(Placement {
            offset_x: 0.0,
            offset_y: (th - draw_height) / 2.0,
            draw_width: tw,
            draw_height,
        })
    } else {
        // relatively taller: full height, bars left/right
        let draw_width = th * source_aspect;
        Ok(Placement {
            offset_x: (tw - draw_width) / 2.0,
            offset_y: 0.0,
            draw_width,
            draw_height: th,
        })
    }
}
