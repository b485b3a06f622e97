//! Manhattan-rectangle cropping against a clipping rectangle.

use layline_core::Rect;

/// Outcome of a crop. `Ambiguous` is a normal control-flow result, not an
/// error: the caller must subdivide before cropping cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropOutcome {
    /// The box lies entirely inside the clip; nothing to do.
    Unchanged,
    /// The box was reduced to the contained rectangle.
    Cropped(Rect),
    /// The box lies entirely outside the clip.
    Discard,
    /// The box protrudes on both axes and spans the clip on neither; a
    /// single-axis crop cannot represent the result.
    Ambiguous,
}

/// Crop `bounds` to the part inside `clip`, moving at most one axis.
///
/// Both axes are treated symmetrically: the axis with the larger overlap
/// extent is the one cropped, and only when the box fully spans the clip
/// on the other axis.
#[must_use]
pub fn crop_box(bounds: Rect, clip: Rect) -> CropOutcome {
    if !bounds.intersects(&clip) {
        return CropOutcome::Discard;
    }
    if clip.contains_rect(&bounds) {
        return CropOutcome::Unchanged;
    }
    let out_x = bounds.min_x < clip.min_x || bounds.max_x > clip.max_x;
    let out_y = bounds.min_y < clip.min_y || bounds.max_y > clip.max_y;
    match (out_x, out_y) {
        (true, false) => CropOutcome::Cropped(clamp_x(bounds, clip)),
        (false, true) => CropOutcome::Cropped(clamp_y(bounds, clip)),
        (true, true) => {
            let x_overlap = bounds.max_x.min(clip.max_x) - bounds.min_x.max(clip.min_x);
            let y_overlap = bounds.max_y.min(clip.max_y) - bounds.min_y.max(clip.min_y);
            let spans_y = bounds.min_y <= clip.min_y && bounds.max_y >= clip.max_y;
            let spans_x = bounds.min_x <= clip.min_x && bounds.max_x >= clip.max_x;
            if x_overlap >= y_overlap && spans_y {
                CropOutcome::Cropped(clamp_x(bounds, clip))
            } else if x_overlap < y_overlap && spans_x {
                CropOutcome::Cropped(clamp_y(bounds, clip))
            } else {
                CropOutcome::Ambiguous
            }
        }
        (false, false) => CropOutcome::Unchanged,
    }
}

/// Like `crop_box`, but a box strictly inside the clip with margin on all
/// four sides is shrunk from the side with the largest margin, to half
/// that box's extent, instead of being left whole. Used to carve partial
/// rule-check margins rather than deleting geometry outright.
#[must_use]
pub fn half_crop_box(bounds: Rect, clip: Rect) -> CropOutcome {
    let left = bounds.min_x - clip.min_x;
    let right = clip.max_x - bounds.max_x;
    let bottom = bounds.min_y - clip.min_y;
    let top = clip.max_y - bounds.max_y;
    if left > 0 && right > 0 && bottom > 0 && top > 0 {
        let largest = left.max(right).max(bottom).max(top);
        let mut shrunk = bounds;
        let half_w = bounds.width() / 2;
        let half_h = bounds.height() / 2;
        if largest == left {
            shrunk.min_x += half_w;
        } else if largest == right {
            shrunk.max_x -= half_w;
        } else if largest == bottom {
            shrunk.min_y += half_h;
        } else {
            shrunk.max_y -= half_h;
        }
        return CropOutcome::Cropped(shrunk);
    }
    crop_box(bounds, clip)
}

fn clamp_x(bounds: Rect, clip: Rect) -> Rect {
    Rect {
        min_x: bounds.min_x.max(clip.min_x),
        max_x: bounds.max_x.min(clip.max_x),
        ..bounds
    }
}

fn clamp_y(bounds: Rect, clip: Rect) -> Rect {
    Rect {
        min_y: bounds.min_y.max(clip.min_y),
        max_y: bounds.max_y.min(clip.max_y),
        ..bounds
    }
}
