//! Polygon model, style-dispatched predicates, arc clipping and box
//! cropping over the fixed-point coordinate grid.

pub mod arc_clip;
pub mod crop;
pub mod error;
pub mod polygon;
mod predicates;
pub mod style;

pub use arc_clip::{clip_arc, ArcClip};
pub use crop::{crop_box, half_crop_box, CropOutcome};
pub use error::GeometryError;
pub use polygon::{Polygon, TextDescriptor, TextInfo};
pub use predicates::INSIDE_DISTANCE;
pub use style::{Style, ALL_STYLES};
