use layline_core::CoordError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error(transparent)]
    Coord(#[from] CoordError),

    #[error("style {style} cannot carry {count} points")]
    InvalidStyle { style: &'static str, count: usize },

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),
}
