use layline_core::CoordError;
use layline_geometry::GeometryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Coord(#[from] CoordError),
}
