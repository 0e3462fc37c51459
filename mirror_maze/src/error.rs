use crate::{Float, RoomAddress};

/// Errors raised while validating a grid layout or the rooms addressed in it.
///
/// Geometric dead ends (a ray missing a wall, an obstructed leg) are not
/// errors: they are reported through [`RayPath::valid`](crate::RayPath::valid).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MazeError {
    #[error("grid must have at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: u32, cols: u32 },

    #[error("room size must be positive and finite, got {width}x{height}")]
    InvalidRoomSize { width: Float, height: Float },

    #[error(
        "a {grid_width}x{grid_height} grid does not fit in a {canvas_width}x{canvas_height} canvas"
    )]
    GridExceedsCanvas {
        grid_width: Float,
        grid_height: Float,
        canvas_width: Float,
        canvas_height: Float,
    },

    #[error("room {room} is outside the {rows}x{cols} grid")]
    RoomOutOfBounds {
        room: RoomAddress,
        rows: u32,
        cols: u32,
    },
}
