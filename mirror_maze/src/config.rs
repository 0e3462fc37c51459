use crate::{Float, LocalPoint, MazeError, RoomAddress};

pub const ROOM_WIDTH: Float = 240.0;
pub const ROOM_HEIGHT: Float = 240.0;
pub const GRID_ROWS: u32 = 2;
pub const GRID_COLS: u32 = 5;
pub const CANVAS_WIDTH: Float = 1280.0;
pub const CANVAS_HEIGHT: Float = 600.0;

/// Dimensions of the room grid and of the canvas it is centered in.
///
/// All lengths are in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridConfig {
    pub rows: u32,
    pub cols: u32,
    pub room_width: Float,
    pub room_height: Float,
    pub canvas_width: Float,
    pub canvas_height: Float,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: GRID_ROWS,
            cols: GRID_COLS,
            room_width: ROOM_WIDTH,
            room_height: ROOM_HEIGHT,
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
        }
    }
}

impl GridConfig {
    #[inline]
    pub fn grid_width(&self) -> Float {
        self.cols as Float * self.room_width
    }

    #[inline]
    pub fn grid_height(&self) -> Float {
        self.rows as Float * self.room_height
    }

    pub fn validate(&self) -> Result<(), MazeError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(MazeError::EmptyGrid {
                rows: self.rows,
                cols: self.cols,
            });
        }

        let positive = |v: Float| v.is_finite() && v > 0.0;

        if !positive(self.room_width) || !positive(self.room_height) {
            return Err(MazeError::InvalidRoomSize {
                width: self.room_width,
                height: self.room_height,
            });
        }

        if self.grid_width() > self.canvas_width || self.grid_height() > self.canvas_height {
            return Err(MazeError::GridExceedsCanvas {
                grid_width: self.grid_width(),
                grid_height: self.grid_height(),
                canvas_width: self.canvas_width,
                canvas_height: self.canvas_height,
            });
        }

        Ok(())
    }
}

/// Where a session starts off.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    pub grid: GridConfig,
    pub home: RoomAddress,
    pub target: RoomAddress,
    pub object: LocalPoint,
    pub receptor: LocalPoint,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            home: RoomAddress::new(0, 1),
            target: RoomAddress::new(0, 2),
            object: LocalPoint::new(120.0, 120.0),
            receptor: LocalPoint::new(180.0, 180.0),
        }
    }
}
