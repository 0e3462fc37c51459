use core::fmt;

use crate::{Float, GridConfig, MazeError, Vector, Wall};

/// A cell of the room grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomAddress {
    pub row: u32,
    pub col: u32,
}

impl RoomAddress {
    #[inline]
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for RoomAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A point relative to the top-left corner of a room, in the room's own,
/// unmirrored frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocalPoint(pub Vector);

/// A point on the canvas the grid is drawn on.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CanvasPoint(pub Vector);

macro_rules! impl_point {
    ($point:ident) => {
        impl $point {
            #[inline]
            #[must_use]
            pub fn new(x: Float, y: Float) -> Self {
                Self(Vector::new(x, y))
            }

            #[inline]
            pub fn x(&self) -> Float {
                self.0.x
            }

            #[inline]
            pub fn y(&self) -> Float {
                self.0.y
            }
        }

        impl From<Vector> for $point {
            #[inline]
            fn from(v: Vector) -> Self {
                Self(v)
            }
        }
    };
}

impl_point!(LocalPoint);
impl_point!(CanvasPoint);

/// Which local axes of a room are flipped when it is rendered.
///
/// Odd columns are flipped horizontally and the second row is flipped
/// vertically, so that neighbouring rooms are drawn as reflections of each
/// other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flip {
    pub x: bool,
    pub y: bool,
}

impl Flip {
    pub const NONE: Self = Self { x: false, y: false };

    #[inline]
    #[must_use]
    pub const fn of(room: RoomAddress) -> Self {
        Self {
            x: room.col % 2 == 1,
            y: room.row == 1,
        }
    }

    #[inline]
    pub const fn is_identity(self) -> bool {
        !self.x && !self.y
    }

    /// The wall of the room's local frame that is drawn where `wall` appears on
    /// the canvas.
    ///
    /// East and West trade places in horizontally flipped rooms, North and
    /// South in vertically flipped ones. The mapping is its own inverse.
    #[inline]
    #[must_use]
    pub const fn local_wall(self, wall: Wall) -> Wall {
        match wall {
            Wall::East | Wall::West if self.x => wall.opposite(),
            Wall::North | Wall::South if self.y => wall.opposite(),
            _ => wall,
        }
    }
}

/// A validated [`GridConfig`], with the conversions between canvas space,
/// room addresses and room-local points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    config: GridConfig,
    /// Canvas position of the top-left corner of room `(0, 0)`.
    origin: Vector,
}

impl Default for Grid {
    fn default() -> Self {
        Self::from_valid(GridConfig::default())
    }
}

impl Grid {
    pub fn new(config: GridConfig) -> Result<Self, MazeError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: GridConfig) -> Self {
        let origin = Vector::new(
            (config.canvas_width - config.grid_width()) / 2.0,
            (config.canvas_height - config.grid_height()) / 2.0,
        );
        Self { config, origin }
    }

    #[inline]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    #[inline]
    pub const fn rows(&self) -> u32 {
        self.config.rows
    }

    #[inline]
    pub const fn cols(&self) -> u32 {
        self.config.cols
    }

    #[inline]
    pub const fn room_width(&self) -> Float {
        self.config.room_width
    }

    #[inline]
    pub const fn room_height(&self) -> Float {
        self.config.room_height
    }

    #[inline]
    pub fn origin(&self) -> CanvasPoint {
        CanvasPoint(self.origin)
    }

    #[inline]
    pub const fn contains(&self, room: RoomAddress) -> bool {
        room.row < self.config.rows && room.col < self.config.cols
    }

    pub fn check(&self, room: RoomAddress) -> Result<RoomAddress, MazeError> {
        if self.contains(room) {
            Ok(room)
        } else {
            Err(MazeError::RoomOutOfBounds {
                room,
                rows: self.rows(),
                cols: self.cols(),
            })
        }
    }

    /// Row-major index of `room`, used to address per-room storage.
    ///
    /// # Panics
    ///
    /// if `room` is outside the grid
    #[inline]
    #[track_caller]
    pub(crate) fn index(&self, room: RoomAddress) -> usize {
        assert!(
            self.contains(room),
            "room {room} is outside the {}x{} grid",
            self.rows(),
            self.cols()
        );
        room.row as usize * self.cols() as usize + room.col as usize
    }

    /// All rooms, in row-major order.
    pub fn rooms(&self) -> impl Iterator<Item = RoomAddress> {
        let cols = self.cols();
        (0..self.rows()).flat_map(move |row| (0..cols).map(move |col| RoomAddress::new(row, col)))
    }

    /// The room across `wall` from `room`, if it is part of the grid.
    pub fn neighbour(&self, room: RoomAddress, wall: Wall) -> Option<RoomAddress> {
        let RoomAddress { row, col } = room;
        let next = match wall {
            Wall::North => RoomAddress::new(row.checked_sub(1)?, col),
            Wall::South => RoomAddress::new(row + 1, col),
            Wall::East => RoomAddress::new(row, col + 1),
            Wall::West => RoomAddress::new(row, col.checked_sub(1)?),
        };
        self.contains(next).then_some(next)
    }

    /// Position of `local` relative to the top-left corner of the whole grid,
    /// ignoring mirroring.
    #[inline]
    pub fn grid_position(&self, room: RoomAddress, local: LocalPoint) -> Vector {
        Vector::new(
            room.col as Float * self.room_width(),
            room.row as Float * self.room_height(),
        ) + local.0
    }

    #[inline]
    pub fn room_to_canvas(&self, room: RoomAddress, local: LocalPoint) -> CanvasPoint {
        CanvasPoint(self.origin + self.grid_position(room, local))
    }

    /// Returns the room containing `point`, and `point` relative to it, or
    /// `None` if `point` is outside the grid.
    ///
    /// Room edges are half-open, so this only inverts
    /// [`room_to_canvas`](Self::room_to_canvas) for points at least a canvas
    /// ulp away from the room's far edges.
    pub fn canvas_to_room(&self, point: CanvasPoint) -> Option<(RoomAddress, LocalPoint)> {
        let relative = point.0 - self.origin;

        if relative.x < 0.0
            || relative.y < 0.0
            || relative.x >= self.config.grid_width()
            || relative.y >= self.config.grid_height()
        {
            return None;
        }

        let col = (relative.x / self.room_width()).floor() as u32;
        let row = (relative.y / self.room_height()).floor() as u32;

        // roundoff right below the far edge can floor into a room that doesn't exist
        let room = RoomAddress::new(row.min(self.rows() - 1), col.min(self.cols() - 1));
        let local = relative - self.grid_position(room, LocalPoint::default());

        Some((room, LocalPoint(local)))
    }

    /// Reflects `point` about the room's own center lines, on the flipped axes.
    #[inline]
    pub fn mirror_point(&self, point: LocalPoint, flip: Flip) -> LocalPoint {
        let LocalPoint(v) = point;
        LocalPoint::new(
            if flip.x { self.room_width() - v.x } else { v.x },
            if flip.y { self.room_height() - v.y } else { v.y },
        )
    }

    /// Where `local` is drawn inside `room`, once the room's mirroring is applied.
    #[inline]
    pub fn mirrored_room_point(&self, room: RoomAddress, local: LocalPoint) -> LocalPoint {
        self.mirror_point(local, Flip::of(room))
    }

    /// Canvas position at which `local` is drawn inside `room`.
    #[inline]
    pub fn render_point(&self, room: RoomAddress, local: LocalPoint) -> CanvasPoint {
        self.room_to_canvas(room, self.mirrored_room_point(room, local))
    }
}
