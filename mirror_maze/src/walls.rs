use core::fmt;

use crate::{CanvasPoint, Float, Grid, RoomAddress, Segment, Vector};

/// Maximum distance, in canvas pixels, at which a point still "touches" a wall.
pub const WALL_HIT_TOLERANCE: Float = 10.0;

/// One of the four walls of a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Wall {
    North,
    South,
    East,
    West,
}

impl Wall {
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }

    /// Whether the wall runs horizontally (North and South walls).
    #[inline]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::North | Self::South)
    }

    #[inline]
    pub const fn symbol(self) -> char {
        match self {
            Self::North => 'N',
            Self::South => 'S',
            Self::East => 'E',
            Self::West => 'W',
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "N" | "n" => Some(Self::North),
            "S" | "s" => Some(Self::South),
            "E" | "e" => Some(Self::East),
            "W" | "w" => Some(Self::West),
            _ => None,
        }
    }

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }

    /// The coordinate of this wall's line, along the axis perpendicular to it,
    /// in a room of the given size.
    #[inline]
    pub fn offset(self, width: Float, height: Float) -> Float {
        match self {
            Self::North | Self::West => 0.0,
            Self::South => height,
            Self::East => width,
        }
    }

    /// This wall's endpoints, relative to the top-left corner of a room of the
    /// given size.
    pub fn local_segment(self, width: Float, height: Float) -> Segment {
        let (p1, p2) = match self {
            Self::North => ((0.0, 0.0), (width, 0.0)),
            Self::South => ((0.0, height), (width, height)),
            Self::East => ((width, 0.0), (width, height)),
            Self::West => ((0.0, 0.0), (0.0, height)),
        };
        Segment::new(Vector::new(p1.0, p1.1), Vector::new(p2.0, p2.1))
    }
}

impl fmt::Display for Wall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WallState {
    /// A structural wall on the outer edge of the grid. Never reflects.
    Disabled,
    Off,
    /// Reflective.
    On,
}

impl WallState {
    #[inline]
    pub const fn is_togglable(self) -> bool {
        !matches!(self, Self::Disabled)
    }

    #[inline]
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Disabled => Self::Disabled,
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MirrorWall {
    pub room: RoomAddress,
    pub wall: Wall,
    pub state: WallState,
}

/// The state of every wall of every room in a grid.
///
/// Walls are named as they appear on the canvas: a room's `East` wall is always
/// its right-hand side, whether or not the room's contents are drawn flipped.
#[derive(Clone, Debug, PartialEq)]
pub struct MirrorWalls {
    grid: Grid,
    /// Indexed by [`Grid::index`], then by [`Wall::index`]
    states: Vec<[WallState; 4]>,
    /// Last togglable state of each wall direction, carried from one home room to the next
    memory: [Option<WallState>; 4],
}

impl MirrorWalls {
    /// Every wall starts `Off`, except the north walls of the top row and the
    /// south walls of the bottom row, which are `Disabled`.
    pub fn new(grid: Grid) -> Self {
        let states = grid
            .rooms()
            .map(|room| {
                Wall::ALL.map(|wall| {
                    let boundary = match wall {
                        Wall::North => room.row == 0,
                        Wall::South => room.row == grid.rows() - 1,
                        Wall::East | Wall::West => false,
                    };
                    if boundary {
                        WallState::Disabled
                    } else {
                        WallState::Off
                    }
                })
            })
            .collect();

        Self {
            grid,
            states,
            memory: [None; 4],
        }
    }

    #[inline]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// # Panics
    ///
    /// if `room` is outside the grid
    #[inline]
    #[track_caller]
    pub fn state(&self, room: RoomAddress, wall: Wall) -> WallState {
        self.states[self.grid.index(room)][wall.index()]
    }

    /// Sets a togglable wall to `state`. Disabled walls are left untouched.
    ///
    /// Returns whether the wall's state changed.
    #[track_caller]
    fn set(&mut self, room: RoomAddress, wall: Wall, state: WallState) -> bool {
        debug_assert!(state.is_togglable());
        let slot = &mut self.states[self.grid.index(room)][wall.index()];
        if slot.is_togglable() && *slot != state {
            *slot = state;
            true
        } else {
            false
        }
    }

    /// Flips a togglable wall between `Off` and `On`. Toggling a disabled wall
    /// does nothing.
    ///
    /// Returns the wall's new state.
    #[track_caller]
    pub fn toggle(&mut self, room: RoomAddress, wall: Wall) -> WallState {
        let slot = &mut self.states[self.grid.index(room)][wall.index()];
        *slot = slot.toggled();
        log::trace!("wall {wall} of room {room} is now {slot:?}");
        *slot
    }

    pub fn iter(&self) -> impl Iterator<Item = MirrorWall> + '_ {
        self.grid.rooms().zip(&self.states).flat_map(|(room, states)| {
            Wall::ALL
                .into_iter()
                .zip(*states)
                .map(move |(wall, state)| MirrorWall { room, wall, state })
        })
    }

    /// The walls of `room` that are currently `On`.
    pub fn active_walls(&self, room: RoomAddress) -> impl Iterator<Item = Wall> + '_ {
        let states = &self.states[self.grid.index(room)];
        Wall::ALL
            .into_iter()
            .filter(move |wall| states[wall.index()] == WallState::On)
    }

    /// The state last remembered for walls facing `wall`, if any.
    #[inline]
    pub fn remembered(&self, wall: Wall) -> Option<WallState> {
        self.memory[wall.index()]
    }

    fn remember(&mut self, room: RoomAddress) {
        let states = self.states[self.grid.index(room)];
        for wall in Wall::ALL {
            let state = states[wall.index()];
            if state.is_togglable() {
                self.memory[wall.index()] = Some(state);
            }
        }
    }

    /// Moves the wall configuration of the home room `from` over to `to`.
    ///
    /// The togglable states of `from` are remembered per direction, every
    /// togglable wall outside of `to` is switched `Off`, then `to` takes on the
    /// remembered states. Afterwards, `to` is the only room that may have walls
    /// `On`.
    pub fn transfer_home(&mut self, from: RoomAddress, to: RoomAddress) {
        self.remember(from);

        for room in self.grid.rooms().filter(|&room| room != to) {
            for wall in Wall::ALL {
                self.set(room, wall, WallState::Off);
            }
        }

        for wall in Wall::ALL {
            if let Some(state) = self.remembered(wall) {
                self.set(to, wall, state);
            }
        }
    }

    /// Switches on the walls of `home` a beam has to bounce off to travel
    /// towards `target`: at most one of East/West and one of North/South.
    /// Every other togglable wall of `home` is switched `Off`.
    pub fn auto_select(&mut self, home: RoomAddress, target: RoomAddress) {
        for wall in Wall::ALL {
            self.set(home, wall, WallState::Off);
        }

        let col_diff = i64::from(target.col) - i64::from(home.col);
        let row_diff = i64::from(target.row) - i64::from(home.row);

        let horizontal = match col_diff.signum() {
            1 => Some(Wall::East),
            -1 => Some(Wall::West),
            _ => None,
        };

        let vertical = match row_diff.signum() {
            1 => Some(Wall::South),
            -1 => Some(Wall::North),
            _ => None,
        };

        for wall in horizontal.into_iter().chain(vertical) {
            self.set(home, wall, WallState::On);
        }

        self.remember(home);

        log::debug!(
            "auto-selected walls {:?} of {home} towards {target}",
            self.active_walls(home).collect::<Vec<_>>()
        );
    }

    /// `wall` of `room`, in canvas space.
    pub fn wall_segment(&self, room: RoomAddress, wall: Wall) -> Segment {
        let corner = self.grid.room_to_canvas(room, Default::default());
        wall.local_segment(self.grid.room_width(), self.grid.room_height())
            .translated(corner.0)
    }

    /// Canvas segments of the walls of `room` that are `On`.
    pub fn room_wall_segments(&self, room: RoomAddress) -> Vec<Segment> {
        self.active_walls(room)
            .map(|wall| self.wall_segment(room, wall))
            .collect()
    }

    /// Canvas segments of every wall in the grid that is `On`.
    pub fn active_segments(&self) -> Vec<Segment> {
        self.iter()
            .filter(|mirror| mirror.state == WallState::On)
            .map(|mirror| self.wall_segment(mirror.room, mirror.wall))
            .collect()
    }

    /// The togglable wall of `home` under `point`, if any.
    pub fn wall_at(&self, home: RoomAddress, point: CanvasPoint) -> Option<Wall> {
        Wall::ALL.into_iter().find(|&wall| {
            self.state(home, wall).is_togglable()
                && self.wall_segment(home, wall).distance_to(point.0) < WALL_HIT_TOLERANCE
        })
    }
}
