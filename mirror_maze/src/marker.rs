use crate::{Float, Grid, LocalPoint, RoomAddress};

/// Markers are kept at least this far from the walls of their room.
pub const MARKER_MARGIN: Float = 10.0;

/// Maximum distance, in canvas pixels, at which a point still grabs a marker.
pub const MARKER_HIT_RADIUS: Float = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// Light source
    Object,
    /// Light sink
    Receptor,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub home_room: RoomAddress,
    pub position: LocalPoint,
}

impl Marker {
    #[inline]
    pub const fn new(kind: MarkerKind, home_room: RoomAddress, position: LocalPoint) -> Self {
        Self {
            kind,
            home_room,
            position,
        }
    }

    /// Moves the marker to `position`, clamped inside its room.
    #[inline]
    pub fn move_to(&mut self, grid: &Grid, position: LocalPoint) {
        self.position = clamp_to_room(grid, position);
    }
}

/// `point`, pulled inside the room so that it stays [`MARKER_MARGIN`] away
/// from every wall.
///
/// In rooms too narrow for the margin, the point is pulled to the middle.
pub fn clamp_to_room(grid: &Grid, point: LocalPoint) -> LocalPoint {
    let clamp = |v: Float, size: Float| {
        let half = size / 2.0;
        v.clamp(MARKER_MARGIN.min(half), (size - MARKER_MARGIN).max(half))
    };

    LocalPoint::new(
        clamp(point.x(), grid.room_width()),
        clamp(point.y(), grid.room_height()),
    )
}
