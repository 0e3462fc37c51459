use crate::{normalize, Float, Grid, LocalPoint, PathSegment, RoomAddress, Vector, Wall};

/// Below this, direction components and distances are treated as zero.
const SIGHT_EPSILON: Float = 1e-3;

/// Where a line of sight leaves a room.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallCrossing {
    /// Exit point, local to `room`
    pub point: LocalPoint,
    pub wall: Wall,
    pub room: RoomAddress,
}

/// The closest wall a beam starting at `origin`, heading along `dir`, leaves a
/// room through, and where it does so.
fn room_exit(grid: &Grid, origin: Vector, dir: Vector) -> Option<(Wall, Vector)> {
    let (width, height) = (grid.room_width(), grid.room_height());

    Wall::ALL
        .into_iter()
        .filter_map(|wall| {
            let (axis, along, extent) = if wall.is_horizontal() {
                (1, 0, width)
            } else {
                (0, 1, height)
            };

            let outwards = match wall {
                Wall::North | Wall::West => -dir[axis],
                Wall::South | Wall::East => dir[axis],
            };

            if outwards <= SIGHT_EPSILON {
                return None;
            }

            let offset = wall.offset(width, height);
            let t = (offset - origin[axis]) / dir[axis];

            if t <= SIGHT_EPSILON {
                return None;
            }

            let mut point = origin + dir * t;
            point[axis] = offset;

            (0.0..=extent)
                .contains(&point[along])
                .then_some((t, wall, point))
        })
        .min_by(|(t1, ..), (t2, ..)| t1.total_cmp(t2))
        .map(|(_, wall, point)| (wall, point))
}

/// Walks a straight line from `receptor` to `object`, room by room, and
/// returns the walls it crosses on the way, starting from the receptor's side.
///
/// Positions are taken as they are, no room is mirrored. The walk stops once it
/// enters `object_room`, or when it can't leave a room (the line runs off the
/// grid, or has no direction).
pub fn trace_line_of_sight(
    grid: &Grid,
    receptor_room: RoomAddress,
    receptor: LocalPoint,
    object_room: RoomAddress,
    object: LocalPoint,
) -> Vec<WallCrossing> {
    let target = grid.grid_position(object_room, object);

    let mut crossings = Vec::new();
    let mut room = receptor_room;
    let mut position = receptor.0;

    // every crossing enters a new room, and the line never comes back
    let max_crossings = (grid.rows() + grid.cols()) as usize;

    while room != object_room && crossings.len() < max_crossings {
        let dir = normalize(target - grid.grid_position(room, LocalPoint(position)));

        let Some((wall, exit)) = room_exit(grid, position, dir) else {
            log::trace!("line of sight can't leave room {room}");
            break;
        };

        crossings.push(WallCrossing {
            point: LocalPoint(exit),
            wall,
            room,
        });

        let Some(next) = grid.neighbour(room, wall) else {
            log::trace!("line of sight leaves the grid through {wall} of {room}");
            break;
        };

        let mut entry = exit;
        if wall.is_horizontal() {
            entry.y = wall.opposite().offset(grid.room_width(), grid.room_height());
        } else {
            entry.x = wall.opposite().offset(grid.room_width(), grid.room_height());
        }

        log::trace!("line of sight crosses {wall} of {room} at {exit:?}");

        room = next;
        position = entry;
    }

    crossings
}

/// Turns the output of [`trace_line_of_sight`] into canvas segments, going from
/// the object, through every crossing, to the receptor.
pub fn fold_line_of_sight(
    grid: &Grid,
    object_room: RoomAddress,
    object: LocalPoint,
    receptor_room: RoomAddress,
    receptor: LocalPoint,
    crossings: &[WallCrossing],
) -> Vec<PathSegment> {
    let points = [grid.room_to_canvas(object_room, object)]
        .into_iter()
        .chain(
            crossings
                .iter()
                .rev()
                .map(|crossing| grid.room_to_canvas(crossing.room, crossing.point)),
        )
        .chain([grid.room_to_canvas(receptor_room, receptor)])
        .collect::<Vec<_>>();

    points
        .windows(2)
        .map(|pair| PathSegment {
            start: pair[0],
            end: pair[1],
        })
        .collect()
}
