use either::Either;

use crate::{RoomAddress, Wall};

/// One wall a beam has to cross, and the room it leaves through it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MirrorStep {
    pub wall: Wall,
    pub room: RoomAddress,
}

fn steps(
    start: u32,
    end: u32,
    forward: Wall,
    backward: Wall,
) -> impl Iterator<Item = (Wall, u32)> {
    let (wall, range) = if end >= start {
        (forward, Either::Left(start..end))
    } else {
        (backward, Either::Right((end + 1..=start).rev()))
    };
    range.map(move |at| (wall, at))
}

/// The walls crossed, in order, by a Manhattan path from `home` to `target`:
/// every East/West step first, then every North/South step.
pub fn mirror_sequence(home: RoomAddress, target: RoomAddress) -> Vec<MirrorStep> {
    let horizontal = steps(home.col, target.col, Wall::East, Wall::West).map(|(wall, col)| {
        MirrorStep {
            wall,
            room: RoomAddress::new(home.row, col),
        }
    });

    let vertical = steps(home.row, target.row, Wall::South, Wall::North).map(|(wall, row)| {
        MirrorStep {
            wall,
            room: RoomAddress::new(row, target.col),
        }
    });

    horizontal.chain(vertical).collect()
}

/// Manhattan distance between both rooms, which is also the number of
/// reflective walls a beam needs to get from one to the other.
#[inline]
pub const fn minimum_bounces(home: RoomAddress, target: RoomAddress) -> u32 {
    home.row.abs_diff(target.row) + home.col.abs_diff(target.col)
}

/// The first wall of [`mirror_sequence`], if `home != target`.
pub fn required_mirror(home: RoomAddress, target: RoomAddress) -> Option<Wall> {
    if target.col != home.col {
        Some(if target.col > home.col { Wall::East } else { Wall::West })
    } else if target.row != home.row {
        Some(if target.row > home.row { Wall::South } else { Wall::North })
    } else {
        None
    }
}

/// Sorts `walls` in the order a beam bounces off them: East/West walls first,
/// then North/South walls. Walls of the same orientation keep their order.
pub fn bounce_order(walls: &mut [Wall]) {
    walls.sort_by_key(|wall| wall.is_horizontal());
}
