//! Light paths through a grid of mirrored rooms.
//!
//! Rooms are laid out on a rectangular grid, each with four walls that can be
//! switched into a reflective state. Given the object and receptor markers of
//! a home room, and the walls currently reflecting light, [`PathSolver`] uses
//! the Method of Images to reconstruct the folded path a beam takes: the
//! receptor is reflected across every active wall to get a virtual target, a
//! straight ray is cast towards it, and the ray is folded back at every wall
//! it crosses.
//!
//! [`Session`] ties everything together: it owns the wall states and both
//! markers, keeps them consistent when the home or target room changes, and
//! notifies listeners so that a rendering layer can redraw.

mod config;
mod coords;
mod error;
mod geometry;
mod marker;
mod sequence;
mod session;
mod sight;
mod solver;
mod walls;

pub use config::*;
pub use coords::*;
pub use error::*;
pub use geometry::*;
pub use marker::*;
pub use sequence::*;
pub use session::*;
pub use sight::*;
pub use solver::*;
pub use walls::*;

pub use nalgebra;

pub type Float = f64;

pub type Vector = nalgebra::Vector2<Float>;

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;

    pub const TOLERANCE: Float = 1e-9;

    #[track_caller]
    pub fn assert_close(a: Vector, b: Vector) {
        assert!(
            (a - b).norm() < TOLERANCE,
            "expected {b:?}, got {a:?} (off by {})",
            (a - b).norm()
        );
    }
}
