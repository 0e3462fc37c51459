use crate::{
    normalize, CanvasPoint, Flip, Float, Grid, LocalPoint, Ray, RoomAddress, Segment, Vector,
    Wall,
};

/// Tolerance, in pixels, for accepting a bounce point on a wall.
pub const SEGMENT_TOLERANCE: Float = 1e-6;

/// Tolerance on unit vector components for the angle of incidence/reflection check.
pub const ANGLE_TOLERANCE: Float = 0.01;

/// Obstacle hits closer than this to the start of the final leg are the wall
/// the beam just bounced off.
const MIN_LEG: Float = 1e-3;

/// One leg of a light path, in canvas space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathSegment {
    pub start: CanvasPoint,
    pub end: CanvasPoint,
}

impl PathSegment {
    #[inline]
    pub fn length(&self) -> Float {
        (self.end.0 - self.start.0).norm()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RayPath {
    /// Legs from the object to the receptor. May be incomplete if `!valid`.
    pub segments: Vec<PathSegment>,
    pub virtual_target: CanvasPoint,
    /// Whether the segments form a real, unobstructed path. Invalid paths
    /// should not be drawn.
    pub valid: bool,
}

/// A reflection off a wall, in the room's local frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounce {
    pub wall: Wall,
    pub point: LocalPoint,
    /// Unit direction of the leg arriving at `point`
    pub incident: Vector,
    /// Unit direction of the leg leaving `point`
    pub reflected: Vector,
}

impl Bounce {
    /// Whether the component of the direction parallel to the wall is kept,
    /// and the perpendicular one negated, within `tolerance`.
    ///
    /// Always holds if either leg has no direction.
    pub fn obeys_reflection_law(&self, tolerance: Float) -> bool {
        if self.incident == Vector::zeros() || self.reflected == Vector::zeros() {
            return true;
        }

        let (parallel, perpendicular) = if self.wall.is_horizontal() { (0, 1) } else { (1, 0) };

        (self.incident[parallel] - self.reflected[parallel]).abs() < tolerance
            && (self.incident[perpendicular] + self.reflected[perpendicular]).abs() < tolerance
    }
}

/// Why a path couldn't be folded into a valid one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathFailure {
    /// The beam runs parallel to the wall it should bounce off.
    Parallel { wall: Wall },
    /// The wall is behind the beam.
    Behind { wall: Wall },
    /// The beam meets the wall's line outside of the wall.
    OffSegment { wall: Wall },
    /// An active wall stands between the last bounce and the receptor.
    Obstructed,
    /// The object sits on the virtual target, the beam has no direction.
    Degenerate,
    /// The single bounce solver only handles East and West walls.
    NotVertical { wall: Wall },
}

/// What a solve found out along the way, for debugging and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct FoldDiagnostics {
    pub virtual_target: LocalPoint,
    pub bounces: Vec<Bounce>,
    pub failure: Option<PathFailure>,
}

impl FoldDiagnostics {
    pub fn obeys_reflection_law(&self) -> bool {
        self.bounces
            .iter()
            .all(|bounce| bounce.obeys_reflection_law(ANGLE_TOLERANCE))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolvedPath {
    pub path: RayPath,
    pub diagnostics: FoldDiagnostics,
}

/// Reflects `point` across the line of `wall`, in a room of `grid`.
pub fn reflect_point(point: LocalPoint, wall: Wall, grid: &Grid) -> LocalPoint {
    let LocalPoint(mut v) = point;
    let offset = wall.offset(grid.room_width(), grid.room_height());
    if wall.is_horizontal() {
        v.y = 2.0 * offset - v.y;
    } else {
        v.x = 2.0 * offset - v.x;
    }
    LocalPoint(v)
}

/// Negates the component of `dir` perpendicular to `wall`.
#[inline]
pub fn reflect_direction(dir: Vector, wall: Wall) -> Vector {
    if wall.is_horizontal() {
        Vector::new(dir.x, -dir.y)
    } else {
        Vector::new(-dir.x, dir.y)
    }
}

/// Every permutation of `walls`, starting with `walls` itself.
fn orderings(walls: &[Wall]) -> Vec<Vec<Wall>> {
    if walls.len() <= 1 {
        return vec![walls.to_vec()];
    }

    (0..walls.len())
        .flat_map(|i| {
            let mut rest = walls.to_vec();
            let first = rest.remove(i);
            orderings(&rest).into_iter().map(move |mut order| {
                order.insert(0, first);
                order
            })
        })
        .collect()
}

/// Method of images light path solver for one room of a grid.
///
/// Walls are given as seen on the canvas, and mapped to the room's local frame
/// according to its [`Flip`]. Marker positions are local, segments come out in
/// canvas space.
#[derive(Clone, Copy, Debug)]
pub struct PathSolver<'a> {
    grid: &'a Grid,
    room: RoomAddress,
}

impl<'a> PathSolver<'a> {
    #[inline]
    pub fn new(grid: &'a Grid, room: RoomAddress) -> Self {
        Self { grid, room }
    }

    #[inline]
    fn render(&self, point: LocalPoint) -> CanvasPoint {
        self.grid.render_point(self.room, point)
    }

    /// The point reached by reflecting `receptor` across every wall, starting
    /// from the last one.
    pub fn virtual_target(&self, receptor: LocalPoint, walls: &[Wall]) -> LocalPoint {
        let flip = Flip::of(self.room);
        walls.iter().rev().fold(receptor, |point, &wall| {
            reflect_point(point, flip.local_wall(wall), self.grid)
        })
    }

    /// Traces the light path from `object` to `receptor`, bouncing off `walls`
    /// in order.
    ///
    /// `obstacles` are the canvas segments of every active wall: the last leg
    /// of the path is invalid if it runs into one of them.
    pub fn solve(
        &self,
        object: LocalPoint,
        receptor: LocalPoint,
        walls: &[Wall],
        obstacles: &[Segment],
    ) -> SolvedPath {
        let virtual_target = self.virtual_target(receptor, walls);

        let mut segments = Vec::with_capacity(walls.len() + 1);
        let mut bounces = Vec::with_capacity(walls.len());
        let failure = self.fold(
            object,
            receptor,
            virtual_target,
            walls,
            obstacles,
            &mut segments,
            &mut bounces,
        );

        let valid = failure.is_none();

        log::debug!(
            "solved {walls:?} in room {}: virtual target {:?}, {} segments, failure: {failure:?}",
            self.room,
            virtual_target.0,
            segments.len(),
        );

        let diagnostics = FoldDiagnostics {
            virtual_target,
            bounces,
            failure,
        };

        if valid && !diagnostics.obeys_reflection_law() {
            log::debug!("reflection law violated: {:?}", diagnostics.bounces);
        }

        SolvedPath {
            path: RayPath {
                segments,
                virtual_target: self.render(virtual_target),
                valid,
            },
            diagnostics,
        }
    }

    #[inline]
    pub fn solve_path(
        &self,
        object: LocalPoint,
        receptor: LocalPoint,
        walls: &[Wall],
        obstacles: &[Segment],
    ) -> RayPath {
        self.solve(object, receptor, walls, obstacles).path
    }

    /// Like [`solve`](Self::solve), but the beam may bounce off `walls` in
    /// any order.
    ///
    /// `walls` is tried as given first, then every other order, and the first
    /// valid path wins. If there is none, the path for the given order is
    /// returned.
    pub fn solve_any_order(
        &self,
        object: LocalPoint,
        receptor: LocalPoint,
        walls: &[Wall],
        obstacles: &[Segment],
    ) -> SolvedPath {
        let first = self.solve(object, receptor, walls, obstacles);
        if first.path.valid || walls.len() < 2 {
            return first;
        }

        orderings(walls)
            .into_iter()
            .skip(1)
            .map(|order| self.solve(object, receptor, &order, obstacles))
            .find(|solved| solved.path.valid)
            .unwrap_or(first)
    }

    #[allow(clippy::too_many_arguments)]
    fn fold(
        &self,
        object: LocalPoint,
        receptor: LocalPoint,
        virtual_target: LocalPoint,
        walls: &[Wall],
        obstacles: &[Segment],
        segments: &mut Vec<PathSegment>,
        bounces: &mut Vec<Bounce>,
    ) -> Option<PathFailure> {
        if walls.is_empty() {
            segments.push(PathSegment {
                start: self.render(object),
                end: self.render(receptor),
            });
            return None;
        }

        let mut ray = Ray::towards(object.0, virtual_target.0);

        if !ray.has_direction() {
            return Some(PathFailure::Degenerate);
        }

        let flip = Flip::of(self.room);
        let (width, height) = (self.grid.room_width(), self.grid.room_height());

        for &wall in walls {
            let local_wall = flip.local_wall(wall);
            let segment = local_wall.local_segment(width, height);

            let Some(coords) = segment.intersection_coordinates(&ray) else {
                return Some(PathFailure::Parallel { wall });
            };

            let t = coords.x;
            if t <= SEGMENT_TOLERANCE {
                return Some(PathFailure::Behind { wall });
            }

            let mut point = ray.at(t);
            if !segment.contains_point(point, SEGMENT_TOLERANCE) {
                return Some(PathFailure::OffSegment { wall });
            }

            // snap onto the wall so roundoff doesn't pile up over bounces
            let offset = local_wall.offset(width, height);
            if local_wall.is_horizontal() {
                point.y = offset;
            } else {
                point.x = offset;
            }

            segments.push(PathSegment {
                start: self.render(LocalPoint(ray.origin)),
                end: self.render(LocalPoint(point)),
            });

            let incident = normalize(point - ray.origin);
            let dir = reflect_direction(ray.dir, local_wall);
            bounces.push(Bounce {
                wall,
                point: LocalPoint(point),
                incident,
                reflected: dir,
            });

            ray = Ray::new(point, dir);
        }

        let last = ray.origin;
        segments.push(PathSegment {
            start: self.render(LocalPoint(last)),
            end: self.render(receptor),
        });

        // measure the angles on the legs actually drawn
        let exits = bounces
            .iter()
            .skip(1)
            .map(|bounce| bounce.point.0)
            .chain([receptor.0])
            .collect::<Vec<_>>();
        for (bounce, exit) in bounces.iter_mut().zip(exits) {
            bounce.reflected = normalize(exit - bounce.point.0);
        }

        self.is_obstructed(LocalPoint(last), receptor, obstacles)
            .then_some(PathFailure::Obstructed)
    }

    fn is_obstructed(&self, from: LocalPoint, to: LocalPoint, obstacles: &[Segment]) -> bool {
        let (from, to) = (self.render(from).0, self.render(to).0);
        let distance = (to - from).norm();
        let ray = Ray::towards(from, to);

        if !ray.has_direction() {
            return false;
        }

        obstacles.iter().any(|obstacle| {
            obstacle
                .intersect(&ray)
                .is_some_and(|hit| hit.t > MIN_LEG && hit.t < distance - SEGMENT_TOLERANCE)
        })
    }

    /// Solves the common case of a single East or West mirror.
    ///
    /// Unlike [`solve`](Self::solve), the path is rejected if the beam heads
    /// away from the wall.
    pub fn solve_single_bounce(
        &self,
        object: LocalPoint,
        receptor: LocalPoint,
        wall: Wall,
        obstacles: &[Segment],
    ) -> SolvedPath {
        let local_wall = Flip::of(self.room).local_wall(wall);
        let virtual_target = reflect_point(receptor, local_wall, self.grid);

        let failure = if wall.is_horizontal() {
            Some(PathFailure::NotVertical { wall })
        } else {
            let dir = Ray::towards(object.0, virtual_target.0).dir;
            let towards_wall = match local_wall {
                Wall::East => dir.x > 0.0,
                _ => dir.x < 0.0,
            };
            (!towards_wall).then_some(PathFailure::Behind { wall })
        };

        match failure {
            None => self.solve(object, receptor, &[wall], obstacles),
            Some(failure) => {
                log::debug!("single bounce off {wall} in room {} failed: {failure:?}", self.room);
                SolvedPath {
                    path: RayPath {
                        segments: Vec::new(),
                        virtual_target: self.render(virtual_target),
                        valid: false,
                    },
                    diagnostics: FoldDiagnostics {
                        virtual_target,
                        bounces: Vec::new(),
                        failure: Some(failure),
                    },
                }
            }
        }
    }
}
