use core::fmt;

use crate::{
    bounce_order, fold_line_of_sight, minimum_bounces, mirror_sequence, required_mirror,
    trace_line_of_sight, CanvasPoint, Grid, LocalPoint, Marker, MarkerKind, MazeError, MirrorStep,
    MirrorWall, MirrorWalls, PathSegment, PathSolver, RayPath, RoomAddress, SessionConfig,
    SolvedPath, Wall, WallCrossing, WallState, MARKER_HIT_RADIUS,
};

/// Something listeners should know about, sent after the change is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MazeEvent {
    HomeRoomChanged { from: RoomAddress, to: RoomAddress },
    TargetRoomChanged { from: RoomAddress, to: RoomAddress },
    WallToggled(MirrorWall),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&MazeEvent)>;

/// Callbacks notified, in registration order, of every [`MazeEvent`].
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub fn add(&mut self, listener: impl FnMut(&MazeEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if no listener was registered under `id`.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let len = self.listeners.len();
        self.listeners.retain(|(other, _)| *other != id);
        self.listeners.len() != len
    }

    pub fn notify(&mut self, event: &MazeEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.listeners.iter().map(|(id, _)| id))
            .finish()
    }
}

/// The state of a mirror maze: walls, markers, home and target rooms.
///
/// Both markers always share the home room, and only the home room ever has
/// walls `On`, unless toggled elsewhere explicitly. Listeners are notified
/// once a change is fully applied, so any solve after the notification sees
/// it.
///
/// Methods taking a [`RoomAddress`] panic if it is outside the grid. Use
/// [`Grid::check`] on untrusted input.
#[derive(Debug)]
pub struct Session {
    grid: Grid,
    walls: MirrorWalls,
    object: Marker,
    receptor: Marker,
    target: RoomAddress,
    listeners: Listeners,
}

impl Default for Session {
    fn default() -> Self {
        Self::from_valid(Grid::default(), SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self, MazeError> {
        let grid = Grid::new(config.grid)?;
        grid.check(config.home)?;
        grid.check(config.target)?;
        Ok(Self::from_valid(grid, config))
    }

    fn from_valid(grid: Grid, config: SessionConfig) -> Self {
        let mut object = Marker::new(MarkerKind::Object, config.home, config.object);
        let mut receptor = Marker::new(MarkerKind::Receptor, config.home, config.receptor);
        object.move_to(&grid, config.object);
        receptor.move_to(&grid, config.receptor);

        let mut walls = MirrorWalls::new(grid);
        walls.auto_select(config.home, config.target);

        Self {
            grid,
            walls,
            object,
            receptor,
            target: config.target,
            listeners: Listeners::default(),
        }
    }

    #[inline]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub const fn walls(&self) -> &MirrorWalls {
        &self.walls
    }

    #[inline]
    pub const fn home(&self) -> RoomAddress {
        self.object.home_room
    }

    #[inline]
    pub const fn target(&self) -> RoomAddress {
        self.target
    }

    #[inline]
    pub const fn object(&self) -> &Marker {
        &self.object
    }

    #[inline]
    pub const fn receptor(&self) -> &Marker {
        &self.receptor
    }

    #[inline]
    pub const fn marker(&self, kind: MarkerKind) -> &Marker {
        match kind {
            MarkerKind::Object => &self.object,
            MarkerKind::Receptor => &self.receptor,
        }
    }

    pub fn add_listener(&mut self, listener: impl FnMut(&MazeEvent) + 'static) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    #[track_caller]
    fn assert_in_grid(&self, room: RoomAddress) {
        assert!(
            self.grid.contains(room),
            "room {room} is outside the {}x{} grid",
            self.grid.rows(),
            self.grid.cols()
        );
    }

    /// Toggles `wall` of `room` and returns its new state. Disabled walls are
    /// left alone, and nobody gets notified.
    #[track_caller]
    pub fn toggle_wall(&mut self, room: RoomAddress, wall: Wall) -> WallState {
        self.assert_in_grid(room);

        let state = self.walls.toggle(room, wall);
        if state.is_togglable() {
            self.listeners
                .notify(&MazeEvent::WallToggled(MirrorWall { room, wall, state }));
        }
        state
    }

    /// Moves both markers to `room`. Wall states follow them there, then the
    /// walls needed to reach the target room are switched on.
    #[track_caller]
    pub fn set_home_room(&mut self, room: RoomAddress) {
        self.assert_in_grid(room);

        let from = self.home();
        if room == from {
            return;
        }

        self.walls.transfer_home(from, room);
        self.object.home_room = room;
        self.receptor.home_room = room;
        self.walls.auto_select(room, self.target);

        log::info!("home room moved from {from} to {room}");
        self.listeners
            .notify(&MazeEvent::HomeRoomChanged { from, to: room });
    }

    #[track_caller]
    pub fn set_target_room(&mut self, room: RoomAddress) {
        self.assert_in_grid(room);

        let from = self.target;
        if room == from {
            return;
        }

        self.target = room;
        self.walls.auto_select(self.home(), room);

        log::info!("target room moved from {from} to {room}");
        self.listeners
            .notify(&MazeEvent::TargetRoomChanged { from, to: room });
    }

    /// Moves a marker within the home room. The position is clamped away from
    /// the walls.
    pub fn move_marker(&mut self, kind: MarkerKind, position: LocalPoint) {
        let marker = match kind {
            MarkerKind::Object => &mut self.object,
            MarkerKind::Receptor => &mut self.receptor,
        };
        marker.move_to(&self.grid, position);
    }

    /// Where `kind` is drawn on the canvas.
    pub fn marker_position(&self, kind: MarkerKind) -> CanvasPoint {
        let marker = self.marker(kind);
        self.grid.render_point(marker.home_room, marker.position)
    }

    /// The marker closest to `point`, if `point` is inside the home room and
    /// close enough to grab it.
    pub fn marker_at(&self, point: CanvasPoint) -> Option<MarkerKind> {
        let (room, _) = self.grid.canvas_to_room(point)?;
        if room != self.home() {
            return None;
        }

        [MarkerKind::Object, MarkerKind::Receptor]
            .into_iter()
            .map(|kind| (kind, (self.marker_position(kind).0 - point.0).norm()))
            .filter(|&(_, distance)| distance < MARKER_HIT_RADIUS)
            .min_by(|(_, d1), (_, d2)| d1.total_cmp(d2))
            .map(|(kind, _)| kind)
    }

    /// The togglable home room wall under `point`, if any.
    #[inline]
    pub fn wall_at(&self, point: CanvasPoint) -> Option<Wall> {
        self.walls.wall_at(self.home(), point)
    }

    /// Toggles the home room wall under `point`, if any.
    pub fn toggle_wall_at(&mut self, point: CanvasPoint) -> Option<(Wall, WallState)> {
        let wall = self.wall_at(point)?;
        Some((wall, self.toggle_wall(self.home(), wall)))
    }

    /// Home room walls that are `On`, East/West first. This is the first
    /// bounce order [`solve`](Self::solve) tries.
    pub fn active_walls(&self) -> Vec<Wall> {
        let mut walls = self.walls.active_walls(self.home()).collect::<Vec<_>>();
        bounce_order(&mut walls);
        walls
    }

    /// Traces the light path from the object to the receptor, with the
    /// current wall states, bouncing off the active walls in whichever order
    /// the beam reaches them.
    pub fn solve(&self) -> SolvedPath {
        PathSolver::new(&self.grid, self.home()).solve_any_order(
            self.object.position,
            self.receptor.position,
            &self.active_walls(),
            &self.walls.active_segments(),
        )
    }

    #[inline]
    pub fn solve_path(&self) -> RayPath {
        self.solve().path
    }

    /// Solves with the single bounce solver, if exactly one East or West
    /// wall of the home room is `On`.
    pub fn solve_single_bounce(&self) -> Option<SolvedPath> {
        let walls = self.active_walls();
        let &[wall] = &walls[..] else {
            return None;
        };

        (!wall.is_horizontal()).then(|| {
            PathSolver::new(&self.grid, self.home()).solve_single_bounce(
                self.object.position,
                self.receptor.position,
                wall,
                &self.walls.active_segments(),
            )
        })
    }

    #[inline]
    pub fn minimum_bounces(&self) -> u32 {
        minimum_bounces(self.home(), self.target)
    }

    #[inline]
    pub fn mirror_sequence(&self) -> Vec<MirrorStep> {
        mirror_sequence(self.home(), self.target)
    }

    #[inline]
    pub fn required_mirror(&self) -> Option<Wall> {
        required_mirror(self.home(), self.target)
    }

    /// Both ends of the sight line, in the rooms' drawn frames: the receptor
    /// in the home room, and the object's image in the target room.
    fn sight_ends(&self) -> (LocalPoint, LocalPoint) {
        (
            self.grid
                .mirrored_room_point(self.home(), self.receptor.position),
            self.grid
                .mirrored_room_point(self.target, self.object.position),
        )
    }

    /// Walls crossed by the straight line from the receptor to the image of the
    /// object in the target room.
    pub fn line_of_sight(&self) -> Vec<WallCrossing> {
        let (receptor, object) = self.sight_ends();
        trace_line_of_sight(&self.grid, self.home(), receptor, self.target, object)
    }

    /// [`line_of_sight`](Self::line_of_sight), as canvas segments.
    pub fn sight_line(&self) -> Vec<PathSegment> {
        let (receptor, object) = self.sight_ends();
        let crossings = trace_line_of_sight(&self.grid, self.home(), receptor, self.target, object);
        fold_line_of_sight(
            &self.grid,
            self.target,
            object,
            self.home(),
            receptor,
            &crossings,
        )
    }

    /// Where the object appears in the target room, if the current light path
    /// is valid.
    pub fn virtual_object(&self) -> Option<CanvasPoint> {
        self.solve()
            .path
            .valid
            .then(|| self.grid.render_point(self.target, self.object.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GridConfig, PathFailure};
    use std::{cell::RefCell, rc::Rc};

    const fn room(row: u32, col: u32) -> RoomAddress {
        RoomAddress::new(row, col)
    }

    #[test]
    fn defaults() {
        let session = Session::default();
        assert_eq!(session.home(), room(0, 1));
        assert_eq!(session.target(), room(0, 2));
        assert_eq!(session.object().home_room, session.receptor().home_room);
        assert_eq!(session.object().position, LocalPoint::new(120.0, 120.0));
        assert_eq!(session.receptor().position, LocalPoint::new(180.0, 180.0));
        assert_eq!(session.active_walls(), [Wall::East]);
    }

    #[test]
    fn rejects_rooms_outside_the_grid() {
        let config = SessionConfig {
            target: room(2, 0),
            ..Default::default()
        };
        assert!(matches!(
            Session::new(config),
            Err(MazeError::RoomOutOfBounds { .. })
        ));

        let config = SessionConfig {
            grid: GridConfig {
                cols: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            Session::new(config),
            Err(MazeError::EmptyGrid { .. })
        ));
    }

    #[test]
    #[should_panic]
    fn toggling_outside_the_grid_panics() {
        Session::default().toggle_wall(room(0, 5), Wall::East);
    }

    #[test]
    fn home_room_change_moves_markers_and_walls() {
        let mut session = Session::default();
        session.set_target_room(room(0, 3));
        assert_eq!(session.active_walls(), [Wall::East]);

        // B sees the target up and to the right
        session.set_home_room(room(1, 0));
        assert_eq!(session.object().home_room, room(1, 0));
        assert_eq!(session.receptor().home_room, room(1, 0));
        assert_eq!(session.active_walls(), [Wall::East, Wall::North]);

        session.set_home_room(room(0, 1));
        assert_eq!(session.walls().state(room(0, 1), Wall::East), WallState::On);
        assert!(Wall::ALL
            .into_iter()
            .all(|wall| session.walls().state(room(1, 0), wall) != WallState::On));
    }

    #[test]
    fn only_the_home_room_has_walls_on() {
        let mut session = Session::default();
        session.set_target_room(room(1, 4));
        session.toggle_wall(room(0, 1), Wall::West);
        session.set_home_room(room(1, 2));

        for mirror in session.walls().iter() {
            if mirror.state == WallState::On {
                assert_eq!(mirror.room, room(1, 2), "{mirror:?}");
            }
        }
    }

    #[test]
    fn listeners_see_every_change() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut session = Session::default();

        let log = Rc::clone(&events);
        let id = session.add_listener(move |event| log.borrow_mut().push(*event));

        session.set_home_room(room(0, 1));
        session.set_target_room(room(0, 2));
        assert!(events.borrow().is_empty(), "unchanged rooms notify nobody");

        session.toggle_wall(room(0, 1), Wall::North);
        assert!(events.borrow().is_empty(), "disabled walls notify nobody");

        session.toggle_wall(room(0, 1), Wall::South);
        session.set_target_room(room(1, 1));
        session.set_home_room(room(0, 0));

        assert_eq!(
            *events.borrow(),
            [
                MazeEvent::WallToggled(MirrorWall {
                    room: room(0, 1),
                    wall: Wall::South,
                    state: WallState::On,
                }),
                MazeEvent::TargetRoomChanged {
                    from: room(0, 2),
                    to: room(1, 1),
                },
                MazeEvent::HomeRoomChanged {
                    from: room(0, 1),
                    to: room(0, 0),
                },
            ]
        );

        assert!(session.remove_listener(id));
        assert!(!session.remove_listener(id));
        session.set_target_room(room(0, 4));
        assert_eq!(events.borrow().len(), 3);
    }

    #[test]
    fn default_session_solves_a_single_bounce() {
        let session = Session::default();
        let solved = session.solve();

        assert!(solved.path.valid);
        assert_eq!(solved.path.segments.len(), 2);

        // home (0, 1) is flipped horizontally: the east wall is drawn at
        // x = 40 + 2 * 240
        let bounce = solved.path.segments[0].end;
        assert!((bounce.x() - 520.0).abs() < 1e-9);

        assert_eq!(session.solve_single_bounce(), Some(solved));
        assert_eq!(session.minimum_bounces(), 1);
        assert_eq!(session.required_mirror(), Some(Wall::East));
    }

    #[test]
    fn virtual_object_follows_the_target_room() {
        let mut session = Session::default();
        assert_eq!(
            session.virtual_object(),
            Some(
                session
                    .grid()
                    .render_point(room(0, 2), LocalPoint::new(120.0, 120.0))
            )
        );

        session.set_target_room(room(1, 2));
        assert_eq!(
            session.virtual_object(),
            Some(
                session
                    .grid()
                    .render_point(room(1, 2), LocalPoint::new(120.0, 120.0))
            )
        );
    }

    #[test]
    fn beam_reaching_the_floor_first_bounces_there_first() {
        let mut session = Session::default();
        session.set_target_room(room(1, 2));
        session.move_marker(MarkerKind::Object, LocalPoint::new(200.0, 200.0));
        session.move_marker(MarkerKind::Receptor, LocalPoint::new(20.0, 220.0));
        assert_eq!(session.active_walls(), [Wall::East, Wall::South]);

        // in that order, the beam meets the east wall's line below the room
        let strict = PathSolver::new(session.grid(), session.home()).solve(
            session.object().position,
            session.receptor().position,
            &session.active_walls(),
            &session.walls().active_segments(),
        );
        assert_eq!(
            strict.diagnostics.failure,
            Some(PathFailure::OffSegment { wall: Wall::East })
        );

        let solved = session.solve();
        assert!(solved.path.valid, "{solved:?}");
        assert_eq!(solved.path.segments.len(), 3);
        assert!(solved.diagnostics.obeys_reflection_law());
        assert_eq!(
            solved
                .diagnostics
                .bounces
                .iter()
                .map(|bounce| bounce.wall)
                .collect::<Vec<_>>(),
            [Wall::South, Wall::East]
        );
        assert!(session.virtual_object().is_some());
    }

    #[test]
    fn no_walls_no_single_bounce() {
        let mut session = Session::default();
        session.set_target_room(room(0, 1));
        assert!(session.active_walls().is_empty());
        assert_eq!(session.solve_single_bounce(), None);
        assert!(session.solve().path.valid);
    }

    #[test]
    fn hit_tests() {
        let mut session = Session::default();
        let object = session.marker_position(MarkerKind::Object);
        let receptor = session.marker_position(MarkerKind::Receptor);

        assert_eq!(session.marker_at(object), Some(MarkerKind::Object));
        assert_eq!(
            session.marker_at(CanvasPoint::new(receptor.x() + 5.0, receptor.y())),
            Some(MarkerKind::Receptor)
        );
        assert_eq!(session.marker_at(CanvasPoint::new(1000.0, 100.0)), None);

        // the home room spans x in [280, 520)
        assert_eq!(session.wall_at(CanvasPoint::new(285.0, 200.0)), Some(Wall::West));
        assert_eq!(
            session.toggle_wall_at(CanvasPoint::new(285.0, 200.0)),
            Some((Wall::West, WallState::On))
        );
        assert_eq!(session.toggle_wall_at(CanvasPoint::new(400.0, 200.0)), None);
    }

    #[test]
    fn line_of_sight_reaches_the_target_room() {
        let mut session = Session::default();
        session.set_target_room(room(0, 4));

        let crossings = session.line_of_sight();
        assert_eq!(crossings.len(), 3);
        assert!(crossings.iter().all(|crossing| crossing.wall == Wall::East));

        let segments = session.sight_line();
        assert_eq!(segments.len(), 4);
        assert_eq!(
            segments.last().map(|segment| segment.end),
            Some(session.marker_position(MarkerKind::Receptor))
        );
        assert_eq!(
            segments[0].start,
            session
                .grid()
                .render_point(room(0, 4), session.object().position)
        );
    }
}
