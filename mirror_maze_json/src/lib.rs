use mirror_maze::*;
use std::{error::Error, ops::Deref};

pub use serde_json;

use serde_json::{json, Value};

/// This is essentially `try_into` then `try_map` but the latter is nightly-only
pub fn json_array_to_float_array<const D: usize>(json_array: &[Value]) -> Option<[Float; D]> {
    let array: &[Value; D] = json_array.try_into().ok()?;

    let mut coords = [0.; D];
    for (coord, value) in coords.iter_mut().zip(array) {
        *coord = value.as_f64()? as Float;
    }
    Some(coords)
}

pub fn json_array_to_vector(json_array: &[Value]) -> Option<Vector> {
    json_array_to_float_array::<2>(json_array).map(Vector::from)
}

pub fn map_json_array<C: FromIterator<T>, T>(
    json: &Value,
    map: impl FnMut(&Value) -> Result<T, Box<dyn Error>>,
) -> Result<C, Box<dyn Error>> {
    json.as_array()
        .ok_or("json value must be an array")?
        .iter()
        .map(map)
        .collect()
}

/// Deserializes `json[key]`, or returns `default` if there is no such field.
fn field_or<T: JsonDes>(json: &Value, key: &str, default: T) -> Result<T, Box<dyn Error>> {
    json.get(key)
        .map(|value| {
            T::from_json(value).map_err(|e| -> Box<dyn Error> { format!("invalid {key}: {e}").into() })
        })
        .unwrap_or(Ok(default))
}

fn field<'a>(json: &'a Value, key: &str) -> Result<&'a Value, Box<dyn Error>> {
    json.get(key)
        .ok_or_else(|| format!("{key} field expected").into())
}

pub trait JsonSer {
    /// Serialize `self` into a JSON value.
    fn to_json(&self) -> Value;
}

impl<T: JsonSer> JsonSer for [T] {
    fn to_json(&self) -> Value {
        Value::Array(Vec::from_iter(self.iter().map(T::to_json)))
    }
}

impl<T: JsonSer> JsonSer for Vec<T> {
    fn to_json(&self) -> Value {
        self.deref().to_json()
    }
}

impl<T: JsonSer> JsonSer for Option<T> {
    fn to_json(&self) -> Value {
        self.as_ref().map_or(Value::Null, T::to_json)
    }
}

pub trait JsonDes {
    /// Deserialize from a JSON value.
    ///
    /// Returns an error if `json`'s format or values are invalid.
    fn from_json(json: &Value) -> Result<Self, Box<dyn Error>>
    where
        Self: Sized;
}

impl<T: JsonDes> JsonDes for Vec<T> {
    fn from_json(json: &Value) -> Result<Self, Box<dyn Error>> {
        map_json_array(json, T::from_json)
    }
}

impl JsonSer for RoomAddress {
    /// `[row, col]`
    fn to_json(&self) -> Value {
        json!([self.row, self.col])
    }
}

impl JsonDes for RoomAddress {
    /// Deserialize a room address from a JSON array of two non-negative
    /// integers: `[row, col]`
    fn from_json(json: &Value) -> Result<Self, Box<dyn Error>> {
        let coords: Vec<u32> = map_json_array(json, |value| {
            let n = value
                .as_u64()
                .ok_or("room coordinates must be non-negative integers")?;
            Ok(u32::try_from(n)?)
        })?;

        let &[row, col] = coords.as_slice() else {
            return Err("a room address must be an array of two integers: [row, col]".into());
        };

        Ok(Self::new(row, col))
    }
}

fn vector_from_json(json: &Value) -> Result<Vector, Box<dyn Error>> {
    json.as_array()
        .and_then(|array| json_array_to_vector(array))
        .ok_or_else(|| "a point must be an array of two numbers: [x, y]".into())
}

impl JsonSer for LocalPoint {
    fn to_json(&self) -> Value {
        json!(self.0.as_slice())
    }
}

impl JsonDes for LocalPoint {
    /// `[x, y]`, relative to the top-left corner of the room
    fn from_json(json: &Value) -> Result<Self, Box<dyn Error>> {
        vector_from_json(json).map(Self)
    }
}

impl JsonSer for CanvasPoint {
    fn to_json(&self) -> Value {
        json!(self.0.as_slice())
    }
}

impl JsonDes for CanvasPoint {
    fn from_json(json: &Value) -> Result<Self, Box<dyn Error>> {
        vector_from_json(json).map(Self)
    }
}

impl JsonSer for Wall {
    /// One of `"N"`, `"S"`, `"E"`, `"W"`
    fn to_json(&self) -> Value {
        json!(self.symbol().to_string())
    }
}

impl JsonDes for Wall {
    fn from_json(json: &Value) -> Result<Self, Box<dyn Error>> {
        let symbol = json.as_str().ok_or("a wall must be a string")?;
        Self::from_symbol(symbol)
            .ok_or_else(|| format!("unknown wall {symbol:?}, expected one of N, S, E, W").into())
    }
}

impl JsonSer for WallState {
    fn to_json(&self) -> Value {
        json!(match self {
            Self::Disabled => "disabled",
            Self::Off => "off",
            Self::On => "on",
        })
    }
}

impl JsonSer for MirrorWall {
    fn to_json(&self) -> Value {
        json!({
            "room": self.room.to_json(),
            "wall": self.wall.to_json(),
            "state": self.state.to_json(),
        })
    }
}

impl JsonSer for GridConfig {
    fn to_json(&self) -> Value {
        json!({
            "rows": self.rows,
            "cols": self.cols,
            "room_width": self.room_width,
            "room_height": self.room_height,
            "canvas_width": self.canvas_width,
            "canvas_height": self.canvas_height,
        })
    }
}

impl JsonDes for GridConfig {
    /// Deserialize a grid layout from a JSON object.
    ///
    /// Every field is optional, missing ones take their default value:
    ///
    /// ```json
    /// {
    ///     "rows": 2,
    ///     "cols": 5,
    ///     "room_width": 240.0,
    ///     "room_height": 240.0,
    ///     "canvas_width": 1280.0,
    ///     "canvas_height": 600.0,
    /// }
    /// ```
    fn from_json(json: &Value) -> Result<Self, Box<dyn Error>> {
        if !json.is_object() {
            return Err("grid must be an object".into());
        }

        let default = Self::default();

        let count = |key: &str, default: u32| -> Result<u32, Box<dyn Error>> {
            json.get(key).map_or(Ok(default), |value| -> Result<u32, Box<dyn Error>> {
                let n = value
                    .as_u64()
                    .ok_or_else(|| format!("{key} must be a non-negative integer"))?;
                Ok(u32::try_from(n)?)
            })
        };

        let length = |key: &str, default: Float| -> Result<Float, Box<dyn Error>> {
            json.get(key).map_or(Ok(default), |value| -> Result<Float, Box<dyn Error>> {
                value
                    .as_f64()
                    .ok_or_else(|| format!("{key} must be a number").into())
            })
        };

        Ok(Self {
            rows: count("rows", default.rows)?,
            cols: count("cols", default.cols)?,
            room_width: length("room_width", default.room_width)?,
            room_height: length("room_height", default.room_height)?,
            canvas_width: length("canvas_width", default.canvas_width)?,
            canvas_height: length("canvas_height", default.canvas_height)?,
        })
    }
}

impl JsonSer for PathSegment {
    fn to_json(&self) -> Value {
        json!({
            "start": self.start.to_json(),
            "end": self.end.to_json(),
        })
    }
}

impl JsonSer for RayPath {
    fn to_json(&self) -> Value {
        json!({
            "segments": self.segments.to_json(),
            "virtual_target": self.virtual_target.to_json(),
            "valid": self.valid,
        })
    }
}

impl JsonSer for PathFailure {
    fn to_json(&self) -> Value {
        let (kind, wall) = match *self {
            Self::Parallel { wall } => ("parallel", Some(wall)),
            Self::Behind { wall } => ("behind", Some(wall)),
            Self::OffSegment { wall } => ("off_segment", Some(wall)),
            Self::NotVertical { wall } => ("not_vertical", Some(wall)),
            Self::Obstructed => ("obstructed", None),
            Self::Degenerate => ("degenerate", None),
        };
        json!({
            "kind": kind,
            "wall": wall.to_json(),
        })
    }
}

impl JsonSer for Bounce {
    fn to_json(&self) -> Value {
        json!({
            "wall": self.wall.to_json(),
            "point": self.point.to_json(),
        })
    }
}

impl JsonSer for WallCrossing {
    fn to_json(&self) -> Value {
        json!({
            "room": self.room.to_json(),
            "wall": self.wall.to_json(),
            "point": self.point.to_json(),
        })
    }
}

impl JsonSer for MirrorStep {
    fn to_json(&self) -> Value {
        json!({
            "room": self.room.to_json(),
            "wall": self.wall.to_json(),
        })
    }
}

/// A session's starting point, and the walls toggled from there.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Scene {
    pub config: SessionConfig,
    /// Applied in order, after the home and target rooms are set up.
    pub toggles: Vec<(RoomAddress, Wall)>,
}

impl Scene {
    /// Sets up a session as described by this scene.
    ///
    /// Fails if the grid is invalid, or if a room is outside of it.
    pub fn build_session(&self) -> Result<Session, Box<dyn Error>> {
        let mut session = Session::new(self.config)?;

        for &(room, wall) in &self.toggles {
            session.grid().check(room)?;
            session.toggle_wall(room, wall);
        }

        Ok(session)
    }
}

impl JsonSer for Scene {
    fn to_json(&self) -> Value {
        let toggles = Vec::from_iter(self.toggles.iter().map(|(room, wall)| {
            json!({
                "room": room.to_json(),
                "wall": wall.to_json(),
            })
        }));

        json!({
            "grid": self.config.grid.to_json(),
            "home": self.config.home.to_json(),
            "target": self.config.target.to_json(),
            "object": self.config.object.to_json(),
            "receptor": self.config.receptor.to_json(),
            "toggles": toggles,
        })
    }
}

impl JsonDes for Scene {
    /// Deserialize a scene from a JSON object.
    ///
    /// Every field is optional, missing ones take their default value:
    ///
    /// ```json
    /// {
    ///     "grid": { "rows": 2, "cols": 5 }, // see `GridConfig::from_json`
    ///     "home": [0, 1],
    ///     "target": [0, 2],
    ///     "object": [120.0, 120.0],
    ///     "receptor": [180.0, 180.0],
    ///     "toggles": [
    ///         { "room": [0, 1], "wall": "S" },
    ///     ],
    /// }
    /// ```
    fn from_json(json: &Value) -> Result<Self, Box<dyn Error>> {
        if !json.is_object() {
            return Err("scene must be an object".into());
        }

        let default = SessionConfig::default();

        let config = SessionConfig {
            grid: field_or(json, "grid", default.grid)?,
            home: field_or(json, "home", default.home)?,
            target: field_or(json, "target", default.target)?,
            object: field_or(json, "object", default.object)?,
            receptor: field_or(json, "receptor", default.receptor)?,
        };

        let toggles = match json.get("toggles") {
            None => Vec::new(),
            Some(toggles) => map_json_array(toggles, |toggle| {
                Ok((
                    RoomAddress::from_json(field(toggle, "room")?)?,
                    Wall::from_json(field(toggle, "wall")?)?,
                ))
            })?,
        };

        Ok(Self { config, toggles })
    }
}

pub fn deserialize_scene(json: &Value) -> Result<Scene, Box<dyn Error>> {
    Scene::from_json(json)
}

/// Everything known about the current state of `session`: the solved light
/// path, why it failed if it did, and the cross-room helpers.
pub fn serialize_report(session: &Session) -> Value {
    let solved = session.solve();

    let walls = Vec::from_iter(
        session
            .walls()
            .iter()
            .filter(|mirror| mirror.state == WallState::On),
    );

    json!({
        "home": session.home().to_json(),
        "target": session.target().to_json(),
        "object": session.marker_position(MarkerKind::Object).to_json(),
        "receptor": session.marker_position(MarkerKind::Receptor).to_json(),
        "walls": walls.to_json(),
        "path": solved.path.to_json(),
        "failure": solved.diagnostics.failure.to_json(),
        "bounces": solved.diagnostics.bounces.to_json(),
        "minimum_bounces": session.minimum_bounces(),
        "mirror_sequence": session.mirror_sequence().to_json(),
        "line_of_sight": session.line_of_sight().to_json(),
        "sight_line": session.sight_line().to_json(),
        "virtual_object": session.virtual_object().to_json(),
    })
}
