use mirror_maze_json::{deserialize_scene, serde_json, serialize_report};

use std::{error::Error, fs::File};

fn run_scene(json: &serde_json::Value) -> Result<serde_json::Value, Box<dyn Error>> {
    let scene = deserialize_scene(json)?;
    let session = scene.build_session()?;

    log::info!(
        "scene: home {}, target {}, {} toggles",
        session.home(),
        session.target(),
        scene.toggles.len()
    );

    let report = serialize_report(&session);

    if report["path"]["valid"] != serde_json::Value::Bool(true) {
        log::warn!("no valid light path: {}", report["failure"]);
    }

    Ok(report)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);

    let file_path = args
        .next()
        .ok_or("expected a scene file path as a first argument.")?;

    let json: serde_json::Value = serde_json::from_reader(File::open(file_path)?)?;

    let report = run_scene(&json)?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
