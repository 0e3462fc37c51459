use mirror_maze::GridConfig;
use mirror_maze_json::{serde_json, JsonSer};
use mirror_maze_random::{rand, random_scene};

use std::{env, error::Error, fs::File};

/// The optional second argument: how many random walls to toggle, 0 if absent.
fn parse_num_toggles(arg: Option<String>) -> Result<usize, Box<dyn Error>> {
    Ok(arg
        .map(|arg| {
            arg.parse()
                .map_err(|e| format!("invalid number of toggles {arg:?}: {e}"))
        })
        .transpose()?
        .unwrap_or(0))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = env::args().skip(1);

    let file_path = args
        .next()
        .ok_or("please provide a path to serialize the scene json data")?;

    let num_toggles = parse_num_toggles(args.next())?;

    let scene = random_scene(GridConfig::default(), num_toggles, &mut rand::thread_rng())?;

    log::info!(
        "generated scene: home {}, target {}, {num_toggles} toggles",
        scene.config.home,
        scene.config.target
    );

    serde_json::to_writer_pretty(File::create(file_path)?, &scene.to_json())?;

    Ok(())
}
