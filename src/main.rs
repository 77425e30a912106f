//! Engine bootstrap.
//!
//! Loads the render-pipeline and material registries plus the game
//! configuration stores from the configured data paths. Window-system
//! integration and the frame loop live in the host application; this entry
//! point validates that a data set initializes cleanly.

use auriga::assets::{AssetCache, AssetLoader};
use auriga::game::{GameObjectTypeStore, TacticalCameraStore};
use auriga::renderer::Renderer;

use clap::Parser;

use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "auriga", version, about = "RTS renderer engine core")]
struct Args {
    /// Comma-separated list of paths to preferred sources of game data.
    #[arg(short, long, value_delimiter = ',')]
    modpaths: Vec<PathBuf>,
}

fn run(args: &Args) -> auriga::Result<()> {
    // Mod paths are searched first, the working directory last.
    let mut data_paths = args.modpaths.clone();
    data_paths.push(std::env::current_dir()?);

    let loader = AssetLoader::new(data_paths);
    let game_object_types = GameObjectTypeStore::load(&loader, "GameObjectFiles");
    let tactical_cameras = TacticalCameraStore::load(&loader, "TacticalCameras");

    let mut cache = AssetCache::new(loader, Renderer::new());
    if cache.get_render_pipeline("Space").is_none() {
        return Err(auriga::Error::NotFound(
            "default render pipeline \"Space\"".into(),
        ));
    }

    log::info!(
        "initialized: {} game object types, {} tactical cameras",
        game_object_types.len(),
        tactical_cameras.len(),
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fatal: {err}");
            ExitCode::FAILURE
        }
    }
}
