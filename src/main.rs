//! Headless driver: streams terrain along a straight flight path, optionally
//! digging as it goes, and writes the edits to a save file.

use std::error::Error;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use strata_blocks::{BlockCatalog, TextureAtlas};
use strata_geom::Vec3;
use strata_io::SaveRecord;
use strata_runtime::{Engine, EngineConfig, HeadlessBackend};

#[derive(Parser, Debug)]
#[command(name = "strata", about = "Headless flythrough of a strata world")]
struct Args {
    /// Engine config (TOML). Built-in defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Block catalog overrides.
    #[arg(long, default_value = "assets/blocks.toml")]
    blocks: PathBuf,
    #[arg(long, default_value = "assets/atlas.toml")]
    atlas: PathBuf,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    render_distance: Option<u32>,
    #[arg(long)]
    workers: Option<usize>,
    #[arg(long, default_value_t = 240)]
    frames: u32,
    /// Target frame time in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Blocks travelled along +X per frame.
    #[arg(long, default_value_t = 0.25)]
    speed: f32,
    /// Break the selected block every N frames (0 disables).
    #[arg(long, default_value_t = 0)]
    dig_every: u32,
    /// Resume from a save file.
    #[arg(long)]
    load: Option<PathBuf>,
    /// Write modified chunks here on exit.
    #[arg(long)]
    save: Option<PathBuf>,
    /// Upper bound on waiting for outstanding work after the last frame.
    #[arg(long, default_value_t = 30)]
    settle_secs: u64,
}

fn load_config(args: &Args) -> Result<EngineConfig, Box<dyn Error>> {
    let mut cfg = match &args.config {
        Some(path) => EngineConfig::load_from_path(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }
    if let Some(rd) = args.render_distance {
        cfg.render_distance = rd;
    }
    if let Some(w) = args.workers {
        cfg.worker_count = w;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let cfg = load_config(&args)?;

    let catalog = if args.blocks.exists() {
        BlockCatalog::load_from_path(&args.blocks)?
    } else {
        log::warn!("{} not found; using builtin blocks", args.blocks.display());
        BlockCatalog::builtin()
    };
    let atlas = TextureAtlas::load_or_fallback(&args.atlas);
    let base_height = cfg.worldgen.base_height;
    let mut engine = Engine::new(cfg, catalog, atlas, HeadlessBackend::new())?;

    let mut eye = Vec3::new(8.5, base_height + 24.0, 8.5);
    if let Some(path) = &args.load {
        eye = engine.restore(SaveRecord::load_from_path(path)?);
    }
    let look = Vec3::new(0.2, -1.0, 0.1).normalized();
    let step = Vec3::new(args.speed, 0.0, 0.0);
    let frame_time = Duration::from_millis(args.frame_ms);

    let started = Instant::now();
    for frame in 0..args.frames {
        let t0 = Instant::now();
        engine.update(eye, look);
        if args.dig_every > 0 && frame > 0 && frame % args.dig_every == 0 {
            match engine.break_selected() {
                Ok(out) => log::info!(
                    target: "edit",
                    "frame {}: removed {:?} at {:?}",
                    frame,
                    out.previous,
                    out.pos
                ),
                Err(e) => log::debug!(target: "edit", "frame {}: {}", frame, e),
            }
        }
        engine.draw();
        engine.backend_mut().take_draws();
        if frame % 60 == 0 {
            log::info!(target: "stream", "frame {}: {}", frame, engine.stats());
        }
        eye += step;
        if let Some(rest) = frame_time.checked_sub(t0.elapsed()) {
            thread::sleep(rest);
        }
    }

    let deadline = Instant::now() + Duration::from_secs(args.settle_secs);
    while !engine.stats().is_settled() && Instant::now() < deadline {
        engine.update(eye, look);
        thread::sleep(Duration::from_millis(2));
    }
    let stats = engine.stats();
    log::info!(
        target: "stream",
        "done after {:?}: {} resident={} ({} bytes)",
        started.elapsed(),
        stats,
        engine.backend().resident_count(),
        engine.backend().resident_bytes()
    );

    if let Some(path) = &args.save {
        engine.save_record().save_to_path(path)?;
    }
    Ok(())
}
