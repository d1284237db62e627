//! Endless Runner headless entry point
//!
//! Drives the simulation with the autopilot at a fixed display rate and
//! prints a JSON summary of every finished run.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;
    use env_logger::{Builder, Env};
    use log::LevelFilter;
    use serde::Serialize;

    use endless_runner::consts::FRAME_DT;
    use endless_runner::sim::{Autopilot, RunPhase, RunStats, Templates};
    use endless_runner::{FrameDriver, Result, Settings};

    #[derive(Debug, Parser)]
    #[command(
        name = "endless-runner",
        about = "Run the endless-runner simulation headless"
    )]
    struct Args {
        /// JSON settings file
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Obstacle seed (overrides the settings file)
        #[arg(long)]
        seed: Option<u64>,

        /// Stop after this many frames
        #[arg(long, default_value_t = 60 * 60 * 5)]
        frames: u64,

        /// Number of runs to play before exiting
        #[arg(long, default_value_t = 1)]
        runs: u32,

        /// Debug logging
        #[arg(short, long)]
        verbose: bool,
    }

    #[derive(Debug, Serialize)]
    struct RunSummary {
        run: u32,
        seed: u64,
        finished: bool,
        stats: RunStats,
    }

    fn init_logging(verbose: bool) {
        let level = if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        let env = Env::default().default_filter_or(level.to_string());
        let _ = Builder::from_env(env).try_init();
    }

    pub fn run() -> Result<()> {
        let args = Args::parse();
        init_logging(args.verbose);
        log::info!("Endless Runner (headless) starting...");

        let mut settings = match &args.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if args.seed.is_some() {
            settings.seed = args.seed;
        }

        let templates = Templates::from_settings(&settings);
        let mut driver = FrameDriver::new(settings)?;
        driver.assets_loaded(templates)?;

        let pilot = Autopilot::default();
        let mut summaries = Vec::new();

        while driver.frames() < args.frames {
            let Some(sim) = driver.simulation() else {
                break;
            };
            let intent = pilot.intent(sim.player(), sim.obstacles(), sim.lateral_bounds());
            driver.set_intent(intent);
            driver.frame(FRAME_DT)?;

            let Some(sim) = driver.simulation() else {
                break;
            };
            if sim.phase() == RunPhase::Ended {
                summaries.push(RunSummary {
                    run: sim.runs(),
                    seed: sim.seed(),
                    finished: true,
                    stats: *sim.stats(),
                });
                if sim.runs() >= args.runs {
                    break;
                }
                driver.request_restart();
                // The restart is consumed by the next frame
                driver.frame(FRAME_DT)?;
            }
        }

        // Frame budget ran out mid-run
        if let Some(sim) = driver
            .simulation()
            .filter(|sim| sim.phase() == RunPhase::Running)
        {
            summaries.push(RunSummary {
                run: sim.runs(),
                seed: sim.seed(),
                finished: false,
                stats: *sim.stats(),
            });
        }

        println!("{}", serde_json::to_string_pretty(&summaries)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = headless::run() {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser builds drive the library from their own frame loop
}
