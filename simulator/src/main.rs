mod config;
mod demographics;

use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Scenario;
use epidemic_core::world::World;

#[derive(clap::Parser)]
struct Args {
    /// census-style demographic CSV
    #[arg(long)]
    demographics: PathBuf,
    /// scenario JSON overriding the engine defaults
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// simulated days to run (the run stops early once the epidemic ends)
    #[arg(long, default_value_t = 365)]
    days: u64,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// directory receiving the per-tick CSV log
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,
    /// log file stem
    #[arg(long, default_value = "epidemic")]
    run_id: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };
    let records = demographics::load(&args.demographics)?;
    let (wp, rp) = scenario.into_params();

    let ticks_per_day = u64::from(24 / wp.step_hours().max(1));
    let ticks = args.days * ticks_per_day;
    let mut world = World::new(wp, rp, &records, args.seed)
        .context("cannot build the simulation world")?;
    let start = world.summary();
    info!(
        population = world.population().len(),
        seeded = start.infected_total,
        days = args.days,
        seed = args.seed,
        "simulation start"
    );

    for tick in 1..=ticks {
        world.step();
        if tick % ticks_per_day == 0 {
            let s = world.summary();
            info!(
                day = tick / ticks_per_day,
                susceptible = s.susceptible,
                infected = s.infected_current,
                recovered = s.recovered_total,
                deceased = s.deceased_total,
                hospitalized = s.hospitalized_current,
                icu = s.icu_current,
                "daily totals"
            );
        }
        if world.is_finished() {
            info!(tick, "no active infection remains");
            break;
        }
    }

    let s = world.summary();
    info!(
        infected_total = s.infected_total,
        recovered_total = s.recovered_total,
        deceased_total = s.deceased_total,
        hospitalized_total = s.hospitalized_total,
        icu_total = s.icu_total,
        "simulation finished"
    );

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("cannot create output directory {}", args.out_dir.display()))?;
    world.export_log(&args.run_id, &args.out_dir)?;
    info!(dir = %args.out_dir.display(), name = %args.run_id, "log written");
    Ok(())
}
