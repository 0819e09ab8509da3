use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use floorgen::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Runs built-in floor-plan scenarios and prints a JSON report")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Generate layouts for a built-in scenario
    Run {
        #[arg(long, value_enum, default_value_t = Scenario::Basics)]
        scenario: Scenario,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 5)]
        count: usize,
        /// Annealing temperature steps per chain
        #[arg(long)]
        cycles: Option<usize>,
        /// Proposals per temperature step
        #[arg(long)]
        trials: Option<usize>,
        #[arg(long, default_value_t = 0)]
        restarts: usize,
    },
    /// Print a small provenance JSON block
    Report,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scenario {
    /// Four rooms in a cycle, square and rectangle shapes
    Basics,
    /// Three rooms in a row joined by corridors
    Corridors,
}

impl Scenario {
    fn name(self) -> &'static str {
        match self {
            Scenario::Basics => "basics",
            Scenario::Corridors => "corridors",
        }
    }

    fn map(self) -> floorgen::Result<MapDescription> {
        let mut map = MapDescription::new();
        match self {
            Scenario::Basics => {
                for i in 0..4 {
                    map.add_room(i)?;
                }
                for (a, b) in [(0, 1), (0, 3), (1, 2), (2, 3)] {
                    map.add_passage(a, b)?;
                }
                let mode = DoorMode::overlap(1, 1)?;
                map.add_room_shapes(RoomTemplate::new(Polygon::square(8)?, mode.clone()), true, 1.0)?;
                map.add_room_shapes(RoomTemplate::new(Polygon::rectangle(6, 10)?, mode), true, 1.0)?;
            }
            Scenario::Corridors => {
                for i in 0..3 {
                    map.add_room(i)?;
                }
                map.add_corridor_room(10)?;
                map.add_corridor_room(11)?;
                for (a, b) in [(0, 10), (10, 1), (1, 11), (11, 2)] {
                    map.add_passage(a, b)?;
                }
                map.add_room_shapes(
                    RoomTemplate::new(Polygon::square(6)?, DoorMode::overlap(1, 1)?),
                    true,
                    1.0,
                )?;
                map.add_room_shapes(
                    RoomTemplate::new(Polygon::rectangle(6, 9)?, DoorMode::overlap(1, 1)?),
                    true,
                    0.5,
                )?;
                map.add_corridor_shapes(
                    RoomTemplate::new(Polygon::rectangle(2, 1)?, DoorMode::overlap(1, 0)?),
                    true,
                    1.0,
                )?;
                map.set_corridor_offsets(vec![1])?;
            }
        }
        Ok(map)
    }
}

#[derive(Serialize)]
struct RoomSummary {
    node: usize,
    corridor: bool,
    position: [i32; 2],
    outline: Vec<[i32; 2]>,
    doors: Vec<DoorSummary>,
}

#[derive(Serialize)]
struct DoorSummary {
    neighbour: usize,
    from: [i32; 2],
    to: [i32; 2],
}

fn summarize(layout: &MapLayout) -> Vec<RoomSummary> {
    layout
        .rooms
        .iter()
        .map(|r| RoomSummary {
            node: r.node,
            corridor: r.is_corridor,
            position: [r.position.x, r.position.y],
            outline: r
                .shape
                .translate(r.position)
                .points()
                .iter()
                .map(|p| [p.x, p.y])
                .collect(),
            doors: r
                .doors
                .iter()
                .map(|d| DoorSummary {
                    neighbour: d.neighbour,
                    from: [d.line.from.x, d.line.from.y],
                    to: [d.line.to.x, d.line.to.y],
                })
                .collect(),
        })
        .collect()
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Run {
            scenario,
            seed,
            count,
            cycles,
            trials,
            restarts,
        } => run(scenario, seed, count, cycles, trials, restarts),
        Action::Report => report(),
    }
}

fn run(
    scenario: Scenario,
    seed: u64,
    count: usize,
    cycles: Option<usize>,
    trials: Option<usize>,
    restarts: usize,
) -> Result<()> {
    tracing::info!(scenario = scenario.name(), seed, count, "run");
    let mut cfg = GeneratorCfg {
        restarts,
        ..GeneratorCfg::default()
    };
    if let Some(cycles) = cycles {
        cfg.anneal.cycles = cycles;
    }
    if let Some(trials) = trials {
        cfg.anneal.trials_per_cycle = trials;
    }
    let params = json!({
        "seed": seed,
        "count": count,
        "cycles": cfg.anneal.cycles,
        "trials_per_cycle": cfg.anneal.trials_per_cycle,
        "restarts": restarts
    });

    let map = scenario
        .map()
        .with_context(|| format!("building scenario {}", scenario.name()))?;
    let generator = LayoutGenerator::new(&map, cfg).context("preparing generator")?;
    let mut rng = StdRng::seed_from_u64(seed);
    let report = generator
        .generate(count, &mut rng, &CancelToken::new(), &mut NoopObserver)
        .context("generating layouts")?;
    tracing::info!(
        layouts = report.layouts.len(),
        iterations = report.iterations,
        "done"
    );

    let layouts: Vec<Vec<RoomSummary>> = report.layouts.iter().map(summarize).collect();
    let doc = json!({
        "provenance": provenance::document(provenance::Payload::new(scenario.name(), params)),
        "chains": generator.chains(),
        "iterations": report.iterations,
        "restarts_used": report.restarts_used,
        "layouts": layouts
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn report() -> Result<()> {
    let doc = provenance::document(provenance::Payload::new("none", json!({})));
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
