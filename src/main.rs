use std::collections::HashMap;

use clap::Parser;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

extern crate hardpoint;

use hardpoint::combat::resolve_fire_phase;
use hardpoint::dice::LoadedDice;
use hardpoint::scenario::{load_unit_designs_from_file, Scenario};
use hardpoint::unit::{Unit, UNIT_DESIGNS};

const DEFAULT_UNIT_DESIGNS_FILE: &str = "./scenarios/default_unit_designs.json";

/// Resolve one fire phase of mech combat from a scenario file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file with the scenario: units in play and the attacks declared this phase
    #[arg(short = 'f', long)]
    scenario_file: String,

    /// JSON file for unit designs
    #[arg(short, long, default_value = DEFAULT_UNIT_DESIGNS_FILE)]
    design_file: String,

    /// Seed for a deterministic random number generator.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Comma separated die faces to replay, e.g. 4,3,6,6.  Running out of faces mid phase is fatal.
    #[arg(long, value_delimiter = ',', value_parser = clap::value_parser!(u8).range(1..=6), conflicts_with = "seed")]
    dice: Option<Vec<u8>>,

    /// Print the attack reports as JSON rather than as a readable event log.
    #[arg(short, long)]
    json: bool,

    /// Write the units as they stand after the phase to this file, ready to be used as the next scenario.
    #[arg(short, long)]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    pretty_env_logger::init();
    let args = Args::parse();

    let designs = load_unit_designs_from_file(&args.design_file)
        .await
        .unwrap_or_else(|e| panic!("Unable to load unit design file {}. Reason {:?}", args.design_file, e));

    info!("(main) Loaded unit designs from {}.", &args.design_file);

    UNIT_DESIGNS
        .set(designs)
        .expect("(Main) attempting to set UNIT_DESIGNS twice!");

    let scenario = Scenario::load_from_file(&args.scenario_file).await?;
    let designs = UNIT_DESIGNS
        .get()
        .expect("(Main) UNIT_DESIGNS should be set by now.");
    let mut units: HashMap<String, Unit> = scenario.build_units(designs)?;

    let mut rng: Box<dyn RngCore> = if let Some(faces) = &args.dice {
        debug!("(main) Replaying {} loaded dice.", faces.len());
        Box::new(LoadedDice::from_faces(faces))
    } else if let Some(seed) = args.seed {
        debug!("(main) Using seeded random number generator ({seed}).");
        Box::new(StdRng::seed_from_u64(seed))
    } else {
        Box::new(rand::thread_rng())
    };

    info!("Starting fire phase for scenario \"{}\".", scenario.name);

    let reports = resolve_fire_phase(&mut units, &scenario.attacks, rng.as_mut());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            match &report.result {
                Ok(resolution) => {
                    for event in &resolution.events {
                        println!("{event}");
                    }
                }
                Err(reason) => println!("{} cannot attack {}: {reason}", report.attacker, report.target),
            }
            println!();
        }
    }

    if let Some(file_name) = args.output {
        let mut state: Vec<Unit> = units.into_values().collect();
        state.sort_by(|a, b| a.get_name().cmp(b.get_name()));
        let next = Scenario {
            name: scenario.name,
            state,
            ..Scenario::default()
        };
        tokio::fs::write(&file_name, serde_json::to_string_pretty(&next)?).await?;
        info!("(main) Wrote post-phase unit state to {file_name}.");
    }

    Ok(())
}
