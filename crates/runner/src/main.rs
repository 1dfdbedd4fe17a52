use odyssey_runner::{ClassroomConfig, ClassroomSimulation, RunnerError};

fn print_help() {
    eprintln!(
        r#"Investment Odyssey - classroom market simulation

USAGE:
    odyssey [OPTIONS]

OPTIONS:
    --config <PATH>     Load the classroom from a JSON file
    --seed <N>          Override the classroom seed
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)

EXAMPLES:
    # Four default students, 20 rounds
    odyssey

    # Reproducible run from a config file
    odyssey --config classroom.json --seed 42
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), RunnerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;
    let mut seed: Option<u64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    return Err(RunnerError::Config("--config requires a path".into()));
                };
                config_path = Some(path.clone());
            }
            "--seed" => {
                i += 1;
                let parsed = args.get(i).and_then(|s| s.parse().ok());
                let Some(value) = parsed else {
                    return Err(RunnerError::Config("--seed requires a number".into()));
                };
                seed = Some(value);
            }
            arg => {
                print_help();
                return Err(RunnerError::Config(format!("unknown argument: {}", arg)));
            }
        }
        i += 1;
    }

    let mut config = match config_path {
        Some(path) => {
            log::info!("Loading classroom from: {}", path);
            ClassroomConfig::from_json_file(&path)?
        }
        None => {
            log::info!("Using default classroom");
            ClassroomConfig::default()
        }
    };
    if seed.is_some() {
        config.seed = seed;
    }

    let results = ClassroomSimulation::with_config(config).await?.run().await;

    println!();
    println!("Final leaderboard after {} rounds", results.rounds_played);
    println!(
        "{:<4} {:<16} {:>14} {:>14} {:>10}",
        "#", "student", "final value", "injected", "return"
    );
    for (rank, entry) in results.leaderboard.iter().enumerate() {
        println!(
            "{:<4} {:<16} {:>14.2} {:>14.2} {:>9.2}%",
            rank + 1,
            entry.student_id,
            entry.final_value,
            entry.total_cash_injected,
            entry.adjusted_return_pct
        );
    }
    if !results.offline_students.is_empty() {
        println!("Finished offline: {}", results.offline_students.join(", "));
    }

    match results.error {
        Some(e) => Err(RunnerError::Config(format!("simulation failed: {}", e))),
        None => Ok(()),
    }
}
