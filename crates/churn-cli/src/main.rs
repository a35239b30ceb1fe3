use anyhow::Result;
use clap::{Arg, ArgAction, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use churn_classifiers::io::read_bank_csv;
use churn_classifiers::pipeline::{self, PipelineConfig};
use churn_classifiers::sink::FsSink;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("CHURN_LOG", "error,churn=info"))
        .init();

    let matches = Command::new("churn")
        .version(clap::crate_version!())
        .about("Train and evaluate customer churn classifiers from bank account data")
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .help("Path to the bank churn CSV file")
                .default_value("data/bank_data.csv")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Directory that receives the images/, models/ and run record artifacts")
                .default_value(".")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("skip_eda")
                .long("skip-eda")
                .help("Skip the exploratory distribution plots")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let data_path = matches
        .get_one::<PathBuf>("data")
        .expect("data path has a default");
    let output = matches
        .get_one::<PathBuf>("output")
        .expect("output path has a default");

    let mut data = read_bank_csv(data_path)?;

    let config = PipelineConfig {
        eda: !matches.get_flag("skip_eda"),
        ..PipelineConfig::default()
    };
    let mut sink = FsSink::new(output);

    let summary = pipeline::run(&mut data, &config, &mut sink)?;

    log::info!(
        "best forest candidate #{}: {:?} (cv accuracy {:.4})",
        summary.best_forest_index,
        summary.best_forest_params,
        summary.best_cv_score
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
