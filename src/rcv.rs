use log::{debug, info, warn};

use rcv_tabulation::builder::Builder;
use rcv_tabulation::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::rcv::config_reader::*;
use crate::rcv::report::{ReportFormat, TextReporter};

pub mod config_reader;
mod io_common;
mod io_csv;
pub mod report;

#[derive(Debug, Snafu)]
pub enum RcvError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive number in the configuration"))]
    ParsingJsonNumber {},
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("CSV line {lineno} is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("CSV line {lineno}: {value:?} is not a ballot count"))]
    CsvCount { lineno: usize, value: String },
    #[snafu(display("Tabulation failed: {source}"))]
    Tabulation { source: TabulationErrors },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type RcvResult<T> = Result<T, RcvError>;

/// A ballot, as parsed by the readers
/// This is before blank choices are dropped.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub id: Option<String>,
    pub count: Option<u64>,
    pub choices: Vec<String>,
}

fn result_stats_to_json(summary: &ElectionSummary) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in summary.round_stats.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (name, count) in round_stat.tally.iter() {
            tally.insert(name.clone(), json!(count.to_string()));
        }

        let mut tally_results: Vec<JSValue> = Vec::new();
        for name in round_stat.eliminated.iter() {
            tally_results.push(json!({ "eliminated": name }));
        }
        for name in round_stat.elected.iter() {
            tally_results.push(json!({ "elected": name }));
        }

        let js = json!({"round": round_stat.round, "tally": tally, "tallyResults": tally_results});
        l.push(js);
    }
    l
}

fn build_summary_js(config: &RcvConfig, summary: &ElectionSummary) -> JSValue {
    let c = OutputConfig {
        contest: summary.election_name.clone(),
        date: config.output_settings.contest_date.clone(),
        jurisdiction: config.output_settings.contest_jurisdiction.clone(),
        office: config.output_settings.contest_office.clone(),
        threshold: Some(summary.win_number.to_string()),
        number_of_winners: summary.number_of_winners,
        protected_candidate: config.rules.protected_candidate.clone(),
    };
    json!({
        "config": c,
        "results": result_stats_to_json(summary),
        "winners": summary.winners,
    })
}

fn validate_rules(config: &RcvConfig) -> RcvResult<ElectionRules> {
    let number_of_winners = config.rules.number_of_winners.unwrap_or(1);
    if number_of_winners == 0 {
        whatever!("numberOfWinners must be at least 1");
    }
    Ok(ElectionRules {
        election_name: config.output_settings.contest_name.clone(),
        number_of_winners,
        protected_candidate: config
            .rules
            .protected_candidate
            .clone()
            .filter(|s| !s.is_empty()),
    })
}

fn read_ranking_data(root_path: &Path, cfs: &FileSource) -> RcvResult<Vec<ParsedBallot>> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read rank file {:?}", p2);
    match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_ranking(p2, cfs),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

/// Applies the command line flags on top of the configuration.
///
/// Returns the updated configuration and the directory the ballot files are relative to.
fn apply_args(
    mut config: RcvConfig,
    root_dir: PathBuf,
    args: &Args,
) -> (RcvConfig, PathBuf) {
    let mut root_dir = root_dir;
    if let Some(input) = args.input.clone() {
        config.cvr_file_sources = vec![FileSource::csv(&input)];
        root_dir = PathBuf::new();
    }
    if let Some(winners) = args.winners {
        config.rules.number_of_winners = Some(winners);
    }
    if let Some(protected) = args.protected.clone() {
        config.rules.protected_candidate = Some(protected);
    }
    if let Some(name) = args.name.clone() {
        config.output_settings.contest_name = name;
    }
    (config, root_dir)
}

/// Reads all the ballots and runs the election.
///
/// Returns the summary of the rounds and the rendered report.
pub fn run_election(
    config: &RcvConfig,
    root_dir: &Path,
    format: ReportFormat,
) -> RcvResult<(ElectionSummary, String)> {
    let rules = validate_rules(config)?;
    debug!("run_election: rules: {:?}", rules);

    if config.cvr_file_sources.is_empty() {
        whatever!("No ballot source: use --input or cvrFileSources in the configuration");
    }

    let mut builder = Builder::new(&rules).context(TabulationSnafu {})?;
    for cfs in config.cvr_file_sources.iter() {
        let parsed_ballots = read_ranking_data(root_dir, cfs)?;
        for pb in parsed_ballots.iter() {
            // Default of 1 if not specified
            let count = pb.count.unwrap_or(1);
            debug!("Choices for ballot {:?}: {:?} x{}", pb.id, pb.choices, count);
            if count == 0 {
                warn!("run_election: ballot {:?} has a count of zero", pb.id);
            }
            builder
                .add_vote(&pb.choices, count)
                .context(TabulationSnafu {})?;
        }
    }
    info!("run_election: {} votes", builder.votes().len());

    let mut tabulator = builder.build().context(TabulationSnafu {})?;
    let mut reporter = (LogReporter, (SummaryReporter::new(), TextReporter::new(format)));
    tabulator
        .conduct_election(&mut reporter)
        .context(TabulationSnafu {})?;
    let (_, (summary_reporter, text_reporter)) = reporter;
    Ok((summary_reporter.into_summary(), text_reporter.into_output()))
}

fn check_summary(pretty_js_stats: &str, summary_path: &Path) -> RcvResult<()> {
    let summary_ref = read_summary(summary_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

pub fn run_election_cli(args: &Args) -> RcvResult<()> {
    let (config, root_dir) = match args.config.clone() {
        Some(config_path) => {
            let config_p = Path::new(config_path.as_str());
            let config = read_config(config_p)?;
            let root_p = config_p.parent().context(MissingParentDirSnafu {})?;
            (config, root_p.to_path_buf())
        }
        None => (RcvConfig::default(), PathBuf::new()),
    };
    let (config, root_dir) = apply_args(config, root_dir, args);
    info!("config: {:?}", config);

    let format = ReportFormat::parse(args.format.as_deref())?;
    let (summary, report) = run_election(&config, &root_dir, format)?;
    print!("{}", report);

    let result_js = build_summary_js(&config, &summary);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    // The flag is relative to the working directory, the configuration to the configuration file.
    let out_path: Option<PathBuf> = match (&args.out, &config.output_settings.output_path) {
        (Some(p), _) => Some(PathBuf::from(p)),
        (None, Some(p)) => Some(root_dir.join(p)),
        (None, None) => None,
    };
    match out_path {
        Some(p) if p.as_os_str() == "stdout" => {
            println!("{}", pretty_js_stats);
        }
        Some(p) => {
            info!("Writing summary to {:?}", p);
            fs::write(&p, &pretty_js_stats).context(WritingSummarySnafu {
                path: p.display().to_string(),
            })?;
        }
        None => {}
    }

    if let Some(summary_p) = args.reference.clone() {
        check_summary(&pretty_js_stats, Path::new(&summary_p))?;
    }
    Ok(())
}

#[cfg(test)]
fn run_election_test(test_name: &str, config_lpath: &str, summary_lpath: &str) -> RcvResult<()> {
    let test_dir: PathBuf = option_env!("RCV_TEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data"));
    info!("Running test {}", test_name);
    let config_path = test_dir.join(test_name).join(config_lpath);
    let config = read_config(&config_path)?;
    let root_p = config_path.parent().context(MissingParentDirSnafu {})?;
    let (summary, _) = run_election(&config, root_p, ReportFormat::Silent)?;
    let result_js = build_summary_js(&config, &summary);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    check_summary(&pretty_js_stats, &test_dir.join(test_name).join(summary_lpath))
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) {
    let _ = env_logger::builder().is_test(true).try_init();
    let res = run_election_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    );
    if let Err(e) = res {
        panic!("Test {} failed: {}", test_name, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn treasurer() {
        test_wrapper("treasurer");
    }

    #[test]
    fn board() {
        test_wrapper("board");
    }

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "rcvtab",
            "--input",
            "votes.csv",
            "--winners",
            "3",
            "--protected",
            "No Endorsement",
            "--name",
            "Council",
        ]);
        let (config, root_dir) = apply_args(RcvConfig::default(), PathBuf::from("conf"), &args);
        assert_eq!(root_dir, PathBuf::new());
        assert_eq!(config.cvr_file_sources, vec![FileSource::csv("votes.csv")]);
        assert_eq!(config.rules.number_of_winners, Some(3));
        assert_eq!(
            config.rules.protected_candidate,
            Some("No Endorsement".to_string())
        );
        let rules = validate_rules(&config).unwrap();
        assert_eq!(rules.election_name, "Council");
        assert_eq!(rules.number_of_winners, 3);
    }

    #[test]
    fn zero_winners_rejected() {
        let mut config = RcvConfig::default();
        config.rules.number_of_winners = Some(0);
        assert!(validate_rules(&config).is_err());
    }

    #[test]
    fn missing_sources() {
        let res = run_election(&RcvConfig::default(), Path::new(""), ReportFormat::Silent);
        assert!(matches!(res, Err(RcvError::Whatever { .. })));
    }

    #[test]
    fn too_many_winners() {
        let test_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data");
        let mut config = read_config(&test_dir.join("treasurer").join("treasurer_config.json")).unwrap();
        config.rules.number_of_winners = Some(4);
        let res = run_election(&config, &test_dir.join("treasurer"), ReportFormat::Silent);
        assert!(matches!(
            res,
            Err(RcvError::Tabulation {
                source: TabulationErrors::InvalidArgument(_)
            })
        ));
    }

    #[test]
    fn summary_json_layout() {
        let summary = ElectionSummary {
            election_name: "Chair".to_string(),
            number_of_winners: 1,
            win_number: 2,
            winners: vec!["A".to_string()],
            round_stats: vec![RoundStats {
                round: 1,
                tally: vec![("A".to_string(), 2), ("B".to_string(), 1)],
                elected: vec!["A".to_string()],
                eliminated: vec![],
            }],
        };
        let js = build_summary_js(&RcvConfig::default(), &summary);
        assert_eq!(js["config"]["threshold"], json!("2"));
        assert_eq!(js["results"][0]["tally"]["B"], json!("1"));
        assert_eq!(js["results"][0]["tallyResults"], json!([{"elected": "A"}]));
        assert_eq!(js["winners"], json!(["A"]));
    }
}
