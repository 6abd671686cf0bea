use clap::Parser;

/// This is a ranked-choice tabulation program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the election description (JSON).
    /// See the manual of rcv_tabulation for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the outcome of an election in JSON format. If provided, rcvtab will
    /// check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) A CSV file of ballots, one ballot per row. Setting this option overrides the
    /// sources that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default 1) The number of seats to fill.
    #[clap(short, long, value_parser)]
    pub winners: Option<u32>,

    /// (optional) A candidate that is skipped when it would be eliminated with the fewest votes.
    #[clap(short, long, value_parser)]
    pub protected: Option<String>,

    /// (optional) The name of the office being sought.
    #[clap(short, long, value_parser)]
    pub name: Option<String>,

    /// (default text) How the rounds are printed: text, html or none.
    #[clap(long, value_parser)]
    pub format: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
