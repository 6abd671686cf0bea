// Human-readable rendering of the rounds.

use rcv_tabulation::{ElectionEvent, Reporter};
use snafu::whatever;

use crate::rcv::RcvResult;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ReportFormat {
    /// Markdown-flavoured plain text.
    Text,
    Html,
    Silent,
}

impl ReportFormat {
    pub fn parse(s: Option<&str>) -> RcvResult<ReportFormat> {
        match s {
            None | Some("text") => Ok(ReportFormat::Text),
            Some("html") => Ok(ReportFormat::Html),
            Some("none") => Ok(ReportFormat::Silent),
            Some(x) => whatever!("Unknown report format {:?} (text, html or none)", x),
        }
    }
}

/// Renders the election events as they arrive, into a string.
pub struct TextReporter {
    format: ReportFormat,
    election_name: String,
    win_number: u64,
    out: String,
}

impl TextReporter {
    pub fn new(format: ReportFormat) -> TextReporter {
        TextReporter {
            format,
            election_name: String::new(),
            win_number: 0,
            out: String::new(),
        }
    }

    pub fn into_output(self) -> String {
        self.out
    }

    fn heading(&mut self, level: usize, s: &str) {
        match self.format {
            ReportFormat::Text => {
                self.out.push_str(&"#".repeat(level));
                self.out.push(' ');
                self.out.push_str(s);
                self.out.push('\n');
            }
            ReportFormat::Html => {
                self.out
                    .push_str(&format!("<h{}>{}</h{}>\n", level, escape_html(s), level));
            }
            ReportFormat::Silent => {}
        }
    }

    fn line(&mut self, s: &str) {
        match self.format {
            ReportFormat::Text => {
                self.out.push_str(s);
                self.out.push('\n');
            }
            ReportFormat::Html => {
                self.out.push_str(&escape_html(s));
                self.out.push_str("<br />\n");
            }
            ReportFormat::Silent => {}
        }
    }

    fn blank(&mut self) {
        if self.format != ReportFormat::Silent {
            self.out.push('\n');
        }
    }

    fn conclusion(&mut self, winners: &[String]) {
        let verb = if winners.len() == 1 { "is" } else { "are" };
        let s = format!(
            "{} {} elected as {}",
            winners.join(", "),
            verb,
            self.election_name
        );
        match self.format {
            ReportFormat::Text => self.out.push_str(&format!("**{}**\n", s)),
            ReportFormat::Html => self
                .out
                .push_str(&format!("<p><strong>{}</strong></p>\n", escape_html(&s))),
            ReportFormat::Silent => {}
        }
    }
}

impl Reporter for TextReporter {
    fn report(&mut self, event: &ElectionEvent) {
        match event {
            ElectionEvent::Start {
                election_name,
                num_of_winners,
                win_number,
            } => {
                self.election_name = election_name.clone();
                self.win_number = *win_number;
                self.heading(2, election_name);
                self.heading(2, &format!("Number of winners: {}", num_of_winners));
                self.heading(2, &format!("Win Number: {}", win_number));
                self.blank();
            }
            ElectionEvent::RoundStart {
                round,
                candidates_left,
            } => {
                self.heading(3, &format!("Round {}", round));
                self.line(&format!("Number of candidates left: {}", candidates_left));
            }
            ElectionEvent::Tally { counts, .. } => {
                for (name, count) in counts.iter() {
                    self.line(&format!("{}: {} votes", name, count));
                }
            }
            ElectionEvent::ThresholdWin {
                candidate,
                spots_remaining,
                ..
            } => {
                let win_number = self.win_number;
                self.line(&format!(
                    "{} has passed the threshold of {} votes and will be removed from contention",
                    candidate, win_number
                ));
                self.line(&format!("Spots remaining: {}", spots_remaining));
                self.blank();
            }
            ElectionEvent::Elimination { candidate, .. } => {
                self.line(&format!("{} was eliminated", candidate));
            }
            ElectionEvent::RoundWin { candidate, .. } => {
                self.line(&format!("{} won round", candidate));
                self.blank();
            }
            ElectionEvent::FinalWin { candidate, .. } => {
                self.line(&format!("{} wins last round and is a winner", candidate));
            }
            ElectionEvent::ElectionComplete { winners } => {
                self.blank();
                self.conclusion(winners);
            }
        }
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcv_tabulation::Tabulator;

    fn run(format: ReportFormat) -> String {
        let ballots: Vec<Vec<String>> = vec![
            vec!["A & Co".to_string(), "B".to_string()],
            vec!["A & Co".to_string()],
            vec!["B".to_string()],
        ];
        let mut t = Tabulator::from_ballots(&ballots, None, "Chair", 1).unwrap();
        let mut reporter = TextReporter::new(format);
        t.conduct_election(&mut reporter).unwrap();
        reporter.into_output()
    }

    #[test]
    fn text_report() {
        let out = run(ReportFormat::Text);
        assert!(out.starts_with("## Chair\n## Number of winners: 1\n## Win Number: 2\n"));
        assert!(out.contains("### Round 1\nNumber of candidates left: 2\n"));
        assert!(out.contains("A & Co: 2 votes\nB: 1 votes\n"));
        assert!(out.contains(
            "A & Co has passed the threshold of 2 votes and will be removed from contention\n"
        ));
        assert!(out.ends_with("**A & Co is elected as Chair**\n"));
    }

    #[test]
    fn html_report() {
        let out = run(ReportFormat::Html);
        assert!(out.starts_with("<h2>Chair</h2>\n"));
        assert!(out.contains("<h3>Round 1</h3>\n"));
        assert!(out.contains("A &amp; Co: 2 votes<br />\n"));
        assert!(out.ends_with("<p><strong>A &amp; Co is elected as Chair</strong></p>\n"));
    }

    #[test]
    fn no_report() {
        assert_eq!(run(ReportFormat::Silent), "");
    }

    #[test]
    fn unknown_format() {
        assert!(ReportFormat::parse(Some("pdf")).is_err());
        assert_eq!(ReportFormat::parse(None).unwrap(), ReportFormat::Text);
    }
}
