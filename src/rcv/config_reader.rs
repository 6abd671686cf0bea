use crate::rcv::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName", default)]
    pub contest_name: String,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "contestJurisdiction")]
    pub contest_jurisdiction: Option<String>,
    #[serde(rename = "contestOffice")]
    pub contest_office: Option<String>,
    /// Where the JSON summary is written, relative to the configuration file.
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub date: Option<String>,
    pub jurisdiction: Option<String>,
    pub office: Option<String>,
    pub threshold: Option<String>,
    #[serde(rename = "numberOfWinners")]
    pub number_of_winners: u32,
    #[serde(rename = "protectedCandidate")]
    pub protected_candidate: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstVoteColumnIndex")]
    _first_vote_column_index: Option<JSValue>,
    #[serde(rename = "firstVoteRowIndex")]
    _first_vote_row_index: Option<JSValue>,
    #[serde(rename = "idColumnIndex")]
    pub id_column_index: Option<JSValue>,
    #[serde(rename = "countColumnIndex")]
    pub count_column_index: Option<JSValue>,
}

impl FileSource {
    /// A CSV file with one ballot per row, all the columns being ranks.
    pub fn csv(file_path: &str) -> FileSource {
        FileSource {
            provider: "csv".to_string(),
            file_path: file_path.to_string(),
            _first_vote_column_index: None,
            _first_vote_row_index: None,
            id_column_index: None,
            count_column_index: None,
        }
    }

    // All the indexes are 1-based in the configuration and 0-based once read.

    pub fn first_vote_column_index(&self) -> RcvResult<usize> {
        read_js_index(&self._first_vote_column_index).map(|x| x.unwrap_or(0))
    }

    pub fn first_vote_row_index(&self) -> RcvResult<usize> {
        read_js_index(&self._first_vote_row_index).map(|x| x.unwrap_or(0))
    }

    pub fn id_column_index_int(&self) -> RcvResult<Option<usize>> {
        read_js_index(&self.id_column_index)
    }

    pub fn count_column_index_int(&self) -> RcvResult<Option<usize>> {
        read_js_index(&self.count_column_index)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RcvRules {
    #[serde(rename = "numberOfWinners")]
    pub number_of_winners: Option<u32>,
    #[serde(rename = "protectedCandidate")]
    pub protected_candidate: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RcvConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "cvrFileSources", default)]
    pub cvr_file_sources: Vec<FileSource>,
    #[serde(default)]
    pub rules: RcvRules,
}

pub fn read_config(path: &Path) -> RcvResult<RcvConfig> {
    let path_s = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path: path_s })?;
    let config: RcvConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &Path) -> RcvResult<JSValue> {
    let path_s = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path: path_s })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_summary: {:?}", js);
    Ok(js)
}

// Reads a 1-based index, as a number, a numeric string or a spreadsheet column name ("A", "AB").
fn read_js_index(x: &Option<JSValue>) -> RcvResult<Option<usize>> {
    let one_based = match x {
        None | Some(JSValue::Null) => return Ok(None),
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {})?,
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            s.to_ascii_lowercase()
                .chars()
                .fold(0, |acc, c| acc * 26 + (c as usize - 'a' as usize + 1))
        }
        Some(JSValue::String(s)) => s.parse::<usize>().ok().context(ParsingJsonNumberSnafu {})?,
        _ => None.context(ParsingJsonNumberSnafu {})?,
    };
    if one_based == 0 {
        return None.context(ParsingJsonNumberSnafu {});
    }
    Ok(Some(one_based - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn indexes_are_one_based() {
        assert_eq!(read_js_index(&Some(json!(2))).unwrap(), Some(1));
        assert_eq!(read_js_index(&Some(json!("3"))).unwrap(), Some(2));
        assert_eq!(read_js_index(&Some(json!("A"))).unwrap(), Some(0));
        assert_eq!(read_js_index(&Some(json!("ab"))).unwrap(), Some(27));
        assert_eq!(read_js_index(&None).unwrap(), None);
        assert!(read_js_index(&Some(json!(0))).is_err());
        assert!(read_js_index(&Some(json!(true))).is_err());
    }

    #[test]
    fn minimal_config() {
        let config: RcvConfig = serde_json::from_str(
            r#"{"cvrFileSources": [{"provider": "csv", "filePath": "votes.csv"}]}"#,
        )
        .unwrap();
        assert_eq!(config.rules, RcvRules::default());
        assert_eq!(config.output_settings.contest_name, "");
        let cfs = &config.cvr_file_sources[0];
        assert_eq!(cfs, &FileSource::csv("votes.csv"));
        assert_eq!(cfs.first_vote_column_index().unwrap(), 0);
        assert_eq!(cfs.count_column_index_int().unwrap(), None);
    }
}
