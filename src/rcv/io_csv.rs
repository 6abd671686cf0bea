// Primitives for reading CSV files.

use std::fs::File;

use crate::rcv::{io_common::make_default_id, *};

pub fn read_csv_ranking(path: String, cfs: &FileSource) -> RcvResult<Vec<ParsedBallot>> {
    let default_id = make_default_id(&path);

    let id_idx_o = cfs.id_column_index_int()?;
    let choices_start_col = cfs.first_vote_column_index()?;
    let count_idx_o = cfs.count_column_index_int()?;

    let mut res: Vec<ParsedBallot> = Vec::new();
    let (records, row_offset) = get_records(&path, cfs)?;

    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_ranking: {:?} {:?}", lineno, line);
        if line.iter().all(|s| s.is_empty()) {
            continue;
        }
        let id = if let Some(id_idx) = id_idx_o {
            line.get(id_idx)
                .context(CsvLineTooShortSnafu { lineno })?
                .to_string()
        } else {
            default_id(lineno)
        };

        let count: Option<u64> = if let Some(count_idx) = count_idx_o {
            let value = line
                .get(count_idx)
                .context(CsvLineTooShortSnafu { lineno })?;
            let c = value.parse::<u64>().ok().context(CsvCountSnafu {
                lineno,
                value: value.to_string(),
            })?;
            Some(c)
        } else {
            None
        };

        // The id and count columns are never ranks, even when placed after the first rank.
        let choices: Vec<String> = line
            .iter()
            .enumerate()
            .skip(choices_start_col)
            .filter(|(col, _)| Some(*col) != id_idx_o && Some(*col) != count_idx_o)
            .map(|(_, s)| s.to_string())
            .collect();

        res.push(ParsedBallot {
            id: Some(id),
            count,
            choices,
        });
    }
    Ok(res)
}

fn get_records(path: &str, cfs: &FileSource) -> RcvResult<(csv::StringRecordsIntoIter<File>, usize)> {
    let first_row = cfs.first_vote_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu {
            path: path.to_string(),
        })?;
    let mut records = rdr.into_records();
    for _ in 0..first_row {
        _ = records.next();
    }
    Ok((records, first_row))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("data")
            .join(name)
            .display()
            .to_string()
    }

    #[test]
    fn reads_ids_and_ranks() {
        let cfs: FileSource = serde_json::from_str(
            r#"{"provider": "csv", "filePath": "x", "firstVoteColumnIndex": 2, "firstVoteRowIndex": 2, "idColumnIndex": 1}"#,
        )
        .unwrap();
        let ballots = read_csv_ranking(fixture("treasurer/treasurer.csv"), &cfs).unwrap();
        assert_eq!(ballots.len(), 5);
        assert_eq!(ballots[0].id, Some("b1".to_string()));
        assert_eq!(ballots[0].count, None);
        assert_eq!(
            ballots[0].choices,
            vec!["Alice".to_string(), "Bob".to_string(), "".to_string()]
        );
        assert_eq!(ballots[4].choices.len(), 3);
    }

    #[test]
    fn reads_counts() {
        let cfs: FileSource = serde_json::from_str(
            r#"{"provider": "csv", "filePath": "x", "firstVoteColumnIndex": 1, "countColumnIndex": "B"}"#,
        )
        .unwrap();
        let ballots = read_csv_ranking(fixture("board/board.csv"), &cfs).unwrap();
        assert_eq!(ballots.len(), 4);
        assert_eq!(ballots[0].count, Some(2));
        assert_eq!(ballots[0].choices, vec!["Alice".to_string()]);
        assert_eq!(ballots[0].id, Some("board.csv-00000001".to_string()));
        assert_eq!(ballots[3].choices, vec!["No Endorsement".to_string()]);
    }

    #[test]
    fn missing_file() {
        let res = read_csv_ranking(fixture("nope.csv"), &FileSource::csv("nope.csv"));
        assert!(matches!(res, Err(RcvError::CsvOpen { .. })));
    }
}
