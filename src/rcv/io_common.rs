use std::path::Path;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ids_use_file_name() {
        let make_id = make_default_id("/data/2024/board.csv");
        assert_eq!(make_id(12), "board.csv-00000012");
        assert_eq!(simplify_file_name("votes.csv"), "votes.csv");
    }
}
