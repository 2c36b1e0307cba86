use std::path::PathBuf;

/// Row counts of one materialized label column, in first-appearance order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinSummary {
    pub column: String,
    pub label_column: String,
    pub groups: Vec<(String, usize)>,
}

impl BinSummary {
    pub fn labelled_rows(&self) -> usize {
        self.groups.iter().map(|(_, count)| count).sum()
    }
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub dump_config: Option<PathBuf>,
    pub input_rows: usize,
    pub rows: usize,
    pub columns: usize,
    pub bins: Vec<BinSummary>,
}
