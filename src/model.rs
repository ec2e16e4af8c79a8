//! Uniform in-memory representation of block coverage and the per-file line
//! records derived from it. Providers produce `MethodRecord`s with
//! `BlockRange`s; the aggregator folds them into `FileRecords`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Line number the compiler emits for code with no attributable user source.
pub const HIDDEN_LINE: u32 = 0xFEEFEE;

/// Block spans longer than this are still expanded, but logged as suspicious.
pub const LARGE_SPAN: u32 = 100_000;

/// Compute a coverage rate, returning 0.0 when the total is zero.
#[must_use]
pub fn rate(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64
    }
}

/// Execution state of a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverageStatus {
    NotCovered,
    Covered,
    PartiallyCovered,
}

impl CoverageStatus {
    /// Status of a block given its byte in the module hit buffer.
    #[must_use]
    pub fn from_hit(byte: u8) -> Self {
        if byte == 0 {
            CoverageStatus::NotCovered
        } else {
            CoverageStatus::Covered
        }
    }

    /// Reconcile two observations of the same line. Agreement keeps the
    /// status; any disagreement yields `PartiallyCovered`, which absorbs
    /// everything merged into it afterwards.
    #[must_use]
    pub fn merge(self, other: CoverageStatus) -> CoverageStatus {
        if self == other {
            self
        } else {
            CoverageStatus::PartiallyCovered
        }
    }

    /// Count written to `DA:` records. LCOV has no notion of partial lines.
    #[must_use]
    pub fn execution_count(self) -> u64 {
        match self {
            CoverageStatus::NotCovered => 0,
            CoverageStatus::Covered | CoverageStatus::PartiallyCovered => 1,
        }
    }
}

/// Contiguous source lines attributed to one basic block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRange {
    pub source_file: String,
    pub start_line: u32,
    pub end_line: u32,
    /// Index into the owning module's hit buffer.
    pub block_index: u32,
    /// Providers emit placeholder ranges with `valid == false`.
    #[serde(default = "default_valid")]
    pub valid: bool,
}

fn default_valid() -> bool {
    true
}

impl BlockRange {
    /// Number of lines between start and end, or 0 for an inverted range.
    #[must_use]
    pub fn line_span(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line)
    }
}

/// A method as reported by a module's symbol reader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub undecorated_name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub namespace: String,
    pub ranges: Vec<BlockRange>,
}

/// Functions and line statuses accumulated for one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageRecord {
    /// Start line → method name. A later method on the same line replaces
    /// the earlier one.
    pub functions: BTreeMap<u32, String>,
    pub covered_lines: BTreeMap<u32, CoverageStatus>,
}

impl CoverageRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_function(&mut self, start_line: u32, name: &str) {
        self.functions.insert(start_line, name.to_string());
    }

    /// Project block hit flags onto the lines of each range. Invalid ranges
    /// and ranges whose block lies outside `hits` are skipped.
    pub fn add_blocks_coverage(&mut self, ranges: &[BlockRange], hits: &[u8]) {
        for range in ranges {
            if !range.valid {
                continue;
            }
            let Some(&hit) = hits.get(range.block_index as usize) else {
                continue;
            };
            self.add_block_lines(range, CoverageStatus::from_hit(hit));
        }
    }

    fn add_block_lines(&mut self, range: &BlockRange, status: CoverageStatus) {
        if range.line_span() > LARGE_SPAN {
            tracing::warn!(
                file = %range.source_file,
                start = range.start_line,
                end = range.end_line,
                "block spans an unusually large number of lines"
            );
        }
        for line in range.start_line..=range.end_line {
            if line == HIDDEN_LINE {
                continue;
            }
            self.covered_lines
                .entry(line)
                .and_modify(|prev| *prev = prev.merge(status))
                .or_insert(status);
        }
    }

    /// Number of lines with a non-zero execution count.
    #[must_use]
    pub fn lines_hit(&self) -> u64 {
        self.covered_lines
            .values()
            .filter(|s| s.execution_count() > 0)
            .count() as u64
    }

    #[must_use]
    pub fn lines_found(&self) -> u64 {
        self.covered_lines.len() as u64
    }
}

/// Source path → `CoverageRecord`, iterated in the order files were first
/// encountered.
#[derive(Debug, Clone, Default)]
pub struct FileRecords {
    records: Vec<(String, CoverageRecord)>,
    index: HashMap<String, usize>,
}

impl FileRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the record for `path`, creating an empty one on first use.
    pub fn record_mut(&mut self, path: &str) -> &mut CoverageRecord {
        let idx = match self.index.get(path) {
            Some(&idx) => idx,
            None => {
                self.records.push((path.to_string(), CoverageRecord::new()));
                let idx = self.records.len() - 1;
                self.index.insert(path.to_string(), idx);
                idx
            }
        };
        &mut self.records[idx].1
    }

    pub fn get(&self, path: &str) -> Option<&CoverageRecord> {
        self.index.get(path).map(|&idx| &self.records[idx].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CoverageRecord)> {
        self.records.iter().map(|(path, record)| (path.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            total_files: self.len() as u64,
            ..Default::default()
        };
        for (_, record) in self.iter() {
            summary.total_lines += record.lines_found();
            summary.covered_lines += record.lines_hit();
            summary.total_functions += record.functions.len() as u64;
        }
        summary
    }
}

/// Totals across every file of a converted report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub total_files: u64,
    pub total_lines: u64,
    pub covered_lines: u64,
    pub total_functions: u64,
}

impl ReportSummary {
    #[must_use]
    pub fn line_rate(&self) -> f64 {
        rate(self.covered_lines, self.total_lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn range(start: u32, end: u32, block: u32) -> BlockRange {
        BlockRange {
            source_file: "a.cpp".to_string(),
            start_line: start,
            end_line: end,
            block_index: block,
            valid: true,
        }
    }

    fn status() -> impl Strategy<Value = CoverageStatus> {
        prop_oneof![
            Just(CoverageStatus::NotCovered),
            Just(CoverageStatus::Covered),
            Just(CoverageStatus::PartiallyCovered),
        ]
    }

    proptest! {
        #[test]
        fn merge_is_commutative(a in status(), b in status()) {
            prop_assert_eq!(a.merge(b), b.merge(a));
        }

        #[test]
        fn merge_is_idempotent(a in status()) {
            prop_assert_eq!(a.merge(a), a);
        }

        #[test]
        fn merge_is_associative(a in status(), b in status(), c in status()) {
            prop_assert_eq!(a.merge(b).merge(c), a.merge(b.merge(c)));
        }

        #[test]
        fn partial_absorbs(rest in proptest::collection::vec(status(), 0..8)) {
            let folded = rest
                .into_iter()
                .fold(CoverageStatus::PartiallyCovered, CoverageStatus::merge);
            prop_assert_eq!(folded, CoverageStatus::PartiallyCovered);
        }
    }

    #[test]
    fn test_conflict_escalates_to_partial() {
        assert_eq!(
            CoverageStatus::Covered.merge(CoverageStatus::NotCovered),
            CoverageStatus::PartiallyCovered
        );
    }

    #[test]
    fn test_add_blocks_coverage() {
        let mut record = CoverageRecord::new();
        record.add_blocks_coverage(&[range(10, 12, 0), range(12, 13, 1)], &[1, 0]);

        assert_eq!(record.covered_lines[&10], CoverageStatus::Covered);
        assert_eq!(record.covered_lines[&11], CoverageStatus::Covered);
        assert_eq!(record.covered_lines[&12], CoverageStatus::PartiallyCovered);
        assert_eq!(record.covered_lines[&13], CoverageStatus::NotCovered);
        assert_eq!(record.lines_found(), 4);
        assert_eq!(record.lines_hit(), 3);
    }

    #[test]
    fn test_skips_out_of_bounds_and_invalid_blocks() {
        let mut record = CoverageRecord::new();
        let mut placeholder = range(1, 2, 0);
        placeholder.valid = false;
        record.add_blocks_coverage(&[placeholder, range(5, 6, 7)], &[1]);

        assert!(record.covered_lines.is_empty());
    }

    #[test]
    fn test_hidden_line_dropped() {
        let mut record = CoverageRecord::new();
        record.add_blocks_coverage(&[range(HIDDEN_LINE, HIDDEN_LINE + 1, 0)], &[1]);

        assert!(!record.covered_lines.contains_key(&HIDDEN_LINE));
        assert_eq!(record.covered_lines.len(), 1);
    }

    #[test]
    fn test_line_span() {
        assert_eq!(range(10, 12, 0).line_span(), 2);
        assert_eq!(range(7, 7, 0).line_span(), 0);
        assert_eq!(range(9, 3, 0).line_span(), 0);
        assert!(range(1, LARGE_SPAN + 2, 0).line_span() > LARGE_SPAN);
    }

    #[test]
    fn test_large_span_is_still_expanded() {
        let mut record = CoverageRecord::new();
        record.add_blocks_coverage(&[range(1, LARGE_SPAN + 2, 0)], &[1]);
        assert_eq!(record.lines_found(), u64::from(LARGE_SPAN) + 2);
        assert_eq!(record.lines_hit(), u64::from(LARGE_SPAN) + 2);
    }

    #[test]
    fn test_inverted_range_yields_no_lines() {
        let mut record = CoverageRecord::new();
        record.add_blocks_coverage(&[range(9, 3, 0)], &[1]);
        assert!(record.covered_lines.is_empty());
    }

    #[test]
    fn test_function_on_same_line_overwrites() {
        let mut record = CoverageRecord::new();
        record.add_function(4, "first");
        record.add_function(4, "second");
        assert_eq!(record.functions.len(), 1);
        assert_eq!(record.functions[&4], "second");
    }

    #[test]
    fn test_file_records_keep_first_seen_order() {
        let mut files = FileRecords::new();
        files.record_mut("z.cpp").add_function(1, "z");
        files.record_mut("a.cpp").add_function(1, "a");
        files.record_mut("z.cpp").add_function(2, "z2");

        let paths: Vec<&str> = files.iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["z.cpp", "a.cpp"]);
        assert_eq!(files.get("z.cpp").unwrap().functions.len(), 2);
    }
}
