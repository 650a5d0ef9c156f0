use super::batches::BatchKind;
use crate::ui::{MAX_OUTPUT_CHARS, truncate_tail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub kind: BatchKind,
    pub rc: i32,
    pub output: String,
    /// Shell-style rendering of what ran, as written to history.
    pub commands: Vec<String>,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> bool {
        self.rc == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub outcomes: Vec<BatchOutcome>,
    pub notices: Vec<String>,
    /// Whether the post-success policy cleared plan entries.
    pub plan_cleared: bool,
    pub interrupted: bool,
}

impl ApplyReport {
    /// True when every executed batch returned 0 and nothing was cut short.
    pub fn all_succeeded(&self) -> bool {
        !self.interrupted && self.outcomes.iter().all(BatchOutcome::succeeded)
    }

    pub fn failures(&self) -> impl Iterator<Item = &BatchOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    /// Action, rc and the tail of the output of every failed batch.
    pub fn failure_summary(&self) -> String {
        self.failures()
            .map(|o| {
                format!(
                    "{} rc={}\n{}",
                    o.kind,
                    o.rc,
                    truncate_tail(o.output.trim_end(), MAX_OUTPUT_CHARS)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(kind: BatchKind, rc: i32, output: &str) -> BatchOutcome {
        BatchOutcome {
            kind,
            rc,
            output: output.to_string(),
            commands: Vec::new(),
        }
    }

    #[test]
    fn summary_lists_only_failures() {
        let report = ApplyReport {
            outcomes: vec![
                outcome(BatchKind::InstallRepo, 0, "ok"),
                outcome(BatchKind::Remove, 1, "error: target not found: nano\n"),
            ],
            ..ApplyReport::default()
        };
        assert!(!report.all_succeeded());
        assert_eq!(
            report.failure_summary(),
            "remove rc=1\nerror: target not found: nano"
        );
    }

    #[test]
    fn long_output_is_cut_to_tail() {
        let long = format!("{}END", "x".repeat(MAX_OUTPUT_CHARS * 2));
        let report = ApplyReport {
            outcomes: vec![outcome(BatchKind::InstallAur, 2, &long)],
            ..ApplyReport::default()
        };
        let summary = report.failure_summary();
        assert!(summary.ends_with("END"));
        assert!(summary.len() < long.len());
    }

    #[test]
    fn interrupted_run_is_not_a_success() {
        let report = ApplyReport {
            interrupted: true,
            ..ApplyReport::default()
        };
        assert!(!report.all_succeeded());
    }
}
