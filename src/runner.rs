//! Run orchestration: load → evaluate → aggregate → record → render.

use std::path::PathBuf;

use crate::document::{load_document, path_guard::check_input_path};
use crate::error::{GuardError, Result};
use crate::metrics::{CounterStore, MetricsRecorder};
use crate::output::{self, OutputFormat};
use crate::rules::{aggregate, Assessment, RuleEngine, SeverityCatalogue};

/// Options for one invocation. Built by the CLI; nothing is read from
/// process globals once this exists.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Document to scan. Required unless `metrics_only` is set.
    pub input: Option<PathBuf>,
    /// Format printed to stdout.
    pub format: OutputFormat,
    /// Also persist the markdown report here.
    pub output_file: Option<PathBuf>,
    /// Skip scanning and print the cumulative metrics report.
    pub metrics_only: bool,
    /// Disable the absolute-path / traversal check on `input`.
    pub allow_unsafe_paths: bool,
    /// Submit this run's counts to the counter store.
    pub record_metrics: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            input: None,
            format: OutputFormat::Cli,
            output_file: None,
            metrics_only: false,
            allow_unsafe_paths: false,
            record_metrics: true,
        }
    }
}

/// Where a run is, or where it stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Loading,
    Evaluating,
    Aggregating,
    Recording,
    Rendering,
    Done,
    ReportOnly,
    Failed(String),
}

impl RunState {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// What a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    /// 1 if the assessment is blocking or the run failed, else 0.
    pub exit_code: i32,
    /// Rendered report, metrics report, or the error message on failure.
    pub output: String,
    pub state: RunState,
    pub assessment: Option<Assessment>,
}

/// Sequences one run against an injected counter store.
pub struct Orchestrator<S> {
    engine: RuleEngine,
    catalogue: SeverityCatalogue,
    recorder: MetricsRecorder<S>,
    state: RunState,
}

impl<S: CounterStore> Orchestrator<S> {
    pub fn new(store: S) -> Self {
        Self {
            engine: RuleEngine::new(),
            catalogue: SeverityCatalogue::builtin(),
            recorder: MetricsRecorder::new(store),
            state: RunState::Idle,
        }
    }

    pub fn with_catalogue(mut self, catalogue: SeverityCatalogue) -> Self {
        self.catalogue = catalogue;
        self
    }

    pub fn run(mut self, options: &RunOptions) -> RunOutcome {
        if options.metrics_only {
            self.transition(RunState::ReportOnly);
            return RunOutcome {
                exit_code: 0,
                output: self.recorder.report_cumulative(),
                state: self.state,
                assessment: None,
            };
        }

        match self.scan(options) {
            Ok((assessment, output)) => {
                self.transition(RunState::Done);
                RunOutcome {
                    exit_code: if assessment.is_blocking() { 1 } else { 0 },
                    output,
                    state: self.state,
                    assessment: Some(assessment),
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "run failed");
                self.transition(RunState::Failed(e.to_string()));
                RunOutcome {
                    exit_code: e.exit_code(),
                    output: format!("Error: {}\n", e),
                    state: self.state,
                    assessment: None,
                }
            }
        }
    }

    fn scan(&mut self, options: &RunOptions) -> Result<(Assessment, String)> {
        self.transition(RunState::Loading);
        let input = options.input.as_deref().ok_or_else(|| {
            GuardError::Input("no input document given; pass --file <path>".into())
        })?;
        check_input_path(input, options.allow_unsafe_paths)?;
        let document = load_document(input)?;

        self.transition(RunState::Evaluating);
        let findings = self.engine.evaluate(&document);

        self.transition(RunState::Aggregating);
        let assessment = aggregate(&findings, &self.catalogue)?;

        self.transition(RunState::Recording);
        if options.record_metrics {
            if let Err(e) = self.recorder.record_run(assessment.counts()) {
                tracing::warn!(error = %e, "could not record run metrics, continuing");
            }
        }

        self.transition(RunState::Rendering);
        if let Some(path) = &options.output_file {
            output::persist(&assessment, path)?;
        }
        let rendered = output::render(&assessment, options.format)?;

        Ok((assessment, rendered))
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!(from = ?self.state, to = ?next, "run state");
        self.state = next;
    }
}

/// Run once with the given store.
pub fn run<S: CounterStore>(options: &RunOptions, store: S) -> RunOutcome {
    Orchestrator::new(store).run(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{MemoryStore, EXECUTIONS_KEY, HIGH_KEY};
    use crate::rules::{Category, Severity};

    fn fixture(name: &str) -> Option<PathBuf> {
        Some(PathBuf::from(format!("tests/fixtures/{}", name)))
    }

    #[test]
    fn metrics_only_skips_scanning() {
        let store = MemoryStore::new();
        let outcome = run(
            &RunOptions {
                metrics_only: true,
                input: fixture("does-not-exist.yaml"),
                ..Default::default()
            },
            &store,
        );
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.state, RunState::ReportOnly);
        assert!(outcome.output.contains("Total executions: 0"));
        assert_eq!(store.read(EXECUTIONS_KEY).unwrap(), None);
    }

    #[test]
    fn missing_input_fails_while_loading() {
        let outcome = run(&RunOptions::default(), MemoryStore::new());
        assert_eq!(outcome.exit_code, 1);
        assert!(outcome.state.is_failed());
        assert!(outcome.output.starts_with("Error: Input error"));
    }

    #[test]
    fn unsafe_path_is_rejected_before_reading() {
        let outcome = run(
            &RunOptions {
                input: Some(PathBuf::from("../outside.yaml")),
                ..Default::default()
            },
            MemoryStore::new(),
        );
        assert_eq!(outcome.exit_code, 1);
        assert!(outcome.output.contains("path traversal"));
    }

    #[test]
    fn parse_failure_is_fatal() {
        let outcome = run(
            &RunOptions {
                input: fixture("malformed.yaml"),
                ..Default::default()
            },
            MemoryStore::new(),
        );
        assert_eq!(outcome.exit_code, 1);
        assert!(outcome.state.is_failed());
        assert!(outcome.assessment.is_none());
    }

    #[test]
    fn store_failure_does_not_fail_the_run() {
        let store = MemoryStore::new().failing_at(0);
        let outcome = run(
            &RunOptions {
                input: fixture("compliant.yaml"),
                ..Default::default()
            },
            &store,
        );
        assert_eq!(outcome.state, RunState::Done);
        assert_eq!(outcome.exit_code, 0);
    }

    #[test]
    fn successful_run_records_metrics() {
        let store = MemoryStore::new();
        let outcome = run(
            &RunOptions {
                input: fixture("insecure_users.yaml"),
                ..Default::default()
            },
            &store,
        );
        assert_eq!(outcome.exit_code, 1);
        assert_eq!(store.read(EXECUTIONS_KEY).unwrap().as_deref(), Some("1"));
        assert_eq!(store.read(HIGH_KEY).unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn recording_can_be_disabled() {
        let store = MemoryStore::new();
        run(
            &RunOptions {
                input: fixture("insecure_users.yaml"),
                record_metrics: false,
                ..Default::default()
            },
            &store,
        );
        assert_eq!(store.read(EXECUTIONS_KEY).unwrap(), None);
    }

    #[test]
    fn output_file_failure_is_fatal_even_without_findings() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = run(
            &RunOptions {
                input: fixture("compliant.yaml"),
                output_file: Some(dir.path().join("no-such-dir").join("report.md")),
                ..Default::default()
            },
            MemoryStore::new(),
        );
        assert_eq!(outcome.exit_code, 1);
        assert!(outcome.state.is_failed());
        assert!(outcome.output.contains("Output error"));
    }

    #[test]
    fn missing_catalogue_entry_aborts() {
        let catalogue = SeverityCatalogue::from_entries([(Category::NoHttps, Severity::High)]);
        let outcome = Orchestrator::new(MemoryStore::new())
            .with_catalogue(catalogue)
            .run(&RunOptions {
                input: fixture("insecure_users.yaml"),
                ..Default::default()
            });
        assert_eq!(outcome.exit_code, 1);
        assert!(outcome.output.contains("Configuration error"));
    }
}
