/// Batch orchestrator
///
/// Drives names through the acquisition client one at a time, persists
/// every record, logs errors, and tallies outcomes.

use crate::core::client::AcquisitionClient;
use crate::core::retry::Sleeper;
use crate::error::Result;
use crate::store::{ErrorLog, Record, ResultTable};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// How a single lookup ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No error indicator on the record
    Success,
    /// The service answered, but the answer carries an error indicator
    Partial,
    /// No usable answer; the record is a fallback
    Failure,
}

impl Outcome {
    pub fn classify(record: &Record) -> Self {
        if record.is_fallback() {
            Outcome::Failure
        } else if record.error().is_some() {
            Outcome::Partial
        } else {
            Outcome::Success
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Outcome::Success => "success",
            Outcome::Partial => "partial",
            Outcome::Failure => "failure",
        };
        write!(f, "{}", s)
    }
}

/// Per-name line of a batch report
#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    pub project_name: String,
    pub outcome: Outcome,
    pub message: String,
    #[serde(skip)]
    pub record: Record,
}

/// Counts plus one report per processed name
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub success: usize,
    pub partial: usize,
    pub failure: usize,
    pub details: Vec<ItemReport>,
    /// Stopped before the input ran out
    pub cancelled: bool,
}

impl Summary {
    fn tally(&mut self, report: ItemReport) {
        match report.outcome {
            Outcome::Success => self.success += 1,
            Outcome::Partial => self.partial += 1,
            Outcome::Failure => self.failure += 1,
        }
        self.details.push(report);
    }

    pub fn processed(&self) -> usize {
        self.details.len()
    }
}

pub struct BatchOrchestrator {
    client: AcquisitionClient,
    table: ResultTable,
    errors: ErrorLog,
    sleeper: Arc<dyn Sleeper>,
    project_delay: Duration,
}

impl BatchOrchestrator {
    pub fn new(
        client: AcquisitionClient,
        table: ResultTable,
        errors: ErrorLog,
        sleeper: Arc<dyn Sleeper>,
        project_delay: Duration,
    ) -> Self {
        Self {
            client,
            table,
            errors,
            sleeper,
            project_delay,
        }
    }

    pub fn table(&self) -> &ResultTable {
        &self.table
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.errors
    }

    /// Fetch, persist and classify one name
    ///
    /// The record is written whatever the outcome. Partial and failed
    /// lookups also get an error log entry. Store failures propagate.
    pub async fn process_one(&self, project_name: &str) -> Result<ItemReport> {
        let record = self.client.fetch(project_name).await;
        let outcome = Outcome::classify(&record);

        self.table.append(&record)?;

        let message = match outcome {
            Outcome::Success => "Success".to_string(),
            Outcome::Partial | Outcome::Failure => {
                let message = record
                    .error()
                    .unwrap_or_else(|| "Unknown error".to_string());
                self.errors.append_error(project_name, &message)?;
                message
            }
        };

        info!(project = project_name, outcome = %outcome, "Processed project");

        Ok(ItemReport {
            project_name: project_name.to_string(),
            outcome,
            message,
            record,
        })
    }

    /// Process every name in order
    ///
    /// Names are trimmed and empty ones skipped; duplicates are processed
    /// again. Stops at the first store error.
    pub async fn run<S: AsRef<str>>(&self, names: &[S]) -> Result<Summary> {
        self.run_until_cancelled(names, &CancellationToken::new()).await
    }

    /// Like `run`, but checks `cancel` before each name
    pub async fn run_until_cancelled<S: AsRef<str>>(
        &self,
        names: &[S],
        cancel: &CancellationToken,
    ) -> Result<Summary> {
        self.table.ensure_schema()?;

        let names: Vec<&str> = names
            .iter()
            .map(|n| n.as_ref().trim())
            .filter(|n| !n.is_empty())
            .collect();
        let total = names.len();
        let mut summary = Summary::default();

        for (i, name) in names.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(processed = summary.processed(), total, "Batch cancelled");
                summary.cancelled = true;
                break;
            }

            info!("Processing {}/{}: {}", i + 1, total, name);
            let report = self.process_one(name).await?;
            summary.tally(report);

            if i + 1 < total && !self.project_delay.is_zero() {
                self.sleeper.sleep(self.project_delay).await;
            }
        }

        info!(
            success = summary.success,
            partial = summary.partial,
            failure = summary.failure,
            "Batch finished"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::retry::{RecordingSleeper, RetryPolicy};
    use crate::error::ScoutError;
    use crate::schema::{PROJECT_NAME, SENTINEL};
    use crate::service::testing::ScriptedService;
    use std::fs;
    use tempfile::TempDir;

    struct Harness {
        _temp: TempDir,
        orchestrator: BatchOrchestrator,
        sleeper: Arc<RecordingSleeper>,
        service: Arc<ScriptedService>,
    }

    fn harness(script: Vec<Result<String>>) -> Harness {
        let temp = TempDir::new().unwrap();
        let service = Arc::new(ScriptedService::new(script));
        let sleeper = Arc::new(RecordingSleeper::new());
        let client = AcquisitionClient::new(
            service.clone(),
            sleeper.clone(),
            RetryPolicy::default(),
            "Telangana, India",
        );
        let orchestrator = BatchOrchestrator::new(
            client,
            ResultTable::new(temp.path().join("output").join("results.csv")),
            ErrorLog::new(temp.path().join("output").join("error_log.csv")),
            sleeper.clone(),
            Duration::from_secs(1),
        );

        Harness {
            _temp: temp,
            orchestrator,
            sleeper,
            service,
        }
    }

    fn timeout() -> Result<String> {
        Err(ScoutError::Transport("operation timed out".to_string()))
    }

    fn ok(json: &str) -> Result<String> {
        Ok(json.to_string())
    }

    #[tokio::test]
    async fn test_total_failure_still_writes_row_and_error() {
        let h = harness(vec![timeout(), timeout(), timeout()]);

        let report = tokio_test::assert_ok!(h.orchestrator.process_one("Lake Vista").await);

        assert_eq!(report.outcome, Outcome::Failure);
        assert!(report.message.contains("timed out"));

        let table = h.orchestrator.table().read().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, PROJECT_NAME), Some("Lake Vista"));
        assert_eq!(table.value(0, "Location"), Some(SENTINEL));

        let errors = h.orchestrator.error_log().read().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].project_name, "Lake Vista");
    }

    #[tokio::test]
    async fn test_partial_answer_without_error_key_is_success() {
        let h = harness(vec![ok(r#"{"Project Name": "X", "Location": "Hyderabad"}"#)]);

        let report = h.orchestrator.process_one("Green Meadows").await.unwrap();

        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(report.message, "Success");
        assert_eq!(report.record.project_name(), "Green Meadows");
        assert!(h.orchestrator.error_log().read().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_key_in_answer_is_partial() {
        let h = harness(vec![ok(r#"{"Location": "Narsingi", "error": "price unknown"}"#)]);

        let report = tokio_test::assert_ok!(h.orchestrator.process_one("Sky Park").await);

        assert_eq!(report.outcome, Outcome::Partial);
        assert_eq!(report.message, "price unknown");

        let table = h.orchestrator.table().read().unwrap();
        assert_eq!(table.value(0, "Location"), Some("Narsingi"));
        let errors = h.orchestrator.error_log().read().unwrap();
        assert_eq!(errors[0].message, "price unknown");
    }

    #[tokio::test]
    async fn test_run_counts_and_keeps_order() {
        let h = harness(vec![
            ok(r#"{"Location": "A"}"#),
            ok(r#"{"error": "half"}"#),
            timeout(),
            timeout(),
            timeout(),
            ok(r#"{"Location": "A again"}"#),
        ]);
        let names = ["Alpha", "  ", "Beta", "Gamma", "Alpha  "];

        let summary = h.orchestrator.run(&names).await.unwrap();

        assert_eq!((summary.success, summary.partial, summary.failure), (2, 1, 1));
        assert!(!summary.cancelled);
        let order: Vec<_> = summary.details.iter().map(|d| d.project_name.as_str()).collect();
        assert_eq!(order, vec!["Alpha", "Beta", "Gamma", "Alpha"]);

        // duplicates get their own row
        let table = h.orchestrator.table().read().unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.value(3, "Location"), Some("A again"));
        assert_eq!(h.orchestrator.error_log().read().unwrap().len(), 2);

        // two retry backoffs for Gamma, three pauses between four names
        let calls = h.sleeper.calls();
        let pauses = calls.iter().filter(|d| **d == Duration::from_secs(1)).count();
        assert_eq!(pauses, 3);
        assert_eq!(calls.len(), 5);
    }

    #[tokio::test]
    async fn test_cancel_stops_before_next_name() {
        let h = harness(vec![ok("{}"), ok("{}")]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let summary = h
            .orchestrator
            .run_until_cancelled(&["One", "Two"], &cancel)
            .await
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.processed(), 0);
        assert!(h.service.prompts().is_empty());
        // the table still exists with its header
        assert!(h.orchestrator.table().read().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let temp = TempDir::new().unwrap();
        let blocked = temp.path().join("results.csv");
        fs::create_dir(&blocked).unwrap();

        let service = Arc::new(ScriptedService::new(vec![ok("{}")]));
        let sleeper = Arc::new(RecordingSleeper::new());
        let client = AcquisitionClient::new(service, sleeper.clone(), RetryPolicy::default(), "here");
        let orchestrator = BatchOrchestrator::new(
            client,
            ResultTable::new(&blocked),
            ErrorLog::new(temp.path().join("error_log.csv")),
            sleeper,
            Duration::ZERO,
        );

        let result = orchestrator.run(&["Anything"]).await;
        assert!(matches!(result, Err(ScoutError::Io(_))));
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Partial.to_string(), "partial");
        let summary = Summary::default();
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["failure"], 0);
    }
}
