//! Query-session orchestration.
//!
//! One session owns the whole submit flow: the validator gate, the optional
//! upload-then-query sequencing, the dual-mode branch, polling, and the
//! "one submission at a time" rule. The implicit busy flag of the original
//! workflow is made explicit here as a state machine with guarded
//! transitions; an invalid transition is a typed error, never a panic.

use std::path::Path;

use anyhow::Context;

use crate::client::ApiClient;
use crate::config::{Config, PollingConfig};
use crate::error::{Advisory, Error, Result};
use crate::models::{Query, QueryOutcome, RequestEnvelope, SourceKind};
use crate::poll::{cancel_pair, CancelToken, ResultPoller};
use crate::present;
use crate::progress::{PollEvent, PollProgressReporter, ProgressMode};
use crate::registry::DatasetRegistry;
use crate::submit::QuerySubmitter;
use crate::validate::{validate, SubmissionForm, Verdict};

/// Orchestration state for one client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Submitting,
    Polling,
    Done,
    Failed,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Submitting => "submitting",
            SessionState::Polling => "polling",
            SessionState::Done => "done",
            SessionState::Failed => "failed",
        }
    }

    /// Whether the orchestration state machine permits `self -> next`.
    ///
    /// A new submission may start from any resting state; the in-flight
    /// states only move forward, never sideways into a second submission.
    pub fn permits(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Submitting)
                | (Done, Submitting)
                | (Failed, Submitting)
                | (Submitting, Polling)
                | (Submitting, Done)
                | (Submitting, Failed)
                | (Polling, Done)
                | (Polling, Failed)
                | (Done, Idle)
                | (Failed, Idle)
        )
    }
}

/// An ad-hoc file carried with a submission, to be turned into a one-shot
/// dataset before the compare call goes out.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Target dataset name; generated when absent.
    pub name: Option<String>,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub kind: SourceKind,
}

/// Everything a single submission attempt needs.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub text: String,
    pub dataset_names: Vec<String>,
    pub upload: Option<UploadRequest>,
}

pub struct Session {
    client: ApiClient,
    issuer_id: String,
    polling: PollingConfig,
    state: SessionState,
    /// Result of the last completed submission; replaced wholesale.
    outcome: Option<QueryOutcome>,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
            issuer_id: config.submission.issuer_id.clone(),
            polling: config.polling.clone(),
            state: SessionState::Idle,
            outcome: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The last completed result, if the session is in `Done`.
    pub fn outcome(&self) -> Option<&QueryOutcome> {
        self.outcome.as_ref()
    }

    /// Return a finished session to `Idle`.
    pub fn reset(&mut self) -> Result<()> {
        self.outcome = None;
        self.transition(SessionState::Idle)
    }

    fn transition(&mut self, next: SessionState) -> Result<()> {
        if !self.state.permits(next) {
            return Err(Error::State {
                from: self.state.name(),
                attempted: next.name(),
            });
        }
        self.state = next;
        Ok(())
    }

    /// Failure path: clear partial results so stale matches are never shown
    /// alongside an error.
    fn fail(&mut self) {
        self.outcome = None;
        self.state = SessionState::Failed;
    }

    /// Run one submission end to end: validate, create the ad-hoc dataset
    /// if requested (strictly before the compare that references it), submit,
    /// resolve the dual-mode response, and poll if the backend answered with
    /// a job. Advisories collected along the way are returned alongside the
    /// outcome; they are not failures.
    pub async fn run_query(
        &mut self,
        request: QueryRequest,
        cancel: &mut CancelToken,
        progress: &dyn PollProgressReporter,
    ) -> Result<(QueryOutcome, Vec<Advisory>)> {
        let mut advisories = Vec::new();

        // Resolve the eventual dataset set up front so an ad-hoc upload
        // counts as a selected dataset for validation.
        let ephemeral_name = request.upload.as_ref().map(|u| {
            u.name
                .clone()
                .unwrap_or_else(|| format!("adhoc-{}", uuid::Uuid::new_v4()))
        });
        let mut dataset_names = request.dataset_names.clone();
        if let Some(name) = &ephemeral_name {
            dataset_names.push(name.clone());
        }

        let form = SubmissionForm {
            query: request.text.clone(),
            dataset_names: dataset_names.clone(),
            wants_upload: request.upload.is_some(),
            file_attached: request
                .upload
                .as_ref()
                .map(|u| !u.bytes.is_empty())
                .unwrap_or(false),
            in_flight: matches!(
                self.state,
                SessionState::Submitting | SessionState::Polling
            ),
        };
        if let Verdict::Blocked(reason) = validate(&form) {
            return Err(Error::Validation(reason.to_string()));
        }

        self.transition(SessionState::Submitting)?;
        self.outcome = None;

        // Upload-then-query: the create (and its refresh) must complete
        // before the compare referencing the new name is issued.
        if let (Some(upload), Some(name)) = (&request.upload, &ephemeral_name) {
            let registry = DatasetRegistry::new(&self.client);
            let created = match upload.kind {
                SourceKind::Tabular => {
                    registry
                        .create_from_tabular(name, &upload.file_name, upload.bytes.clone(), true)
                        .await
                }
                SourceKind::Document => {
                    registry
                        .create_from_document(name, &upload.file_name, upload.bytes.clone(), true)
                        .await
                }
            };
            match created {
                Ok(report) => {
                    if report.merged {
                        advisories.push(Advisory::MergedIntoExisting { name: name.clone() });
                    }
                }
                Err(e) => {
                    self.fail();
                    return Err(e);
                }
            }
        }

        let query = Query {
            text: request.text,
            dataset_names,
            issuer_id: self.issuer_id.clone(),
        };

        progress.report(PollEvent::Submitted);
        let submitter = QuerySubmitter::new(&self.client);
        let envelope = match submitter.submit(&query).await {
            Ok(envelope) => envelope,
            Err(e) => {
                self.fail();
                return Err(e);
            }
        };

        let outcome = match envelope {
            RequestEnvelope::Immediate { summary, matches } => QueryOutcome {
                summary,
                matches,
                polled: false,
            },
            RequestEnvelope::Pending { job_id } => {
                self.transition(SessionState::Polling)?;
                let poller = ResultPoller::new(&self.client, &self.polling);
                match poller.wait_for_result(&job_id, cancel, progress).await {
                    Ok(status) => QueryOutcome {
                        summary: status.summary,
                        matches: status.matches,
                        polled: true,
                    },
                    Err(e) => {
                        self.fail();
                        return Err(e);
                    }
                }
            }
        };

        self.transition(SessionState::Done)?;
        self.outcome = Some(outcome.clone());
        Ok((outcome, advisories))
    }
}

// ============ CLI entry point ============

#[allow(clippy::too_many_arguments)]
pub async fn run_compare(
    config: &Config,
    text: &str,
    datasets: Vec<String>,
    csv: Option<&Path>,
    pdf: Option<&Path>,
    as_name: Option<String>,
    detail: Option<usize>,
    mode: ProgressMode,
) -> anyhow::Result<()> {
    let upload = match (csv, pdf) {
        (Some(_), Some(_)) => anyhow::bail!("provide at most one of --csv or --pdf"),
        (Some(path), None) => Some(read_upload(path, as_name, SourceKind::Tabular)?),
        (None, Some(path)) => Some(read_upload(path, as_name, SourceKind::Document)?),
        (None, None) => None,
    };

    let request = QueryRequest {
        text: text.to_string(),
        dataset_names: datasets,
        upload,
    };

    let mut session = Session::new(config)?;
    let (handle, mut cancel) = cancel_pair();
    // Release the poll loop on ctrl-c instead of leaking it.
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    let reporter = mode.reporter();
    match session.run_query(request, &mut cancel, reporter.as_ref()).await {
        Ok((outcome, advisories)) => {
            for advisory in &advisories {
                eprintln!("note: {}", advisory);
            }
            present::render_outcome(&outcome);

            if let Some(rank) = detail {
                let shown = present::display_window(&outcome.matches);
                match rank.checked_sub(1).and_then(|i| shown.get(i)) {
                    Some(m) => present::render_detail(m),
                    None => anyhow::bail!(
                        "no match at rank {} (showing {})",
                        rank,
                        shown.len()
                    ),
                }
            }
            Ok(())
        }
        Err(Error::Validation(message)) => {
            // Blocked locally; not a failure of the backend or the tool.
            eprintln!("{}", message);
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}

fn read_upload(
    path: &Path,
    name: Option<String>,
    kind: SourceKind,
) -> anyhow::Result<UploadRequest> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read upload file: {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());
    Ok(UploadRequest {
        name,
        file_name,
        bytes,
        kind,
    })
}
