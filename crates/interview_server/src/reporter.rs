//! Result reporter: persists a finished session and notifies the professor.
//!
//! The hand-off runs as a one-shot tokio task. A [`ReportGuard`] stored
//! beside each session makes sure it runs at most once per finished
//! session (`Idle → Sending → Delivered | Failed`); only an explicit
//! re-send leaves `Failed`, and a session that was already persisted is
//! never written twice. Failures are turned into warnings and never touch
//! the computed result.

use std::sync::Arc;

use derive_getters::Getters;
use interview_core::{Scorecard, StudentInfo};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, instrument, warn};

use crate::db::{DbError, NewStudentResult, ResultRepository};
use crate::notify::{NotificationRequest, Notifier};

/// Append-only destination of finished sessions.
pub trait ResultSink: Send + Sync {
    /// Stores one finished session.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the record could not be stored.
    fn persist(&self, record: NewStudentResult) -> Result<(), DbError>;
}

impl ResultSink for ResultRepository {
    fn persist(&self, record: NewStudentResult) -> Result<(), DbError> {
        self.record_result(record).map(|_| ())
    }
}

/// Delivery state of a session's report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DeliveryStatus {
    /// Nothing sent yet.
    #[default]
    Idle,
    /// The report task is running.
    Sending,
    /// The professor was notified.
    Delivered {
        /// Non-fatal problems, such as a failed database write.
        warnings: Vec<String>,
    },
    /// The notification did not go through.
    Failed {
        /// What went wrong.
        warnings: Vec<String>,
    },
}

/// Per-session guard for the one-shot report.
#[derive(Debug, Clone, Default, Getters)]
pub struct ReportGuard {
    status: DeliveryStatus,
    persisted: bool,
    /// Bumped on restart so a late task cannot touch the new game.
    generation: u64,
}

impl ReportGuard {
    /// Claims the first delivery. Returns false if a report already started.
    #[instrument(skip(self), fields(status = ?self.status))]
    pub fn begin(&mut self) -> bool {
        if self.status != DeliveryStatus::Idle {
            debug!("Report already started");
            return false;
        }
        self.status = DeliveryStatus::Sending;
        true
    }

    /// Claims a re-send. Only allowed after a failed delivery.
    #[instrument(skip(self), fields(status = ?self.status))]
    pub fn begin_resend(&mut self) -> bool {
        if !matches!(self.status, DeliveryStatus::Failed { .. }) {
            debug!("Nothing to re-send");
            return false;
        }
        self.status = DeliveryStatus::Sending;
        true
    }

    /// Records the outcome of the report task started in `generation`.
    ///
    /// Returns false, and changes nothing, for an outdated generation.
    pub fn complete(&mut self, generation: u64, outcome: DeliveryOutcome) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "Ignoring outdated report");
            return false;
        }
        self.persisted |= outcome.persisted;
        self.status = if outcome.notified {
            DeliveryStatus::Delivered {
                warnings: outcome.warnings,
            }
        } else {
            DeliveryStatus::Failed {
                warnings: outcome.warnings,
            }
        };
        true
    }

    /// Forgets everything, for a restarted session.
    pub fn reset(&mut self) {
        *self = Self {
            generation: self.generation + 1,
            ..Self::default()
        };
    }
}

/// Everything the report task needs, captured at the terminal transition.
#[derive(Debug, Clone, Getters)]
pub struct ReportJob {
    session_id: String,
    generation: u64,
    student: StudentInfo,
    scorecard: Scorecard,
    already_persisted: bool,
}

impl ReportJob {
    /// Creates a job for a finished session, capturing the guard's state.
    pub fn new(
        session_id: impl Into<String>,
        guard: &ReportGuard,
        student: StudentInfo,
        scorecard: Scorecard,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            generation: guard.generation,
            student,
            scorecard,
            already_persisted: guard.persisted,
        }
    }
}

/// What the report task achieved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct DeliveryOutcome {
    persisted: bool,
    notified: bool,
    warnings: Vec<String>,
}

/// Persists finished sessions and notifies the professor.
#[derive(Clone)]
pub struct ResultReporter {
    sink: Arc<dyn ResultSink>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for ResultReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultReporter").finish_non_exhaustive()
    }
}

impl ResultReporter {
    /// Creates a reporter over the given collaborators.
    pub fn new(sink: Arc<dyn ResultSink>, notifier: Arc<dyn Notifier>) -> Self {
        Self { sink, notifier }
    }

    /// Runs the hand-off for `job`: persist (unless already done), then notify.
    #[instrument(skip(self, job), fields(session_id = %job.session_id, score = job.scorecard.score()))]
    pub async fn deliver(&self, job: ReportJob) -> DeliveryOutcome {
        let mut outcome = DeliveryOutcome {
            persisted: job.already_persisted,
            ..DeliveryOutcome::default()
        };

        if !job.already_persisted {
            let record = NewStudentResult::from_scorecard(
                &job.session_id,
                job.generation,
                &job.student,
                &job.scorecard,
            );
            let sink = Arc::clone(&self.sink);
            match tokio::task::spawn_blocking(move || sink.persist(record)).await {
                Ok(Ok(())) => {
                    info!("Result persisted");
                    outcome.persisted = true;
                }
                Ok(Err(e)) if e.is_duplicate() => {
                    debug!("Result was already persisted");
                    outcome.persisted = true;
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "Failed to persist result");
                    outcome.warnings.push(format!("Résultats non sauvegardés : {}", e.message));
                }
                Err(e) => {
                    warn!(error = %e, "Persistence task aborted");
                    outcome.warnings.push(format!("Résultats non sauvegardés : {}", e));
                }
            }
        }

        let request = NotificationRequest::from_scorecard(&job.student, &job.scorecard);
        match self.notifier.notify(&request).await {
            Ok(()) => {
                info!("Professor notified");
                outcome.notified = true;
            }
            Err(e) => {
                warn!(error = %e, "Professor notification failed");
                outcome.warnings.push(format!("Email non envoyé : {}", e));
            }
        }
        outcome
    }

    /// Spawns [`Self::deliver`] and hands the job's generation and the
    /// outcome to `on_done`.
    pub fn spawn<F>(&self, job: ReportJob, on_done: F) -> JoinHandle<()>
    where
        F: FnOnce(u64, DeliveryOutcome) + Send + 'static,
    {
        let reporter = self.clone();
        let generation = job.generation;
        let span = info_span!("report", session_id = %job.session_id, generation);
        tokio::spawn(
            async move {
                let outcome = reporter.deliver(job).await;
                on_done(generation, outcome);
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_runs_once() {
        let mut guard = ReportGuard::default();
        assert!(guard.begin());
        assert!(!guard.begin());
        assert!(!guard.begin_resend());
    }

    #[test]
    fn failed_delivery_can_be_resent_once() {
        let mut guard = ReportGuard::default();
        guard.begin();
        guard.complete(0, DeliveryOutcome {
            persisted: true,
            notified: false,
            warnings: vec!["Email non envoyé".to_string()],
        });
        assert!(*guard.persisted());
        assert!(matches!(guard.status(), DeliveryStatus::Failed { .. }));

        assert!(guard.begin_resend());
        assert!(!guard.begin_resend());
        guard.complete(0, DeliveryOutcome {
            persisted: false,
            notified: true,
            warnings: Vec::new(),
        });
        assert!(*guard.persisted(), "persisted flag never goes back");
        assert_eq!(
            guard.status(),
            &DeliveryStatus::Delivered {
                warnings: Vec::new()
            }
        );
        assert!(!guard.begin_resend());
    }

    #[test]
    fn reset_allows_a_new_report() {
        let mut guard = ReportGuard::default();
        guard.begin();
        guard.reset();
        assert!(guard.begin());
    }

    #[test]
    fn late_outcome_after_reset_is_ignored() {
        let mut guard = ReportGuard::default();
        guard.begin();
        guard.reset();
        let applied = guard.complete(
            0,
            DeliveryOutcome {
                persisted: true,
                notified: true,
                warnings: Vec::new(),
            },
        );
        assert!(!applied);
        assert_eq!(guard.status(), &DeliveryStatus::Idle);
        assert!(!*guard.persisted());
    }
}
