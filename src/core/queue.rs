//! Bounded submission queue and worker pool.
//!
//! Submissions wait in a fixed-capacity channel; a dispatcher runs at most
//! `workers` pipeline jobs at once. The queue belongs to the process: the
//! [`QueueHandle`] returned by [`start`] closes it and drains buffered and
//! in-flight jobs on shutdown.

use crate::config::QueueConfig;
use crate::core::pipeline::{PipelineReport, SubmissionPipeline};
use crate::domain::model::{ContactSubmission, SavedSubmission};
use crate::utils::error::{ContactError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::{JoinHandle, JoinSet};

/// Persistence outcome reported back to a waiting handler.
pub type PersistAck = oneshot::Sender<std::result::Result<SavedSubmission, String>>;

pub struct SubmissionJob {
    pub submission: ContactSubmission,
    pub ack: Option<PersistAck>,
}

impl SubmissionJob {
    pub fn new(submission: ContactSubmission) -> Self {
        Self {
            submission,
            ack: None,
        }
    }

    pub fn with_ack(submission: ContactSubmission, ack: PersistAck) -> Self {
        Self {
            submission,
            ack: Some(ack),
        }
    }
}

#[derive(Clone)]
pub struct SubmissionQueue {
    sender: mpsc::Sender<SubmissionJob>,
}

impl SubmissionQueue {
    /// Never waits: a full queue is reported to the caller instead.
    pub fn enqueue(&self, job: SubmissionJob) -> Result<()> {
        self.sender.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ContactError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => ContactError::QueueClosed,
        })
    }

    /// Free slots left in the buffer.
    pub fn remaining_capacity(&self) -> usize {
        self.sender.capacity()
    }
}

pub struct QueueHandle {
    shutdown: oneshot::Sender<()>,
    dispatcher: JoinHandle<usize>,
}

impl QueueHandle {
    /// Stops accepting submissions and waits for queued and running jobs,
    /// giving up after `timeout`. Returns how many jobs were processed over
    /// the queue's lifetime when the drain finished in time.
    pub async fn drain(self, timeout: Duration) -> Option<usize> {
        let _ = self.shutdown.send(());

        match tokio::time::timeout(timeout, self.dispatcher).await {
            Ok(Ok(processed)) => {
                tracing::info!("Submission queue drained ({} jobs processed)", processed);
                Some(processed)
            }
            Ok(Err(e)) => {
                tracing::error!("Submission dispatcher failed: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!("Submission queue did not drain within {:?}", timeout);
                None
            }
        }
    }
}

pub fn start(pipeline: Arc<SubmissionPipeline>, config: &QueueConfig) -> (SubmissionQueue, QueueHandle) {
    let (sender, receiver) = mpsc::channel(config.capacity.max(1));
    let (shutdown, shutdown_rx) = oneshot::channel();
    let workers = config.workers.max(1);

    tracing::info!(
        "Starting submission queue ({} workers, capacity {})",
        workers,
        config.capacity.max(1)
    );
    let dispatcher = tokio::spawn(dispatch(receiver, shutdown_rx, pipeline, workers));

    (
        SubmissionQueue { sender },
        QueueHandle {
            shutdown,
            dispatcher,
        },
    )
}

async fn dispatch(
    mut receiver: mpsc::Receiver<SubmissionJob>,
    mut shutdown: oneshot::Receiver<()>,
    pipeline: Arc<SubmissionPipeline>,
    workers: usize,
) -> usize {
    let permits = Arc::new(Semaphore::new(workers));
    let mut join_set: JoinSet<()> = JoinSet::new();
    let mut closing = false;
    let mut processed = 0;

    loop {
        let next = if closing {
            receiver.recv().await
        } else {
            tokio::select! {
                job = receiver.recv() => job,
                _ = &mut shutdown => {
                    // Buffered jobs are still delivered after close.
                    closing = true;
                    receiver.close();
                    continue;
                }
            }
        };

        let Some(job) = next else { break };

        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
            break;
        };
        let pipeline = Arc::clone(&pipeline);
        join_set.spawn(async move {
            let _permit = permit;
            let report = run_job(&pipeline, job).await;
            if report.saved.is_some() {
                tracing::info!("Submission processed: {}", report.summary());
            } else {
                tracing::warn!("Submission processed: {}", report.summary());
            }
        });
        processed += 1;

        while let Some(finished) = join_set.try_join_next() {
            log_join_error(finished);
        }
    }

    while let Some(finished) = join_set.join_next().await {
        log_join_error(finished);
    }

    processed
}

fn log_join_error(result: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        tracing::error!("Submission job aborted: {}", e);
    }
}

async fn run_job(pipeline: &SubmissionPipeline, job: SubmissionJob) -> PipelineReport {
    let SubmissionJob { submission, ack } = job;

    let Some(ack) = ack else {
        return pipeline.process(&submission).await;
    };

    match pipeline.persist(&submission).await {
        Ok(saved) => {
            let _ = ack.send(Ok(saved.clone()));
            let (thank_you, admin_alert) = pipeline.notify(&submission, &saved).await;
            PipelineReport {
                saved: Some(saved),
                thank_you,
                admin_alert: Some(admin_alert),
            }
        }
        Err(e) => {
            let _ = ack.send(Err(e.to_string()));
            PipelineReport {
                saved: None,
                thank_you: None,
                admin_alert: None,
            }
        }
    }
}
