//! One digest run: aggregate, dispatch, advance watermarks.

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use super::DigestAggregator;
use crate::error::AppError;
use crate::notify::{DigestDispatcher, DispatchReport};

/// The digest pipeline triggered by the cron endpoint.
#[derive(Debug, Clone)]
pub struct DigestJob {
    aggregator: DigestAggregator,
    dispatcher: DigestDispatcher,
}

impl DigestJob {
    /// Creates a new `DigestJob`.
    #[must_use]
    pub fn new(aggregator: DigestAggregator, dispatcher: DigestDispatcher) -> Self {
        Self {
            aggregator,
            dispatcher,
        }
    }

    /// Runs the pipeline as of now.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if aggregation fails. Delivery
    /// failures are reported per developer in the [`DispatchReport`].
    pub async fn run(&self) -> Result<DispatchReport, AppError> {
        self.run_at(Utc::now()).await
    }

    /// Runs the pipeline with `now` as the reference time; delivered
    /// developers get `now` as their new watermark.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if aggregation fails.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<DispatchReport, AppError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("digest_run", %run_id);
        async move {
            tracing::info!(reference_time = %now, "digest run started");
            let digests = self.aggregator.build_digests_at(now).await?;
            let report = self.dispatcher.dispatch(&digests, now).await;
            tracing::info!(
                sent = report.sent_count(),
                failed = report.failed_count(),
                "digest run finished"
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }

    /// Runs the pipeline in a background task, logging the outcome.
    pub fn spawn(&self) -> JoinHandle<()> {
        let job = self.clone();
        tokio::spawn(async move {
            if let Err(e) = job.run().await {
                tracing::error!(error = %e, "digest run aborted");
            }
        })
    }
}
