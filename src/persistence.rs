// ABOUTME: Debounced background persistence for rapidly changing state
// ABOUTME: A tokio worker keeps the latest value and writes it after a quiet period, retrying on failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Taoist Fit Contributors

//! # Debounced Persistence
//!
//! The store performs every write immediately. Callers that update state
//! many times a second (live snapshots, the cultivation level) hand values
//! to a [`DebouncedSaver`] instead: each `schedule` replaces the pending
//! value and restarts the quiet-period timer, so only the last value of a
//! burst is written.
//!
//! A failed write is logged at `warn` and re-armed for the next cycle, up to
//! `max_retries` times, after which the value is dropped. Scheduling a new
//! value resets the retry budget.

use crate::config::PersistenceConfig;
use crate::database_plugins::MetricStore;
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use std::any::type_name;
use std::sync::Arc;
use std::time::Duration;
use taoist_core::models::{Achievement, CultivationLevel, DailySnapshot, MetricConfig};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

/// Destination for values written by a [`DebouncedSaver`]
#[async_trait]
pub trait PersistTarget<T: Send + Sync>: Send + Sync {
    /// Write `value` durably
    async fn persist(&self, value: &T) -> AppResult<()>;
}

#[async_trait]
impl<S: MetricStore + ?Sized> PersistTarget<DailySnapshot> for S {
    async fn persist(&self, value: &DailySnapshot) -> AppResult<()> {
        self.upsert_daily_snapshot(value).await
    }
}

#[async_trait]
impl<S: MetricStore + ?Sized> PersistTarget<CultivationLevel> for S {
    async fn persist(&self, value: &CultivationLevel) -> AppResult<()> {
        self.save_cultivation_level(value).await
    }
}

#[async_trait]
impl<S: MetricStore + ?Sized> PersistTarget<Vec<MetricConfig>> for S {
    async fn persist(&self, value: &Vec<MetricConfig>) -> AppResult<()> {
        self.save_metric_configs(value).await
    }
}

#[async_trait]
impl<S: MetricStore + ?Sized> PersistTarget<Vec<Achievement>> for S {
    async fn persist(&self, value: &Vec<Achievement>) -> AppResult<()> {
        self.save_achievements(value).await
    }
}

enum Command<T> {
    Schedule(T),
    Flush(oneshot::Sender<AppResult<()>>),
    Shutdown(oneshot::Sender<AppResult<()>>),
}

/// Handle to a debounced background writer
///
/// Dropping the handle closes the channel; the worker then writes any
/// pending value once and exits. Use [`DebouncedSaver::shutdown`] to wait
/// for that write and observe its result.
pub struct DebouncedSaver<T> {
    tx: mpsc::UnboundedSender<Command<T>>,
    worker: JoinHandle<()>,
}

impl<T: Send + Sync + 'static> DebouncedSaver<T> {
    /// Start the worker task; must be called inside a tokio runtime
    pub fn spawn<P>(target: Arc<P>, debounce: Duration, max_retries: u32) -> Self
    where
        P: PersistTarget<T> + ?Sized + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(target, rx, debounce, max_retries));
        Self { tx, worker }
    }

    /// Start the worker with the configured quiet period and retry budget
    pub fn from_config<P>(target: Arc<P>, config: &PersistenceConfig) -> Self
    where
        P: PersistTarget<T> + ?Sized + 'static,
    {
        Self::spawn(target, config.debounce(), config.max_retries)
    }

    /// Replace the pending value and restart the quiet-period timer
    ///
    /// # Errors
    ///
    /// Returns an internal error if the worker has stopped
    pub fn schedule(&self, value: T) -> AppResult<()> {
        self.tx
            .send(Command::Schedule(value))
            .map_err(|_| worker_stopped())
    }

    /// Write the pending value now, if any
    ///
    /// # Errors
    ///
    /// Returns the write error, or an internal error if the worker has stopped.
    /// A failed flush leaves the value armed for the next cycle.
    pub async fn flush(&self) -> AppResult<()> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Command::Flush(reply))
            .map_err(|_| worker_stopped())?;
        response.await.map_err(|_| worker_stopped())?
    }

    /// Write the pending value and stop the worker
    ///
    /// # Errors
    ///
    /// Returns the final write error, or an internal error if the worker has stopped
    pub async fn shutdown(self) -> AppResult<()> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Command::Shutdown(reply))
            .map_err(|_| worker_stopped())?;
        let result = response.await.map_err(|_| worker_stopped())?;
        self.worker
            .await
            .map_err(|e| AppError::internal(format!("persistence worker failed: {e}")))?;
        result
    }
}

fn worker_stopped() -> AppError {
    AppError::internal("persistence worker has stopped")
}

async fn write_pending<T, P>(target: &P, pending: &mut Option<T>) -> AppResult<()>
where
    T: Send + Sync,
    P: PersistTarget<T> + ?Sized,
{
    let Some(value) = pending.as_ref() else {
        return Ok(());
    };
    target.persist(value).await?;
    *pending = None;
    debug!(value_type = type_name::<T>(), "Persisted debounced value");
    Ok(())
}

async fn run_worker<T, P>(
    target: Arc<P>,
    mut rx: mpsc::UnboundedReceiver<Command<T>>,
    debounce: Duration,
    max_retries: u32,
) where
    T: Send + Sync,
    P: PersistTarget<T> + ?Sized,
{
    let mut pending: Option<T> = None;
    let mut deadline: Option<Instant> = None;
    let mut failures: u32 = 0;

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Schedule(value)) => {
                    pending = Some(value);
                    deadline = Some(Instant::now() + debounce);
                    failures = 0;
                }
                Some(Command::Flush(reply)) => {
                    let result = write_pending(&*target, &mut pending).await;
                    deadline = pending.is_some().then(|| Instant::now() + debounce);
                    // Caller may have stopped waiting
                    let _ = reply.send(result);
                }
                Some(Command::Shutdown(reply)) => {
                    let result = write_pending(&*target, &mut pending).await;
                    let _ = reply.send(result);
                    break;
                }
                None => {
                    if let Err(e) = write_pending(&*target, &mut pending).await {
                        warn!(
                            value_type = type_name::<T>(),
                            error = %e,
                            "Final debounced write failed after handle was dropped"
                        );
                    }
                    break;
                }
            },
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                match write_pending(&*target, &mut pending).await {
                    Ok(()) => {
                        deadline = None;
                        failures = 0;
                    }
                    Err(e) => {
                        failures += 1;
                        if failures > max_retries {
                            warn!(
                                value_type = type_name::<T>(),
                                attempts = failures,
                                error = %e,
                                "Dropping debounced value after repeated write failures"
                            );
                            pending = None;
                            deadline = None;
                            failures = 0;
                        } else {
                            warn!(
                                value_type = type_name::<T>(),
                                attempt = failures,
                                error = %e,
                                "Debounced write failed, retrying next cycle"
                            );
                            deadline = Some(Instant::now() + debounce);
                        }
                    }
                }
            }
        }
    }
    debug!(value_type = type_name::<T>(), "Persistence worker stopped");
}
