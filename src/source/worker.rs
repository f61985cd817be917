//! Dedicated thread that owns an instrumentation source
//!
//! COM interfaces are bound to the thread that created them, so the source is
//! built and used on one worker thread and async callers talk to it through a
//! channel. If the source cannot be opened, the failure is returned to the
//! caller and the next request tries again.

use super::{InstrumentationSource, QueryError};
use std::sync::mpsc;
use std::thread::JoinHandle;
use tokio::sync::oneshot;

type Job = Box<dyn FnOnce(Result<&dyn InstrumentationSource, QueryError>) + Send>;

type Factory = Box<dyn FnMut() -> Result<Box<dyn InstrumentationSource>, QueryError> + Send>;

#[derive(Debug)]
pub struct SourceWorker {
    job_tx: Option<mpsc::Sender<Job>>,
    worker_handle: Option<JoinHandle<()>>,
}

impl SourceWorker {
    /// Start the worker; `factory` runs on the worker thread
    pub fn spawn<F>(factory: F) -> Self
    where
        F: FnMut() -> Result<Box<dyn InstrumentationSource>, QueryError> + Send + 'static,
    {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let mut factory: Factory = Box::new(factory);

        let worker_handle = std::thread::spawn(move || {
            let mut source: Option<Box<dyn InstrumentationSource>> = None;

            while let Ok(job) = job_rx.recv() {
                if source.is_none() {
                    match factory() {
                        Ok(s) => {
                            tracing::info!("Instrumentation source opened");
                            source = Some(s);
                        }
                        Err(e) => {
                            tracing::warn!("Failed to open instrumentation source: {}", e);
                            job(Err(e));
                            continue;
                        }
                    }
                }

                if let Some(s) = source.as_deref() {
                    job(Ok(s));
                }
            }

            tracing::debug!("Source worker exiting");
        });

        Self {
            job_tx: Some(job_tx),
            worker_handle: Some(worker_handle),
        }
    }

    /// Run `f` against the source on the worker thread
    pub async fn with_source<T, F>(&self, f: F) -> Result<T, QueryError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn InstrumentationSource) -> Result<T, QueryError> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |source: Result<&dyn InstrumentationSource, QueryError>| {
            let _ = reply_tx.send(source.and_then(f));
        });

        self.job_tx
            .as_ref()
            .ok_or(QueryError::Worker)?
            .send(job)
            .map_err(|_| QueryError::Worker)?;

        reply_rx.await.map_err(|_| QueryError::Worker)?
    }
}

impl Drop for SourceWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        self.job_tx.take();
        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.join();
        }
    }
}
