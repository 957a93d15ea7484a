//! Scripted status source for poll loop tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use valwatch_client::{ClientError, ProgressSource};
use valwatch_core::domain::run::{JobStatus, RunId, RunState};

/// One scripted answer to a progress fetch
#[derive(Debug, Clone)]
pub enum Reply {
    Status(JobStatus),
    /// Non-success envelope
    Rejected,
    /// Non-2xx HTTP status
    HttpError(u16),
}

impl Reply {
    fn into_result(self) -> Result<JobStatus, ClientError> {
        match self {
            Reply::Status(status) => Ok(status),
            Reply::Rejected => Err(ClientError::Rejected {
                status: "error".to_string(),
                message: None,
            }),
            Reply::HttpError(code) => Err(ClientError::api_error(code, "scripted failure")),
        }
    }
}

/// Answers fetches from a script, repeating the last reply once exhausted
pub struct ScriptedSource {
    replies: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    fetched: Mutex<Vec<String>>,
    cancels: AtomicUsize,
    reject_cancels: AtomicBool,
}

impl ScriptedSource {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            fetched: Mutex::new(Vec::new()),
            cancels: AtomicUsize::new(0),
            reject_cancels: AtomicBool::new(false),
        })
    }

    pub fn reject_cancels(&self) {
        self.reject_cancels.store(true, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }

    pub fn fetched_ids(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProgressSource for ScriptedSource {
    async fn fetch_progress(&self, run_id: &RunId) -> Result<JobStatus, ClientError> {
        self.fetched.lock().unwrap().push(run_id.to_string());

        let next = self.replies.lock().unwrap().pop_front();
        let reply = match next {
            Some(reply) => {
                *self.last.lock().unwrap() = Some(reply.clone());
                reply
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or(Reply::Rejected),
        };
        reply.into_result()
    }

    async fn cancel_run(&self, _run_id: &RunId) -> Result<(), ClientError> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        if self.reject_cancels.load(Ordering::SeqCst) {
            return Err(ClientError::Rejected {
                status: "error".to_string(),
                message: Some("run is not cancellable".to_string()),
            });
        }
        Ok(())
    }
}

pub fn running(progress: f64, step: &str) -> JobStatus {
    JobStatus::running(progress, step)
}

pub fn completed(score: f64, final_status: &str) -> JobStatus {
    JobStatus {
        progress: 100.0,
        current_step: "Storing Results".to_string(),
        status: RunState::Completed,
        current_check: Some(24),
        total_checks: Some(24),
        overall_score: Some(score),
        error: None,
        final_status: Some(final_status.to_string()),
    }
}
