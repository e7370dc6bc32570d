use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::GatewayError;
use crate::gateway::{ExecuteOptions, LlmBackend};

/// One scripted outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    Text(String),
    Fail(String),
    Delayed(Duration, String),
    /// Never completes.
    Hang,
}

impl ScriptedReply {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }
}

/// What the backend was asked.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub response_shape: Option<String>,
    pub timeout: Option<Duration>,
    pub prefill: Option<String>,
}

/// Deterministic backend used for tests and offline development.
///
/// Replies are consumed in order; once the script runs out the `repeat` reply (if any) is used,
/// otherwise calls fail.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<ScriptedReply>>,
    repeat: Option<ScriptedReply>,
    calls: Mutex<Vec<RecordedCall>>,
    completed: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn texts<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(replies.into_iter().map(|text| ScriptedReply::Text(text.into())))
    }

    /// Same reply for every call.
    pub fn always(reply: ScriptedReply) -> Self {
        Self {
            repeat: Some(reply),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Calls that ran to completion, including ones whose caller stopped waiting.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> Option<ScriptedReply> {
        self.script
            .lock()
            .pop_front()
            .or_else(|| self.repeat.clone())
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    fn label(&self) -> &'static str {
        "mock"
    }

    async fn complete(
        &self,
        prompt: &str,
        options: &ExecuteOptions,
    ) -> Result<String, GatewayError> {
        self.calls.lock().push(RecordedCall {
            prompt: prompt.to_string(),
            system_prompt: options.system_prompt.clone(),
            response_shape: options.response_shape.as_ref().map(|s| s.name.clone()),
            timeout: options.timeout,
            prefill: options.prefill.clone(),
        });

        let result = match self.next_reply() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Fail(message)) => Err(GatewayError::Scripted(message)),
            Some(ScriptedReply::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Some(ScriptedReply::Hang) => std::future::pending().await,
            None => Err(GatewayError::Scripted("no scripted reply left".to_string())),
        };
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}
