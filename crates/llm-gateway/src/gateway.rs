use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use schemars::JsonSchema;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::GatewayError;

/// Structural constraint on the model's output: a named JSON schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseShape {
    pub name: String,
    pub schema: Value,
}

impl ResponseShape {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// Shape derived from a `JsonSchema` type.
    pub fn of<T: JsonSchema>(name: impl Into<String>) -> Self {
        let mut schema = serde_json::to_value(schemars::schema_for!(T)).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut schema {
            map.remove("$schema");
            map.remove("title");
        }
        Self::new(name, schema)
    }

    pub fn pretty_schema(&self) -> String {
        serde_json::to_string_pretty(&self.schema).unwrap_or_else(|_| self.schema.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    pub system_prompt: Option<String>,
    pub response_shape: Option<ResponseShape>,
    /// Race bound. `None` waits for the backend (and its HTTP client timeout).
    pub timeout: Option<Duration>,
    /// Forced start of the assistant turn, for backends that support prefill.
    pub prefill: Option<String>,
}

impl ExecuteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_response_shape(mut self, shape: ResponseShape) -> Self {
        self.response_shape = Some(shape);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_prefill(mut self, prefill: impl Into<String>) -> Self {
        self.prefill = Some(prefill.into());
        self
    }
}

#[async_trait]
pub trait LlmBackend: Send + Sync {
    fn label(&self) -> &'static str;

    /// One completion for `prompt`. Prefill, when honoured, is part of the returned text.
    async fn complete(&self, prompt: &str, options: &ExecuteOptions)
        -> Result<String, GatewayError>;
}

#[derive(Clone)]
pub struct LlmGateway {
    backend: Arc<dyn LlmBackend>,
}

impl LlmGateway {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_label(&self) -> &'static str {
        self.backend.label()
    }

    /// Run one model call, racing it against `options.timeout` when set.
    ///
    /// The first result wins. A call that loses the race keeps running in the background and its
    /// eventual result is logged at debug level and dropped.
    pub async fn execute(
        &self,
        prompt: &str,
        options: &ExecuteOptions,
    ) -> Result<String, GatewayError> {
        let backend_label = self.backend.label();
        let started = Instant::now();

        let Some(limit) = options.timeout else {
            let result = self.backend.complete(prompt, options).await;
            log_outcome(backend_label, started, &result);
            return result;
        };

        let backend = Arc::clone(&self.backend);
        let owned_prompt = prompt.to_string();
        let owned_options = options.clone();
        let mut call =
            tokio::spawn(async move { backend.complete(&owned_prompt, &owned_options).await });

        match tokio::time::timeout(limit, &mut call).await {
            Ok(Ok(result)) => {
                log_outcome(backend_label, started, &result);
                result
            }
            Ok(Err(join_err)) => Err(GatewayError::transport(
                backend_label,
                format!("model task failed: {join_err}"),
            )),
            Err(_) => {
                let after_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                warn!(backend = backend_label, after_ms, "model call lost the timeout race");
                tokio::spawn(async move {
                    match call.await {
                        Ok(Ok(text)) => debug!(
                            backend = backend_label,
                            chars = text.len(),
                            "discarding late model response"
                        ),
                        Ok(Err(err)) => {
                            debug!(backend = backend_label, %err, "late model call failed")
                        }
                        Err(err) => debug!(backend = backend_label, %err, "late model task ended"),
                    }
                });
                Err(GatewayError::Timeout { after_ms })
            }
        }
    }
}

fn log_outcome(backend: &'static str, started: Instant, result: &Result<String, GatewayError>) {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(text) => debug!(backend, elapsed_ms, chars = text.len(), "model call completed"),
        Err(err) => debug!(backend, elapsed_ms, %err, "model call failed"),
    }
}

impl std::fmt::Debug for LlmGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmGateway")
            .field("backend", &self.backend.label())
            .finish()
    }
}
