//! Language-model gateway.
//!
//! Every vendor backend implements [`LlmBackend`]; [`LlmGateway`] wraps one backend and races
//! calls against an optional timer. Losing the race abandons the call without cancelling it.

pub mod anthropic;
pub mod errors;
pub mod gateway;
pub mod mock;
pub mod openai;
pub mod selection;
pub mod utils;
pub mod zhipu;

pub use anthropic::{AnthropicBackend, AnthropicConfig};
pub use errors::GatewayError;
pub use gateway::{ExecuteOptions, LlmBackend, LlmGateway, ResponseShape};
pub use mock::{RecordedCall, ScriptedBackend, ScriptedReply};
pub use openai::{OpenAiBackend, OpenAiConfig};
pub use selection::{
    build_backend, redact_secret, sanitize_secret, ProviderConfig, ProviderSelection,
};
pub use utils::{extract_json_object, strip_code_fence};
pub use zhipu::{ZhipuBackend, ZhipuConfig};
