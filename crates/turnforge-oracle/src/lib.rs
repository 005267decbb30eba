mod error;
mod mock;
mod registry;

use std::time::Duration;

use serde_json::Value;

pub use error::{Error, Result};
pub use mock::{MockFailure, MockOracle};
pub use registry::{PromptRegistry, PromptTemplate, PromptVersion};

/// Token accounting reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OracleUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// A structured-output response: a JSON value the caller decodes into its
/// typed record (decode failure is the caller's malformed-output signal).
#[derive(Debug, Clone, PartialEq)]
pub struct OracleResponse {
    pub content: Value,
    pub usage: OracleUsage,
}

/// Per-call options. The deadline is a hard bound: providers must return
/// [`Error::Timeout`] rather than block past it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OracleOptions {
    pub deadline: Option<Duration>,
}

/// The opaque structured-output boundary the pipeline's LLM stages sit
/// behind. The engine never sees a provider, only this trait.
pub trait Oracle {
    fn run_structured(
        &self,
        prompt: &PromptTemplate,
        input: &Value,
        options: &OracleOptions,
    ) -> Result<OracleResponse>;
}

/// Stand-in used when no provider is configured: every call times out
/// immediately, so each pipeline stage falls back to its offline stub.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineOracle;

impl Oracle for OfflineOracle {
    fn run_structured(
        &self,
        _prompt: &PromptTemplate,
        _input: &Value,
        _options: &OracleOptions,
    ) -> Result<OracleResponse> {
        Err(Error::Timeout)
    }
}
