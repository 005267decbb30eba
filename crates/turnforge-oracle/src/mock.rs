use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;

use crate::{Error, Oracle, OracleOptions, OracleResponse, OracleUsage, PromptTemplate, Result};

/// Scripted oracle for tests: fixed responses keyed by prompt id, with a
/// call log for asserting which stages ran.
#[derive(Default)]
pub struct MockOracle {
    responses: HashMap<String, Value>,
    fail_prompts: HashMap<String, MockFailure>,
    calls: RefCell<Vec<String>>,
}

/// How a scripted prompt should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Timeout,
    Malformed,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the response for a prompt id.
    pub fn set_response(&mut self, prompt_id: &str, content: Value) {
        self.responses.insert(prompt_id.to_string(), content);
    }

    /// Script a failure for a prompt id (timeout or malformed output).
    pub fn set_failure(&mut self, prompt_id: &str, failure: MockFailure) {
        self.fail_prompts.insert(prompt_id.to_string(), failure);
    }

    /// Prompt ids called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, prompt_id: &str) -> usize {
        self.calls.borrow().iter().filter(|c| *c == prompt_id).count()
    }
}

impl Oracle for MockOracle {
    fn run_structured(
        &self,
        prompt: &PromptTemplate,
        _input: &Value,
        _options: &OracleOptions,
    ) -> Result<OracleResponse> {
        self.calls.borrow_mut().push(prompt.id.clone());

        if let Some(failure) = self.fail_prompts.get(&prompt.id) {
            return Err(match failure {
                MockFailure::Timeout => Error::Timeout,
                MockFailure::Malformed => {
                    Error::Malformed(format!("scripted malformed output for '{}'", prompt.id))
                }
            });
        }

        match self.responses.get(&prompt.id) {
            Some(content) => Ok(OracleResponse {
                content: content.clone(),
                usage: OracleUsage::default(),
            }),
            None => Err(Error::Malformed(format!(
                "no scripted response for prompt '{}'",
                prompt.id
            ))),
        }
    }
}
