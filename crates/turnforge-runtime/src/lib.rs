mod config;
mod context;
mod error;
mod orchestrator;
mod replay;
mod stages;

pub use config::{config_dir, config_path, get_api_key, load_config, save_config, set_api_key};
pub use context::ContextBuilder;
pub use error::{Error, Result};
pub use orchestrator::{Orchestrator, TurnOptions, TurnResult, DEFAULT_PROMPT_VERSIONS};
pub use replay::{replay_turns, ReplayReport, ReplayTurn};
pub use stages::{stub_interpreter_output, stub_narrator_output};
