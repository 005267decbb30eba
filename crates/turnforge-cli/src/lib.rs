mod args;
mod handlers;
mod output;

use anyhow::Result;

pub use args::{Cli, Commands};

pub fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::InitDb => handlers::init::handle(&cli),
        Commands::RunTurn {
            input,
            prompt_versions,
            json,
        } => handlers::run_turn::handle(&cli, input, prompt_versions.as_deref(), *json),
        Commands::ShowEvent { turn, field } => {
            handlers::show_event::handle(&cli, *turn, field.as_deref())
        }
        Commands::Replay {
            start,
            end,
            prompt_overrides,
        } => handlers::replay::handle(&cli, *start, *end, prompt_overrides.as_deref()),
    }
}
