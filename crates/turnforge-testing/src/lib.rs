//! Internal fixtures and harnesses for turnforge test suites: seeded game
//! states, entity/fact factories, scripted oracle responses, and a
//! TestWorld that drives the compiled CLI against a temp store.

mod entities;
mod facts;
mod oracle;
mod state;
mod world;

pub use entities::{make_location, make_npc, make_player};
pub use facts::{make_known_fact, make_world_fact};
pub use oracle::{scripted_intent, scripted_narration};
pub use state::{
    setup_clocks, setup_combat_state, setup_investigation_state, setup_minimal_game_state,
};
pub use world::TestWorld;
