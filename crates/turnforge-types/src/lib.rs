mod context;
mod diff;
mod domain;
mod engine_event;
mod event_record;
mod id;
mod intent;
mod roll;
mod util;

pub use context::*;
pub use diff::*;
pub use domain::*;
pub use engine_event::*;
pub use event_record::*;
pub use id::*;
pub use intent::*;
pub use roll::*;
pub use util::*;
