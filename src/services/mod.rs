//! The per-user intervention controller: scheduling policy, phase state
//! machine, registry, and daily tick (spec §4.4, §4.5, §4.1 — the ~45%+10%+5%
//! of the implementation budget §2 allocates to this layer).

pub mod constants;
pub mod context;
pub mod daily_tick;
pub mod enrollment;
pub mod events;
pub mod phases;
pub mod planner;
pub mod registry;

pub use context::Context;
pub use events::ControllerEvent;
pub use registry::{ControllerRegistry, SharedPorts};
