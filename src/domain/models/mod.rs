pub mod component;
pub mod component_state;
pub mod config;
pub mod phase_state;
pub mod user;

pub use component::{Component, ComponentName, ComponentType};
pub use component_state::{ComponentState, PhaseId};
pub use config::{Config, ScheduleConfig};
pub use phase_state::{ControllerState, PhaseStateTag, Transition};
pub use user::{ActivityGroup, DayPart, User, UserPreferences};
