pub mod clock;
pub mod component_repository;
pub mod component_state_repository;
pub mod controller_state_repository;
pub mod task_queue;
pub mod trigger_sink;
pub mod user_repository;

pub use clock::Clock;
pub use component_repository::ComponentRepository;
pub use component_state_repository::ComponentStateRepository;
pub use controller_state_repository::ControllerStateRepository;
pub use task_queue::{TaskHandle, TaskQueue};
pub use trigger_sink::TriggerSink;
pub use user_repository::UserRepository;
