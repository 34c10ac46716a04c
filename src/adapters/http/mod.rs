pub mod ingress;
pub mod trigger_sink;

pub use ingress::router;
pub use trigger_sink::HttpTriggerSink;
