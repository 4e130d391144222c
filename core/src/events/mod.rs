pub mod handler;
pub mod processor;
pub mod signal;

pub use handler::SignalHandler;
pub use processor::EventProcessor;
pub use signal::GameSignal;
