pub mod server;

pub mod bus;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod tools;

pub use crate::bus::Bus;
pub use crate::engine::{Engine, EngineError, EngineErrorKind, SharedEngine};
pub use crate::error::{CoreError, CoreResult};
pub use crate::event::CoreEvent;
pub use crate::tools::{Dispatcher, ExecutionOutcome, InvokeResponse, ToolRegistry};
