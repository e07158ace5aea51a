//! In-process message bus between the background and its contexts

pub mod bus;

pub use bus::{BusClient, MessageBus};
