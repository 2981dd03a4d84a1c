//! fleetprobe-publish: result publishing
//!
//! Persists collection results as state files on the controller and
//! forwards run events to the WebSocket notification bus.

pub mod bus;
pub mod error;
pub mod store;

pub use bus::BusPublisher;
pub use error::PublishError;
pub use store::StateStore;
