//! fleetprobe-exec: command transport for status queries
//!
//! Provides the `CommandRunner` trait plus local and SSH implementations
//! used by the poller to issue status-query commands.

pub mod error;
pub mod keys;
pub mod local;
pub mod output;
pub mod ssh;
pub mod traits;

pub use error::TransportError;
pub use keys::{KeySource, ResolvedKey};
pub use local::LocalRunner;
pub use output::{CommandOutput, SshTarget};
pub use ssh::{SshRunner, SshRunnerBuilder};
pub use traits::CommandRunner;
