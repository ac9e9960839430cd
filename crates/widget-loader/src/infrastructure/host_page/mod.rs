//! [`HostPage`](crate::application::host::HostPage) adapters.
//!
//! `MemoryHost` is the in-memory page used by the test suites and by the
//! `simulate` command.

pub mod memory;

pub use memory::{Element, HostOp, MemoryHost};
