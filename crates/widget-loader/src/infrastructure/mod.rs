//! Infrastructure layer for widget-loader.
//!
//! Adapters behind the application layer's traits.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain` and
//! `widget_core`, but MUST NOT be imported by them (tests excepted).
//!
//! # Sub-modules
//!
//! - **`domain_check`** – `DomainCheck` implementations: the remote
//!   domain-check service over `reqwest`, and a static allow-list.
//!
//! - **`host_page`** – `HostPage` implementations.  `MemoryHost` records
//!   every DOM mutation in order.

pub mod domain_check;
pub mod host_page;
