//! widget-loader library crate.
//!
//! This crate runs the chat widget on a host page: it validates the chat
//! URL, mounts the iframe, relays the frame's `postMessage` commands, and
//! tears everything down on unload.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Host page (DOM, postMessage, document.cookie)
//!         ↕  HostPage trait
//! [widget-loader]
//!   ├── domain/           LoaderProfile, WidgetState
//!   ├── application/      DomainValidator, WidgetSession, cookie bridge, launcher
//!   └── infrastructure/
//!         ├── domain_check/ HTTP and allow-list implementations of DomainCheck
//!         └── host_page/    In-memory HostPage used by tests and the simulator
//!         ↕  DomainCheck trait
//! Domain-check service (HTTP)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain`, `widget-core`, and the two traits it
//!   defines (`HostPage`, `DomainCheck`).
//! - `infrastructure` implements those traits with `reqwest` and `tokio`.
//!
//! # Threading model
//!
//! A host page has one UI thread.  Every async trait here is `?Send`, shared
//! state lives in `Rc`/`RefCell`, and nothing takes a lock.

/// Domain layer: profiles and lifecycle states.
pub mod domain;

/// Application layer: validation, session lifecycle, message relay.
pub mod application;

/// Infrastructure layer: domain-check clients and host adapters.
pub mod infrastructure;
