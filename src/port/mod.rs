//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │       Application       │
//!     ┌──────────────┤  relay, dedup, dispatch ├──────────────┐
//!     │              └────────────┬────────────┘              │
//!     ▼                           ▼                           ▼
//! ┌─────────┐              ┌─────────────┐             ┌───────────┐
//! │  Bus    │              │ Subscriber  │             │ Messenger │
//! │ Adapter │              │ Persistence │             │  Adapter  │
//! └─────────┘              └─────────────┘             └───────────┘
//! ```
//!
//! - [`outbound`] - dependencies the relay drives (bus, messenger, storage,
//!   formatting, deduplication)
//! - [`inbound`] - operations exposed to command surfaces (bot commands, CLI)

pub mod inbound;
pub mod outbound;
