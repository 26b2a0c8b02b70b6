//! Inbound ports (driving side): operations exposed to bot commands and the CLI.

pub mod subscription;
