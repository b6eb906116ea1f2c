//! # Hanna Architecture
//!
//! Hanna manages **named, reusable code snippets** ("Hanna codes") that a host page expands
//! wherever a bracketed tag such as `[hanna name="greeting" first_name="Karena"]` appears.
//! Each snippet is markup, script or server-side program code, may be flagged as not consuming
//! its output, and carries default attributes that call sites can override.
//!
//! This crate is the storage and modeling core. Tag scanning and execution belong to the host;
//! it only needs [`commands::prepare`] to get a snippet and its effective attributes.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs, cli/)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One `run` per operation, returning `CmdResult`           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Repository (repository.rs)                                 │
//! │  - Packs/unpacks attribute blocks, resolves name collisions │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract SnippetStore trait                              │
//! │  - SqliteStore (production), InMemoryStore (testing)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stored Form
//!
//! A snippet's default attributes live inside its stored code text, in a comment block in front
//! of the body (see [`block`]). The `type` column is a small integer: the base kind in the low
//! two bits, "not consuming" in bit 4 (see [`model`]).
//!
//! ## No I/O in the Core
//!
//! From `api.rs` inward, code takes Rust arguments, returns Rust types and never prints or
//! exits. Warnings come back as data (`CmdMessage`, `SaveReport::warnings`) and are also
//! emitted through `tracing`.
//!
//! ## Testing Strategy
//!
//! 1. **Model, codec, repository, commands**: unit tests next to the code, on `InMemoryStore`
//! 2. **API**: dispatch tests
//! 3. **SQLite and CLI**: integration tests under `tests/`
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Business logic for each command
//! - [`repository`]: Persistence of snippets over a store
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: `Snippet`, `CodeKind`, `SnippetType`
//! - [`attrs`]: Ordered attribute maps
//! - [`block`]: The embedded attribute block codec
//! - [`reserved`]: Reserved attribute names
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod attrs;
pub mod block;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod reserved;
pub mod store;
