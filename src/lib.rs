// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) uses these modules to run the interactive session.
//
// Module responsibilities:
// - `path`: maps local paths under the library root to the server's
//   library-relative folder paths.
// - `resolver`: walks the server's folder view and collects every asset
//   ID under a folder, without duplicates.
// - `albums`: lists, finds and creates albums.
// - `mutator`: adds a resolved asset set to an album, honouring dry-run.
// - `api`: the `ImmichApi` trait and its blocking HTTP client.
// - `config`, `error`, `model`: session configuration, the error
//   taxonomy and shared domain types.
// - `ui`: the terminal prompts. Nothing else performs interactive I/O,
//   so the core can be driven (and tested) without a terminal.
pub mod albums;
pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod mutator;
pub mod path;
pub mod resolver;
pub mod ui;

#[cfg(test)]
mod fake;

pub use error::{Error, Result};
