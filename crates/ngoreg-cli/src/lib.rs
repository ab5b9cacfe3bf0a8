//! # ngoreg-cli — Operator CLI for Intervention Zones
//!
//! Offline tooling over the same rules the API applies, for support staff
//! inspecting a zone list exported from the registration form.
//!
//! ## Subcommands
//!
//! - `toggle` — Apply one checkbox toggle with its cascade
//! - `tree` — Print a flat list as an indented hierarchy
//! - `validate` — Duplicate and orphan checks
//! - `digest` — Canonical zone-set digest
//! - `resolve` — Dry-run the persistence resolver in memory
//!
//! ## Crate Policy
//!
//! - Argument parsing lives next to each handler; `main.rs` only dispatches.
//! - Handlers write to a caller-supplied `Write` and return an exit code.
//! - No business logic here: handlers delegate to the domain crates.

pub mod check;
pub mod edit;
pub mod input;
pub mod resolve;
