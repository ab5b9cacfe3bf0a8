//! # API Route Modules
//!
//! - `zones` — save, replace, read and clear the zones of one NGO.
//! - `editing` — stateless cascade toggle and validation for the form.

pub mod editing;
pub mod zones;
