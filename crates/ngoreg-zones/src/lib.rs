//! # ngoreg-zones — Zone Hierarchy Editing Rules
//!
//! Pure, synchronous rules applied while an NGO edits its intervention zones,
//! and the last check made before a list is handed to the resolver.
//!
//! - **Cascade** (`cascade.rs`): toggling a zone in the flat list. Selecting
//!   a node adds its missing ancestors; deselecting removes its descendants,
//!   never its ancestors.
//!
//! - **Validate** (`validate.rs`): rejects structural duplicates and
//!   stored-name collisions, and reports orphans as warnings.
//!
//! - **Naming** (`naming.rs`): the stored form of a list and the name each
//!   node is stored under.
//!
//! - **Session** (`session.rs`): the same toggles over a tree keyed by
//!   session-local stable keys, so renaming a parent cannot orphan its
//!   children. Exports to the flat list on demand.

pub mod cascade;
pub mod naming;
pub mod session;
pub mod validate;

pub use cascade::{
    apply_toggle, is_selected, toggle_country, toggle_department, toggle_municipality,
    toggle_region, ToggleEvent,
};
pub use naming::{
    disambiguate_municipalities, find_name_collisions, stored_form, stored_names,
    DISAMBIGUATION_SEPARATOR,
};
pub use session::{LocalKey, SessionError, ZoneSession};
pub use validate::{find_duplicates, validate, ValidationReport};
