//! Block document model.
//!
//! This module defines the typed block tree shared by the migration pipeline,
//! the formats and the persistence layer, and its JSON wire shape.

pub mod nodes;
pub mod wire;
