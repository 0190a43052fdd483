//! Small pure helpers shared by the migration rules.

pub mod color;
pub mod entities;
