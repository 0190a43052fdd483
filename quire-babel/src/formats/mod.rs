//! Format implementations
//!
//! This module contains the format implementations that convert between
//! block documents and text representations.

pub mod html;
pub mod icons;
pub mod json;
pub mod treeviz;

pub use html::{HtmlFormat, RenderOptions};
pub use json::JsonFormat;
pub use treeviz::TreevizFormat;
