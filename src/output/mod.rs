//! Output formatters for session summaries.
//!
//! - Text for humans, styled with yansi
//! - JSON for scripting
//!
//! Both render a [`SessionSummary`], a serializable snapshot of a
//! [`SessionContext`](crate::session::SessionContext) with secrets left out.

pub mod json;
pub mod text;

pub use json::{JsonOutput, SessionSummary};
pub use text::TextOutput;
