//! Page and frame types.
//!
//! This module contains:
//! - [`Frame`] - Read-only view of one frame
//! - `ActivePage` - The mutable tail page of a frame store

mod frame;
#[allow(clippy::module_inception)]
mod page;

pub use frame::Frame;
pub(crate) use page::ActivePage;
