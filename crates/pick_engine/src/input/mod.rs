//! Input state consumed by mouse picks

pub mod pointer;

pub use pointer::{PointerState, PointerTracker, Viewport};
