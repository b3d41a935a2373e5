//! Section screens for the console.
//!
//! Screens hold only cursor state. Everything they draw comes from the
//! presenter's [`crate::presenter::ViewState`], re-read every frame.

mod alignment;
mod gaps;
mod overview;

pub use alignment::{AlignmentOverlay, AlignmentScreen};
pub use gaps::{GapFlow, GapsScreen};
pub use overview::OverviewScreen;
