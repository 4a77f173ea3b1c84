// Workspace module
// The state container driving select -> edit -> use

#![allow(clippy::module_inception)]

pub mod notice;
pub mod phase;
pub mod workspace;

pub use notice::Notice;
pub use phase::SessionPhase;
pub use workspace::{Preview, Workspace};
