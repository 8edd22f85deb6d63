//! The components module contains all shared components for our app.

mod app;
mod icons;
pub mod video_player;

pub use app::*;
pub use icons::*;
pub use video_player::{RotatePrompt, VideoPlayer};
