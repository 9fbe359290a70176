//! Strip timeline editing engine for scripted video sequence edits.

pub mod api;
pub mod edit;
pub mod effect;
pub mod error;
pub mod media;
pub mod ops;
pub mod project;
pub mod render;
pub mod time;
pub mod timeline;

pub use api::{Engine, EngineErrorEvent, EngineErrorKind, Event, RunReport};
pub use error::{EngineError, Result};
pub use media::{AddMedia, FfmpegMediaBackend, MediaBackend, ProbedMedia, add_media};
pub use ops::{CutArgs, ErrorClass, Operation};
pub use project::{MediaEntry, ProjectConfig};
pub use render::{RenderPlan, RenderSettings, build_render_plan};
pub use time::{Fps, frame_to_seconds, seconds_to_frame};
pub use timeline::{MediaKind, Strip, StripContent, StripId, StripKind, Timeline};
