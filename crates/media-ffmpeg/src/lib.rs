//! FFmpeg CLI wrappers for probing media and rendering layered timelines.

mod error;
mod probe;
mod render;

pub use error::{MediaFfmpegError, Result};
pub use probe::{MediaInfo, StreamKind, probe_media};
pub use render::{AudioLayer, RenderInput, RenderRequest, VisualLayer, render_timeline_mp4};
