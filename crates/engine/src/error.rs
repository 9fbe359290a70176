use std::path::PathBuf;

use thiserror::Error;

/// Result type used by the sequencer crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by timeline primitives, project loading and rendering.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("strip not found: {name}")]
    NotFound { name: String },
    #[error("frame {frame} is not inside strip {name} ({frame_start}..{frame_final_end})")]
    InvalidFrame {
        name: String,
        frame: i64,
        frame_start: i64,
        frame_final_end: i64,
    },
    #[error("invalid range {start}..{end} for strip {name} spanning {span} frames")]
    InvalidRange {
        name: String,
        start: i64,
        end: i64,
        span: i64,
    },
    #[error("strip name already in use: {name}")]
    NameCollision { name: String },
    #[error("could not identify the kept fragment while cutting {name}")]
    IntermediateFragmentNotFound { name: String },
    #[error("asset file does not exist: {}", .0.display())]
    AssetMissing(PathBuf),
    #[error("channel {channel} is occupied in frames {frame_start}..{frame_final_end}")]
    ChannelOccupied {
        channel: u32,
        frame_start: i64,
        frame_final_end: i64,
    },
    #[error("strip {name} is a {kind} strip and does not support {operation}")]
    UnsupportedStrip {
        name: String,
        kind: &'static str,
        operation: &'static str,
    },
    #[error("strip {name} would have no frames ({frame_start}..{frame_final_end})")]
    EmptyStrip {
        name: String,
        frame_start: i64,
        frame_final_end: i64,
    },
    #[error("frames per second must be positive, got {0}")]
    InvalidFps(u32),
    #[error("render finished but output is missing or empty: {}", .0.display())]
    RenderOutputMissing(PathBuf),
    #[error("{context}: {} ({source})", .path.display())]
    ProjectIo {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("project serialization/deserialization failed at {} ({source})", .path.display())]
    ProjectSerialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("media backend error: {0}")]
    Media(#[from] media_ffmpeg::MediaFfmpegError),
}

impl EngineError {
    pub(crate) fn not_found(name: &str) -> Self {
        Self::NotFound {
            name: name.to_string(),
        }
    }

    pub(crate) fn name_collision(name: &str) -> Self {
        Self::NameCollision {
            name: name.to_string(),
        }
    }
}
