use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::media::AddMedia;
use crate::ops::{CutArgs, Operation};
use crate::render::RenderSettings;
use crate::time::Fps;

pub const DEFAULT_OUTPUT_PATH: &str = "output/final_edit.mp4";
pub const DEFAULT_RESOLUTION_X: u32 = 1920;
pub const DEFAULT_RESOLUTION_Y: u32 = 1080;
pub const DEFAULT_VIDEO_CHANNEL: u32 = 1;
pub const DEFAULT_AUDIO_CHANNEL: u32 = 2;
pub const DEFAULT_IMAGE_CHANNEL: u32 = 5;
pub const DEFAULT_START_FRAME: i64 = 1;

/// Project document: the media to load, the edits to apply and the render
/// settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub videos: Vec<MediaEntry>,
    #[serde(default)]
    pub audios: Vec<MediaEntry>,
    #[serde(default)]
    pub images: Vec<MediaEntry>,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    #[serde(default = "default_resolution_x")]
    pub resolution_x: u32,
    #[serde(default = "default_resolution_y")]
    pub resolution_y: u32,
    #[serde(default)]
    pub fps: Fps,
    #[serde(default)]
    pub operations: Vec<Operation>,
    /// Directory relative paths resolve against; the config file's directory
    /// when loaded from disk.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// One media file listed under `videos`, `audios` or `images`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_frame: Option<i64>,
    /// Exclusive end frame, mostly used for images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_end: Option<i64>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            videos: Vec::new(),
            audios: Vec::new(),
            images: Vec::new(),
            output_path: default_output_path(),
            resolution_x: DEFAULT_RESOLUTION_X,
            resolution_y: DEFAULT_RESOLUTION_Y,
            fps: Fps::DEFAULT,
            operations: Vec::new(),
            base_dir: PathBuf::new(),
        }
    }
}

impl ProjectConfig {
    /// Reads a JSON project file. Relative paths inside it resolve against
    /// the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| EngineError::ProjectIo {
            context: "failed to read project file",
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_slice(&bytes).map_err(|source| EngineError::ProjectSerialization {
                path: path.to_path_buf(),
                source,
            })?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        debug!(
            path = %path.display(),
            videos = config.videos.len(),
            audios = config.audios.len(),
            images = config.images.len(),
            operations = config.operations.len(),
            fps = config.fps.get(),
            "project loaded"
        );
        Ok(config)
    }

    /// Writes the project as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| EngineError::ProjectIo {
                context: "failed to create project directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json =
            serde_json::to_vec_pretty(self).map_err(|source| EngineError::ProjectSerialization {
                path: path.to_path_buf(),
                source,
            })?;
        std::fs::write(path, json).map_err(|source| EngineError::ProjectIo {
            context: "failed to write project file",
            path: path.to_path_buf(),
            source,
        })
    }

    /// Example project showing every section of the format.
    pub fn example() -> Self {
        Self {
            videos: vec![MediaEntry {
                path: PathBuf::from("assets/video.mp4"),
                name: Some("video1".to_string()),
                channel: Some(1),
                start_frame: Some(1),
                frame_end: None,
            }],
            audios: vec![MediaEntry {
                path: PathBuf::from("assets/audio.mp3"),
                name: Some("audio1".to_string()),
                channel: Some(3),
                start_frame: Some(1),
                frame_end: None,
            }],
            images: vec![MediaEntry {
                path: PathBuf::from("assets/image.png"),
                name: Some("img1".to_string()),
                channel: Some(5),
                start_frame: Some(1),
                frame_end: Some(120),
            }],
            operations: vec![
                Operation::Cut(CutArgs {
                    target: "video1".to_string(),
                    start: 3.0,
                    end: 5.0,
                }),
                Operation::Transform {
                    target: "img1".to_string(),
                    translate: [100.0, 50.0],
                    rotate: 15.0,
                },
            ],
            ..Self::default()
        }
    }

    /// Resolves `path` against [`ProjectConfig::base_dir`].
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Media to add, in load order: videos, audios, then images.
    pub fn media_requests(&self) -> Vec<AddMedia> {
        let groups = [
            (&self.videos, DEFAULT_VIDEO_CHANNEL),
            (&self.audios, DEFAULT_AUDIO_CHANNEL),
            (&self.images, DEFAULT_IMAGE_CHANNEL),
        ];
        groups
            .into_iter()
            .flat_map(|(entries, default_channel)| {
                entries.iter().map(move |entry| AddMedia {
                    path: self.resolve(&entry.path),
                    name: entry.name.clone(),
                    channel: entry.channel.unwrap_or(default_channel),
                    frame_start: entry.start_frame.unwrap_or(DEFAULT_START_FRAME),
                    frame_end: entry.frame_end,
                })
            })
            .collect()
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            output_path: self.resolve(&self.output_path),
            resolution_x: self.resolution_x,
            resolution_y: self.resolution_y,
            fps: self.fps,
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

fn default_resolution_x() -> u32 {
    DEFAULT_RESOLUTION_X
}

fn default_resolution_y() -> u32 {
    DEFAULT_RESOLUTION_Y
}
