use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::render::{AudioLayer, RenderPlan, VisualLayer};
use crate::time::{Fps, seconds_to_frame};
use crate::timeline::{MediaKind, NewStrip, StripContent, Timeline};

pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "aac", "flac", "ogg"];
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tga", "gif"];
/// Length given to image strips without an explicit end, and to media whose
/// duration could not be probed.
pub const DEFAULT_STILL_FRAMES: i64 = 100;
/// Audio strips this short or shorter are reported as suspicious.
const SHORT_AUDIO_FRAMES: i64 = 2;

impl MediaKind {
    /// Infers the media kind from a file extension. Unknown extensions are
    /// treated as video.
    ///
    /// # Example
    /// ```
    /// use std::path::Path;
    /// use sequencer::MediaKind;
    ///
    /// assert_eq!(MediaKind::from_path(Path::new("a/song.MP3")), MediaKind::Audio);
    /// assert_eq!(MediaKind::from_path(Path::new("logo.png")), MediaKind::Image);
    /// assert_eq!(MediaKind::from_path(Path::new("take.mov")), MediaKind::Video);
    /// ```
    pub fn from_path(path: &Path) -> Self {
        let Some(extension) = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase)
        else {
            return Self::Video;
        };

        if AUDIO_EXTENSIONS.contains(&extension.as_str()) {
            Self::Audio
        } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Self::Image
        } else {
            Self::Video
        }
    }
}

/// Request to place a media file on the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddMedia {
    pub path: PathBuf,
    /// Defaults to the file stem, made unique.
    pub name: Option<String>,
    pub channel: u32,
    pub frame_start: i64,
    /// Exclusive end frame; probed or defaulted when absent.
    pub frame_end: Option<i64>,
}

/// Result of probing one media file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbedMedia {
    pub path: PathBuf,
    pub duration_seconds: Option<f64>,
    pub has_video: bool,
    pub has_audio: bool,
}

/// Media operations the engine delegates to the outside world.
pub trait MediaBackend {
    /// Reads duration and stream layout of a media file.
    fn probe(&self, path: &Path) -> Result<ProbedMedia>;

    /// Encodes the planned timeline into `plan.output_path`.
    fn render(&self, plan: &RenderPlan) -> Result<()>;
}

/// FFmpeg CLI-backed backend used by production wiring.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegMediaBackend;

impl MediaBackend for FfmpegMediaBackend {
    fn probe(&self, path: &Path) -> Result<ProbedMedia> {
        let info = media_ffmpeg::probe_media(path)?;
        Ok(ProbedMedia {
            path: info.path,
            duration_seconds: info.duration_seconds,
            has_video: info.has_video,
            has_audio: info.has_audio,
        })
    }

    fn render(&self, plan: &RenderPlan) -> Result<()> {
        media_ffmpeg::render_timeline_mp4(&render_request(plan))?;
        Ok(())
    }
}

/// Adds one media file to the timeline and returns the strip name.
///
/// The file must exist. Image strips default to [`DEFAULT_STILL_FRAMES`]
/// frames; audio and video use the probed duration.
pub fn add_media<M>(
    timeline: &mut Timeline,
    media: &M,
    request: &AddMedia,
    fps: Fps,
) -> Result<String>
where
    M: MediaBackend + ?Sized,
{
    if !request.path.exists() {
        warn!(path = %request.path.display(), "asset missing");
        return Err(EngineError::AssetMissing(request.path.clone()));
    }

    let kind = MediaKind::from_path(&request.path);
    let name = match &request.name {
        Some(name) if timeline.contains_name(name) => {
            return Err(EngineError::name_collision(name));
        }
        Some(name) => name.clone(),
        None => timeline.unique_name(&file_stem(&request.path)),
    };

    let frame_start = request.frame_start;
    let frame_final_end = match (request.frame_end, kind) {
        (Some(frame_end), _) => frame_end,
        (None, MediaKind::Image) => frame_start + DEFAULT_STILL_FRAMES,
        (None, MediaKind::Video | MediaKind::Audio) => {
            frame_start + probed_duration_frames(media, &request.path, fps)
        }
    };
    if kind == MediaKind::Audio && frame_final_end - frame_start <= SHORT_AUDIO_FRAMES {
        warn!(
            name = %name,
            frame_start,
            frame_final_end,
            "audio strip looks suspiciously short"
        );
    }

    timeline.insert(NewStrip {
        name: name.clone(),
        channel: request.channel,
        frame_start,
        frame_final_end,
        content: StripContent::Media {
            kind,
            source_path: request.path.clone(),
            source_in: 0,
            volume: 1.0,
        },
    })?;
    debug!(
        name = %name,
        kind = ?kind,
        path = %request.path.display(),
        channel = request.channel,
        frame_start,
        frame_final_end,
        "media added"
    );
    Ok(name)
}

fn probed_duration_frames<M>(media: &M, path: &Path, fps: Fps) -> i64
where
    M: MediaBackend + ?Sized,
{
    match media.probe(path) {
        Ok(probed) => match probed.duration_seconds.map(|seconds| seconds_to_frame(seconds, fps)) {
            Some(frames) if frames > 0 => frames,
            _ => {
                warn!(
                    path = %path.display(),
                    frames = DEFAULT_STILL_FRAMES,
                    "media duration unknown, using default length"
                );
                DEFAULT_STILL_FRAMES
            }
        },
        Err(error) => {
            warn!(
                path = %path.display(),
                %error,
                frames = DEFAULT_STILL_FRAMES,
                "media probe failed, using default length"
            );
            DEFAULT_STILL_FRAMES
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "strip".to_string())
}

fn render_request(plan: &RenderPlan) -> media_ffmpeg::RenderRequest {
    let mut inputs = Vec::<media_ffmpeg::RenderInput>::new();
    let mut input_index = |path: &Path, still: bool| -> usize {
        if let Some(index) = inputs
            .iter()
            .position(|input| input.path == path && input.still == still)
        {
            return index;
        }
        inputs.push(media_ffmpeg::RenderInput {
            path: path.to_path_buf(),
            still,
        });
        inputs.len() - 1
    };

    let visual = plan
        .visual
        .iter()
        .map(|layer: &VisualLayer| media_ffmpeg::VisualLayer {
            input_index: input_index(&layer.source_path, layer.still),
            offset_frames: layer.offset_frames,
            source_in: layer.source_in,
            length_frames: layer.length_frames,
            translate_x: layer.translate_x,
            translate_y: layer.translate_y,
            rotation_degrees: layer.rotation_degrees,
        })
        .collect();
    let audio = plan
        .audio
        .iter()
        .map(|layer: &AudioLayer| media_ffmpeg::AudioLayer {
            input_index: input_index(&layer.source_path, false),
            offset_frames: layer.offset_frames,
            source_in: layer.source_in,
            length_frames: layer.length_frames,
            volume: layer.volume,
        })
        .collect();

    media_ffmpeg::RenderRequest {
        inputs,
        width: plan.width,
        height: plan.height,
        fps: plan.fps.get(),
        frame_count: plan.frame_count(),
        visual,
        audio,
        video_bitrate_kbps: plan.video_bitrate_kbps,
        audio_bitrate_kbps: plan.audio_bitrate_kbps,
        audio_channels: plan.audio_channels,
        output_path: plan.output_path.clone(),
    }
}
