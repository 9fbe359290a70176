use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::time::Fps;
use crate::timeline::{MediaKind, Strip, StripContent, StripId, Timeline};

/// First rendered frame.
pub const RENDER_FRAME_START: i64 = 1;
/// Last rendered frame when the timeline holds no strips.
pub const FALLBACK_FRAME_END: i64 = 100;
/// File name appended when the output path names a directory.
pub const DEFAULT_OUTPUT_FILE: &str = "output.mp4";
pub const VIDEO_BITRATE_KBPS: u32 = 8_000;
pub const AUDIO_BITRATE_KBPS: u32 = 192;
pub const AUDIO_CHANNELS: u16 = 2;

/// Output settings for the single render of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub output_path: PathBuf,
    pub resolution_x: u32,
    pub resolution_y: u32,
    pub fps: Fps,
}

/// Everything a backend needs to encode the timeline into one file.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub output_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// First rendered frame, inclusive.
    pub frame_start: i64,
    /// Last rendered frame, inclusive.
    pub frame_end: i64,
    /// Picture layers, bottom to top.
    pub visual: Vec<VisualLayer>,
    pub audio: Vec<AudioLayer>,
    pub video_bitrate_kbps: u32,
    pub audio_bitrate_kbps: u32,
    pub audio_channels: u16,
}

impl RenderPlan {
    pub fn frame_count(&self) -> i64 {
        self.frame_end - self.frame_start + 1
    }
}

/// One picture layer clipped to the render window.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualLayer {
    pub name: String,
    pub source_path: PathBuf,
    /// Image strips hold one picture for their whole length.
    pub still: bool,
    pub channel: u32,
    /// Frames between the render start and the first visible frame.
    pub offset_frames: i64,
    pub source_in: i64,
    pub length_frames: i64,
    pub translate_x: i32,
    pub translate_y: i32,
    pub rotation_degrees: f64,
}

/// One sound layer clipped to the render window.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioLayer {
    pub name: String,
    pub source_path: PathBuf,
    pub channel: u32,
    pub offset_frames: i64,
    pub source_in: i64,
    pub length_frames: i64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Placement {
    translate_x: i32,
    translate_y: i32,
    rotation_degrees: f64,
}

impl Placement {
    fn combine(self, other: Self) -> Self {
        Self {
            translate_x: self.translate_x + other.translate_x,
            translate_y: self.translate_y + other.translate_y,
            rotation_degrees: self.rotation_degrees + other.rotation_degrees,
        }
    }
}

/// Resolves where the render is written.
///
/// A path that does not end in `.mp4` names a directory and receives
/// `output.mp4`; relative paths become absolute against the working
/// directory.
pub fn normalize_output_path(path: &Path) -> Result<PathBuf> {
    let is_mp4 = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("mp4"));
    let path = if is_mp4 {
        path.to_path_buf()
    } else {
        path.join(DEFAULT_OUTPUT_FILE)
    };
    std::path::absolute(&path).map_err(|source| EngineError::ProjectIo {
        context: "resolve render output path",
        path,
        source,
    })
}

/// Builds the render plan for the current timeline.
///
/// The frame range runs from frame 1 to the largest strip end, or to
/// [`FALLBACK_FRAME_END`] when the timeline is empty.
pub fn build_render_plan(timeline: &Timeline, settings: &RenderSettings) -> Result<RenderPlan> {
    let frame_start = RENDER_FRAME_START;
    let frame_end = match timeline.frame_end() {
        Some(end) => end.max(frame_start),
        None => {
            warn!(
                frame_end = FALLBACK_FRAME_END,
                "timeline is empty, rendering fallback frame range"
            );
            FALLBACK_FRAME_END
        }
    };

    let mut transforms = HashMap::<StripId, Placement>::new();
    collect_transforms(timeline.strips(), &mut transforms);

    let mut collector = LayerCollector {
        window: (frame_start, frame_end + 1),
        transforms: &transforms,
        visual: Vec::new(),
        audio: Vec::new(),
    };
    for strip in timeline.strips() {
        collector.visit(strip, strip.channel, Placement::default());
    }

    let plan = RenderPlan {
        output_path: normalize_output_path(&settings.output_path)?,
        width: settings.resolution_x,
        height: settings.resolution_y,
        fps: settings.fps,
        frame_start,
        frame_end,
        visual: collector.visual,
        audio: collector.audio,
        video_bitrate_kbps: VIDEO_BITRATE_KBPS,
        audio_bitrate_kbps: AUDIO_BITRATE_KBPS,
        audio_channels: AUDIO_CHANNELS,
    };
    debug!(
        output = %plan.output_path.display(),
        frame_start,
        frame_end,
        visual_layers = plan.visual.len(),
        audio_layers = plan.audio.len(),
        "render plan built"
    );
    Ok(plan)
}

/// Checks that a finished render produced a non-empty file.
pub fn verify_render_output(path: &Path) -> Result<u64> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() && metadata.len() > 0 => Ok(metadata.len()),
        _ => Err(EngineError::RenderOutputMissing(path.to_path_buf())),
    }
}

fn collect_transforms(strips: &[Strip], out: &mut HashMap<StripId, Placement>) {
    for strip in strips {
        match &strip.content {
            StripContent::Transform(params) => {
                let entry = out.entry(params.input).or_default();
                *entry = entry.combine(Placement {
                    translate_x: params.translate_x,
                    translate_y: params.translate_y,
                    rotation_degrees: params.rotation_degrees,
                });
            }
            StripContent::Meta { children } => collect_transforms(children, out),
            StripContent::Media { .. } => {}
        }
    }
}

struct LayerCollector<'a> {
    window: (i64, i64),
    transforms: &'a HashMap<StripId, Placement>,
    visual: Vec<VisualLayer>,
    audio: Vec<AudioLayer>,
}

impl LayerCollector<'_> {
    fn visit(&mut self, strip: &Strip, channel: u32, inherited: Placement) {
        let placement = inherited.combine(self.transforms.get(&strip.id).copied().unwrap_or_default());
        match &strip.content {
            StripContent::Meta { children } => {
                for child in children {
                    self.visit(child, channel, placement);
                }
            }
            StripContent::Transform(_) => {}
            StripContent::Media {
                kind,
                source_path,
                source_in,
                volume,
            } => {
                let visible_start = strip.frame_start.max(self.window.0);
                let visible_end = strip.frame_final_end.min(self.window.1);
                if visible_end <= visible_start {
                    return;
                }
                let offset_frames = visible_start - self.window.0;
                let source_in = source_in + (visible_start - strip.frame_start);
                let length_frames = visible_end - visible_start;

                match kind {
                    MediaKind::Audio => self.audio.push(AudioLayer {
                        name: strip.name.clone(),
                        source_path: source_path.clone(),
                        channel,
                        offset_frames,
                        source_in,
                        length_frames,
                        volume: *volume,
                    }),
                    MediaKind::Video | MediaKind::Image => self.visual.push(VisualLayer {
                        name: strip.name.clone(),
                        source_path: source_path.clone(),
                        still: *kind == MediaKind::Image,
                        channel,
                        offset_frames,
                        source_in,
                        length_frames,
                        translate_x: placement.translate_x,
                        translate_y: placement.translate_y,
                        rotation_degrees: placement.rotation_degrees,
                    }),
                }
            }
        }
    }
}
