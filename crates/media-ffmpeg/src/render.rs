use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::error::{MediaFfmpegError, Result};

const OUTPUT_SAMPLE_RATE: u32 = 48_000;

/// One input file of a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderInput {
    pub path: PathBuf,
    /// Single picture looped for the whole render.
    pub still: bool,
}

/// Picture layer, stacked bottom to top in request order.
///
/// All frame values are in output frames.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualLayer {
    pub input_index: usize,
    /// Output frame where the layer appears.
    pub offset_frames: i64,
    /// First source frame shown.
    pub source_in: i64,
    pub length_frames: i64,
    /// Pixels right of center.
    pub translate_x: i32,
    /// Pixels above center.
    pub translate_y: i32,
    /// Counter-clockwise.
    pub rotation_degrees: f64,
}

/// Sound layer mixed into the output.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioLayer {
    pub input_index: usize,
    pub offset_frames: i64,
    pub source_in: i64,
    pub length_frames: i64,
    /// Linear gain.
    pub volume: f64,
}

/// Request payload for rendering a layered timeline into one MP4.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub inputs: Vec<RenderInput>,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub frame_count: i64,
    pub visual: Vec<VisualLayer>,
    pub audio: Vec<AudioLayer>,
    pub video_bitrate_kbps: u32,
    pub audio_bitrate_kbps: u32,
    pub audio_channels: u16,
    pub output_path: PathBuf,
}

/// Renders the layers over a black canvas into an H.264/AAC MP4.
pub fn render_timeline_mp4(request: &RenderRequest) -> Result<()> {
    validate_request(request)?;
    let filter_complex = build_filter_complex(request);
    debug!(
        output = %request.output_path.display(),
        inputs = request.inputs.len(),
        visual_layers = request.visual.len(),
        audio_layers = request.audio.len(),
        frame_count = request.frame_count,
        filter_complex = %filter_complex,
        "running ffmpeg render"
    );

    let output = Command::new("ffmpeg")
        .args(build_command_args(request, filter_complex))
        .output()
        .map_err(|source| MediaFfmpegError::Io {
            context: "run ffmpeg render",
            source,
        })?;
    if !output.status.success() {
        return Err(MediaFfmpegError::CommandFailed {
            command: format!("ffmpeg render {}", request.output_path.display()),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}

fn build_command_args(request: &RenderRequest, filter_complex: String) -> Vec<OsString> {
    let duration = seconds(request.frame_count, request.fps);
    let mut args: Vec<OsString> = ["-hide_banner", "-v", "error", "-y"]
        .into_iter()
        .map(OsString::from)
        .collect();

    for input in &request.inputs {
        if input.still {
            args.extend(["-loop", "1", "-framerate"].map(OsString::from));
            args.push(request.fps.to_string().into());
            args.push("-t".into());
            args.push(duration.clone().into());
        }
        args.push("-i".into());
        args.push(input.path.clone().into_os_string());
    }

    args.push("-filter_complex".into());
    args.push(filter_complex.into());
    args.extend(
        ["-map", "[vout]", "-c:v", "libx264", "-pix_fmt", "yuv420p", "-b:v"].map(OsString::from),
    );
    args.push(format!("{}k", request.video_bitrate_kbps).into());
    args.push("-r".into());
    args.push(request.fps.to_string().into());

    if request.audio.is_empty() {
        args.push("-an".into());
    } else {
        args.extend(["-map", "[aout]", "-c:a", "aac", "-b:a"].map(OsString::from));
        args.push(format!("{}k", request.audio_bitrate_kbps).into());
        args.push("-ac".into());
        args.push(request.audio_channels.to_string().into());
    }

    args.push("-t".into());
    args.push(duration.into());
    args.push(request.output_path.clone().into_os_string());
    args
}

fn build_filter_complex(request: &RenderRequest) -> String {
    let fps = request.fps;
    let mut chains = Vec::<String>::with_capacity(request.visual.len() * 2 + request.audio.len() + 2);

    let base_label = if request.visual.is_empty() {
        "[vout]"
    } else {
        "[base]"
    };
    chains.push(format!(
        "color=c=black:s={}x{}:r={fps}:d={}{base_label}",
        request.width,
        request.height,
        seconds(request.frame_count, fps)
    ));

    for (index, layer) in request.visual.iter().enumerate() {
        let still = request
            .inputs
            .get(layer.input_index)
            .is_some_and(|input| input.still);
        let trim = if still {
            format!("trim=end_frame={}", layer.length_frames)
        } else {
            format!(
                "trim=start_frame={}:end_frame={}",
                layer.source_in,
                layer.source_in + layer.length_frames
            )
        };
        let mut chain = format!(
            "[{}:v:0]fps={fps},{trim},setpts=PTS-STARTPTS+{}/TB,scale={}:{}:force_original_aspect_ratio=decrease,format=rgba",
            layer.input_index,
            seconds(layer.offset_frames, fps),
            request.width,
            request.height
        );
        if layer.rotation_degrees != 0.0 {
            // ffmpeg rotates clockwise for positive angles.
            let radians = format!("{:.6}", -layer.rotation_degrees.to_radians());
            chain.push_str(&format!(
                ",rotate={radians}:c=none:ow=rotw({radians}):oh=roth({radians})"
            ));
        }
        chain.push_str(&format!("[v{index}]"));
        chains.push(chain);
    }

    let mut below = String::from("[base]");
    for (index, layer) in request.visual.iter().enumerate() {
        let label = if index + 1 == request.visual.len() {
            "[vout]".to_string()
        } else {
            format!("[o{index}]")
        };
        chains.push(format!(
            "{below}[v{index}]overlay=x=(W-w)/2{:+}:y=(H-h)/2{:+}:eof_action=pass:enable='between(t,{},{})'{label}",
            layer.translate_x,
            -layer.translate_y,
            seconds(layer.offset_frames, fps),
            seconds(layer.offset_frames + layer.length_frames, fps)
        ));
        below = label;
    }

    for (index, layer) in request.audio.iter().enumerate() {
        let delay_ms = (layer.offset_frames as f64 * 1_000.0 / f64::from(fps)).round() as i64;
        chains.push(format!(
            "[{}:a:0]atrim=start={}:end={},asetpts=PTS-STARTPTS,volume={:.3},adelay={delay_ms}:all=1[a{index}]",
            layer.input_index,
            seconds(layer.source_in, fps),
            seconds(layer.source_in + layer.length_frames, fps),
            layer.volume
        ));
    }
    if !request.audio.is_empty() {
        let inputs: String = (0..request.audio.len())
            .map(|index| format!("[a{index}]"))
            .collect();
        let layout = channel_layout_for_channels(request.audio_channels).unwrap_or("stereo");
        chains.push(format!(
            "{inputs}amix=inputs={}:duration=longest:normalize=0,aformat=sample_rates={OUTPUT_SAMPLE_RATE}:channel_layouts={layout}[aout]",
            request.audio.len()
        ));
    }

    chains.join(";")
}

fn validate_request(request: &RenderRequest) -> Result<()> {
    let invalid = |reason: &'static str| -> Result<()> {
        Err(MediaFfmpegError::InvalidRenderRequest { reason })
    };

    if request.width == 0 || request.height == 0 {
        return invalid("output size must be positive");
    }
    if request.fps == 0 {
        return invalid("fps must be positive");
    }
    if request.frame_count <= 0 {
        return invalid("frame count must be positive");
    }
    if !request.audio.is_empty() && channel_layout_for_channels(request.audio_channels).is_none()
    {
        return invalid("audio channel layout is unsupported");
    }

    for layer in &request.visual {
        if layer.input_index >= request.inputs.len() {
            return invalid("visual layer input index is out of range");
        }
        if layer.length_frames <= 0 || layer.offset_frames < 0 || layer.source_in < 0 {
            return invalid("visual layer range is not positive");
        }
    }
    for layer in &request.audio {
        let Some(input) = request.inputs.get(layer.input_index) else {
            return invalid("audio layer input index is out of range");
        };
        if input.still {
            return invalid("audio layer cannot read a still input");
        }
        if layer.length_frames <= 0 || layer.offset_frames < 0 || layer.source_in < 0 {
            return invalid("audio layer range is not positive");
        }
        if !layer.volume.is_finite() || layer.volume < 0.0 {
            return invalid("audio layer volume must be a non-negative number");
        }
    }

    Ok(())
}

fn seconds(frames: i64, fps: u32) -> String {
    format!("{:.6}", frames as f64 / f64::from(fps))
}

fn channel_layout_for_channels(channels: u16) -> Option<&'static str> {
    match channels {
        1 => Some("mono"),
        2 => Some("stereo"),
        3 => Some("2.1"),
        4 => Some("quad"),
        5 => Some("5.0"),
        6 => Some("5.1"),
        7 => Some("6.1"),
        8 => Some("7.1"),
        _ => None,
    }
}
