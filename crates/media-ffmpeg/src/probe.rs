use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{MediaFfmpegError, Result};

/// Stream kind discovered by probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
    Other,
}

/// Media probe result.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    pub path: PathBuf,
    pub streams: Vec<StreamKind>,
    /// Container duration; `None` for stills and streams without one.
    pub duration_seconds: Option<f64>,
    pub has_video: bool,
    pub has_audio: bool,
}

/// Probes stream layout and duration of a media file via `ffprobe`.
///
/// # Example
/// ```no_run
/// use media_ffmpeg::probe_media;
///
/// let info = probe_media("sample.mp4").expect("probe should succeed");
/// assert!(info.has_video);
/// ```
pub fn probe_media(path: impl AsRef<Path>) -> Result<MediaInfo> {
    let path = path.as_ref();

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "stream=codec_type:format=duration",
            "-of",
            "default=noprint_wrappers=1",
        ])
        .arg(path)
        .output()
        .map_err(|source| MediaFfmpegError::Io {
            context: "run ffprobe",
            source,
        })?;

    if !output.status.success() {
        return Err(MediaFfmpegError::CommandFailed {
            command: format!("ffprobe {}", path.display()),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let stdout = String::from_utf8(output.stdout)?;
    let info = parse_probe_output(path, &stdout)?;
    debug!(
        path = %path.display(),
        duration_seconds = ?info.duration_seconds,
        has_video = info.has_video,
        has_audio = info.has_audio,
        "media probed"
    );
    Ok(info)
}

fn parse_probe_output(path: &Path, stdout: &str) -> Result<MediaInfo> {
    let mut streams = Vec::new();
    let mut duration_seconds = None;

    for line in stdout.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let Some((key, value)) = line.split_once('=') else {
            return Err(MediaFfmpegError::Parse {
                context: "probe field",
                value: line.to_string(),
            });
        };
        match key.trim() {
            "codec_type" => streams.push(match value.trim() {
                "video" => StreamKind::Video,
                "audio" => StreamKind::Audio,
                _ => StreamKind::Other,
            }),
            "duration" => duration_seconds = parse_duration(value.trim())?,
            _ => {}
        }
    }

    if streams.is_empty() {
        return Err(MediaFfmpegError::Parse {
            context: "streams",
            value: "no streams found".to_string(),
        });
    }

    Ok(MediaInfo {
        path: path.to_path_buf(),
        has_video: streams.contains(&StreamKind::Video),
        has_audio: streams.contains(&StreamKind::Audio),
        streams,
        duration_seconds,
    })
}

fn parse_duration(value: &str) -> Result<Option<f64>> {
    if value.is_empty() || value == "N/A" {
        return Ok(None);
    }
    let duration = value.parse::<f64>().map_err(|_| MediaFfmpegError::Parse {
        context: "format duration seconds",
        value: value.to_string(),
    })?;
    Ok((duration.is_finite() && duration > 0.0).then_some(duration))
}
