use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::error::{EngineError, Result};
use crate::media::{AddMedia, FfmpegMediaBackend, MediaBackend, add_media};
use crate::ops::{CutArgs, ErrorClass, Operation};
use crate::project::ProjectConfig;
use crate::render::{RenderSettings, build_render_plan, verify_render_output};
use crate::time::Fps;
use crate::timeline::Timeline;

/// Events emitted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    MediaAdded {
        name: String,
        channel: u32,
    },
    /// An operation changed the timeline. `strips` lists the strips it
    /// produced or touched, in the order the operation reports them; for
    /// `delete` it holds the removed strip.
    TimelineChanged {
        operation: &'static str,
        strips: Vec<String>,
        strip_count: usize,
    },
    /// A best-effort operation failed and the run continued.
    OperationSkipped {
        index: usize,
        operation: &'static str,
        error: EngineErrorEvent,
    },
    /// An operation with an unrecognized type tag was ignored.
    OperationIgnored {
        index: usize,
    },
    RenderFinished {
        path: PathBuf,
        bytes: u64,
        frame_count: i64,
    },
}

/// Coarse error categories shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    NotFound,
    Range,
    NameCollision,
    IntermediateFragmentNotFound,
    AssetMissing,
    Other,
}

impl From<&EngineError> for EngineErrorKind {
    fn from(value: &EngineError) -> Self {
        match value {
            EngineError::NotFound { .. } => Self::NotFound,
            EngineError::InvalidFrame { .. } | EngineError::InvalidRange { .. } => Self::Range,
            EngineError::NameCollision { .. } => Self::NameCollision,
            EngineError::IntermediateFragmentNotFound { .. } => Self::IntermediateFragmentNotFound,
            EngineError::AssetMissing(_) => Self::AssetMissing,
            _ => Self::Other,
        }
    }
}

/// User-facing error payload emitted as an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineErrorEvent {
    pub kind: EngineErrorKind,
    pub message: String,
}

impl EngineErrorEvent {
    pub fn from_error(error: &EngineError) -> Self {
        Self {
            kind: EngineErrorKind::from(error),
            message: error.to_string(),
        }
    }
}

/// Summary of one project run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub events: Vec<Event>,
    pub applied: usize,
    pub skipped: usize,
    /// Written file, when the run rendered.
    pub output: Option<PathBuf>,
}

impl RunReport {
    fn record(&mut self, events: Vec<Event>) {
        for event in &events {
            match event {
                Event::TimelineChanged { .. } => self.applied += 1,
                Event::OperationSkipped { .. } | Event::OperationIgnored { .. } => {
                    self.skipped += 1
                }
                Event::RenderFinished { path, .. } => self.output = Some(path.clone()),
                Event::MediaAdded { .. } => {}
            }
        }
        self.events.extend(events);
    }
}

/// Engine owning one timeline and the media backend that feeds it.
#[derive(Debug)]
pub struct Engine<M> {
    media: M,
    timeline: Timeline,
    fps: Fps,
}

impl<M> Engine<M>
where
    M: MediaBackend,
{
    /// Creates an engine with an empty timeline.
    ///
    /// # Example
    /// ```no_run
    /// use sequencer::{Engine, FfmpegMediaBackend, Fps};
    ///
    /// let _engine = Engine::new(FfmpegMediaBackend, Fps::DEFAULT);
    /// ```
    pub fn new(media: M, fps: Fps) -> Self {
        Self {
            media,
            timeline: Timeline::new(),
            fps,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn into_timeline(self) -> Timeline {
        self.timeline
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Drops every strip and switches to `fps`.
    pub fn reset(&mut self, fps: Fps) {
        self.timeline = Timeline::new();
        self.fps = fps;
    }

    pub fn add_media(&mut self, request: &AddMedia) -> Result<Event> {
        let name = add_media(&mut self.timeline, &self.media, request, self.fps)?;
        let channel = self
            .timeline
            .get(&name)
            .map_or(request.channel, |strip| strip.channel);
        Ok(Event::MediaAdded { name, channel })
    }

    /// Applies one operation to the timeline.
    ///
    /// Failed operations leave the timeline unchanged. Unknown operations
    /// are ignored with a warning.
    pub fn apply(&mut self, operation: &Operation) -> Result<Vec<Event>> {
        let fps = self.fps;
        let timeline = &mut self.timeline;
        let strips = match operation {
            Operation::Split { target, times } => timeline.split_many(target, times, fps)?,
            Operation::Cut(CutArgs { target, start, end }) => {
                vec![timeline.cut_between_seconds(target, *start, *end, fps)?]
            }
            Operation::Delete { target } => {
                let removed = timeline
                    .delete(target)
                    .ok_or_else(|| EngineError::not_found(target))?;
                vec![removed.name]
            }
            Operation::Merge {
                targets,
                output_name,
            } => {
                timeline.merge(targets, output_name)?;
                vec![output_name.clone()]
            }
            Operation::Transform {
                target,
                translate: [dx, dy],
                rotate,
            } => vec![timeline.transform(target, (pixels(*dx), pixels(*dy)), *rotate)?],
            Operation::SetVolume { target, volume } => {
                timeline.set_volume(target, *volume)?;
                vec![target.clone()]
            }
            Operation::ExtractAudio { target, channel } => {
                vec![timeline.extract_audio(target, *channel)?]
            }
            Operation::Rotate { target, angle } => vec![timeline.rotate(target, *angle)?],
            Operation::Translate { target, dx, dy } => {
                vec![timeline.translate(target, pixels(*dx), pixels(*dy))?]
            }
            Operation::Unknown => {
                warn!("operation with unknown type ignored");
                return Ok(Vec::new());
            }
        };

        info!(
            operation = operation.kind(),
            strips = ?strips,
            strip_count = timeline.len(),
            "operation applied"
        );
        Ok(vec![Event::TimelineChanged {
            operation: operation.kind(),
            strips,
            strip_count: timeline.len(),
        }])
    }

    /// Applies operations in order.
    ///
    /// Failures classified [`ErrorClass::Skip`] are logged and reported as
    /// events; the first [`ErrorClass::Fatal`] failure is returned and stops
    /// the sequence.
    pub fn apply_all(&mut self, operations: &[Operation]) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        for (index, operation) in operations.iter().enumerate() {
            if matches!(operation, Operation::Unknown) {
                warn!(index, "operation with unknown type ignored");
                events.push(Event::OperationIgnored { index });
                continue;
            }

            match self.apply(operation) {
                Ok(applied) => events.extend(applied),
                Err(failure) => match operation.failure_class(&failure) {
                    ErrorClass::Skip => {
                        warn!(
                            index,
                            operation = operation.kind(),
                            error = %failure,
                            "operation skipped"
                        );
                        events.push(Event::OperationSkipped {
                            index,
                            operation: operation.kind(),
                            error: EngineErrorEvent::from_error(&failure),
                        });
                    }
                    ErrorClass::Fatal => {
                        error!(
                            index,
                            operation = operation.kind(),
                            error = %failure,
                            "operation failed, aborting"
                        );
                        return Err(failure);
                    }
                },
            }
        }
        Ok(events)
    }

    /// Renders the current timeline once and checks the written file.
    pub fn render(&mut self, settings: &RenderSettings) -> Result<Event> {
        let plan = build_render_plan(&self.timeline, settings)?;
        if let Some(parent) = plan.output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| EngineError::ProjectIo {
                context: "failed to create render output directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        info!(
            output = %plan.output_path.display(),
            frame_start = plan.frame_start,
            frame_end = plan.frame_end,
            "render started"
        );
        self.media.render(&plan)?;
        let bytes = verify_render_output(&plan.output_path)?;
        info!(output = %plan.output_path.display(), bytes, "render finished");

        Ok(Event::RenderFinished {
            frame_count: plan.frame_count(),
            path: plan.output_path,
            bytes,
        })
    }

    /// Rebuilds the timeline from `config`: resets it, adds videos, audios
    /// and images, then applies the operation list. Does not render.
    pub fn load_project(&mut self, config: &ProjectConfig) -> Result<RunReport> {
        self.reset(config.fps);
        let mut report = RunReport::default();

        for request in config.media_requests() {
            let event = self.add_media(&request)?;
            report.record(vec![event]);
        }
        info!(
            strips = self.timeline.len(),
            fps = self.fps.get(),
            "media loaded"
        );

        let events = self.apply_all(&config.operations)?;
        report.record(events);
        info!(
            applied = report.applied,
            skipped = report.skipped,
            "operations finished"
        );
        Ok(report)
    }

    /// Loads the project, applies its operations and renders exactly once.
    pub fn run(&mut self, config: &ProjectConfig) -> Result<RunReport> {
        let mut report = self.load_project(config)?;
        let event = self.render(&config.render_settings())?;
        report.record(vec![event]);
        Ok(report)
    }
}

impl Engine<FfmpegMediaBackend> {
    /// Creates an engine wired to the FFmpeg backend.
    pub fn with_ffmpeg(fps: Fps) -> Self {
        Self::new(FfmpegMediaBackend, fps)
    }
}

fn pixels(value: f64) -> i32 {
    value.round() as i32
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use super::{Engine, EngineErrorKind, Event};
    use crate::error::{EngineError, Result};
    use crate::media::{MediaBackend, ProbedMedia};
    use crate::ops::Operation;
    use crate::project::{MediaEntry, ProjectConfig};
    use crate::render::RenderPlan;
    use crate::time::Fps;
    use crate::timeline::StripKind;

    #[derive(Debug)]
    struct MockBackend {
        duration_seconds: f64,
        write_output: bool,
        render_calls: Arc<Mutex<Vec<RenderPlan>>>,
    }

    impl MockBackend {
        fn new(duration_seconds: f64) -> Self {
            Self {
                duration_seconds,
                write_output: true,
                render_calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn render_calls(&self) -> Arc<Mutex<Vec<RenderPlan>>> {
            Arc::clone(&self.render_calls)
        }
    }

    impl MediaBackend for MockBackend {
        fn probe(&self, path: &Path) -> Result<ProbedMedia> {
            Ok(ProbedMedia {
                path: path.to_path_buf(),
                duration_seconds: Some(self.duration_seconds),
                has_video: true,
                has_audio: true,
            })
        }

        fn render(&self, plan: &RenderPlan) -> Result<()> {
            self.render_calls
                .lock()
                .expect("lock render calls")
                .push(plan.clone());
            if self.write_output {
                std::fs::write(&plan.output_path, b"mp4").expect("write fake render");
            }
            Ok(())
        }
    }

    fn operations(json: &str) -> Vec<Operation> {
        serde_json::from_str(json).expect("operations should parse")
    }

    fn project(dir: &tempfile::TempDir, operations_json: &str) -> ProjectConfig {
        std::fs::write(dir.path().join("video.mp4"), b"fake").expect("write video");
        std::fs::write(dir.path().join("music.mp3"), b"fake").expect("write audio");
        std::fs::write(dir.path().join("logo.png"), b"fake").expect("write image");
        ProjectConfig {
            videos: vec![MediaEntry {
                path: PathBuf::from("video.mp4"),
                name: Some("video1".to_string()),
                channel: None,
                start_frame: None,
                frame_end: None,
            }],
            audios: vec![MediaEntry {
                path: PathBuf::from("music.mp3"),
                name: Some("music".to_string()),
                channel: Some(3),
                start_frame: None,
                frame_end: None,
            }],
            images: vec![MediaEntry {
                path: PathBuf::from("logo.png"),
                name: Some("img1".to_string()),
                channel: None,
                start_frame: None,
                frame_end: Some(121),
            }],
            output_path: PathBuf::from("out/final.mp4"),
            operations: operations(operations_json),
            base_dir: dir.path().to_path_buf(),
            ..ProjectConfig::default()
        }
    }

    #[test]
    fn run_applies_operations_and_renders_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = MockBackend::new(10.0);
        let calls = backend.render_calls();
        let mut engine = Engine::new(backend, Fps::DEFAULT);
        let config = project(
            &dir,
            r#"[
                {"type": "cut_video_strip", "target": "video1", "start": 3.0, "end": 5.0},
                {"type": "transform", "target": "img1", "translate": [100, 50], "rotate": 15},
                {"type": "set_volume", "target": "music", "volume": 50}
            ]"#,
        );

        let report = engine.run(&config).expect("run should succeed");

        assert_eq!(report.applied, 3);
        assert_eq!(report.skipped, 0);
        let output = dir.path().join("out").join("final.mp4");
        assert_eq!(report.output, Some(output.clone()));

        let timeline = engine.timeline();
        let kept = timeline.get("video1_cut").expect("cut fragment");
        assert_eq!((kept.frame_start, kept.frame_final_end), (72, 120));
        assert!(timeline.get("video1").is_none());
        assert_eq!(
            timeline.get("Transform_img1").expect("effect").kind(),
            StripKind::Effect
        );

        let calls = calls.lock().expect("lock render calls");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].output_path, output);
        assert_eq!(calls[0].frame_end, 241);
        assert_eq!(calls[0].audio[0].volume, 0.5);
    }

    #[test]
    fn best_effort_failures_are_skipped_and_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut engine = Engine::new(MockBackend::new(4.0), Fps::DEFAULT);
        let config = project(
            &dir,
            r#"[
                {"type": "delete", "target": "ghost"},
                {"type": "set_volume", "target": "video1", "volume": 20},
                {"type": "add_subtitles", "text": "hello"},
                {"type": "split", "target": "video1", "times": [1.0]}
            ]"#,
        );

        let report = engine.load_project(&config).expect("load should succeed");

        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped, 3);
        let skipped: Vec<_> = report
            .events
            .iter()
            .filter_map(|event| match event {
                Event::OperationSkipped { index, error, .. } => Some((*index, error.kind)),
                _ => None,
            })
            .collect();
        assert_eq!(
            skipped,
            vec![(0, EngineErrorKind::NotFound), (1, EngineErrorKind::Other)]
        );
        assert!(report.events.contains(&Event::OperationIgnored { index: 2 }));
        assert!(engine.timeline().get("video1.001").is_some());
    }

    #[test]
    fn fatal_failure_aborts_remaining_operations() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = MockBackend::new(4.0);
        let calls = backend.render_calls();
        let mut engine = Engine::new(backend, Fps::DEFAULT);
        let config = project(
            &dir,
            r#"[
                {"type": "cut", "target": "ghost", "start": 1.0, "end": 2.0},
                {"type": "delete", "target": "video1"}
            ]"#,
        );

        let result = engine.run(&config);

        assert!(matches!(result, Err(EngineError::NotFound { .. })));
        assert!(engine.timeline().get("video1").is_some());
        assert!(calls.lock().expect("lock render calls").is_empty());
    }

    #[test]
    fn invalid_cut_range_is_fatal_and_leaves_timeline_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut engine = Engine::new(MockBackend::new(4.0), Fps::DEFAULT);
        let config = project(&dir, "[]");
        engine.load_project(&config).expect("load");
        let before = engine.timeline().clone();

        let result = engine.apply_all(&operations(
            r#"[{"type": "cut", "target": "video1", "start": 3.0, "end": 9.0}]"#,
        ));

        assert!(matches!(result, Err(EngineError::InvalidRange { .. })));
        assert_eq!(engine.timeline(), &before);
    }

    #[test]
    fn delete_reports_the_removed_strip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut engine = Engine::new(MockBackend::new(4.0), Fps::DEFAULT);
        engine.load_project(&project(&dir, "[]")).expect("load");
        let count = engine.timeline().len();

        let events = engine
            .apply(&Operation::Delete {
                target: "video1".to_string(),
            })
            .expect("delete");

        assert_eq!(
            events,
            vec![Event::TimelineChanged {
                operation: "delete",
                strips: vec!["video1".to_string()],
                strip_count: count - 1,
            }]
        );
    }

    #[test]
    fn missing_asset_aborts_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut engine = Engine::new(MockBackend::new(4.0), Fps::DEFAULT);
        let mut config = project(&dir, "[]");
        config.videos[0].path = PathBuf::from("absent.mp4");

        let result = engine.run(&config);

        assert!(matches!(result, Err(EngineError::AssetMissing(_))));
    }

    #[test]
    fn render_without_output_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut backend = MockBackend::new(4.0);
        backend.write_output = false;
        let mut engine = Engine::new(backend, Fps::DEFAULT);
        let config = project(&dir, "[]");

        let result = engine.run(&config);

        assert!(matches!(result, Err(EngineError::RenderOutputMissing(_))));
    }

    #[test]
    fn load_project_resets_previous_timeline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut engine = Engine::new(MockBackend::new(4.0), Fps::DEFAULT);
        let config = project(&dir, r#"[{"type": "split", "target": "video1", "times": [1.0]}]"#);

        engine.load_project(&config).expect("first load");
        engine.load_project(&config).expect("second load");

        assert_eq!(engine.timeline().len(), 4);
        assert!(engine.timeline().get("video1.002").is_none());
    }

    #[test]
    fn merge_and_extract_audio_through_operations() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut engine = Engine::new(MockBackend::new(4.0), Fps::DEFAULT);
        let config = project(
            &dir,
            r#"[
                {"type": "extract_audio", "target": "video1", "channel": 2},
                {"type": "merge", "targets": ["video1", "img1", "ghost"], "output_name": "Intro"}
            ]"#,
        );

        let report = engine.load_project(&config).expect("load should succeed");

        assert_eq!(report.applied, 2);
        let timeline = engine.timeline();
        assert_eq!(timeline.get("video1_audio").expect("audio").channel, 2);
        assert_eq!(timeline.get("Intro").expect("meta").kind(), StripKind::Meta);
        assert!(timeline.get("video1").is_none());
        assert!(timeline.contains_name("video1"));
    }
}
