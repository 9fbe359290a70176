//! Declarative operation list read from project configuration.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Output name used by `merge` when the config does not give one.
pub const DEFAULT_MERGE_OUTPUT: &str = "MergedMeta";

/// One entry of the `operations` list.
///
/// Legacy type tags are accepted as aliases and resolved here, so the engine
/// only ever sees the canonical variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    #[serde(alias = "split_video", alias = "split_audio")]
    Split {
        target: String,
        #[serde(default)]
        times: Vec<f64>,
    },
    #[serde(alias = "cut_video", alias = "cut_video_strip", alias = "cut_audio")]
    Cut(CutArgs),
    Delete {
        target: String,
    },
    Merge {
        #[serde(default)]
        targets: Vec<String>,
        #[serde(default = "default_merge_output")]
        output_name: String,
    },
    Transform {
        target: String,
        #[serde(default)]
        translate: [f64; 2],
        #[serde(default)]
        rotate: f64,
    },
    SetVolume {
        target: String,
        #[serde(default = "default_volume")]
        volume: f64,
    },
    ExtractAudio {
        target: String,
        #[serde(default = "default_channel")]
        channel: u32,
    },
    Rotate {
        target: String,
        #[serde(alias = "angle_deg", alias = "rotate")]
        angle: f64,
    },
    Translate {
        target: String,
        #[serde(default)]
        dx: f64,
        #[serde(default)]
        dy: f64,
    },
    /// Any tag not listed above; skipped at run time.
    #[serde(other)]
    Unknown,
}

/// Arguments of a cut, in seconds from the strip's first frame.
///
/// Older configs give the range as `times: [start, end]`; both shapes are
/// accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCutArgs")]
pub struct CutArgs {
    pub target: String,
    pub start: f64,
    pub end: f64,
}

/// How the dispatcher reacts to a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Log, record and continue with the next operation.
    Skip,
    /// Abort the whole run.
    Fatal,
}

impl Operation {
    /// Canonical type tag, used in logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Split { .. } => "split",
            Self::Cut(_) => "cut",
            Self::Delete { .. } => "delete",
            Self::Merge { .. } => "merge",
            Self::Transform { .. } => "transform",
            Self::SetVolume { .. } => "set_volume",
            Self::ExtractAudio { .. } => "extract_audio",
            Self::Rotate { .. } => "rotate",
            Self::Translate { .. } => "translate",
            Self::Unknown => "unknown",
        }
    }

    /// Classifies a failure of this operation.
    ///
    /// Missing or unsuitable targets of best-effort operations are skipped.
    /// Everything else, including every failure of `split`, `cut` and
    /// `transform`, aborts the run.
    pub fn failure_class(&self, error: &EngineError) -> ErrorClass {
        let best_effort = matches!(
            self,
            Self::Delete { .. }
                | Self::Merge { .. }
                | Self::SetVolume { .. }
                | Self::ExtractAudio { .. }
                | Self::Rotate { .. }
                | Self::Translate { .. }
                | Self::Unknown
        );
        match error {
            EngineError::NotFound { .. } | EngineError::UnsupportedStrip { .. } if best_effort => {
                ErrorClass::Skip
            }
            _ => ErrorClass::Fatal,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCutArgs {
    target: String,
    start: Option<f64>,
    end: Option<f64>,
    #[serde(default)]
    times: Vec<f64>,
}

impl TryFrom<RawCutArgs> for CutArgs {
    type Error = String;

    fn try_from(raw: RawCutArgs) -> Result<Self, Self::Error> {
        let (start, end) = match (raw.start, raw.end, raw.times.as_slice()) {
            (Some(start), Some(end), _) => (start, end),
            (None, None, [start, end]) => (*start, *end),
            (start, end, []) => (start.unwrap_or(0.0), end.unwrap_or(0.0)),
            _ => {
                return Err(format!(
                    "cut on {} needs `start` and `end` or `times: [start, end]`",
                    raw.target
                ));
            }
        };
        Ok(Self {
            target: raw.target,
            start,
            end,
        })
    }
}

fn default_merge_output() -> String {
    DEFAULT_MERGE_OUTPUT.to_string()
}

fn default_volume() -> f64 {
    100.0
}

fn default_channel() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::{CutArgs, ErrorClass, Operation};
    use crate::error::EngineError;

    fn parse(json: &str) -> Operation {
        serde_json::from_str(json).expect("operation should parse")
    }

    #[test]
    fn legacy_aliases_resolve_to_canonical_variants() {
        assert_eq!(
            parse(r#"{"type": "split_video", "target": "v", "times": [1.0]}"#),
            Operation::Split {
                target: "v".to_string(),
                times: vec![1.0],
            }
        );
        assert_eq!(parse(r#"{"type": "split_audio", "target": "a"}"#).kind(), "split");
        for tag in ["cut", "cut_video", "cut_video_strip", "cut_audio"] {
            let json = format!(r#"{{"type": "{tag}", "target": "v", "start": 2.0, "end": 4.0}}"#);
            assert_eq!(
                parse(&json),
                Operation::Cut(CutArgs {
                    target: "v".to_string(),
                    start: 2.0,
                    end: 4.0,
                })
            );
        }
    }

    #[test]
    fn cut_accepts_times_pair() {
        assert_eq!(
            parse(r#"{"type": "cut_video_strip", "target": "video1", "times": [3.0, 5.0]}"#),
            Operation::Cut(CutArgs {
                target: "video1".to_string(),
                start: 3.0,
                end: 5.0,
            })
        );
        assert!(
            serde_json::from_str::<Operation>(r#"{"type": "cut", "target": "v", "times": [1.0]}"#)
                .is_err()
        );
    }

    #[test]
    fn defaults_follow_config_conventions() {
        assert_eq!(
            parse(r#"{"type": "merge", "targets": ["a", "b"]}"#),
            Operation::Merge {
                targets: vec!["a".to_string(), "b".to_string()],
                output_name: "MergedMeta".to_string(),
            }
        );
        assert_eq!(
            parse(r#"{"type": "transform", "target": "img1", "translate": [100, 50], "rotate": 15.0}"#),
            Operation::Transform {
                target: "img1".to_string(),
                translate: [100.0, 50.0],
                rotate: 15.0,
            }
        );
        assert_eq!(
            parse(r#"{"type": "set_volume", "target": "a"}"#),
            Operation::SetVolume {
                target: "a".to_string(),
                volume: 100.0,
            }
        );
        assert_eq!(
            parse(r#"{"type": "extract_audio", "target": "v"}"#),
            Operation::ExtractAudio {
                target: "v".to_string(),
                channel: 1,
            }
        );
    }

    #[test]
    fn unknown_tags_parse_as_unknown() {
        assert_eq!(parse(r#"{"type": "add_captions", "text": "hi"}"#), Operation::Unknown);
    }

    #[test]
    fn failure_policy_is_explicit_per_operation() {
        let missing = EngineError::NotFound {
            name: "x".to_string(),
        };
        let delete = parse(r#"{"type": "delete", "target": "x"}"#);
        let split = parse(r#"{"type": "split", "target": "x", "times": [1.0]}"#);
        let transform = parse(r#"{"type": "transform", "target": "x"}"#);
        let volume = parse(r#"{"type": "set_volume", "target": "x", "volume": 50}"#);

        assert_eq!(delete.failure_class(&missing), ErrorClass::Skip);
        assert_eq!(volume.failure_class(&missing), ErrorClass::Skip);
        assert_eq!(split.failure_class(&missing), ErrorClass::Fatal);
        assert_eq!(transform.failure_class(&missing), ErrorClass::Fatal);

        let collision = EngineError::NameCollision {
            name: "x_cut".to_string(),
        };
        assert_eq!(volume.failure_class(&collision), ErrorClass::Fatal);
    }
}
