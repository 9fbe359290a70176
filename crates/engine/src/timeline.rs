use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};

/// Opaque identifier for strips. Never reused within one timeline.
pub type StripId = u64;

/// Kind of source media behind a media strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

/// Coarse strip classification exposed to callers and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StripKind {
    Video,
    Audio,
    Image,
    Effect,
    Meta,
}

impl StripKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Image => "image",
            Self::Effect => "effect",
            Self::Meta => "meta",
        }
    }
}

impl From<MediaKind> for StripKind {
    fn from(value: MediaKind) -> Self {
        match value {
            MediaKind::Video => Self::Video,
            MediaKind::Audio => Self::Audio,
            MediaKind::Image => Self::Image,
        }
    }
}

/// Parameters of a transform effect layered above its input strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformParams {
    pub input: StripId,
    pub translate_x: i32,
    pub translate_y: i32,
    pub rotation_degrees: f64,
}

/// What a strip plays back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StripContent {
    Media {
        kind: MediaKind,
        source_path: PathBuf,
        /// Frame offset into the source at which this strip begins.
        source_in: i64,
        /// Linear gain, `1.0` is unchanged.
        volume: f64,
    },
    Transform(TransformParams),
    Meta {
        children: Vec<Strip>,
    },
}

/// One placed item on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strip {
    pub id: StripId,
    pub name: String,
    pub channel: u32,
    pub frame_start: i64,
    /// Exclusive end frame.
    pub frame_final_end: i64,
    pub content: StripContent,
}

impl Strip {
    pub fn kind(&self) -> StripKind {
        match &self.content {
            StripContent::Media { kind, .. } => StripKind::from(*kind),
            StripContent::Transform(_) => StripKind::Effect,
            StripContent::Meta { .. } => StripKind::Meta,
        }
    }

    /// Length in frames.
    pub fn duration(&self) -> i64 {
        self.frame_final_end - self.frame_start
    }

    pub fn overlaps(&self, frame_start: i64, frame_final_end: i64) -> bool {
        self.frame_start < frame_final_end && frame_start < self.frame_final_end
    }

    /// Returns `true` when `frame` lies strictly inside the strip.
    pub fn is_interior_frame(&self, frame: i64) -> bool {
        self.frame_start < frame && frame < self.frame_final_end
    }

    fn contains_name(&self, name: &str) -> bool {
        if self.name == name {
            return true;
        }
        match &self.content {
            StripContent::Meta { children } => children.iter().any(|child| child.contains_name(name)),
            _ => false,
        }
    }

    /// Pushes the id of this strip and of every nested child.
    fn collect_ids(&self, out: &mut Vec<StripId>) {
        out.push(self.id);
        if let StripContent::Meta { children } = &self.content {
            for child in children {
                child.collect_ids(out);
            }
        }
    }

    fn find_by_id(&self, id: StripId) -> Option<&Strip> {
        if self.id == id {
            return Some(self);
        }
        match &self.content {
            StripContent::Meta { children } => children.iter().find_map(|child| child.find_by_id(id)),
            _ => None,
        }
    }
}

/// Values for a strip about to be inserted. The timeline assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStrip {
    pub name: String,
    pub channel: u32,
    pub frame_start: i64,
    pub frame_final_end: i64,
    pub content: StripContent,
}

/// Identities of the two fragments produced by a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOutcome {
    /// Keeps the original id and name.
    pub left: StripId,
    pub right: StripId,
}

/// Multi-channel timeline owning every strip.
///
/// Top-level strips are kept ordered by `(channel, frame_start)`. Strip names
/// are unique across the whole timeline, meta children included, and strips
/// on one channel never overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub(crate) strips: Vec<Strip>,
    pub(crate) next_id: StripId,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            strips: Vec::new(),
            next_id: 1,
        }
    }

    /// Top-level strips ordered by channel, then start frame.
    pub fn strips(&self) -> &[Strip] {
        &self.strips
    }

    /// Top-level strips on `channel` ordered by start frame.
    pub fn channel(&self, channel: u32) -> impl Iterator<Item = &Strip> {
        self.strips
            .iter()
            .filter(move |strip| strip.channel == channel)
    }

    pub fn len(&self) -> usize {
        self.strips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }

    /// Finds a top-level strip by name.
    pub fn get(&self, name: &str) -> Option<&Strip> {
        self.strips.iter().find(|strip| strip.name == name)
    }

    /// Finds a strip by id, looking inside meta strips too.
    pub fn get_by_id(&self, id: StripId) -> Option<&Strip> {
        self.strips.iter().find_map(|strip| strip.find_by_id(id))
    }

    /// Returns `true` if any strip, nested or not, is called `name`.
    pub fn contains_name(&self, name: &str) -> bool {
        self.strips.iter().any(|strip| strip.contains_name(name))
    }

    /// Largest exclusive end frame over all strips.
    pub fn frame_end(&self) -> Option<i64> {
        self.strips.iter().map(|strip| strip.frame_final_end).max()
    }

    /// Returns `name` when free, otherwise the first free derived name.
    ///
    /// # Example
    /// ```
    /// use sequencer::Timeline;
    ///
    /// let timeline = Timeline::new();
    /// assert_eq!(timeline.unique_name("clip"), "clip");
    /// ```
    pub fn unique_name(&self, name: &str) -> String {
        if self.contains_name(name) {
            self.derived_name(base_name(name))
        } else {
            name.to_string()
        }
    }

    /// Returns the first free `<base>.<NNN>` name.
    pub fn derived_name(&self, base: &str) -> String {
        let mut suffix = 1_u32;
        loop {
            let candidate = format!("{base}.{suffix:03}");
            if !self.contains_name(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Returns `true` when no top-level strip on `channel` overlaps the range.
    pub fn is_channel_free(&self, channel: u32, frame_start: i64, frame_final_end: i64) -> bool {
        !self
            .channel(channel)
            .any(|strip| strip.overlaps(frame_start, frame_final_end))
    }

    /// First channel at or above `from` with room for the range.
    ///
    /// The search stops at `u32::MAX`, which is returned even when busy.
    pub fn first_free_channel(&self, from: u32, frame_start: i64, frame_final_end: i64) -> u32 {
        let mut channel = from.max(1);
        while channel < u32::MAX && !self.is_channel_free(channel, frame_start, frame_final_end) {
            channel += 1;
        }
        channel
    }

    /// Inserts a strip after validating name, length and channel occupancy.
    pub fn insert(&mut self, strip: NewStrip) -> Result<StripId> {
        if strip.frame_final_end <= strip.frame_start {
            return Err(EngineError::EmptyStrip {
                name: strip.name,
                frame_start: strip.frame_start,
                frame_final_end: strip.frame_final_end,
            });
        }
        if self.contains_name(&strip.name) {
            return Err(EngineError::name_collision(&strip.name));
        }
        if !self.is_channel_free(strip.channel, strip.frame_start, strip.frame_final_end) {
            return Err(EngineError::ChannelOccupied {
                channel: strip.channel,
                frame_start: strip.frame_start,
                frame_final_end: strip.frame_final_end,
            });
        }

        let id = self.allocate_id();
        debug!(
            id,
            name = %strip.name,
            channel = strip.channel,
            frame_start = strip.frame_start,
            frame_final_end = strip.frame_final_end,
            "strip inserted"
        );
        self.push(Strip {
            id,
            name: strip.name,
            channel: strip.channel,
            frame_start: strip.frame_start,
            frame_final_end: strip.frame_final_end,
            content: strip.content,
        });
        Ok(id)
    }

    /// Splits strip `name` into two contiguous strips at `frame`.
    ///
    /// The left fragment keeps the id and name and covers
    /// `[frame_start, frame)`; the right fragment covers
    /// `[frame, frame_final_end)` under a derived name. Frames outside the
    /// open interval of the strip are rejected. Transform effects on the
    /// strip are split with it.
    ///
    /// # Example
    /// ```
    /// use std::path::PathBuf;
    /// use sequencer::timeline::{MediaKind, NewStrip, StripContent, Timeline};
    ///
    /// let mut timeline = Timeline::new();
    /// timeline
    ///     .insert(NewStrip {
    ///         name: "clip".to_string(),
    ///         channel: 1,
    ///         frame_start: 0,
    ///         frame_final_end: 240,
    ///         content: StripContent::Media {
    ///             kind: MediaKind::Video,
    ///             source_path: PathBuf::from("clip.mp4"),
    ///             source_in: 0,
    ///             volume: 1.0,
    ///         },
    ///     })
    ///     .unwrap();
    ///
    /// let outcome = timeline.split("clip", 100).unwrap();
    /// assert_eq!(timeline.get_by_id(outcome.right).unwrap().name, "clip.001");
    /// ```
    pub fn split(&mut self, name: &str, frame: i64) -> Result<SplitOutcome> {
        let id = self
            .get(name)
            .map(|strip| strip.id)
            .ok_or_else(|| EngineError::not_found(name))?;
        self.split_by_id(id, frame)
    }

    pub(crate) fn split_by_id(&mut self, id: StripId, frame: i64) -> Result<SplitOutcome> {
        let index = self
            .index_of_id(id)
            .ok_or_else(|| EngineError::not_found(&id.to_string()))?;
        let current = &self.strips[index];
        ensure_media(current, "split")?;
        if !current.is_interior_frame(frame) {
            warn!(
                name = %current.name,
                frame,
                frame_start = current.frame_start,
                frame_final_end = current.frame_final_end,
                "split rejected: frame outside strip"
            );
            return Err(EngineError::InvalidFrame {
                name: current.name.clone(),
                frame,
                frame_start: current.frame_start,
                frame_final_end: current.frame_final_end,
            });
        }

        let right_id = self.split_at_index(index, frame);
        self.split_dependent_effects(id, right_id, frame);
        Ok(SplitOutcome {
            left: id,
            right: right_id,
        })
    }

    /// Cuts the strip at `index` in two at an interior `frame` and returns
    /// the id of the right piece.
    fn split_at_index(&mut self, index: usize, frame: i64) -> StripId {
        let right_name = self.derived_name(base_name(&self.strips[index].name));
        let right_id = self.allocate_id();
        let left = &mut self.strips[index];
        let offset = frame - left.frame_start;

        let mut right = left.clone();
        right.id = right_id;
        right.name = right_name;
        right.frame_start = frame;
        if let StripContent::Media { source_in, .. } = &mut right.content {
            *source_in += offset;
        }
        left.frame_final_end = frame;

        debug!(
            name = %left.name,
            left_id = left.id,
            right_id,
            right_name = %right.name,
            frame,
            left_duration = left.duration(),
            right_duration = right.duration(),
            "split accepted"
        );

        self.push(right);
        right_id
    }

    /// Splits the transform effects of `input` along with it. Effect pieces
    /// at or after `frame` follow the right fragment.
    fn split_dependent_effects(&mut self, input: StripId, right_input: StripId, frame: i64) {
        for effect_id in self.dependent_effects(&[input]) {
            let Some(index) = self.index_of_id(effect_id) else {
                continue;
            };
            let effect = &self.strips[index];
            let target = if effect.is_interior_frame(frame) {
                self.split_at_index(index, frame)
            } else if effect.frame_start >= frame {
                effect_id
            } else {
                continue;
            };
            if let Some(index) = self.index_of_id(target) {
                if let StripContent::Transform(params) = &mut self.strips[index].content {
                    params.input = right_input;
                }
            }
        }
    }

    /// Deletes a top-level strip and any transform effects that use it.
    ///
    /// Absent names are logged and ignored.
    pub fn delete(&mut self, name: &str) -> Option<Strip> {
        let Some(id) = self.get(name).map(|strip| strip.id) else {
            warn!(name, "delete skipped: strip not found");
            return None;
        };
        self.delete_by_id(id)
    }

    pub(crate) fn delete_by_id(&mut self, id: StripId) -> Option<Strip> {
        let removed = self.take_by_id(id)?;
        debug!(id, name = %removed.name, "strip deleted");

        let mut removed_ids = Vec::new();
        removed.collect_ids(&mut removed_ids);
        for dependent in self.dependent_effects(&removed_ids) {
            if let Some(effect) = self.delete_by_id(dependent) {
                debug!(
                    effect = %effect.name,
                    input = %removed.name,
                    "dependent effect deleted"
                );
            }
        }

        Some(removed)
    }

    /// Renames a top-level strip.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        let id = self
            .get(old)
            .map(|strip| strip.id)
            .ok_or_else(|| EngineError::not_found(old))?;
        self.rename_by_id(id, new)
    }

    pub(crate) fn rename_by_id(&mut self, id: StripId, new: &str) -> Result<()> {
        let index = self
            .index_of_id(id)
            .ok_or_else(|| EngineError::not_found(&id.to_string()))?;
        if self.strips[index].name == new {
            return Ok(());
        }
        if self.contains_name(new) {
            return Err(EngineError::name_collision(new));
        }

        let strip = &mut self.strips[index];
        debug!(id, old = %strip.name, new, "strip renamed");
        strip.name = new.to_string();
        Ok(())
    }

    pub(crate) fn allocate_id(&mut self) -> StripId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Removes a top-level strip without touching dependents.
    pub(crate) fn take_by_id(&mut self, id: StripId) -> Option<Strip> {
        let index = self.index_of_id(id)?;
        Some(self.strips.remove(index))
    }

    pub(crate) fn push(&mut self, strip: Strip) {
        let index = self
            .strips
            .partition_point(|existing| {
                (existing.channel, existing.frame_start) <= (strip.channel, strip.frame_start)
            });
        self.strips.insert(index, strip);
    }

    /// Top-level transform effects whose input is one of `inputs`.
    fn dependent_effects(&self, inputs: &[StripId]) -> Vec<StripId> {
        self.strips
            .iter()
            .filter(|strip| {
                matches!(
                    &strip.content,
                    StripContent::Transform(params) if inputs.contains(&params.input)
                )
            })
            .map(|strip| strip.id)
            .collect()
    }

    fn index_of_id(&self, id: StripId) -> Option<usize> {
        self.strips.iter().position(|strip| strip.id == id)
    }
}

/// Strips a trailing `.<digits>` suffix from a strip name.
///
/// # Example
/// ```
/// use sequencer::timeline::base_name;
///
/// assert_eq!(base_name("clip.002"), "clip");
/// assert_eq!(base_name("clip"), "clip");
/// assert_eq!(base_name("take.v2"), "take.v2");
/// ```
pub fn base_name(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((base, suffix))
            if !base.is_empty()
                && suffix.len() >= 3
                && suffix.bytes().all(|byte| byte.is_ascii_digit()) =>
        {
            base
        }
        _ => name,
    }
}

pub(crate) fn ensure_media(strip: &Strip, operation: &'static str) -> Result<()> {
    match strip.content {
        StripContent::Media { .. } => Ok(()),
        _ => Err(EngineError::UnsupportedStrip {
            name: strip.name.clone(),
            kind: strip.kind().as_str(),
            operation,
        }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use super::{MediaKind, NewStrip, StripContent, Timeline, TransformParams, base_name};
    use crate::error::EngineError;

    pub(crate) fn media(name: &str, channel: u32, frame_start: i64, frame_final_end: i64) -> NewStrip {
        NewStrip {
            name: name.to_string(),
            channel,
            frame_start,
            frame_final_end,
            content: StripContent::Media {
                kind: MediaKind::Video,
                source_path: PathBuf::from(format!("{name}.mp4")),
                source_in: 0,
                volume: 1.0,
            },
        }
    }

    pub(crate) fn single_clip() -> Timeline {
        let mut timeline = Timeline::new();
        timeline
            .insert(media("clip", 1, 0, 240))
            .expect("insert clip");
        timeline
    }

    pub(crate) fn ranges(timeline: &Timeline, channel: u32) -> Vec<(i64, i64)> {
        timeline
            .channel(channel)
            .map(|strip| (strip.frame_start, strip.frame_final_end))
            .collect()
    }

    /// Range and x translation of every transform effect applied to `name`.
    pub(crate) fn effects_on(timeline: &Timeline, name: &str) -> Vec<(i64, i64, i32)> {
        let Some(input) = timeline.get(name).map(|strip| strip.id) else {
            return Vec::new();
        };
        timeline
            .strips()
            .iter()
            .filter_map(|strip| match &strip.content {
                StripContent::Transform(params) if params.input == input => {
                    Some((strip.frame_start, strip.frame_final_end, params.translate_x))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn split_partitions_range_without_gap_or_overlap() {
        let mut timeline = single_clip();

        let outcome = timeline.split("clip", 100).expect("split should succeed");

        let left = timeline.get_by_id(outcome.left).expect("left exists");
        let right = timeline.get_by_id(outcome.right).expect("right exists");
        assert_eq!((left.frame_start, left.frame_final_end), (0, 100));
        assert_eq!((right.frame_start, right.frame_final_end), (100, 240));
        assert_eq!(left.name, "clip");
        assert_eq!(right.name, "clip.001");
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn split_advances_source_offset_of_right_fragment() {
        let mut timeline = Timeline::new();
        let mut strip = media("clip", 1, 10, 110);
        strip.content = StripContent::Media {
            kind: MediaKind::Video,
            source_path: PathBuf::from("clip.mp4"),
            source_in: 5,
            volume: 1.0,
        };
        timeline.insert(strip).expect("insert");

        let outcome = timeline.split("clip", 40).expect("split should succeed");

        let right = timeline.get_by_id(outcome.right).expect("right exists");
        let StripContent::Media { source_in, .. } = right.content else {
            panic!("right fragment must stay a media strip");
        };
        assert_eq!(source_in, 35);
    }

    #[test]
    fn split_twice_never_collides_on_names() {
        let mut timeline = single_clip();

        let first = timeline.split("clip", 200).expect("first split");
        let second = timeline.split("clip", 50).expect("second split");

        let first_name = &timeline.get_by_id(first.right).expect("exists").name;
        let second_name = &timeline.get_by_id(second.right).expect("exists").name;
        assert_ne!(first_name, second_name);
        assert_eq!(ranges(&timeline, 1), vec![(0, 50), (50, 200), (200, 240)]);
    }

    #[test]
    fn split_of_derived_fragment_uses_base_name() {
        let mut timeline = single_clip();
        timeline.split("clip", 100).expect("split");

        let outcome = timeline.split("clip.001", 150).expect("split fragment");

        assert_eq!(
            timeline.get_by_id(outcome.right).expect("exists").name,
            "clip.002"
        );
    }

    #[test]
    fn split_at_boundaries_or_outside_is_rejected() {
        let mut timeline = single_clip();

        for frame in [0, 240, -1, 100_000] {
            let result = timeline.split("clip", frame);
            assert!(
                matches!(result, Err(EngineError::InvalidFrame { frame: f, .. }) if f == frame),
                "frame {frame} must be rejected"
            );
        }
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn split_of_missing_strip_reports_not_found() {
        let mut timeline = single_clip();
        assert!(matches!(
            timeline.split("nope", 10),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn split_carries_transform_effects_onto_both_fragments() {
        let mut timeline = single_clip();
        timeline.transform("clip", (100, 0), 0.0).expect("transform");

        let outcome = timeline.split("clip", 120).expect("split");

        let right = timeline.get_by_id(outcome.right).expect("right").name.clone();
        assert_eq!(effects_on(&timeline, "clip"), vec![(0, 120, 100)]);
        assert_eq!(effects_on(&timeline, &right), vec![(120, 240, 100)]);
        assert_eq!(timeline.len(), 4);
    }

    #[test]
    fn first_free_channel_stops_at_the_last_channel() {
        let mut timeline = Timeline::new();
        timeline
            .insert(media("top", u32::MAX, 0, 10))
            .expect("insert");

        assert_eq!(timeline.first_free_channel(u32::MAX, 0, 10), u32::MAX);
        assert!(matches!(
            timeline.transform("top", (0, 0), 0.0),
            Err(EngineError::ChannelOccupied { .. })
        ));
    }

    #[test]
    fn insert_rejects_overlap_on_same_channel_only() {
        let mut timeline = single_clip();

        let overlap = timeline.insert(media("other", 1, 100, 300));
        assert!(matches!(overlap, Err(EngineError::ChannelOccupied { channel: 1, .. })));

        timeline
            .insert(media("other", 2, 100, 300))
            .expect("other channel is free");
        timeline
            .insert(media("after", 1, 240, 300))
            .expect("adjacent range does not overlap");
    }

    #[test]
    fn insert_rejects_zero_length_and_duplicate_names() {
        let mut timeline = single_clip();

        assert!(matches!(
            timeline.insert(media("empty", 2, 10, 10)),
            Err(EngineError::EmptyStrip { .. })
        ));
        assert!(matches!(
            timeline.insert(media("clip", 3, 0, 10)),
            Err(EngineError::NameCollision { .. })
        ));
    }

    #[test]
    fn delete_missing_strip_is_a_noop() {
        let mut timeline = single_clip();
        assert!(timeline.delete("missing").is_none());
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn delete_removes_dependent_transform_effects() {
        let mut timeline = single_clip();
        let id = timeline.get("clip").expect("clip").id;
        timeline
            .insert(NewStrip {
                name: "Transform_clip".to_string(),
                channel: 2,
                frame_start: 0,
                frame_final_end: 240,
                content: StripContent::Transform(TransformParams {
                    input: id,
                    translate_x: 10,
                    translate_y: 0,
                    rotation_degrees: 0.0,
                }),
            })
            .expect("insert effect");

        let removed = timeline.delete("clip").expect("clip removed");

        assert_eq!(removed.name, "clip");
        assert!(timeline.is_empty());
    }

    #[test]
    fn rename_rejects_existing_name() {
        let mut timeline = single_clip();
        timeline.insert(media("other", 2, 0, 10)).expect("insert");

        assert!(matches!(
            timeline.rename("clip", "other"),
            Err(EngineError::NameCollision { .. })
        ));
        timeline.rename("clip", "intro").expect("rename to free name");
        assert!(timeline.get("intro").is_some());
        assert!(timeline.get("clip").is_none());
    }

    #[test]
    fn strips_stay_ordered_by_channel_then_start() {
        let mut timeline = Timeline::new();
        timeline.insert(media("c", 2, 0, 10)).expect("insert");
        timeline.insert(media("b", 1, 50, 60)).expect("insert");
        timeline.insert(media("a", 1, 0, 10)).expect("insert");

        let names: Vec<_> = timeline.strips().iter().map(|strip| strip.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn first_free_channel_skips_occupied_channels() {
        let mut timeline = single_clip();
        timeline.insert(media("two", 2, 100, 200)).expect("insert");

        assert_eq!(timeline.first_free_channel(1, 150, 160), 3);
        assert_eq!(timeline.first_free_channel(2, 0, 100), 2);
    }

    #[test]
    fn base_name_only_strips_numeric_suffixes() {
        assert_eq!(base_name("clip.001"), "clip");
        assert_eq!(base_name("clip.1"), "clip.1");
        assert_eq!(base_name(".001"), ".001");
        assert_eq!(base_name("my.clip.0042"), "my.clip");
    }
}
