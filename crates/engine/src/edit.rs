//! Composite edits built from split, delete and rename.
//!
//! Each composite edit validates first, then works on a staged copy of the
//! timeline and commits only when every step succeeded, so a failed call
//! leaves the timeline untouched.

use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::time::{Fps, seconds_to_frame};
use crate::timeline::{Strip, StripContent, StripId, Timeline, ensure_media};

/// Suffix given to the fragment kept by [`Timeline::cut_between`].
pub const CUT_SUFFIX: &str = "_cut";

impl Timeline {
    /// Splits strip `name` at several times given in seconds.
    ///
    /// Times are converted with [`seconds_to_frame`]. Duplicates and frames
    /// not strictly inside the strip are dropped with a warning; the rest are
    /// applied from the highest frame down so the original strip is always the
    /// one being split. Returns the names of the original strip and every
    /// fragment created here, ascending by start frame.
    pub fn split_many(&mut self, name: &str, times: &[f64], fps: Fps) -> Result<Vec<String>> {
        let strip = self.get(name).ok_or_else(|| EngineError::not_found(name))?;
        ensure_media(strip, "split")?;
        let id = strip.id;

        let mut frames = Vec::with_capacity(times.len());
        for &seconds in times {
            let frame = seconds_to_frame(seconds, fps);
            if !strip.is_interior_frame(frame) {
                warn!(
                    name,
                    seconds,
                    frame,
                    frame_start = strip.frame_start,
                    frame_final_end = strip.frame_final_end,
                    "split point outside strip dropped"
                );
                continue;
            }
            frames.push(frame);
        }
        frames.sort_unstable();
        frames.dedup();

        if frames.is_empty() {
            return Ok(vec![name.to_string()]);
        }

        let mut staged = self.clone();
        let mut fragments = vec![id];
        for &frame in frames.iter().rev() {
            let outcome = staged.split_by_id(id, frame)?;
            fragments.push(outcome.right);
        }

        let mut placed: Vec<&Strip> = fragments
            .iter()
            .filter_map(|fragment| staged.get_by_id(*fragment))
            .collect();
        placed.sort_by_key(|strip| strip.frame_start);
        let names: Vec<String> = placed.into_iter().map(|strip| strip.name.clone()).collect();

        debug!(name, ?frames, fragments = ?names, "batch split accepted");
        *self = staged;
        Ok(names)
    }

    /// Keeps only `[start, end)` of strip `name` and returns the new name.
    ///
    /// `start` and `end` are frame offsets from the strip's first frame and
    /// must satisfy `0 <= start < end <= span`. The kept fragment is renamed
    /// to `<name>_cut` and keeps its share of the strip's transform effects;
    /// everything else derived from the strip is deleted.
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
    /// let kept = timeline.cut_between("clip", 48, 96).unwrap();
    /// let strip = timeline.get(&kept).unwrap();
    /// assert_eq!((strip.frame_start, strip.frame_final_end), (48, 96));
    /// assert_eq!(timeline.len(), 1);
    /// ```
    pub fn cut_between(&mut self, name: &str, start: i64, end: i64) -> Result<String> {
        let strip = self.get(name).ok_or_else(|| EngineError::not_found(name))?;
        ensure_media(strip, "cut")?;
        let span = strip.duration();
        if start < 0 || start >= end || end > span {
            warn!(name, start, end, span, "cut rejected: invalid range");
            return Err(EngineError::InvalidRange {
                name: name.to_string(),
                start,
                end,
                span,
            });
        }
        let cut_name = format!("{name}{CUT_SUFFIX}");
        if self.contains_name(&cut_name) {
            return Err(EngineError::name_collision(&cut_name));
        }

        let id = strip.id;
        let cut_start = strip.frame_start + start;
        let cut_end = strip.frame_start + end;

        let mut staged = self.clone();
        let mut discard = Vec::<StripId>::with_capacity(2);
        if end < span {
            let outcome = staged.split_by_id(id, cut_end)?;
            discard.push(outcome.right);
        }
        let middle = if start > 0 {
            let outcome = staged.split_by_id(id, cut_start)?;
            discard.push(outcome.left);
            outcome.right
        } else {
            id
        };

        let kept = staged.get_by_id(middle).is_some_and(|fragment| {
            fragment.frame_start >= cut_start && fragment.frame_final_end <= cut_end
        });
        if !kept {
            return Err(EngineError::IntermediateFragmentNotFound {
                name: name.to_string(),
            });
        }

        for fragment in &discard {
            staged.delete_by_id(*fragment);
        }
        staged.rename_by_id(middle, &cut_name)?;

        debug!(
            name,
            cut_name = %cut_name,
            cut_start,
            cut_end,
            discarded = discard.len(),
            "cut accepted"
        );
        *self = staged;
        Ok(cut_name)
    }

    /// [`Timeline::cut_between`] with timeline positions given in seconds.
    ///
    /// Seconds are read on the same absolute time base as
    /// [`Timeline::split_many`], then turned into offsets from the strip's
    /// first frame.
    pub fn cut_between_seconds(
        &mut self,
        name: &str,
        start_seconds: f64,
        end_seconds: f64,
        fps: Fps,
    ) -> Result<String> {
        let frame_start = self
            .get(name)
            .map(|strip| strip.frame_start)
            .ok_or_else(|| EngineError::not_found(name))?;
        self.cut_between(
            name,
            seconds_to_frame(start_seconds, fps) - frame_start,
            seconds_to_frame(end_seconds, fps) - frame_start,
        )
    }

    /// Groups existing strips into one meta strip called `output_name`.
    ///
    /// Missing members are skipped with a warning. Children keep their own
    /// channel and frame range; the meta strip spans all of them and sits on
    /// the lowest member channel, or the first channel above it with room.
    pub fn merge(&mut self, names: &[String], output_name: &str) -> Result<StripId> {
        if self.contains_name(output_name) {
            return Err(EngineError::name_collision(output_name));
        }

        let mut members = Vec::<StripId>::with_capacity(names.len());
        for name in names {
            match self.get(name) {
                Some(strip) if !members.contains(&strip.id) => members.push(strip.id),
                Some(_) => {}
                None => warn!(name = %name, output_name, "merge member not found, skipped"),
            }
        }
        if members.is_empty() {
            return Err(EngineError::NotFound {
                name: names.join(", "),
            });
        }

        let mut children: Vec<Strip> = members
            .iter()
            .filter_map(|member| self.take_by_id(*member))
            .collect();
        children.sort_by_key(|child| (child.channel, child.frame_start));

        let frame_start = children.iter().map(|child| child.frame_start).min();
        let frame_final_end = children.iter().map(|child| child.frame_final_end).max();
        let lowest_channel = children.iter().map(|child| child.channel).min();
        let (Some(frame_start), Some(frame_final_end), Some(lowest_channel)) =
            (frame_start, frame_final_end, lowest_channel)
        else {
            return Err(EngineError::NotFound {
                name: names.join(", "),
            });
        };

        let channel = self.first_free_channel(lowest_channel, frame_start, frame_final_end);
        let id = self.allocate_id();
        debug!(
            id,
            output_name,
            channel,
            frame_start,
            frame_final_end,
            members = children.len(),
            "meta strip created"
        );
        self.push(Strip {
            id,
            name: output_name.to_string(),
            channel,
            frame_start,
            frame_final_end,
            content: StripContent::Meta { children },
        });
        Ok(id)
    }
}
