//! Non-destructive additions on top of existing strips: transform effects,
//! volume and audio extraction.

use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::timeline::{MediaKind, NewStrip, StripContent, Timeline, TransformParams};

/// Upper bound for [`Timeline::set_volume`], in percent.
pub const MAX_VOLUME_PERCENT: f64 = 200.0;

impl Timeline {
    /// Adds a transform effect strip named `Transform_<name>` above `name`.
    ///
    /// The effect covers the target's frame range on the first free channel
    /// above the target. The target strip itself is not modified.
    pub fn transform(
        &mut self,
        name: &str,
        translate: (i32, i32),
        rotation_degrees: f64,
    ) -> Result<String> {
        self.add_transform_effect("Transform", name, translate, rotation_degrees)
    }

    /// Adds a rotation-only transform effect named `Rotate_<name>`.
    pub fn rotate(&mut self, name: &str, degrees: f64) -> Result<String> {
        self.add_transform_effect("Rotate", name, (0, 0), degrees)
    }

    /// Adds a translation-only transform effect named `Translate_<name>`.
    pub fn translate(&mut self, name: &str, dx: i32, dy: i32) -> Result<String> {
        self.add_transform_effect("Translate", name, (dx, dy), 0.0)
    }

    fn add_transform_effect(
        &mut self,
        prefix: &str,
        name: &str,
        (translate_x, translate_y): (i32, i32),
        rotation_degrees: f64,
    ) -> Result<String> {
        let target = self.get(name).ok_or_else(|| EngineError::not_found(name))?;
        let input = target.id;
        let (frame_start, frame_final_end) = (target.frame_start, target.frame_final_end);
        let channel =
            self.first_free_channel(target.channel.saturating_add(1), frame_start, frame_final_end);
        let effect_name = self.unique_name(&format!("{prefix}_{name}"));

        self.insert(NewStrip {
            name: effect_name.clone(),
            channel,
            frame_start,
            frame_final_end,
            content: StripContent::Transform(TransformParams {
                input,
                translate_x,
                translate_y,
                rotation_degrees,
            }),
        })?;
        debug!(
            target = name,
            effect = %effect_name,
            channel,
            translate_x,
            translate_y,
            rotation_degrees,
            "transform effect added"
        );
        Ok(effect_name)
    }

    /// Sets the volume of an audio strip from a percentage.
    ///
    /// Values outside `0..=200` are clamped with a warning. Returns the
    /// stored linear gain.
    pub fn set_volume(&mut self, name: &str, percent: f64) -> Result<f64> {
        let strip = self
            .strips
            .iter_mut()
            .find(|strip| strip.name == name)
            .ok_or_else(|| EngineError::not_found(name))?;
        let kind = strip.kind();
        let StripContent::Media {
            kind: MediaKind::Audio,
            volume,
            ..
        } = &mut strip.content
        else {
            return Err(EngineError::UnsupportedStrip {
                name: name.to_string(),
                kind: kind.as_str(),
                operation: "set_volume",
            });
        };

        let clamped = if percent.is_nan() {
            100.0
        } else {
            percent.clamp(0.0, MAX_VOLUME_PERCENT)
        };
        if clamped != percent {
            warn!(name, percent, clamped, "volume outside 0..=200 percent clamped");
        }
        *volume = clamped / 100.0;
        debug!(name, percent = clamped, gain = *volume, "volume set");
        Ok(*volume)
    }

    /// Adds an audio strip `<name>_audio` playing the sound of video strip
    /// `name` over the same frames.
    ///
    /// The audio lands on `channel`, or the first channel above it with room.
    pub fn extract_audio(&mut self, name: &str, channel: u32) -> Result<String> {
        let strip = self.get(name).ok_or_else(|| EngineError::not_found(name))?;
        let StripContent::Media {
            kind: MediaKind::Video,
            source_path,
            source_in,
            ..
        } = &strip.content
        else {
            return Err(EngineError::UnsupportedStrip {
                name: name.to_string(),
                kind: strip.kind().as_str(),
                operation: "extract_audio",
            });
        };

        let audio_name = format!("{name}_audio");
        if self.contains_name(&audio_name) {
            return Err(EngineError::name_collision(&audio_name));
        }
        let new_strip = NewStrip {
            name: audio_name.clone(),
            channel: self.first_free_channel(channel, strip.frame_start, strip.frame_final_end),
            frame_start: strip.frame_start,
            frame_final_end: strip.frame_final_end,
            content: StripContent::Media {
                kind: MediaKind::Audio,
                source_path: source_path.clone(),
                source_in: *source_in,
                volume: 1.0,
            },
        };

        debug!(
            source = name,
            audio = %audio_name,
            channel = new_strip.channel,
            "audio extracted"
        );
        self.insert(new_strip)?;
        Ok(audio_name)
    }
}
