//! Animation clips and playback.
//!
//! The simulation only picks clip names and advances frame clocks; drawing
//! the frames is left to whoever reads [`AnimationController`].

use std::collections::HashMap;

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::movement::Facing;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationClip {
    pub frame_count: u32,
    /// Seconds per frame.
    pub frame_duration: f32,
    pub looping: bool,
}

impl AnimationClip {
    pub const fn looping(frame_count: u32, frame_duration: f32) -> Self {
        Self {
            frame_count,
            frame_duration,
            looping: true,
        }
    }

    pub const fn once(frame_count: u32, frame_duration: f32) -> Self {
        Self {
            frame_count,
            frame_duration,
            looping: false,
        }
    }

    pub fn duration(&self) -> f32 {
        self.frame_count as f32 * self.frame_duration
    }
}

/// Clip sets registered for each kind of entity.
pub struct ClipLibrary;

impl ClipLibrary {
    pub fn player() -> HashMap<String, AnimationClip> {
        clips(&[
            ("idle", AnimationClip::looping(4, 0.15)),
            ("run", AnimationClip::looping(6, 0.1)),
            ("jump", AnimationClip::once(2, 0.1)),
            ("fall", AnimationClip::looping(2, 0.1)),
            ("wall_slide", AnimationClip::looping(2, 0.15)),
            ("wall_climb", AnimationClip::looping(4, 0.1)),
            ("dash", AnimationClip::once(3, 0.06)),
            ("attack1", AnimationClip::once(3, 0.1)),
            ("attack2", AnimationClip::once(5, 0.07)),
            ("attack3", AnimationClip::once(5, 0.1)),
        ])
    }

    pub fn enemy() -> HashMap<String, AnimationClip> {
        clips(&[
            ("idle", AnimationClip::looping(4, 0.15)),
            ("walk", AnimationClip::looping(4, 0.15)),
            ("attack", AnimationClip::once(4, 0.05)),
            ("hurt", AnimationClip::once(2, 0.15)),
            ("death", AnimationClip::once(4, 0.125)),
        ])
    }

    pub fn boss() -> HashMap<String, AnimationClip> {
        clips(&[
            ("idle", AnimationClip::looping(4, 0.2)),
            ("melee", AnimationClip::once(5, 0.1)),
            ("ranged", AnimationClip::once(8, 0.1)),
            ("area", AnimationClip::once(10, 0.1)),
            ("death", AnimationClip::once(6, 0.15)),
        ])
    }
}

fn clips(entries: &[(&str, AnimationClip)]) -> HashMap<String, AnimationClip> {
    entries
        .iter()
        .map(|(name, clip)| (name.to_string(), *clip))
        .collect()
}

/// Per-entity animation playback.
#[derive(Component, Debug, Clone)]
pub struct AnimationController {
    clips: HashMap<String, AnimationClip>,
    current: String,
    current_frame: u32,
    frame_timer: f32,
    finished: bool,
    pub facing: Facing,
}

impl AnimationController {
    /// Create a controller and start playing `initial` if it is a known clip.
    pub fn new(clips: HashMap<String, AnimationClip>, initial: &str) -> Self {
        let mut controller = Self {
            clips,
            current: String::new(),
            current_frame: 0,
            frame_timer: 0.0,
            finished: false,
            facing: Facing::Right,
        };
        controller.play(initial, true);
        controller
    }

    /// Switch clips. Playing the current clip again is a no-op unless
    /// `force_restart` is set; unknown clips are ignored.
    pub fn play(&mut self, name: &str, force_restart: bool) {
        if !self.clips.contains_key(name) {
            warn!("Unknown animation clip '{}'", name);
            return;
        }
        if self.current == name && !force_restart {
            return;
        }
        self.current = name.to_string();
        self.current_frame = 0;
        self.frame_timer = 0.0;
        self.finished = false;
    }

    /// Advance the clock. Returns the clip name when a non-looping clip
    /// reaches its last frame.
    pub fn update(&mut self, dt: f32) -> Option<String> {
        let clip = *self.clips.get(&self.current)?;
        if self.finished || clip.frame_count == 0 || clip.frame_duration <= 0.0 {
            return None;
        }

        self.frame_timer += dt;
        while self.frame_timer >= clip.frame_duration {
            self.frame_timer -= clip.frame_duration;
            self.current_frame += 1;
            if self.current_frame >= clip.frame_count {
                if clip.looping {
                    self.current_frame = 0;
                } else {
                    self.current_frame = clip.frame_count - 1;
                    self.finished = true;
                    return Some(self.current.clone());
                }
            }
        }
        None
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn has_clip(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }
}

/// Message fired when a non-looping animation completes.
#[derive(Debug)]
pub struct AnimationFinished {
    pub entity: Entity,
    pub clip: String,
}

impl Message for AnimationFinished {}

/// System that advances every animation clock.
pub fn update_animation_frames(
    time: Res<Time>,
    mut query: Query<(Entity, &mut AnimationController)>,
    mut finished_events: MessageWriter<AnimationFinished>,
) {
    let dt = time.delta_secs();
    for (entity, mut controller) in &mut query {
        if let Some(clip) = controller.update(dt) {
            finished_events.write(AnimationFinished { entity, clip });
        }
    }
}
