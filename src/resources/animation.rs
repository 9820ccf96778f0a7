use glam::IVec2;

use crate::error::{ResourceError, Result};
use crate::geometry::IntRect;
use crate::resources::Relocatable;

/// Frame-by-frame sprite animation.
///
/// Frames are rectangles in the texture atlas, played at a fixed integer
/// frame rate. Playback state lives in the animation itself, so each consumer
/// that plays one should hold its own copy.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    frames: Vec<IntRect>,
    frame_rate: u32,
    looped: bool,
    current_frame: usize,
    /// Time not yet converted into whole frames.
    pending: f32,
}

impl Animation {
    pub fn new(frames: Vec<IntRect>, frame_rate: u32, looped: bool) -> Result<Self> {
        if frames.is_empty() {
            return Err(ResourceError::InvalidAnimation(
                "an animation needs at least one frame".to_string(),
            ));
        }
        if frame_rate == 0 {
            return Err(ResourceError::InvalidAnimation("frame rate must be positive".to_string()));
        }
        Ok(Self { frames, frame_rate, looped, current_frame: 0, pending: 0.0 })
    }

    /// Advance playback by `dt` seconds and return the frame to draw.
    ///
    /// Whole frames are consumed from the accumulated time and the remainder
    /// carries over to the next call. Looping animations wrap around;
    /// one-shot animations hold their last frame.
    pub fn get_frame(&mut self, dt: f32) -> IntRect {
        self.pending += dt.max(0.0);
        let rate = self.frame_rate as f32;
        let advance = (self.pending * rate).floor();
        self.pending -= advance / rate;

        let advance = advance as usize;
        let last = self.frames.len() - 1;
        self.current_frame = if self.looped {
            (self.current_frame + advance) % self.frames.len()
        } else {
            (self.current_frame + advance).min(last)
        };
        self.frames[self.current_frame]
    }

    /// Rewind to the first frame.
    pub fn reset(&mut self) {
        self.current_frame = 0;
        self.pending = 0.0;
    }

    #[inline]
    pub fn frames(&self) -> &[IntRect] {
        &self.frames
    }

    #[inline]
    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Seconds each frame stays on screen.
    pub fn frame_duration(&self) -> f32 {
        1.0 / self.frame_rate as f32
    }

    #[inline]
    pub fn is_looped(&self) -> bool {
        self.looped
    }

    #[inline]
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }
}

impl Relocatable for Animation {
    fn origin(&self) -> IVec2 {
        self.frames[0].position()
    }

    fn move_to(&mut self, position: IVec2) {
        let offset = position - self.origin();
        for frame in &mut self.frames {
            *frame = frame.translated(offset);
        }
    }
}
