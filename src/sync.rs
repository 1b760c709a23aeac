use glam::Vec3;
use log::{debug, warn};

use crate::glyph::GlyphSet;
use crate::light::LightSource;

/// Glyph surfaces as seen by the render loop: either still loading or fully
/// built and committed.
#[derive(Debug, Default)]
pub enum GlyphState {
    #[default]
    Pending,
    Ready(GlyphSet),
}

impl GlyphState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn glyphs(&self) -> Option<&GlyphSet> {
        match self {
            Self::Ready(set) => Some(set),
            Self::Pending => None,
        }
    }

    /// Commits a loaded glyph set. Only the first commit takes effect.
    pub fn commit(&mut self, glyphs: GlyphSet) -> bool {
        if self.is_ready() {
            warn!("glyphs are already committed; ignoring a second set");
            return false;
        }
        *self = Self::Ready(glyphs);
        true
    }
}

/// Whether a frame's synchronization touched the materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Glyphs not loaded yet; nothing to update.
    Skipped,
    Updated,
}

/// Copies the light position into both materials once per frame, before the
/// frame is drawn.
#[derive(Debug, Default)]
pub struct FrameSynchronizer {
    frames: u64,
    last_synced: Option<Vec3>,
}

impl FrameSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn synchronize(&mut self, light: &LightSource, glyphs: &mut GlyphState) -> SyncOutcome {
        self.frames += 1;
        let GlyphState::Ready(set) = glyphs else {
            return SyncOutcome::Skipped;
        };
        set.set_light_position(light.position);
        if self.last_synced != Some(light.position) {
            debug!("frame {}: light now at {}", self.frames, light.position);
            self.last_synced = Some(light.position);
        }
        SyncOutcome::Updated
    }

    /// Number of frames this synchronizer has run for.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::{BlockFont, FontLocation, GlyphOptions, GlyphRequest, GlyphSpec};

    fn glyphs() -> GlyphSet {
        let request = GlyphRequest {
            font: FontLocation::Builtin,
            options: GlyphOptions::default(),
            ambient_intensity: 0.314,
            light_position: Vec3::new(0.0, 0.0, 1.0),
            letter: GlyphSpec {
                character: 'S',
                color: Vec3::ONE,
                offset: Vec3::new(-4.0, 0.0, 0.0),
            },
            digit: GlyphSpec {
                character: '4',
                color: Vec3::ONE,
                offset: Vec3::new(2.0, 0.0, 0.0),
            },
        };
        GlyphSet::build(&BlockFont, &request).unwrap()
    }

    #[test]
    fn pending_glyphs_are_skipped() {
        let mut sync = FrameSynchronizer::new();
        let mut state = GlyphState::Pending;
        let light = LightSource::default();
        assert_eq!(sync.synchronize(&light, &mut state), SyncOutcome::Skipped);
        assert_eq!(sync.synchronize(&light, &mut state), SyncOutcome::Skipped);
        assert!(!state.is_ready());
        assert_eq!(sync.frames(), 2);
    }

    #[test]
    fn copies_light_position_into_both_materials() {
        let mut sync = FrameSynchronizer::new();
        let mut state = GlyphState::Pending;
        assert!(state.commit(glyphs()));
        let mut light = LightSource::default();
        light.position = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(sync.synchronize(&light, &mut state), SyncOutcome::Updated);
        for surface in state.glyphs().unwrap().surfaces() {
            assert_eq!(surface.uniforms().light_position, light.position);
        }
    }

    #[test]
    fn uniforms_are_a_copy_not_a_live_binding() {
        let mut sync = FrameSynchronizer::new();
        let mut state = GlyphState::Ready(glyphs());
        let mut light = LightSource::default();
        sync.synchronize(&light, &mut state);
        light.position.y += 0.5;
        let set = state.glyphs().unwrap();
        assert_eq!(set.letter.uniforms().light_position.y, 0.0);
        sync.synchronize(&light, &mut state);
        assert_eq!(state.glyphs().unwrap().letter.uniforms().light_position.y, 0.5);
    }

    #[test]
    fn synchronizing_twice_is_idempotent() {
        let mut sync = FrameSynchronizer::new();
        let mut state = GlyphState::Ready(glyphs());
        let light = LightSource::default();
        sync.synchronize(&light, &mut state);
        let first: Vec<_> = state.glyphs().unwrap().surfaces().map(|s| *s.uniforms()).to_vec();
        sync.synchronize(&light, &mut state);
        let second: Vec<_> = state.glyphs().unwrap().surfaces().map(|s| *s.uniforms()).to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn second_commit_is_ignored() {
        let mut state = GlyphState::Pending;
        assert!(state.commit(glyphs()));
        let mut other = glyphs();
        other.set_light_position(Vec3::splat(9.0));
        assert!(!state.commit(other));
        assert_ne!(
            state.glyphs().unwrap().letter.uniforms().light_position,
            Vec3::splat(9.0)
        );
    }
}
