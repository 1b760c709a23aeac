use std::sync::Arc;

use glam::Vec3;
use log::info;

use crate::camera::CameraState;
use crate::config::SceneConfig;
use crate::error::GlyphError;
use crate::glyph::GlyphSet;
use crate::input::{InputAction, InputController, KeyCode};
use crate::light::LightSource;
use crate::loader::PendingGlyphs;
use crate::mesh::Mesh;
use crate::scene::Scene;
use crate::sync::{FrameSynchronizer, GlyphState, SyncOutcome};

/// Summary of one [`Session::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub synchronized: bool,
    pub light_position: Vec3,
    pub camera_position: Vec3,
}

/// Render-loop context: owns the light, the camera, the input mapping and
/// the glyph surfaces, and advances them one frame at a time.
///
/// The host calls [`Session::handle_key`] for every key press and
/// [`Session::tick`] once per display refresh, strictly before drawing
/// [`Session::scene`].
#[derive(Debug)]
pub struct Session {
    light: LightSource,
    light_mesh: Arc<Mesh>,
    camera: CameraState,
    input: InputController,
    glyphs: GlyphState,
    pending: Option<PendingGlyphs>,
    synchronizer: FrameSynchronizer,
}

impl Session {
    /// Creates a session with no glyph load in flight.
    pub fn new(config: &SceneConfig) -> Self {
        let light = config.light_source();
        Self {
            light_mesh: Arc::new(light.mesh()),
            light,
            camera: config.camera_state(),
            input: InputController::new(config.input),
            glyphs: GlyphState::Pending,
            pending: None,
            synchronizer: FrameSynchronizer::new(),
        }
    }

    /// Creates a session and starts loading the glyphs in the background.
    pub fn start(config: &SceneConfig) -> Self {
        let mut session = Self::new(config);
        session.pending = Some(PendingGlyphs::spawn(config.glyph_request()));
        session
    }

    pub fn light(&self) -> &LightSource {
        &self.light
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn glyphs(&self) -> Option<&GlyphSet> {
        self.glyphs.glyphs()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn frames(&self) -> u64 {
        self.synchronizer.frames()
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<InputAction> {
        self.input
            .handle_key(key, &mut self.light, &mut self.camera)
    }

    /// Makes both glyph surfaces visible at once. Returns `false` when a set
    /// was already committed.
    pub fn commit_glyphs(&mut self, glyphs: GlyphSet) -> bool {
        let committed = self.glyphs.commit(glyphs);
        if committed {
            if let Some(set) = self.glyphs.glyphs() {
                info!(
                    "glyphs ready: {:?} ({}) and {:?} ({})",
                    set.letter.character(),
                    set.letter.material(),
                    set.digit.character(),
                    set.digit.material()
                );
            }
        }
        committed
    }

    /// Blocks until an in-flight glyph load finishes and commits it.
    pub fn wait_for_glyphs(&mut self) -> Result<(), GlyphError> {
        if let Some(pending) = self.pending.take() {
            let glyphs = pending.wait()?;
            self.commit_glyphs(glyphs);
        }
        Ok(())
    }

    /// Advances one frame: commits a finished glyph load, then copies the
    /// light position into both materials.
    ///
    /// A failed load is reported once; later ticks keep rendering without
    /// glyphs.
    pub fn tick(&mut self) -> Result<FrameReport, GlyphError> {
        if let Some(result) = self.pending.as_mut().and_then(PendingGlyphs::poll) {
            self.pending = None;
            self.commit_glyphs(result?);
        }
        let outcome = self.synchronizer.synchronize(&self.light, &mut self.glyphs);
        Ok(FrameReport {
            frame: self.synchronizer.frames(),
            synchronized: outcome == SyncOutcome::Updated,
            light_position: self.light.position,
            camera_position: self.camera.position,
        })
    }

    /// Render set for the current frame.
    pub fn scene(&self) -> Scene {
        Scene::capture(&self.light, &self.light_mesh, &self.glyphs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::GlyphRole;
    use crate::scene::{ItemId, ItemShading};

    #[test]
    fn fresh_session_ticks_without_glyphs() {
        let mut session = Session::new(&SceneConfig::default());
        let report = session.tick().unwrap();
        assert_eq!(report.frame, 1);
        assert!(!report.synchronized);
        assert_eq!(session.scene().len(), 1);
        assert!(session.glyphs().is_none());
    }

    #[test]
    fn committed_glyphs_follow_the_light() {
        let config = SceneConfig::default();
        let mut session = Session::start(&config);
        session.wait_for_glyphs().unwrap();
        assert!(!session.is_loading());

        session.handle_key(KeyCode::Character('w'));
        let report = session.tick().unwrap();
        assert!(report.synchronized);
        assert_eq!(report.light_position, Vec3::new(0.0, 0.5, 1.0));

        let scene = session.scene();
        assert_eq!(scene.len(), 3);
        for role in [GlyphRole::Letter, GlyphRole::Digit] {
            let item = scene.get(ItemId::Glyph(role)).unwrap();
            let ItemShading::Lit { uniforms, material } = item.shading else {
                panic!("glyph should be lit");
            };
            assert_eq!(material, role.material());
            assert_eq!(uniforms.light_position.y, 0.5);
        }
    }

    #[test]
    fn failed_load_is_reported_once() {
        let mut config = SceneConfig::default();
        config.glyphs.font = crate::glyph::FontLocation::Directory("/no/such/glyphs".into());
        let mut session = Session::start(&config);
        let mut failures = 0;
        for _ in 0..500 {
            match session.tick() {
                Err(_) => failures += 1,
                Ok(_) if !session.is_loading() => break,
                Ok(_) => std::thread::sleep(std::time::Duration::from_millis(5)),
            }
        }
        assert_eq!(failures, 1);
        assert!(session.tick().is_ok());
        assert!(session.glyphs().is_none());
    }
}
