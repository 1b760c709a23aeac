use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{error, info};
use parking_lot::{Condvar, Mutex};

use crate::error::GlyphError;
use crate::glyph::{load_font, GlyphRequest, GlyphSet};

pub type GlyphLoadResult = Result<GlyphSet, GlyphError>;

/// Loads the font and builds both glyph surfaces on a worker thread, then
/// calls `on_complete` exactly once with the outcome.
pub fn spawn_glyph_load<F>(request: GlyphRequest, on_complete: F) -> JoinHandle<()>
where
    F: FnOnce(GlyphLoadResult) + Send + 'static,
{
    thread::spawn(move || {
        info!("loading glyphs from font {}", request.font);
        let result = load_font(&request.font).and_then(|font| GlyphSet::build(font.as_ref(), &request));
        if let Err(err) = &result {
            error!("glyph load failed: {err}");
        }
        on_complete(result);
    })
}

#[derive(Debug, Default)]
struct Slot {
    result: Option<GlyphLoadResult>,
    finished: bool,
}

/// Handle to an in-flight glyph load.
///
/// The worker's completion callback parks the result in a shared slot;
/// [`PendingGlyphs::poll`] hands it out once.
#[derive(Debug)]
pub struct PendingGlyphs {
    shared: Arc<(Mutex<Slot>, Condvar)>,
    worker: Option<JoinHandle<()>>,
}

impl PendingGlyphs {
    pub fn spawn(request: GlyphRequest) -> Self {
        let shared = Arc::new((Mutex::new(Slot::default()), Condvar::new()));
        let completion = Arc::clone(&shared);
        let worker = spawn_glyph_load(request, move |result| {
            let (slot, ready) = &*completion;
            let mut slot = slot.lock();
            slot.result = Some(result);
            slot.finished = true;
            ready.notify_all();
        });
        Self {
            shared,
            worker: Some(worker),
        }
    }

    /// Takes the load outcome if the worker has finished.
    pub fn poll(&mut self) -> Option<GlyphLoadResult> {
        let result = self.shared.0.lock().result.take();
        if result.is_some() {
            self.reap();
            return result;
        }
        self.poll_panicked()
    }

    /// Blocks until the worker finishes and returns its outcome.
    pub fn wait(mut self) -> GlyphLoadResult {
        {
            let (slot, ready) = &*self.shared;
            let mut guard = slot.lock();
            while !guard.finished && !self.worker.as_ref().map_or(true, JoinHandle::is_finished) {
                ready.wait_for(&mut guard, std::time::Duration::from_millis(50));
            }
        }
        self.poll().unwrap_or(Err(GlyphError::LoaderPanicked))
    }

    /// A worker that exited without running its callback panicked.
    fn poll_panicked(&mut self) -> Option<GlyphLoadResult> {
        let finished = self.worker.as_ref()?.is_finished();
        if !finished || self.shared.0.lock().finished {
            return None;
        }
        self.reap();
        Some(Err(GlyphError::LoaderPanicked))
    }

    fn reap(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("glyph loader thread panicked after completing");
            }
        }
    }
}
