use crate::cue::CuePointDispatcher;
use crate::scene::SceneGraph;
use crate::scheduler::UpdateScheduler;
use crate::timeline;
use std::time::Instant;

/// The three services every scene mutation can touch.
///
/// Kept apart from the `Director` so scene managers and widgets can borrow
/// it mutably while the director still owns the scene stack.
#[derive(Debug, Default)]
pub struct Runtime {
    pub graph: SceneGraph,
    pub scheduler: UpdateScheduler,
    pub cues: CuePointDispatcher,
}

impl Runtime {
    pub fn new(fps: f32) -> Self {
        Self {
            graph: SceneGraph::new(),
            scheduler: UpdateScheduler::new(fps),
            cues: CuePointDispatcher::new(),
        }
    }

    /// Advances every playing timeline by one frame.
    ///
    /// Works on a snapshot of the registered set; a timeline stopped by an
    /// earlier update in the same step is skipped.
    pub fn step(&mut self) {
        let playing = self.scheduler.registered().to_vec();
        for id in playing {
            if self.scheduler.contains(id) {
                timeline::update(self, id);
            }
        }
    }

    /// Polls the scheduler and steps when a frame is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.scheduler.poll(now) {
            self.step();
            true
        } else {
            false
        }
    }
}
