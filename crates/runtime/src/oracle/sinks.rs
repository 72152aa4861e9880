use std::sync::atomic::{AtomicU8, Ordering};

use battle_core::{AudioSink, CursorMode, Position, SoundCue, UnitId, ViewSink};
use tracing::trace;

/// Headless view: logs camera and sprite requests, remembers the cursor.
#[derive(Debug, Default)]
pub struct TracingView {
    cursor: AtomicU8,
}

impl TracingView {
    pub fn cursor(&self) -> CursorMode {
        match self.cursor.load(Ordering::Relaxed) {
            0 => CursorMode::Normal,
            1 => CursorMode::None,
            2 => CursorMode::Aim,
            _ => CursorMode::Throw,
        }
    }
}

impl ViewSink for TracingView {
    fn center_on(&self, position: Position) {
        trace!(target: "runtime::worker", ?position, "camera centered");
    }

    fn cache_unit(&self, unit: UnitId) {
        trace!(target: "runtime::worker", unit = %unit, "unit sprite invalidated");
    }

    fn set_cursor(&self, mode: CursorMode) {
        let code = match mode {
            CursorMode::Normal => 0,
            CursorMode::None => 1,
            CursorMode::Aim => 2,
            CursorMode::Throw => 3,
        };
        self.cursor.store(code, Ordering::Relaxed);
        trace!(target: "runtime::worker", cursor = %mode, "cursor changed");
    }
}

/// Headless audio: every cue is logged and reported as played.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAudio;

impl AudioSink for TracingAudio {
    fn play(&self, cue: SoundCue) -> bool {
        trace!(target: "runtime::worker", set = cue.set, index = cue.index, "sound");
        true
    }
}
