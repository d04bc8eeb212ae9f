//! Completion banner shown when the grid is filled.
//!
//! The banner lives for `duration_ms` and blinks with a yoyo tween: opacity
//! runs linearly from 1 down to `min_opacity` over `blink_ms`, then back up.
//! In external mode nothing is drawn; `show` only counts the completion so
//! an embedding UI can react to it.

use crate::types::CelebrationConfig;

#[derive(Debug, Clone)]
pub struct CompletionBanner {
    config: CelebrationConfig,
    external: bool,
    visible: bool,
    elapsed_ms: u32,
    /// Completions reported while in external mode
    external_events: u32,
}

impl CompletionBanner {
    pub fn new(config: CelebrationConfig) -> Self {
        Self {
            config,
            external: false,
            visible: false,
            elapsed_ms: 0,
            external_events: 0,
        }
    }

    pub fn set_external(&mut self, external: bool) {
        self.external = external;
        if external {
            self.hide();
        }
    }

    pub fn is_external(&self) -> bool {
        self.external
    }

    pub fn show(&mut self) {
        if self.external {
            self.external_events += 1;
            return;
        }
        self.hide();
        self.visible = true;
    }

    /// Take the number of completions reported in external mode
    pub fn take_external_events(&mut self) -> u32 {
        std::mem::take(&mut self.external_events)
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.elapsed_ms = 0;
    }

    /// Advance the tween; hides the banner once its lifetime is over
    pub fn tick(&mut self, elapsed_ms: u32) {
        if !self.visible {
            return;
        }
        self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
        if self.elapsed_ms >= self.config.duration_ms {
            self.hide();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn remaining_ms(&self) -> u32 {
        if !self.visible {
            return 0;
        }
        self.config.duration_ms.saturating_sub(self.elapsed_ms)
    }

    /// Current opacity, 0 when hidden
    pub fn opacity(&self) -> f32 {
        if !self.visible {
            return 0.0;
        }
        let half = self.config.blink_ms.max(1);
        let phase = self.elapsed_ms % (half * 2);
        let t = if phase < half {
            phase as f32 / half as f32
        } else {
            (half * 2 - phase) as f32 / half as f32
        };
        1.0 - t * (1.0 - self.config.min_opacity)
    }
}
