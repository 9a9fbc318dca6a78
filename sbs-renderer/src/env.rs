//! Per-render environment
//!
//! Everything a single render call mutates lives here: asset usage and the sticky stack.
//! Handlers receive it explicitly, so one engine can serve concurrent renders as long as
//! each call brings its own environment.

use crate::sticky::StickyStack;
use crate::widgets::WidgetKind;
use std::collections::BTreeSet;

#[derive(Debug, Default)]
pub struct RenderEnvironment {
    used_widgets: BTreeSet<WidgetKind>,
    used_image_scale: bool,
    pub(crate) sticky: StickyStack,
    consumed: bool,
}

impl RenderEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note_widget(&mut self, kind: WidgetKind) {
        self.used_widgets.insert(kind);
    }

    pub fn note_image_scale(&mut self) {
        self.used_image_scale = true;
    }

    /// Widget kinds rendered so far, in head declaration order.
    pub fn used_widgets(&self) -> impl Iterator<Item = WidgetKind> + '_ {
        self.used_widgets.iter().copied()
    }

    pub fn uses_widget(&self, kind: WidgetKind) -> bool {
        self.used_widgets.contains(&kind)
    }

    pub fn uses_image_scale(&self) -> bool {
        self.used_image_scale
    }

    pub fn sticky(&self) -> &StickyStack {
        &self.sticky
    }

    pub fn sticky_mut(&mut self) -> &mut StickyStack {
        &mut self.sticky
    }

    /// Whether a render has already run against this environment.
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    pub(crate) fn mark_consumed(&mut self) {
        self.consumed = true;
    }
}
