//! SBS extension handlers
//!
//! - [`WidgetFence`]: `sbs-chess`, `sbs-bridge` and `sbs-go` fences
//! - [`StickyContainer`]: `::: sbs-sticky`
//! - [`ImageDisplay`]: `align`, `scale`, `width`, `height` on images

use crate::engine::{ContainerHandler, ExtensionRegistry, FenceHandler, ImageAttrHandler};
use crate::env::RenderEnvironment;
use crate::image_attrs::{apply_image_display, ImageElement, DISPLAY_KEYS};
use crate::sticky::STICKY_CONTAINER;
use crate::widgets::{WidgetBlock, WidgetKind};
use tracing::debug;

pub(crate) fn register_sbs_extensions(registry: &mut ExtensionRegistry) {
    for kind in WidgetKind::ALL {
        registry.register_fence(kind.tag(), Box::new(WidgetFence::new(kind)));
    }
    registry.register_container(STICKY_CONTAINER, Box::new(StickyContainer));
    registry.register_image_attrs(Box::new(ImageDisplay));
}

/// Renders one widget kind and places it in the enclosing sticky container, if any.
#[derive(Debug, Clone, Copy)]
pub struct WidgetFence {
    kind: WidgetKind,
}

impl WidgetFence {
    pub fn new(kind: WidgetKind) -> Self {
        Self { kind }
    }
}

impl FenceHandler for WidgetFence {
    fn render(&self, _info: &str, body: &str, env: &mut RenderEnvironment) -> String {
        env.note_widget(self.kind);
        let block = WidgetBlock::from_fence(self.kind, body);
        debug!(widget = self.kind.name(), "rendering widget fence");
        env.sticky_mut().wrap_widget(block.to_html())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StickyContainer;

impl ContainerHandler for StickyContainer {
    fn open(&self, env: &mut RenderEnvironment) -> String {
        env.sticky_mut().open()
    }

    fn close(&self, env: &mut RenderEnvironment) -> String {
        env.sticky_mut().close()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDisplay;

impl ImageAttrHandler for ImageDisplay {
    fn keys(&self) -> &[&str] {
        &DISPLAY_KEYS
    }

    fn apply(
        &self,
        image: &mut ImageElement,
        captured: &[(String, String)],
        env: &mut RenderEnvironment,
    ) {
        if apply_image_display(image, captured) {
            env.note_image_scale();
        }
    }
}
