//! Sticky layout containers
//!
//!     A `::: sbs-sticky` container pins its first widget while the narration that follows
//!     scrolls beside it:
//!
//!         <div class='sbs-sticky-container'>
//!         <div class='sbs-sticky-figure'><sbs-chess …></sbs-chess></div>
//!         <div class='sbs-sticky-body'>
//!         <p>narration…</p>
//!         </div>
//!         </div>
//!
//!     Each open container owns a [`StickyFrame`]. Frames form a stack that lives in the
//!     per-render environment; only the innermost frame can take a figure, so nested
//!     containers never see each other's widgets.

use tracing::trace;

/// Container name recognized after the `:::` marker.
pub const STICKY_CONTAINER: &str = "sbs-sticky";

const CONTAINER_OPEN: &str = "<div class='sbs-sticky-container'>\n";
const FIGURE_OPEN: &str = "<div class='sbs-sticky-figure'>";
const BODY_OPEN: &str = "<div class='sbs-sticky-body'>\n";
const DIV_CLOSE: &str = "</div>\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickyState {
    AwaitingFigure,
    BodyOpen,
}

/// Layout state of one open sticky container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StickyFrame {
    pub figure_assigned: bool,
    pub body_open: bool,
}

impl StickyFrame {
    pub fn state(&self) -> StickyState {
        if self.body_open {
            StickyState::BodyOpen
        } else {
            StickyState::AwaitingFigure
        }
    }
}

/// LIFO stack of open sticky containers for one render.
#[derive(Debug, Clone, Default)]
pub struct StickyStack {
    frames: Vec<StickyFrame>,
}

impl StickyStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn innermost(&self) -> Option<&StickyFrame> {
        self.frames.last()
    }

    /// Push a frame for a newly opened container and return its opening markup.
    pub fn open(&mut self) -> String {
        self.frames.push(StickyFrame::default());
        trace!(depth = self.frames.len(), "sticky container opened");
        CONTAINER_OPEN.to_string()
    }

    /// Wrap widget markup as the figure of the innermost container, if it still needs one.
    ///
    /// The figure is followed by an unterminated body wrapper that [`StickyStack::close`]
    /// terminates. Outside any container, or once the figure is taken, `html` is returned
    /// unchanged.
    pub fn wrap_widget(&mut self, html: String) -> String {
        let Some(frame) = self.frames.last_mut() else {
            return html;
        };
        if frame.figure_assigned {
            return html;
        }

        frame.figure_assigned = true;
        frame.body_open = true;
        trace!(depth = self.frames.len(), "sticky figure assigned");
        format!("{FIGURE_OPEN}{html}</div>\n{BODY_OPEN}")
    }

    /// Pop the innermost frame and return the closing markup.
    ///
    /// A close without a matching open only closes the container element.
    pub fn close(&mut self) -> String {
        let frame = self.frames.pop();
        trace!(depth = self.frames.len(), had_frame = frame.is_some(), "sticky container closed");

        let mut closing = String::new();
        if frame.is_some_and(|frame| frame.body_open) {
            closing.push_str(DIV_CLOSE);
        }
        closing.push_str(DIV_CLOSE);
        closing
    }
}
