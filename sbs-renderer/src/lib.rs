//! SBS flavored Markdown to HTML
//!
//!     SBS documents are CommonMark plus three extensions for game notation pages:
//!
//!         ```sbs-chess            fenced widgets (chess, bridge, go) become custom elements
//!         title: Ruy Lopez        carrying a YAML header as attributes and the notation
//!         ---                     as a typed <script> payload
//!         1. e4 e5 2. Nf3 Nc6
//!         ```
//!
//!         ::: sbs-sticky          the first widget of a sticky container is pinned beside
//!         ...                     the narration that follows it
//!         :::
//!
//!         ![d](d.png){ align=center, scale=0.5 }     display attributes on images
//!
//!     The renderer never interprets notation. It only transports it to the page, where the
//!     widget runtime under `widgets/` does the drawing. A standalone document links only the
//!     runtime scripts its content needs.
//!
//!     This is a pure lib: no file system, no env vars, no printing. The sbs-cli crate is the
//!     shell around it.
//!
//! Architecture
//!
//!     .
//!     ├── renderer.rs         # SbsRenderer facade: fragments and documents
//!     ├── engine.rs           # comrak wrapper, handler traits, ExtensionRegistry
//!     ├── extensions.rs       # widget fence, sticky container, image display handlers
//!     ├── preprocess.rs       # fence-aware pre-pass: container markers, image blocks
//!     ├── env.rs              # per-render state: asset usage, sticky stack
//!     ├── fence_config.rs     # YAML header / payload split
//!     ├── widgets             # per-kind attribute tables, serialization, payload escaping
//!     ├── sticky.rs           # sticky container state machine
//!     ├── image_attrs.rs      # align / scale / width / height
//!     └── document.rs         # page shell and asset declarations
//!
//!     Every per-render mutation goes through a RenderEnvironment passed explicitly to the
//!     handlers, so a renderer is immutable once built.
//!
//! Testing
//!
//!     tests
//!     ├── lib.rs
//!     ├── <area>.rs
//!     └── fixtures
//!         └── <docname>.md
//!
//!     Note that rust does not by default discover tests in subdirectories, so they are included
//!     as modules from tests/lib.rs.

pub mod document;
pub mod engine;
pub mod env;
pub mod error;
pub mod extensions;
pub mod fence_config;
pub mod image_attrs;
pub mod preprocess;
pub mod renderer;
pub mod sticky;
pub mod widgets;

pub use engine::{
    ContainerHandler, EngineOptions, ExtensionRegistry, FenceHandler, ImageAttrHandler,
    MarkdownEngine,
};
pub use env::RenderEnvironment;
pub use error::RenderError;
pub use renderer::{RendererOptions, SbsRenderer};
pub use widgets::{WidgetBlock, WidgetKind};
