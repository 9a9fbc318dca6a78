//! Markdown engine and extension registry
//!
//! The engine wraps comrak with the SBS extension points:
//!
//! 1.  **Fences**: a fenced code block whose info string starts with a registered language is
//!     rendered by its [`FenceHandler`] instead of as `<pre><code>`.
//! 2.  **Containers**: `::: name` blocks (lowered to comment markers by the
//!     [pre-pass](crate::preprocess)) call the open/close halves of a [`ContainerHandler`].
//! 3.  **Image attributes**: keys of the `{ … }` block trailing an image are routed to the
//!     [`ImageAttrHandler`] that claims them; unclaimed keys become plain `<img>` attributes.
//!
//! # Pipeline
//!
//!     source ─► pre-pass ─► comrak parse ─► extension pass (pre-order) ─► format_html
//!
//! The extension pass visits nodes in document order, so a container's open handler always
//! runs before the fences it contains, and its close handler after them.
//!
//! # Concurrency
//!
//! Handlers are `Send + Sync` and receive the [`RenderEnvironment`] explicitly; the engine
//! keeps no per-render state. One engine can be shared across threads as long as every
//! render brings its own environment.

use crate::env::RenderEnvironment;
use crate::error::RenderError;
use crate::image_attrs::{parse_attr_block, ImageElement};
use crate::preprocess::{normalize_source, ContainerMarker, MarkerSyntax};
use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
use comrak::{format_html, parse_document, Arena, ComrakOptions};
use std::collections::HashMap;
use tracing::debug;

/// Renders the body of a fenced block claimed by language tag.
pub trait FenceHandler: Send + Sync {
    /// `info` is the full info string; `body` is the raw fence content.
    fn render(&self, info: &str, body: &str, env: &mut RenderEnvironment) -> String;
}

/// Renders the boundaries of a named container.
pub trait ContainerHandler: Send + Sync {
    fn open(&self, env: &mut RenderEnvironment) -> String;

    fn close(&self, env: &mut RenderEnvironment) -> String;
}

/// Consumes a set of image attribute keys.
pub trait ImageAttrHandler: Send + Sync {
    /// Keys this handler claims. Claimed keys never reach the output element.
    fn keys(&self) -> &[&str];

    /// Apply the claimed `(key, value)` pairs to `image`. Bare keys carry an empty value.
    fn apply(
        &self,
        image: &mut ImageElement,
        captured: &[(String, String)],
        env: &mut RenderEnvironment,
    );

    fn claims(&self, key: &str) -> bool {
        self.keys().contains(&key)
    }
}

/// Handler lookup for the three extension points.
pub struct ExtensionRegistry {
    fences: HashMap<String, Box<dyn FenceHandler>>,
    containers: HashMap<String, Box<dyn ContainerHandler>>,
    image_attrs: Vec<Box<dyn ImageAttrHandler>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self {
            fences: HashMap::new(),
            containers: HashMap::new(),
            image_attrs: Vec::new(),
        }
    }

    /// Creates a registry with the widget fences, the sticky container and image display
    /// attributes pre-registered.
    pub fn default_with_sbs() -> Self {
        let mut registry = Self::new();
        crate::extensions::register_sbs_extensions(&mut registry);
        registry
    }

    /// Registers a handler for a fence language, replacing any earlier one.
    pub fn register_fence(&mut self, lang: &str, handler: Box<dyn FenceHandler>) {
        self.fences.insert(lang.to_string(), handler);
    }

    pub fn register_container(&mut self, name: &str, handler: Box<dyn ContainerHandler>) {
        self.containers.insert(name.to_string(), handler);
    }

    /// Registers an image attribute handler. Earlier registrations win on shared keys.
    pub fn register_image_attrs(&mut self, handler: Box<dyn ImageAttrHandler>) {
        self.image_attrs.push(handler);
    }

    pub fn fence(&self, lang: &str) -> Option<&dyn FenceHandler> {
        self.fences.get(lang).map(|handler| handler.as_ref())
    }

    pub fn container(&self, name: &str) -> Option<&dyn ContainerHandler> {
        self.containers.get(name).map(|handler| handler.as_ref())
    }

    fn image_handler_index(&self, key: &str) -> Option<usize> {
        self.image_attrs.iter().position(|handler| handler.claims(key))
    }

    /// Registered fence languages, sorted.
    pub fn fence_languages(&self) -> Vec<&str> {
        let mut langs: Vec<_> = self.fences.keys().map(String::as_str).collect();
        langs.sort_unstable();
        langs
    }

    /// Registered container names, sorted.
    pub fn container_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.containers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Every image attribute key claimed by some handler.
    pub fn image_attr_keys(&self) -> Vec<&str> {
        self.image_attrs
            .iter()
            .flat_map(|handler| handler.keys().iter().copied())
            .collect()
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// CommonMark extensions toggled on the underlying parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub autolink: bool,
    pub tables: bool,
    pub strikethrough: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            autolink: true,
            tables: false,
            strikethrough: false,
        }
    }
}

impl EngineOptions {
    fn comrak_options(&self) -> ComrakOptions<'static> {
        let mut options = ComrakOptions::default();
        options.extension.autolink = self.autolink;
        options.extension.table = self.tables;
        options.extension.strikethrough = self.strikethrough;
        // Widget and container markup is emitted as raw HTML blocks
        options.render.unsafe_ = true;
        options
    }
}

/// comrak plus an [`ExtensionRegistry`].
pub struct MarkdownEngine {
    options: EngineOptions,
    registry: ExtensionRegistry,
}

impl MarkdownEngine {
    pub fn new(options: EngineOptions, registry: ExtensionRegistry) -> Self {
        Self { options, registry }
    }

    pub fn with_sbs_extensions(options: EngineOptions) -> Self {
        Self::new(options, ExtensionRegistry::default_with_sbs())
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Render `source` to an HTML fragment, recording asset usage in `env`.
    ///
    /// An environment serves exactly one render; passing it again fails with
    /// [`RenderError::EnvironmentReused`].
    #[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
    pub fn render(&self, source: &str, env: &mut RenderEnvironment) -> Result<String, RenderError> {
        if env.is_consumed() {
            return Err(RenderError::EnvironmentReused);
        }
        env.mark_consumed();

        let options = self.options.comrak_options();
        let normalized = normalize_source(source, &options, |name| {
            self.registry.container(name).is_some()
        });

        let arena = Arena::new();
        let root = parse_document(&arena, &normalized.text, &options);

        let mut pass = ExtensionPass {
            registry: &self.registry,
            markers: &normalized.markers,
            open: Vec::new(),
        };
        let nodes: Vec<_> = root.descendants().collect();
        for node in nodes {
            pass.visit(node, env)?;
        }

        let mut html = Vec::new();
        format_html(root, &options, &mut html)?;
        let mut html = String::from_utf8(html)?;

        // containers still open at end of input close after the last block
        while let Some(name) = pass.open.pop() {
            if let Some(handler) = self.registry.container(&name) {
                push_block(&mut html, handler.close(env));
            }
        }
        Ok(html)
    }
}

/// One walk over the parsed document, dispatching nodes to the registered handlers.
struct ExtensionPass<'r> {
    registry: &'r ExtensionRegistry,
    markers: &'r MarkerSyntax,
    /// Containers opened so far and not yet closed, innermost last.
    open: Vec<String>,
}

impl ExtensionPass<'_> {
    fn visit<'a>(
        &mut self,
        node: &'a AstNode<'a>,
        env: &mut RenderEnvironment,
    ) -> Result<(), RenderError> {
        if matches!(node.data.borrow().value, NodeValue::Image(_)) {
            return self.apply_image_attrs(node, env);
        }

        let replacement = match &node.data.borrow().value {
            NodeValue::CodeBlock(code) if code.fenced => {
                let lang = code.info.split_whitespace().next().unwrap_or_default();
                self.registry
                    .fence(lang)
                    .map(|handler| handler.render(&code.info, &code.literal, env))
            }
            NodeValue::HtmlBlock(html) => self
                .markers
                .parse(&html.literal)
                .and_then(|marker| self.apply_container(marker, env)),
            _ => None,
        };

        if let Some(mut literal) = replacement {
            if !literal.ends_with('\n') {
                literal.push('\n');
            }
            node.data.borrow_mut().value = NodeValue::HtmlBlock(NodeHtmlBlock {
                block_type: 6,
                literal,
            });
        }
        Ok(())
    }

    fn apply_container(
        &mut self,
        marker: ContainerMarker,
        env: &mut RenderEnvironment,
    ) -> Option<String> {
        let handler = self.registry.container(marker.name())?;
        match marker {
            ContainerMarker::Open(name) => {
                self.open.push(name);
                Some(handler.open(env))
            }
            ContainerMarker::Close(name) => {
                if self.open.last() != Some(&name) {
                    debug!(%name, "ignoring close marker without a matching open");
                    return None;
                }
                self.open.pop();
                Some(handler.close(env))
            }
        }
    }

    fn apply_image_attrs<'a>(
        &self,
        node: &'a AstNode<'a>,
        env: &mut RenderEnvironment,
    ) -> Result<(), RenderError> {
        let link = match &node.data.borrow().value {
            NodeValue::Image(link) => link.clone(),
            _ => return Ok(()),
        };
        let Some(parsed) = capture_attr_block(node) else {
            return Ok(());
        };

        let mut image = ImageElement::new(link.url, alt_text(node), link.title);
        let mut claimed: Vec<Vec<(String, String)>> =
            vec![Vec::new(); self.registry.image_attrs.len()];
        for (key, value) in parsed {
            match self.registry.image_handler_index(&key) {
                Some(index) => claimed[index].push((key, value.unwrap_or_default())),
                None => image.set_attr(&key, value),
            }
        }
        for (handler, captured) in self.registry.image_attrs.iter().zip(&claimed) {
            if !captured.is_empty() {
                handler.apply(&mut image, captured, env);
            }
        }

        debug!(src = %image.src, "image attributes applied");
        let html = image.to_html()?;
        for child in node.children().collect::<Vec<_>>() {
            child.detach();
        }
        node.data.borrow_mut().value = NodeValue::HtmlInline(html);
        Ok(())
    }
}

fn push_block(html: &mut String, block: String) {
    if !html.is_empty() && !html.ends_with('\n') {
        html.push('\n');
    }
    html.push_str(&block);
    if !block.ends_with('\n') {
        html.push('\n');
    }
}

/// Parse and consume the attribute block held by the text nodes following `image`.
fn capture_attr_block<'a>(image: &'a AstNode<'a>) -> Option<Vec<(String, Option<String>)>> {
    let mut texts = Vec::new();
    let mut joined = String::new();
    let mut next = image.next_sibling();
    while let Some(sibling) = next {
        match &sibling.data.borrow().value {
            NodeValue::Text(text) => joined.push_str(text),
            _ => break,
        }
        texts.push(sibling);
        next = sibling.next_sibling();
    }

    let (attrs, mut remaining) = parse_attr_block(&joined)?;
    for sibling in texts {
        if remaining == 0 {
            break;
        }
        let len = match &sibling.data.borrow().value {
            NodeValue::Text(text) => text.len(),
            _ => 0,
        };
        if len <= remaining {
            remaining -= len;
            sibling.detach();
        } else {
            if let NodeValue::Text(text) = &mut sibling.data.borrow_mut().value {
                text.drain(..remaining);
            }
            remaining = 0;
        }
    }
    Some(attrs)
}

fn alt_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut alt = String::new();
    collect_plain_text(node, &mut alt);
    alt
}

fn collect_plain_text<'a>(node: &'a AstNode<'a>, output: &mut String) {
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Text(text) => output.push_str(text),
            NodeValue::Code(code) => output.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => output.push(' '),
            _ => collect_plain_text(child, output),
        }
    }
}
