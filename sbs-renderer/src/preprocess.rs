//! Source pre-pass
//!
//!     comrak has neither generic containers nor attribute blocks, so the source is scanned
//!     line by line before parsing. Outside code:
//!
//!         ::: sbs-sticky          →   <!-- sbs-container open sbs-sticky -->
//!         :::                     →   <!-- sbs-container close sbs-sticky -->
//!         ![a](u) { x=1, s=0.5 }  →   ![a](u){ x=1  s="0.5" }
//!
//!     Markers are standalone HTML blocks (blank lines around them) so they survive parsing
//!     as `HtmlBlock` nodes that the engine hands to the registered container handler.
//!     Only registered container names are lowered; anything else stays text.
//!
//!     Which lines are code is decided by comrak itself: the source is parsed once up front
//!     and every line covered by a fenced or indented code block is passed through
//!     untouched, wherever the block sits (list items, block quotes).
//!
//!     The marker tag is chosen so that it never occurs in the source, so a comment typed
//!     by the author can not open or close a container. Containers still open at end of
//!     input are left to the engine, which closes them after the last block.

use crate::image_attrs;
use comrak::nodes::NodeValue;
use comrak::{parse_document, Arena, ComrakOptions};
use tracing::debug;

const MARKER_TAG: &str = "sbs-container";

/// A container boundary recovered from the HTML comment emitted by the pre-pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerMarker {
    Open(String),
    Close(String),
}

impl ContainerMarker {
    pub fn name(&self) -> &str {
        match self {
            ContainerMarker::Open(name) | ContainerMarker::Close(name) => name,
        }
    }
}

/// Comment syntax of the markers emitted for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSyntax {
    tag: String,
}

impl MarkerSyntax {
    /// Pick the first tag that does not occur anywhere in `text`.
    pub fn for_source(text: &str) -> Self {
        let mut tag = MARKER_TAG.to_string();
        let mut n = 0usize;
        while text.contains(tag.as_str()) {
            n += 1;
            tag = format!("{MARKER_TAG}-{n}");
        }
        Self { tag }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Recognize a marker in the literal of an HTML block.
    pub fn parse(&self, html: &str) -> Option<ContainerMarker> {
        let body = html.trim().strip_prefix("<!-- ")?.strip_suffix(" -->")?;
        let rest = body.strip_prefix(self.tag.as_str())?.strip_prefix(' ')?;
        if let Some(name) = rest.strip_prefix("open ") {
            return Some(ContainerMarker::Open(name.to_string()));
        }
        rest.strip_prefix("close ")
            .map(|name| ContainerMarker::Close(name.to_string()))
    }

    fn block(&self, marker: &ContainerMarker) -> String {
        let action = match marker {
            ContainerMarker::Open(_) => "open",
            ContainerMarker::Close(_) => "close",
        };
        format!("\n<!-- {} {action} {} -->\n\n", self.tag, marker.name())
    }
}

/// Pre-pass output: the rewritten text and the syntax of the markers it contains.
#[derive(Debug, Clone)]
pub struct NormalizedSource {
    pub text: String,
    pub markers: MarkerSyntax,
}

enum ColonLine<'a> {
    Open { colons: usize, name: &'a str },
    Close { colons: usize },
}

fn scan_colons(line: &str) -> Option<ColonLine<'_>> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let colons = trimmed.chars().take_while(|c| *c == ':').count();
    if colons < 3 {
        return None;
    }
    let rest = trimmed[colons..].trim();
    match rest.split_whitespace().next() {
        Some(name) => Some(ColonLine::Open { colons, name }),
        None => Some(ColonLine::Close { colons }),
    }
}

/// Whether `line`, stripped of block quote markers and indentation, closes a fence of
/// `len` × `ch`.
fn closes_fence(line: &str, ch: u8, len: usize) -> bool {
    let rest = line.trim_start_matches(|c: char| matches!(c, '>' | ' ' | '\t'));
    let run = rest.bytes().take_while(|b| *b == ch).count();
    run >= len && rest[run..].trim().is_empty()
}

/// Per-line flags: `true` where the line belongs to a code block as comrak parses `text`.
fn code_lines(text: &str, options: &ComrakOptions<'_>) -> Vec<bool> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut code = vec![false; lines.len()];

    let arena = Arena::new();
    let root = parse_document(&arena, text, options);
    for node in root.descendants() {
        let ast = node.data.borrow();
        let NodeValue::CodeBlock(block) = &ast.value else {
            continue;
        };
        let start = ast.sourcepos.start.line.max(1);
        let end = if block.fenced {
            // an implicitly closed fence ends at its last content line
            let last_content = start + block.literal.lines().count();
            let closer = last_content + 1;
            let closed = lines
                .get(closer - 1)
                .is_some_and(|line| closes_fence(line, block.fence_char, block.fence_length));
            if closed {
                closer
            } else {
                last_content
            }
        } else {
            ast.sourcepos.end.line
        };
        for flag in code.iter_mut().take(end).skip(start - 1) {
            *flag = true;
        }
    }
    code
}

/// Lower registered containers to markers and normalize image attribute blocks.
///
/// `options` must be the options the engine parses the result with. `is_container`
/// decides which container names are registered.
pub fn normalize_source(
    text: &str,
    options: &ComrakOptions<'_>,
    is_container: impl Fn(&str) -> bool,
) -> NormalizedSource {
    let markers = MarkerSyntax::for_source(text);
    let code = code_lines(text, options);
    let mut out = String::with_capacity(text.len() + 64);
    let mut open: Vec<(String, usize)> = Vec::new();

    for (index, line) in text.split_inclusive('\n').enumerate() {
        if code.get(index).copied().unwrap_or(false) {
            out.push_str(line);
            continue;
        }

        match scan_colons(line) {
            Some(ColonLine::Open { colons, name }) if is_container(name) => {
                open.push((name.to_string(), colons));
                out.push_str(&markers.block(&ContainerMarker::Open(name.to_string())));
            }
            Some(ColonLine::Close { colons })
                if open.last().is_some_and(|(_, opened)| colons >= *opened) =>
            {
                if let Some((name, _)) = open.pop() {
                    out.push_str(&markers.block(&ContainerMarker::Close(name)));
                }
            }
            _ => out.push_str(&image_attrs::rewrite_line(line)),
        }
    }

    if !open.is_empty() {
        debug!(unclosed = open.len(), "containers left open at end of input");
    }

    NormalizedSource { text: out, markers }
}
