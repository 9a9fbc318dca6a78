//! Image display attributes
//!
//! Images accept a trailing attribute block controlling how they are displayed:
//!
//! ```text
//! ![board](diagram.png){ align=center, scale=0.5 }
//! ![board](diagram.png){ align=left, width=300 }
//! ```
//!
//! - `align`: `left` | `center` | `right`
//! - `scale`: positive real, relative to the intrinsic image size
//! - `width` / `height`: positive integer pixels
//!
//! Commas and bare decimals are not valid in a generic attribute block, so the source is
//! first normalized line by line ([`rewrite_line`]). After parsing, the block trailing an
//! image is captured ([`parse_attr_block`]) and the display keys are turned into styles
//! ([`apply_image_display`]).
//!
//! A scale cannot be resolved to pixels at compile time because the intrinsic size of the
//! image (often remote) is unknown, so it is emitted as a `data-sbs-scale` marker for the
//! `image-attrs.js` runtime instead of a style.

use crate::error::RenderError;
use comrak::html::{escape, escape_href};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::io::Write;
use std::ops::Range;
use tracing::debug;

/// Attribute keys consumed by the display handler. They never reach the output element.
pub const DISPLAY_KEYS: [&str; 4] = ["align", "scale", "width", "height"];

static IMAGE_ATTRS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(!\[[^\]]*\]\([^)]*\))\s*\{([^}]*)\}").expect("valid regex"));
static BARE_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\b[\w-]+\s*=\s*)(\d+\.\d+)\b").expect("valid regex"));

/// Normalize the attribute blocks trailing images on one source line.
///
/// Commas become spaces, bare decimals assigned to a key are double-quoted, and the block
/// is attached directly to the image reference. Images inside code spans are left alone.
pub fn rewrite_line(line: &str) -> String {
    if !line.contains('{') {
        return line.to_string();
    }
    let spans = code_spans(line);
    IMAGE_ATTRS
        .replace_all(line, |caps: &Captures<'_>| {
            let start = caps.get(0).map_or(0, |m| m.start());
            if spans.iter().any(|span| span.contains(&start)) {
                return caps[0].to_string();
            }
            let normalized = caps[2].replace(',', " ");
            let normalized = BARE_DECIMAL.replace_all(&normalized, "$1\"$2\"");
            format!("{}{{{}}}", &caps[1], normalized)
        })
        .into_owned()
}

/// Byte ranges of the code spans on `line`: a backtick run up to the next run of the
/// same length. Unmatched runs are literal.
fn code_spans(line: &str) -> Vec<Range<usize>> {
    let bytes = line.as_bytes();
    let run_end = |mut i: usize| {
        while i < bytes.len() && bytes[i] == b'`' {
            i += 1;
        }
        i
    };

    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let open = i;
        i = run_end(i);
        let width = i - open;

        let mut j = i;
        while j < bytes.len() {
            if bytes[j] != b'`' {
                j += 1;
                continue;
            }
            let close = run_end(j);
            if close - j == width {
                spans.push(open..close);
                i = close;
                break;
            }
            j = close;
        }
    }
    spans
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Align::Left),
            "center" => Some(Align::Center),
            "right" => Some(Align::Right),
            _ => None,
        }
    }

    /// `(margin-left, margin-right)`
    fn margins(self) -> (&'static str, &'static str) {
        match self {
            Align::Left => ("0", "auto"),
            Align::Center => ("auto", "auto"),
            Align::Right => ("auto", "0"),
        }
    }
}

/// Validated display attributes. Invalid values are already dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImageDisplayAttrs {
    pub align: Option<Align>,
    pub scale: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageDisplayAttrs {
    pub fn from_captured(captured: &[(String, String)]) -> Self {
        let mut attrs = Self::default();
        for (key, value) in captured {
            match key.as_str() {
                "align" => {
                    attrs.align = Align::parse(value);
                    if attrs.align.is_none() {
                        debug!(%value, "ignoring unknown image alignment");
                    }
                }
                "scale" => attrs.scale = parse_scale(value),
                "width" => attrs.width = parse_pixels(value),
                "height" => attrs.height = parse_pixels(value),
                _ => {}
            }
        }
        attrs
    }

    fn push_align_style(&self, parts: &mut Vec<String>) {
        if let Some(align) = self.align {
            let (left, right) = align.margins();
            parts.push("display: block".to_string());
            parts.push(format!("margin-left: {left}"));
            parts.push(format!("margin-right: {right}"));
        }
    }

    fn push_size_style(&self, parts: &mut Vec<String>) {
        match (self.width, self.height) {
            (Some(width), Some(height)) => {
                parts.push(format!("width: {width}px"));
                parts.push(format!("height: {height}px"));
            }
            (Some(width), None) => {
                parts.push(format!("width: {width}px"));
                parts.push("height: auto".to_string());
            }
            (None, Some(height)) => {
                parts.push(format!("height: {height}px"));
                parts.push("width: auto".to_string());
            }
            (None, None) => {}
        }
    }
}

fn parse_scale(raw: &str) -> Option<f64> {
    let scale = raw.trim().parse::<f64>().ok();
    let valid = scale.filter(|s| s.is_finite() && *s > 0.0);
    if valid.is_none() {
        debug!(%raw, "dropping invalid image scale");
    }
    valid
}

fn parse_pixels(raw: &str) -> Option<u32> {
    let pixels = raw
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(f64::trunc)
        .filter(|v| *v >= 1.0 && *v <= f64::from(u32::MAX))
        .map(|v| v as u32);
    if pixels.is_none() {
        debug!(%raw, "dropping invalid image dimension");
    }
    pixels
}

/// An inline image re-rendered with its captured attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageElement {
    pub src: String,
    pub alt: String,
    pub title: String,
    attrs: Vec<(String, Option<String>)>,
}

impl ImageElement {
    pub fn new(src: impl Into<String>, alt: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
            title: title.into(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(n, _)| n == name)
    }

    /// Set an attribute, replacing an earlier value. Classes accumulate instead.
    pub fn set_attr(&mut self, name: &str, value: Option<String>) {
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) if name == "class" => {
                let merged = [existing.take(), value]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                *existing = Some(merged);
            }
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(n, _)| n != name);
    }

    /// Render as comrak renders images: percent-encoded `src`, escaped text attributes.
    pub fn to_html(&self) -> Result<String, RenderError> {
        let mut html = Vec::new();
        html.write_all(b"<img src=\"")?;
        escape_href(&mut html, self.src.as_bytes())?;
        html.write_all(b"\" alt=\"")?;
        escape(&mut html, self.alt.as_bytes())?;
        html.write_all(b"\"")?;
        if !self.title.is_empty() {
            html.write_all(b" title=\"")?;
            escape(&mut html, self.title.as_bytes())?;
            html.write_all(b"\"")?;
        }
        for (name, value) in &self.attrs {
            write!(html, " {name}")?;
            if let Some(value) = value {
                html.write_all(b"=\"")?;
                escape(&mut html, value.as_bytes())?;
                html.write_all(b"\"")?;
            }
        }
        html.write_all(b" />")?;
        Ok(String::from_utf8(html)?)
    }
}

/// Apply captured display attributes to `image`.
///
/// Returns `true` when a valid scale was applied, which means the document needs the
/// image scale runtime.
pub fn apply_image_display(image: &mut ImageElement, captured: &[(String, String)]) -> bool {
    let display = ImageDisplayAttrs::from_captured(captured);

    let mut style_parts = Vec::new();
    if let Some(existing) = image.attr("style").map(str::trim).filter(|s| !s.is_empty()) {
        style_parts.push(existing.trim_end_matches(';').to_string());
    }

    display.push_align_style(&mut style_parts);

    let scaled = match display.scale {
        Some(scale) => {
            image.set_attr("data-sbs-scale", Some(scale.to_string()));
            true
        }
        None => {
            display.push_size_style(&mut style_parts);
            false
        }
    };

    if !style_parts.is_empty() {
        image.set_attr("style", Some(format!("{};", style_parts.join("; "))));
    }
    for key in DISPLAY_KEYS {
        image.remove_attr(key);
    }
    scaled
}

/// Parse an attribute block (`{ key=value .class #id flag }`) at the start of `text`.
///
/// Returns the attributes in order and the number of bytes consumed. Returns `None` when
/// `text` does not start with a well-formed, non-empty block.
pub fn parse_attr_block(text: &str) -> Option<(Vec<(String, Option<String>)>, usize)> {
    let body_start = text.strip_prefix('{').map(|_| 1)?;
    let bytes = text.as_bytes();
    let mut attrs = Vec::new();
    let mut i = body_start;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i)? {
            b'}' => {
                return (!attrs.is_empty()).then_some((attrs, i + 1));
            }
            b'.' | b'#' => {
                let name = if bytes[i] == b'.' { "class" } else { "id" };
                let end = scan_bare(bytes, i + 1);
                if end == i + 1 {
                    return None;
                }
                attrs.push((name.to_string(), Some(text[i + 1..end].to_string())));
                i = end;
            }
            _ => {
                let key_end = scan_key(bytes, i);
                if key_end == i {
                    return None;
                }
                let key = text[i..key_end].to_string();
                i = key_end;
                if bytes.get(i) != Some(&b'=') {
                    attrs.push((key, None));
                    continue;
                }
                i += 1;
                let (value, end) = match bytes.get(i)? {
                    quote @ (b'"' | b'\'') => {
                        let close = text[i + 1..].find(*quote as char)? + i + 1;
                        (text[i + 1..close].to_string(), close + 1)
                    }
                    _ => {
                        let end = scan_bare(bytes, i);
                        if end == i {
                            return None;
                        }
                        (text[i..end].to_string(), end)
                    }
                };
                attrs.push((key, Some(value)));
                i = end;
            }
        }
    }
}

fn scan_key(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len()
        && (bytes[end].is_ascii_alphanumeric() || matches!(bytes[end], b'-' | b'_' | b':'))
    {
        end += 1;
    }
    end
}

fn scan_bare(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len()
        && !bytes[end].is_ascii_whitespace()
        && !matches!(bytes[end], b'}' | b'"' | b'\'' | b'{')
    {
        end += 1;
    }
    end
}
