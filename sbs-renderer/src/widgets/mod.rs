//! Widget fence blocks
//!
//!     Every widget kind (chess, bridge, go) is the same algorithm parameterized by a static
//!     table: which config keys become first-class attributes, how their values are encoded,
//!     where the payload lives and which MIME type the payload script carries.
//!
//!     | Fence tag    | Element        | Payload keys     | Script type                |
//!     |--------------|----------------|------------------|----------------------------|
//!     | `sbs-chess`  | `<sbs-chess>`  | `pgn`, `data`    | `application/x-chess-pgn`  |
//!     | `sbs-bridge` | `<sbs-bridge>` | `pbn`, `data`    | `application/pbn`          |
//!     | `sbs-go`     | `<sbs-go>`     | `sgf`, `data`    | `text/sgf`                 |
//!
//!     The format-specific payload key wins over the generic `data` key. Payload text is
//!     written verbatim into the script element; see [`payload::escape_script_payload`].

pub mod attributes;
pub mod payload;

use crate::fence_config::{parse_fence_config, FenceConfig};
use attributes::serialize_attributes;
use payload::escape_script_payload;

pub use attributes::Attribute;

/// The widget kinds understood by the renderer.
///
/// Ordering is the order runtime scripts are declared in the document head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WidgetKind {
    Bridge,
    Chess,
    Go,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 3] = [WidgetKind::Bridge, WidgetKind::Chess, WidgetKind::Go];

    /// Short name, also the widget's asset directory.
    pub fn name(self) -> &'static str {
        match self {
            WidgetKind::Bridge => "bridge",
            WidgetKind::Chess => "chess",
            WidgetKind::Go => "go",
        }
    }

    /// Fence language tag, which doubles as the custom element name.
    pub fn tag(self) -> &'static str {
        match self {
            WidgetKind::Bridge => "sbs-bridge",
            WidgetKind::Chess => "sbs-chess",
            WidgetKind::Go => "sbs-go",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            WidgetKind::Bridge => "application/pbn",
            WidgetKind::Chess => "application/x-chess-pgn",
            WidgetKind::Go => "text/sgf",
        }
    }

    pub fn spec(self) -> &'static AttributeSpec {
        match self {
            WidgetKind::Bridge => &BRIDGE_SPEC,
            WidgetKind::Chess => &CHESS_SPEC,
            WidgetKind::Go => &GO_SPEC,
        }
    }
}

/// How a boolean config value is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolStyle {
    /// `name='true'` / `name='false'`
    Literal,
    /// bare `name` when true, omitted when false
    Presence,
    /// bare `name` when true, `name='false'` when false
    PresenceOrFalse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueClass {
    Text,
    Boolean(BoolStyle),
    Numeric,
}

/// One row of a widget's attribute table.
#[derive(Debug)]
pub struct AttrRule {
    /// Config keys feeding this attribute; the first one present wins.
    pub keys: &'static [&'static str],
    pub attr: &'static str,
    pub class: ValueClass,
    pub default: Option<&'static str>,
}

impl AttrRule {
    const fn text(key: &'static [&'static str], attr: &'static str) -> Self {
        Self {
            keys: key,
            attr,
            class: ValueClass::Text,
            default: None,
        }
    }

    const fn with_default(self, default: &'static str) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    const fn boolean(key: &'static [&'static str], attr: &'static str, style: BoolStyle) -> Self {
        Self {
            keys: key,
            attr,
            class: ValueClass::Boolean(style),
            default: None,
        }
    }

    const fn numeric(key: &'static [&'static str], attr: &'static str) -> Self {
        Self {
            keys: key,
            attr,
            class: ValueClass::Numeric,
            default: None,
        }
    }
}

/// Per-kind attribute table.
#[derive(Debug)]
pub struct AttributeSpec {
    pub rules: &'static [AttrRule],
    /// Keys that carry the payload, in precedence order. Never emitted as attributes.
    pub payload_keys: &'static [&'static str],
}

impl AttributeSpec {
    /// Whether `key` feeds one of the table's attributes.
    pub fn claims(&self, key: &str) -> bool {
        self.rules.iter().any(|rule| rule.keys.contains(&key))
    }
}

const LANG: AttrRule = AttrRule::text(&["lang"], "lang").with_default("zh");

static CHESS_SPEC: AttributeSpec = AttributeSpec {
    rules: &[
        LANG,
        AttrRule::text(&["title"], "title"),
        AttrRule::text(&["fen"], "fen"),
        AttrRule::text(&["layout"], "layout"),
        AttrRule::text(&["orientation"], "orientation"),
        AttrRule::boolean(&["interactive"], "interactive", BoolStyle::Literal),
        AttrRule::boolean(&["coords"], "coords", BoolStyle::Literal),
        AttrRule::numeric(&["size"], "size"),
    ],
    payload_keys: &["pgn", "data"],
};

static BRIDGE_SPEC: AttributeSpec = AttributeSpec {
    rules: &[
        LANG,
        AttrRule::text(&["format"], "data-format").with_default("pbn"),
    ],
    payload_keys: &["pbn", "data"],
};

static GO_SPEC: AttributeSpec = AttributeSpec {
    rules: &[
        LANG,
        AttrRule::text(&["theme"], "theme"),
        AttrRule::text(&["size"], "size"),
        AttrRule::boolean(&["interactive"], "interactive", BoolStyle::Presence),
        AttrRule::boolean(&["coords"], "coords", BoolStyle::PresenceOrFalse),
        AttrRule::numeric(&["board"], "board"),
        AttrRule::numeric(&["initialMove", "move"], "initial-move"),
        AttrRule::text(&["showMoveNumbers"], "show-move-numbers"),
    ],
    payload_keys: &["sgf", "data"],
};

/// One widget fence instance, ready to be turned into markup.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetBlock {
    kind: WidgetKind,
    config: FenceConfig,
}

impl WidgetBlock {
    pub fn new(kind: WidgetKind, config: FenceConfig) -> Self {
        Self { kind, config }
    }

    /// Build a block from the raw body of a fenced code block.
    pub fn from_fence(kind: WidgetKind, raw: &str) -> Self {
        let payload_key = kind.spec().payload_keys[0];
        Self::new(kind, parse_fence_config(raw, payload_key))
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn config(&self) -> &FenceConfig {
        &self.config
    }

    /// Trimmed payload text, if there is any.
    pub fn payload(&self) -> Option<String> {
        self.config
            .first_of(self.kind.spec().payload_keys)
            .map(|payload| payload.trim().to_string())
            .filter(|payload| !payload.is_empty())
    }

    pub fn attributes(&self) -> Vec<Attribute> {
        serialize_attributes(&self.config, self.kind.spec())
    }

    /// Serialize to the `<sbs-*>` custom element.
    ///
    /// An empty payload yields an element without a script child.
    pub fn to_html(&self) -> String {
        let element = self.kind.tag();
        let mut html = format!("<{element}");
        for attr in self.attributes() {
            html.push(' ');
            html.push_str(&attr.to_html());
        }
        html.push('>');

        if let Some(payload) = self.payload() {
            html.push_str(&format!(
                "<script type='{}'>{}</script>",
                self.kind.mime_type(),
                escape_script_payload(&payload)
            ));
        }

        html.push_str(&format!("</{element}>"));
        html
    }
}
