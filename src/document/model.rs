//! In-memory document types (the verbose, version 1 shape).

use serde::{Deserialize, Serialize};

use super::VERBOSE_VERSION;
use crate::id::generate_character_id;
use crate::paper_color::ColorName;

/// A single character printed on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// X position relative to the page (not the window)
    #[serde(rename = "posX")]
    pub pos_x: f64,
    /// Y position relative to the page (not the window)
    #[serde(rename = "posY")]
    pub pos_y: f64,
    /// Identity used by the UI for reconciliation; not stable across loads
    pub id: String,
    /// Rendered glyph, possibly several code points
    pub value: String,
    /// Drawn in erase mode (rendered with the paper color)
    pub erase: bool,
}

impl Character {
    /// Create a character with a fresh id.
    pub fn new(value: impl Into<String>, pos_x: f64, pos_y: f64, erase: bool) -> Self {
        Self {
            pos_x,
            pos_y,
            id: generate_character_id(),
            value: value.into(),
            erase,
        }
    }

    /// Equal on everything the file format persists (ignores `id`).
    pub fn same_print(&self, other: &Character) -> bool {
        self.pos_x == other.pos_x
            && self.pos_y == other.pos_y
            && self.value == other.value
            && self.erase == other.erase
    }
}

/// One pen stroke sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Stroke width
    pub w: f64,
    /// Opacity
    pub o: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, w: f64, o: f64) -> Self {
        Self { x, y, w, o }
    }
}

/// Pen sample, `None` marks the pen lifting between two strokes.
pub type PenMark = Option<Point>;

/// The document as held in memory and sent over `FILE_CONTENT`.
///
/// Always the verbose shape: the version number only exists on the wire, so
/// serializing writes `version: 1.0` and deserializing rejects anything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "VerboseWire", try_from = "VerboseWire")]
pub struct VerboseDocument {
    /// Characters in insertion order (not position order)
    pub content: Vec<Character>,
    /// Stroke samples with `None` separators
    pub pen_markings: Vec<PenMark>,
    /// Explicitly chosen paper color
    pub paper_color: Option<ColorName>,
}

impl VerboseDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nothing typed and nothing drawn.
    pub fn is_blank(&self) -> bool {
        self.content.is_empty() && self.pen_markings.iter().all(Option::is_none)
    }

    /// Number of strokes, counting runs of points between separators.
    pub fn stroke_count(&self) -> usize {
        let mut strokes = 0;
        let mut in_stroke = false;
        for mark in &self.pen_markings {
            match mark {
                Some(_) if !in_stroke => {
                    strokes += 1;
                    in_stroke = true;
                }
                Some(_) => {}
                None => in_stroke = false,
            }
        }
        strokes
    }

    /// Characters that are still visible, i.e. not typed in erase mode.
    pub fn printed_characters(&self) -> impl Iterator<Item = &Character> {
        self.content.iter().filter(|c| !c.erase)
    }

    /// Same persisted text and pen data, ignoring character ids.
    pub fn same_content(&self, other: &VerboseDocument) -> bool {
        self.content.len() == other.content.len()
            && self
                .content
                .iter()
                .zip(&other.content)
                .all(|(a, b)| a.same_print(b))
            && self.pen_markings == other.pen_markings
            && self.paper_color == other.paper_color
    }
}

/// On-disk shape of a version 1 file.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerboseWire {
    version: f64,
    content: Vec<Character>,
    #[serde(default)]
    pen_markings: Vec<PenMark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    paper_color: Option<ColorName>,
}

impl From<VerboseDocument> for VerboseWire {
    fn from(doc: VerboseDocument) -> Self {
        Self {
            version: VERBOSE_VERSION,
            content: doc.content,
            pen_markings: doc.pen_markings,
            paper_color: doc.paper_color,
        }
    }
}

impl TryFrom<VerboseWire> for VerboseDocument {
    type Error = String;

    fn try_from(wire: VerboseWire) -> std::result::Result<Self, Self::Error> {
        if wire.version != VERBOSE_VERSION {
            return Err(format!("expected version {}, found {}", VERBOSE_VERSION, wire.version));
        }
        Ok(Self {
            content: wire.content,
            pen_markings: wire.pen_markings,
            paper_color: wire.paper_color,
        })
    }
}
