//! Compact (version 2) document encoding.
//!
//! Characters are stored as positional tuples `[x, y, value]`, with a fourth
//! `true` slot only for erase-mode characters. Pen samples are stored as
//! `[x, y, w, o]` with position and width rounded to two decimals, or `null`
//! for a pen lift. Character ids are not stored at all.

use serde::de::Error as _;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::model::{Character, PenMark, Point, VerboseDocument};
use super::{COMPACT_VERSION, VERBOSE_VERSION};
use crate::id::generate_character_id;
use crate::paper_color::ColorName;

/// A character without identity.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactCharacter {
    pub x: f64,
    pub y: f64,
    pub value: String,
    pub erase: bool,
}

impl Serialize for CompactCharacter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.erase { 4 } else { 3 };
        let mut tuple = serializer.serialize_tuple(len)?;
        tuple.serialize_element(&self.x)?;
        tuple.serialize_element(&self.y)?;
        tuple.serialize_element(&self.value)?;
        if self.erase {
            tuple.serialize_element(&true)?;
        }
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for CompactCharacter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let slots = Vec::<serde_json::Value>::deserialize(deserializer)?;
        if slots.len() != 3 && slots.len() != 4 {
            return Err(D::Error::invalid_length(slots.len(), &"a tuple of 3 or 4 elements"));
        }
        let x = slots[0]
            .as_f64()
            .ok_or_else(|| D::Error::custom("character x must be a number"))?;
        let y = slots[1]
            .as_f64()
            .ok_or_else(|| D::Error::custom("character y must be a number"))?;
        let value = slots[2]
            .as_str()
            .ok_or_else(|| D::Error::custom("character value must be a string"))?
            .to_string();
        let erase = match slots.get(3) {
            None => false,
            Some(flag) => flag
                .as_bool()
                .ok_or_else(|| D::Error::custom("character erase flag must be a boolean"))?,
        };
        Ok(Self { x, y, value, erase })
    }
}

/// Pen sample as `[x, y, w, o]`.
pub type CompactPoint = (f64, f64, f64, f64);

/// The compact document as written to disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "CompactWire", try_from = "CompactWire")]
pub struct CompactDocument {
    pub text: Vec<CompactCharacter>,
    pub pen: Vec<Option<CompactPoint>>,
    pub color: Option<ColorName>,
}

#[derive(Serialize, Deserialize)]
struct CompactWire {
    version: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    text: Vec<CompactCharacter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pen: Vec<Option<CompactPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<ColorName>,
}

impl From<CompactDocument> for CompactWire {
    fn from(doc: CompactDocument) -> Self {
        Self {
            version: COMPACT_VERSION,
            text: doc.text,
            pen: doc.pen,
            color: doc.color,
        }
    }
}

impl TryFrom<CompactWire> for CompactDocument {
    type Error = String;

    fn try_from(wire: CompactWire) -> std::result::Result<Self, Self::Error> {
        if wire.version != COMPACT_VERSION {
            return Err(format!("expected version {}, found {}", COMPACT_VERSION, wire.version));
        }
        Ok(Self {
            text: wire.text,
            pen: wire.pen,
            color: wire.color,
        })
    }
}

/// Round to two decimal places.
///
/// Scales by 100 and applies `f64::round` (ties away from zero) to the
/// binary value, so `0.125` becomes `0.13` while `1.005`, which is stored as
/// `1.00499...`, becomes `1.0`.
///
/// Values too large to scale are returned unchanged; they already carry no
/// fractional digits.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 100.0
}

/// Convert a verbose document to its compact form (version 1 to 2).
pub fn compress(doc: &VerboseDocument) -> CompactDocument {
    let text = doc
        .content
        .iter()
        .map(|c| CompactCharacter {
            x: c.pos_x,
            y: c.pos_y,
            value: c.value.clone(),
            erase: c.erase,
        })
        .collect();

    let pen = doc
        .pen_markings
        .iter()
        .map(|mark| mark.map(|p| (round2(p.x), round2(p.y), round2(p.w), p.o)))
        .collect();

    log::debug!(
        "Compressed document v{} -> v{}: {} characters, {} pen marks",
        VERBOSE_VERSION,
        COMPACT_VERSION,
        doc.content.len(),
        doc.pen_markings.len()
    );

    CompactDocument {
        text,
        pen,
        color: doc.paper_color,
    }
}

/// Convert a compact document back to the verbose form (version 2 to 1).
///
/// Every character gets a freshly generated id.
pub fn uncompress(doc: &CompactDocument) -> VerboseDocument {
    let content = doc
        .text
        .iter()
        .map(|c| Character {
            pos_x: c.x,
            pos_y: c.y,
            id: generate_character_id(),
            value: c.value.clone(),
            erase: c.erase,
        })
        .collect();

    let pen_markings: Vec<PenMark> = doc
        .pen
        .iter()
        .map(|mark| mark.map(|(x, y, w, o)| Point { x, y, w, o }))
        .collect();

    VerboseDocument {
        content,
        pen_markings,
        paper_color: doc.color,
    }
}
