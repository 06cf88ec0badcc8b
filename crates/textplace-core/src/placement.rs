//! Placement records produced by the content stream collector.
//!
//! A [`ParsedTextPlacement`] is what the interpreter emits for each string
//! run it shows; it carries both text-space and page-space geometry. A
//! [`TextPlacement`] is the page-numbered, flattened form handed to callers.

use std::fmt;

use crate::geometry::{BBox, Matrix};

/// Identifier of a font: the object number and generation of its dictionary.
///
/// Fonts defined inline in a resource dictionary have no indirect object, so
/// they receive synthetic identifiers with object number 0 (never a valid
/// indirect object number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontId(pub u32, pub u16);

impl FontId {
    /// Synthetic identifier for the `index`-th inline font dictionary.
    pub fn inline(index: u16) -> Self {
        FontId(0, index)
    }

    pub fn object_number(&self) -> u32 {
        self.0
    }

    pub fn generation(&self) -> u16 {
        self.1
    }

    pub fn is_inline(&self) -> bool {
        self.0 == 0
    }
}

impl From<(u32, u16)> for FontId {
    fn from((number, generation): (u32, u16)) -> Self {
        FontId(number, generation)
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.1)
    }
}

/// One string run as emitted by the interpreter, before pagination.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedTextPlacement {
    /// Decoded text of the run (UTF-8).
    pub text: String,
    /// Font used to show the run.
    pub font_id: FontId,
    /// Text matrix × CTM at the start of the run.
    pub matrix: Matrix,
    /// Box in text space, relative to the run's start position.
    ///
    /// Spans the accumulated advance horizontally and the font's descent to
    /// ascent (scaled by font size and offset by text rise) vertically.
    pub local_bbox: BBox,
    /// `local_bbox` mapped through `matrix` into page space.
    pub global_bbox: BBox,
    /// Width of a space in text space units at the run's font size.
    pub space_width: f64,
    /// `space_width` as a page-space displacement vector.
    pub global_space_width: [f64; 2],
}

impl ParsedTextPlacement {
    /// Attach a page index and flatten the global box to `(x, y, width, height)`.
    pub fn into_text_placement(self, page: usize) -> TextPlacement {
        TextPlacement {
            page,
            font_id: self.font_id,
            bbox: PlacementBox::from(self.global_bbox),
            text: self.text,
        }
    }
}

/// Page-space rectangle stored as origin plus extent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacementBox {
    /// Left edge.
    pub x: f64,
    /// Bottom edge (PDF orientation).
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<BBox> for PlacementBox {
    fn from(bbox: BBox) -> Self {
        PlacementBox {
            x: bbox.x0,
            y: bbox.y0,
            width: bbox.x1 - bbox.x0,
            height: bbox.y1 - bbox.y0,
        }
    }
}

impl PlacementBox {
    pub fn to_bbox(&self) -> BBox {
        BBox::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// A text run tagged with the (0-based) page it was drawn on.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextPlacement {
    /// 0-based page index.
    pub page: usize,
    /// Font identifier; resolves to a [`FontDescription`](crate::FontDescription)
    /// in the document's font registry.
    pub font_id: FontId,
    /// Bounding box in page coordinates.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub bbox: PlacementBox,
    /// Decoded text (UTF-8).
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ParsedTextPlacement {
        let local = BBox::new(0.0, -3.0, 14.0, 9.0);
        let matrix = Matrix::translation(100.0, 700.0);
        ParsedTextPlacement {
            text: "Hi".to_string(),
            font_id: FontId(5, 0),
            matrix,
            local_bbox: local,
            global_bbox: local.transform(&matrix),
            space_width: 3.0,
            global_space_width: [3.0, 0.0],
        }
    }

    #[test]
    fn into_text_placement_converts_corners_to_extent() {
        let tp = sample().into_text_placement(2);
        assert_eq!(tp.page, 2);
        assert_eq!(tp.font_id, FontId(5, 0));
        assert_eq!(tp.text, "Hi");
        assert_eq!(
            tp.bbox,
            PlacementBox {
                x: 100.0,
                y: 697.0,
                width: 14.0,
                height: 12.0
            }
        );
    }

    #[test]
    fn placement_box_round_trips_through_bbox() {
        let bbox = BBox::new(1.0, 2.0, 4.0, 8.0);
        assert_eq!(PlacementBox::from(bbox).to_bbox(), bbox);
    }

    #[test]
    fn font_id_display_and_inline() {
        assert_eq!(FontId(12, 0).to_string(), "12 0");
        assert!(FontId::inline(3).is_inline());
        assert!(!FontId::from((7, 1)).is_inline());
        assert_eq!(FontId(7, 1).object_number(), 7);
        assert_eq!(FontId(7, 1).generation(), 1);
    }

    #[test]
    fn font_ids_order_by_object_number_first() {
        let mut ids = vec![FontId(9, 0), FontId(2, 1), FontId(2, 0)];
        ids.sort();
        assert_eq!(ids, vec![FontId(2, 0), FontId(2, 1), FontId(9, 0)]);
    }
}
