use crate::element::{Element, ElementKind};
use crate::systems::display_list::Paint;
use crate::types::Bounds;
use scenery_data::model::{Padding, StrokeColor, TextData, TextFill};
use std::any::Any;

const DEFAULT_FONT_SIZE: f32 = 26.0;

/// Rough glyph advance used when the authored box has no width.
const GLYPH_ADVANCE: f32 = 0.55;
const LINE_HEIGHT: f32 = 1.2;

/// Styling carried through to the host text renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f32,
    pub fill: Option<TextFill>,
    pub align: Option<String>,
    pub stroke: Option<StrokeColor>,
    pub stroke_thickness: f32,
    pub word_wrap: bool,
    pub word_wrap_width: Option<f32>,
    pub break_words: bool,
    pub leading: f32,
    pub letter_spacing: f32,
    pub padding: Option<Padding>,
    pub font_weight: Option<String>,
}

impl TextStyle {
    pub fn from_data(data: &TextData) -> Self {
        Self {
            font_family: data
                .font_name
                .as_ref()
                .and_then(|f| f.primary())
                .map(str::to_string),
            font_size: data.size.px().unwrap_or(DEFAULT_FONT_SIZE),
            fill: data.color.clone(),
            align: data.align.clone(),
            stroke: data.stroke.clone(),
            stroke_thickness: data.stroke_thickness.unwrap_or(0.0),
            word_wrap: data.word_wrap.unwrap_or(false),
            word_wrap_width: data.word_wrap_width,
            break_words: data.break_words.unwrap_or(false),
            leading: data.leading.unwrap_or(0.0),
            letter_spacing: data.letter_spacing.unwrap_or(0.0),
            padding: data.padding.clone(),
            font_weight: data.font_weight.clone(),
        }
    }
}

/// Measures a string for hit areas and layout when no box was authored.
fn estimate_size(text: &str, size: f32, width: f32, height: f32) -> (f32, f32) {
    let lines = text.lines().count().max(1);
    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let w = if width > 0.0 {
        width
    } else {
        longest as f32 * size * GLYPH_ADVANCE
    };
    let h = if height > 0.0 {
        height
    } else {
        lines as f32 * size * LINE_HEIGHT
    };
    (w, h)
}

// --- Text Field ---
/// Vector text, rendered by the host with a system or web font.
#[derive(Debug, Clone)]
pub struct TextField {
    pub text: String,
    pub style: TextStyle,
    pub width: f32,
    pub height: f32,
    /// Fraction of the box that sits left of / above the origin.
    pub anchor_x: f32,
    pub anchor_y: f32,
}

impl TextField {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            width: 0.0,
            height: 0.0,
            anchor_x: 0.0,
            anchor_y: 0.0,
        }
    }

    pub fn from_data(data: &TextData) -> Self {
        Self {
            text: data.text.clone(),
            style: TextStyle::from_data(data),
            width: data.width,
            height: data.height,
            anchor_x: data.text_anchor_x,
            anchor_y: data.text_anchor_y,
        }
    }
}

impl Element for TextField {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn kind(&self) -> ElementKind {
        ElementKind::Text
    }

    fn content_bounds(&self) -> Option<Bounds> {
        let (w, h) = estimate_size(&self.text, self.style.font_size, self.width, self.height);
        Some(Bounds::from_xywh(-self.anchor_x * w, -self.anchor_y * h, w, h))
    }

    fn paint(&self) -> Option<Paint> {
        Some(Paint::Text {
            text: self.text.clone(),
            font: self.style.font_family.clone(),
            size: self.style.font_size,
            fill: self.style.fill.clone(),
            align: self.style.align.clone(),
        })
    }

    fn set_text(&mut self, text: &str) -> bool {
        self.text = text.to_string();
        true
    }

    fn text(&self) -> Option<&str> {
        Some(&self.text)
    }
}

// --- Bitmap Text ---
/// Text drawn from a preloaded bitmap font.
#[derive(Debug, Clone)]
pub struct BitmapText {
    pub text: String,
    pub font: String,
    pub size: f32,
    pub align: Option<String>,
    pub width: f32,
    pub height: f32,
    pub anchor_x: f32,
    pub anchor_y: f32,
}

impl BitmapText {
    pub fn from_data(data: &TextData, font: &str) -> Self {
        Self {
            text: data.text.clone(),
            font: font.to_string(),
            size: data.size.px().unwrap_or(DEFAULT_FONT_SIZE),
            align: data.align.clone(),
            width: data.width,
            height: data.height,
            anchor_x: data.text_anchor_x,
            anchor_y: data.text_anchor_y,
        }
    }
}

impl Element for BitmapText {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn kind(&self) -> ElementKind {
        ElementKind::BitmapText
    }

    fn content_bounds(&self) -> Option<Bounds> {
        let (w, h) = estimate_size(&self.text, self.size, self.width, self.height);
        Some(Bounds::from_xywh(-self.anchor_x * w, -self.anchor_y * h, w, h))
    }

    fn paint(&self) -> Option<Paint> {
        Some(Paint::BitmapText {
            text: self.text.clone(),
            font: self.font.clone(),
            size: self.size,
            align: self.align.clone(),
        })
    }

    fn set_text(&mut self, text: &str) -> bool {
        self.text = text.to_string();
        true
    }

    fn text(&self) -> Option<&str> {
        Some(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenery_data::model::FontSize;

    #[test]
    fn test_text_bounds_respect_anchor() {
        let data = TextData {
            name: "label".into(),
            text: "Hi".into(),
            width: 100.0,
            height: 20.0,
            text_anchor_x: 0.5,
            size: FontSize::Css("20px".into()),
            ..Default::default()
        };
        let t = TextField::from_data(&data);
        let b = t.content_bounds().unwrap();
        assert_eq!(b, Bounds::from_xywh(-50.0, 0.0, 100.0, 20.0));
        assert_eq!(t.style.font_size, 20.0);
    }

    #[test]
    fn test_text_estimates_unsized_box() {
        let mut t = TextField::new("", TextStyle { font_size: 10.0, ..Default::default() });
        t.set_text("abcd\nab");
        let b = t.content_bounds().unwrap();
        assert!((b.width - 22.0).abs() < 1e-4);
        assert!((b.height - 24.0).abs() < 1e-4);
    }
}
