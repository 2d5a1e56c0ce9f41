//! Defines the top-level stylesheet structure that holds all styling information.

use crate::border::Border;
use crate::dimension::{Margins, PageSize};
use crate::font::FontWeight;
use crate::text::TextAlign;
use serde::{Deserialize, Serialize};
use specsheet_types::Color;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stylesheet {
    #[serde(default)]
    pub page: PageLayout,
    /// A map of all named element styles.
    #[serde(default)]
    pub styles: HashMap<String, Arc<ElementStyle>>,
}

impl Stylesheet {
    /// Looks up a style by its class name.
    pub fn get_style_by_class_name(&self, class_name: &str) -> Option<&Arc<ElementStyle>> {
        self.styles.get(class_name)
    }

    pub fn insert(&mut self, class_name: impl Into<String>, style: ElementStyle) {
        self.styles.insert(class_name.into(), Arc::new(style));
    }

    /// Cascades the named classes (in order) and then the override onto the base style.
    /// Unknown class names are ignored.
    pub fn compute(&self, classes: &[String], style_override: Option<&ElementStyle>) -> ComputedStyle {
        let mut computed = ComputedStyle::default();
        self.apply_to(&mut computed, classes, style_override);
        computed
    }

    /// Like [`Stylesheet::compute`] but starting from an inherited style. Only
    /// text properties inherit; box properties start fresh.
    pub fn compute_inherited(
        &self,
        parent: &ComputedStyle,
        classes: &[String],
        style_override: Option<&ElementStyle>,
    ) -> ComputedStyle {
        let mut computed = parent.inherited();
        self.apply_to(&mut computed, classes, style_override);
        computed
    }

    fn apply_to(
        &self,
        computed: &mut ComputedStyle,
        classes: &[String],
        style_override: Option<&ElementStyle>,
    ) {
        for class in classes {
            if let Some(style) = self.get_style_by_class_name(class) {
                computed.apply(style);
            }
        }
        if let Some(style) = style_override {
            computed.apply(style);
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageLayout {
    #[serde(default)]
    pub size: PageSize,
    #[serde(default = "PageLayout::default_margins")]
    pub margins: Margins,
    /// Height reserved at the bottom of every page for the footer band.
    #[serde(default = "PageLayout::default_footer_height")]
    pub footer_height: f32,
}

impl PageLayout {
    fn default_margins() -> Margins {
        Margins::all(15.0)
    }

    fn default_footer_height() -> f32 {
        14.0
    }

    /// Width available to content between the side margins, in millimetres.
    pub fn content_width(&self) -> f32 {
        self.size.dimensions_mm().0 - self.margins.horizontal()
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margins: Self::default_margins(),
            footer_height: Self::default_footer_height(),
        }
    }
}

/// A partial style. Unset properties leave the cascaded value untouched.
///
/// Font sizes are points, every other length is millimetres, border widths are points.
#[derive(Deserialize, Serialize, Default, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<Margins>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<f32>,
}

/// A fully resolved style with a concrete value for every property.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub line_height: f32,
    pub text_align: TextAlign,
    pub color: Color,
    pub background_color: Option<Color>,
    pub border: Option<Border>,
    pub padding: Margins,
    pub margin_bottom: f32,
    pub min_height: f32,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            font_size: 8.0,
            font_weight: FontWeight::Regular,
            line_height: 1.25,
            text_align: TextAlign::Left,
            color: Color::gray(0x33),
            background_color: None,
            border: None,
            padding: Margins::default(),
            margin_bottom: 0.0,
            min_height: 0.0,
        }
    }
}

impl ComputedStyle {
    pub fn apply(&mut self, style: &ElementStyle) {
        if let Some(v) = style.font_size {
            self.font_size = v;
        }
        if let Some(v) = style.font_weight {
            self.font_weight = v;
        }
        if let Some(v) = style.line_height {
            self.line_height = v;
        }
        if let Some(v) = style.text_align {
            self.text_align = v;
        }
        if let Some(v) = &style.color {
            self.color = v.clone();
        }
        if let Some(v) = &style.background_color {
            self.background_color = Some(v.clone());
        }
        if let Some(v) = &style.border {
            self.border = Some(v.clone());
        }
        if let Some(v) = style.padding {
            self.padding = v;
        }
        if let Some(v) = style.margin_bottom {
            self.margin_bottom = v;
        }
        if let Some(v) = style.min_height {
            self.min_height = v;
        }
    }

    /// The text properties a child inherits.
    pub fn inherited(&self) -> ComputedStyle {
        ComputedStyle {
            font_size: self.font_size,
            font_weight: self.font_weight,
            line_height: self.line_height,
            text_align: self.text_align,
            color: self.color.clone(),
            ..ComputedStyle::default()
        }
    }

    /// Height of one line of text, in millimetres.
    pub fn line_height_mm(&self) -> f32 {
        self.font_size * self.line_height * 25.4 / 72.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_cascades_classes_then_override() {
        let mut sheet = Stylesheet::default();
        sheet.insert(
            "a",
            ElementStyle {
                font_size: Some(10.0),
                color: Some(Color::gray(0x11)),
                ..Default::default()
            },
        );
        sheet.insert(
            "b",
            ElementStyle {
                font_size: Some(12.0),
                ..Default::default()
            },
        );
        let over = ElementStyle {
            font_weight: Some(FontWeight::Bold),
            ..Default::default()
        };

        let style = sheet.compute(&["a".into(), "b".into(), "missing".into()], Some(&over));
        assert_eq!(style.font_size, 12.0);
        assert_eq!(style.color, Color::gray(0x11));
        assert!(style.font_weight.is_bold());
    }

    #[test]
    fn test_box_properties_do_not_inherit() {
        let mut sheet = Stylesheet::default();
        sheet.insert(
            "panel",
            ElementStyle {
                background_color: Some(Color::gray(0xfa)),
                font_size: Some(9.0),
                ..Default::default()
            },
        );
        let parent = sheet.compute(&["panel".into()], None);
        let child = sheet.compute_inherited(&parent, &[], None);
        assert_eq!(child.font_size, 9.0);
        assert_eq!(child.background_color, None);
    }

    #[test]
    fn test_content_width_of_default_page() {
        assert_eq!(PageLayout::default().content_width(), 180.0);
    }
}
