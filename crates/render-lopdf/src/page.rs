//! Turns positioned [`Draw`] commands into a page content stream.

use crate::layout::{Draw, Rect};
use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};
use specsheet_render_core::utils::{flip_y, to_win_ansi};
use specsheet_style::FontWeight;
use specsheet_style::dimension::mm_to_pt;
use specsheet_types::Color;
use std::collections::HashMap;

pub const REGULAR_FONT_KEY: &str = "F1";
pub const BOLD_FONT_KEY: &str = "F2";

/// Identifies one embedded image: the same source decoded to the same
/// pixel grid is the same XObject.
pub type ImageSlot = (String, u32, u32);

#[derive(Default, Clone, PartialEq)]
struct PageRenderState {
    font: Option<(&'static str, f32)>,
    fill_color: Option<Color>,
    stroke_color: Option<Color>,
    line_width: Option<f32>,
}

pub struct PageWriter<'a> {
    page_height: f32,
    content: Content,
    state: PageRenderState,
    images: &'a HashMap<ImageSlot, String>,
}

fn rgb(color: &Color) -> Vec<Object> {
    color.to_unit_rgb().into_iter().map(Object::from).collect()
}

impl<'a> PageWriter<'a> {
    /// `page_height` is in points.
    pub fn new(page_height: f32, images: &'a HashMap<ImageSlot, String>) -> Self {
        Self {
            page_height,
            content: Content { operations: vec![] },
            state: PageRenderState::default(),
            images,
        }
    }

    pub fn finish(self) -> Content {
        self.content
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.content.operations.push(Operation::new(operator, operands));
    }

    /// A millimetre rectangle as PDF `x y w h` operands.
    fn rect_operands(&self, rect: &Rect) -> Vec<Object> {
        vec![
            mm_to_pt(rect.x).into(),
            flip_y(mm_to_pt(rect.y + rect.height), self.page_height).into(),
            mm_to_pt(rect.width).into(),
            mm_to_pt(rect.height).into(),
        ]
    }

    fn point(&self, (x, y): (f32, f32)) -> Vec<Object> {
        vec![mm_to_pt(x).into(), flip_y(mm_to_pt(y), self.page_height).into()]
    }

    pub fn draw_all(&mut self, draws: &[Draw]) {
        for draw in draws {
            self.draw(draw);
        }
    }

    pub fn draw(&mut self, draw: &Draw) {
        match draw {
            Draw::Fill { rect, color } => {
                self.set_fill_color(color);
                let operands = self.rect_operands(rect);
                self.op("re", operands);
                self.op("f", vec![]);
            }
            Draw::Outline { rect, width, color } => {
                self.set_stroke(*width, color);
                let operands = self.rect_operands(rect);
                self.op("re", operands);
                self.op("S", vec![]);
            }
            Draw::Line {
                from,
                to,
                width,
                color,
            } => {
                self.set_stroke(*width, color);
                let start = self.point(*from);
                let end = self.point(*to);
                self.op("m", start);
                self.op("l", end);
                self.op("S", vec![]);
            }
            Draw::Text {
                x,
                baseline,
                text,
                font_size,
                weight,
                color,
            } => self.draw_text(*x, *baseline, text, *font_size, *weight, color),
            Draw::Image { rect, image } => {
                let slot = (image.src.clone(), image.pixel_width, image.pixel_height);
                let Some(name) = self.images.get(&slot).cloned() else {
                    log::warn!("Image not embedded, skipping: {}", image.src);
                    return;
                };
                let [x, y, w, h] = [
                    mm_to_pt(rect.x),
                    flip_y(mm_to_pt(rect.y + rect.height), self.page_height),
                    mm_to_pt(rect.width),
                    mm_to_pt(rect.height),
                ];
                self.op("q", vec![]);
                self.op("cm", vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()]);
                self.op("Do", vec![Object::Name(name.into_bytes())]);
                self.op("Q", vec![]);
                // Q restores the colour and line state saved by q.
                self.state = PageRenderState {
                    font: self.state.font,
                    ..Default::default()
                };
            }
        }
    }

    fn set_fill_color(&mut self, color: &Color) {
        if self.state.fill_color.as_ref() != Some(color) {
            self.op("rg", rgb(color));
            self.state.fill_color = Some(color.clone());
        }
    }

    fn set_stroke(&mut self, width: f32, color: &Color) {
        if self.state.line_width != Some(width) {
            self.op("w", vec![width.into()]);
            self.state.line_width = Some(width);
        }
        if self.state.stroke_color.as_ref() != Some(color) {
            self.op("RG", rgb(color));
            self.state.stroke_color = Some(color.clone());
        }
    }

    fn set_font(&mut self, font_size: f32, weight: FontWeight) {
        let key = if weight.is_bold() { BOLD_FONT_KEY } else { REGULAR_FONT_KEY };
        if self.state.font != Some((key, font_size)) {
            self.op("Tf", vec![Object::Name(key.as_bytes().to_vec()), font_size.into()]);
            self.state.font = Some((key, font_size));
        }
    }

    fn draw_text(&mut self, x: f32, baseline: f32, text: &str, font_size: f32, weight: FontWeight, color: &Color) {
        if text.trim().is_empty() {
            return;
        }
        self.op("BT", vec![]);
        self.set_font(font_size, weight);
        self.set_fill_color(color);
        let origin = self.point((x, baseline));
        self.op("Td", origin);
        self.op("Tj", vec![Object::String(to_win_ansi(text), StringFormat::Literal)]);
        self.op("ET", vec![]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operators(content: &Content) -> Vec<&str> {
        content.operations.iter().map(|op| op.operator.as_str()).collect()
    }

    #[test]
    fn test_text_sets_font_once() {
        let images = HashMap::new();
        let mut page = PageWriter::new(842.0, &images);
        let text = |s: &str| Draw::Text {
            x: 10.0,
            baseline: 20.0,
            text: s.to_string(),
            font_size: 8.0,
            weight: FontWeight::Regular,
            color: Color::BLACK,
        };
        page.draw_all(&[text("one"), text("two"), text("  ")]);
        let content = page.finish();
        assert_eq!(
            operators(&content),
            vec!["BT", "Tf", "rg", "Td", "Tj", "ET", "BT", "Td", "Tj", "ET"]
        );
    }

    #[test]
    fn test_fill_flips_to_pdf_space() {
        let images = HashMap::new();
        let mut page = PageWriter::new(100.0, &images);
        page.draw(&Draw::Fill {
            rect: Rect {
                x: 0.0,
                y: 0.0,
                width: 25.4,
                height: 25.4,
            },
            color: Color::WHITE,
        });
        let content = page.finish();
        let re = &content.operations[1];
        assert_eq!(re.operator, "re");
        let y = re.operands[1].as_float().unwrap();
        assert!((y - 28.0).abs() < 0.01, "{y}");
    }

    #[test]
    fn test_image_restores_state_after_q() {
        let mut images = HashMap::new();
        let image = std::sync::Arc::new(specsheet_idf::ResolvedImage::new(
            "https://x/a.png",
            1,
            1,
            vec![0, 0, 0],
            specsheet_types::Size::new(10.0, 10.0),
        ));
        images.insert(("https://x/a.png".to_string(), 1, 1), "Im1".to_string());
        let mut page = PageWriter::new(842.0, &images);
        let fill = Draw::Fill {
            rect: Rect::default(),
            color: Color::BLACK,
        };
        page.draw(&fill);
        page.draw(&Draw::Image {
            rect: Rect {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
            },
            image,
        });
        page.draw(&fill);
        let content = page.finish();
        assert_eq!(
            operators(&content),
            vec!["rg", "re", "f", "q", "cm", "Do", "Q", "rg", "re", "f"]
        );
    }

    #[test]
    fn test_unknown_image_is_skipped() {
        let images = HashMap::new();
        let mut page = PageWriter::new(842.0, &images);
        page.draw(&Draw::Image {
            rect: Rect::default(),
            image: std::sync::Arc::new(specsheet_idf::ResolvedImage::new(
                "https://x/missing.png",
                1,
                1,
                vec![0, 0, 0],
                specsheet_types::Size::new(1.0, 1.0),
            )),
        });
        assert!(page.finish().operations.is_empty());
    }
}
