//! Box layout for a single section.
//!
//! Every node is laid out top-down into absolute millimetre coordinates with
//! the origin at the top-left of the section. The output is a flat list of
//! [`Draw`] commands which the page writer turns into PDF operators after the
//! section has been moved to its place on a page.
//!
//! The box model is deliberately small: padding, background, a border, a
//! bottom margin and a minimum height. A border outlines blocks, columns,
//! images and table cells, underlines paragraphs, and sits on top of sections.

use crate::metrics::{cap_height_mm, text_width_mm};
use specsheet_idf::{Column, InlineNode, LayoutNode, NodeMetadata, ResolvedImage, Section, TableColumnDefinition, TableRow};
use specsheet_style::dimension::{MM_PER_INCH, PT_PER_INCH};
use specsheet_style::{Border, ComputedStyle, FontWeight, Stylesheet, TextAlign};
use specsheet_types::{Color, Size};
use std::mem;
use std::sync::Arc;

const DEFAULT_RULE_HEIGHT: f32 = 0.5;
const EPSILON: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    fn offset(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }
}

/// One drawing primitive. Lengths are millimetres, except stroke widths which are points.
#[derive(Debug, Clone, PartialEq)]
pub enum Draw {
    Fill {
        rect: Rect,
        color: Color,
    },
    Outline {
        rect: Rect,
        width: f32,
        color: Color,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Color,
    },
    Text {
        x: f32,
        baseline: f32,
        text: String,
        font_size: f32,
        weight: FontWeight,
        color: Color,
    },
    Image {
        rect: Rect,
        image: Arc<ResolvedImage>,
    },
}

impl Draw {
    fn offset(&mut self, dx: f32, dy: f32) {
        match self {
            Draw::Fill { rect, .. } | Draw::Outline { rect, .. } | Draw::Image { rect, .. } => {
                rect.offset(dx, dy)
            }
            Draw::Line { from, to, .. } => {
                *from = (from.0 + dx, from.1 + dy);
                *to = (to.0 + dx, to.1 + dy);
            }
            Draw::Text { x, baseline, .. } => {
                *x += dx;
                *baseline += dy;
            }
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Draw::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// The page a section is being drawn on, for `PageNumber`/`PageCount` inlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageInfo {
    pub number: usize,
    pub count: usize,
}

#[derive(Debug, Default)]
pub struct LaidOut {
    pub height: f32,
    pub margin_bottom: f32,
    pub draws: Vec<Draw>,
}

impl LaidOut {
    /// Vertical space the box takes in a stack, margin included.
    pub fn advance(&self) -> f32 {
        self.height + self.margin_bottom
    }

    pub fn translate(mut self, dx: f32, dy: f32) -> Self {
        self.draws.iter_mut().for_each(|d| d.offset(dx, dy));
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Edge {
    Outline,
    Top,
    Bottom,
}

/// A box whose content is laid out but whose final height is not yet fixed.
struct Boxed {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    margin_bottom: f32,
    background: Option<Color>,
    border: Option<Border>,
    edge: Edge,
    inner: Vec<Draw>,
}

impl Boxed {
    fn finish(self, at_least: f32) -> LaidOut {
        let height = self.height.max(at_least);
        let rect = Rect {
            x: self.x,
            y: self.y,
            width: self.width,
            height,
        };
        let mut draws = Vec::with_capacity(self.inner.len() + 2);
        if let Some(color) = self.background {
            draws.push(Draw::Fill { rect, color });
        }
        draws.extend(self.inner);
        if let Some(border) = self.border.filter(|b| b.width > 0.0) {
            draws.push(edge_draw(self.edge, rect, border));
        }
        LaidOut {
            height,
            margin_bottom: self.margin_bottom,
            draws,
        }
    }
}

fn edge_draw(edge: Edge, rect: Rect, border: Border) -> Draw {
    let Border { width, color } = border;
    let right = rect.x + rect.width;
    match edge {
        Edge::Outline => Draw::Outline { rect, width, color },
        Edge::Top => Draw::Line {
            from: (rect.x, rect.y),
            to: (right, rect.y),
            width,
            color,
        },
        Edge::Bottom => Draw::Line {
            from: (rect.x, rect.y + rect.height),
            to: (right, rect.y + rect.height),
            width,
            color,
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
struct RunStyle {
    font_size: f32,
    weight: FontWeight,
    color: Color,
}

impl RunStyle {
    fn of(style: &ComputedStyle) -> Self {
        Self {
            font_size: style.font_size,
            weight: style.font_weight,
            color: style.color.clone(),
        }
    }

    fn width(&self, text: &str) -> f32 {
        text_width_mm(text, self.font_size, self.weight)
    }
}

enum Token {
    Word(String, RunStyle),
    Break,
}

#[derive(Debug)]
struct Piece {
    text: String,
    style: RunStyle,
    width: f32,
}

fn push_words(text: &str, style: &RunStyle, out: &mut Vec<Token>) {
    for chunk in text.split_inclusive(char::is_whitespace) {
        let word: String = chunk
            .chars()
            .map(|c| if c.is_whitespace() { ' ' } else { c })
            .collect();
        out.push(Token::Word(word, style.clone()));
    }
}

/// Greedy line filling. Same-styled neighbours are merged into one piece.
/// A word wider than the line gets a line of its own.
fn wrap(tokens: Vec<Token>, max_width: f32) -> Vec<Vec<Piece>> {
    let mut lines = Vec::new();
    let mut line: Vec<Piece> = Vec::new();
    let mut used = 0.0;
    for token in tokens {
        let (text, style) = match token {
            Token::Break => {
                lines.push(mem::take(&mut line));
                used = 0.0;
                continue;
            }
            Token::Word(text, style) => (text, style),
        };
        let visible = style.width(text.trim_end());
        if !line.is_empty() && used + visible > max_width + EPSILON {
            lines.push(mem::take(&mut line));
            used = 0.0;
        }
        if line.is_empty() && text.trim().is_empty() {
            continue;
        }
        let width = style.width(&text);
        used += width;
        match line.last_mut() {
            Some(last) if last.style == style => {
                last.text.push_str(&text);
                last.width += width;
            }
            _ => line.push(Piece { text, style, width }),
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    for line in &mut lines {
        if let Some(last) = line.last_mut() {
            let trimmed = last.text.trim_end().len();
            if trimmed < last.text.len() {
                last.text.truncate(trimmed);
                last.width = last.style.width(&last.text);
            }
        }
    }
    lines
}

pub struct LayoutEngine<'s> {
    stylesheet: &'s Stylesheet,
    page: PageInfo,
}

impl<'s> LayoutEngine<'s> {
    pub fn new(stylesheet: &'s Stylesheet, page: PageInfo) -> Self {
        Self { stylesheet, page }
    }

    fn style(&self, parent: Option<&ComputedStyle>, meta: &NodeMetadata) -> ComputedStyle {
        let over = meta.style_override.as_ref();
        match parent {
            Some(parent) => self.stylesheet.compute_inherited(parent, &meta.classes, over),
            None => self.stylesheet.compute(&meta.classes, over),
        }
    }

    /// Lays out a section at the origin, `width` millimetres wide.
    pub fn section(&self, section: &Section, width: f32) -> LaidOut {
        let style = self.style(None, &section.meta);
        self.boxed(&style, Edge::Top, 0.0, 0.0, width, |x, y, w, out| {
            self.stack(&section.children, &style, x, y, w, out)
        })
        .finish(0.0)
    }

    fn boxed(
        &self,
        style: &ComputedStyle,
        edge: Edge,
        x: f32,
        y: f32,
        width: f32,
        content: impl FnOnce(f32, f32, f32, &mut Vec<Draw>) -> f32,
    ) -> Boxed {
        let pad = style.padding;
        let mut inner = Vec::new();
        let inner_width = (width - pad.horizontal()).max(0.0);
        let content_height = content(x + pad.left, y + pad.top, inner_width, &mut inner);
        Boxed {
            x,
            y,
            width,
            height: (content_height + pad.vertical()).max(style.min_height),
            margin_bottom: style.margin_bottom,
            background: style.background_color.clone(),
            border: style.border.clone(),
            edge,
            inner,
        }
    }

    fn stack(
        &self,
        children: &[LayoutNode],
        parent: &ComputedStyle,
        x: f32,
        y: f32,
        width: f32,
        out: &mut Vec<Draw>,
    ) -> f32 {
        let mut cursor = 0.0;
        for child in children {
            let laid = self.node(child, parent, x, y + cursor, width);
            cursor += laid.advance();
            out.extend(laid.draws);
        }
        cursor
    }

    fn node(&self, node: &LayoutNode, parent: &ComputedStyle, x: f32, y: f32, width: f32) -> LaidOut {
        match node {
            LayoutNode::Block { meta, children } => {
                let style = self.style(Some(parent), meta);
                self.boxed(&style, Edge::Outline, x, y, width, |ix, iy, iw, out| {
                    self.stack(children, &style, ix, iy, iw, out)
                })
                .finish(0.0)
            }
            LayoutNode::Columns { meta, columns } => {
                let style = self.style(Some(parent), meta);
                self.boxed(&style, Edge::Outline, x, y, width, |ix, iy, _, out| {
                    self.columns(columns, &style, ix, iy, out)
                })
                .finish(0.0)
            }
            LayoutNode::Paragraph { meta, children } => {
                let style = self.style(Some(parent), meta);
                self.boxed(&style, Edge::Bottom, x, y, width, |ix, iy, iw, out| {
                    self.paragraph(children, &style, ix, iy, iw, out)
                })
                .finish(0.0)
            }
            LayoutNode::Image { meta, image } => {
                let style = self.style(Some(parent), meta);
                self.boxed(&style, Edge::Outline, x, y, width, |ix, iy, iw, out| {
                    place_image(image, ix, iy, iw, out)
                })
                .finish(0.0)
            }
            LayoutNode::Table {
                meta,
                columns,
                header,
                rows,
            } => {
                let style = self.style(Some(parent), meta);
                let mut draws = Vec::new();
                let height = self.table(&style, columns, header.as_ref(), rows, x, y, &mut draws);
                LaidOut {
                    height,
                    margin_bottom: style.margin_bottom,
                    draws,
                }
            }
            LayoutNode::Rule { meta } => {
                let style = self.style(Some(parent), meta);
                let height = if style.min_height > 0.0 {
                    style.min_height
                } else {
                    DEFAULT_RULE_HEIGHT
                };
                let color = style.background_color.clone().unwrap_or(style.color.clone());
                LaidOut {
                    height,
                    margin_bottom: style.margin_bottom,
                    draws: vec![Draw::Fill {
                        rect: Rect { x, y, width, height },
                        color,
                    }],
                }
            }
            LayoutNode::Spacer { height } => LaidOut {
                height: height.max(0.0),
                ..Default::default()
            },
        }
    }

    /// Columns share one row height; each column's box stretches to it.
    fn columns(&self, columns: &[Column], parent: &ComputedStyle, x: f32, y: f32, out: &mut Vec<Draw>) -> f32 {
        let mut boxes = Vec::with_capacity(columns.len());
        let mut cx = x;
        for column in columns {
            let style = self.style(Some(parent), &column.meta);
            boxes.push(self.boxed(&style, Edge::Outline, cx, y, column.width, |ix, iy, iw, o| {
                self.stack(&column.children, &style, ix, iy, iw, o)
            }));
            cx += column.width;
        }
        let row_height = boxes.iter().map(|b| b.height).fold(0.0, f32::max);
        for b in boxes {
            out.extend(b.finish(row_height).draws);
        }
        row_height
    }

    /// Cells take the row's and their own classes; the table's border draws the grid.
    #[allow(clippy::too_many_arguments)]
    fn table(
        &self,
        style: &ComputedStyle,
        columns: &[TableColumnDefinition],
        header: Option<&TableRow>,
        rows: &[TableRow],
        x: f32,
        y: f32,
        out: &mut Vec<Draw>,
    ) -> f32 {
        let mut cursor = 0.0;
        for row in header.into_iter().chain(rows) {
            let mut boxes = Vec::with_capacity(row.cells.len());
            let mut cx = x;
            for (i, cell) in row.cells.iter().enumerate() {
                let width = columns.get(i).map_or(0.0, |c| c.width);
                let classes: Vec<String> = row
                    .meta
                    .classes
                    .iter()
                    .chain(&cell.meta.classes)
                    .cloned()
                    .collect();
                let mut cell_style = self.stylesheet.compute_inherited(
                    style,
                    &classes,
                    cell.meta.style_override.as_ref(),
                );
                if cell_style.border.is_none() {
                    cell_style.border = style.border.clone();
                }
                boxes.push(self.boxed(&cell_style, Edge::Outline, cx, y + cursor, width, |ix, iy, iw, o| {
                    self.paragraph(&cell.children, &cell_style, ix, iy, iw, o)
                }));
                cx += width;
            }
            let row_height = boxes.iter().map(|b| b.height).fold(0.0, f32::max);
            for b in boxes {
                out.extend(b.finish(row_height).draws);
            }
            cursor += row_height;
        }
        cursor
    }

    fn tokens(&self, nodes: &[InlineNode], style: &ComputedStyle, out: &mut Vec<Token>) {
        for node in nodes {
            match node {
                InlineNode::Text(text) => push_words(text, &RunStyle::of(style), out),
                InlineNode::Span { classes, children } => {
                    let span = self.stylesheet.compute_inherited(style, classes, None);
                    self.tokens(children, &span, out);
                }
                InlineNode::LineBreak => out.push(Token::Break),
                InlineNode::PageNumber => {
                    push_words(&self.page.number.to_string(), &RunStyle::of(style), out)
                }
                InlineNode::PageCount => {
                    push_words(&self.page.count.to_string(), &RunStyle::of(style), out)
                }
            }
        }
    }

    fn paragraph(
        &self,
        children: &[InlineNode],
        style: &ComputedStyle,
        x: f32,
        y: f32,
        width: f32,
        out: &mut Vec<Draw>,
    ) -> f32 {
        let mut tokens = Vec::new();
        self.tokens(children, style, &mut tokens);
        let mut cursor = 0.0;
        for line in wrap(tokens, width) {
            let max_size = line
                .iter()
                .map(|p| p.style.font_size)
                .fold(style.font_size, f32::max);
            let line_height = max_size * style.line_height * MM_PER_INCH / PT_PER_INCH;
            let baseline = y + cursor + (line_height + cap_height_mm(max_size)) / 2.0;
            let line_width: f32 = line.iter().map(|p| p.width).sum();
            let slack = (width - line_width).max(0.0);
            let mut px = match style.text_align {
                TextAlign::Left => x,
                TextAlign::Center => x + slack / 2.0,
                TextAlign::Right => x + slack,
            };
            for piece in line {
                let advance = piece.width;
                out.push(Draw::Text {
                    x: px,
                    baseline,
                    text: piece.text,
                    font_size: piece.style.font_size,
                    weight: piece.style.weight,
                    color: piece.style.color,
                });
                px += advance;
            }
            cursor += line_height;
        }
        cursor
    }
}

/// Draws the image at its resolved size, shrunk to fit `width`, centred.
fn place_image(image: &Arc<ResolvedImage>, x: f32, y: f32, width: f32, out: &mut Vec<Draw>) -> f32 {
    let mut size = image.size;
    if size.width > width && size.width > 0.0 {
        size = Size::new(width, size.height * width / size.width);
    }
    out.push(Draw::Image {
        rect: Rect {
            x: x + (width - size.width).max(0.0) / 2.0,
            y,
            width: size.width,
            height: size.height,
        },
        image: Arc::clone(image),
    });
    size.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use specsheet_idf::{TableCell, SectionKind};
    use specsheet_style::{Margins, class, palette};

    fn sheet() -> Stylesheet {
        Stylesheet::datasheet()
    }

    fn texts(draws: &[Draw]) -> Vec<&str> {
        draws.iter().filter_map(Draw::text).collect()
    }

    fn section(children: Vec<LayoutNode>) -> Section {
        Section::new(SectionKind::Title, NodeMetadata::default(), children)
    }

    #[test]
    fn test_wrap_breaks_between_words() {
        let style = RunStyle {
            font_size: 10.0,
            weight: FontWeight::Regular,
            color: Color::BLACK,
        };
        let mut tokens = Vec::new();
        push_words("alpha beta gamma delta", &style, &mut tokens);
        let one_word = style.width("alpha ");
        let lines = wrap(tokens, one_word * 2.2);
        let lines: Vec<Vec<String>> = lines
            .into_iter()
            .map(|l| l.into_iter().map(|p| p.text).collect())
            .collect();
        assert_eq!(lines, vec![vec!["alpha beta"], vec!["gamma delta"]]);
    }

    #[test]
    fn test_wrap_merges_same_style_and_keeps_oversized_words() {
        let style = RunStyle {
            font_size: 10.0,
            weight: FontWeight::Regular,
            color: Color::BLACK,
        };
        let mut tokens = Vec::new();
        push_words("Supercalifragilistic ok", &style, &mut tokens);
        let lines = wrap(tokens, 5.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0][0].text, "Supercalifragilistic");
        assert_eq!(lines[1][0].text, "ok");
    }

    #[test]
    fn test_line_break_forces_new_line() {
        let stylesheet = Stylesheet::default();
        let engine = LayoutEngine::new(&stylesheet, PageInfo::default());
        let laid = engine.section(
            &section(vec![LayoutNode::paragraph(
                NodeMetadata::default(),
                vec![InlineNode::text("one"), InlineNode::LineBreak, InlineNode::text("two")],
            )]),
            180.0,
        );
        assert_eq!(texts(&laid.draws), vec!["one", "two"]);
        let line = ComputedStyle::default().line_height_mm();
        assert!((laid.height - 2.0 * line).abs() < 0.001);
    }

    #[test]
    fn test_page_placeholders_are_filled() {
        let stylesheet = Stylesheet::default();
        let engine = LayoutEngine::new(&stylesheet, PageInfo { number: 2, count: 3 });
        let laid = engine.section(
            &section(vec![LayoutNode::paragraph(
                NodeMetadata::default(),
                vec![
                    InlineNode::text("Page "),
                    InlineNode::PageNumber,
                    InlineNode::text(" of "),
                    InlineNode::PageCount,
                ],
            )]),
            180.0,
        );
        assert_eq!(texts(&laid.draws), vec!["Page 2 of 3"]);
    }

    #[test]
    fn test_span_style_splits_runs() {
        let sheet = sheet();
        let engine = LayoutEngine::new(&sheet, PageInfo::default());
        let laid = engine.section(
            &section(vec![LayoutNode::paragraph(
                NodeMetadata::default(),
                vec![InlineNode::span(class::STRONG, "CCT: "), InlineNode::text("3000K")],
            )]),
            180.0,
        );
        let weights: Vec<(String, FontWeight)> = laid
            .draws
            .iter()
            .filter_map(|d| match d {
                Draw::Text { text, weight, .. } => Some((text.clone(), *weight)),
                _ => None,
            })
            .collect();
        assert_eq!(
            weights,
            vec![
                ("CCT: ".to_string(), FontWeight::Bold),
                ("3000K".to_string(), FontWeight::Regular)
            ]
        );
    }

    #[test]
    fn test_columns_share_the_tallest_height() {
        let mut sheet = Stylesheet::default();
        sheet.insert(
            "panel",
            specsheet_style::ElementStyle {
                background_color: Some(palette::PANEL),
                padding: Some(Margins::all(2.0)),
                ..Default::default()
            },
        );
        let engine = LayoutEngine::new(&sheet, PageInfo::default());
        let laid = engine.section(
            &section(vec![LayoutNode::Columns {
                meta: NodeMetadata::default(),
                columns: vec![
                    Column::styled(90.0, NodeMetadata::class("panel"), vec![LayoutNode::Spacer { height: 10.0 }]),
                    Column::styled(90.0, NodeMetadata::class("panel"), vec![LayoutNode::Spacer { height: 30.0 }]),
                ],
            }]),
            180.0,
        );
        assert!((laid.height - 34.0).abs() < 0.001);
        let fills: Vec<Rect> = laid
            .draws
            .iter()
            .filter_map(|d| match d {
                Draw::Fill { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect();
        assert_eq!(fills.len(), 2);
        assert!(fills.iter().all(|r| (r.height - 34.0).abs() < 0.001));
        assert_eq!(fills[1].x, 90.0);
    }

    #[test]
    fn test_selected_row_is_filled_and_table_draws_grid() {
        let sheet = sheet();
        let engine = LayoutEngine::new(&sheet, PageInfo::default());
        fn cell(classes: &[&str], text: &str) -> TableCell {
            TableCell::text(NodeMetadata::classes(classes), text)
        }
        let laid = engine.section(
            &section(vec![LayoutNode::Table {
                meta: NodeMetadata::class(class::TABLE),
                columns: vec![TableColumnDefinition { width: 50.0 }, TableColumnDefinition { width: 20.0 }],
                header: Some(TableRow::new(
                    NodeMetadata::class(class::TABLE_HEADER),
                    vec![cell(&[], "Product Code"), cell(&[], "Output (lm)")],
                )),
                rows: vec![
                    TableRow::new(NodeMetadata::default(), vec![cell(&[class::TABLE_CELL], "A-9W"), cell(&[class::TABLE_CELL], "945")]),
                    TableRow::new(
                        NodeMetadata::default(),
                        vec![
                            cell(&[class::TABLE_CELL, class::ROW_SELECTED], "A-12W"),
                            cell(&[class::TABLE_CELL, class::ROW_SELECTED], "1260"),
                        ],
                    ),
                ],
            }]),
            180.0,
        );
        let highlighted = laid
            .draws
            .iter()
            .filter(|d| matches!(d, Draw::Fill { color, .. } if *color == palette::HIGHLIGHT))
            .count();
        assert_eq!(highlighted, 2);
        let outlines = laid.draws.iter().filter(|d| matches!(d, Draw::Outline { .. })).count();
        assert_eq!(outlines, 6);
        assert!(texts(&laid.draws).contains(&"A-12W"));
    }

    #[test]
    fn test_image_is_shrunk_to_column_and_centred() {
        let image = Arc::new(ResolvedImage::new("https://x/p.png", 2, 1, vec![0; 6], Size::new(100.0, 50.0)));
        let mut out = Vec::new();
        let height = place_image(&image, 10.0, 0.0, 50.0, &mut out);
        assert!((height - 25.0).abs() < 0.001);

        let small = Arc::new(ResolvedImage::new("https://x/s.png", 2, 1, vec![0; 6], Size::new(20.0, 10.0)));
        place_image(&small, 10.0, 0.0, 50.0, &mut out);
        match &out[1] {
            Draw::Image { rect, .. } => assert!((rect.x - 25.0).abs() < 0.001),
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn test_translate_moves_every_draw() {
        let stylesheet = Stylesheet::default();
        let engine = LayoutEngine::new(&stylesheet, PageInfo::default());
        let laid = engine
            .section(&section(vec![LayoutNode::text(NodeMetadata::default(), "x")]), 100.0)
            .translate(15.0, 20.0);
        match &laid.draws[0] {
            Draw::Text { x, baseline, .. } => {
                assert_eq!(*x, 15.0);
                assert!(*baseline > 20.0);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_rule_uses_min_height() {
        let sheet = sheet();
        let engine = LayoutEngine::new(&sheet, PageInfo::default());
        let laid = engine.section(
            &section(vec![LayoutNode::Rule {
                meta: NodeMetadata::class(class::ACCENT_BAR),
            }]),
            180.0,
        );
        assert!(matches!(&laid.draws[0], Draw::Fill { rect, color } if (rect.height - 1.2).abs() < 0.001 && *color == palette::ACCENT));
    }
}
