//! Intermediate Document Format (IDF) for datasheets.
//!
//! A [`LayoutTree`] is the complete structural description of one datasheet:
//! an ordered list of named sections, each holding a tree of [`LayoutNode`]s
//! with fixed geometry (column widths and image boxes in millimetres).
//! Styling is by class name; the renderer resolves names against a
//! `Stylesheet`. Nothing in the tree is optional at render time: images are
//! already decoded and every text run is concrete.

mod image;

pub use image::{ImageKey, ImageRequest, ImageSet, ResolvedImage};

use serde::{Deserialize, Serialize};
use specsheet_style::stylesheet::ElementStyle;
use std::fmt;
use std::sync::Arc;

// --- Shared Types ---

pub type TextStr = String;

/// A reference-counted container for shared, immutable data like image pixels.
pub type SharedData = Arc<Vec<u8>>;

/// A common metadata structure for all block-level `LayoutNode`s.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TextStr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_override: Option<ElementStyle>,
}

impl NodeMetadata {
    pub fn class(name: &str) -> Self {
        Self {
            classes: vec![name.to_string()],
            ..Default::default()
        }
    }

    pub fn classes(names: &[&str]) -> Self {
        Self {
            classes: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<TextStr>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c == name)
    }
}

// --- Sections ---

/// The named sections of a datasheet, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    Header,
    Title,
    ImageTriplet,
    Specifications,
    CustomizableSpecifications,
    LightDistribution,
    Accessories,
    Certifications,
    Footer,
}

impl SectionKind {
    pub const ORDER: [SectionKind; 9] = [
        SectionKind::Header,
        SectionKind::Title,
        SectionKind::ImageTriplet,
        SectionKind::Specifications,
        SectionKind::CustomizableSpecifications,
        SectionKind::LightDistribution,
        SectionKind::Accessories,
        SectionKind::Certifications,
        SectionKind::Footer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Header => "header",
            SectionKind::Title => "title",
            SectionKind::ImageTriplet => "image-triplet",
            SectionKind::Specifications => "specifications",
            SectionKind::CustomizableSpecifications => "customizable-specifications",
            SectionKind::LightDistribution => "light-distribution",
            SectionKind::Accessories => "accessories",
            SectionKind::Certifications => "certifications",
            SectionKind::Footer => "footer",
        }
    }

    /// Sections that a tree may legitimately leave out.
    pub fn is_optional(self) -> bool {
        matches!(self, SectionKind::Accessories)
    }

    /// The footer repeats at the bottom of every page instead of flowing with the body.
    pub fn is_running(self) -> bool {
        matches!(self, SectionKind::Footer)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    #[serde(default)]
    pub meta: NodeMetadata,
    pub children: Vec<LayoutNode>,
}

impl Section {
    pub fn new(kind: SectionKind, meta: NodeMetadata, children: Vec<LayoutNode>) -> Self {
        Self { kind, meta, children }
    }
}

/// The root of a composed datasheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutTree {
    pub sections: Vec<Section>,
}

impl LayoutTree {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn has_section(&self, kind: SectionKind) -> bool {
        self.section(kind).is_some()
    }

    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }

    /// Sections that flow down the page, in order.
    pub fn body(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| !s.kind.is_running())
    }

    pub fn footer(&self) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind.is_running())
    }

    /// Every image in the tree, depth first.
    pub fn images(&self) -> Vec<&Arc<ResolvedImage>> {
        let mut out = Vec::new();
        for section in &self.sections {
            for node in &section.children {
                node.collect_images(&mut out);
            }
        }
        out
    }

    /// All text of a section, concatenated with single spaces. Mostly useful for assertions
    /// and logging.
    pub fn section_text(&self, kind: SectionKind) -> String {
        let mut parts = Vec::new();
        if let Some(section) = self.section(kind) {
            for node in &section.children {
                node.collect_text(&mut parts);
            }
        }
        parts.join(" ")
    }
}

// --- Main Node Enums ---

/// Represents a block-level element in a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LayoutNode {
    /// A vertical stack of children.
    Block {
        #[serde(default)]
        meta: NodeMetadata,
        children: Vec<LayoutNode>,
    },
    /// Side-by-side columns of fixed width.
    Columns {
        #[serde(default)]
        meta: NodeMetadata,
        columns: Vec<Column>,
    },
    /// A paragraph, containing only inline content.
    Paragraph {
        #[serde(default)]
        meta: NodeMetadata,
        children: Vec<InlineNode>,
    },
    /// A decoded image, drawn at its resolved size.
    Image {
        #[serde(default)]
        meta: NodeMetadata,
        image: Arc<ResolvedImage>,
    },
    /// A table with fixed column widths.
    Table {
        #[serde(default)]
        meta: NodeMetadata,
        columns: Vec<TableColumnDefinition>,
        #[serde(default)]
        header: Option<TableRow>,
        rows: Vec<TableRow>,
    },
    /// A filled bar, sized by its style's `min_height`.
    Rule {
        #[serde(default)]
        meta: NodeMetadata,
    },
    /// Vertical whitespace in millimetres.
    Spacer { height: f32 },
}

impl LayoutNode {
    pub fn meta(&self) -> Option<&NodeMetadata> {
        match self {
            LayoutNode::Block { meta, .. }
            | LayoutNode::Columns { meta, .. }
            | LayoutNode::Paragraph { meta, .. }
            | LayoutNode::Image { meta, .. }
            | LayoutNode::Table { meta, .. }
            | LayoutNode::Rule { meta } => Some(meta),
            LayoutNode::Spacer { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LayoutNode::Block { .. } => "block",
            LayoutNode::Columns { .. } => "columns",
            LayoutNode::Paragraph { .. } => "paragraph",
            LayoutNode::Image { .. } => "image",
            LayoutNode::Table { .. } => "table",
            LayoutNode::Rule { .. } => "rule",
            LayoutNode::Spacer { .. } => "spacer",
        }
    }

    pub fn block(meta: NodeMetadata, children: Vec<LayoutNode>) -> Self {
        LayoutNode::Block { meta, children }
    }

    pub fn paragraph(meta: NodeMetadata, children: Vec<InlineNode>) -> Self {
        LayoutNode::Paragraph { meta, children }
    }

    /// A paragraph holding a single run of text.
    pub fn text(meta: NodeMetadata, text: impl Into<TextStr>) -> Self {
        LayoutNode::Paragraph {
            meta,
            children: vec![InlineNode::Text(text.into())],
        }
    }

    pub fn image(meta: NodeMetadata, image: Arc<ResolvedImage>) -> Self {
        LayoutNode::Image { meta, image }
    }

    fn collect_images<'a>(&'a self, out: &mut Vec<&'a Arc<ResolvedImage>>) {
        match self {
            LayoutNode::Image { image, .. } => out.push(image),
            LayoutNode::Block { children, .. } => {
                children.iter().for_each(|c| c.collect_images(out))
            }
            LayoutNode::Columns { columns, .. } => columns
                .iter()
                .flat_map(|c| &c.children)
                .for_each(|c| c.collect_images(out)),
            _ => {}
        }
    }

    fn collect_text(&self, out: &mut Vec<String>) {
        match self {
            LayoutNode::Paragraph { children, .. } => {
                let text = InlineNode::plain_text(children);
                if !text.is_empty() {
                    out.push(text);
                }
            }
            LayoutNode::Block { children, .. } => {
                children.iter().for_each(|c| c.collect_text(out))
            }
            LayoutNode::Columns { columns, .. } => columns
                .iter()
                .flat_map(|c| &c.children)
                .for_each(|c| c.collect_text(out)),
            LayoutNode::Table { header, rows, .. } => {
                for row in header.iter().chain(rows) {
                    for cell in &row.cells {
                        let text = InlineNode::plain_text(&cell.children);
                        if !text.is_empty() {
                            out.push(text);
                        }
                    }
                }
            }
            LayoutNode::Image { .. } | LayoutNode::Rule { .. } | LayoutNode::Spacer { .. } => {}
        }
    }
}

/// One column of a [`LayoutNode::Columns`] row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Width in millimetres.
    pub width: f32,
    #[serde(default)]
    pub meta: NodeMetadata,
    pub children: Vec<LayoutNode>,
}

impl Column {
    pub fn new(width: f32, children: Vec<LayoutNode>) -> Self {
        Self {
            width,
            meta: NodeMetadata::default(),
            children,
        }
    }

    pub fn styled(width: f32, meta: NodeMetadata, children: Vec<LayoutNode>) -> Self {
        Self { width, meta, children }
    }
}

/// Represents an inline-level element within a `Paragraph` or table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum InlineNode {
    /// A run of plain text.
    Text(TextStr),
    /// A styled run.
    Span {
        classes: Vec<String>,
        children: Vec<InlineNode>,
    },
    /// A hard line break.
    LineBreak,
    /// The current page number, filled in by the renderer.
    PageNumber,
    /// The total page count, filled in by the renderer.
    PageCount,
}

impl InlineNode {
    pub fn text(text: impl Into<TextStr>) -> Self {
        InlineNode::Text(text.into())
    }

    pub fn span(class: &str, text: impl Into<TextStr>) -> Self {
        InlineNode::Span {
            classes: vec![class.to_string()],
            children: vec![InlineNode::Text(text.into())],
        }
    }

    /// Concatenated text content; page placeholders render as `#`.
    pub fn plain_text(nodes: &[InlineNode]) -> String {
        let mut out = String::new();
        Self::push_text(nodes, &mut out);
        out.trim().to_string()
    }

    fn push_text(nodes: &[InlineNode], out: &mut String) {
        for node in nodes {
            match node {
                InlineNode::Text(text) => out.push_str(text),
                InlineNode::Span { children, .. } => Self::push_text(children, out),
                InlineNode::LineBreak => out.push(' '),
                InlineNode::PageNumber | InlineNode::PageCount => out.push('#'),
            }
        }
    }
}

// --- Table-specific Structures ---

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TableColumnDefinition {
    /// Width in millimetres.
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub meta: NodeMetadata,
    pub cells: Vec<TableCell>,
}

impl TableRow {
    pub fn new(meta: NodeMetadata, cells: Vec<TableCell>) -> Self {
        Self { meta, cells }
    }

    pub fn is_highlighted(&self, class: &str) -> bool {
        self.meta.has_class(class)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub meta: NodeMetadata,
    pub children: Vec<InlineNode>,
}

impl TableCell {
    pub fn text(meta: NodeMetadata, text: impl Into<TextStr>) -> Self {
        Self {
            meta,
            children: vec![InlineNode::Text(text.into())],
        }
    }

    pub fn plain_text(&self) -> String {
        InlineNode::plain_text(&self.children)
    }
}
