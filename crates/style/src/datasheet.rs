//! The visual grammar of the product datasheet: palette, class names and the
//! stylesheet that binds them.
//!
//! The composer only ever refers to the names in [`class`]; the renderer only
//! ever sees the resolved styles. Restyling the datasheet means editing this file.

use crate::border::Border;
use crate::dimension::Margins;
use crate::font::FontWeight;
use crate::stylesheet::{ElementStyle, PageLayout, Stylesheet};
use crate::text::TextAlign;
use specsheet_types::Color;

pub mod palette {
    use specsheet_types::Color;

    pub const CHARCOAL: Color = Color::rgb(0x2c, 0x2c, 0x2c);
    pub const SLATE: Color = Color::rgb(0x42, 0x42, 0x42);
    pub const ACCENT: Color = Color::rgb(0x8b, 0xc3, 0x4a);
    pub const PANEL: Color = Color::rgb(0xfa, 0xfa, 0xfa);
    pub const GRID: Color = Color::rgb(0xdd, 0xdd, 0xdd);
    pub const HIGHLIGHT: Color = Color::rgb(0xe8, 0xf5, 0xe8);
    pub const MUTED: Color = Color::rgb(0x66, 0x66, 0x66);
    pub const SOFT: Color = Color::rgb(0xcc, 0xcc, 0xcc);
}

pub mod class {
    pub const BRAND_BLOCK: &str = "brand-block";
    pub const BRAND_NAME: &str = "brand-name";
    pub const BRAND_TAGLINE: &str = "brand-tagline";
    pub const CATEGORY_BADGE: &str = "category-badge";
    pub const HEADER_META: &str = "header-meta";
    pub const ACCENT_BAR: &str = "accent-bar";
    pub const TITLE: &str = "title";
    pub const PART_CODE: &str = "part-code";
    pub const SECTION: &str = "section";
    pub const SECTION_HEADING: &str = "section-heading";
    pub const PANEL: &str = "panel";
    pub const CAPTION: &str = "caption";
    pub const FALLBACK: &str = "fallback";
    pub const TABLE: &str = "table";
    pub const TABLE_HEADER: &str = "table-header";
    pub const TABLE_CELL: &str = "table-cell";
    pub const ROW_SELECTED: &str = "row-selected";
    pub const KV_LABEL: &str = "kv-label";
    pub const KV_VALUE: &str = "kv-value";
    pub const OPTION_ITEM: &str = "option-item";
    pub const BADGE: &str = "badge";
    pub const STRONG: &str = "strong";
    pub const MUTED: &str = "muted";
    pub const FOOTER: &str = "footer";
    pub const FOOTER_BRAND: &str = "footer-brand";
    pub const PAGE_NUMBER: &str = "page-number";
}

fn style() -> ElementStyle {
    ElementStyle::default()
}

impl Stylesheet {
    /// The stylesheet every datasheet is rendered with: A4, 15 mm margins.
    pub fn datasheet() -> Stylesheet {
        let mut sheet = Stylesheet {
            page: PageLayout::default(),
            ..Default::default()
        };
        let white = Color::WHITE;

        sheet.insert(class::BRAND_BLOCK, ElementStyle {
            background_color: Some(palette::CHARCOAL),
            color: Some(white.clone()),
            padding: Some(Margins::all(3.0)),
            ..style()
        });
        sheet.insert(class::BRAND_NAME, ElementStyle {
            font_size: Some(18.0),
            font_weight: Some(FontWeight::Bold),
            ..style()
        });
        sheet.insert(class::BRAND_TAGLINE, ElementStyle {
            font_size: Some(6.0),
            color: Some(palette::SOFT),
            ..style()
        });
        sheet.insert(class::CATEGORY_BADGE, ElementStyle {
            background_color: Some(palette::ACCENT),
            color: Some(white.clone()),
            font_size: Some(10.0),
            font_weight: Some(FontWeight::Bold),
            text_align: Some(TextAlign::Center),
            padding: Some(Margins { top: 5.0, right: 2.0, bottom: 5.0, left: 2.0 }),
            ..style()
        });
        sheet.insert(class::HEADER_META, ElementStyle {
            font_size: Some(7.0),
            color: Some(palette::MUTED),
            text_align: Some(TextAlign::Right),
            padding: Some(Margins::all(2.0)),
            ..style()
        });
        sheet.insert(class::ACCENT_BAR, ElementStyle {
            background_color: Some(palette::ACCENT),
            min_height: Some(1.2),
            margin_bottom: Some(4.0),
            ..style()
        });
        sheet.insert(class::TITLE, ElementStyle {
            font_size: Some(28.0),
            font_weight: Some(FontWeight::Bold),
            color: Some(palette::CHARCOAL),
            line_height: Some(1.1),
            ..style()
        });
        sheet.insert(class::PART_CODE, ElementStyle {
            font_size: Some(9.0),
            color: Some(palette::SLATE),
            margin_bottom: Some(4.0),
            ..style()
        });
        sheet.insert(class::SECTION, ElementStyle {
            margin_bottom: Some(4.0),
            ..style()
        });
        sheet.insert(class::SECTION_HEADING, ElementStyle {
            font_size: Some(10.0),
            font_weight: Some(FontWeight::Bold),
            color: Some(palette::CHARCOAL),
            border: Some(Border::new(0.75, palette::ACCENT)),
            padding: Some(Margins { top: 1.0, right: 0.0, bottom: 1.0, left: 0.0 }),
            margin_bottom: Some(2.0),
            ..style()
        });
        sheet.insert(class::PANEL, ElementStyle {
            background_color: Some(palette::PANEL),
            border: Some(Border::new(0.5, palette::GRID)),
            padding: Some(Margins::all(2.0)),
            ..style()
        });
        sheet.insert(class::CAPTION, ElementStyle {
            font_size: Some(7.0),
            font_weight: Some(FontWeight::Bold),
            color: Some(palette::SLATE),
            text_align: Some(TextAlign::Center),
            margin_bottom: Some(1.0),
            ..style()
        });
        sheet.insert(class::FALLBACK, ElementStyle {
            font_size: Some(7.0),
            color: Some(palette::MUTED),
            ..style()
        });
        sheet.insert(class::TABLE, ElementStyle {
            border: Some(Border::new(0.5, palette::GRID)),
            ..style()
        });
        sheet.insert(class::TABLE_HEADER, ElementStyle {
            background_color: Some(palette::SLATE),
            color: Some(white.clone()),
            font_size: Some(7.5),
            font_weight: Some(FontWeight::Bold),
            text_align: Some(TextAlign::Center),
            padding: Some(Margins::all(1.5)),
            ..style()
        });
        sheet.insert(class::TABLE_CELL, ElementStyle {
            font_size: Some(7.5),
            text_align: Some(TextAlign::Center),
            padding: Some(Margins::all(1.5)),
            ..style()
        });
        sheet.insert(class::ROW_SELECTED, ElementStyle {
            background_color: Some(palette::HIGHLIGHT),
            font_weight: Some(FontWeight::Bold),
            ..style()
        });
        sheet.insert(class::KV_LABEL, ElementStyle {
            font_size: Some(7.5),
            font_weight: Some(FontWeight::Bold),
            color: Some(palette::SLATE),
            padding: Some(Margins::y(0.6)),
            ..style()
        });
        sheet.insert(class::KV_VALUE, ElementStyle {
            font_size: Some(7.5),
            padding: Some(Margins::y(0.6)),
            ..style()
        });
        sheet.insert(class::OPTION_ITEM, ElementStyle {
            font_size: Some(8.0),
            padding: Some(Margins::y(0.8)),
            ..style()
        });
        sheet.insert(class::BADGE, ElementStyle {
            background_color: Some(palette::ACCENT),
            color: Some(white),
            font_size: Some(7.0),
            font_weight: Some(FontWeight::Bold),
            text_align: Some(TextAlign::Center),
            padding: Some(Margins::all(1.2)),
            ..style()
        });
        sheet.insert(class::STRONG, ElementStyle {
            font_weight: Some(FontWeight::Bold),
            ..style()
        });
        sheet.insert(class::MUTED, ElementStyle {
            font_size: Some(7.0),
            color: Some(palette::MUTED),
            ..style()
        });
        sheet.insert(class::FOOTER, ElementStyle {
            font_size: Some(7.0),
            color: Some(palette::MUTED),
            border: Some(Border::new(0.5, palette::GRID)),
            padding: Some(Margins { top: 2.0, right: 0.0, bottom: 0.0, left: 0.0 }),
            ..style()
        });
        sheet.insert(class::FOOTER_BRAND, ElementStyle {
            font_size: Some(9.0),
            font_weight: Some(FontWeight::Bold),
            color: Some(palette::CHARCOAL),
            text_align: Some(TextAlign::Center),
            ..style()
        });
        sheet.insert(class::PAGE_NUMBER, ElementStyle {
            text_align: Some(TextAlign::Right),
            ..style()
        });
        sheet
    }
}
