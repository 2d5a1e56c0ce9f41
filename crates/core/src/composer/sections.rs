use super::{ComposeInput, DefaultAssets, LayoutOptions, boxes, non_empty};
use crate::fields::number;
use crate::pricing::{display_part_code, variant_part_code};
use crate::variant::efficiency;
use specsheet_idf::{
    Column, ImageRequest, ImageSet, InlineNode, LayoutNode, NodeMetadata, Section, SectionKind,
    TableCell, TableColumnDefinition, TableRow,
};
use specsheet_style::class;
use specsheet_types::{Accessory, VisualAsset};

const TRIPLET_WIDTHS: [f32; 3] = [58.0, 68.0, 54.0];
const SPEC_WIDTHS: [f32; 5] = [52.0, 20.0, 18.0, 22.0, 23.0];
const SPEC_HEADERS: [&str; 5] = [
    "Product Code",
    "Output (lm)",
    "Power (W)",
    "Efficiency (lm/W)",
    "Tunable Range",
];
const TECHNICAL_WIDTHS: [f32; 4] = [38.0, 52.0, 38.0, 52.0];
const HALF_WIDTH: f32 = 90.0;
const ACCESSORY_CELL: f32 = 60.0;
const ACCESSORIES_PER_ROW: usize = 3;
const CERT_GRID_CELL: f32 = 32.0;
const CERT_STRIP_CELL: f32 = 30.0;
const CERTS_PER_STRIP: usize = 6;
const DESCRIPTION_LIMIT: usize = 50;

pub(super) struct Composition<'c, 'a> {
    pub input: &'c ComposeInput<'a>,
    pub images: &'c ImageSet,
    pub assets: &'c DefaultAssets,
    pub options: &'c LayoutOptions,
}

fn text(class_name: &str, value: impl Into<String>) -> LayoutNode {
    LayoutNode::text(NodeMetadata::class(class_name), value)
}

fn plain(value: impl Into<String>) -> LayoutNode {
    LayoutNode::text(NodeMetadata::default(), value)
}

fn heading(value: &str) -> LayoutNode {
    text(class::SECTION_HEADING, value)
}

/// `Label: value` with a bold label.
fn labelled(label: &str, value: impl Into<String>) -> LayoutNode {
    LayoutNode::paragraph(
        NodeMetadata::default(),
        vec![
            InlineNode::span(class::STRONG, format!("{label}: ")),
            InlineNode::text(value),
        ],
    )
}

fn section(kind: SectionKind, children: Vec<LayoutNode>) -> Section {
    Section::new(kind, NodeMetadata::class(class::SECTION).with_id(kind.name()), children)
}

fn columns(columns: Vec<Column>) -> LayoutNode {
    LayoutNode::Columns {
        meta: NodeMetadata::default(),
        columns,
    }
}

/// Label shown for a certification asset whose image is unavailable.
pub(crate) fn certification_badge_label(asset: &VisualAsset, index: usize) -> String {
    let name = if asset.file_name.trim().is_empty() {
        format!("Cert_{index}")
    } else {
        asset.file_name.clone()
    };
    name.replace('-', "")
        .replace(".png", "")
        .to_uppercase()
        .chars()
        .take(4)
        .collect()
}

pub(crate) fn truncate_description(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_LIMIT {
        let head: String = description.chars().take(DESCRIPTION_LIMIT).collect();
        format!("{head}...")
    } else {
        description.to_string()
    }
}

impl Composition<'_, '_> {
    fn image(&self, url: Option<&str>, (w, h): (f32, f32)) -> Option<LayoutNode> {
        let url = non_empty(url)?;
        let image = self.images.get(&ImageRequest::new(url, w, h))?;
        Some(LayoutNode::image(NodeMetadata::default(), image))
    }

    fn badge_row(&self, labels: &[String], width: f32) -> LayoutNode {
        columns(
            labels
                .iter()
                .map(|label| Column::new(width, vec![text(class::BADGE, label.clone())]))
                .collect(),
        )
    }

    fn certification_details(&self) -> Vec<LayoutNode> {
        vec![
            labelled("Rated Life", self.assets.rated_life.clone()),
            labelled("Operating Temp", self.assets.operating_temperature.clone()),
            labelled("Material", self.input.fields.material.value.clone()),
        ]
    }

    /// One cell per asset: the image, else its badge label.
    fn certification_cells(&self, assets: &[VisualAsset], width: f32) -> Vec<Column> {
        assets
            .iter()
            .enumerate()
            .map(|(i, asset)| {
                let node = self
                    .image(Some(asset.file_url.as_str()), boxes::CERTIFICATION)
                    .unwrap_or_else(|| text(class::BADGE, certification_badge_label(asset, i)));
                Column::new(width, vec![node])
            })
            .collect()
    }

    pub fn header(&self) -> Section {
        let brand = match self.image(self.assets.logo_url.as_deref(), boxes::LOGO) {
            Some(logo) => vec![logo],
            None => vec![
                text(class::BRAND_NAME, self.assets.brand_name.clone()),
                text(class::BRAND_TAGLINE, self.assets.brand_tagline.clone()),
            ],
        };
        section(
            SectionKind::Header,
            vec![
                columns(vec![
                    Column::styled(70.0, NodeMetadata::class(class::BRAND_BLOCK), brand),
                    Column::styled(
                        65.0,
                        NodeMetadata::class(class::HEADER_META),
                        vec![plain(self.assets.website.clone())],
                    ),
                    Column::styled(
                        45.0,
                        NodeMetadata::class(class::CATEGORY_BADGE),
                        vec![plain(self.assets.category_badge.clone())],
                    ),
                ]),
                LayoutNode::Rule {
                    meta: NodeMetadata::class(class::ACCENT_BAR),
                },
            ],
        )
    }

    pub fn title(&self) -> Section {
        let request = self.input.request;
        let mut children = vec![
            text(class::TITLE, request.product_name.clone()),
            LayoutNode::paragraph(
                NodeMetadata::class(class::PART_CODE),
                vec![
                    InlineNode::span(class::STRONG, "Part Code: "),
                    InlineNode::text(display_part_code(request, self.input.variant)),
                ],
            ),
        ];
        if let Some(description) = request
            .product
            .as_ref()
            .and_then(|p| non_empty(p.description.as_deref()))
        {
            children.push(text(class::MUTED, description));
        }
        section(SectionKind::Title, children)
    }

    pub fn image_triplet(&self) -> Section {
        let product = match self.image(self.input.product_image_url(), boxes::PRODUCT) {
            Some(image) => vec![
                text(class::CAPTION, "PRODUCT"),
                image,
                text(class::FALLBACK, self.assets.product_caption.clone()),
            ],
            None => std::iter::once(text(class::CAPTION, "PRODUCT"))
                .chain(self.assets.product_placeholder.iter().map(|l| text(class::FALLBACK, l.clone())))
                .collect(),
        };

        let certs = self.input.certifications();
        let mut certifications = vec![text(class::CAPTION, "CERTIFICATIONS")];
        if certs.is_empty() {
            certifications.push(self.badge_row(&self.assets.fallback_certifications, CERT_GRID_CELL));
        } else {
            let shown = &certs[..certs.len().min(self.options.certification_image_limit)];
            for pair in shown.chunks(2) {
                certifications.push(columns(self.certification_cells(pair, CERT_GRID_CELL)));
            }
        }
        certifications.push(LayoutNode::Spacer { height: 2.0 });
        certifications.extend(self.certification_details());

        let d = &self.input.fields.dimensions.value;
        let mut dimensions = vec![text(class::CAPTION, "DIMENSIONS (MM)")];
        match self.image(self.input.dimension_image_url(), boxes::DIMENSION) {
            Some(image) => dimensions.push(image),
            None => dimensions.extend(
                self.assets
                    .dimension_placeholder
                    .iter()
                    .map(|l| text(class::FALLBACK, l.clone())),
            ),
        }
        dimensions.push(labelled("Diameter", format!("Ø{}", number(d.diameter))));
        dimensions.push(labelled("Height", number(d.height)));

        let panel = || NodeMetadata::class(class::PANEL);
        section(
            SectionKind::ImageTriplet,
            vec![columns(vec![
                Column::styled(TRIPLET_WIDTHS[0], panel(), product),
                Column::styled(TRIPLET_WIDTHS[1], panel(), certifications),
                Column::styled(TRIPLET_WIDTHS[2], panel(), dimensions),
            ])],
        )
    }

    pub fn specifications(&self) -> Section {
        let request = self.input.request;
        let header_cells = SPEC_HEADERS
            .iter()
            .map(|h| TableCell::text(NodeMetadata::default(), *h))
            .collect();

        let rows = request
            .variants
            .iter()
            .map(|variant| {
                let meta = if variant.id == self.input.variant.id {
                    NodeMetadata::classes(&[class::TABLE_CELL, class::ROW_SELECTED])
                } else {
                    NodeMetadata::class(class::TABLE_CELL)
                };
                let tunable = variant
                    .spec_text("tunable_range")
                    .unwrap_or_else(|| self.options.tunable_range.clone());
                let cells = [
                    variant_part_code(request, variant),
                    number(variant.output),
                    number(variant.power),
                    number(efficiency(variant)),
                    tunable,
                ]
                .into_iter()
                .map(|value| TableCell::text(NodeMetadata::default(), value))
                .collect();
                TableRow::new(meta, cells)
            })
            .collect();

        let table = LayoutNode::Table {
            meta: NodeMetadata::class(class::TABLE),
            columns: SPEC_WIDTHS.iter().map(|&width| TableColumnDefinition { width }).collect(),
            header: Some(TableRow::new(NodeMetadata::class(class::TABLE_HEADER), header_cells)),
            rows,
        };

        let technical_rows = self
            .input
            .fields
            .rows()
            .chunks(2)
            .map(|pair| {
                let mut cells = Vec::with_capacity(4);
                for (label, value) in pair {
                    cells.push(TableCell::text(NodeMetadata::class(class::KV_LABEL), *label));
                    cells.push(TableCell::text(NodeMetadata::class(class::KV_VALUE), value.clone()));
                }
                TableRow::new(NodeMetadata::default(), cells)
            })
            .collect();
        let technical = LayoutNode::Table {
            meta: NodeMetadata::default(),
            columns: TECHNICAL_WIDTHS.iter().map(|&width| TableColumnDefinition { width }).collect(),
            header: None,
            rows: technical_rows,
        };

        section(
            SectionKind::Specifications,
            vec![
                heading("SPECIFICATIONS"),
                table,
                LayoutNode::Spacer { height: 3.0 },
                text(class::CAPTION, "Technical Data"),
                technical,
            ],
        )
    }

    /// `(category, label)` for each selected category, in category display order when
    /// the request knows its categories, by name otherwise.
    fn customizations(&self) -> Vec<(String, String)> {
        let request = self.input.request;
        let order = |name: &str| {
            request
                .configuration_categories
                .iter()
                .find(|c| c.category_name.eq_ignore_ascii_case(name) || c.label().eq_ignore_ascii_case(name))
                .map(|c| c.display_order)
                .unwrap_or(i32::MAX)
        };
        let mut entries: Vec<(i32, &String, String)> = request
            .selected_options
            .iter()
            .map(|(name, option)| {
                let label = option.display_value().unwrap_or("Not specified").to_string();
                (order(name), name, label)
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
        entries
            .into_iter()
            .map(|(_, name, label)| (name.clone(), label))
            .collect()
    }

    pub fn customizable_specifications(&self) -> Section {
        let entries = self.customizations();
        let mut children = vec![heading("CUSTOMIZABLE SPECIFICATIONS")];
        if entries.is_empty() {
            children.push(text(class::MUTED, "No customizations selected"));
        } else {
            let item = |(name, label): &(String, String)| {
                LayoutNode::paragraph(
                    NodeMetadata::class(class::OPTION_ITEM),
                    vec![
                        InlineNode::span(class::STRONG, format!("{name}: ")),
                        InlineNode::text(label.clone()),
                    ],
                )
            };
            let left = entries.iter().step_by(2).map(item).collect();
            let right = entries.iter().skip(1).step_by(2).map(item).collect();
            children.push(columns(vec![
                Column::styled(HALF_WIDTH, NodeMetadata::class(class::PANEL), left),
                Column::styled(HALF_WIDTH, NodeMetadata::class(class::PANEL), right),
            ]));
        }
        section(SectionKind::CustomizableSpecifications, children)
    }

    pub fn light_distribution(&self) -> Section {
        let mut polar = vec![text(class::STRONG, "Polar Distribution")];
        match self.image(self.input.beam_image_url(), boxes::LIGHT_DISTRIBUTION) {
            Some(chart) => polar.push(chart),
            None => polar.extend(
                self.assets
                    .light_distribution_placeholder
                    .iter()
                    .map(|l| plain(l.clone())),
            ),
        }

        let mut performance = vec![
            text(class::STRONG, "Performance Data"),
            labelled("Beam Angle", self.input.fields.beam_angle.value.clone()),
        ];
        performance.extend(self.assets.performance_data.iter().map(|l| plain(l.clone())));

        section(
            SectionKind::LightDistribution,
            vec![
                heading("LIGHT DISTRIBUTION"),
                columns(vec![
                    Column::styled(HALF_WIDTH, NodeMetadata::class(class::PANEL), polar),
                    Column::styled(HALF_WIDTH, NodeMetadata::class(class::PANEL), performance),
                ]),
            ],
        )
    }

    fn accessory_cell(&self, accessory: &Accessory) -> Column {
        let name = if accessory.name.trim().is_empty() { "Accessory" } else { accessory.name.as_str() };
        let part = if accessory.part_code.trim().is_empty() { "N/A" } else { accessory.part_code.as_str() };
        let mut children = vec![text(class::CAPTION, name)];
        children.push(
            self.image(accessory.image_url.as_deref(), boxes::ACCESSORY)
                .unwrap_or_else(|| text(class::FALLBACK, "[Image]")),
        );
        children.push(text(class::MUTED, format!("Part: {part}")));
        if let Some(description) = non_empty(accessory.description.as_deref()) {
            children.push(text(class::MUTED, truncate_description(description)));
        }
        Column::styled(ACCESSORY_CELL, NodeMetadata::class(class::PANEL), children)
    }

    pub fn accessories(&self) -> Section {
        let mut children = vec![heading("AVAILABLE ACCESSORIES")];
        if self.input.accessories.is_empty() {
            children.push(text(class::MUTED, "None selected"));
        }
        for row in self.input.accessories.chunks(ACCESSORIES_PER_ROW) {
            children.push(columns(row.iter().map(|a| self.accessory_cell(a)).collect()));
        }
        section(SectionKind::Accessories, children)
    }

    pub fn certifications(&self) -> Section {
        let certs = self.input.certifications();
        let mut children = vec![heading("CERTIFICATIONS")];
        if certs.is_empty() {
            children.push(self.badge_row(&self.assets.fallback_certifications, CERT_STRIP_CELL));
        } else {
            for strip in certs.chunks(CERTS_PER_STRIP) {
                children.push(columns(self.certification_cells(strip, CERT_STRIP_CELL)));
            }
        }
        children.push(LayoutNode::Spacer { height: 2.0 });
        children.extend(self.certification_details());
        section(SectionKind::Certifications, children)
    }

    pub fn footer(&self) -> Section {
        let brand = self
            .image(self.assets.footer_logo_url.as_deref(), boxes::FOOTER_LOGO)
            .unwrap_or_else(|| text(class::FOOTER_BRAND, self.assets.brand_name.clone()));
        let legal = format!("{} | {}", self.assets.legal_text, self.assets.website);
        let page = LayoutNode::paragraph(
            NodeMetadata::class(class::PAGE_NUMBER),
            vec![
                InlineNode::text("Page "),
                InlineNode::PageNumber,
                InlineNode::text(" of "),
                InlineNode::PageCount,
            ],
        );
        Section::new(
            SectionKind::Footer,
            NodeMetadata::class(class::FOOTER).with_id(SectionKind::Footer.name()),
            vec![columns(vec![
                Column::new(110.0, vec![plain(legal)]),
                Column::new(35.0, vec![brand]),
                Column::new(35.0, vec![page]),
            ])],
        )
    }
}
