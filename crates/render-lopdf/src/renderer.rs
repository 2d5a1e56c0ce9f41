use crate::layout::{LaidOut, LayoutEngine, PageInfo};
use crate::page::{BOLD_FONT_KEY, ImageSlot, PageWriter, REGULAR_FONT_KEY};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use specsheet_idf::{LayoutTree, ResolvedImage};
use specsheet_render_core::utils::base_font_name;
use specsheet_render_core::{DocumentRenderer, RenderContext, RenderError, RenderedDocument};
use specsheet_style::{FontWeight, Stylesheet};
use std::collections::HashMap;
use std::sync::Arc;

const EPSILON: f32 = 0.01;

/// Assigns sections to pages in order. A section that does not fit in what is
/// left of the current page starts a new one; a section taller than a whole
/// page gets a page to itself and overflows it.
///
/// Heights are `(height, margin_bottom)` pairs. The margin of the last section
/// on a page does not count against the page.
pub fn paginate(heights: &[(f32, f32)], available: f32) -> Vec<Vec<usize>> {
    let mut pages = Vec::new();
    let mut current = Vec::new();
    let mut used = 0.0;
    for (index, &(height, margin)) in heights.iter().enumerate() {
        if !current.is_empty() && used + height > available + EPSILON {
            pages.push(std::mem::take(&mut current));
            used = 0.0;
        }
        current.push(index);
        used += height + margin;
    }
    if !current.is_empty() || pages.is_empty() {
        pages.push(current);
    }
    pages
}

/// An in-memory PDF renderer using the `lopdf` library.
///
/// Pages use the stylesheet's page size and margins. Body sections flow down
/// the page and move whole to the next page when they do not fit; the footer
/// is drawn in the band reserved at the bottom of every page. Text is set in
/// the base-14 Helvetica faces with WinAnsi encoding, so nothing is embedded
/// except images.
#[derive(Debug, Clone)]
pub struct LopdfRenderer {
    compress: bool,
}

impl Default for LopdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl LopdfRenderer {
    pub fn new() -> Self {
        Self { compress: true }
    }

    /// Leave content streams uncompressed. Handy when inspecting output.
    pub fn uncompressed() -> Self {
        Self { compress: false }
    }
}

fn font_dictionary() -> Dictionary {
    let mut fonts = Dictionary::new();
    for (key, weight) in [(REGULAR_FONT_KEY, FontWeight::Regular), (BOLD_FONT_KEY, FontWeight::Bold)] {
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base_font_name(weight),
            "Encoding" => "WinAnsiEncoding",
        };
        fonts.set(key, font);
    }
    fonts
}

fn image_stream(image: &ResolvedImage) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image.pixel_width),
            "Height" => i64::from(image.pixel_height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        image.pixels.to_vec(),
    )
}

/// Adds one XObject per distinct image and returns the resource names.
fn embed_images(
    document: &mut Document,
    images: &[&Arc<ResolvedImage>],
) -> (HashMap<ImageSlot, String>, Dictionary) {
    let mut names = HashMap::new();
    let mut xobjects = Dictionary::new();
    for image in images {
        let slot = (image.src.clone(), image.pixel_width, image.pixel_height);
        if names.contains_key(&slot) {
            continue;
        }
        if !image.is_consistent() || image.pixel_width == 0 || image.pixel_height == 0 {
            log::warn!(
                "Skipping image with inconsistent pixel data: {} ({}x{}, {} bytes)",
                image.src,
                image.pixel_width,
                image.pixel_height,
                image.pixels.len()
            );
            continue;
        }
        let name = format!("Im{}", names.len() + 1);
        let id = document.add_object(image_stream(image));
        xobjects.set(name.as_bytes(), Object::Reference(id));
        names.insert(slot, name);
    }
    (names, xobjects)
}

impl DocumentRenderer for LopdfRenderer {
    fn render(
        &self,
        tree: &LayoutTree,
        stylesheet: &Stylesheet,
        ctx: &RenderContext,
    ) -> Result<RenderedDocument, RenderError> {
        ctx.checkpoint()?;
        let page = &stylesheet.page;
        let (page_width_mm, page_height_mm) = page.size.dimensions_mm();
        let (page_width, page_height) = page.size.dimensions_pt();
        let content_width = page.content_width();
        let body_top = page.margins.top;
        let footer_top = page_height_mm - page.margins.bottom - page.footer_height;
        let available = footer_top - body_top;
        if content_width <= 0.0 || available <= 0.0 {
            return Err(RenderError::Other(format!(
                "page {page_width_mm}x{page_height_mm}mm leaves no room for content"
            )));
        }

        let body: Vec<_> = tree.body().collect();
        let mut heights = Vec::with_capacity(body.len());
        let measure = LayoutEngine::new(stylesheet, PageInfo::default());
        for section in &body {
            ctx.checkpoint()?;
            let laid = measure.section(section, content_width);
            if laid.height > available + EPSILON {
                log::warn!(
                    "Section '{}' is {:.1}mm tall, more than a page ({:.1}mm); it will overflow",
                    section.kind,
                    laid.height,
                    available
                );
            }
            heights.push((laid.height, laid.margin_bottom));
        }
        let pages = paginate(&heights, available);
        let page_count = pages.len();
        log::debug!("Paginated {} sections onto {} page(s)", body.len(), page_count);

        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        let (image_names, xobjects) = embed_images(&mut document, &tree.images());
        let mut resources = dictionary! { "Font" => font_dictionary() };
        if !xobjects.is_empty() {
            resources.set("XObject", xobjects);
        }
        let resources_id = document.add_object(resources);

        let mut page_ids: Vec<ObjectId> = Vec::with_capacity(page_count);
        for (index, sections) in pages.iter().enumerate() {
            ctx.checkpoint()?;
            let engine = LayoutEngine::new(
                stylesheet,
                PageInfo {
                    number: index + 1,
                    count: page_count,
                },
            );
            let mut writer = PageWriter::new(page_height, &image_names);
            let mut cursor = body_top;
            for &i in sections {
                let laid: LaidOut = engine
                    .section(body[i], content_width)
                    .translate(page.margins.left, cursor);
                cursor += laid.advance();
                writer.draw_all(&laid.draws);
            }
            if let Some(footer) = tree.footer() {
                let laid = engine
                    .section(footer, content_width)
                    .translate(page.margins.left, footer_top);
                writer.draw_all(&laid.draws);
            }

            let content_id = document.add_object(Stream::new(dictionary! {}, writer.finish().encode()?));
            let page_id = document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), page_width.into(), page_height.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            page_ids.push(page_id);
        }

        let kids: Vec<Object> = page_ids.iter().map(|id| Object::from(*id)).collect();
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );
        let catalog_id = document.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        document.trailer.set("Root", catalog_id);
        let info_id = document.add_object(dictionary! {
            "Producer" => Object::string_literal("specsheet"),
        });
        document.trailer.set("Info", info_id);
        if self.compress {
            document.compress();
        }

        ctx.checkpoint()?;
        let mut bytes = Vec::new();
        document.save_to(&mut bytes)?;
        Ok(RenderedDocument::new(bytes, Some(page_count)))
    }

    fn name(&self) -> &'static str {
        "LopdfRenderer"
    }
}
