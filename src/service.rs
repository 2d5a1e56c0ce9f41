//! The datasheet pipeline for one request:
//! `Received → Enriching → Resolving → Composing → Rendering`.
//!
//! Only rendering can fail once a request is accepted. Enrichment and image
//! fetches degrade the document instead of failing it.

use crate::config::{ConfigError, RenderBackend, ServiceConfig};
use crate::error::{DatasheetError, Stage};
use itertools::Itertools;
use log::{debug, info, warn};
use specsheet_core::{
    ComposeInput, DefaultAssets, FieldDefaults, FieldResolver, LayoutComposer, LayoutOptions,
    PriceQuote, display_part_code, resolve_variant,
};
use specsheet_executor::{Executor, ExecutorImpl};
use specsheet_idf::{ImageRequest, ImageSet, LayoutTree};
use specsheet_render_core::{
    CancellationFlag, CommandRenderer, DocumentRenderer, RenderContext, RenderError,
};
use specsheet_render_lopdf::LopdfRenderer;
use specsheet_resource::{AssetResolver, HttpResourceProvider, InMemoryResourceProvider};
use specsheet_source::{CachedCatalog, InMemoryCatalog};
use specsheet_style::Stylesheet;
use specsheet_traits::{Catalog, EmptyCatalog, ResourceProvider};
use specsheet_types::{
    ConfigurationRequest, Money, ProductId, ProductSelection, SelectedOption, VisualAssetBuckets,
};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A rendered datasheet and what it was rendered for.
#[derive(Debug, Clone)]
pub struct GeneratedDatasheet {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
    pub part_code: String,
    pub total_price: Money,
    pub page_count: Option<usize>,
}

impl GeneratedDatasheet {
    /// Writes the PDF to `path`. Readers of `path` never see a partial file.
    #[cfg(feature = "native")]
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(&self.bytes)?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    #[cfg(not(feature = "native"))]
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        file.write_all(&self.bytes)
    }
}

/// `Regulus Alpha` becomes `Regulus_Alpha_datasheet.pdf`.
pub fn datasheet_filename(product_name: &str) -> String {
    let stem: String = product_name
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    format!("{}_datasheet.pdf", stem)
}

/// Assembles a [`DatasheetService`]. Unset parts fall back to an empty
/// catalog, an offline resource provider, sequential fetching and the lopdf renderer.
pub struct DatasheetServiceBuilder {
    catalog: Arc<dyn Catalog>,
    resources: Arc<dyn ResourceProvider>,
    executor: ExecutorImpl,
    renderer: Arc<dyn DocumentRenderer>,
    assets: DefaultAssets,
    layout: LayoutOptions,
    fields: FieldDefaults,
    stylesheet: Stylesheet,
    render_timeout: Duration,
}

impl Default for DatasheetServiceBuilder {
    fn default() -> Self {
        Self {
            catalog: Arc::new(EmptyCatalog),
            resources: Arc::new(InMemoryResourceProvider::new()),
            executor: ExecutorImpl::bounded(1),
            renderer: Arc::new(LopdfRenderer::new()),
            assets: DefaultAssets::default(),
            layout: LayoutOptions::default(),
            fields: FieldDefaults::default(),
            stylesheet: Stylesheet::datasheet(),
            render_timeout: Duration::from_secs(30),
        }
    }
}

impl DatasheetServiceBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn Catalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_resource_provider(mut self, provider: Arc<dyn ResourceProvider>) -> Self {
        self.resources = provider;
        self
    }

    pub fn with_executor(mut self, executor: ExecutorImpl) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn DocumentRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_default_assets(mut self, assets: DefaultAssets) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_layout_options(mut self, options: LayoutOptions) -> Self {
        self.layout = options;
        self
    }

    pub fn with_field_defaults(mut self, defaults: FieldDefaults) -> Self {
        self.fields = defaults;
        self
    }

    pub fn with_stylesheet(mut self, stylesheet: Stylesheet) -> Self {
        self.stylesheet = stylesheet;
        self
    }

    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    pub fn build(self) -> DatasheetService {
        DatasheetService {
            catalog: self.catalog,
            assets: AssetResolver::new(self.resources),
            executor: self.executor,
            renderer: self.renderer,
            fields: FieldResolver::new(self.fields),
            composer: LayoutComposer::new(self.assets, self.layout),
            stylesheet: Arc::new(self.stylesheet),
            render_timeout: self.render_timeout,
        }
    }
}

#[derive(Debug)]
pub struct DatasheetService {
    catalog: Arc<dyn Catalog>,
    assets: AssetResolver,
    executor: ExecutorImpl,
    renderer: Arc<dyn DocumentRenderer>,
    fields: FieldResolver,
    composer: LayoutComposer,
    stylesheet: Arc<Stylesheet>,
    render_timeout: Duration,
}

/// A request carried up to the end of the `Composing` stage.
struct Composed {
    product_name: String,
    quote: PriceQuote,
    tree: LayoutTree,
    started: Instant,
}

/// Raises the flag when the future awaiting a blocking generation is dropped.
struct CancelOnDrop(Option<CancellationFlag>);

impl CancelOnDrop {
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(flag) = self.0.take() {
            debug!("Datasheet request abandoned, cancelling");
            flag.cancel();
        }
    }
}

impl DatasheetService {
    pub fn builder() -> DatasheetServiceBuilder {
        DatasheetServiceBuilder::new()
    }

    /// Wires the HTTP resource provider, the configured catalog and the configured renderer.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog: Arc<dyn Catalog> = match &config.catalog.snapshot {
            Some(path) => {
                let catalog = InMemoryCatalog::from_path(path).map_err(|e| {
                    ConfigError::Invalid(format!("catalog snapshot {}: {}", path.display(), e))
                })?;
                if config.catalog.cache {
                    Arc::new(CachedCatalog::new(catalog))
                } else {
                    Arc::new(catalog)
                }
            }
            None => Arc::new(EmptyCatalog),
        };

        let resources = HttpResourceProvider::new(config.fetch.http_options())
            .map_err(|e| ConfigError::Invalid(format!("HTTP client: {}", e)))?;

        let renderer: Arc<dyn DocumentRenderer> = match config.render.backend {
            RenderBackend::Lopdf if config.render.compress => Arc::new(LopdfRenderer::new()),
            RenderBackend::Lopdf => Arc::new(LopdfRenderer::uncompressed()),
            RenderBackend::Command => {
                let spec = config.render.command.clone().ok_or_else(|| {
                    ConfigError::Invalid("render.command is required for the command backend".into())
                })?;
                let mut renderer = CommandRenderer::new(spec);
                if let Some(root) = &config.render.scratch_dir {
                    renderer = renderer.with_scratch_root(root);
                }
                Arc::new(renderer)
            }
        };

        Ok(DatasheetServiceBuilder::new()
            .with_catalog(catalog)
            .with_resource_provider(Arc::new(resources))
            .with_executor(ExecutorImpl::bounded(config.fetch.max_concurrent))
            .with_renderer(renderer)
            .with_default_assets(config.assets.clone())
            .with_layout_options(config.layout.clone())
            .with_field_defaults(config.fields.clone())
            .with_render_timeout(config.render.timeout())
            .build())
    }

    pub fn catalog_name(&self) -> &'static str {
        self.catalog.name()
    }

    pub fn renderer_name(&self) -> &'static str {
        self.renderer.name()
    }

    pub fn generate(&self, request: ConfigurationRequest) -> Result<GeneratedDatasheet, DatasheetError> {
        self.generate_with_cancel(request, &CancellationFlag::new())
    }

    /// Runs the whole pipeline, stopping at the next stage boundary once `cancel` is raised.
    /// A running render is interrupted through its [`RenderContext`].
    pub fn generate_with_cancel(
        &self,
        request: ConfigurationRequest,
        cancel: &CancellationFlag,
    ) -> Result<GeneratedDatasheet, DatasheetError> {
        let composed = self.prepare(request, cancel)?;
        self.render_composed(composed, cancel).map(|(datasheet, _)| datasheet)
    }

    /// Like [`DatasheetService::generate`], also handing back the tree that was rendered.
    pub fn generate_with_tree(
        &self,
        request: ConfigurationRequest,
    ) -> Result<(GeneratedDatasheet, LayoutTree), DatasheetError> {
        let cancel = CancellationFlag::new();
        let composed = self.prepare(request, &cancel)?;
        self.render_composed(composed, &cancel)
    }

    /// `Received` through `Composing`.
    fn prepare(&self, request: ConfigurationRequest, cancel: &CancellationFlag) -> Result<Composed, DatasheetError> {
        let started = Instant::now();
        request.validate()?;
        checkpoint(cancel, Stage::Received)?;
        debug!(
            "Received datasheet request for '{}' ({} variants, {} options, {} accessories)",
            request.product_name,
            request.variants.len(),
            request.selected_options.len(),
            request.accessories.len()
        );

        let request = if request.has_embedded_assets() {
            request
        } else {
            debug!("Enriching '{}' from catalog {}", request.product_name, self.catalog.name());
            self.enrich(request)
        };
        checkpoint(cancel, Stage::Enriching)?;

        debug!("Resolving fields for '{}'", request.product_name);
        let variant = resolve_variant(&request);
        let fields = self.fields.resolve_with_variant(&request, &variant);
        let quote = PriceQuote::for_request(&request);
        checkpoint(cancel, Stage::Resolving)?;

        let input = ComposeInput::new(&request, &fields, &variant);
        let images = self.fetch_images(self.composer.image_requests(&input), cancel);
        checkpoint(cancel, Stage::Composing)?;
        debug!("Composing '{}' with {} images", request.product_name, images.len());
        let tree = self.composer.compose(&input, &images);
        checkpoint(cancel, Stage::Composing)?;

        Ok(Composed {
            product_name: request.product_name,
            quote,
            tree,
            started,
        })
    }

    fn render_composed(
        &self,
        composed: Composed,
        cancel: &CancellationFlag,
    ) -> Result<(GeneratedDatasheet, LayoutTree), DatasheetError> {
        let Composed { product_name, quote, tree, started } = composed;
        let (bytes, page_count) = self.render(&tree, cancel)?;
        info!(
            "Generated datasheet for '{}' ({}, {} bytes) in {:?}",
            product_name,
            quote.part_code,
            bytes.len(),
            started.elapsed()
        );
        let datasheet = GeneratedDatasheet {
            bytes,
            filename: datasheet_filename(&product_name),
            content_type: PDF_CONTENT_TYPE,
            part_code: quote.part_code,
            total_price: quote.total_price,
            page_count,
        };
        Ok((datasheet, tree))
    }

    /// Runs [`DatasheetService::generate`] on the blocking pool. Dropping the
    /// returned future cancels the request.
    pub async fn generate_async(
        self: &Arc<Self>,
        request: ConfigurationRequest,
    ) -> Result<GeneratedDatasheet, DatasheetError> {
        let cancel = CancellationFlag::new();
        let guard = CancelOnDrop(Some(cancel.clone()));
        let service = Arc::clone(self);
        let joined = tokio::task::spawn_blocking(move || service.generate_with_cancel(request, &cancel)).await;
        guard.disarm();
        joined.map_err(|e| {
            DatasheetError::from_render(
                Stage::Rendering,
                RenderError::Other(format!("datasheet worker failed: {}", e)),
            )
        })?
    }

    /// Builds a full request from catalog identifiers.
    ///
    /// Unknown product or variant ids are errors. Unknown option and accessory ids
    /// are skipped. Categories without a selected option take their default option.
    pub fn request_from_selection(
        &self,
        selection: &ProductSelection,
    ) -> Result<ConfigurationRequest, DatasheetError> {
        let product_id = selection.product_id;
        let product = self
            .catalog
            .get_product(product_id)?
            .ok_or_else(|| DatasheetError::not_found("product", product_id))?;

        let variants = self.catalog.get_variants(product_id)?;
        if let Some(variant_id) = selection.variant_id
            && !variants.iter().any(|v| v.id == variant_id)
        {
            return Err(DatasheetError::not_found("variant", variant_id));
        }

        let categories = self.catalog.get_configuration_categories(product_id)?;
        let mut selected_options = BTreeMap::new();
        for option_id in &selection.option_ids {
            match categories
                .iter()
                .find_map(|c| c.option(*option_id).map(|o| (c, o)))
            {
                Some((category, option)) => {
                    selected_options.insert(category.category_name.clone(), SelectedOption::from(option));
                }
                None => debug!("Skipping unknown option {} for product {}", option_id, product_id),
            }
        }
        for category in &categories {
            if !selected_options.contains_key(&category.category_name)
                && let Some(default) = category.default_option()
            {
                selected_options.insert(category.category_name.clone(), SelectedOption::from(default));
            }
        }

        let available = self.catalog.get_accessories(product_id)?;
        let accessories = selection
            .accessory_ids
            .iter()
            .filter_map(|id| {
                let found = available.iter().find(|a| a.id == *id).cloned();
                if found.is_none() {
                    debug!("Skipping unknown accessory {} for product {}", id, product_id);
                }
                found
            })
            .collect();

        let mut request = ConfigurationRequest {
            product_name: product.name.clone(),
            base_part_code: product.base_part_code.clone(),
            final_part_code: None,
            variants,
            selected_variant_id: selection.variant_id,
            selected_variant_index: None,
            selected_options,
            accessories,
            visual_assets: Some(self.visual_assets(product_id)),
            product: Some(product),
            configuration_categories: categories,
            features: self.catalog.get_features(product_id).unwrap_or_else(|e| {
                warn!("Features of product {} unavailable: {}", product_id, e);
                Vec::new()
            }),
        };
        request.final_part_code = Some(display_part_code(&request, &resolve_variant(&request)));
        request.validate()?;
        Ok(request)
    }

    pub fn quote(&self, selection: &ProductSelection) -> Result<PriceQuote, DatasheetError> {
        let request = self.request_from_selection(selection)?;
        Ok(PriceQuote::for_request(&request))
    }

    pub fn generate_for_selection(
        &self,
        selection: &ProductSelection,
    ) -> Result<GeneratedDatasheet, DatasheetError> {
        self.generate(self.request_from_selection(selection)?)
    }

    /// Enriches and composes without rendering. Images are fetched as for a real render.
    pub fn compose(&self, request: &ConfigurationRequest) -> Result<LayoutTree, DatasheetError> {
        Ok(self.prepare(request.clone(), &CancellationFlag::new())?.tree)
    }

    fn product_id_for(&self, request: &ConfigurationRequest) -> Option<ProductId> {
        if let Some(id) = request.product_id() {
            return Some(id);
        }
        match self.catalog.find_product_by_name(&request.product_name) {
            Ok(product) => product.map(|p| p.id),
            Err(e) => {
                warn!("Product lookup for '{}' failed: {}", request.product_name, e);
                None
            }
        }
    }

    fn visual_assets(&self, product_id: ProductId) -> VisualAssetBuckets {
        match self.catalog.get_visual_assets(product_id, true) {
            Ok(assets) => VisualAssetBuckets::classify(assets),
            Err(e) => {
                warn!("Visual assets of product {} unavailable: {}", product_id, e);
                VisualAssetBuckets::default()
            }
        }
    }

    /// Fills visual assets, and category metadata and features when absent.
    /// Every lookup failure is absorbed.
    fn enrich(&self, request: ConfigurationRequest) -> ConfigurationRequest {
        let Some(product_id) = self.product_id_for(&request) else {
            debug!("No product id for '{}', skipping enrichment", request.product_name);
            return request;
        };
        let mut enriched = request;
        enriched.visual_assets = Some(self.visual_assets(product_id));

        if enriched.configuration_categories.is_empty() {
            match self.catalog.get_configuration_categories(product_id) {
                Ok(categories) => enriched.configuration_categories = categories,
                Err(e) => warn!("Categories of product {} unavailable: {}", product_id, e),
            }
        }
        if enriched.features.is_empty() {
            match self.catalog.get_features(product_id) {
                Ok(features) => enriched.features = features,
                Err(e) => warn!("Features of product {} unavailable: {}", product_id, e),
            }
        }
        enriched
    }

    fn fetch_images(&self, requests: Vec<ImageRequest>, cancel: &CancellationFlag) -> ImageSet {
        if requests.is_empty() {
            return ImageSet::new();
        }
        debug!(
            "Fetching {} images via {} on {}",
            requests.len(),
            self.assets.provider_name(),
            self.executor.name()
        );
        let resolver = self.assets.clone();
        let cancel = cancel.clone();
        let results = self.executor.execute_all(requests, move |request: ImageRequest| {
            if cancel.is_cancelled() {
                return (request, None);
            }
            let image = resolver.resolve(&request);
            (request, image)
        });

        let (found, missing): (Vec<_>, Vec<_>) = results
            .into_iter()
            .partition_map(|(request, image)| match image {
                Some(image) => itertools::Either::Left((request, image)),
                None => itertools::Either::Right(request.url),
            });
        if !missing.is_empty() {
            debug!("{} images fell back to text: {}", missing.len(), missing.join(", "));
        }
        let mut images = ImageSet::new();
        for (request, image) in found {
            images.insert(&request, image);
        }
        images
    }

    fn render(
        &self,
        tree: &LayoutTree,
        cancel: &CancellationFlag,
    ) -> Result<(Vec<u8>, Option<usize>), DatasheetError> {
        let ctx = RenderContext::with_timeout(self.render_timeout).with_cancellation(cancel.clone());
        debug!(
            "Rendering {} sections with {} (timeout {:?})",
            tree.sections.len(),
            self.renderer.name(),
            self.render_timeout
        );
        let document = self
            .renderer
            .render(tree, &self.stylesheet, &ctx)
            .map_err(|e| {
                if e.is_interrupted() {
                    debug!("Render stopped: {}", e);
                } else {
                    warn!("{} failed: {}", self.renderer.name(), e);
                }
                DatasheetError::from_render(Stage::Rendering, e)
            })?;

        // External renderers report no page count; their output is checked here instead.
        let page_count = match document.page_count {
            Some(count) => count,
            None => lopdf::Document::load_mem(&document.bytes)
                .map(|doc| doc.get_pages().len())
                .map_err(|e| {
                    DatasheetError::from_render(
                        Stage::Rendering,
                        RenderError::Pdf(format!("{} produced an unreadable PDF: {}", self.renderer.name(), e)),
                    )
                })?,
        };
        if page_count == 0 {
            return Err(DatasheetError::from_render(
                Stage::Rendering,
                RenderError::Pdf(format!("{} produced a document without pages", self.renderer.name())),
            ));
        }
        Ok((document.bytes, Some(page_count)))
    }
}

fn checkpoint(cancel: &CancellationFlag, stage: Stage) -> Result<(), DatasheetError> {
    if cancel.is_cancelled() {
        debug!("Datasheet request cancelled while {}", stage);
        return Err(DatasheetError::Cancelled(stage));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_replaces_spaces() {
        assert_eq!(datasheet_filename("Regulus Alpha"), "Regulus_Alpha_datasheet.pdf");
        assert_eq!(datasheet_filename("  Vega 2 Trim "), "Vega_2_Trim_datasheet.pdf");
        assert_eq!(datasheet_filename("AC/DC Spot"), "AC_DC_Spot_datasheet.pdf");
    }

    #[test]
    fn test_write_to_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        std::fs::write(&path, b"stale").unwrap();
        let datasheet = GeneratedDatasheet {
            bytes: b"%PDF-1.7 fresh".to_vec(),
            filename: datasheet_filename("Regulus Alpha"),
            content_type: PDF_CONTENT_TYPE,
            part_code: "LY-DL-RUA".into(),
            total_price: Money::ZERO,
            page_count: Some(1),
        };
        datasheet.write_to(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7 fresh");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_pre_cancelled_request_stops_at_received() {
        let service = DatasheetService::builder().build();
        let request = ConfigurationRequest::from_json(
            r#"{"product_name":"Regulus Alpha","base_part_code":"LY-DL-RUA","variants":[]}"#,
        )
        .unwrap();
        let flag = CancellationFlag::new();
        flag.cancel();
        let err = service.generate_with_cancel(request, &flag).unwrap_err();
        assert!(matches!(err, DatasheetError::Cancelled(Stage::Received)));
    }

    #[test]
    fn test_custom_stylesheet_sets_page_size() {
        let mut stylesheet = Stylesheet::default();
        stylesheet.page.size = specsheet_style::PageSize::Letter;
        let service = DatasheetService::builder().with_stylesheet(stylesheet).build();
        let request = ConfigurationRequest::from_json(
            r#"{"product_name":"Regulus Alpha","base_part_code":"LY-DL-RUA","variants":[]}"#,
        )
        .unwrap();

        let datasheet = service.generate(request).unwrap();
        let doc = lopdf::Document::load_mem(&datasheet.bytes).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let media_box = doc.get_dictionary(page_id).unwrap().get(b"MediaBox").unwrap().as_array().unwrap();
        assert!((media_box[2].as_float().unwrap() - 612.0).abs() < 0.5);
        assert!((media_box[3].as_float().unwrap() - 792.0).abs() < 0.5);
    }
}
