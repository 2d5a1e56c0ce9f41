use clap::{Parser, ValueEnum};
use specsheet::{
    ConfigError, ConfigurationRequest, DatasheetError, DatasheetService, PriceQuote,
    ProductSelection, RenderBackend, ServiceConfig, ValidationError,
};
use specsheet_types::{AccessoryId, OptionId, ProductId, VariantId};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Backend {
    Lopdf,
    Command,
}

impl From<Backend> for RenderBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Lopdf => RenderBackend::Lopdf,
            Backend::Command => RenderBackend::Command,
        }
    }
}

/// Generates a product datasheet PDF from a configuration request or a catalog selection.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON configuration request
    #[arg(long, conflicts_with = "product")]
    request: Option<PathBuf>,

    /// Catalog product id, used instead of --request
    #[arg(long)]
    product: Option<i64>,

    #[arg(long, requires = "product")]
    variant: Option<i64>,

    /// Option id, repeatable
    #[arg(long = "option", requires = "product")]
    options: Vec<i64>,

    /// Accessory id, repeatable
    #[arg(long = "accessory", requires = "product")]
    accessories: Vec<i64>,

    /// JSON catalog snapshot
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file or directory. Defaults to `<product>_datasheet.pdf` in the current directory.
    #[arg(long, short)]
    output: Option<PathBuf>,

    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Print part code and price without rendering (selection mode only)
    #[arg(long, requires = "product")]
    quote: bool,

    /// Also write the composed layout tree as JSON
    #[arg(long)]
    dump_tree: Option<PathBuf>,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{} ({}): {}", .0.category().code(), .0.stage(), .0)]
    Datasheet(#[from] DatasheetError),

    #[error("Invalid request file: {0}")]
    Request(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write layout tree: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Either --request or --product is required")]
    NoInput,
}

fn output_path(requested: Option<&Path>, filename: &str) -> PathBuf {
    match requested {
        Some(path) if path.is_dir() => path.join(filename),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(filename),
    }
}

fn load_request(service: &DatasheetService, args: &Args) -> Result<ConfigurationRequest, CliError> {
    if let Some(path) = &args.request {
        log::info!("Loading request from {}", path.display());
        let payload = fs::read_to_string(path)?;
        return Ok(ConfigurationRequest::from_json(&payload)?);
    }
    let product = args.product.ok_or(CliError::NoInput)?;
    let selection = ProductSelection {
        product_id: ProductId::new(product),
        variant_id: args.variant.map(VariantId::new),
        option_ids: args.options.iter().copied().map(OptionId::new).collect(),
        accessory_ids: args.accessories.iter().copied().map(AccessoryId::new).collect(),
    };
    Ok(service.request_from_selection(&selection)?)
}

fn run(args: Args) -> Result<(), CliError> {
    let mut config = ServiceConfig::load(args.config.as_deref())?;
    if let Some(catalog) = &args.catalog {
        config.catalog.snapshot = Some(catalog.clone());
    }
    if let Some(backend) = args.backend {
        config.render.backend = backend.into();
    }
    let service = DatasheetService::from_config(&config)?;
    log::debug!(
        "Using catalog {} and renderer {}",
        service.catalog_name(),
        service.renderer_name()
    );

    let request = load_request(&service, &args)?;
    if args.quote {
        let quote = PriceQuote::for_request(&request);
        println!("{}\t{}", quote.part_code, quote.total_price);
        return Ok(());
    }
    let datasheet = match &args.dump_tree {
        Some(path) => {
            let (datasheet, tree) = service.generate_with_tree(request)?;
            fs::write(path, serde_json::to_vec_pretty(&tree)?)?;
            log::info!("Wrote layout tree to {}", path.display());
            datasheet
        }
        None => service.generate(request)?,
    };
    let path = output_path(args.output.as_deref(), &datasheet.filename);
    datasheet.write_to(&path)?;
    println!(
        "{} -> {} ({} pages, {} bytes, {})",
        datasheet.part_code,
        path.display(),
        datasheet.page_count.unwrap_or(0),
        datasheet.bytes.len(),
        datasheet.total_price
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
