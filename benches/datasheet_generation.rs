//! Datasheet generation benchmarks
//!
//! Measures composition alone and the full compose-and-render path, with and
//! without fetched images, for growing variant tables.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use image::{ImageFormat, Rgb, RgbImage};
use serde_json::{Value, json};
use specsheet::{ConfigurationRequest, DatasheetService, ExecutorImpl, InMemoryResourceProvider};
use std::hint::black_box;
use std::io::Cursor;
use std::sync::Arc;

const PRODUCT_IMAGE: &str = "https://cdn.example.com/bench/product.png";
const BEAM_IMAGE: &str = "https://cdn.example.com/bench/beam.png";

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    RgbImage::from_pixel(width, height, Rgb([180, 180, 180]))
        .write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode benchmark image");
    out.into_inner()
}

fn request(variant_count: usize) -> ConfigurationRequest {
    let variants: Vec<Value> = (1..=variant_count)
        .map(|i| {
            json!({
                "id": i, "name": format!("{}W", i * 3), "part_code_suffix": format!("{}W", i * 3),
                "output": i * 105, "power": i * 3, "base_price": format!("{}.00", 90 + i)
            })
        })
        .collect();
    ConfigurationRequest::from_value(json!({
        "product_name": "Bench Downlight",
        "base_part_code": "BN-DL",
        "variants": variants,
        "selected_options": {
            "Beam Angle": {"option_label": "36°", "part_code_suffix": "36", "option_image_url": BEAM_IMAGE},
            "Colour Temperature": {"option_label": "3000K", "part_code_suffix": "30K"}
        },
        "accessories": [{"id": 1, "name": "Recess Clip", "part_code": "ACC-CLIP", "price": "4.50"}],
        "product": {"id": 1, "name": "Bench Downlight", "base_part_code": "BN-DL", "product_image_url": PRODUCT_IMAGE}
    }))
    .expect("Failed to build benchmark request")
}

fn service(with_images: bool) -> DatasheetService {
    let provider = if with_images {
        InMemoryResourceProvider::new()
            .with(PRODUCT_IMAGE, png(600, 450))
            .with(BEAM_IMAGE, png(800, 400))
    } else {
        InMemoryResourceProvider::new()
    };
    DatasheetService::builder()
        .with_resource_provider(Arc::new(provider))
        .with_executor(ExecutorImpl::bounded(4))
        .build()
}

fn benchmark_composition(c: &mut Criterion) {
    let mut group = c.benchmark_group("composition");
    let service = service(false);

    for variant_count in [1, 10, 40] {
        let request = request(variant_count);
        group.bench_with_input(
            BenchmarkId::from_parameter(variant_count),
            &request,
            |b, request| b.iter(|| black_box(service.compose(request).expect("compose failed"))),
        );
    }
    group.finish();
}

fn benchmark_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation");
    group.sample_size(20);

    for (label, with_images) in [("text_only", false), ("with_images", true)] {
        let service = service(with_images);
        for variant_count in [1, 10] {
            let request = request(variant_count);
            group.bench_with_input(
                BenchmarkId::new(label, variant_count),
                &request,
                |b, request| {
                    b.iter(|| {
                        let datasheet = service.generate(request.clone()).expect("generation failed");
                        black_box(datasheet.bytes.len())
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, benchmark_composition, benchmark_generation);
criterion_main!(benches);
