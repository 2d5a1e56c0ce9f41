mod common;

use common::fixtures::{self, BEAM_IMAGE, CLIP_IMAGE};
use common::{TestResult, count_class};
use itertools::Itertools;
use serde_json::json;
use specsheet::{ConfigurationRequest, PriceQuote};
use specsheet_idf::SectionKind;

fn with_accessories(count: usize) -> TestResult<ConfigurationRequest> {
    let mut payload = fixtures::request_json();
    payload["accessories"] = (1..=count)
        .map(|i| json!({"id": i, "name": format!("Accessory {i}"), "part_code": format!("ACC-{i}"), "price": "1.25"}))
        .collect();
    Ok(ConfigurationRequest::from_value(payload)?)
}

#[test]
fn test_sections_follow_document_order() -> TestResult {
    let service = fixtures::service();
    let tree = service.compose(&fixtures::request())?;
    assert_eq!(tree.kinds(), SectionKind::ORDER.to_vec());

    let bare = service.compose(&fixtures::bare_request())?;
    assert_eq!(bare.kinds(), SectionKind::ORDER.to_vec());
    assert!(bare.section_text(SectionKind::CustomizableSpecifications).contains("No customizations selected"));
    assert!(bare.section_text(SectionKind::Accessories).contains("None selected"));
    Ok(())
}

#[test]
fn test_one_customization_entry_per_selected_option() -> TestResult {
    let service = fixtures::service();
    let request = fixtures::request();
    let tree = service.compose(&request)?;

    let section = tree.section(SectionKind::CustomizableSpecifications).ok_or("missing section")?;
    assert_eq!(count_class(section, "option-item"), request.selected_options.len());

    // Colour Temperature has the lower display order.
    let text = tree.section_text(SectionKind::CustomizableSpecifications);
    let cct = text.find("Colour Temperature").ok_or("no CCT entry")?;
    let beam = text.find("Beam Angle").ok_or("no beam entry")?;
    assert!(cct < beam, "{text}");
    Ok(())
}

#[test]
fn test_selected_variant_row_is_highlighted() -> TestResult {
    let tree = fixtures::service().compose(&fixtures::request())?;
    let specs = tree.section(SectionKind::Specifications).ok_or("missing section")?;
    assert_eq!(count_class(specs, "row-selected"), 1);

    let text = tree.section_text(SectionKind::Specifications);
    assert!(text.contains("LY-DL-RUA-9W-36-30K"));
    assert!(text.contains("LY-DL-RUA-12W-36-30K"));
    assert!(text.contains("2700K~4000K"));
    Ok(())
}

#[test]
fn test_accessory_budget() -> TestResult {
    let service = fixtures::service();

    let three = service.compose(&with_accessories(3)?)?;
    let listed = three.section_text(SectionKind::Accessories);
    assert!(listed.contains("AVAILABLE ACCESSORIES"));
    assert!(listed.contains("Accessory 3"));
    assert!(listed.contains("Part: ACC-1"));

    let five = service.compose(&with_accessories(5)?)?;
    assert!(!five.has_section(SectionKind::Accessories));
    assert!(five.has_section(SectionKind::Certifications));
    Ok(())
}

#[test]
fn test_images_are_scaled_into_their_boxes() -> TestResult {
    let tree = fixtures::service().compose(&fixtures::request())?;
    let images = tree.images();

    let beam = images
        .iter()
        .find(|image| image.src == BEAM_IMAGE)
        .ok_or("beam image not embedded")?;
    // 800x400 px into the 80x50 mm light distribution box
    assert!((beam.size.width - 80.0).abs() < 0.01, "{:?}", beam.size);
    assert!((beam.size.height - 40.0).abs() < 0.01, "{:?}", beam.size);

    for image in &images {
        assert!(image.size.width > 0.0 && image.size.height > 0.0, "{}", image.src);
    }
    assert!(images.iter().any(|image| image.src == CLIP_IMAGE));
    Ok(())
}

#[test]
fn test_price_ignores_accessory_order() -> TestResult {
    let base = with_accessories(3)?;
    let expected = PriceQuote::for_request(&base);
    // 135.00 + 5.00 beam + 3 x 1.25
    assert_eq!(expected.total_price.to_string(), "143.75");

    for order in base.accessories.iter().cloned().permutations(3) {
        let mut permuted = base.clone();
        permuted.accessories = order;
        let quote = PriceQuote::for_request(&permuted);
        assert_eq!(quote.total_price, expected.total_price);
        assert_eq!(quote.part_code, expected.part_code);
    }
    Ok(())
}

#[test]
fn test_compose_dump_is_stable_json() -> TestResult {
    let service = fixtures::service();
    let request = fixtures::request();
    let first = serde_json::to_string(&service.compose(&request)?)?;
    let second = serde_json::to_string(&service.compose(&request)?)?;
    assert_eq!(first, second);
    assert!(first.contains("\"kind\":\"customizable-specifications\""));
    Ok(())
}
