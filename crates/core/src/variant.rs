use specsheet_types::{ConfigurationRequest, Money, Variant, VariantId};
use std::collections::BTreeMap;

/// Figures used when a request carries no variants at all.
pub const FALLBACK_OUTPUT: f64 = 945.0;
pub const FALLBACK_POWER: f64 = 9.0;
pub const FALLBACK_EFFICIENCY: f64 = 105.0;

/// The variant a document is rendered for.
///
/// Explicit id, then explicit index, then the first listed variant, then a
/// synthesized fallback. An id or index that matches nothing falls through.
pub fn resolve_variant(request: &ConfigurationRequest) -> Variant {
    select_variant(request)
        .cloned()
        .unwrap_or_else(fallback_variant)
}

/// Like [`resolve_variant`] but only among the listed variants.
pub fn select_variant(request: &ConfigurationRequest) -> Option<&Variant> {
    let variants = &request.variants;
    request
        .selected_variant_id
        .and_then(|id| variants.iter().find(|v| v.id == id))
        .or_else(|| {
            request
                .selected_variant_index
                .and_then(|index| variants.get(index))
        })
        .or_else(|| variants.first())
}

pub fn fallback_variant() -> Variant {
    Variant {
        id: VariantId::default(),
        product_id: None,
        name: "Standard".to_string(),
        part_code_suffix: String::new(),
        output: FALLBACK_OUTPUT,
        power: FALLBACK_POWER,
        efficiency: Some(FALLBACK_EFFICIENCY),
        specifications: BTreeMap::new(),
        price: Money::ZERO,
        display_order: 0,
    }
}

/// Lumens per watt: the stored figure, else computed, else zero for a zero-power variant.
pub fn efficiency(variant: &Variant) -> f64 {
    variant.efficiency.unwrap_or_else(|| {
        if variant.power > 0.0 {
            (variant.output / variant.power).round()
        } else {
            0.0
        }
    })
}
