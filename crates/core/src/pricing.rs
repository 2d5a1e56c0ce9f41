//! Part codes and prices.

use crate::variant::resolve_variant;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;
use specsheet_types::{ConfigurationCategory, ConfigurationRequest, Money, SelectedOption, Variant};

/// The selection a category contributes to the part code, looked up by
/// category name and then by label.
fn selection_for<'a>(
    request: &'a ConfigurationRequest,
    category: &ConfigurationCategory,
) -> Option<&'a SelectedOption> {
    request
        .selected_option(&category.category_name)
        .or_else(|| request.selected_option(category.label()))
}

/// Assembles `base-variant-s1-s2-...`.
///
/// Only required categories with a positive `part_code_position` and a
/// selection carrying a non-empty suffix contribute, in ascending position.
/// Empty segments are skipped so a blank variant suffix never yields `--`.
pub fn part_code(
    base: &str,
    variant_suffix: &str,
    categories: &[ConfigurationCategory],
    request: &ConfigurationRequest,
) -> String {
    let option_suffixes = categories
        .iter()
        .filter(|c| c.is_required && c.part_code_position > 0)
        .sorted_by_key(|c| c.part_code_position)
        .filter_map(|c| selection_for(request, c))
        .map(|o| o.part_code_suffix.trim())
        .filter(|s| !s.is_empty());

    [base.trim(), variant_suffix.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .chain(option_suffixes)
        .join("-")
}

/// The code shown in the title panel for the resolved variant.
///
/// With category metadata the code is assembled. Without it the request's own
/// `final_part_code` is trusted, else base and variant suffix.
pub fn display_part_code(request: &ConfigurationRequest, variant: &Variant) -> String {
    if request.configuration_categories.is_empty()
        && let Some(code) = request.final_part_code()
    {
        return code.to_string();
    }
    variant_part_code(request, variant)
}

/// The code a given variant would have with the request's current selections.
pub fn variant_part_code(request: &ConfigurationRequest, variant: &Variant) -> String {
    part_code(
        &request.base_part_code,
        &variant.part_code_suffix,
        &request.configuration_categories,
        request,
    )
}

/// `base + Σ option modifiers + Σ accessory prices`, rounded to cents.
pub fn compute_price(
    base: Money,
    option_modifiers: impl IntoIterator<Item = Money>,
    accessory_prices: impl IntoIterator<Item = Money>,
) -> Money {
    let total: Decimal = option_modifiers
        .into_iter()
        .chain(accessory_prices)
        .fold(base, |acc, price| acc + price);
    total.round_dp(2)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub part_code: String,
    pub total_price: Money,
}

impl PriceQuote {
    pub fn for_request(request: &ConfigurationRequest) -> Self {
        let variant = resolve_variant(request);
        let total_price = compute_price(
            variant.price,
            request.selected_options.values().map(|o| o.price_modifier),
            request.accessories.iter().map(|a| a.price),
        );
        Self {
            part_code: display_part_code(request, &variant),
            total_price,
        }
    }
}
