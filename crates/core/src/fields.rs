//! Resolution of every datasheet field to a concrete display value.
//!
//! Each field walks a fixed chain and stops at the first source that yields a
//! value: the selected option of the field's category, then the product
//! features (material only), then the final part code (SDCM only), then the
//! static default from [`FieldDefaults`]. Nothing here can fail.

use crate::variant::resolve_variant;
use regex::Regex;
use serde::{Deserialize, Serialize};
use specsheet_types::{ConfigurationRequest, ProductFeature, Variant};
use std::sync::LazyLock;

static SDCM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SDCM(\d+)").expect("BUG: invalid SDCM_RE regex literal"));

/// Share of LED output that survives optics and driver losses.
pub const SYSTEM_OUTPUT_FACTOR: f64 = 0.85;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldSource {
    SelectedOption,
    Feature,
    PartCode,
    Variant,
    Derived,
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved<T> {
    pub value: T,
    pub source: FieldSource,
}

impl<T> Resolved<T> {
    fn new(value: T, source: FieldSource) -> Self {
        Self { value, source }
    }

    pub fn is_default(&self) -> bool {
        self.source == FieldSource::Default
    }
}

/// Physical dimensions in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    pub diameter: f64,
    pub cut_out: f64,
    pub height: f64,
    pub recess_depth: f64,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            diameter: 50.0,
            cut_out: 50.0,
            height: 55.0,
            recess_depth: 50.0,
        }
    }
}

/// Static last-resort values, one per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDefaults {
    pub material: String,
    pub finish: String,
    pub housing_colour: String,
    pub reflector_colour: String,
    pub ip_rating: String,
    pub cct: String,
    pub cri: String,
    pub beam_angle: String,
    pub sdcm: String,
    pub driver: String,
    pub dimensions: Dimensions,
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            material: "Aluminium".into(),
            finish: "Matt White".into(),
            housing_colour: "White".into(),
            reflector_colour: "Silver".into(),
            ip_rating: "IP20".into(),
            cct: "2700K".into(),
            cri: "90".into(),
            beam_angle: "30°".into(),
            sdcm: "3".into(),
            driver: "On/Off".into(),
            dimensions: Dimensions::default(),
        }
    }
}

/// Category names under which each option-backed field may be selected.
pub mod category {
    pub const MATERIAL: &[&str] = &["Material", "Housing Material"];
    pub const FINISH: &[&str] = &["Finish", "Colour Finish", "Color Finish"];
    pub const HOUSING_COLOUR: &[&str] = &["Housing Colour", "Housing Color"];
    pub const REFLECTOR_COLOUR: &[&str] = &["Reflector Colour", "Reflector Color", "Reflector"];
    pub const IP_RATING: &[&str] = &["IP Rating", "IP"];
    pub const CCT: &[&str] = &["Colour Temperature", "Color Temperature", "CCT"];
    pub const CRI: &[&str] = &["CRI", "Colour Rendering"];
    pub const BEAM_ANGLE: &[&str] = &["Beam Angle"];
    pub const SDCM: &[&str] = &["SDCM", "Colour Consistency"];
    pub const DRIVER: &[&str] = &["Driver", "Control Type", "Dimming"];
}

/// Every field the composer prints, each with a concrete value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedFields {
    pub material: Resolved<String>,
    pub finish: Resolved<String>,
    pub housing_colour: Resolved<String>,
    pub reflector_colour: Resolved<String>,
    pub ip_rating: Resolved<String>,
    pub cct: Resolved<String>,
    pub cri: Resolved<String>,
    pub beam_angle: Resolved<String>,
    pub sdcm: Resolved<String>,
    pub driver: Resolved<String>,
    /// Watts.
    pub led_power: Resolved<f64>,
    pub system_power: Resolved<f64>,
    /// Lumens.
    pub led_output: Resolved<f64>,
    pub system_output: Resolved<f64>,
    pub dimensions: Resolved<Dimensions>,
}

impl ResolvedFields {
    /// Label/value pairs in datasheet order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let d = &self.dimensions.value;
        vec![
            ("Material", self.material.value.clone()),
            ("Finish", self.finish.value.clone()),
            ("Housing Colour", self.housing_colour.value.clone()),
            ("Reflector Colour", self.reflector_colour.value.clone()),
            ("IP Rating", self.ip_rating.value.clone()),
            ("CCT", self.cct.value.clone()),
            ("CRI", format!("Ra>{}", self.cri.value)),
            ("Beam Angle", self.beam_angle.value.clone()),
            ("SDCM", format!("<{}", self.sdcm.value)),
            ("Driver", self.driver.value.clone()),
            ("LED Power", format!("{} W", number(self.led_power.value))),
            ("System Power", format!("{} W", number(self.system_power.value))),
            ("LED Output", format!("{} lm", number(self.led_output.value))),
            ("System Output", format!("{} lm", number(self.system_output.value))),
            ("Diameter", format!("{} mm", number(d.diameter))),
            ("Cut-out", format!("{} mm", number(d.cut_out))),
            ("Height", format!("{} mm", number(d.height))),
            ("Recess Depth", format!("{} mm", number(d.recess_depth))),
        ]
    }
}

/// Formats a figure without a trailing `.0` for whole numbers.
pub fn number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Default)]
pub struct FieldResolver {
    defaults: FieldDefaults,
}

impl FieldResolver {
    pub fn new(defaults: FieldDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &FieldDefaults {
        &self.defaults
    }

    pub fn resolve(&self, request: &ConfigurationRequest) -> ResolvedFields {
        let variant = resolve_variant(request);
        self.resolve_with_variant(request, &variant)
    }

    pub fn resolve_with_variant(
        &self,
        request: &ConfigurationRequest,
        variant: &Variant,
    ) -> ResolvedFields {
        let d = &self.defaults;
        let option_or = |names: &[&str], default: &str| {
            selected(request, names)
                .map(|v| Resolved::new(v, FieldSource::SelectedOption))
                .unwrap_or_else(|| Resolved::new(default.to_string(), FieldSource::Default))
        };

        let material = selected(request, category::MATERIAL)
            .map(|v| Resolved::new(v, FieldSource::SelectedOption))
            .or_else(|| material_feature(&request.features).map(|v| Resolved::new(v, FieldSource::Feature)))
            .unwrap_or_else(|| Resolved::new(d.material.clone(), FieldSource::Default));

        let sdcm = selected(request, category::SDCM)
            .map(|v| Resolved::new(v, FieldSource::SelectedOption))
            .or_else(|| {
                request
                    .final_part_code()
                    .and_then(sdcm_from_part_code)
                    .map(|v| Resolved::new(v, FieldSource::PartCode))
            })
            .unwrap_or_else(|| Resolved::new(d.sdcm.clone(), FieldSource::Default));

        let led_output = Resolved::new(variant.output, FieldSource::Variant);
        let system_output = match variant.spec_number("system_output") {
            Some(value) => Resolved::new(value, FieldSource::Variant),
            None => Resolved::new(round2(variant.output * SYSTEM_OUTPUT_FACTOR), FieldSource::Derived),
        };
        let led_power = Resolved::new(variant.power, FieldSource::Variant);
        let system_power = Resolved::new(
            variant.spec_number("system_power").unwrap_or(variant.power),
            FieldSource::Variant,
        );

        ResolvedFields {
            material,
            finish: option_or(category::FINISH, &d.finish),
            housing_colour: option_or(category::HOUSING_COLOUR, &d.housing_colour),
            reflector_colour: option_or(category::REFLECTOR_COLOUR, &d.reflector_colour),
            ip_rating: option_or(category::IP_RATING, &d.ip_rating),
            cct: option_or(category::CCT, &d.cct),
            cri: option_or(category::CRI, &d.cri),
            beam_angle: option_or(category::BEAM_ANGLE, &d.beam_angle),
            sdcm,
            driver: option_or(category::DRIVER, &d.driver),
            led_power,
            system_power,
            led_output,
            system_output,
            dimensions: Resolved::new(d.dimensions, FieldSource::Default),
        }
    }
}

fn selected(request: &ConfigurationRequest, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| request.selected_option(name))
        .find_map(|option| option.display_value().map(str::to_string))
}

/// First feature whose label or type mentions "material", in list order.
pub fn material_feature(features: &[ProductFeature]) -> Option<String> {
    features
        .iter()
        .find(|f| {
            f.feature_label.to_lowercase().contains("material")
                || f.feature_type.to_lowercase().contains("material")
        })
        .map(|f| f.feature_value.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Digits following the first `SDCM` in a part code.
pub fn sdcm_from_part_code(code: &str) -> Option<String> {
    SDCM_RE
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
