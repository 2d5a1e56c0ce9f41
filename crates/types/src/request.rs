//! The generation request and its identifier-only counterpart.

use crate::Money;
use crate::catalog::{
    Accessory, ConfigOption, ConfigurationCategory, Product, ProductFeature, Variant,
    VisualAssetBuckets,
};
use crate::ids::{AccessoryId, OptionId, ProductId, VariantId};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Raised when a request cannot enter the pipeline at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Malformed request: {0}")]
    Malformed(String),
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
}

/// A fully described configuration of one product, as submitted for a datasheet.
///
/// The request is never mutated by the pipeline. Enrichment produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationRequest {
    pub product_name: String,
    pub base_part_code: String,
    #[serde(default)]
    pub final_part_code: Option<String>,
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub selected_variant_id: Option<VariantId>,
    #[serde(default)]
    pub selected_variant_index: Option<usize>,
    /// Category name to the option chosen in it.
    #[serde(default)]
    pub selected_options: BTreeMap<String, SelectedOption>,
    #[serde(default)]
    pub accessories: Vec<Accessory>,
    #[serde(default)]
    pub visual_assets: Option<VisualAssetBuckets>,
    #[serde(default)]
    pub product: Option<Product>,
    /// Category metadata (part-code positions, display order). Optional in the payload.
    #[serde(default)]
    pub configuration_categories: Vec<ConfigurationCategory>,
    #[serde(default)]
    pub features: Vec<ProductFeature>,
}

impl ConfigurationRequest {
    /// Parses and validates a JSON payload.
    pub fn from_json(payload: &str) -> Result<Self, ValidationError> {
        let request: ConfigurationRequest =
            serde_json::from_str(payload).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    pub fn from_value(payload: serde_json::Value) -> Result<Self, ValidationError> {
        let request: ConfigurationRequest = serde_json::from_value(payload)
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    /// Checks the fields every later stage relies on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.product_name.trim().is_empty() {
            return Err(ValidationError::MissingField("product_name"));
        }
        if self.base_part_code.trim().is_empty() {
            return Err(ValidationError::MissingField("base_part_code"));
        }
        Ok(())
    }

    /// Looks up the selection for a category. Exact key first, then case-insensitive.
    pub fn selected_option(&self, category: &str) -> Option<&SelectedOption> {
        self.selected_options.get(category).or_else(|| {
            self.selected_options
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(category))
                .map(|(_, option)| option)
        })
    }

    /// The product identifier carried by the embedded product payload, if any.
    pub fn product_id(&self) -> Option<ProductId> {
        self.product.as_ref().map(|p| p.id)
    }

    pub fn has_embedded_assets(&self) -> bool {
        self.visual_assets.as_ref().is_some_and(|a| !a.is_empty())
    }

    pub fn final_part_code(&self) -> Option<&str> {
        self.final_part_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// The option chosen for one category.
///
/// Accepts either a full object or a bare label string in the payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectedOption {
    pub id: Option<OptionId>,
    pub option_value: String,
    pub option_label: String,
    pub part_code_suffix: String,
    pub price_modifier: Money,
    pub option_image_url: Option<String>,
}

impl SelectedOption {
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            option_label: label.into(),
            ..Default::default()
        }
    }

    /// The text shown on the datasheet: the label, else the raw value.
    pub fn display_value(&self) -> Option<&str> {
        [self.option_label.as_str(), self.option_value.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.display_value().is_none() && self.part_code_suffix.trim().is_empty()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.option_image_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

impl From<&ConfigOption> for SelectedOption {
    fn from(option: &ConfigOption) -> Self {
        Self {
            id: Some(option.id),
            option_value: option.option_value.clone(),
            option_label: option.option_label.clone(),
            part_code_suffix: option.part_code_suffix.clone(),
            price_modifier: option.price_modifier,
            option_image_url: option.option_image_url.clone(),
        }
    }
}

impl<'de> Deserialize<'de> for SelectedOption {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum SelectedOptionDef {
            Label(String),
            Full {
                #[serde(default)]
                id: Option<OptionId>,
                #[serde(default)]
                option_value: String,
                #[serde(default)]
                option_label: String,
                #[serde(default)]
                part_code_suffix: String,
                #[serde(default)]
                price_modifier: Money,
                #[serde(default, alias = "image_url")]
                option_image_url: Option<String>,
            },
        }

        Ok(match SelectedOptionDef::deserialize(deserializer)? {
            SelectedOptionDef::Label(label) => SelectedOption::labelled(label),
            SelectedOptionDef::Full {
                id,
                option_value,
                option_label,
                part_code_suffix,
                price_modifier,
                option_image_url,
            } => SelectedOption {
                id,
                option_value,
                option_label,
                part_code_suffix,
                price_modifier,
                option_image_url,
            },
        })
    }
}

/// A configuration expressed only through catalog identifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSelection {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    #[serde(default)]
    pub option_ids: Vec<OptionId>,
    #[serde(default)]
    pub accessory_ids: Vec<AccessoryId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> serde_json::Value {
        json!({
            "product_name": "Regulus Alpha",
            "base_part_code": "LY-DL-RUA",
            "variants": []
        })
    }

    #[test]
    fn test_minimal_request_parses() {
        let request = ConfigurationRequest::from_value(minimal()).unwrap();
        assert!(request.selected_options.is_empty());
        assert!(request.accessories.is_empty());
        assert!(!request.has_embedded_assets());
        assert_eq!(request.final_part_code(), None);
    }

    #[test]
    fn test_missing_top_level_field_is_malformed() {
        let err = ConfigurationRequest::from_value(json!({"product_name": "X"})).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));
    }

    #[test]
    fn test_blank_product_name_is_rejected() {
        let mut payload = minimal();
        payload["product_name"] = json!("   ");
        let err = ConfigurationRequest::from_value(payload).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("product_name"));
    }

    #[test]
    fn test_selected_option_accepts_label_or_object() {
        let mut payload = minimal();
        payload["selected_options"] = json!({
            "IP Rating": "IP44",
            "Beam Angle": {
                "id": 12,
                "option_label": "24°",
                "part_code_suffix": "24",
                "price_modifier": 2.5,
                "image_url": "https://cdn.example.com/beam-24.png"
            }
        });
        let request = ConfigurationRequest::from_value(payload).unwrap();

        let ip = request.selected_option("ip rating").unwrap();
        assert_eq!(ip.display_value(), Some("IP44"));
        assert!(ip.part_code_suffix.is_empty());

        let beam = request.selected_option("Beam Angle").unwrap();
        assert_eq!(beam.id, Some(OptionId(12)));
        assert_eq!(beam.price_modifier, Money::new(25, 1));
        assert_eq!(beam.image_url(), Some("https://cdn.example.com/beam-24.png"));
    }

    #[test]
    fn test_display_value_falls_back_to_option_value() {
        let option = SelectedOption {
            option_value: "3000K".into(),
            ..Default::default()
        };
        assert_eq!(option.display_value(), Some("3000K"));
        assert!(SelectedOption::default().is_empty());
    }
}
