use serde::{Deserialize, Serialize};

/// Brand content and placeholder copy printed on every datasheet.
///
/// Injected at construction; the composer never inlines these literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultAssets {
    pub brand_name: String,
    pub brand_tagline: String,
    pub category_badge: String,
    /// Replaces the brand text block in the header when it loads.
    pub logo_url: Option<String>,
    /// Replaces the brand text in the footer when it loads.
    pub footer_logo_url: Option<String>,
    pub legal_text: String,
    pub website: String,
    /// Badges shown when a product has no certification assets.
    pub fallback_certifications: Vec<String>,
    pub product_caption: String,
    pub product_placeholder: Vec<String>,
    pub dimension_placeholder: Vec<String>,
    pub light_distribution_placeholder: Vec<String>,
    pub performance_data: Vec<String>,
    pub rated_life: String,
    pub operating_temperature: String,
}

impl Default for DefaultAssets {
    fn default() -> Self {
        Self {
            brand_name: "LYLUX".into(),
            brand_tagline: "LIGHTING YOUR FUTURE".into(),
            category_badge: "DOWNLIGHT".into(),
            logo_url: None,
            footer_logo_url: None,
            legal_text: "All rights reserved Lylux 2024".into(),
            website: "www.lylux-group.com".into(),
            fallback_certifications: vec!["CE".into(), "RoHS".into()],
            product_caption: "High-efficiency LED downlight".into(),
            product_placeholder: vec![
                "High-efficiency LED downlight".into(),
                "Premium aluminium construction".into(),
                "Advanced thermal management".into(),
                "Multiple beam options available".into(),
            ],
            dimension_placeholder: vec!["[Technical drawing]".into(), "Compact profile design".into()],
            light_distribution_placeholder: vec![
                "Photometric data available".into(),
                "Beam characteristics optimized".into(),
                "IES files available on request".into(),
            ],
            performance_data: vec![
                "1m: 2,500 lx | Ø0.35m".into(),
                "2m: 625 lx | Ø0.70m".into(),
                "3m: 278 lx | Ø1.05m".into(),
            ],
            rated_life: "50,000 Hrs".into(),
            operating_temperature: "-20°C to 50°C".into(),
        }
    }
}

/// Layout knobs that are not styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Accessories beyond this count drop the whole section.
    pub accessory_budget: usize,
    pub certification_image_limit: usize,
    /// Shown for variants without a `tunable_range` specification.
    pub tunable_range: String,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            accessory_budget: 3,
            certification_image_limit: 4,
            tunable_range: "1800K~6000K".into(),
        }
    }
}
