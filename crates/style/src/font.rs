use serde::{Deserialize, Deserializer, Serialize, de};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

impl FontWeight {
    pub fn is_bold(self) -> bool {
        self == FontWeight::Bold
    }

    /// Parse a font weight from a string (e.g., "bold", "700")
    fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "regular" | "normal" => Ok(FontWeight::Regular),
            "bold" => Ok(FontWeight::Bold),
            other => other
                .parse::<u16>()
                .map(Self::from_numeric)
                .map_err(|_| format!("Invalid font weight: '{}'", s)),
        }
    }

    /// Only two weights exist in the base-14 Helvetica family; 600 and up is bold.
    fn from_numeric(weight: u16) -> Self {
        if weight >= 600 {
            FontWeight::Bold
        } else {
            FontWeight::Regular
        }
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum FontWeightDef {
            Str(String),
            Num(u16),
        }

        match FontWeightDef::deserialize(deserializer)? {
            FontWeightDef::Str(s) => Self::parse(&s).map_err(de::Error::custom),
            FontWeightDef::Num(n) => Ok(Self::from_numeric(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_parses_names_and_numbers() {
        let w: FontWeight = serde_json::from_str("\"bold\"").unwrap();
        assert_eq!(w, FontWeight::Bold);
        let w: FontWeight = serde_json::from_str("400").unwrap();
        assert_eq!(w, FontWeight::Regular);
        let w: FontWeight = serde_json::from_str("\"700\"").unwrap();
        assert!(w.is_bold());
        assert!(serde_json::from_str::<FontWeight>("\"heavy\"").is_err());
    }
}
