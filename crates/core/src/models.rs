use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryTag {
    Mercado,
    Farmacia,
    Beleza,
    Other(String),
}

impl CategoryTag {
    pub fn as_tag(&self) -> &str {
        match self {
            CategoryTag::Mercado => "mercado",
            CategoryTag::Farmacia => "farmacia",
            CategoryTag::Beleza => "beleza",
            CategoryTag::Other(tag) => tag,
        }
    }

    /// Phrase used inside the prompt. Unknown tags pass through verbatim.
    pub fn display_phrase(&self) -> &str {
        match self {
            CategoryTag::Mercado => "Mercado/Supermercado",
            CategoryTag::Farmacia => "Farmácia/Drogaria",
            CategoryTag::Beleza => "Barbearia/Salão de Beleza",
            CategoryTag::Other(tag) => tag,
        }
    }
}

impl FromStr for CategoryTag {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value {
            "mercado" => CategoryTag::Mercado,
            "farmacia" => CategoryTag::Farmacia,
            "beleza" => CategoryTag::Beleza,
            other => CategoryTag::Other(other.to_string()),
        })
    }
}

impl From<String> for CategoryTag {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(tag) => tag,
            Err(never) => match never {},
        }
    }
}

impl From<CategoryTag> for String {
    fn from(value: CategoryTag) -> Self {
        value.as_tag().to_string()
    }
}

impl fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Radius {
    #[serde(rename = "1km")]
    OneKm,
    #[serde(rename = "5km")]
    FiveKm,
    #[serde(rename = "10km")]
    TenKm,
    #[default]
    #[serde(rename = "any")]
    Any,
}

impl Radius {
    pub fn as_tag(self) -> &'static str {
        match self {
            Radius::OneKm => "1km",
            Radius::FiveKm => "5km",
            Radius::TenKm => "10km",
            Radius::Any => "any",
        }
    }

    pub fn is_bounded(self) -> bool {
        self != Radius::Any
    }
}

impl FromStr for Radius {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "1km" => Ok(Radius::OneKm),
            "5km" => Ok(Radius::FiveKm),
            "10km" => Ok(Radius::TenKm),
            "any" => Ok(Radius::Any),
            other => Err(format!(
                "unsupported radius '{other}' (expected 1km, 5km, 10km or any)"
            )),
        }
    }
}

impl fmt::Display for Radius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    pub categories: Vec<CategoryTag>,
    pub radius: Radius,
}

impl SearchFilters {
    /// Duplicate tags are dropped, first selection order is kept.
    pub fn new(categories: impl IntoIterator<Item = CategoryTag>, radius: Radius) -> Self {
        let mut unique: Vec<CategoryTag> = Vec::new();
        for tag in categories {
            if !unique.contains(&tag) {
                unique.push(tag);
            }
        }

        Self {
            categories: unique,
            radius,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceReference {
    pub title: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub text: String,
    pub places: Vec<PlaceReference>,
}
