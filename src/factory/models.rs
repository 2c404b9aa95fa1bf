use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Allowed box sizes. Payload validation is an exact lowercase match,
/// mirroring the frontend form patterns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Small,
    Medium,
    Big,
    Large,
}

impl Size {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Big => "big",
            Self::Large => "large",
        }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "big" => Ok(Self::Big),
            "large" => Ok(Self::Large),
            _ => Err(format!("Invalid size: {}", s)),
        }
    }
}

/// Allowed box materials.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    Paper,
    Plastic,
    Metal,
    Wood,
}

impl Material {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paper => "paper",
            Self::Plastic => "plastic",
            Self::Metal => "metal",
            Self::Wood => "wood",
        }
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Material {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paper" => Ok(Self::Paper),
            "plastic" => Ok(Self::Plastic),
            "metal" => Ok(Self::Metal),
            "wood" => Ok(Self::Wood),
            _ => Err(format!("Invalid material: {}", s)),
        }
    }
}

/// Allowed box colors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Clear,
    Red,
    Blue,
    Green,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clear" => Ok(Self::Clear),
            "red" => Ok(Self::Red),
            "blue" => Ok(Self::Blue),
            "green" => Ok(Self::Green),
            _ => Err(format!("Invalid color: {}", s)),
        }
    }
}

/// A stored box, as returned by the API.
///
/// The text columns stay plain strings: rows seeded directly into the table
/// bypass payload validation and may carry values (or casing) outside the
/// enum sets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct BoxRecord {
    pub id: i32,
    pub size: String,
    pub weight: f64,
    pub price: f64,
    pub material: String,
    pub color: String,
    pub quantity: i32,
}

impl BoxRecord {
    /// Case-insensitive substring match against size, material, and color.
    /// An empty term matches everything.
    pub fn matches(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        [&self.size, &self.material, &self.color]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Wire shape of a create/update request: every field required, id server-assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxPayload {
    pub size: String,
    pub weight: f64,
    pub price: f64,
    pub material: String,
    pub color: String,
    pub quantity: i32,
}

impl BoxPayload {
    /// Validate the enum-like fields, producing a typed draft ready to store.
    pub fn validate(&self) -> Result<BoxDraft, String> {
        Ok(BoxDraft {
            size: Size::from_str(&self.size)?,
            weight: self.weight,
            price: self.price,
            material: Material::from_str(&self.material)?,
            color: Color::from_str(&self.color)?,
            quantity: self.quantity,
        })
    }
}

/// A validated box awaiting an id from the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxDraft {
    pub size: Size,
    pub weight: f64,
    pub price: f64,
    pub material: Material,
    pub color: Color,
    pub quantity: i32,
}

impl BoxDraft {
    pub fn into_record(self, id: i32) -> BoxRecord {
        BoxRecord {
            id,
            size: self.size.as_str().to_string(),
            weight: self.weight,
            price: self.price,
            material: self.material.as_str().to_string(),
            color: self.color.as_str().to_string(),
            quantity: self.quantity,
        }
    }
}
