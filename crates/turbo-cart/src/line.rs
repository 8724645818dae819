//! Cart line and product candidate types.

use serde::{Deserialize, Serialize};

use crate::error::CartError;
use crate::ids::ProductId;

/// Product data offered to the cart, already resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCandidate {
    /// Product identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Display image.
    pub image_url: String,
    /// Price of a single unit. Carried, never recomputed.
    pub unit_price: f64,
}

impl ProductCandidate {
    /// Create a candidate.
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        unit_price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            unit_price,
        }
    }

    /// Reject blank ids and negative or non-finite prices.
    pub fn validate(&self) -> Result<(), CartError> {
        self.id.validate()?;
        validate_price(&self.id, self.unit_price)
    }
}

/// One entry in the cart. `quantity` is at least 1 while the line exists.
///
/// Written with `imageUrl` and `unitPrice`. On read the legacy names
/// `image_url` and `price` are also accepted; when both spellings are present
/// the camelCase one wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredLine")]
pub struct CartLine {
    /// Product identifier, unique within the cart.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Display image.
    pub image_url: String,
    /// Price of a single unit.
    pub unit_price: f64,
    /// Number of units.
    pub quantity: u32,
}

/// A line as found in a stored snapshot, current and legacy names side by side.
#[derive(Deserialize)]
struct StoredLine {
    id: ProductId,
    title: String,
    #[serde(rename = "imageUrl")]
    image_url: Option<String>,
    #[serde(rename = "image_url")]
    legacy_image_url: Option<String>,
    #[serde(rename = "unitPrice")]
    unit_price: Option<f64>,
    #[serde(rename = "price")]
    legacy_price: Option<f64>,
    quantity: u32,
}

impl TryFrom<StoredLine> for CartLine {
    type Error = String;

    fn try_from(raw: StoredLine) -> Result<Self, Self::Error> {
        let image_url = raw
            .image_url
            .or(raw.legacy_image_url)
            .ok_or_else(|| format!("line {} is missing imageUrl", raw.id))?;
        let unit_price = raw
            .unit_price
            .or(raw.legacy_price)
            .ok_or_else(|| format!("line {} is missing unitPrice", raw.id))?;

        Ok(Self {
            id: raw.id,
            title: raw.title,
            image_url,
            unit_price,
            quantity: raw.quantity,
        })
    }
}

impl CartLine {
    /// A fresh line for `candidate` with quantity 1.
    pub fn from_candidate(candidate: ProductCandidate) -> Self {
        Self {
            id: candidate.id,
            title: candidate.title,
            image_url: candidate.image_url,
            unit_price: candidate.unit_price,
            quantity: 1,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), CartError> {
        self.id.validate()?;
        validate_price(&self.id, self.unit_price)?;
        if self.quantity == 0 {
            return Err(CartError::InvalidArgument(format!(
                "line {} has zero quantity",
                self.id
            )));
        }
        Ok(())
    }
}

fn validate_price(id: &ProductId, price: f64) -> Result<(), CartError> {
    if !price.is_finite() || price < 0.0 {
        return Err(CartError::InvalidArgument(format!(
            "unit price for {} must be a non-negative number, got {}",
            id, price
        )));
    }
    Ok(())
}
