//! Merchandise
//!
//! Catalog-supplied view models. These are opaque inputs handed to the cart
//! at add time; the cart copies them onto its lines and never queries the
//! catalog itself.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A selected product option on a variant, e.g. `Size: M`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

impl SelectedOption {
    /// Creates a new name/value option pair.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        SelectedOption {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A product's featured image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    pub alt_text: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// The product fields denormalized onto a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub featured_image: Option<ProductImage>,
}

/// A purchasable unit of a product, identified independently of its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub title: String,
    pub selected_options: Vec<SelectedOption>,
    pub price: Money,
}

/// The merchandise snapshot stored on a cart line: the variant fields plus
/// the parent product summary, keyed by the variant id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merchandise {
    pub id: String,
    pub title: String,
    pub selected_options: Vec<SelectedOption>,
    pub product: ProductSummary,
}
