//! Product and variation types.

use serde::{Deserialize, Serialize};

use crate::catalog::unit_price;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::Money;

/// A priced option of a product, e.g. a pack size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    /// Variation name (e.g., "25kg Bag").
    pub name: String,
    /// Signed amount added to the product's base price.
    pub price_modifier: Money,
}

impl Variation {
    /// Create a new variation.
    pub fn new(name: impl Into<String>, price_modifier: Money) -> Self {
        Self {
            name: name.into(),
            price_modifier,
        }
    }
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Image URL.
    pub image: String,
    /// Image alt text.
    pub image_alt: String,
    /// Short description for product cards.
    pub short_description: String,
    /// Full description for the product view.
    pub full_description: String,
    /// Base price before variation modifiers.
    pub price: Money,
    /// Category tag.
    pub category: String,
    /// Hint for image generation/search.
    #[serde(default)]
    pub data_ai_hint: String,
    /// Variations, in display order. Never empty for validated products.
    pub variations: Vec<Variation>,
}

impl Product {
    /// Look up a variation by name.
    pub fn variation(&self, name: &str) -> Option<&Variation> {
        self.variations.iter().find(|v| v.name == name)
    }

    /// Look up a variation by name, failing with `VariationNotFound`.
    pub fn require_variation(&self, name: &str) -> Result<&Variation, CommerceError> {
        self.variation(name)
            .ok_or_else(|| CommerceError::VariationNotFound {
                product_id: self.id.to_string(),
                variation: name.to_string(),
            })
    }

    /// The variation preselected when a product is opened.
    pub fn default_variation(&self) -> Option<&Variation> {
        self.variations.first()
    }

    /// Effective unit price of one of this product's variations.
    pub fn price_of(&self, variation: &Variation) -> Result<Money, CommerceError> {
        unit_price(self.price, variation.price_modifier)
    }
}

/// A product as submitted through the admin form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub image: String,
    pub image_alt: String,
    pub short_description: String,
    pub full_description: String,
    pub price: Money,
    pub category: String,
    pub data_ai_hint: String,
    pub variations: Vec<Variation>,
}

impl NewProduct {
    /// Check the product against the catalog rules.
    ///
    /// All problems are reported together.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let mut problems = Vec::new();

        let required = [
            ("name", &self.name),
            ("image alt text", &self.image_alt),
            ("short description", &self.short_description),
            ("full description", &self.full_description),
            ("category", &self.category),
            ("AI hint", &self.data_ai_hint),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                problems.push(format!("{} is required", field));
            }
        }

        if !is_http_url(&self.image) {
            problems.push("image must be a valid http(s) URL".to_string());
        }

        if !self.price.is_positive() {
            problems.push("price must be a positive number".to_string());
        }

        if self.variations.is_empty() {
            problems.push("at least one variation is required".to_string());
        }

        for (index, variation) in self.variations.iter().enumerate() {
            if variation.name.trim().is_empty() {
                problems.push(format!("variation {} needs a name", index + 1));
            }
            if let Err(e) = unit_price(self.price, variation.price_modifier) {
                problems.push(format!("variation '{}': {}", variation.name, e));
            }
        }

        let mut names: Vec<&str> = self.variations.iter().map(|v| v.name.as_str()).collect();
        names.sort_unstable();
        if names.windows(2).any(|w| w[0] == w[1]) {
            problems.push("variation names must be unique".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(CommerceError::Validation(problems.join("; ")))
        }
    }
}

fn is_http_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or("");
            !host.is_empty() && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn zmw(cents: i64) -> Money {
        Money::new(cents, Currency::ZMW)
    }

    fn mealie_meal() -> NewProduct {
        NewProduct {
            name: "Breakfast Mealie Meal".to_string(),
            image: "https://images.example.com/mealie.png".to_string(),
            image_alt: "A bag of mealie meal".to_string(),
            short_description: "Fine white maize meal".to_string(),
            full_description: "Roller-milled breakfast meal for nshima.".to_string(),
            price: zmw(18000),
            category: "Staples".to_string(),
            data_ai_hint: "maize bag".to_string(),
            variations: vec![
                Variation::new("25kg Bag", zmw(-2000)),
                Variation::new("50kg Bag", zmw(15000)),
            ],
        }
    }

    #[test]
    fn test_valid_product() {
        assert!(mealie_meal().validate().is_ok());
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let mut product = mealie_meal();
        product.name = " ".to_string();
        product.category = String::new();

        let err = product.validate().unwrap_err().to_string();
        assert!(err.contains("name is required"));
        assert!(err.contains("category is required"));
    }

    #[test]
    fn test_requires_variation() {
        let mut product = mealie_meal();
        product.variations.clear();
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let mut product = mealie_meal();
        product.price = zmw(0);
        product.variations = vec![Variation::new("Single", zmw(0))];
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_effective_price() {
        let mut product = mealie_meal();
        product.variations.push(Variation::new("Sample", zmw(-20000)));
        let err = product.validate().unwrap_err().to_string();
        assert!(err.contains("Sample"));
    }

    #[test]
    fn test_rejects_duplicate_variation_names() {
        let mut product = mealie_meal();
        product.variations.push(Variation::new("25kg Bag", zmw(0)));
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_image_url_check() {
        assert!(is_http_url("https://cdn.example.com/a.png"));
        assert!(is_http_url("http://localhost:8080/a.png"));
        assert!(!is_http_url("ftp://example.com/a.png"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("not a url"));
    }

    #[test]
    fn test_variation_lookup() {
        let new = mealie_meal();
        let product = Product {
            id: ProductId::new("7"),
            name: new.name,
            image: new.image,
            image_alt: new.image_alt,
            short_description: new.short_description,
            full_description: new.full_description,
            price: new.price,
            category: new.category,
            data_ai_hint: new.data_ai_hint,
            variations: new.variations,
        };

        let variation = product.require_variation("25kg Bag").unwrap();
        assert_eq!(product.price_of(variation).unwrap(), zmw(16000));
        assert_eq!(product.default_variation().map(|v| v.name.as_str()), Some("25kg Bag"));
        assert!(matches!(
            product.require_variation("1kg"),
            Err(CommerceError::VariationNotFound { .. })
        ));
    }
}
