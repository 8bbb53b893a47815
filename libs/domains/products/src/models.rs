use domain_categories::Category;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{ProductError, ProductResult};

/// A catalog product with its categories ordered by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i32,
    pub name: String,
    /// Unit price in minor currency units
    pub price: i64,
    pub stock: i32,
    pub categories: Vec<Category>,
}

/// Body of create and full-replacement update.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = 0))]
    pub price: i64,
    #[validate(range(min = 0))]
    pub stock: i32,
    /// Category ids; unknown ids are rejected
    #[serde(default)]
    pub categories: Vec<i32>,
}

impl ProductInput {
    /// Category ids without duplicates, ascending.
    pub fn category_ids(&self) -> Vec<i32> {
        let mut ids = self.categories.clone();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    /// Comma-separated product ids, e.g. `1,2,3`
    pub ids: Option<String>,
    /// Case-insensitive substring of the product name
    pub name: Option<String>,
}

impl ProductFilter {
    pub fn by_ids(ids: &[i32]) -> Self {
        Self {
            ids: Some(
                ids.iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            name: None,
        }
    }

    /// Parsed `ids`; `None` when no id filter was given.
    pub fn ids(&self) -> ProductResult<Option<Vec<i32>>> {
        let Some(raw) = self.ids.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<i32>()
                    .map_err(|_| ProductError::Validation(format!("Invalid product id in filter: {}", s)))
            })
            .collect::<ProductResult<Vec<_>>>()
            .map(Some)
    }

    /// Trimmed name filter, `None` when empty.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// The fields checkout reads from a product: frozen into transaction details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub id: i32,
    pub name: String,
    pub price: i64,
    pub stock: i32,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            stock: product.stock,
        }
    }
}
