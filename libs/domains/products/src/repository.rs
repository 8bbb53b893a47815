use async_trait::async_trait;
use domain_categories::{Category, CategoryRepository, InMemoryCategoryRepository};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductFilter, ProductInput, ProductSnapshot};

/// Repository trait for the product catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Products matching `filter`, ordered by id
    async fn list(&self, filter: ProductFilter) -> ProductResult<Vec<Product>>;

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>>;

    /// Batched lookup; unknown ids are skipped
    async fn find_by_ids(&self, ids: &[i32]) -> ProductResult<Vec<Product>>;

    /// Inserts the product and its category links atomically
    async fn create(&self, input: ProductInput) -> ProductResult<Product>;

    /// Replaces fields and category links atomically; `NotFound` when `id` is unknown
    async fn update(&self, id: i32, input: ProductInput) -> ProductResult<Product>;

    /// `false` when nothing was deleted
    async fn delete(&self, id: i32) -> ProductResult<bool>;
}

#[derive(Debug, Clone)]
struct StoredProduct {
    id: i32,
    name: String,
    price: i64,
    stock: i32,
    category_ids: Vec<i32>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i32,
    products: BTreeMap<i32, StoredProduct>,
}

/// In-memory catalog (for development/testing).
///
/// Category links resolve against the given category repository, so a
/// deleted category silently drops out of its products.
#[derive(Debug, Clone)]
pub struct InMemoryProductRepository {
    categories: InMemoryCategoryRepository,
    state: Arc<RwLock<State>>,
}

impl InMemoryProductRepository {
    pub fn new(categories: InMemoryCategoryRepository) -> Self {
        Self {
            categories,
            state: Arc::new(RwLock::new(State::default())),
        }
    }

    /// Checkout view of the given products, keyed by id.
    pub async fn snapshots(&self, ids: &[i32]) -> ProductResult<HashMap<i32, ProductSnapshot>> {
        let products = self.find_by_ids(ids).await?;
        Ok(products
            .iter()
            .map(|p| (p.id, ProductSnapshot::from(p)))
            .collect())
    }

    /// Applies every decrement in `demand` or none of them.
    pub async fn decrement_many(&self, demand: &BTreeMap<i32, i32>) -> ProductResult<()> {
        let mut state = self.state.write().await;

        for (&product_id, &requested) in demand {
            let product = state
                .products
                .get(&product_id)
                .ok_or(ProductError::NotFound(product_id))?;

            if product.stock < requested {
                return Err(ProductError::InsufficientStock {
                    product_id,
                    requested,
                    available: product.stock,
                });
            }
        }

        for (product_id, requested) in demand {
            if let Some(product) = state.products.get_mut(product_id) {
                product.stock -= requested;
            }
        }

        Ok(())
    }

    async fn ensure_categories_exist(&self, ids: &[i32]) -> ProductResult<()> {
        let mut missing = Vec::new();
        for &id in ids {
            if self.categories.get_by_id(id).await?.is_none() {
                missing.push(id);
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(unknown_categories(&missing))
        }
    }

    async fn hydrate(&self, stored: StoredProduct) -> ProductResult<Product> {
        let mut categories: Vec<Category> = Vec::with_capacity(stored.category_ids.len());
        for id in &stored.category_ids {
            if let Some(category) = self.categories.get_by_id(*id).await? {
                categories.push(category);
            }
        }
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(Product {
            id: stored.id,
            name: stored.name,
            price: stored.price,
            stock: stored.stock,
            categories,
        })
    }

    async fn hydrate_all(&self, stored: Vec<StoredProduct>) -> ProductResult<Vec<Product>> {
        let mut products = Vec::with_capacity(stored.len());
        for p in stored {
            products.push(self.hydrate(p).await?);
        }
        Ok(products)
    }
}

pub(crate) fn unknown_categories(ids: &[i32]) -> ProductError {
    let ids = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    ProductError::Validation(format!("Unknown category ids: {}", ids))
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        let ids = filter.ids()?;
        let name = filter.name().map(str::to_lowercase);

        let matching: Vec<StoredProduct> = {
            let state = self.state.read().await;
            state
                .products
                .values()
                .filter(|p| ids.as_ref().is_none_or(|ids| ids.contains(&p.id)))
                .filter(|p| {
                    name.as_ref()
                        .is_none_or(|n| p.name.to_lowercase().contains(n.as_str()))
                })
                .cloned()
                .collect()
        };

        self.hydrate_all(matching).await
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let stored = self.state.read().await.products.get(&id).cloned();
        match stored {
            Some(p) => Ok(Some(self.hydrate(p).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_ids(&self, ids: &[i32]) -> ProductResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.list(ProductFilter::by_ids(ids)).await
    }

    async fn create(&self, input: ProductInput) -> ProductResult<Product> {
        let category_ids = input.category_ids();
        self.ensure_categories_exist(&category_ids).await?;

        let stored = {
            let mut state = self.state.write().await;
            state.next_id += 1;

            let stored = StoredProduct {
                id: state.next_id,
                name: input.name,
                price: input.price,
                stock: input.stock,
                category_ids,
            };
            state.products.insert(stored.id, stored.clone());
            stored
        };

        tracing::info!(product_id = stored.id, "Created product");
        self.hydrate(stored).await
    }

    async fn update(&self, id: i32, input: ProductInput) -> ProductResult<Product> {
        let category_ids = input.category_ids();
        self.ensure_categories_exist(&category_ids).await?;

        let stored = {
            let mut state = self.state.write().await;
            let product = state
                .products
                .get_mut(&id)
                .ok_or(ProductError::NotFound(id))?;

            product.name = input.name;
            product.price = input.price;
            product.stock = input.stock;
            product.category_ids = category_ids;
            product.clone()
        };

        tracing::info!(product_id = id, "Updated product");
        self.hydrate(stored).await
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let mut state = self.state.write().await;

        if state.products.remove(&id).is_some() {
            tracing::info!(product_id = id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
