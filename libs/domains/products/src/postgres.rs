use async_trait::async_trait;
use database::BaseRepository;
use domain_categories::{Category, entity as category};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::{Expr, ExprTrait, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use std::collections::{BTreeSet, HashMap};

use crate::{
    entity::{product, product_category},
    error::{ProductError, ProductResult},
    models::{Product, ProductFilter, ProductInput},
    repository::{ProductRepository, unknown_categories},
};

#[derive(Clone)]
pub struct PgProductRepository {
    base: BaseRepository<product::Entity>,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Attaches categories with two queries regardless of how many products there are.
    async fn with_categories<C: ConnectionTrait>(
        conn: &C,
        models: Vec<product::Model>,
    ) -> ProductResult<Vec<Product>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let links = product_category::Entity::find()
            .filter(product_category::Column::ProductId.is_in(product_ids))
            .all(conn)
            .await?;

        let category_ids: BTreeSet<i32> = links.iter().map(|l| l.category_id).collect();
        let categories: HashMap<i32, Category> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            category::Entity::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(conn)
                .await?
                .into_iter()
                .map(|m| (m.id, Category::from(m)))
                .collect()
        };

        let mut by_product: HashMap<i32, Vec<Category>> = HashMap::new();
        for link in links {
            if let Some(c) = categories.get(&link.category_id) {
                by_product.entry(link.product_id).or_default().push(c.clone());
            }
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let mut categories = by_product.remove(&m.id).unwrap_or_default();
                categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

                Product {
                    id: m.id,
                    name: m.name,
                    price: m.price,
                    stock: m.stock,
                    categories,
                }
            })
            .collect())
    }

    async fn ensure_categories_exist<C: ConnectionTrait>(conn: &C, ids: &[i32]) -> ProductResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let found: BTreeSet<i32> = category::Entity::find()
            .filter(category::Column::Id.is_in(ids.iter().copied()))
            .all(conn)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();

        let missing: Vec<i32> = ids.iter().copied().filter(|id| !found.contains(id)).collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(unknown_categories(&missing))
        }
    }

    async fn link_categories<C: ConnectionTrait>(
        conn: &C,
        product_id: i32,
        category_ids: &[i32],
    ) -> ProductResult<()> {
        if category_ids.is_empty() {
            return Ok(());
        }

        let links = category_ids.iter().map(|&category_id| product_category::ActiveModel {
            product_id: Set(product_id),
            category_id: Set(category_id),
        });

        product_category::Entity::insert_many(links).exec(conn).await?;
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        let mut query = product::Entity::find().order_by_asc(product::Column::Id);

        if let Some(ids) = filter.ids()? {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query.filter(product::Column::Id.is_in(ids));
        }

        if let Some(name) = filter.name() {
            let pattern = format!("%{}%", name.to_lowercase());
            query = query.filter(Expr::expr(Func::lower(Expr::col(product::Column::Name))).like(pattern));
        }

        let models = query.all(self.base.db()).await?;
        Self::with_categories(self.base.db(), models).await
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let Some(model) = self.base.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut products = Self::with_categories(self.base.db(), vec![model]).await?;
        Ok(products.pop())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> ProductResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = product::Entity::find()
            .filter(product::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(product::Column::Id)
            .all(self.base.db())
            .await?;

        Self::with_categories(self.base.db(), models).await
    }

    async fn create(&self, input: ProductInput) -> ProductResult<Product> {
        let category_ids = input.category_ids();
        let txn = self.base.db().begin().await?;

        Self::ensure_categories_exist(&txn, &category_ids).await?;

        let model = product::ActiveModel {
            id: NotSet,
            name: Set(input.name),
            price: Set(input.price),
            stock: Set(input.stock),
        }
        .insert(&txn)
        .await?;

        Self::link_categories(&txn, model.id, &category_ids).await?;

        let mut products = Self::with_categories(&txn, vec![model]).await?;
        txn.commit().await?;

        let product = products
            .pop()
            .ok_or_else(|| ProductError::Internal("Inserted product vanished".to_string()))?;

        tracing::info!(product_id = product.id, "Created product");
        Ok(product)
    }

    async fn update(&self, id: i32, input: ProductInput) -> ProductResult<Product> {
        let category_ids = input.category_ids();
        let txn = self.base.db().begin().await?;

        product::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        Self::ensure_categories_exist(&txn, &category_ids).await?;

        let model = product::ActiveModel {
            id: Set(id),
            name: Set(input.name),
            price: Set(input.price),
            stock: Set(input.stock),
        }
        .update(&txn)
        .await?;

        product_category::Entity::delete_many()
            .filter(product_category::Column::ProductId.eq(id))
            .exec(&txn)
            .await?;
        Self::link_categories(&txn, id, &category_ids).await?;

        let mut products = Self::with_categories(&txn, vec![model]).await?;
        txn.commit().await?;

        tracing::info!(product_id = id, "Updated product");
        products.pop().ok_or(ProductError::NotFound(id))
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let rows_affected = self.base.delete_by_id(id).await?;

        if rows_affected > 0 {
            tracing::info!(product_id = id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn product_model(id: i32, name: &str) -> product::Model {
        product::Model {
            id,
            name: name.to_string(),
            price: 1000,
            stock: 5,
        }
    }

    fn category_model(id: i32, name: &str) -> category::Model {
        category::Model {
            id,
            name: name.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_categories_load_in_batched_queries() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product_model(1, "Kopi"), product_model(2, "Teh")]])
            .append_query_results([vec![
                product_category::Model {
                    product_id: 1,
                    category_id: 10,
                },
                product_category::Model {
                    product_id: 1,
                    category_id: 11,
                },
                product_category::Model {
                    product_id: 2,
                    category_id: 11,
                },
            ]])
            .append_query_results([vec![category_model(10, "Panas"), category_model(11, "Minuman")]])
            .into_connection();

        let repo = PgProductRepository::new(db.clone());
        let products = repo.list(ProductFilter::default()).await.unwrap();

        assert_eq!(products.len(), 2);
        let names: Vec<_> = products[0].categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Minuman", "Panas"]);
        assert_eq!(products[1].categories.len(), 1);

        assert_eq!(db.into_transaction_log().len(), 3);
    }

    #[tokio::test]
    async fn test_products_without_links_skip_category_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product_model(1, "Kopi")]])
            .append_query_results([Vec::<product_category::Model>::new()])
            .into_connection();

        let repo = PgProductRepository::new(db.clone());
        let product = repo.get_by_id(1).await.unwrap().unwrap();

        assert!(product.categories.is_empty());
        assert_eq!(db.into_transaction_log().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_id_filter_does_not_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = PgProductRepository::new(db);

        assert!(repo.find_by_ids(&[]).await.unwrap().is_empty());
    }
}
