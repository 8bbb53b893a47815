use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::ActiveValue::Set;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

use crate::{
    entity,
    error::{CategoryError, CategoryResult},
    models::{Category, CreateCategory, UpdateCategory},
    repository::CategoryRepository,
};

#[derive(Clone)]
pub struct PgCategoryRepository {
    base: BaseRepository<entity::Entity>,
}

impl PgCategoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

fn db_error(e: sea_orm::DbErr) -> CategoryError {
    CategoryError::Internal(format!("Database error: {}", e))
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list(&self) -> CategoryResult<Vec<Category>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(self.base.db())
            .await
            .map_err(db_error)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get_by_id(&self, id: i32) -> CategoryResult<Option<Category>> {
        let model = self.base.find_by_id(id).await.map_err(db_error)?;
        Ok(model.map(Into::into))
    }

    async fn create(&self, input: CreateCategory) -> CategoryResult<Category> {
        let active_model: entity::ActiveModel = input.into();
        let model = self.base.insert(active_model).await.map_err(db_error)?;

        tracing::info!(category_id = model.id, "Created category");
        Ok(model.into())
    }

    async fn update(&self, id: i32, input: UpdateCategory) -> CategoryResult<Category> {
        self.base
            .find_by_id(id)
            .await
            .map_err(db_error)?
            .ok_or(CategoryError::NotFound(id))?;

        let active_model = entity::ActiveModel {
            id: Set(id),
            name: Set(input.name),
            description: Set(input.description),
        };

        let model = self.base.update(active_model).await.map_err(db_error)?;

        tracing::info!(category_id = id, "Updated category");
        Ok(model.into())
    }

    async fn delete(&self, id: i32) -> CategoryResult<bool> {
        let rows_affected = self.base.delete_by_id(id).await.map_err(db_error)?;

        if rows_affected > 0 {
            tracing::info!(category_id = id, "Deleted category");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
