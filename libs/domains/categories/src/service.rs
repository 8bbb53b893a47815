use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{CategoryError, CategoryResult};
use crate::models::{Category, CreateCategory, UpdateCategory};
use crate::repository::CategoryRepository;

#[derive(Clone)]
pub struct CategoryService<R: CategoryRepository> {
    repository: Arc<R>,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> CategoryResult<Vec<Category>> {
        self.repository.list().await
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: i32) -> CategoryResult<Category> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(CategoryError::NotFound(id))
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(&self, input: CreateCategory) -> CategoryResult<Category> {
        input
            .validate()
            .map_err(|e| CategoryError::Validation(e.to_string()))?;

        self.repository.create(input).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_category(&self, id: i32, input: UpdateCategory) -> CategoryResult<Category> {
        input
            .validate()
            .map_err(|e| CategoryError::Validation(e.to_string()))?;

        self.repository.update(id, input).await
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: i32) -> CategoryResult<()> {
        if !self.repository.delete(id).await? {
            return Err(CategoryError::NotFound(id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockCategoryRepository;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_get_missing_category_is_not_found() {
        let mut mock_repo = MockCategoryRepository::new();
        mock_repo
            .expect_get_by_id()
            .with(eq(4))
            .returning(|_| Ok(None));

        let service = CategoryService::new(mock_repo);
        let result = service.get_category(4).await;

        assert!(matches!(result, Err(CategoryError::NotFound(4))));
    }

    #[tokio::test]
    async fn test_delete_missing_category_is_not_found() {
        let mut mock_repo = MockCategoryRepository::new();
        mock_repo.expect_delete().with(eq(2)).returning(|_| Ok(false));

        let service = CategoryService::new(mock_repo);
        assert!(matches!(
            service.delete_category(2).await,
            Err(CategoryError::NotFound(2))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name_without_touching_repository() {
        let mock_repo = MockCategoryRepository::new();
        let service = CategoryService::new(mock_repo);

        let result = service
            .create_category(CreateCategory {
                name: String::new(),
                description: String::new(),
            })
            .await;

        assert!(matches!(result, Err(CategoryError::Validation(_))));
    }
}
