use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{CategoryError, CategoryResult};
use crate::models::{Category, CreateCategory, UpdateCategory};

/// Repository trait for Category persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories, ordered by id
    async fn list(&self) -> CategoryResult<Vec<Category>>;

    async fn get_by_id(&self, id: i32) -> CategoryResult<Option<Category>>;

    async fn create(&self, input: CreateCategory) -> CategoryResult<Category>;

    /// Replaces name and description; `NotFound` when `id` is unknown
    async fn update(&self, id: i32, input: UpdateCategory) -> CategoryResult<Category>;

    /// `false` when nothing was deleted
    async fn delete(&self, id: i32) -> CategoryResult<bool>;
}

/// In-memory implementation of CategoryRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCategoryRepository {
    state: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i32,
    categories: BTreeMap<i32, Category>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list(&self) -> CategoryResult<Vec<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> CategoryResult<Option<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.get(&id).cloned())
    }

    async fn create(&self, input: CreateCategory) -> CategoryResult<Category> {
        let mut state = self.state.write().await;
        state.next_id += 1;

        let category = Category {
            id: state.next_id,
            name: input.name,
            description: input.description,
        };
        state.categories.insert(category.id, category.clone());

        tracing::info!(category_id = category.id, "Created category");
        Ok(category)
    }

    async fn update(&self, id: i32, input: UpdateCategory) -> CategoryResult<Category> {
        let mut state = self.state.write().await;
        let category = state
            .categories
            .get_mut(&id)
            .ok_or(CategoryError::NotFound(id))?;

        category.apply_update(input);

        tracing::info!(category_id = id, "Updated category");
        Ok(category.clone())
    }

    async fn delete(&self, id: i32) -> CategoryResult<bool> {
        let mut state = self.state.write().await;

        if state.categories.remove(&id).is_some() {
            tracing::info!(category_id = id, "Deleted category");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str) -> CreateCategory {
        CreateCategory {
            name: name.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_assigned_in_order() {
        let repo = InMemoryCategoryRepository::new();

        let first = repo.create(create("Food")).await.unwrap();
        let second = repo.create(create("Drinks")).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_update_unknown_category() {
        let repo = InMemoryCategoryRepository::new();
        let result = repo
            .update(
                9,
                UpdateCategory {
                    name: "x".into(),
                    description: String::new(),
                },
            )
            .await;

        assert!(matches!(result, Err(CategoryError::NotFound(9))));
    }

    #[tokio::test]
    async fn test_delete_reports_whether_row_existed() {
        let repo = InMemoryCategoryRepository::new();
        let category = repo.create(create("Snacks")).await.unwrap();

        assert!(repo.delete(category.id).await.unwrap());
        assert!(!repo.delete(category.id).await.unwrap());
    }
}
