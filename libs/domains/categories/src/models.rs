use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Full replacement of a category's fields.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Category {
    pub fn apply_update(&mut self, update: UpdateCategory) {
        self.name = update.name;
        self.description = update.description;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_defaults_to_empty() {
        let input: CreateCategory = serde_json::from_str(r#"{"name":"Drinks"}"#).unwrap();
        assert_eq!(input.description, "");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_name_length_is_validated() {
        let empty = CreateCategory {
            name: String::new(),
            description: String::new(),
        };
        assert!(empty.validate().is_err());

        let long = UpdateCategory {
            name: "x".repeat(101),
            description: String::new(),
        };
        assert!(long.validate().is_err());
    }
}
