use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{Category, MenuItem},
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MenuFilter {
    /// Category id; `all` or empty means every category.
    pub category: Option<String>,
    /// Case-insensitive search over names and descriptions.
    pub q: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MenuItemRequest {
    pub category_id: String,
    pub name_en: String,
    pub name_fr: String,
    pub description_en: Option<String>,
    pub description_fr: Option<String>,
    pub price: i64,
    pub image_url: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub preparation_time: u32,
}

fn default_available() -> bool {
    true
}

impl MenuItemRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.name_en.trim().is_empty() || self.name_fr.trim().is_empty() {
            return Err(AppError::BadRequest("name_en and name_fr are required".into()));
        }
        if self.category_id.trim().is_empty() {
            return Err(AppError::BadRequest("category_id is required".into()));
        }
        if self.price < 0 {
            return Err(AppError::BadRequest("price must not be negative".into()));
        }
        Ok(())
    }

    pub fn into_item(self, id: String) -> MenuItem {
        MenuItem {
            id,
            category_id: self.category_id,
            name_en: self.name_en,
            name_fr: self.name_fr,
            description_en: self.description_en,
            description_fr: self.description_fr,
            price: self.price,
            image_url: self.image_url,
            is_available: self.is_available,
            preparation_time: self.preparation_time,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct MenuItemList {
    #[schema(value_type = Vec<MenuItem>)]
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}
