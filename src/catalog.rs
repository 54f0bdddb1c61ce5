//! Menu fixtures and the in-memory admin copy of the menu.

use chrono::Utc;

use crate::{
    dto::menu::{MenuFilter, MenuItemRequest},
    error::{AppError, AppResult},
    ids::millis_id,
    models::{Category, MenuItem},
};

#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
    items: Vec<MenuItem>,
}

impl Catalog {
    pub fn new(categories: Vec<Category>, items: Vec<MenuItem>) -> Self {
        Self { categories, items }
    }

    pub fn seeded() -> Self {
        Self::new(seed_categories(), seed_menu_items())
    }

    pub fn categories(&self) -> Vec<Category> {
        let mut categories = self.categories.clone();
        categories.sort_by_key(|c| c.display_order);
        categories
    }

    pub fn get(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn list(&self, filter: &MenuFilter) -> Vec<MenuItem> {
        let category = filter.category.as_deref().filter(|c| !c.is_empty() && *c != "all");
        let query = filter
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        self.items
            .iter()
            .filter(|item| category.is_none_or(|c| item.category_id == c))
            .filter(|item| query.as_deref().is_none_or(|q| matches_query(item, q)))
            .cloned()
            .collect()
    }

    pub fn create(&mut self, payload: MenuItemRequest) -> AppResult<MenuItem> {
        payload.validate()?;
        let id = millis_id("", Utc::now(), |id| self.get(id).is_some());
        let item = payload.into_item(id);
        self.items.push(item.clone());
        Ok(item)
    }

    pub fn update(&mut self, id: &str, payload: MenuItemRequest) -> AppResult<MenuItem> {
        payload.validate()?;
        let slot = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(AppError::NotFound)?;
        *slot = payload.into_item(id.to_string());
        Ok(slot.clone())
    }

    pub fn delete(&mut self, id: &str) -> AppResult<MenuItem> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(AppError::NotFound)?;
        Ok(self.items.remove(index))
    }

    pub fn toggle_availability(&mut self, id: &str) -> AppResult<MenuItem> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(AppError::NotFound)?;
        item.is_available = !item.is_available;
        Ok(item.clone())
    }
}

fn matches_query(item: &MenuItem, query: &str) -> bool {
    let hit = |text: &str| text.to_lowercase().contains(query);
    hit(item.name_en.as_str())
        || hit(item.name_fr.as_str())
        || item.description_en.as_deref().is_some_and(hit)
        || item.description_fr.as_deref().is_some_and(hit)
}

fn category(id: &str, name_en: &str, name_fr: &str, display_order: i32) -> Category {
    Category {
        id: id.to_string(),
        name_en: name_en.to_string(),
        name_fr: name_fr.to_string(),
        description_en: None,
        description_fr: None,
        display_order,
    }
}

#[allow(clippy::too_many_arguments)]
fn menu_item(
    id: &str,
    category_id: &str,
    name_en: &str,
    name_fr: &str,
    description_en: &str,
    description_fr: &str,
    price: i64,
    preparation_time: u32,
) -> MenuItem {
    MenuItem {
        id: id.to_string(),
        category_id: category_id.to_string(),
        name_en: name_en.to_string(),
        name_fr: name_fr.to_string(),
        description_en: Some(description_en.to_string()),
        description_fr: Some(description_fr.to_string()),
        price,
        image_url: None,
        is_available: true,
        preparation_time,
    }
}

pub fn seed_categories() -> Vec<Category> {
    vec![
        category("1", "Appetizers", "Entrées", 1),
        category("2", "Main Dishes", "Plats Principaux", 2),
        category("3", "Drinks", "Boissons", 3),
        category("4", "Desserts", "Desserts", 4),
    ]
}

pub fn seed_menu_items() -> Vec<MenuItem> {
    vec![
        menu_item(
            "1",
            "1",
            "Bean Fritters",
            "Beignets Haricots",
            "Crispy fritters served with spicy bean stew",
            "Beignets croustillants servis avec des haricots épicés",
            1500,
            15,
        ),
        menu_item(
            "2",
            "1",
            "Fried Plantains",
            "Plantains Frits",
            "Sweet ripe plantains, golden fried",
            "Plantains mûrs frits et dorés",
            1000,
            10,
        ),
        menu_item(
            "3",
            "1",
            "Koki",
            "Koki",
            "Steamed black-eyed pea cake wrapped in banana leaves",
            "Gâteau de niébé cuit à la vapeur dans des feuilles de bananier",
            2000,
            25,
        ),
        menu_item(
            "4",
            "2",
            "Ndole",
            "Ndolé",
            "Bitterleaf stew with peanuts, beef and shrimp",
            "Ragoût de feuilles amères aux arachides, bœuf et crevettes",
            4500,
            30,
        ),
        menu_item(
            "5",
            "2",
            "Chicken DG",
            "Poulet DG",
            "Chicken sautéed with plantains and vegetables",
            "Poulet sauté aux plantains et légumes",
            5000,
            35,
        ),
        menu_item(
            "6",
            "2",
            "Grilled Fish",
            "Poisson Braisé",
            "Whole grilled fish with spicy sauce and miondo",
            "Poisson entier braisé, sauce pimentée et miondo",
            6000,
            40,
        ),
        menu_item(
            "7",
            "2",
            "Eru",
            "Eru",
            "Eru leaves cooked with waterleaf, palm oil and smoked fish",
            "Feuilles d'eru cuites avec du waterleaf, de l'huile de palme et du poisson fumé",
            4000,
            30,
        ),
        menu_item(
            "8",
            "3",
            "Folere Juice",
            "Jus de Foléré",
            "Chilled hibiscus juice with ginger",
            "Jus d'hibiscus frais au gingembre",
            800,
            5,
        ),
        menu_item(
            "9",
            "3",
            "Ginger Juice",
            "Jus de Gingembre",
            "Fresh pressed ginger and pineapple",
            "Gingembre et ananas pressés",
            800,
            5,
        ),
        menu_item(
            "10",
            "4",
            "Puff-Puff",
            "Beignets Sucrés",
            "Sweet fried dough balls",
            "Boules de pâte frites et sucrées",
            700,
            10,
        ),
        menu_item(
            "11",
            "4",
            "Fruit Salad",
            "Salade de Fruits",
            "Seasonal tropical fruits",
            "Fruits tropicaux de saison",
            1200,
            5,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_by_category_and_query() {
        let catalog = Catalog::seeded();

        let mains = catalog.list(&MenuFilter {
            category: Some("2".into()),
            q: None,
        });
        assert!(mains.iter().all(|item| item.category_id == "2"));
        assert_eq!(mains.len(), 4);

        let french = catalog.list(&MenuFilter {
            category: None,
            q: Some("POISSON".into()),
        });
        assert_eq!(french.len(), 2);

        let by_description = catalog.list(&MenuFilter {
            category: Some("3".into()),
            q: Some("pineapple".into()),
        });
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].id, "9");
    }

    #[test]
    fn categories_sorted_by_display_order() {
        let mut categories = seed_categories();
        categories.reverse();
        let catalog = Catalog::new(categories, Vec::new());
        let orders: Vec<i32> = catalog.categories().iter().map(|c| c.display_order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
    }

    #[test]
    fn toggle_and_delete() {
        let mut catalog = Catalog::seeded();
        let toggled = catalog.toggle_availability("4").unwrap();
        assert!(!toggled.is_available);

        catalog.delete("4").unwrap();
        assert!(catalog.get("4").is_none());
        assert!(matches!(catalog.delete("4"), Err(AppError::NotFound)));
    }
}
