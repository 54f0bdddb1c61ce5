use restaurant_storefront::{
    config::AppConfig,
    dto::cart::{AddToCartRequest, UpdateQuantityRequest},
    error::AppError,
    models::{CartItem, Language, MenuItem},
    services::{cart_service, cart_service::CartManager, language_service::LanguageSwitch},
    state::AppState,
    store::{MemoryStore, Store, keys},
};

fn dish(id: &str, price: i64) -> MenuItem {
    MenuItem {
        id: id.to_string(),
        category_id: "1".to_string(),
        name_en: format!("Dish {id}"),
        name_fr: format!("Plat {id}"),
        description_en: None,
        description_fr: None,
        price,
        image_url: None,
        is_available: true,
        preparation_time: 10,
    }
}

#[test]
fn adding_same_item_increments_quantity() -> anyhow::Result<()> {
    let mut cart = CartManager::hydrate(MemoryStore::shared());
    let a = dish("a", 1000);
    cart.add_to_cart(&a)?;
    cart.add_to_cart(&a)?;
    cart.add_to_cart(&dish("b", 500))?;

    assert_eq!(cart.items().len(), 2);
    assert_eq!(cart.items()[0].quantity, 2);
    assert_eq!(cart.cart_total(), 2500);
    assert_eq!(cart.cart_count(), 3);
    Ok(())
}

#[test]
fn update_quantity_zero_behaves_like_remove() -> anyhow::Result<()> {
    let mut updated = CartManager::hydrate(MemoryStore::shared());
    let mut removed = CartManager::hydrate(MemoryStore::shared());
    for cart in [&mut updated, &mut removed] {
        cart.add_to_cart(&dish("a", 1000))?;
        cart.add_to_cart(&dish("b", 700))?;
    }

    updated.update_quantity("a", 0)?;
    removed.remove_from_cart("a")?;
    assert_eq!(updated.items(), removed.items());

    updated.update_quantity("b", -4)?;
    assert!(updated.is_empty());
    assert_eq!(updated.cart_total(), 0);
    Ok(())
}

#[test]
fn update_quantity_on_missing_line_changes_nothing() -> anyhow::Result<()> {
    let mut cart = CartManager::hydrate(MemoryStore::shared());
    cart.add_to_cart(&dish("a", 1000))?;
    cart.update_quantity("zzz", 5)?;
    assert_eq!(cart.cart_count(), 1);

    cart.update_quantity("a", 4)?;
    assert_eq!(cart.cart_total(), 4000);
    Ok(())
}

#[test]
fn cart_rehydrates_from_store() -> anyhow::Result<()> {
    let store = MemoryStore::shared();
    let mut cart = CartManager::hydrate(store.clone());
    cart.add_to_cart(&dish("a", 1000))?;
    cart.update_quantity("a", 3)?;
    cart.add_to_cart(&dish("b", 800))?;

    let reloaded = CartManager::hydrate(store);
    assert_eq!(reloaded.items(), cart.items());
    assert_eq!(reloaded.cart_total(), 3800);
    Ok(())
}

#[test]
fn unreadable_cart_starts_empty() -> anyhow::Result<()> {
    let store = MemoryStore::shared();
    store.set(keys::CART, "{not json".to_string())?;
    let cart = CartManager::hydrate(store);
    assert!(cart.is_empty());
    Ok(())
}

#[test]
fn language_switch_persists_choice() -> anyhow::Result<()> {
    let store = MemoryStore::shared();
    let mut switch = LanguageSwitch::hydrate(store.clone());
    assert_eq!(switch.language(), Language::En);
    assert_eq!(switch.t("Cart", "Panier"), "Cart");

    switch.set_language(Language::Fr)?;
    let reloaded = LanguageSwitch::hydrate(store.clone());
    assert_eq!(reloaded.language(), Language::Fr);
    assert_eq!(reloaded.t("Cart", "Panier"), "Panier");

    store.set(keys::LANGUAGE, "de".to_string())?;
    assert_eq!(LanguageSwitch::hydrate(store).language(), Language::En);
    Ok(())
}

#[tokio::test]
async fn add_to_cart_checks_the_menu() -> anyhow::Result<()> {
    let state = AppState::new(AppConfig::default(), MemoryStore::shared());

    let view = cart_service::add_to_cart(&state, AddToCartRequest { item_id: "2".into() })
        .await?
        .data
        .expect("cart");
    assert_eq!(view.cart_count, 1);
    assert_eq!(view.cart_total, 1000);

    let unknown = cart_service::add_to_cart(&state, AddToCartRequest { item_id: "404".into() })
        .await
        .unwrap_err();
    assert!(matches!(unknown, AppError::BadRequest(_)));

    state.catalog.write().await.toggle_availability("2")?;
    let unavailable = cart_service::add_to_cart(&state, AddToCartRequest { item_id: "2".into() })
        .await
        .unwrap_err();
    assert!(matches!(unavailable, AppError::BadRequest(_)));

    let view = cart_service::update_quantity(&state, "2", UpdateQuantityRequest { quantity: 0 })
        .await?
        .data
        .expect("cart");
    assert!(view.items.is_empty());
    Ok(())
}

#[test]
fn quantity_beyond_u32_is_rejected() -> anyhow::Result<()> {
    let store = MemoryStore::shared();
    let mut cart = CartManager::hydrate(store.clone());
    cart.add_to_cart(&dish("a", 1000))?;

    let err = cart.update_quantity("a", 10_000_000_000).unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(cart.cart_count(), 1);
    assert_eq!(CartManager::hydrate(store).items(), cart.items());
    Ok(())
}

#[test]
fn adding_past_the_largest_quantity_is_rejected() -> anyhow::Result<()> {
    let mut cart = CartManager::hydrate(MemoryStore::shared());
    let free = dish("water", 0);
    cart.add_to_cart(&free)?;
    cart.update_quantity("water", i64::from(u32::MAX))?;

    let err = cart.add_to_cart(&free).unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(cart.items()[0].quantity, u32::MAX);

    cart.add_to_cart(&dish("bread", 0))?;
    assert_eq!(cart.cart_count(), 4_294_967_296);
    Ok(())
}

#[test]
fn cart_total_overflow_is_rejected() -> anyhow::Result<()> {
    let mut cart = CartManager::hydrate(MemoryStore::shared());
    let gold = dish("gold", i64::MAX);
    cart.add_to_cart(&gold)?;
    assert_eq!(cart.cart_total(), i64::MAX);

    let err = cart.add_to_cart(&gold).unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    let err = cart.add_to_cart(&dish("silver", 1)).unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(cart.cart_count(), 1);
    Ok(())
}

#[test]
fn stored_cart_with_overflowing_total_starts_empty() -> anyhow::Result<()> {
    let store = MemoryStore::shared();
    let lines = vec![CartItem {
        item: dish("gold", i64::MAX),
        quantity: 2,
    }];
    store.set(keys::CART, serde_json::to_string(&lines)?)?;
    assert!(CartManager::hydrate(store).is_empty());
    Ok(())
}
