use crate::{
    dto::cart::{AddToCartRequest, CartView, UpdateQuantityRequest},
    error::{AppError, AppResult},
    models::{CartItem, MenuItem},
    response::{ApiResponse, Meta},
    state::AppState,
    store::{SharedStore, keys, read_json, write_json},
};

/// The shopping cart, mirrored into the store on every change.
pub struct CartManager {
    store: SharedStore,
    items: Vec<CartItem>,
}

/// Sum of the line totals, or `None` when it does not fit in an `i64`.
fn checked_total(items: &[CartItem]) -> Option<i64> {
    items
        .iter()
        .try_fold(0i64, |sum, line| sum.checked_add(line.checked_line_total()?))
}

fn too_large() -> AppError {
    AppError::BadRequest("Cart total is too large".into())
}

impl CartManager {
    /// Loads the cart from the store. Absent or unreadable data yields an
    /// empty cart, as does a stored cart whose total would overflow.
    pub fn hydrate(store: SharedStore) -> Self {
        let items = match read_json::<Vec<CartItem>>(store.as_ref(), keys::CART) {
            Ok(Some(items)) => items.into_iter().filter(|i| i.quantity > 0).collect(),
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable cart");
                Vec::new()
            }
        };
        let items = if checked_total(&items).is_some() {
            items
        } else {
            tracing::warn!("discarding cart with an out of range total");
            Vec::new()
        };
        Self { store, items }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // every committed cart passed `checked_total`
    pub fn cart_total(&self) -> i64 {
        checked_total(&self.items).unwrap_or(i64::MAX)
    }

    pub fn cart_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    pub fn view(&self) -> CartView {
        CartView {
            items: self.items.clone(),
            cart_total: self.cart_total(),
            cart_count: self.cart_count(),
        }
    }

    pub fn add_to_cart(&mut self, item: &MenuItem) -> AppResult<()> {
        let mut next = self.items.clone();
        match next.iter_mut().find(|line| line.item.id == item.id) {
            Some(line) => line.quantity = line.quantity.checked_add(1).ok_or_else(too_large)?,
            None => next.push(CartItem {
                item: item.clone(),
                quantity: 1,
            }),
        }
        self.commit(next)
    }

    pub fn remove_from_cart(&mut self, item_id: &str) -> AppResult<()> {
        let next = self
            .items
            .iter()
            .filter(|line| line.item.id != item_id)
            .cloned()
            .collect();
        self.commit(next)
    }

    /// A quantity of zero or less removes the line.
    pub fn update_quantity(&mut self, item_id: &str, quantity: i64) -> AppResult<()> {
        if quantity <= 0 {
            return self.remove_from_cart(item_id);
        }
        let quantity = u32::try_from(quantity).map_err(|_| too_large())?;
        let mut next = self.items.clone();
        if let Some(line) = next.iter_mut().find(|line| line.item.id == item_id) {
            line.quantity = quantity;
        }
        self.commit(next)
    }

    pub fn clear_cart(&mut self) -> AppResult<()> {
        self.commit(Vec::new())
    }

    // The store is written before the in-memory list is replaced.
    fn commit(&mut self, next: Vec<CartItem>) -> AppResult<()> {
        checked_total(&next).ok_or_else(too_large)?;
        write_json(self.store.as_ref(), keys::CART, &next)?;
        self.items = next;
        Ok(())
    }
}

pub async fn get_cart(state: &AppState) -> AppResult<ApiResponse<CartView>> {
    let cart = state.cart.lock().await;
    Ok(ApiResponse::ok(cart.view()))
}

pub async fn add_to_cart(
    state: &AppState,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    let item = {
        let catalog = state.catalog.read().await;
        catalog
            .get(&payload.item_id)
            .cloned()
            .ok_or_else(|| AppError::BadRequest("menu item not found".to_string()))?
    };
    if !item.is_available {
        return Err(AppError::BadRequest("menu item is unavailable".to_string()));
    }

    let mut cart = state.cart.lock().await;
    cart.add_to_cart(&item)?;
    tracing::debug!(item_id = %item.id, count = cart.cart_count(), "added to cart");

    Ok(ApiResponse::ok(cart.view()))
}

pub async fn update_quantity(
    state: &AppState,
    item_id: &str,
    payload: UpdateQuantityRequest,
) -> AppResult<ApiResponse<CartView>> {
    let mut cart = state.cart.lock().await;
    cart.update_quantity(item_id, payload.quantity)?;
    Ok(ApiResponse::ok(cart.view()))
}

pub async fn remove_from_cart(
    state: &AppState,
    item_id: &str,
) -> AppResult<ApiResponse<CartView>> {
    let mut cart = state.cart.lock().await;
    cart.remove_from_cart(item_id)?;
    Ok(ApiResponse::success(
        "Removed from cart",
        cart.view(),
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(state: &AppState) -> AppResult<ApiResponse<CartView>> {
    let mut cart = state.cart.lock().await;
    cart.clear_cart()?;
    Ok(ApiResponse::success("Cart cleared", cart.view(), Some(Meta::empty())))
}
