use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, SignupRequest},
        cart::{AddToCartRequest, CartView, UpdateQuantityRequest},
        menu::{CategoryList, MenuItemList, MenuItemRequest},
        orders::{
            CheckoutRequest, DashboardStats, OrderList, UpdateOrderStatusRequest,
            UpdatePaymentStatusRequest,
        },
        reports::{
            DailyRevenue, ItemSales, PaymentMethodCount, ReportRange, SalesReport, StatusCount,
        },
    },
    models::{
        CartItem, Category, Language, MenuItem, Order, OrderLine, OrderStatus, PaymentMethod,
        PaymentStatus, Role, User,
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, health, language, menu, orders, params},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        menu::list_categories,
        menu::list_items,
        cart::cart_view,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        cart::clear_cart,
        orders::checkout,
        orders::track_order,
        orders::get_order,
        language::get_language,
        language::set_language,
        auth::signup,
        auth::login,
        auth::logout,
        auth::current_user,
        admin::dashboard,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::update_payment_status,
        admin::create_menu_item,
        admin::update_menu_item,
        admin::delete_menu_item,
        admin::toggle_menu_item,
        admin::sales_report,
        admin::export_orders
    ),
    components(
        schemas(
            Language,
            Category,
            MenuItem,
            CartItem,
            Order,
            OrderLine,
            OrderStatus,
            PaymentMethod,
            PaymentStatus,
            Role,
            User,
            CategoryList,
            MenuItemList,
            MenuItemRequest,
            CartView,
            AddToCartRequest,
            UpdateQuantityRequest,
            CheckoutRequest,
            OrderList,
            DashboardStats,
            UpdateOrderStatusRequest,
            UpdatePaymentStatusRequest,
            SignupRequest,
            LoginRequest,
            language::SetLanguageRequest,
            ReportRange,
            StatusCount,
            DailyRevenue,
            ItemSales,
            PaymentMethodCount,
            SalesReport,
            params::Pagination,
            params::OrderListQuery,
            Meta,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<CartView>,
            ApiResponse<MenuItem>,
            ApiResponse<SalesReport>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Menu", description = "Menu browsing"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Checkout and order tracking"),
        (name = "Language", description = "English / French switch"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
