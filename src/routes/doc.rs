use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest, UpdateProfileRequest},
        cart::{AddToCartRequest, AdjustCartItemRequest, CartItemDto, CartList},
        categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        complaints::{ComplaintList, CreateComplaintRequest, UpdateComplaintRequest},
        couriers::{AssignCourierRequest, CourierList, CreateCourierRequest, UpdateAvailabilityRequest},
        orders::{CheckoutRequest, OrderList, OrderTracking, OrderWithItems, PaymentMethodList},
        pos::{PosSaleItem, PosSaleRequest},
        products,
        reports::{DailySales, DailySalesReport, TopProduct, TopProductsReport},
    },
    entity::{
        complaints::{ComplaintReason, ComplaintStatus},
        orders::{OrderKind, OrderStatus},
        payment_methods::PaymentKind,
    },
    models::{
        CartItem, Category, Complaint, Courier, Order, OrderItem, PaymentMethod, Product, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        admin, auth, cart, categories, complaints, couriers, health, orders, params, pos,
        products as product_routes,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::profile,
        auth::edit_profile,
        categories::list_categories,
        product_routes::list_products,
        product_routes::create_product,
        product_routes::get_product,
        product_routes::update_product,
        product_routes::delete_product,
        cart::cart_list,
        cart::add_to_cart,
        cart::adjust_cart_item,
        cart::remove_from_cart,
        cart::clear_cart,
        orders::list_orders,
        orders::checkout,
        orders::track_order,
        orders::get_order,
        orders::list_payment_methods,
        pos::register_sale,
        pos::list_today_sales,
        couriers::create_courier,
        couriers::list_couriers,
        couriers::set_my_availability,
        couriers::my_orders,
        complaints::create_complaint,
        complaints::list_my_complaints,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::assign_courier,
        admin::list_low_stock,
        admin::adjust_inventory,
        admin::create_category,
        admin::update_category,
        admin::delete_category,
        admin::list_all_complaints,
        admin::update_complaint,
        admin::daily_sales,
        admin::top_products
    ),
    components(
        schemas(
            User,
            Category,
            Product,
            CartItem,
            PaymentMethod,
            Courier,
            Order,
            OrderItem,
            Complaint,
            OrderStatus,
            OrderKind,
            PaymentKind,
            ComplaintReason,
            ComplaintStatus,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryList,
            AddToCartRequest,
            AdjustCartItemRequest,
            CartItemDto,
            CartList,
            CheckoutRequest,
            OrderList,
            OrderWithItems,
            OrderTracking,
            PaymentMethodList,
            PosSaleItem,
            PosSaleRequest,
            CreateCourierRequest,
            UpdateAvailabilityRequest,
            AssignCourierRequest,
            CourierList,
            CreateComplaintRequest,
            UpdateComplaintRequest,
            ComplaintList,
            DailySales,
            DailySalesReport,
            TopProduct,
            TopProductsReport,
            admin::ProductList,
            admin::UpdateOrderStatusRequest,
            admin::InventoryAdjustRequest,
            admin::LowStockQuery,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::ComplaintListQuery,
            params::CourierListQuery,
            params::ReportQuery,
            products::ProductList,
            Meta,
            ApiResponse<Product>,
            ApiResponse<products::ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<CartList>,
            ApiResponse<ComplaintList>,
            ApiResponse<CourierList>,
            ApiResponse<admin::ProductList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication and profile endpoints"),
        (name = "Catalog", description = "Category and product endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order and checkout endpoints"),
        (name = "POS", description = "Point-of-sale endpoints"),
        (name = "Couriers", description = "Courier endpoints"),
        (name = "Complaints", description = "Complaint endpoints"),
        (name = "Admin", description = "Back-office endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
