use axum_restaurant_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        auth::UpdateProfileRequest,
        cart::AddToCartRequest,
        complaints::{CreateComplaintRequest, UpdateComplaintRequest},
        orders::CheckoutRequest,
    },
    entity::{
        Products,
        complaints::{ComplaintReason, ComplaintStatus},
        orders::{OrderKind, OrderStatus},
        payment_methods::{ActiveModel as PaymentMethodActive, PaymentKind},
        products::ActiveModel as ProductActive,
        users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    routes::admin::UpdateOrderStatusRequest,
    routes::params::Pagination,
    services::{admin_service, auth_service, cart_service, complaint_service, order_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set, Statement};
use uuid::Uuid;

// Integration flow: customer fills a cart, checks out, staff walk the order
// through the status machine, the customer complains, staff answer.
#[tokio::test]
async fn cart_checkout_status_and_complaint_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let user_id = create_user(&state, "customer", "customer@example.com").await?;
    let admin_id = create_user(&state, "admin", "admin@example.com").await?;

    let payment_method = PaymentMethodActive {
        id: Set(Uuid::new_v4()),
        name: Set("Cash".into()),
        kind: Set(PaymentKind::Cash),
        active: Set(true),
    }
    .insert(&state.orm)
    .await?;

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set("Test Empanada".into()),
        description: Set(Some("A product for testing".into())),
        price: Set(1000),
        stock: Set(10),
        active: Set(true),
        promoted: Set(false),
        image_url: Set(None),
        category_id: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let auth_user = AuthUser {
        user_id,
        role: "customer".into(),
    };
    let auth_admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };

    // Profile update works on the fields the customer owns.
    let profile = auth_service::update_profile(
        &state.pool,
        &auth_user,
        UpdateProfileRequest {
            full_name: Some("Maria Soto".into()),
            phone: Some("+56911111111".into()),
            address: None,
        },
    )
    .await?;
    assert_eq!(
        profile.data.unwrap().full_name.as_deref(),
        Some("Maria Soto")
    );

    // Add to cart; asking for more than stock must be refused.
    cart_service::add_to_cart(
        &state.pool,
        &auth_user,
        AddToCartRequest {
            product_id: product.id,
            quantity: 2,
        },
    )
    .await?;

    let oversell = cart_service::add_to_cart(
        &state.pool,
        &auth_user,
        AddToCartRequest {
            product_id: product.id,
            quantity: 99,
        },
    )
    .await;
    assert!(oversell.is_err(), "cart must not exceed live stock");

    // Delivery without an address is rejected before anything is written.
    let no_address = order_service::checkout(
        &state,
        &auth_user,
        CheckoutRequest {
            kind: OrderKind::Delivery,
            payment_method_id: payment_method.id,
            delivery_address: None,
            delivery_reference: None,
            customer_note: None,
        },
    )
    .await;
    assert!(no_address.is_err());

    // Pickup checkout: no shipping fee, totals add up, stock drops, cart empties.
    let checkout_resp = order_service::checkout(
        &state,
        &auth_user,
        CheckoutRequest {
            kind: OrderKind::Pickup,
            payment_method_id: payment_method.id,
            delivery_address: None,
            delivery_reference: None,
            customer_note: Some("extra napkins".into()),
        },
    )
    .await?;
    let placed = checkout_resp.data.unwrap();
    assert_eq!(placed.order.subtotal, 2000);
    assert_eq!(placed.order.shipping_fee, 0);
    assert_eq!(placed.order.total, 2000);
    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].subtotal, 2000);

    let after_checkout = Products::find_by_id(product.id)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(after_checkout.stock, 8);

    let cart = cart_service::list_cart(
        &state.pool,
        &auth_user,
        Pagination {
            page: Some(1),
            per_page: Some(20),
        },
    )
    .await?;
    let cart = cart.data.unwrap();
    assert!(cart.items.is_empty(), "checkout must clear the cart");
    assert_eq!(cart.total_price, 0);

    // Walk the order to delivered; a pickup skips the delivery leg.
    for status in ["confirmed", "in_preparation", "ready", "delivered"] {
        admin_service::update_order_status(
            &state,
            &auth_admin,
            placed.order.id,
            UpdateOrderStatusRequest {
                status: status.into(),
            },
        )
        .await?;
    }

    let delivered = order_service::get_order(&state, &auth_user, placed.order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(delivered.order.status, OrderStatus::Delivered);
    assert!(delivered.order.delivered_at.is_some());

    // Delivered is terminal: no cancellation, no replay.
    let cancel_after = admin_service::update_order_status(
        &state,
        &auth_admin,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: "cancelled".into(),
        },
    )
    .await;
    assert!(cancel_after.is_err(), "delivered orders must stay delivered");

    // Tracking by order number shows the full timeline.
    let tracking = order_service::track_order(&state, &auth_user, &placed.order.order_number)
        .await?
        .data
        .unwrap();
    assert_eq!(tracking.status, OrderStatus::Delivered);
    assert!(tracking.ready_at.is_some());

    // Complaint: filed by the customer, answered by staff.
    let complaint = complaint_service::create_complaint(
        &state,
        &auth_user,
        CreateComplaintRequest {
            order_id: placed.order.id,
            reason: ComplaintReason::ExcessiveDelay,
            description: "Order took an hour".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(complaint.status, ComplaintStatus::New);

    let answered = complaint_service::update_complaint(
        &state,
        &auth_admin,
        complaint.id,
        UpdateComplaintRequest {
            status: None,
            response: Some("Sorry - a free dessert is on your account.".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(answered.status, ComplaintStatus::Answered);
    assert_eq!(answered.attended_by, Some(admin_id));
    assert!(answered.responded_at.is_some());

    // Delivery checkout: the flat fee lands on top of the line subtotals.
    cart_service::add_to_cart(
        &state.pool,
        &auth_user,
        AddToCartRequest {
            product_id: product.id,
            quantity: 3,
        },
    )
    .await?;

    let delivery = order_service::checkout(
        &state,
        &auth_user,
        CheckoutRequest {
            kind: OrderKind::Delivery,
            payment_method_id: payment_method.id,
            delivery_address: Some("Av. Siempre Viva 742".into()),
            delivery_reference: Some("blue gate".into()),
            customer_note: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(delivery.order.subtotal, 3000);
    assert_eq!(delivery.order.shipping_fee, state.config.delivery_fee);
    assert_eq!(
        delivery.order.total,
        3000 + state.config.delivery_fee
    );

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;
    let pool = create_pool(database_url).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE complaints, order_items, orders, cart_items, couriers, payment_methods, products, categories, audit_logs, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        pool,
        orm,
        config: test_config(database_url),
    })
}

fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        delivery_fee: 2500,
    }
}

async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        full_name: Set(None),
        phone: Set(None),
        address: Set(None),
        role: Set(role.into()),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}
