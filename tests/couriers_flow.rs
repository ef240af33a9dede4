use axum_restaurant_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        cart::AddToCartRequest,
        couriers::{AssignCourierRequest, CreateCourierRequest, UpdateAvailabilityRequest},
        orders::CheckoutRequest,
    },
    entity::{
        orders::OrderKind,
        payment_methods::{ActiveModel as PaymentMethodActive, PaymentKind},
        products::ActiveModel as ProductActive,
        users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    routes::admin::UpdateOrderStatusRequest,
    routes::params::CourierListQuery,
    routes::params::Pagination,
    services::{admin_service, cart_service, courier_service, order_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

// Courier flow: profile creation is role-checked, assignment respects order
// kind and availability, and the courier's board drains once delivered.
#[tokio::test]
async fn courier_profile_assignment_and_board() -> anyhow::Result<()> {
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

    let admin_id = create_user(&state, "admin", "admin@example.com").await?;
    let customer_id = create_user(&state, "customer", "customer@example.com").await?;
    let rider_id = create_user(&state, "courier", "rider@example.com").await?;

    let admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };
    let customer = AuthUser {
        user_id: customer_id,
        role: "customer".into(),
    };
    let rider = AuthUser {
        user_id: rider_id,
        role: "courier".into(),
    };

    // Only courier-role accounts get a profile, and only one each.
    let wrong_role = courier_service::create_courier(
        &state,
        &admin,
        CreateCourierRequest {
            user_id: customer_id,
            vehicle: None,
            plate: None,
        },
    )
    .await;
    assert!(wrong_role.is_err());

    let courier = courier_service::create_courier(
        &state,
        &admin,
        CreateCourierRequest {
            user_id: rider_id,
            vehicle: Some("Motorcycle".into()),
            plate: Some("JK-4821".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(courier.available);

    let duplicate = courier_service::create_courier(
        &state,
        &admin,
        CreateCourierRequest {
            user_id: rider_id,
            vehicle: None,
            plate: None,
        },
    )
    .await;
    assert!(duplicate.is_err());

    // A delivery order to assign.
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
        name: Set("Family Pizza".into()),
        description: Set(None),
        price: Set(12000),
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

    cart_service::add_to_cart(
        &state.pool,
        &customer,
        AddToCartRequest {
            product_id: product.id,
            quantity: 1,
        },
    )
    .await?;
    let delivery_order = order_service::checkout(
        &state,
        &customer,
        CheckoutRequest {
            kind: OrderKind::Delivery,
            payment_method_id: payment_method.id,
            delivery_address: Some("Av. Siempre Viva 742".into()),
            delivery_reference: None,
            customer_note: None,
        },
    )
    .await?
    .data
    .unwrap()
    .order;

    cart_service::add_to_cart(
        &state.pool,
        &customer,
        AddToCartRequest {
            product_id: product.id,
            quantity: 1,
        },
    )
    .await?;
    let pickup_order = order_service::checkout(
        &state,
        &customer,
        CheckoutRequest {
            kind: OrderKind::Pickup,
            payment_method_id: payment_method.id,
            delivery_address: None,
            delivery_reference: None,
            customer_note: None,
        },
    )
    .await?
    .data
    .unwrap()
    .order;

    // Pickup orders never take a courier.
    let not_delivery = admin_service::assign_courier(
        &state,
        &admin,
        pickup_order.id,
        AssignCourierRequest {
            courier_id: courier.id,
        },
    )
    .await;
    assert!(not_delivery.is_err());

    // An off-shift courier cannot be assigned.
    courier_service::set_my_availability(
        &state,
        &rider,
        UpdateAvailabilityRequest { available: false },
    )
    .await?;
    let off_shift = admin_service::assign_courier(
        &state,
        &admin,
        delivery_order.id,
        AssignCourierRequest {
            courier_id: courier.id,
        },
    )
    .await;
    assert!(off_shift.is_err());

    courier_service::set_my_availability(
        &state,
        &rider,
        UpdateAvailabilityRequest { available: true },
    )
    .await?;
    let assigned = admin_service::assign_courier(
        &state,
        &admin,
        delivery_order.id,
        AssignCourierRequest {
            courier_id: courier.id,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(assigned.courier_id, Some(courier.id));

    // The rider sees the run until it is delivered.
    let board = courier_service::my_orders(&state, &rider).await?.data.unwrap();
    assert!(board.items.iter().any(|o| o.id == delivery_order.id));

    for status in [
        "confirmed",
        "in_preparation",
        "ready",
        "out_for_delivery",
        "delivered",
    ] {
        admin_service::update_order_status(
            &state,
            &admin,
            delivery_order.id,
            UpdateOrderStatusRequest {
                status: status.into(),
            },
        )
        .await?;
    }

    let board = courier_service::my_orders(&state, &rider).await?.data.unwrap();
    assert!(board.items.is_empty(), "delivered runs leave the board");

    // Admin listing filters by availability.
    let available = courier_service::list_couriers(
        &state,
        &admin,
        CourierListQuery {
            pagination: Pagination {
                page: Some(1),
                per_page: Some(20),
            },
            available: Some(true),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(available.items.iter().any(|c| c.id == courier.id));

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;
    let pool = create_pool(database_url).await?;

    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE complaints, order_items, orders, cart_items, couriers, payment_methods, products, categories, audit_logs, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        pool,
        orm,
        config: AppConfig {
            database_url: database_url.to_string(),
            host: "127.0.0.1".into(),
            port: 0,
            delivery_fee: 2500,
        },
    })
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
