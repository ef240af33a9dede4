use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_restaurant_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@lafogata.cl", "admin123", "admin", "Admin").await?;
    ensure_user(&pool, "cashier@lafogata.cl", "cashier123", "cashier", "Front Counter").await?;
    ensure_user(&pool, "kitchen@lafogata.cl", "kitchen123", "kitchen", "Kitchen Station").await?;
    let courier_id =
        ensure_user(&pool, "courier@lafogata.cl", "courier123", "courier", "Pedro Rojas").await?;
    ensure_user(&pool, "customer@example.com", "customer123", "customer", "Maria Soto").await?;

    ensure_courier_profile(&pool, courier_id).await?;
    seed_payment_methods(&pool).await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
    full_name: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, full_name, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(full_name)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn ensure_courier_profile(pool: &sqlx::PgPool, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO couriers (id, user_id, vehicle, plate)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind("Motorcycle")
    .bind("JK-4821")
    .execute(pool)
    .await?;

    println!("Ensured courier profile");
    Ok(())
}

async fn seed_payment_methods(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let methods = vec![
        ("Cash", "cash"),
        ("Credit / debit card", "card"),
        ("Bank transfer", "transfer"),
        ("Webpay", "webpay"),
    ];

    for (name, kind) in methods {
        sqlx::query(
            r#"
            INSERT INTO payment_methods (id, name, kind)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(kind)
        .execute(pool)
        .await?;
    }

    println!("Seeded payment methods");
    Ok(())
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = vec![
        ("Pizzas", "Stone-oven pizzas"),
        ("Burgers", "House-ground smashed burgers"),
        ("Salads", "Fresh daily"),
        ("Drinks", "Sodas, juices and craft beer"),
        ("Desserts", "Made in-house"),
    ];

    for (name, desc) in &categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .execute(pool)
        .await?;
    }

    // (name, description, price in cents, stock, category, promoted)
    let products = vec![
        ("Margherita", "Tomato, mozzarella, basil", 890000, 40, "Pizzas", true),
        ("Pepperoni", "Double pepperoni, mozzarella", 990000, 40, "Pizzas", false),
        ("Classic burger", "150g patty, cheddar, pickles", 690000, 60, "Burgers", true),
        ("Bacon burger", "Smoked bacon, barbecue sauce", 790000, 60, "Burgers", false),
        ("Caesar salad", "Romaine, parmesan, croutons", 590000, 30, "Salads", false),
        ("Lemonade", "Fresh squeezed, 500ml", 250000, 120, "Drinks", false),
        ("Craft lager", "Local brewery, 330ml", 390000, 80, "Drinks", false),
        ("Tiramisu", "Espresso-soaked, single slice", 450000, 25, "Desserts", true),
    ];

    for (name, desc, price, stock, category, promoted) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, stock, promoted, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, (SELECT id FROM categories WHERE name = $7))
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(price as i64)
        .bind(stock as i32)
        .bind(promoted)
        .bind(category)
        .execute(pool)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}
