use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest, UpdateProfileRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
};

// Full row including the hash; never leaves this module.
#[derive(sqlx::FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    password_hash: String,
    full_name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    role: String,
    active: bool,
    created_at: DateTime<Utc>,
}

fn user_from_record(record: UserRecord) -> User {
    User {
        id: record.id,
        email: record.email,
        full_name: record.full_name,
        phone: record.phone,
        address: record.address,
        role: record.role,
        active: record.active,
        created_at: record.created_at,
    }
}

pub async fn register_user(
    pool: &DbPool,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        email,
        password,
        full_name,
        phone,
        address,
    } = payload;

    if email.trim().is_empty() || password.len() < 6 {
        return Err(AppError::BadRequest(
            "email is required and password must be at least 6 characters".to_string(),
        ));
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(pool)
        .await?;

    if exist.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let id = Uuid::new_v4();

    // Role defaults to customer in the schema; staff accounts come from the seed/admin.
    let record: UserRecord = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, full_name, phone, address)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(email.as_str())
    .bind(password_hash)
    .bind(full_name)
    .bind(phone)
    .bind(address)
    .fetch_one(pool)
    .await?;

    let user = user_from_record(record);

    if let Err(err) = log_audit(
        pool,
        Some(user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
    Ok(ApiResponse::success("User created", user, None))
}

pub async fn login_user(
    pool: &DbPool,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let record: Option<UserRecord> =
        sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(pool)
            .await?;

    let record = match record {
        Some(r) => r,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&record.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    if !record.active {
        return Err(AppError::Forbidden);
    }

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: record.id.to_string(),
        role: record.role.clone(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
    };

    if let Err(err) = log_audit(
        pool,
        Some(record.id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": record.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub async fn get_profile(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let record: Option<UserRecord> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(pool)
        .await?;

    let record = match record {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::success("OK", user_from_record(record), None))
}

pub async fn update_profile(
    pool: &DbPool,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let record: UserRecord = sqlx::query_as(
        r#"
        UPDATE users
        SET full_name = COALESCE($2, full_name),
            phone = COALESCE($3, phone),
            address = COALESCE($4, address)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user.user_id)
    .bind(payload.full_name)
    .bind(payload.phone)
    .bind(payload.address)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "profile_update",
        Some("users"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Profile updated",
        user_from_record(record),
        Some(Meta::empty()),
    ))
}
