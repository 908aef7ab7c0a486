//! Identity operations: registration, login, account updates

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    LoginRequest, LoginResponse, RegisterRequest, Role, User, UserUpdate, normalize_email,
};
use validator::Validate;

use crate::auth::JwtService;
use crate::config::AdminBootstrap;
use crate::db::{NewUser, RepoError, UserChanges, UserRepository};
use crate::security_log;
use crate::util::{hash_password, verify_password};

fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| {
        tracing::error!(error = %e, "Password hashing failed");
        AppError::new(ErrorCode::InternalError)
    })
}

fn email_taken(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::EmailAlreadyExists),
        other => other.into(),
    }
}

/// Create a regular user account
pub async fn register(users: &dyn UserRepository, req: RegisterRequest) -> AppResult<User> {
    req.validate()?;

    let email = normalize_email(&req.email);
    if users.find_account_by_email(&email).await?.is_some() {
        return Err(AppError::new(ErrorCode::EmailAlreadyExists));
    }

    let user = users
        .create(NewUser {
            email,
            name: req.name.trim().to_string(),
            address: req.address.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()),
            password_hash: hash(&req.password)?,
            role: Role::User,
        })
        .await
        .map_err(email_taken)?;

    tracing::info!(user_id = user.id, "User registered");
    Ok(user)
}

/// Verify credentials and issue an access token
///
/// Unknown email and wrong password fail identically.
pub async fn login(
    users: &dyn UserRepository,
    jwt: &JwtService,
    req: LoginRequest,
) -> AppResult<LoginResponse> {
    let email = normalize_email(&req.email);
    let Some(account) = users.find_account_by_email(&email).await? else {
        security_log!(WARN, "login_failed", reason = "unknown_email");
        return Err(AppError::invalid_credentials());
    };

    if !verify_password(&req.password, &account.password_hash) {
        security_log!(WARN, "login_failed", reason = "wrong_password", user_id = account.user.id);
        return Err(AppError::invalid_credentials());
    }

    let access_token = jwt.generate_token(&account.user).map_err(|e| {
        tracing::error!(error = %e, "JWT creation failed");
        AppError::new(ErrorCode::InternalError)
    })?;

    tracing::info!(user_id = account.user.id, "User logged in");
    Ok(LoginResponse {
        access_token,
        user: account.user,
    })
}

/// Apply a partial update (profile or admin edit)
pub async fn update_user(
    users: &dyn UserRepository,
    id: i64,
    update: UserUpdate,
) -> AppResult<User> {
    update.validate()?;

    let password_hash = match update.password.as_deref() {
        Some(password) => Some(hash(password)?),
        None => None,
    };

    users
        .update(
            id,
            UserChanges {
                name: update.name.map(|n| n.trim().to_string()),
                address: update.address.map(|a| a.trim().to_string()),
                password_hash,
                role: update.role,
            },
        )
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => {
                AppError::new(ErrorCode::UserNotFound).with_detail("user_id", id)
            }
            other => other.into(),
        })
}

/// Create the configured admin account when no user has that email
///
/// An existing account with that email is promoted to admin.
pub async fn ensure_admin(
    users: &dyn UserRepository,
    bootstrap: &AdminBootstrap,
) -> AppResult<User> {
    let email = normalize_email(&bootstrap.email);

    if let Some(account) = users.find_account_by_email(&email).await? {
        if account.user.role == Role::Admin {
            return Ok(account.user);
        }
        let promoted = users
            .update(
                account.user.id,
                UserChanges {
                    role: Some(Role::Admin),
                    ..Default::default()
                },
            )
            .await?;
        tracing::info!(user_id = promoted.id, "Existing account promoted to admin");
        return Ok(promoted);
    }

    let admin = users
        .create(NewUser {
            email,
            name: "Administrator".to_string(),
            address: None,
            password_hash: hash(&bootstrap.password)?,
            role: Role::Admin,
        })
        .await
        .map_err(email_taken)?;
    tracing::info!(user_id = admin.id, "Bootstrap admin created");
    Ok(admin)
}
