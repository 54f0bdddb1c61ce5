use serde_json::Value;

use crate::{
    audit::log_audit,
    config::AppConfig,
    dto::auth::{LoginRequest, SignupRequest},
    error::{AppError, AppResult},
    ids::short_id,
    models::{Role, StoredUser, User},
    response::{ApiResponse, Meta},
    state::AppState,
    store::{
        SharedStore, StoreError, StoreResult, keys, read_json, read_list, record_str, update_list,
        write_json,
    },
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Local credential checks against the built-in administrator and the
/// `users` list. Passwords are compared in plain text.
pub struct AuthService {
    store: SharedStore,
    admin: StoredUser,
}

impl AuthService {
    pub fn new(store: SharedStore, config: &AppConfig) -> Self {
        let admin = StoredUser {
            user: User {
                id: "default-admin".to_string(),
                email: config.admin_email.clone(),
                name: "Admin".to_string(),
                role: Role::Admin,
            },
            password: config.admin_password.clone(),
        };
        Self { store, admin }
    }

    pub fn current_user(&self) -> Option<User> {
        read_json::<User>(self.store.as_ref(), keys::CURRENT_USER)
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "ignoring unreadable current user");
                None
            })
    }

    pub fn login(&self, email: &str, password: &str) -> AppResult<User> {
        let user = if email == self.admin.user.email && password == self.admin.password {
            self.admin.user.clone()
        } else {
            let users = read_list::<StoredUser>(self.store.as_ref(), keys::USERS)?;
            users
                .items
                .into_iter()
                .find(|u| u.user.email == email && u.password == password)
                .map(|u| u.user)
                .ok_or_else(|| AppError::BadRequest(INVALID_CREDENTIALS.into()))?
        };

        self.set_current(&user)?;
        Ok(user)
    }

    /// Registers an administrator account and logs it in.
    pub fn signup(&self, email: &str, password: &str, name: &str) -> AppResult<User> {
        if email == self.admin.user.email {
            return Err(AppError::BadRequest("Email is already taken".into()));
        }

        let user = update_list(self.store.as_ref(), keys::USERS, |records: &mut Vec<Value>| {
            if records.iter().any(|r| record_str(r, "email") == Some(email)) {
                return Err(AppError::BadRequest("Email is already taken".into()));
            }
            let user = User {
                id: short_id(),
                email: email.to_string(),
                name: name.to_string(),
                role: Role::Admin,
            };
            let record = StoredUser {
                user: user.clone(),
                password: password.to_string(),
            };
            records.push(serde_json::to_value(&record).map_err(StoreError::from)?);
            Ok(user)
        })?;

        self.set_current(&user)?;
        Ok(user)
    }

    pub fn logout(&self) -> StoreResult<()> {
        self.store.remove(keys::CURRENT_USER)
    }

    fn set_current(&self, user: &User) -> StoreResult<()> {
        write_json(self.store.as_ref(), keys::CURRENT_USER, user).map(|_| ())
    }
}

pub async fn signup_user(state: &AppState, payload: SignupRequest) -> AppResult<ApiResponse<User>> {
    let SignupRequest {
        email,
        password,
        name,
    } = payload;
    if email.trim().is_empty() || password.is_empty() || name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "email, password and name are required".into(),
        ));
    }

    let user = state.auth.signup(&email, &password, &name)?;
    log_audit(
        Some(&user),
        "user_signup",
        Some("users"),
        Some(serde_json::json!({ "email": user.email })),
    );
    Ok(ApiResponse::success("User created", user, Some(Meta::empty())))
}

pub async fn login_user(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<User>> {
    let LoginRequest { email, password } = payload;
    let user = state.auth.login(&email, &password)?;
    log_audit(Some(&user), "user_login", Some("users"), None);
    Ok(ApiResponse::success("Logged in", user, Some(Meta::empty())))
}

pub async fn logout_user(state: &AppState) -> AppResult<ApiResponse<serde_json::Value>> {
    let user = state.auth.current_user();
    state.auth.logout()?;
    log_audit(user.as_ref(), "user_logout", Some("users"), None);
    Ok(ApiResponse::success(
        "Logged out",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn me(state: &AppState) -> AppResult<ApiResponse<User>> {
    let user = state.auth.current_user().ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok(user))
}
