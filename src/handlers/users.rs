use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::auth::{CredentialService, Identity};
use crate::error::{AppError, EMAIL_TAKEN};
use crate::models::{
    AccountInput, AuthResponse, LoginInput, ProfileUpdate, PublicUser, RegisterInput, Role, User,
};
use crate::store::{RecordStore, USER_SEQUENCE};
use crate::validation;

/// Shared by self-registration and admin-created sellers.
async fn create_account(
    store: &dyn RecordStore,
    credentials: &CredentialService,
    account: AccountInput,
    role: Role,
) -> Result<User, AppError> {
    if store.find_user_by_email(&account.email).await?.is_some() {
        return Err(AppError::Validation(EMAIL_TAKEN.into()));
    }

    let password = credentials.hash_password(&account.password)?;
    let now = Utc::now();
    let user = User {
        id: store.next_id(USER_SEQUENCE).await?,
        name: account.name,
        email: account.email,
        password,
        phone: account.phone,
        address: account.address,
        pincode: account.pincode,
        user_type: role,
        created_at: now,
        updated_at: now,
    };
    store.insert_user(&user).await?;

    log::info!("created {} account {}", user.user_type, user.id);
    Ok(user)
}

pub async fn register(
    store: web::Data<dyn RecordStore>,
    credentials: web::Data<CredentialService>,
    input: web::Json<RegisterInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    let role = validation::validate_registration(&input)?;
    create_account(store.get_ref(), &credentials, input.account, role).await?;

    Ok(HttpResponse::Created().json(json!({ "message": "User created successfully" })))
}

pub async fn login(
    store: web::Data<dyn RecordStore>,
    credentials: web::Data<CredentialService>,
    input: web::Json<LoginInput>,
) -> Result<HttpResponse, AppError> {
    let invalid = || AppError::Unauthenticated("Invalid credentials".into());
    let user = match store.find_user_by_email(&input.email).await? {
        Some(user) => user,
        None => {
            // Same hashing cost as a wrong password for an existing account.
            credentials.reject_unknown(&input.password);
            return Err(invalid());
        }
    };
    if !credentials.verify_password(&input.password, &user.password) {
        return Err(invalid());
    }

    let token = credentials.issue_token(user.id, user.user_type)?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user_type: user.user_type,
    }))
}

async fn current_user(store: &dyn RecordStore, identity: &Identity) -> Result<User, AppError> {
    store
        .find_user(identity.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

pub async fn get_profile(
    store: web::Data<dyn RecordStore>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    let user = current_user(store.get_ref(), &identity).await?;
    Ok(HttpResponse::Ok().json(PublicUser::from(&user)))
}

/// Role and id are fixed; a new password is hashed before it is stored.
pub async fn update_profile(
    store: web::Data<dyn RecordStore>,
    credentials: web::Data<CredentialService>,
    identity: Identity,
    input: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
    let update = input.into_inner();
    validation::validate_profile_update(&update)?;
    let mut user = current_user(store.get_ref(), &identity).await?;

    if let Some(email) = update.email {
        if email != user.email {
            if store.find_user_by_email(&email).await?.is_some() {
                return Err(AppError::Validation(EMAIL_TAKEN.into()));
            }
            user.email = email;
        }
    }
    if let Some(password) = update.password {
        user.password = credentials.hash_password(&password)?;
    }
    if let Some(name) = update.name {
        user.name = name;
    }
    if let Some(phone) = update.phone {
        user.phone = phone;
    }
    if let Some(address) = update.address {
        user.address = address;
    }
    if let Some(pincode) = update.pincode {
        user.pincode = pincode;
    }
    user.updated_at = Utc::now();

    if !store.replace_user(&user).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    Ok(HttpResponse::Ok().json(PublicUser::from(&user)))
}

pub async fn create_seller(
    store: web::Data<dyn RecordStore>,
    credentials: web::Data<CredentialService>,
    input: web::Json<AccountInput>,
) -> Result<HttpResponse, AppError> {
    let account = input.into_inner();
    validation::validate_account(&account)?;
    let seller = create_account(store.get_ref(), &credentials, account, Role::Seller).await?;

    Ok(HttpResponse::Created().json(PublicUser::from(&seller)))
}
