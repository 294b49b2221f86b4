//! Profiles of a user: the owner profile plus any family members or
//! entities the user manages.

use chrono::{DateTime, Utc};
use common::{CreateProfileRequest, ProfileDto, UpdateProfileRequest};
use model::entities::profile;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{LedgerError, Result};
use crate::gate::authorize_profile;
use crate::input::non_empty;

pub fn profile_dto(model: profile::Model) -> ProfileDto {
    ProfileDto {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        avatar_color: model.avatar_color,
        is_owner: model.is_owner,
        created_at: model.created_at,
    }
}

/// Owner first, then alphabetical.
pub async fn owned_profiles<C>(db: &C, user_id: i32) -> Result<Vec<profile::Model>>
where
    C: ConnectionTrait,
{
    let profiles = profile::Entity::find()
        .filter(profile::Column::UserId.eq(user_id))
        .order_by_desc(profile::Column::IsOwner)
        .order_by_asc(profile::Column::Name)
        .order_by_asc(profile::Column::Id)
        .all(db)
        .await?;
    Ok(profiles)
}

#[instrument(skip(db))]
pub async fn list_profiles(db: &DatabaseConnection, user_id: i32) -> Result<Vec<ProfileDto>> {
    let profiles = owned_profiles(db, user_id).await?;
    debug!("Retrieved {} profiles for user {}", profiles.len(), user_id);
    Ok(profiles.into_iter().map(profile_dto).collect())
}

#[instrument(skip(db, request))]
pub async fn create_profile(
    db: &DatabaseConnection,
    user_id: i32,
    request: &CreateProfileRequest,
    now: DateTime<Utc>,
) -> Result<ProfileDto> {
    let name = non_empty(Some(&request.name))
        .ok_or_else(|| LedgerError::InvalidInput("name is required".to_string()))?;
    let avatar_color = non_empty(request.avatar_color.as_deref())
        .unwrap_or_else(|| profile::DEFAULT_AVATAR_COLOR.to_string());

    let created = profile::ActiveModel {
        user_id: Set(user_id),
        name: Set(name),
        avatar_color: Set(avatar_color),
        is_owner: Set(false),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created profile {} for user {}", created.id, user_id);
    Ok(profile_dto(created))
}

pub async fn get_profile(db: &DatabaseConnection, user_id: i32, profile_id: i32) -> Result<ProfileDto> {
    authorize_profile(db, user_id, profile_id).await.map(profile_dto)
}

/// Empty strings keep the stored value.
#[instrument(skip(db, request))]
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: i32,
    profile_id: i32,
    request: &UpdateProfileRequest,
) -> Result<ProfileDto> {
    let existing = authorize_profile(db, user_id, profile_id).await?;

    let mut active: profile::ActiveModel = existing.clone().into();
    if let Some(name) = non_empty(request.name.as_deref()) {
        active.name = Set(name);
    }
    if let Some(color) = non_empty(request.avatar_color.as_deref()) {
        active.avatar_color = Set(color);
    }

    if !active.is_changed() {
        debug!("Nothing to update for profile {}", profile_id);
        return Ok(profile_dto(existing));
    }

    let updated = active.update(db).await?;
    info!("Updated profile {}", updated.id);
    Ok(profile_dto(updated))
}

/// Removes a non-owner profile and everything under it.
#[instrument(skip(db))]
pub async fn delete_profile(db: &DatabaseConnection, user_id: i32, profile_id: i32) -> Result<()> {
    let existing = authorize_profile(db, user_id, profile_id).await?;

    if existing.is_owner {
        warn!("Refusing to delete owner profile {}", profile_id);
        return Err(LedgerError::Forbidden("cannot delete owner profile".to_string()));
    }

    let result = profile::Entity::delete_by_id(profile_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(LedgerError::NotFound("profile not found".to_string()));
    }

    info!("Deleted profile {}", profile_id);
    Ok(())
}
