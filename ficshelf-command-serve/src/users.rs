use axum::{extract::Extension, Json};
use ficshelf_common::models::User;
use ficshelf_queries::{
    users::{self, NewUser},
    Entity, Pool,
};

use crate::{
    extract::{Path, Payload},
    Error, Message,
};

pub async fn create_user(
    Extension(pool): Extension<Pool>,
    Payload(new): Payload<NewUser>,
) -> Result<Json<Message>, Error> {
    let mut trans = ficshelf_queries::begin(&pool).await?;

    let user = users::create(&mut trans, &new).await?;

    ficshelf_queries::commit(trans).await?;

    tracing::info!(user_id = user.id, public_id = user.public_id, "created user");

    Ok(Json(Message::new("New user created!")))
}

pub async fn get_user(
    Extension(pool): Extension<Pool>,
    Path(penname): Path<String>,
) -> Result<Json<User>, Error> {
    let mut trans = ficshelf_queries::begin(&pool).await?;

    let user = users::get_by_penname(&mut trans, &penname)
        .await?
        .ok_or(ficshelf_queries::Error::NotFound(Entity::User))?;

    Ok(Json(user))
}

pub async fn update_user(Path(_penname): Path<String>) -> Result<Json<Message>, Error> {
    Err(Error::NotImplemented("Updating a user is not implemented"))
}

pub async fn delete_user(
    Extension(pool): Extension<Pool>,
    Path(penname): Path<String>,
) -> Result<Json<Message>, Error> {
    let mut trans = ficshelf_queries::begin(&pool).await?;

    users::delete_by_penname(&mut trans, &penname).await?;

    ficshelf_queries::commit(trans).await?;

    tracing::info!(%penname, "deleted user");

    Ok(Json(Message::new("User has been deleted!")))
}
