use axum::{extract::Extension, Json};
use ficshelf_common::models::Story;
use ficshelf_queries::{
    stories::{self, NewStory, StoryChanges},
    Pool,
};

use crate::{
    extract::{Path, Payload, Query},
    Error, Message,
};

#[derive(Debug, serde::Deserialize)]
pub struct GenreFilter {
    genre: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct StoryList {
    pub stories: Vec<Story>,
}

pub async fn create_story(
    Extension(pool): Extension<Pool>,
    Payload(new): Payload<NewStory>,
) -> Result<Json<Message>, Error> {
    let mut trans = ficshelf_queries::begin(&pool).await?;

    let story = stories::create(&mut trans, &new).await?;

    ficshelf_queries::commit(trans).await?;

    tracing::info!(story_id = story.id, author_id = story.author_id, "created story");

    Ok(Json(Message::new("New story created!").with_id(story.id)))
}

pub async fn update_story(
    Extension(pool): Extension<Pool>,
    Path(story_id): Path<i64>,
    Payload(changes): Payload<StoryChanges>,
) -> Result<Json<Story>, Error> {
    let mut trans = ficshelf_queries::begin(&pool).await?;

    let story = stories::update(&mut trans, story_id, &changes).await?;

    ficshelf_queries::commit(trans).await?;

    Ok(Json(story))
}

pub async fn delete_story(
    Extension(pool): Extension<Pool>,
    Path(story_id): Path<i64>,
) -> Result<Json<Message>, Error> {
    let mut trans = ficshelf_queries::begin(&pool).await?;

    stories::delete(&mut trans, story_id).await?;

    ficshelf_queries::commit(trans).await?;

    tracing::info!(story_id, "deleted story");

    Ok(Json(Message::new("Story has been deleted!")))
}

pub async fn list_by_genre(
    Extension(pool): Extension<Pool>,
    Query(filter): Query<GenreFilter>,
) -> Result<Json<StoryList>, Error> {
    let mut trans = ficshelf_queries::begin(&pool).await?;

    let stories = stories::list_by_genre(&mut trans, &filter.genre).await?;

    Ok(Json(StoryList { stories }))
}

pub async fn list_by_author(
    Extension(pool): Extension<Pool>,
    Path(author_id): Path<i64>,
) -> Result<Json<StoryList>, Error> {
    let mut trans = ficshelf_queries::begin(&pool).await?;

    let stories = stories::list_by_author(&mut trans, author_id).await?;

    Ok(Json(StoryList { stories }))
}
