use axum::{extract::Extension, Json};
use ficshelf_common::models::{Chapter, Story};
use ficshelf_queries::{
    chapters::{self, NewChapter},
    stories, Pool,
};

use crate::{
    extract::{Path, Payload, Query},
    Error, Message,
};

#[derive(Debug, Default, serde::Deserialize)]
pub struct ChapterListing {
    /// Include each chapter's text, not just its heading
    #[serde(default)]
    show_all: bool,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct StoryChapters {
    pub story: Story,
    pub chapters: Vec<Chapter>,
}

pub async fn create_chapter(
    Extension(pool): Extension<Pool>,
    Path(story_id): Path<i64>,
    Payload(new): Payload<NewChapter>,
) -> Result<Json<Message>, Error> {
    let mut trans = ficshelf_queries::begin(&pool).await?;

    let chapter = chapters::create(&mut trans, story_id, &new).await?;

    ficshelf_queries::commit(trans).await?;

    tracing::info!(story_id, chapter_id = chapter.id, number = chapter.number, "created chapter");

    Ok(Json(Message::new("New chapter created!").with_id(chapter.id)))
}

pub async fn get_chapter(
    Extension(pool): Extension<Pool>,
    Path((story_id, chapter_id)): Path<(i64, i64)>,
) -> Result<Json<Chapter>, Error> {
    let mut trans = ficshelf_queries::begin(&pool).await?;

    let chapter = chapters::get(&mut trans, story_id, chapter_id).await?;

    Ok(Json(chapter))
}

pub async fn list_chapters(
    Extension(pool): Extension<Pool>,
    Path(story_id): Path<i64>,
    Query(listing): Query<ChapterListing>,
) -> Result<Json<StoryChapters>, Error> {
    let mut trans = ficshelf_queries::begin(&pool).await?;

    let story = stories::get(&mut trans, story_id).await?;
    let chapters = chapters::list(&mut trans, story_id, listing.show_all).await?;

    Ok(Json(StoryChapters { story, chapters }))
}
