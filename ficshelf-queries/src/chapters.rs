use ficshelf_common::models::Chapter;

use crate::{
    conflict_or_database, stories::check_story_if_exists, Connection, Entity, Error, Result,
};

#[derive(Clone, Debug, serde::Deserialize)]
pub struct NewChapter {
    pub title: String,
    pub text: String,
    /// Defaults to one past the story's highest chapter number.
    #[serde(default)]
    pub number: Option<i64>,
}

#[derive(sqlx::FromRow)]
struct ChapterRow {
    id: i64,
    story_id: i64,
    title: String,
    number: i64,
    text: Option<String>,
}

impl From<ChapterRow> for Chapter {
    fn from(row: ChapterRow) -> Self {
        Self {
            id: row.id,
            story_id: row.story_id,
            title: row.title,
            number: row.number,
            text: row.text,
        }
    }
}

/// Inserts the chapter and bumps the story's `num_chapters` on the same connection,
/// run it inside a transaction to keep the two in step.
#[tracing::instrument(skip(conn, new), err)]
pub async fn create(conn: &mut Connection, story_id: i64, new: &NewChapter) -> Result<Chapter> {
    if !check_story_if_exists(&mut *conn, story_id).await? {
        return Err(Error::NotFound(Entity::Story));
    }

    let number = match new.number {
        Some(number) => number,
        None => {
            let highest = sqlx::query_scalar::<_, Option<i64>>(
                "SELECT MAX(number) FROM chapters WHERE story_id = ?",
            )
            .bind(story_id)
            .fetch_one(&mut *conn)
            .await?
            .unwrap_or(0);

            highest.checked_add(1).ok_or_else(|| {
                Error::Conflict(format!(
                    "No chapter number follows {}, pass `number` explicitly",
                    highest
                ))
            })?
        }
    };

    let result =
        sqlx::query("INSERT INTO chapters(story_id, title, number, text) VALUES (?, ?, ?, ?)")
            .bind(story_id)
            .bind(&new.title)
            .bind(number)
            .bind(&new.text)
            .execute(&mut *conn)
            .await
            .map_err(|err| {
                conflict_or_database(err, format!("Chapter number {} already exists", number))
            })?;

    sqlx::query("UPDATE stories SET num_chapters = num_chapters + 1 WHERE id = ?")
        .bind(story_id)
        .execute(&mut *conn)
        .await?;

    tracing::debug!(chapter_id = result.last_insert_rowid(), number, "created chapter");

    Ok(Chapter {
        id: result.last_insert_rowid(),
        story_id,
        title: new.title.clone(),
        number,
        text: Some(new.text.clone()),
    })
}

#[tracing::instrument(skip(conn), err)]
pub async fn get(conn: &mut Connection, story_id: i64, chapter_id: i64) -> Result<Chapter> {
    let chapter = sqlx::query_as::<_, ChapterRow>(
        "SELECT id, story_id, title, number, text FROM chapters WHERE id = ? AND story_id = ?",
    )
    .bind(chapter_id)
    .bind(story_id)
    .fetch_optional(&mut *conn)
    .await?;

    chapter.map(Chapter::from).ok_or(Error::NotFound(Entity::Chapter))
}

/// Lists a story's chapters by number, bodies are only loaded when `with_text` is set.
#[tracing::instrument(skip(conn), err)]
pub async fn list(conn: &mut Connection, story_id: i64, with_text: bool) -> Result<Vec<Chapter>> {
    if !check_story_if_exists(&mut *conn, story_id).await? {
        return Err(Error::NotFound(Entity::Story));
    }

    let query = if with_text {
        "SELECT id, story_id, title, number, text FROM chapters WHERE story_id = ? ORDER BY number"
    } else {
        "SELECT id, story_id, title, number, NULL AS text FROM chapters WHERE story_id = ? ORDER BY number"
    };

    let chapters = sqlx::query_as::<_, ChapterRow>(query)
        .bind(story_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(chapters.into_iter().map(Chapter::from).collect())
}
