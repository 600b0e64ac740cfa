use ficshelf_common::models::Story;

use crate::{users::check_user_if_exists, Connection, Entity, Error, Result};

#[derive(Clone, Debug, serde::Deserialize)]
pub struct NewStory {
    pub title: String,
    pub author_id: i64,
    pub genre: String,
    #[serde(default)]
    pub summary: String,
}

/// A full replacement of a story's editable fields.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct StoryChanges {
    pub title: String,
    pub author_id: i64,
    pub genre: String,
    pub summary: String,
    pub completed: bool,
}

#[derive(sqlx::FromRow)]
struct StoryRow {
    id: i64,
    author_id: i64,
    title: String,
    genre: String,
    summary: String,
    completed: bool,
    num_chapters: i64,
}

impl From<StoryRow> for Story {
    fn from(row: StoryRow) -> Self {
        Self {
            id: row.id,
            author_id: row.author_id,
            title: row.title,
            genre: row.genre,
            summary: row.summary,
            completed: row.completed,
            num_chapters: row.num_chapters,
        }
    }
}

const SELECT_STORY: &str =
    "SELECT id, author_id, title, genre, summary, completed, num_chapters FROM stories";

#[tracing::instrument(skip(conn, new), fields(author_id = new.author_id), err)]
pub async fn create(conn: &mut Connection, new: &NewStory) -> Result<Story> {
    if !check_user_if_exists(&mut *conn, new.author_id).await? {
        return Err(Error::NotFound(Entity::User));
    }

    let result =
        sqlx::query("INSERT INTO stories(author_id, title, genre, summary) VALUES (?, ?, ?, ?)")
            .bind(new.author_id)
            .bind(&new.title)
            .bind(&new.genre)
            .bind(&new.summary)
            .execute(&mut *conn)
            .await?;

    tracing::debug!(story_id = result.last_insert_rowid(), "created story");

    get(conn, result.last_insert_rowid()).await
}

#[tracing::instrument(skip(conn), err)]
pub async fn check_story_if_exists(conn: &mut Connection, story_id: i64) -> Result<bool> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM stories WHERE id = ?")
        .bind(story_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(existing.is_some())
}

#[tracing::instrument(skip(conn), err)]
pub async fn get(conn: &mut Connection, story_id: i64) -> Result<Story> {
    let story = sqlx::query_as::<_, StoryRow>(&format!("{} WHERE id = ?", SELECT_STORY))
        .bind(story_id)
        .fetch_optional(&mut *conn)
        .await?;

    story.map(Story::from).ok_or(Error::NotFound(Entity::Story))
}

/// Replaces every editable field, `num_chapters` is left as stored.
#[tracing::instrument(skip(conn, changes), err)]
pub async fn update(conn: &mut Connection, story_id: i64, changes: &StoryChanges) -> Result<Story> {
    if !check_story_if_exists(&mut *conn, story_id).await? {
        return Err(Error::NotFound(Entity::Story));
    }

    if !check_user_if_exists(&mut *conn, changes.author_id).await? {
        return Err(Error::NotFound(Entity::User));
    }

    sqlx::query(
        "UPDATE stories SET title = ?, author_id = ?, genre = ?, summary = ?, completed = ? WHERE id = ?",
    )
    .bind(&changes.title)
    .bind(changes.author_id)
    .bind(&changes.genre)
    .bind(&changes.summary)
    .bind(changes.completed)
    .bind(story_id)
    .execute(&mut *conn)
    .await?;

    get(conn, story_id).await
}

/// Deletes the story together with its chapters.
#[tracing::instrument(skip(conn), err)]
pub async fn delete(conn: &mut Connection, story_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM stories WHERE id = ?")
        .bind(story_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(Entity::Story));
    }

    Ok(())
}

#[tracing::instrument(skip(conn), err)]
pub async fn list_by_genre(conn: &mut Connection, genre: &str) -> Result<Vec<Story>> {
    let stories = sqlx::query_as::<_, StoryRow>(&format!(
        "{} WHERE genre = ? ORDER BY id",
        SELECT_STORY
    ))
    .bind(genre)
    .fetch_all(&mut *conn)
    .await?;

    Ok(stories.into_iter().map(Story::from).collect())
}

#[tracing::instrument(skip(conn), err)]
pub async fn list_by_author(conn: &mut Connection, author_id: i64) -> Result<Vec<Story>> {
    if !check_user_if_exists(&mut *conn, author_id).await? {
        return Err(Error::NotFound(Entity::User));
    }

    let stories = sqlx::query_as::<_, StoryRow>(&format!(
        "{} WHERE author_id = ? ORDER BY id",
        SELECT_STORY
    ))
    .bind(author_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(stories.into_iter().map(Story::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_pool,
        users::{self, NewUser},
    };

    async fn author(conn: &mut Connection, penname: &str) -> i64 {
        users::create(
            conn,
            &NewUser {
                penname: penname.into(),
                password: "secret".into(),
            },
        )
        .await
        .unwrap()
        .id
    }

    fn new_story(author_id: i64, genre: &str) -> NewStory {
        NewStory {
            title: "The Long Night".into(),
            author_id,
            genre: genre.into(),
            summary: "It was dark.".into(),
        }
    }

    #[tokio::test]
    async fn create_links_story_to_author() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let author_id = author(&mut conn, "alice").await;
        let story = create(&mut conn, &new_story(author_id, "horror")).await.unwrap();

        assert_eq!(story.author_id, author_id);
        assert!(!story.completed);
        assert_eq!(story.num_chapters, 0);
        assert_eq!(list_by_author(&mut conn, author_id).await.unwrap(), vec![story]);
    }

    #[tokio::test]
    async fn create_with_unknown_author_fails() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let err = create(&mut conn, &new_story(7, "horror")).await.unwrap_err();

        assert!(matches!(err, Error::NotFound(Entity::User)), "got {:?}", err);
    }

    #[tokio::test]
    async fn update_replaces_fields_verbatim() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let alice = author(&mut conn, "alice").await;
        let bob = author(&mut conn, "bob").await;
        let story = create(&mut conn, &new_story(alice, "horror")).await.unwrap();

        let changes = StoryChanges {
            title: "Dawn".into(),
            author_id: bob,
            genre: "romance".into(),
            summary: "It got lighter.".into(),
            completed: true,
        };
        let updated = update(&mut conn, story.id, &changes).await.unwrap();

        assert_eq!(
            updated,
            Story {
                id: story.id,
                author_id: bob,
                title: "Dawn".into(),
                genre: "romance".into(),
                summary: "It got lighter.".into(),
                completed: true,
                num_chapters: 0,
            }
        );
    }

    #[tokio::test]
    async fn update_unknown_story_or_author_is_not_found() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let alice = author(&mut conn, "alice").await;
        let story = create(&mut conn, &new_story(alice, "horror")).await.unwrap();

        let mut changes = StoryChanges {
            title: "Dawn".into(),
            author_id: alice,
            genre: "romance".into(),
            summary: String::new(),
            completed: false,
        };

        assert!(matches!(
            update(&mut conn, story.id + 1, &changes).await,
            Err(Error::NotFound(Entity::Story))
        ));

        changes.author_id = alice + 100;
        assert!(matches!(
            update(&mut conn, story.id, &changes).await,
            Err(Error::NotFound(Entity::User))
        ));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let alice = author(&mut conn, "alice").await;
        let story = create(&mut conn, &new_story(alice, "horror")).await.unwrap();

        delete(&mut conn, story.id).await.unwrap();

        assert!(matches!(get(&mut conn, story.id).await, Err(Error::NotFound(Entity::Story))));
        assert!(matches!(delete(&mut conn, story.id).await, Err(Error::NotFound(Entity::Story))));
    }

    #[tokio::test]
    async fn list_by_genre_filters_exactly() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let alice = author(&mut conn, "alice").await;
        let horror = create(&mut conn, &new_story(alice, "horror")).await.unwrap();
        create(&mut conn, &new_story(alice, "romance")).await.unwrap();

        assert_eq!(list_by_genre(&mut conn, "horror").await.unwrap(), vec![horror]);
        assert!(list_by_genre(&mut conn, "western").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_author_cascades_to_stories() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let alice = author(&mut conn, "alice").await;
        let story = create(&mut conn, &new_story(alice, "horror")).await.unwrap();

        users::delete_by_penname(&mut conn, "alice").await.unwrap();

        assert!(!check_story_if_exists(&mut conn, story.id).await.unwrap());
        assert!(matches!(
            list_by_author(&mut conn, alice).await,
            Err(Error::NotFound(Entity::User))
        ));
    }
}
