use ficshelf_common::{models::User, utils};

use crate::{unique_violation, Connection, Entity, Error, Result};

const PUBLIC_ID_ATTEMPTS: usize = 16;

#[derive(Clone, Debug, serde::Deserialize)]
pub struct NewUser {
    pub penname: String,
    pub password: String,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    public_id: i64,
    penname: String,
    password: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            public_id: row.public_id,
            penname: row.penname,
            password: row.password,
        }
    }
}

#[tracing::instrument(skip(conn, new), fields(penname = %new.penname), err)]
pub async fn create(conn: &mut Connection, new: &NewUser) -> Result<User> {
    if get_by_penname(&mut *conn, &new.penname).await?.is_some() {
        return Err(Error::Conflict(format!(
            "Penname `{}` is already taken",
            new.penname
        )));
    }

    let public_id = unused_public_id(&mut *conn, utils::public_id).await?;

    insert(conn, public_id, new).await
}

async fn insert(conn: &mut Connection, public_id: i64, new: &NewUser) -> Result<User> {
    let result = sqlx::query("INSERT INTO users(public_id, penname, password) VALUES (?, ?, ?)")
        .bind(public_id)
        .bind(&new.penname)
        .bind(&new.password)
        .execute(&mut *conn)
        .await
        .map_err(|err| match unique_violation(&err) {
            Some(message) if message.contains("users.public_id") => {
                Error::Conflict(format!("Public id {} is already taken", public_id))
            }
            Some(_) => Error::Conflict(format!("Penname `{}` is already taken", new.penname)),
            None => Error::Database(err),
        })?;

    tracing::debug!(user_id = result.last_insert_rowid(), "created user");

    Ok(User {
        id: result.last_insert_rowid(),
        public_id,
        penname: new.penname.clone(),
        password: new.password.clone(),
    })
}

/// Draws ids from `generate` until one is free in `users`.
#[tracing::instrument(skip(conn, generate), err)]
async fn unused_public_id(
    conn: &mut Connection,
    mut generate: impl FnMut() -> i64,
) -> Result<i64> {
    for _ in 0..PUBLIC_ID_ATTEMPTS {
        let public_id = generate();

        let taken: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users WHERE public_id = ?")
            .bind(public_id)
            .fetch_one(&mut *conn)
            .await?;

        if taken == 0 {
            return Ok(public_id);
        }

        tracing::debug!(public_id, "public id collision, retrying");
    }

    Err(Error::Conflict("Unable to allocate a public id".into()))
}

#[tracing::instrument(skip(conn), err)]
pub async fn get_by_penname(conn: &mut Connection, penname: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, UserRow>(
        "SELECT id, public_id, penname, password FROM users WHERE penname = ?",
    )
    .bind(penname)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(user.map(User::from))
}

#[tracing::instrument(skip(conn), err)]
pub async fn check_user_if_exists(conn: &mut Connection, user_id: i64) -> Result<bool> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(existing.is_some())
}

/// Deletes the user together with their stories and chapters.
#[tracing::instrument(skip(conn), err)]
pub async fn delete_by_penname(conn: &mut Connection, penname: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM users WHERE penname = ?")
        .bind(penname)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(Entity::User));
    }

    Ok(())
}
