use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    Json,
};
use ficshelf_queries::{chapters::NewChapter, stories::NewStory, stories::StoryChanges, users::NewUser};
use serde::de::DeserializeOwned;

use crate::Error;

/// Checks a deserialized body beyond what its schema already guarantees.
pub trait Validate {
    fn validate(&self) -> Result<(), Error>;
}

/// A JSON body that has been read into `T` and validated.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;

        value.validate()?;

        Ok(Self(value))
    }
}

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Path<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct Query<T>(pub T);

fn require(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::Malformed(format!("`{}` must not be empty", field)));
    }

    Ok(())
}

impl Validate for NewUser {
    fn validate(&self) -> Result<(), Error> {
        require("penname", &self.penname)?;
        require("password", &self.password)
    }
}

impl Validate for NewStory {
    fn validate(&self) -> Result<(), Error> {
        require("title", &self.title)?;
        require("genre", &self.genre)
    }
}

impl Validate for StoryChanges {
    fn validate(&self) -> Result<(), Error> {
        require("title", &self.title)?;
        require("genre", &self.genre)
    }
}

impl Validate for NewChapter {
    fn validate(&self) -> Result<(), Error> {
        require("title", &self.title)?;

        match self.number {
            Some(number) if number < 1 => Err(Error::Malformed(format!(
                "`number` must be at least 1, got {}",
                number
            ))),
            _ => Ok(()),
        }
    }
}
