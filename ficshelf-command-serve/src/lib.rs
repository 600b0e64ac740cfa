mod chapters;
mod error;
mod extract;
mod stories;
mod users;

use std::{borrow::Cow, time::Duration};

use axum::{
    error_handling::HandleErrorLayer,
    extract::Extension,
    http::StatusCode,
    routing::{get, post},
    BoxError, Json, Router,
};
use ficshelf_common::{Conf, Context as _};
use ficshelf_queries::Pool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use chapters::StoryChapters;
pub use error::Error;
pub use stories::StoryList;

/// The `{"message": ...}` body every success and error path answers with.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub message: Cow<'static, str>,
    /// Id of the row a create request inserted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl Message {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            id: None,
        }
    }

    pub fn with_id(self, id: i64) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }
}

/// Builds the route table with the store handle made available to every handler.
pub fn router(pool: Pool) -> Router {
    Router::new()
        .route("/user", post(users::create_user))
        .route(
            "/user/{user}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/user/{user}/story", get(stories::list_by_author))
        .route(
            "/story",
            post(stories::create_story).get(stories::list_by_genre),
        )
        .route(
            "/story/{story}",
            get(chapters::list_chapters)
                .put(stories::update_story)
                .delete(stories::delete_story),
        )
        .route("/story/{story}/chapter", post(chapters::create_chapter))
        .route(
            "/story/{story}/chapter/{chapter}",
            get(chapters::get_chapter),
        )
        .layer(Extension(pool))
}

#[tracing::instrument(skip(conf), err)]
pub async fn run(conf: &Conf) -> Result<(), ficshelf_common::Report> {
    let pool = ficshelf_queries::init_database_connection(&conf.database).await?;

    let app = router(pool).layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(|error: BoxError| async move {
                if error.is::<tower::timeout::error::Elapsed>() {
                    (
                        StatusCode::REQUEST_TIMEOUT,
                        Json(Message::new("request timed out")),
                    )
                } else if error.is::<tower::load_shed::error::Overloaded>() {
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        Json(Message::new("server is overloaded")),
                    )
                } else {
                    tracing::error!(error = %error, "unhandled middleware error");

                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(Message::new("internal server error")),
                    )
                }
            }))
            .load_shed()
            .concurrency_limit(1024)
            .timeout(Duration::from_secs(10))
            .layer(TraceLayer::new_for_http())
            .into_inner(),
    );

    let listener = TcpListener::bind(&conf.address)
        .await
        .with_context(|| format!("unable to bind to `{}`", conf.address))?;

    tracing::info!("starting on `{}`", conf.address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(err = ?err, "unable to listen for shutdown signal");

        std::future::pending::<()>().await;
    }
}
