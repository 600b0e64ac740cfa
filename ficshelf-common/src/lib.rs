pub mod models;
pub mod utils;

pub use color_eyre::{
    eyre::{Context, Report},
    install,
};

#[twelf::config]
pub struct Conf {
    /// SQLite database URI
    #[serde(default = "default_database")]
    pub database: String,

    /// Address the web server listens on
    #[serde(default = "default_address")]
    pub address: String,
}

fn default_database() -> String {
    "sqlite://story.db".into()
}

fn default_address() -> String {
    "0.0.0.0:8080".into()
}
