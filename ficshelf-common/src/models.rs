#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct User {
    pub id: i64,
    pub public_id: i64,
    pub penname: String,
    /// Stored and returned as given, nothing hashes it.
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Story {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub genre: String,
    pub summary: String,
    pub completed: bool,
    pub num_chapters: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Chapter {
    pub id: i64,
    pub story_id: i64,
    pub title: String,
    pub number: i64,
    /// `None` when only the chapter headings were loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}
