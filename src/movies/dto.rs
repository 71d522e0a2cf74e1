use serde::Deserialize;

/// Manual fields win over whatever the metadata lookup returns; a lookup
/// miss leaves them as the only source.
#[derive(Debug, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    pub year: Option<i32>,
    pub director: Option<String>,
    pub genre: Option<String>,
    pub poster_url: Option<String>,
    pub imdb_rating: Option<f64>,
    #[serde(default)]
    pub watched: bool,
    #[serde(default = "default_planned")]
    pub planned: bool,
    #[serde(default)]
    pub favorite: bool,
}

fn default_planned() -> bool {
    true
}

/// Partial update; unspecified fields retain prior values.
#[derive(Debug, Deserialize)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub director: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub poster_url: Option<String>,
    pub imdb_rating: Option<f64>,
}

/// Watch-list flag changes for the acting user's own link.
#[derive(Debug, Deserialize)]
pub struct FlagsRequest {
    pub watched: Option<bool>,
    pub planned: Option<bool>,
    pub favorite: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub title: String,
    pub year: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_flag_defaults() {
        let req: CreateMovieRequest =
            serde_json::from_str(r#"{"title": "Inception"}"#).unwrap();
        assert!(!req.watched);
        assert!(req.planned);
        assert!(!req.favorite);
        assert!(req.year.is_none());
    }
}
