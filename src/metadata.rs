use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Descriptive movie attributes supplied by the lookup collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieFacts {
    pub title: Option<String>,
    pub director: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub poster_url: Option<String>,
    pub imdb_rating: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("metadata service unavailable")]
    Unavailable(#[source] anyhow::Error),
}

/// External movie-metadata collaborator. `Ok(None)` is the not-found
/// signal; `Err` means the collaborator itself could not be reached.
#[async_trait]
pub trait MetadataClient: Send + Sync {
    async fn lookup(&self, title: &str, year: Option<i32>) -> Result<Option<MovieFacts>, MetadataError>;
}

/// Wire shape of an OMDb title lookup.
#[derive(Debug, Deserialize)]
struct OmdbPayload {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Director")]
    director: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Genre")]
    genre: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
}

impl OmdbPayload {
    fn into_facts(self) -> Option<MovieFacts> {
        if self.response != "True" {
            return None;
        }
        Some(MovieFacts {
            title: non_na(self.title),
            director: non_na(self.director),
            year: non_na(self.year).and_then(|y| parse_year(&y)),
            genre: non_na(self.genre),
            poster_url: non_na(self.poster),
            imdb_rating: non_na(self.imdb_rating).and_then(|r| r.parse().ok()),
        })
    }
}

fn non_na(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "N/A")
}

/// OMDb reports series as ranges ("2012–2014"); keep the first year.
fn parse_year(raw: &str) -> Option<i32> {
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

pub struct OmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl MetadataClient for OmdbClient {
    async fn lookup(&self, title: &str, year: Option<i32>) -> Result<Option<MovieFacts>, MetadataError> {
        let mut params = vec![
            ("apikey", self.api_key.clone()),
            ("t", title.to_string()),
        ];
        if let Some(y) = year {
            params.push(("y", y.to_string()));
        }

        let payload: OmdbPayload = self
            .http
            .get(self.base_url.as_str())
            .query(&params)
            .send()
            .await
            .map_err(|e| MetadataError::Unavailable(e.into()))?
            .json()
            .await
            .map_err(|e| MetadataError::Unavailable(e.into()))?;

        let facts = payload.into_facts();
        debug!(title, found = facts.is_some(), "omdb lookup");
        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: serde_json::Value) -> OmdbPayload {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn hit_translates_fields() {
        let facts = payload(serde_json::json!({
            "Response": "True",
            "Title": "Inception",
            "Director": "Christopher Nolan",
            "Year": "2010",
            "Genre": "Sci-Fi",
            "Poster": "https://img.example/inception.jpg",
            "imdbRating": "8.8"
        }))
        .into_facts()
        .expect("hit");

        assert_eq!(facts.title.as_deref(), Some("Inception"));
        assert_eq!(facts.director.as_deref(), Some("Christopher Nolan"));
        assert_eq!(facts.year, Some(2010));
        assert_eq!(facts.genre.as_deref(), Some("Sci-Fi"));
        assert_eq!(facts.imdb_rating, Some(8.8));
    }

    #[test]
    fn miss_is_none() {
        let facts = payload(serde_json::json!({
            "Response": "False",
            "Error": "Movie not found!"
        }))
        .into_facts();
        assert!(facts.is_none());
    }

    #[test]
    fn na_fields_are_dropped() {
        let facts = payload(serde_json::json!({
            "Response": "True",
            "Title": "Obscure",
            "Director": "N/A",
            "Year": "N/A",
            "Genre": "N/A",
            "Poster": "N/A",
            "imdbRating": "N/A"
        }))
        .into_facts()
        .expect("hit");

        assert_eq!(facts.title.as_deref(), Some("Obscure"));
        assert!(facts.director.is_none());
        assert!(facts.year.is_none());
        assert!(facts.imdb_rating.is_none());
    }

    #[test]
    fn ranged_year_keeps_first() {
        assert_eq!(parse_year("2012–2014"), Some(2012));
        assert_eq!(parse_year("2010"), Some(2010));
        assert_eq!(parse_year("unknown"), None);
    }
}
