use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub title: String,
    pub body: String,
    pub rating: f64,
}

/// Partial update; unspecified fields retain prior values.
#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub rating: Option<f64>,
}
