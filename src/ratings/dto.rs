use serde::Deserialize;

use crate::error::AppError;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;
const MAX_REVIEW_LEN: usize = 2000;

#[derive(Debug, Clone, Deserialize)]
pub struct RateRequest {
    pub rating: i32,
    #[serde(default)]
    pub review: Option<String>,
}

impl RateRequest {
    /// Validates the value and trims the review; a blank review becomes `None`.
    pub fn validated(self) -> Result<(i32, Option<String>), AppError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(AppError::validation(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }
        let review = self
            .review
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if review.as_ref().is_some_and(|r| r.chars().count() > MAX_REVIEW_LEN) {
            return Err(AppError::validation("review is too long"));
        }
        Ok((self.rating, review))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_values() {
        for bad in [0, 6, -1] {
            let req = RateRequest { rating: bad, review: None };
            assert!(req.validated().is_err());
        }
        let req = RateRequest {
            rating: 5,
            review: Some("   ".into()),
        };
        assert_eq!(req.validated().unwrap(), (5, None));
    }
}
