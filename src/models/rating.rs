use serde::{Deserialize, Serialize};

/// Rating summary for a recipe from `GET /recipe/{name}/ratings`.
/// `average_rating` is only meaningful when `rating_count` is non-zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingSummary {
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub rating_count: u64,
    /// The current user's own rating, if they have rated this recipe
    #[serde(default)]
    pub user_rating: Option<u8>,
}

impl RatingSummary {
    pub fn summary_line(&self) -> String {
        if self.rating_count > 0 {
            format!(
                "Average: {:.1} / 5 (from {} ratings)",
                self.average_rating, self.rating_count
            )
        } else {
            "Be the first to rate this recipe!".to_string()
        }
    }

    /// Star row for the detail panel, filled up to the user's rating
    pub fn star_row(&self) -> String {
        let filled = self.user_rating.unwrap_or(0).min(5) as usize;
        let mut row = String::new();
        for i in 0..5 {
            row.push(if i < filled { '★' } else { '☆' });
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line_with_ratings() {
        let summary = RatingSummary {
            average_rating: 4.25,
            rating_count: 7,
            user_rating: Some(5),
        };
        assert_eq!(summary.summary_line(), "Average: 4.2 / 5 (from 7 ratings)");
    }

    #[test]
    fn test_summary_line_unrated() {
        let summary = RatingSummary::default();
        assert_eq!(summary.summary_line(), "Be the first to rate this recipe!");
    }

    #[test]
    fn test_star_row() {
        let summary = RatingSummary {
            average_rating: 3.0,
            rating_count: 1,
            user_rating: Some(3),
        };
        assert_eq!(summary.star_row(), "★★★☆☆");

        let unrated = RatingSummary::default();
        assert_eq!(unrated.star_row(), "☆☆☆☆☆");
    }

    #[test]
    fn test_parse_partial_payload() {
        // Backend omits average_rating/user_rating when nobody has rated yet
        let summary: RatingSummary = serde_json::from_str(r#"{"rating_count": 0}"#).unwrap();
        assert_eq!(summary.rating_count, 0);
        assert_eq!(summary.average_rating, 0.0);
        assert!(summary.user_rating.is_none());
    }
}
