use crate::table::Table;
use crate::util::engagement_rate;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Number, Value};

/// Generate a daily content-performance table ending today.
///
/// One row per day with post counts, views and engagement columns drawn from
/// a seeded generator, so the same seed always produces the same table.
/// Useful for demos and for exercising the analyzer without real data.
pub fn sample_table(days: usize, seed: u64) -> Table {
    let mut rng = StdRng::seed_from_u64(seed);
    let today = Utc::now().date_naive();
    let start = today - Duration::days(days.saturating_sub(1) as i64);

    let mut dates = Vec::with_capacity(days);
    let mut posts_created = Vec::with_capacity(days);
    let mut views = Vec::with_capacity(days);
    let mut likes = Vec::with_capacity(days);
    let mut comments = Vec::with_capacity(days);
    let mut shares = Vec::with_capacity(days);
    let mut rates = Vec::with_capacity(days);

    for offset in 0..days {
        let day = start + Duration::days(offset as i64);
        let day_views = rng.gen_range(100..1000u64);
        let day_likes = rng.gen_range(10..150u64);
        let day_comments = rng.gen_range(0..25u64);
        let day_shares = rng.gen_range(0..12u64);

        dates.push(Value::String(day.format("%Y-%m-%d").to_string()));
        posts_created.push(json!(rng.gen_range(1..10u64)));
        views.push(json!(day_views));
        likes.push(json!(day_likes));
        comments.push(json!(day_comments));
        shares.push(json!(day_shares));

        let rate = engagement_rate(day_likes, day_comments, day_shares, day_views);
        rates.push(Number::from_f64(rate).map(Value::Number).unwrap_or(Value::Null));
    }

    let mut columns = Map::new();
    columns.insert("date".to_string(), Value::Array(dates));
    columns.insert("posts_created".to_string(), Value::Array(posts_created));
    columns.insert("views".to_string(), Value::Array(views));
    columns.insert("likes".to_string(), Value::Array(likes));
    columns.insert("comments".to_string(), Value::Array(comments));
    columns.insert("shares".to_string(), Value::Array(shares));
    columns.insert("engagement_rate".to_string(), Value::Array(rates));

    Table::from_columns(&columns).expect("generated columns are well-formed arrays")
}

/// A small fixed content document in the JSON shape the store persists.
pub fn sample_content_document() -> Value {
    json!({
        "posts": [
            {
                "id": 1,
                "title": "Getting started with content analytics",
                "date": "2024-01-15",
                "views": 1250,
                "likes": 89,
                "comments": 12,
                "shares": 5
            },
            {
                "id": 2,
                "title": "Why engagement beats raw reach",
                "date": "2024-01-20",
                "views": 2100,
                "likes": 156,
                "comments": 23,
                "shares": 12
            },
            {
                "id": 3,
                "title": "Reading a correlation matrix",
                "date": "2024-01-25",
                "views": 1850,
                "likes": 134,
                "comments": 18,
                "shares": 8
            }
        ],
        "metrics": {
            "total_views": 5200,
            "total_engagement": 457,
            "average_engagement_rate": 0.088,
            "growth_rate": 0.15
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::DataType;

    #[test]
    fn test_sample_table_shape() {
        let table = sample_table(30, 42);
        assert_eq!(table.row_count(), 30);
        assert_eq!(
            table.column_names(),
            vec![
                "date",
                "posts_created",
                "views",
                "likes",
                "comments",
                "shares",
                "engagement_rate"
            ]
        );
        assert_eq!(table.column("date").unwrap().data_type(), DataType::Date);
        assert_eq!(table.column("views").unwrap().data_type(), DataType::Numeric);
    }

    #[test]
    fn test_same_seed_reproduces_table() {
        assert_eq!(sample_table(14, 7), sample_table(14, 7));
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = sample_table(14, 1);
        let b = sample_table(14, 2);
        assert_ne!(
            a.column("views").unwrap().as_numeric(),
            b.column("views").unwrap().as_numeric()
        );
    }

    #[test]
    fn test_engagement_rate_is_bounded() {
        let table = sample_table(60, 42);
        let rates = table.column("engagement_rate").unwrap().as_numeric().unwrap();
        // Likes + comments + shares never reach the view count in generated data.
        assert!(rates.iter().flatten().all(|r| (0.0..2.0).contains(r)));
    }

    #[test]
    fn test_sample_document_shape() {
        let doc = sample_content_document();
        assert_eq!(doc["posts"].as_array().unwrap().len(), 3);
        assert!(doc["metrics"]["total_views"].is_number());
    }
}
