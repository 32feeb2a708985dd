//! Built-in profile for the fridge sales dataset.

use indexmap::IndexMap;

use super::Profile;
use crate::censor::CensorKind;
use crate::schema::{ColumnSchema, DatasetSchema};

pub const NAME: &str = "default_profile";

/// Fridge sales with customer feedback and ratings.
pub fn default_profile() -> Profile {
    let schema = DatasetSchema::with_columns(vec![
        ColumnSchema::text("ID"),
        ColumnSchema::text("CUSTOMER_ID").censored(CensorKind::Identifier),
        ColumnSchema::text("FRIDGE_MODEL"),
        ColumnSchema::text("BRAND"),
        ColumnSchema::numeric("CAPACITY_LITERS"),
        ColumnSchema::numeric("PRICE"),
        ColumnSchema::date("SALES_DATE"),
        ColumnSchema::text("STORE_NAME"),
        ColumnSchema::text("STORE_ADDRESS").censored(CensorKind::Address),
        ColumnSchema::text("CUSTOMER_FEEDBACK"),
        ColumnSchema::text("FEEDBACK_RATING"),
    ]);

    Profile {
        name: NAME.to_string(),
        description: "Fridge sales data with customer feedback and ratings".to_string(),
        schema,
        system_prompt: "You are a strict JSON spec generator for queries on fridge sales data. \
            Output only a single JSON object with the allowed keys. No prose. No markdown."
            .to_string(),
        hints: [
            "ALWAYS SELECT at least the BRAND, PRICE, and SALES_DATE when the user asks for sales analysis.",
            "If a date window is mentioned, include a date_range filter over SALES_DATE.",
            "Use numeric comparisons for PRICE and CAPACITY_LITERS when applicable.",
            "If grouping is natural (e.g., by BRAND), include group_by and aggregations.",
            "For questions about specific brands, add a filter with op 'eq' on BRAND.",
            "For questions about price ranges, use 'gte' or 'lte' filters on PRICE.",
            "For questions about capacity, filter or group by CAPACITY_LITERS.",
            "For questions about ratings, filter by FEEDBACK_RATING (Positive, Negative, Neutral).",
            "For questions about stores, filter or group by STORE_NAME.",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        example_queries: [
            "What is the average price of Samsung fridges?",
            "Show me the top 5 most expensive fridges sold in 2024",
            "How many fridges were sold by brand?",
            "Which stores had the most sales in January?",
            "What is the distribution of feedback ratings?",
            "Show me all fridges with capacity over 25 liters",
            "What are the average prices by brand and capacity?",
            "Which customers gave negative feedback and what did they buy?",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        stats_columns: pairs(&[
            ("total_sales", "ID"),
            ("average_price", "PRICE"),
            ("brands_count", "BRAND"),
            ("stores_count", "STORE_NAME"),
            ("date_range", "SALES_DATE"),
            ("capacity_range", "CAPACITY_LITERS"),
            ("rating_distribution", "FEEDBACK_RATING"),
        ]),
        language: "en-US".to_string(),
        terminology: pairs(&[
            ("fridge", "refrigerator"),
            ("brand", "manufacturer"),
            ("capacity", "volume"),
            ("price", "cost"),
            ("sales", "purchases"),
            ("customer", "buyer"),
            ("feedback", "review"),
            ("rating", "score"),
            ("store", "retailer"),
            ("model", "product"),
        ]),
        data_path: Some("data/fridge_sales_with_rating.csv".into()),
        sample_rows: super::DEFAULT_SAMPLE_ROWS,
    }
}

fn pairs(items: &[(&str, &str)]) -> IndexMap<String, String> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
