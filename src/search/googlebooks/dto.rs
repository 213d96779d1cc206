//! Google Books API Data Transfer Objects
//!
//! These types match EXACTLY what the Google Books volumes API returns.
//! DO NOT add fields that aren't in the API response.
//! DO NOT use these types outside the googlebooks module - convert to domain types.
//!
//! API Reference: https://developers.google.com/books/docs/v1/using
//!
//! We use the /volumes search endpoint with `isbn:`/`intitle:`/`inauthor:`
//! operators in the `q` parameter.

use serde::{Deserialize, Serialize};

/// Top-level volumes search response
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumesResponse {
    /// Total number of matching volumes (not the page size)
    #[serde(default)]
    pub total_items: u64,
    /// The result page; absent entirely when nothing matched
    #[serde(default)]
    pub items: Vec<Volume>,
}

/// One volume in the search results
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Google volume ID
    pub id: Option<String>,
    /// The actual book metadata; occasionally missing on damaged records
    pub volume_info: Option<VolumeInfo>,
}

/// Book metadata for a volume
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    /// Volume title
    pub title: Option<String>,
    /// Author names
    #[serde(default)]
    pub authors: Vec<String>,
    /// Publisher name
    pub publisher: Option<String>,
    /// Publication date: "YYYY", "YYYY-MM" or "YYYY-MM-DD"
    pub published_date: Option<String>,
    /// Description / synopsis
    pub description: Option<String>,
    /// ISBN and other identifiers
    #[serde(default)]
    pub industry_identifiers: Vec<IndustryIdentifier>,
    /// Number of pages
    pub page_count: Option<u32>,
    /// Category labels
    #[serde(default)]
    pub categories: Vec<String>,
    /// Average user rating (1.0 - 5.0)
    pub average_rating: Option<f64>,
    /// Number of ratings
    pub ratings_count: Option<u32>,
    /// Cover image links
    pub image_links: Option<ImageLinks>,
}

/// A volume identifier (ISBN_10, ISBN_13, ISSN, OTHER)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryIdentifier {
    /// Identifier type
    #[serde(rename = "type")]
    pub id_type: Option<String>,
    /// The identifier value
    pub identifier: Option<String>,
}

/// Cover image links (served as http:// URLs, normalized in the adapter)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub thumbnail: Option<String>,
    pub small_thumbnail: Option<String>,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================

#[cfg(test)]
mod contract_tests {
    use super::*;

    /// The API omits `items` entirely for zero-result queries
    #[test]
    fn test_parse_no_items() {
        let json = r#"{"kind": "books#volumes", "totalItems": 0}"#;

        let response: VolumesResponse =
            serde_json::from_str(json).expect("Should parse response without items");

        assert_eq!(response.total_items, 0);
        assert!(response.items.is_empty());
    }

    /// Test parsing a representative volume
    #[test]
    fn test_parse_full_volume() {
        let json = r#"{
            "totalItems": 1,
            "items": [{
                "id": "wrOQLV6xB-wC",
                "volumeInfo": {
                    "title": "Harry Potter and the Sorcerer's Stone",
                    "authors": ["J.K. Rowling"],
                    "publisher": "Pottermore Publishing",
                    "publishedDate": "2015-12-08",
                    "description": "Turning the envelope over...",
                    "industryIdentifiers": [
                        {"type": "ISBN_10", "identifier": "1781100489"},
                        {"type": "ISBN_13", "identifier": "9781781100486"}
                    ],
                    "pageCount": 309,
                    "categories": ["Juvenile Fiction"],
                    "averageRating": 4.5,
                    "ratingsCount": 2337,
                    "imageLinks": {
                        "smallThumbnail": "http://books.google.com/books/content?id=wrOQLV6xB-wC&zoom=5",
                        "thumbnail": "http://books.google.com/books/content?id=wrOQLV6xB-wC&zoom=1"
                    }
                }
            }]
        }"#;

        let response: VolumesResponse =
            serde_json::from_str(json).expect("Should parse full volume");

        let info = response.items[0].volume_info.as_ref().unwrap();
        assert_eq!(
            info.title.as_deref(),
            Some("Harry Potter and the Sorcerer's Stone")
        );
        assert_eq!(info.authors, vec!["J.K. Rowling"]);
        assert_eq!(info.published_date.as_deref(), Some("2015-12-08"));
        assert_eq!(info.industry_identifiers.len(), 2);
        assert_eq!(
            info.industry_identifiers[1].id_type.as_deref(),
            Some("ISBN_13")
        );
        assert_eq!(info.page_count, Some(309));
        assert_eq!(info.average_rating, Some(4.5));
        assert!(
            info.image_links
                .as_ref()
                .unwrap()
                .thumbnail
                .as_ref()
                .unwrap()
                .starts_with("http://")
        );
    }

    /// Volumes with missing volumeInfo parse without error
    #[test]
    fn test_parse_volume_without_info() {
        let json = r#"{"totalItems": 1, "items": [{"id": "abc"}]}"#;

        let response: VolumesResponse =
            serde_json::from_str(json).expect("Should parse bare volume");

        assert!(response.items[0].volume_info.is_none());
    }
}
