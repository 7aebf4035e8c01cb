use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HomeFinanceError;
use crate::types::Money;
use crate::HomeFinanceResult;

/// Default excerpt length when a post is published without one.
pub const EXCERPT_CHARS: usize = 160;

/// Listing categories offered by the post editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostCategory {
    Investment,
    Design,
    #[serde(rename = "Market Analysis")]
    MarketAnalysis,
}

impl fmt::Display for PostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PostCategory::Investment => "Investment",
            PostCategory::Design => "Design",
            PostCategory::MarketAnalysis => "Market Analysis",
        };
        f.write_str(s)
    }
}

impl FromStr for PostCategory {
    type Err = HomeFinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Investment" => Ok(PostCategory::Investment),
            "Design" => Ok(PostCategory::Design),
            "Market Analysis" => Ok(PostCategory::MarketAnalysis),
            other => Err(HomeFinanceError::invalid(
                "category",
                format!("Unknown category '{other}'"),
            )),
        }
    }
}

/// A property post as stored in the `blog_posts` table.
///
/// Property details are null on posts created without them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyPost {
    pub id: String,
    pub title: String,
    /// Markdown body
    pub content: String,
    pub excerpt: String,
    pub image_url: String,
    pub category: PostCategory,
    pub created_at: DateTime<Utc>,
    pub author_id: String,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<Decimal>,
    #[serde(default)]
    pub sqft: Option<u32>,
}

/// Fields a post author can change in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostField {
    Title,
    Content,
    Excerpt,
    ImageUrl,
    Category,
    Price,
    Location,
    Bedrooms,
    Bathrooms,
    Sqft,
}

impl FromStr for PostField {
    type Err = HomeFinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.trim() {
            "title" => PostField::Title,
            "content" => PostField::Content,
            "excerpt" => PostField::Excerpt,
            "image_url" => PostField::ImageUrl,
            "category" => PostField::Category,
            "price" => PostField::Price,
            "location" => PostField::Location,
            "bedrooms" => PostField::Bedrooms,
            "bathrooms" => PostField::Bathrooms,
            "sqft" => PostField::Sqft,
            other => {
                return Err(HomeFinanceError::invalid(
                    "field",
                    format!("'{other}' is not an editable post field"),
                ))
            }
        };
        Ok(field)
    }
}

impl PropertyPost {
    /// Set one field from the raw form value. A blank value clears a property detail.
    pub fn set_field(&mut self, field: PostField, value: &str) -> HomeFinanceResult<()> {
        match field {
            PostField::Title => self.title = value.to_string(),
            PostField::Content => self.content = value.to_string(),
            PostField::Excerpt => self.excerpt = value.to_string(),
            PostField::ImageUrl => self.image_url = value.trim().to_string(),
            PostField::Category => self.category = value.parse()?,
            PostField::Location => self.location = optional_text(value),
            PostField::Price => self.price = parse_optional("price", value)?,
            PostField::Bedrooms => self.bedrooms = parse_optional("bedrooms", value)?,
            PostField::Bathrooms => self.bathrooms = parse_optional("bathrooms", value)?,
            PostField::Sqft => self.sqft = parse_optional("sqft", value)?,
        }
        Ok(())
    }

    /// Checks a post must pass before it is written back.
    pub fn validate(&self) -> HomeFinanceResult<()> {
        if self.title.trim().is_empty() {
            return Err(HomeFinanceError::invalid("title", "Title is required"));
        }
        if self.content.trim().is_empty() {
            return Err(HomeFinanceError::invalid("content", "Content is required"));
        }
        if self.price.is_some_and(|p| p < Decimal::ZERO) {
            return Err(HomeFinanceError::invalid("price", "Price cannot be negative"));
        }
        if self.bathrooms.is_some_and(|b| b < Decimal::ZERO) {
            return Err(HomeFinanceError::invalid(
                "bathrooms",
                "Bathrooms cannot be negative",
            ));
        }
        Ok(())
    }

    /// Excerpt to show on the listing index.
    pub fn summary(&self) -> String {
        if self.excerpt.trim().is_empty() {
            excerpt_from(&self.content, EXCERPT_CHARS)
        } else {
            self.excerpt.clone()
        }
    }
}

/// Form data for a brand-new post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    pub content: String,
    #[serde(default)]
    pub image_url: String,
    pub category: PostCategory,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<Decimal>,
    #[serde(default)]
    pub sqft: Option<u32>,
}

impl NewPost {
    /// Turn the form into a stored post owned by `author_id`.
    pub fn publish(
        self,
        id: impl Into<String>,
        author_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> HomeFinanceResult<PropertyPost> {
        let excerpt = if self.excerpt.trim().is_empty() {
            excerpt_from(&self.content, EXCERPT_CHARS)
        } else {
            self.excerpt
        };
        let post = PropertyPost {
            id: id.into(),
            title: self.title,
            content: self.content,
            excerpt,
            image_url: self.image_url,
            category: self.category,
            created_at,
            author_id: author_id.into(),
            price: self.price,
            location: self.location,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            sqft: self.sqft,
        };
        post.validate()?;
        Ok(post)
    }
}

/// Plain-text excerpt of a markdown body, cut on a word boundary.
pub fn excerpt_from(content: &str, max_chars: usize) -> String {
    let plain: String = content
        .lines()
        .map(|line| line.trim_start_matches(['#', '>', '-', '*', ' ']))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace(['*', '_', '`'], "");

    if plain.chars().count() <= max_chars {
        return plain;
    }

    let cut: String = plain.chars().take(max_chars).collect();
    let trimmed = match cut.rfind(' ') {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}…", trimmed.trim_end_matches([',', '.', ';', ':']))
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_optional<T: FromStr>(field: &str, value: &str) -> HomeFinanceResult<Option<T>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse::<T>().map(Some).map_err(|_| {
        HomeFinanceError::invalid(field, format!("'{value}' is not a valid number"))
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    pub(crate) fn sample_post() -> PropertyPost {
        PropertyPost {
            id: "post-1".into(),
            title: "Craftsman bungalow near the park".into(),
            content: "## Overview\nThree bedrooms, **renovated** kitchen.".into(),
            excerpt: String::new(),
            image_url: "https://images.example.com/bungalow.jpg".into(),
            category: PostCategory::Investment,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            author_id: "agent-7".into(),
            price: Some(dec!(525000)),
            location: Some("Maple Grove".into()),
            bedrooms: Some(3),
            bathrooms: Some(dec!(2.5)),
            sqft: Some(1850),
        }
    }

    #[test]
    fn test_set_numeric_fields() {
        let mut post = sample_post();
        post.set_field(PostField::Price, "499000").unwrap();
        post.set_field(PostField::Bathrooms, " 3 ").unwrap();
        post.set_field(PostField::Sqft, "2000").unwrap();
        assert_eq!(post.price, Some(dec!(499000)));
        assert_eq!(post.bathrooms, Some(dec!(3)));
        assert_eq!(post.sqft, Some(2000));
    }

    #[test]
    fn test_blank_value_clears_detail() {
        let mut post = sample_post();
        post.set_field(PostField::Price, "  ").unwrap();
        post.set_field(PostField::Location, "").unwrap();
        assert_eq!(post.price, None);
        assert_eq!(post.location, None);
        assert!(post.validate().is_ok());
    }

    #[test]
    fn test_row_without_property_details_loads() {
        let row = serde_json::json!({
            "id": "post-9",
            "title": "Spring market update",
            "content": "Inventory is up.",
            "excerpt": "Inventory is up.",
            "image_url": "",
            "category": "Market Analysis",
            "created_at": "2024-04-10T15:00:00Z",
            "author_id": "agent-7",
            "price": null,
            "location": null,
            "bedrooms": null,
            "bathrooms": null,
            "sqft": null
        });
        let post: PropertyPost = serde_json::from_value(row).unwrap();
        assert_eq!(post.price, None);
        assert_eq!(post.location, None);
        assert_eq!(post.bedrooms, None);
        assert_eq!(post.bathrooms, None);
        assert_eq!(post.sqft, None);
        assert!(post.validate().is_ok());
    }

    #[test]
    fn test_set_bad_number_rejected() {
        let mut post = sample_post();
        let err = post.set_field(PostField::Bedrooms, "three").unwrap_err();
        match err {
            HomeFinanceError::InvalidInput { field, .. } => assert_eq!(field, "bedrooms"),
            e => panic!("Expected InvalidInput, got {e:?}"),
        }
        assert_eq!(post.bedrooms, Some(3));
    }

    #[test]
    fn test_category_round_trip_names() {
        let mut post = sample_post();
        post.set_field(PostField::Category, "Market Analysis").unwrap();
        assert_eq!(post.category, PostCategory::MarketAnalysis);
        assert_eq!(post.category.to_string(), "Market Analysis");
        assert!(post.set_field(PostField::Category, "Gossip").is_err());
    }

    #[test]
    fn test_field_names_parse() {
        assert_eq!("image_url".parse::<PostField>().unwrap(), PostField::ImageUrl);
        assert!("author_id".parse::<PostField>().is_err());
    }

    #[test]
    fn test_validate_requires_title() {
        let mut post = sample_post();
        post.title = "   ".into();
        assert!(post.validate().is_err());
    }

    #[test]
    fn test_summary_falls_back_to_content() {
        let post = sample_post();
        assert_eq!(post.summary(), "Overview Three bedrooms, renovated kitchen.");
    }

    #[test]
    fn test_excerpt_cuts_on_word_boundary() {
        let text = "Sunny corner lot with mature trees and a detached garage";
        assert_eq!(excerpt_from(text, 20), "Sunny corner lot…");
    }

    #[test]
    fn test_publish_fills_excerpt() {
        let form = NewPost {
            title: "Loft downtown".into(),
            excerpt: String::new(),
            content: "Open plan loft.".into(),
            image_url: String::new(),
            category: PostCategory::Design,
            price: Some(dec!(350000)),
            location: Some("Downtown".into()),
            bedrooms: Some(1),
            bathrooms: Some(dec!(1)),
            sqft: Some(900),
        };
        let created = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        let post = form.publish("post-2", "agent-7", created).unwrap();
        assert_eq!(post.excerpt, "Open plan loft.");
        assert_eq!(post.author_id, "agent-7");
    }
}
