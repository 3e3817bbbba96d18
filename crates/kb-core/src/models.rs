//! # Domain Models
//!
//! The `Thread` and `Post` entities and the fixed `Category` enumeration.
//! Ids are positive integers assigned by the active store; `created_at` is
//! set by the store at insert time and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, Result};

/// Author name used when a request omits the author field or leaves it blank.
pub const ANONYMOUS_AUTHOR: &str = "名無しさん";

/// Closed three-value classification attached to every `Thread`.
///
/// Serialized as the Japanese board names the clients send and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "雑談")]
    Chat,
    #[serde(rename = "ニュース")]
    News,
    #[serde(rename = "プログラミング")]
    Programming,
}

impl Category {
    /// Every recognized category, in display order.
    pub const ALL: [Category; 3] = [Category::Chat, Category::News, Category::Programming];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Chat => "雑談",
            Category::News => "ニュース",
            Category::Programming => "プログラミング",
        }
    }

    /// Interprets a raw `category` query value as a thread filter.
    ///
    /// `None` and the sentinel `"all"` both mean "no filter"; anything else
    /// must be one of the three recognized values.
    pub fn parse_filter(raw: Option<&str>) -> Result<Option<Category>> {
        match raw {
            None | Some("all") => Ok(None),
            Some(value) => value
                .parse::<Category>()
                .map(Some)
                .map_err(|_| AppError::Validation(format!("unknown category: {value}"))),
        }
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "雑談" => Ok(Category::Chat),
            "ニュース" => Ok(Category::News),
            "プログラミング" => Ok(Category::Programming),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A topic-starting record that owns zero or more posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub category: Category,
    /// Opaque reference returned by the upload side-channel, stored verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A reply record belonging to exactly one thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub thread_id: i64,
    pub author: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated insert payload for a thread. Id and timestamp are store-assigned.
#[derive(Debug, Clone)]
pub struct NewThread {
    pub title: String,
    pub author: String,
    pub category: Category,
    pub image_path: Option<String>,
}

/// Validated insert payload for a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub thread_id: i64,
    pub author: String,
    pub body: String,
    pub image_path: Option<String>,
}
