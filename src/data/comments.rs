//! Comment rows, theme keys and the sentiment split.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Sentiment polarity analysed per theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 2] = [Sentiment::Positive, Sentiment::Negative];

    pub fn label(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which theme column a [`ThemeKey`] filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ThemeKind {
    #[serde(rename = "base_theme", alias = "base")]
    Base,
    #[serde(rename = "sub_theme", alias = "sub")]
    Sub,
}

impl ThemeKind {
    pub const ALL: [ThemeKind; 2] = [ThemeKind::Base, ThemeKind::Sub];

    /// Store column holding this kind of theme; also the key prefix.
    pub fn column(self) -> &'static str {
        match self {
            Self::Base => "base_theme",
            Self::Sub => "sub_theme",
        }
    }
}

impl fmt::Display for ThemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for ThemeKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "base" | "base_theme" => Ok(Self::Base),
            "sub" | "sub_theme" => Ok(Self::Sub),
            other => Err(format!("unknown theme kind `{other}`")),
        }
    }
}

/// One unit of analysis: a theme value under a given column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThemeKey {
    pub kind: ThemeKind,
    pub name: String,
}

impl ThemeKey {
    pub fn new(kind: ThemeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Lookup key in the persisted insight table, e.g. `base_theme_pay`.
    pub fn table_key(&self) -> String {
        format!("{}_{}", self.kind.column(), self.name)
    }
}

impl fmt::Display for ThemeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.column(), self.name)
    }
}

/// Read-only comment as returned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default, rename = "likes", alias = "engagement_score")]
    pub engagement_score: Option<i64>,
}

impl Comment {
    pub fn new(content: impl Into<String>, sentiment: Option<&str>, likes: Option<i64>) -> Self {
        Self {
            content: content.into(),
            sentiment: sentiment.map(str::to_string),
            engagement_score: likes,
        }
    }
}

/// Engagement thresholds used when a comment carries no sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentPolicy {
    /// Unlabeled comments scoring strictly above this count as positive.
    pub positive_above: i64,
    /// Unlabeled comments scoring strictly below this count as negative.
    pub negative_below: i64,
}

impl Default for SentimentPolicy {
    fn default() -> Self {
        Self {
            positive_above: 5,
            negative_below: -5,
        }
    }
}

impl SentimentPolicy {
    pub fn classify(&self, comment: &Comment) -> Option<Sentiment> {
        let label = comment
            .sentiment
            .as_deref()
            .map(|s| s.trim().to_ascii_lowercase())
            .unwrap_or_default();
        match label.as_str() {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            _ => {
                let score = comment.engagement_score.unwrap_or(0);
                if score > self.positive_above {
                    Some(Sentiment::Positive)
                } else if score < self.negative_below {
                    Some(Sentiment::Negative)
                } else {
                    None
                }
            }
        }
    }
}

/// Comment texts of one theme split by polarity, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentimentSplit {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl SentimentSplit {
    pub fn get(&self, sentiment: Sentiment) -> &[String] {
        match sentiment {
            Sentiment::Positive => &self.positive,
            Sentiment::Negative => &self.negative,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }
}

/// Trim contents, drop blanks and route each comment to its polarity.
pub fn split_by_sentiment(comments: &[Comment], policy: &SentimentPolicy) -> SentimentSplit {
    let mut split = SentimentSplit::default();
    for comment in comments {
        let content = comment.content.trim();
        if content.is_empty() {
            continue;
        }
        match policy.classify(comment) {
            Some(Sentiment::Positive) => split.positive.push(content.to_string()),
            Some(Sentiment::Negative) => split.negative.push(content.to_string()),
            None => {}
        }
    }
    split
}
