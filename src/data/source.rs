//! Query model and capability trait for the external comment store.

use std::{collections::BTreeSet, fmt};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    data::comments::{Comment, ThemeKey, ThemeKind},
    error::Result,
};

/// Columns of the comment schema that predicates may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Content,
    Sentiment,
    Likes,
    Theme(ThemeKind),
}

impl Field {
    pub fn column(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Sentiment => "sentiment",
            Self::Likes => "likes",
            Self::Theme(kind) => kind.column(),
        }
    }
}

/// Scalar compared against a column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    Int(i64),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Int(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Filter understood by every comment source.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(Field, Literal),
    Neq(Field, Literal),
    Gt(Field, Literal),
    Gte(Field, Literal),
    Lt(Field, Literal),
    Lte(Field, Literal),
    In(Field, Vec<Literal>),
}

impl Predicate {
    pub fn field(&self) -> Field {
        match self {
            Self::Eq(f, _)
            | Self::Neq(f, _)
            | Self::Gt(f, _)
            | Self::Gte(f, _)
            | Self::Lt(f, _)
            | Self::Lte(f, _)
            | Self::In(f, _) => *f,
        }
    }

    /// Evaluate against an in-memory row. A null column fails every
    /// predicate, `Neq` included, as it does in the SQL store.
    pub fn matches(&self, row: &CommentRow) -> bool {
        let value = row.value(self.field());
        match (self, value) {
            (_, None) => false,
            (Self::Eq(_, lit), Some(v)) => v == *lit,
            (Self::Neq(_, lit), Some(v)) => v != *lit,
            (Self::Gt(_, lit), Some(v)) => compare(&v, lit).is_some_and(|o| o.is_gt()),
            (Self::Gte(_, lit), Some(v)) => compare(&v, lit).is_some_and(|o| o.is_ge()),
            (Self::Lt(_, lit), Some(v)) => compare(&v, lit).is_some_and(|o| o.is_lt()),
            (Self::Lte(_, lit), Some(v)) => compare(&v, lit).is_some_and(|o| o.is_le()),
            (Self::In(_, set), Some(v)) => set.contains(&v),
        }
    }
}

fn compare(a: &Literal, b: &Literal) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Literal::Int(x), Literal::Int(y)) => Some(x.cmp(y)),
        (Literal::Text(x), Literal::Text(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Conjunction of predicates plus a row cap.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentQuery {
    pub predicates: Vec<Predicate>,
    pub limit: usize,
}

impl CommentQuery {
    pub fn new(limit: usize) -> Self {
        Self {
            predicates: Vec::new(),
            limit,
        }
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Rows of one theme, skipping rows filed under an excluded bucket in
    /// either theme column.
    pub fn for_theme(key: &ThemeKey, excluded: &[String], limit: usize) -> Self {
        let mut query =
            Self::new(limit).with(Predicate::Eq(Field::Theme(key.kind), key.name.as_str().into()));
        for kind in ThemeKind::ALL {
            for value in excluded {
                query = query.with(Predicate::Neq(Field::Theme(kind), value.as_str().into()));
            }
        }
        query
    }

    pub fn matches(&self, row: &CommentRow) -> bool {
        self.predicates.iter().all(|p| p.matches(row))
    }
}

/// Full row shape, used by sources that filter locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentRow {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default, alias = "engagement_score")]
    pub likes: Option<i64>,
    #[serde(default)]
    pub base_theme: Option<String>,
    #[serde(default)]
    pub sub_theme: Option<String>,
}

impl CommentRow {
    pub fn value(&self, field: Field) -> Option<Literal> {
        match field {
            Field::Content => Some(Literal::Text(self.content.clone())),
            Field::Sentiment => self.sentiment.clone().map(Literal::Text),
            Field::Likes => self.likes.map(Literal::Int),
            Field::Theme(ThemeKind::Base) => self.base_theme.clone().map(Literal::Text),
            Field::Theme(ThemeKind::Sub) => self.sub_theme.clone().map(Literal::Text),
        }
    }

    pub fn theme(&self, kind: ThemeKind) -> Option<&str> {
        match kind {
            ThemeKind::Base => self.base_theme.as_deref(),
            ThemeKind::Sub => self.sub_theme.as_deref(),
        }
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            content: row.content,
            sentiment: row.sentiment,
            engagement_score: row.likes,
        }
    }
}

/// Row-oriented comment store.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Rows matching every predicate, at most `query.limit` of them.
    async fn fetch(&self, query: &CommentQuery) -> Result<Vec<Comment>>;

    /// Raw values of a theme column, duplicates and nulls included.
    async fn theme_values(&self, kind: ThemeKind) -> Result<Vec<Option<String>>>;
}

/// Distinct, sorted theme keys of the requested kinds, base themes first.
pub async fn list_theme_keys(
    source: &dyn CommentSource,
    kinds: &[ThemeKind],
    excluded: &[String],
) -> Result<Vec<ThemeKey>> {
    let mut keys = Vec::new();
    for &kind in kinds {
        let names: BTreeSet<String> = source
            .theme_values(kind)
            .await?
            .into_iter()
            .flatten()
            .filter(|name| !name.trim().is_empty() && !excluded.contains(name))
            .collect();
        keys.extend(names.into_iter().map(|name| ThemeKey::new(kind, name)));
    }
    Ok(keys)
}
