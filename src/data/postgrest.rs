//! Comment source backed by a Supabase/PostgREST table.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use urlencoding::encode;

use crate::{
    config::Settings,
    data::{
        comments::{Comment, ThemeKind},
        source::{CommentQuery, CommentSource, Predicate},
    },
    error::{InsightError, Result},
};

/// Upper bound on rows scanned when enumerating theme values.
const THEME_SCAN_LIMIT: usize = 100_000;

/// Thin PostgREST client for the comment table.
pub struct PostgrestSource {
    http: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl PostgrestSource {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent("theme-insights/0.1")
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
        })
    }

    /// Build from settings; missing credentials are a fatal configuration error.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let (url, key) = settings.require_supabase()?;
        Self::new(url, key, &settings.comments_table)
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    async fn get_rows<T: for<'de> Deserialize<'de>>(&self, params: &[(String, String)]) -> Result<Vec<T>> {
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), v))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}?{query}", self.table_url());
        debug!(%url, "postgrest request");
        let resp = self
            .http
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InsightError::Source(format!("postgrest {status}: {body}")));
        }
        Ok(resp.json().await?)
    }
}

/// Render one predicate as a PostgREST `column=op.value` pair.
pub fn render_predicate(predicate: &Predicate) -> (String, String) {
    let column = predicate.field().column().to_string();
    let value = match predicate {
        Predicate::Eq(_, lit) => format!("eq.{}", encode(&lit.to_string())),
        Predicate::Neq(_, lit) => format!("neq.{}", encode(&lit.to_string())),
        Predicate::Gt(_, lit) => format!("gt.{}", encode(&lit.to_string())),
        Predicate::Gte(_, lit) => format!("gte.{}", encode(&lit.to_string())),
        Predicate::Lt(_, lit) => format!("lt.{}", encode(&lit.to_string())),
        Predicate::Lte(_, lit) => format!("lte.{}", encode(&lit.to_string())),
        Predicate::In(_, set) => {
            let items = set
                .iter()
                .map(|lit| format!("\"{}\"", lit.to_string().replace('"', "\\\"")))
                .collect::<Vec<_>>()
                .join(",");
            format!("in.({})", encode(&items))
        }
    };
    (column, value)
}

#[async_trait]
impl CommentSource for PostgrestSource {
    async fn fetch(&self, query: &CommentQuery) -> Result<Vec<Comment>> {
        let mut params = vec![("select".to_string(), "content,sentiment,likes".to_string())];
        params.extend(query.predicates.iter().map(render_predicate));
        params.push(("limit".to_string(), query.limit.to_string()));
        let rows: Vec<Comment> = self.get_rows(&params).await?;
        info!(table = %self.table, rows = rows.len(), "fetched comments");
        Ok(rows)
    }

    async fn theme_values(&self, kind: ThemeKind) -> Result<Vec<Option<String>>> {
        #[derive(Deserialize)]
        struct ThemeCell {
            #[serde(default)]
            base_theme: Option<String>,
            #[serde(default)]
            sub_theme: Option<String>,
        }

        let params = vec![
            ("select".to_string(), kind.column().to_string()),
            ("limit".to_string(), THEME_SCAN_LIMIT.to_string()),
        ];
        let cells: Vec<ThemeCell> = self.get_rows(&params).await?;
        Ok(cells
            .into_iter()
            .map(|cell| match kind {
                ThemeKind::Base => cell.base_theme,
                ThemeKind::Sub => cell.sub_theme,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::source::{Field, Literal};

    #[test]
    fn renders_postgrest_operators() {
        let eq = Predicate::Eq(Field::Theme(ThemeKind::Base), "work life".into());
        assert_eq!(
            render_predicate(&eq),
            ("base_theme".to_string(), "eq.work%20life".to_string())
        );
        let gt = Predicate::Gt(Field::Likes, Literal::Int(5));
        assert_eq!(render_predicate(&gt).1, "gt.5");
        let set = Predicate::In(Field::Sentiment, vec!["positive".into(), "negative".into()]);
        assert_eq!(
            render_predicate(&set).1,
            format!("in.({})", encode("\"positive\",\"negative\""))
        );
    }
}
