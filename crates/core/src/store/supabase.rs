//! Hosted Postgres store, spoken to through its REST gateway (PostgREST).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::{MovieEnrichment, MovieRecord, MovieStore, MovieSummary, MovieTable, StoreError};
use crate::config::SupabaseConfig;
use crate::yts::Torrent;

pub struct SupabaseStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(config: &SupabaseConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.anon_key.clone(),
        })
    }

    fn table_url(&self, table: MovieTable) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.table_name())
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: MovieTable,
        query: &str,
    ) -> Result<Vec<T>, StoreError> {
        let url = format!("{}?{}", self.table_url(table), query);
        debug!("Store query: {}", url);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// PATCH one row and report whether it matched.
    async fn patch_row(
        &self,
        table: MovieTable,
        imdb_id: &str,
        body: serde_json::Value,
    ) -> Result<bool, StoreError> {
        let url = format!(
            "{}?imdb_id=eq.{}",
            self.table_url(table),
            urlencoding::encode(imdb_id)
        );

        let response = self
            .authorized(self.client.patch(&url))
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl MovieStore for SupabaseStore {
    async fn exists(&self, table: MovieTable, imdb_id: &str) -> Result<bool, StoreError> {
        let rows: Vec<serde_json::Value> = self
            .fetch_rows(
                table,
                &format!(
                    "select=imdb_id&imdb_id=eq.{}&limit=1",
                    urlencoding::encode(imdb_id)
                ),
            )
            .await?;
        Ok(!rows.is_empty())
    }

    async fn get(
        &self,
        table: MovieTable,
        imdb_id: &str,
    ) -> Result<Option<MovieRecord>, StoreError> {
        let rows: Vec<MovieRecord> = self
            .fetch_rows(
                table,
                &format!("select=*&imdb_id=eq.{}&limit=1", urlencoding::encode(imdb_id)),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, table: MovieTable, record: &MovieRecord) -> Result<(), StoreError> {
        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            return Err(StoreError::Conflict(record.imdb_id.clone()));
        }
        Self::check(response).await?;
        Ok(())
    }

    async fn apply_enrichment(
        &self,
        table: MovieTable,
        imdb_id: &str,
        enrichment: &MovieEnrichment,
    ) -> Result<bool, StoreError> {
        let body =
            serde_json::to_value(enrichment).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.patch_row(table, imdb_id, body).await
    }

    async fn update_torrents(
        &self,
        table: MovieTable,
        imdb_id: &str,
        torrents: &[Torrent],
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let body = json!({
            "torrents": torrents,
            "updated_at": updated_at,
        });
        self.patch_row(table, imdb_id, body).await
    }

    async fn search(
        &self,
        table: MovieTable,
        query: &str,
        limit: u32,
    ) -> Result<Vec<MovieSummary>, StoreError> {
        let pattern = format!("*{}*", query.trim());
        let mut hits: Vec<MovieSummary> = self
            .fetch_rows(
                table,
                &format!(
                    "select=imdb_id,title,year,poster_url&title=ilike.{}&order=year.desc.nullslast&limit={}",
                    urlencoding::encode(&pattern),
                    limit
                ),
            )
            .await?;

        for hit in &mut hits {
            hit.table = table;
        }
        Ok(hits)
    }
}
