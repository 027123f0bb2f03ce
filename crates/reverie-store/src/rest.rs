use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;

use crate::{Collection, RemoteStore, StoreError, StoreOp};

/// Client for the remote relational store's REST interface. One table per
/// collection, `id` primary key, PostgREST-style filters.
pub struct RestStore {
    http: reqwest::Client,
    base: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(api_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))?,
        );

        // A hung remote call should fail the triggering action, not wedge it.
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, base: base_url.trim_end_matches('/').to_string() })
    }

    fn endpoint(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.base, collection.table())
    }

    fn err(
        collection: Collection,
        op: StoreOp,
    ) -> impl FnOnce(reqwest::Error) -> StoreError {
        move |e| StoreError::new(collection, op, e)
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let op = StoreOp::List;
        let mut req = self.http.get(self.endpoint(collection)).query(&[("select", "*")]);
        req = if collection.singleton() {
            req.query(&[("order", "created_at.desc"), ("limit", "1")])
        } else {
            req.query(&[("order", "created_at.asc")])
        };

        req.send()
            .await
            .map_err(Self::err(collection, op))?
            .error_for_status()
            .map_err(Self::err(collection, op))?
            .json::<Vec<Value>>()
            .await
            .map_err(Self::err(collection, op))
    }

    async fn fetch(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let op = StoreOp::Fetch;
        let filter = format!("eq.{}", id);
        let rows = self
            .http
            .get(self.endpoint(collection))
            .query(&[("select", "*"), ("id", filter.as_str()), ("limit", "1")])
            .send()
            .await
            .map_err(Self::err(collection, op))?
            .error_for_status()
            .map_err(Self::err(collection, op))?
            .json::<Vec<Value>>()
            .await
            .map_err(Self::err(collection, op))?;

        Ok(rows.into_iter().next())
    }

    async fn insert(&self, collection: Collection, row: Value) -> Result<Value, StoreError> {
        let op = StoreOp::Insert;
        let rows = self
            .http
            .post(self.endpoint(collection))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await
            .map_err(Self::err(collection, op))?
            .error_for_status()
            .map_err(Self::err(collection, op))?
            .json::<Vec<Value>>()
            .await
            .map_err(Self::err(collection, op))?;

        rows.into_iter().next().ok_or_else(|| {
            StoreError::new(collection, op, anyhow::anyhow!("insert returned no rows"))
        })
    }

    async fn upsert(&self, collection: Collection, row: Value) -> Result<(), StoreError> {
        let op = StoreOp::Upsert;
        self.http
            .post(self.endpoint(collection))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&row)
            .send()
            .await
            .map_err(Self::err(collection, op))?
            .error_for_status()
            .map_err(Self::err(collection, op))?;
        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<(), StoreError> {
        let op = StoreOp::Update;
        let filter = format!("eq.{}", id);
        self.http
            .patch(self.endpoint(collection))
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(&patch)
            .send()
            .await
            .map_err(Self::err(collection, op))?
            .error_for_status()
            .map_err(Self::err(collection, op))?;
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let op = StoreOp::Delete;
        let filter = format!("eq.{}", id);
        self.http
            .delete(self.endpoint(collection))
            .query(&[("id", filter.as_str())])
            .send()
            .await
            .map_err(Self::err(collection, op))?
            .error_for_status()
            .map_err(Self::err(collection, op))?;
        Ok(())
    }
}
