use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Collection, CollectionChanges, CollectionQuery, CollectionRow, NewCollection};
use crate::repositories::CollectionStore;

const OWNER_COLUMNS: &str = "id,student_code,email";

/// Collection store backed by the hosted PostgREST endpoint
#[derive(Clone)]
pub struct SupabaseCollectionStore {
    client: Client,
    base_url: String,
    anon_key: String,
    select: String,
}

/// Error body returned by PostgREST
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
    #[serde(default)]
    details: Option<String>,
}

impl SupabaseCollectionStore {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
            select: select_clause(&config.owner_relation),
        }
    }

    fn request(&self, method: Method, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}/rest/v1/collections", self.base_url);
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token.unwrap_or(&self.anon_key))
    }

    fn returning(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Prefer", "return=representation")
            .query(&[("select", self.select.as_str())])
    }
}

#[async_trait]
impl CollectionStore for SupabaseCollectionStore {
    async fn list(
        &self,
        token: Option<&str>,
        query: &CollectionQuery,
    ) -> AppResult<Vec<Collection>> {
        let response = self
            .request(Method::GET, token)
            .query(&list_params(query, &self.select))
            .send()
            .await?;

        read_rows(response).await
    }

    async fn find_by_id(&self, token: Option<&str>, id: &str) -> AppResult<Option<Collection>> {
        let response = self
            .request(Method::GET, token)
            .query(&[("select", self.select.clone()), ("id", format!("eq.{}", id))])
            .send()
            .await?;

        Ok(read_rows(response).await?.into_iter().next())
    }

    async fn insert(&self, token: Option<&str>, input: &NewCollection) -> AppResult<Collection> {
        let response = self
            .returning(self.request(Method::POST, token))
            .json(input)
            .send()
            .await?;

        read_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Insert returned no row".to_string()))
    }

    async fn update(
        &self,
        token: Option<&str>,
        id: &str,
        owner_id: &str,
        changes: &CollectionChanges,
    ) -> AppResult<Option<Collection>> {
        let response = self
            .returning(self.request(Method::PATCH, token))
            .query(&owner_scoped(id, owner_id))
            .json(changes)
            .send()
            .await?;

        Ok(read_rows(response).await?.into_iter().next())
    }

    async fn delete(&self, token: Option<&str>, id: &str, owner_id: &str) -> AppResult<bool> {
        let response = self
            .request(Method::DELETE, token)
            .header("Prefer", "return=representation")
            .query(&owner_scoped(id, owner_id))
            .query(&[("select", "id")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }
        let deleted: Vec<serde_json::Value> = response.json().await?;
        Ok(!deleted.is_empty())
    }
}

fn select_clause(owner_relation: &str) -> String {
    format!("*,owner:{}({})", owner_relation, OWNER_COLUMNS)
}

fn owner_scoped(id: &str, owner_id: &str) -> [(&'static str, String); 2] {
    [
        ("id", format!("eq.{}", id)),
        ("owner_id", format!("eq.{}", owner_id)),
    ]
}

/// PostgREST query parameters for a list request. Repeated columns are ANDed.
fn list_params(query: &CollectionQuery, select: &str) -> Vec<(&'static str, String)> {
    let mut params = vec![("select", select.to_string())];

    if let Some(owner_id) = &query.owner_id {
        params.push(("owner_id", format!("eq.{}", owner_id)));
    }
    if query.public_only {
        params.push(("is_public", "eq.true".to_string()));
    }
    if let Some(is_public) = query.is_public {
        params.push(("is_public", format!("eq.{}", is_public)));
    }
    if let Some(tag) = &query.tag {
        params.push(("tags", format!("cs.{{{}}}", quote(tag))));
    }
    if let Some(search) = &query.search {
        let pattern = quote(&ilike_pattern(search));
        params.push((
            "or",
            format!("(name.ilike.{},description.ilike.{})", pattern, pattern),
        ));
    }

    params.push(("order", "created_at.desc".to_string()));
    params
}

/// Double-quote a filter value so commas and parentheses stay literal
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Substring pattern with LIKE metacharacters escaped. `*` is PostgREST's own
/// wildcard and never reaches here; the service strips it from search terms.
fn ilike_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('*');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

async fn read_rows(response: Response) -> AppResult<Vec<Collection>> {
    if !response.status().is_success() {
        return Err(upstream_error(response).await);
    }
    let rows: Vec<CollectionRow> = response.json().await?;
    Ok(rows.into_iter().map(Collection::from).collect())
}

async fn upstream_error(response: Response) -> AppError {
    let status = response.status().as_u16();
    let message = match response.json::<PostgrestError>().await {
        Ok(PostgrestError {
            message,
            details: Some(details),
        }) => format!("{} ({})", message, details),
        Ok(body) => body.message,
        Err(_) => format!("store responded with status {}", status),
    };

    AppError::Upstream {
        status: Some(status),
        message,
    }
}
