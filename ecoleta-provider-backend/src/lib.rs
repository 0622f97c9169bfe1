//! Catalog, point query, and point registration ports for the CRUD backend.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use ecoleta_core::{
    model::{Category, CategoryId, CollectionPoint, NewPoint, PointFilter, PointId, RegionId},
    ports::{CatalogPort, PointQueryPort, PointRegistrationPort, PortError},
};

const DEFAULT_BASE_URL: &str = "http://localhost:3333";

/// Category as returned by /items
#[derive(Debug, Deserialize)]
struct ItemEntry {
    id: u64,
    title: String,
    image_url: String,
}

/// Response wrapper from /points
#[derive(Debug, Deserialize)]
struct PointsResponse {
    points: Vec<PointEntry>,
}

/// Single point from /points
#[derive(Debug, Deserialize)]
struct PointEntry {
    id: u64,
    name: String,
    email: String,
    whatsapp: String,
    image_url: String,
    city: u64,
    uf: u64,
    latitude: f64,
    longitude: f64,
}

impl From<PointEntry> for CollectionPoint {
    fn from(entry: PointEntry) -> Self {
        Self {
            id: PointId(entry.id),
            name: entry.name,
            email: entry.email,
            whatsapp: entry.whatsapp,
            image_ref: entry.image_url,
            city: RegionId(entry.city),
            province: RegionId(entry.uf),
            latitude: entry.latitude,
            longitude: entry.longitude,
        }
    }
}

/// Identity of a freshly created point, from POST /points
#[derive(Debug, Deserialize)]
struct CreatedPoint {
    id: u64,
}

/// [`CatalogPort`] implementation for the backend's /items endpoint.
pub struct BackendCatalogPort {
    client: Client,
    base_url: String,
}

impl BackendCatalogPort {
    /// Create a port against the default local backend.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Create a port against a custom backend base URL.
    #[must_use]
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CatalogPort for BackendCatalogPort {
    async fn categories(&self) -> Result<Vec<Category>, PortError> {
        let items = fetch_json::<Vec<ItemEntry>>(
            self.client.get(format!("{}/items", self.base_url)),
            PortError::CatalogUnavailable,
        )
        .await?;

        Ok(items
            .into_iter()
            .map(|item| Category {
                id: CategoryId(item.id),
                title: item.title,
                image_ref: item.image_url,
            })
            .collect())
    }
}

/// [`PointQueryPort`] implementation for the backend's /points endpoint.
pub struct BackendPointQueryPort {
    client: Client,
    base_url: String,
}

impl BackendPointQueryPort {
    /// Create a port against the default local backend.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Create a port against a custom backend base URL.
    #[must_use]
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PointQueryPort for BackendPointQueryPort {
    async fn query(&self, filter: &PointFilter) -> Result<Vec<CollectionPoint>, PortError> {
        let mut req = self.client.get(format!("{}/points", self.base_url)).query(&[
            ("city", filter.city.0.to_string()),
            ("uf", filter.province.0.to_string()),
        ]);

        // "items[]" is repeated per id; an empty set sends no category
        // filter at all, which the backend reads as "any category".
        for category in &filter.categories {
            req = req.query(&[("items[]", category.0.to_string())]);
        }

        let resp = fetch_json::<PointsResponse>(req, PortError::QueryUnavailable).await?;

        Ok(resp.points.into_iter().map(CollectionPoint::from).collect())
    }
}

/// [`PointRegistrationPort`] implementation for the backend's /points endpoint.
pub struct BackendPointRegistrationPort {
    client: Client,
    base_url: String,
}

impl BackendPointRegistrationPort {
    /// Create a port against the default local backend.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Create a port against a custom backend base URL.
    #[must_use]
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PointRegistrationPort for BackendPointRegistrationPort {
    async fn register(&self, submission: &NewPoint) -> Result<PointId, PortError> {
        let items = submission
            .categories
            .iter()
            .map(|category| category.0.to_string())
            .collect::<Vec<String>>()
            .join(",");

        let mut form = Form::new()
            .text("name", submission.name.clone())
            .text("email", submission.email.clone())
            .text("whatsapp", submission.whatsapp.clone())
            .text("uf", submission.province.0.to_string())
            .text("city", submission.city.0.to_string())
            .text("latitude", submission.latitude.to_string())
            .text("longitude", submission.longitude.to_string())
            .text("items", items);

        if let Some(image) = &submission.image {
            form = form.part(
                "image",
                Part::bytes(image.bytes.clone()).file_name(image.file_name.clone()),
            );
        }

        // The backend persists the point and all its category links in one
        // transaction, so any failure here means nothing was written.
        let transaction = |err: reqwest::Error| PortError::Transaction(err.to_string());

        let created: CreatedPoint = self
            .client
            .post(format!("{}/points", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(transaction)?
            .error_for_status()
            .map_err(transaction)?
            .json()
            .await
            .map_err(transaction)?;

        Ok(PointId(created.id))
    }
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(
    req: RequestBuilder,
    unavailable: fn(String) -> PortError,
) -> Result<T, PortError> {
    let map = move |err: reqwest::Error| unavailable(err.to_string());

    req.send()
        .await
        .map_err(map)?
        .error_for_status()
        .map_err(map)?
        .json()
        .await
        .map_err(map)
}
