//! Region provider backed by the public georef registry API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use ecoleta_core::{
    model::{Coordinates, Region, RegionId},
    ports::{PortError, RegionPort},
};

const DEFAULT_BASE_URL: &str = "https://apis.datos.gob.ar/georef/api";

/// Response wrapper from /provincias
#[derive(Debug, Deserialize)]
struct ProvinciasResponse {
    provincias: Vec<RegionEntry>,
}

/// Response wrapper from /departamentos
#[derive(Debug, Deserialize)]
struct DepartamentosResponse {
    departamentos: Vec<RegionEntry>,
}

/// Single region entry; provinces and departments share the shape.
#[derive(Debug, Deserialize)]
struct RegionEntry {
    id: u64,
    nombre: String,
    centroide: CentroideEntry,
}

#[derive(Debug, Deserialize)]
struct CentroideEntry {
    lat: f64,
    long: f64,
}

impl RegionEntry {
    fn into_region(self, parent: Option<RegionId>) -> Region {
        Region {
            id: RegionId(self.id),
            name: self.nombre,
            parent,
            centroid: Coordinates {
                lat: self.centroide.lat,
                long: self.centroide.long,
            },
        }
    }
}

/// [`RegionPort`] implementation for the georef registry.
pub struct GeorefRegionPort {
    client: Client,
    base_url: String,
}

impl GeorefRegionPort {
    /// Create a port against the public registry.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Create a port against a custom registry base URL.
    #[must_use]
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RegionPort for GeorefRegionPort {
    async fn provinces(&self) -> Result<Vec<Region>, PortError> {
        let resp = fetch_json::<ProvinciasResponse>(
            self.client.get(format!("{}/provincias", self.base_url)),
        )
        .await?;

        Ok(resp
            .provincias
            .into_iter()
            .map(|entry| entry.into_region(None))
            .collect())
    }

    async fn cities(&self, province: RegionId) -> Result<Vec<Region>, PortError> {
        // The registry answers an empty collection for unknown province ids,
        // which maps straight onto the "no child cities" contract.
        let resp = fetch_json::<DepartamentosResponse>(
            self.client
                .get(format!("{}/departamentos", self.base_url))
                .query(&[("provincia", province.0)]),
        )
        .await?;

        Ok(resp
            .departamentos
            .into_iter()
            .map(|entry| entry.into_region(Some(province)))
            .collect())
    }
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    let unavailable = |err: reqwest::Error| PortError::RegistryUnavailable(err.to_string());

    req.send()
        .await
        .map_err(unavailable)?
        .error_for_status()
        .map_err(unavailable)?
        .json()
        .await
        .map_err(unavailable)
}
