//! Wire-level tests for the georef region port against a mock registry.

use httpmock::prelude::*;
use reqwest::Client;

use ecoleta_core::{PortError, RegionId, RegionPort};
use ecoleta_provider_georef::GeorefRegionPort;

fn port_for(server: &MockServer) -> GeorefRegionPort {
    GeorefRegionPort::with_base_url(Client::new(), server.base_url())
}

#[tokio::test]
async fn decodes_provinces_in_registry_order() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/provincias");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "provincias": [
                    {"id": 6, "nombre": "Buenos Aires", "centroide": {"lat": -36.67, "long": -60.56}},
                    {"id": 14, "nombre": "Córdoba", "centroide": {"lat": -32.14, "long": -63.80}}
                ]
            }));
    });

    let provinces = port_for(&server).provinces().await.unwrap();

    mock.assert();
    assert_eq!(provinces.len(), 2);
    assert_eq!(provinces[0].id, RegionId(6));
    assert_eq!(provinces[0].name, "Buenos Aires");
    assert_eq!(provinces[0].parent, None);
    assert_eq!(provinces[0].centroid.lat, -36.67);
    assert_eq!(provinces[1].name, "Córdoba");
}

#[tokio::test]
async fn cities_query_carries_the_province_and_stamps_the_parent() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/departamentos")
            .query_param("provincia", "6");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "departamentos": [
                    {"id": 6441, "nombre": "La Plata", "centroide": {"lat": -35.03, "long": -58.11}}
                ]
            }));
    });

    let cities = port_for(&server).cities(RegionId(6)).await.unwrap();

    mock.assert();
    assert_eq!(cities.len(), 1);
    assert_eq!(cities[0].id, RegionId(6441));
    assert_eq!(cities[0].parent, Some(RegionId(6)));
}

#[tokio::test]
async fn unknown_province_yields_an_empty_city_list() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/departamentos")
            .query_param("provincia", "999");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"departamentos": []}));
    });

    let cities = port_for(&server).cities(RegionId(999)).await.unwrap();
    assert!(cities.is_empty());
}

#[tokio::test]
async fn server_errors_map_to_registry_unavailable() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/provincias");
        then.status(503);
    });

    let err = port_for(&server).provinces().await.unwrap_err();
    assert!(matches!(err, PortError::RegistryUnavailable(_)));
}

#[tokio::test]
async fn malformed_payloads_map_to_registry_unavailable() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/departamentos");
        then.status(200)
            .header("Content-Type", "application/json")
            .body("{\"unexpected\": true}");
    });

    let err = port_for(&server).cities(RegionId(6)).await.unwrap_err();
    assert!(matches!(err, PortError::RegistryUnavailable(_)));
}
