//! In-memory port fakes implementing the documented backend contract.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ecoleta_core::{
    CatalogPort, Category, CategoryId, CollectionPoint, Coordinates, EcoletaService, NewPoint,
    PointFilter, PointId, PointQueryPort, PointRegistrationPort, PortError, Providers, Region,
    RegionId, RegionPort,
};

/// The seeded category titles, reused as fixture data.
pub const SEED_TITLES: [&str; 6] = [
    "Lamparas",
    "Pilas y Baterias",
    "Papeles y Cartón",
    "Residuos Electrónicos",
    "Residuos Orgánicos",
    "Aceites",
];

pub fn province(id: u64, name: &str) -> Region {
    Region {
        id: RegionId(id),
        name: name.to_owned(),
        parent: None,
        centroid: Coordinates { lat: -34.6, long: -58.4 },
    }
}

pub fn city(id: u64, province: u64, name: &str) -> Region {
    Region {
        id: RegionId(id),
        name: name.to_owned(),
        parent: Some(RegionId(province)),
        centroid: Coordinates { lat: -34.9, long: -57.9 },
    }
}

pub fn seed_catalog() -> Vec<Category> {
    SEED_TITLES
        .iter()
        .enumerate()
        .map(|(index, title)| Category {
            id: CategoryId(index as u64 + 1),
            title: (*title).to_owned(),
            image_ref: format!("uploads/{}.svg", index + 1),
        })
        .collect()
}

pub fn submission(name: &str, categories: impl IntoIterator<Item = u64>) -> NewPoint {
    NewPoint {
        name: name.to_owned(),
        email: format!("{}@recicla.example", name.to_lowercase().replace(' ', ".")),
        whatsapp: String::from("+54 11 5555-0001"),
        province: RegionId(2),
        city: RegionId(7),
        latitude: -34.603_722_9,
        longitude: -58.381_559_1,
        categories: categories.into_iter().map(CategoryId).collect(),
        image: None,
    }
}

struct StoredPoint {
    point: CollectionPoint,
    categories: BTreeSet<CategoryId>,
}

/// Backend fake holding points in memory.
///
/// Query matching follows the documented contract: both region levels must
/// match, an empty category set matches everything, a non-empty set matches
/// points carrying at least one of the ids.
#[derive(Default)]
pub struct InMemoryBackend {
    next_id: AtomicU64,
    rows: Mutex<Vec<StoredPoint>>,
    query_calls: AtomicUsize,
    register_calls: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn stored_points(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Seed a point directly, bypassing registration.
    pub fn insert(
        &self,
        name: &str,
        city: u64,
        province: u64,
        coords: (f64, f64),
        categories: impl IntoIterator<Item = u64>,
    ) -> PointId {
        let id = PointId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.rows.lock().unwrap().push(StoredPoint {
            point: CollectionPoint {
                id,
                name: name.to_owned(),
                email: format!("{name}@recicla.example"),
                whatsapp: String::from("+54 11 5555-0002"),
                image_ref: String::from("uploads/point.png"),
                city: RegionId(city),
                province: RegionId(province),
                latitude: coords.0,
                longitude: coords.1,
            },
            categories: categories.into_iter().map(CategoryId).collect(),
        });
        id
    }
}

#[async_trait]
impl PointQueryPort for InMemoryBackend {
    async fn query(&self, filter: &PointFilter) -> Result<Vec<CollectionPoint>, PortError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|row| {
                row.point.city == filter.city
                    && row.point.province == filter.province
                    && (filter.categories.is_empty()
                        || row.categories.intersection(&filter.categories).next().is_some())
            })
            .map(|row| row.point.clone())
            .collect())
    }
}

#[async_trait]
impl PointRegistrationPort for InMemoryBackend {
    async fn register(&self, new_point: &NewPoint) -> Result<PointId, PortError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        let id = PointId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.rows.lock().unwrap().push(StoredPoint {
            point: CollectionPoint {
                id,
                name: new_point.name.clone(),
                email: new_point.email.clone(),
                whatsapp: new_point.whatsapp.clone(),
                image_ref: String::from("uploads/point.png"),
                city: new_point.city,
                province: new_point.province,
                latitude: new_point.latitude,
                longitude: new_point.longitude,
            },
            categories: new_point.categories.clone(),
        });
        Ok(id)
    }
}

/// Registry fake serving a fixed two-level hierarchy.
pub struct FixedRegistry {
    pub provinces: Vec<Region>,
    pub cities: Vec<Region>,
}

#[async_trait]
impl RegionPort for FixedRegistry {
    async fn provinces(&self) -> Result<Vec<Region>, PortError> {
        Ok(self.provinces.clone())
    }

    async fn cities(&self, province: RegionId) -> Result<Vec<Region>, PortError> {
        Ok(self
            .cities
            .iter()
            .filter(|candidate| candidate.is_city_of(province))
            .cloned()
            .collect())
    }
}

/// Catalog fake serving the seeded categories.
pub struct FixedCatalog;

#[async_trait]
impl CatalogPort for FixedCatalog {
    async fn categories(&self) -> Result<Vec<Category>, PortError> {
        Ok(seed_catalog())
    }
}

/// Query port that always fails like an unreachable backend.
pub struct FailingQueryPort;

#[async_trait]
impl PointQueryPort for FailingQueryPort {
    async fn query(&self, _filter: &PointFilter) -> Result<Vec<CollectionPoint>, PortError> {
        Err(PortError::QueryUnavailable(String::from("connection refused")))
    }
}

/// Registration port that always rolls back.
pub struct FailingRegistrationPort;

#[async_trait]
impl PointRegistrationPort for FailingRegistrationPort {
    async fn register(&self, _new_point: &NewPoint) -> Result<PointId, PortError> {
        Err(PortError::Transaction(String::from("constraint violation")))
    }
}

/// Wire a service around the shared in-memory backend.
pub fn service_over(backend: &Arc<InMemoryBackend>) -> EcoletaService {
    EcoletaService::new(Providers {
        regions: Arc::new(FixedRegistry {
            provinces: vec![province(2, "Buenos Aires"), province(3, "Córdoba")],
            cities: vec![city(7, 2, "La Plata"), city(9, 2, "Quilmes"), city(11, 3, "Villa María")],
        }),
        catalog: Arc::new(FixedCatalog),
        queries: Arc::clone(backend) as Arc<dyn PointQueryPort>,
        registrations: Arc::clone(backend) as Arc<dyn PointRegistrationPort>,
    })
}
