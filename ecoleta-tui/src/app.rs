use std::collections::BTreeSet;

use ecoleta_core::{
    model::{Category, CategoryId, CollectionPoint, Coordinates, NewPoint, Region, RegionId},
    ports::PortError,
    selection::{SelectionState, SelectionVersion},
    PointId,
};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    RegionSelect,
    PointBrowse,
    RegisterForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RegionColumn {
    Provinces,
    Cities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormFocus {
    Name,
    Email,
    Whatsapp,
    Latitude,
    Longitude,
    ImagePath,
    Categories,
}

impl FormFocus {
    pub(crate) fn next(self) -> Self {
        match self {
            Self::Name => Self::Email,
            Self::Email => Self::Whatsapp,
            Self::Whatsapp => Self::Latitude,
            Self::Latitude => Self::Longitude,
            Self::Longitude => Self::ImagePath,
            Self::ImagePath => Self::Categories,
            Self::Categories => Self::Name,
        }
    }

    pub(crate) fn previous(self) -> Self {
        match self {
            Self::Name => Self::Categories,
            Self::Email => Self::Name,
            Self::Whatsapp => Self::Email,
            Self::Latitude => Self::Whatsapp,
            Self::Longitude => Self::Latitude,
            Self::ImagePath => Self::Longitude,
            Self::Categories => Self::ImagePath,
        }
    }
}

/// Editable state of the registration form.
pub(crate) struct RegisterForm {
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub latitude: String,
    pub longitude: String,
    pub image_path: String,
    pub categories: BTreeSet<CategoryId>,
    pub focus: FormFocus,
    pub category_index: usize,
}

impl RegisterForm {
    pub(crate) fn new(seed: Option<Coordinates>) -> Self {
        let (latitude, longitude) = seed
            .map(|coords| (coords.lat.to_string(), coords.long.to_string()))
            .unwrap_or_default();
        Self {
            name: String::new(),
            email: String::new(),
            whatsapp: String::new(),
            latitude,
            longitude,
            image_path: String::new(),
            categories: BTreeSet::new(),
            focus: FormFocus::Name,
            category_index: 0,
        }
    }

    /// The text buffer under the cursor, if the focus is a text field.
    pub(crate) fn active_field_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormFocus::Name => Some(&mut self.name),
            FormFocus::Email => Some(&mut self.email),
            FormFocus::Whatsapp => Some(&mut self.whatsapp),
            FormFocus::Latitude => Some(&mut self.latitude),
            FormFocus::Longitude => Some(&mut self.longitude),
            FormFocus::ImagePath => Some(&mut self.image_path),
            FormFocus::Categories => None,
        }
    }
}

/// Result of a spawned fetch, reported back over the outcome channel.
///
/// City and point outcomes carry the selection version captured when the
/// fetch was spawned; [`App::apply`] drops them silently once the selection
/// has moved on.
pub(crate) enum FetchOutcome {
    Provinces(Result<Vec<Region>, PortError>),
    Categories(Result<Vec<Category>, PortError>),
    Cities(SelectionVersion, Result<Vec<Region>, PortError>),
    Points(SelectionVersion, Result<Vec<CollectionPoint>, PortError>),
    Registered(Result<PointId, PortError>),
}

pub(crate) struct App {
    pub screen: Screen,
    pub selection: SelectionState,

    pub provinces: Vec<Region>,
    pub province_index: usize,
    pub cities: Vec<Region>,
    pub city_index: usize,
    pub region_column: RegionColumn,

    pub categories: Vec<Category>,
    pub category_index: usize,

    pub points: Vec<CollectionPoint>,
    pub point_index: usize,

    /// One-shot geolocation fix, used to seed the registration form.
    pub viewport: Option<Coordinates>,
    pub form: RegisterForm,

    pub is_loading: bool,
    pub status_message: Option<String>,
}

impl App {
    pub(crate) fn new(viewport: Option<Coordinates>) -> Self {
        Self {
            screen: Screen::RegionSelect,
            selection: SelectionState::new(),
            provinces: Vec::new(),
            province_index: 0,
            cities: Vec::new(),
            city_index: 0,
            region_column: RegionColumn::Provinces,
            categories: Vec::new(),
            category_index: 0,
            points: Vec::new(),
            point_index: 0,
            viewport,
            form: RegisterForm::new(None),
            is_loading: false,
            status_message: None,
        }
    }

    /// Fold a completed fetch into the app state.
    ///
    /// Returns `true` when the current selection should be re-queried (a
    /// point was just registered and must show up in the list).
    pub(crate) fn apply(&mut self, outcome: FetchOutcome) -> bool {
        self.is_loading = false;

        match outcome {
            FetchOutcome::Provinces(Ok(provinces)) => {
                self.provinces = provinces;
                self.province_index = 0;
            }
            FetchOutcome::Provinces(Err(err)) => {
                // Degrade to "no regions available"; 'g' refetches.
                warn!(error = %err, "province fetch failed");
                self.status_message = Some(err.to_string());
            }
            FetchOutcome::Categories(Ok(categories)) => {
                self.categories = categories;
                self.category_index = 0;
            }
            FetchOutcome::Categories(Err(err)) => {
                warn!(error = %err, "catalog fetch failed");
                self.status_message = Some(err.to_string());
            }
            FetchOutcome::Cities(version, result) => {
                if !self.selection.is_current(version) {
                    debug!("discarding stale city list");
                    return false;
                }
                match result {
                    Ok(cities) => {
                        self.cities = cities;
                        self.city_index = 0;
                    }
                    Err(err) => {
                        // City list stays empty; re-selecting the province retries.
                        warn!(error = %err, "city fetch failed");
                        self.cities.clear();
                        self.status_message = Some(err.to_string());
                    }
                }
            }
            FetchOutcome::Points(version, result) => {
                if !self.selection.is_current(version) {
                    debug!("discarding stale point list");
                    return false;
                }
                match result {
                    Ok(points) => {
                        self.points = points;
                        self.point_index = 0;
                    }
                    Err(err) => {
                        // Keep the previously rendered points on the map.
                        warn!(error = %err, "point query failed");
                        self.status_message = Some(err.to_string());
                    }
                }
            }
            FetchOutcome::Registered(Ok(id)) => {
                self.status_message = Some(format!("Registered collection point #{}", id.0));
                self.screen = Screen::PointBrowse;
                return true;
            }
            FetchOutcome::Registered(Err(err)) => {
                self.status_message = Some(err.to_string());
            }
        }

        false
    }

    /// Commit the highlighted province as the selection.
    ///
    /// Clears the dependent city list and the point list; the caller spawns
    /// the city fetch tagged with the returned version.
    pub(crate) fn choose_highlighted_province(&mut self) -> Option<(SelectionVersion, RegionId)> {
        let province = self.provinces.get(self.province_index)?.id;
        let version = self.selection.select_province(province);
        self.cities.clear();
        self.city_index = 0;
        self.points.clear();
        self.point_index = 0;
        self.region_column = RegionColumn::Cities;
        Some((version, province))
    }

    /// Commit the highlighted city and move on to point browsing.
    pub(crate) fn choose_highlighted_city(&mut self) -> Option<SelectionVersion> {
        let city = self.cities.get(self.city_index)?.id;
        let version = self.selection.select_city(city)?;
        self.screen = Screen::PointBrowse;
        Some(version)
    }

    /// Toggle the highlighted category filter chip.
    pub(crate) fn toggle_highlighted_category(&mut self) -> Option<SelectionVersion> {
        let category = self.categories.get(self.category_index)?.id;
        Some(self.selection.toggle_category(category))
    }

    pub(crate) fn selected_city_region(&self) -> Option<&Region> {
        let city = self.selection.city()?;
        self.cities.iter().find(|region| region.id == city)
    }

    /// Open the registration form, seeding coordinates from the geolocation
    /// fix or the selected city's centroid.
    pub(crate) fn open_register_form(&mut self) {
        let seed = self
            .viewport
            .or_else(|| self.selected_city_region().map(|region| region.centroid));
        self.form = RegisterForm::new(seed);
        self.screen = Screen::RegisterForm;
    }

    /// Build the submission from the form, without the image payload (the
    /// caller reads the image file asynchronously at submit time).
    pub(crate) fn submission(&self) -> Result<NewPoint, String> {
        let (Some(province), Some(city)) = (self.selection.province(), self.selection.city())
        else {
            return Err(String::from("Select a province and city first"));
        };
        let latitude = self
            .form
            .latitude
            .trim()
            .parse::<f64>()
            .map_err(|_| String::from("Latitude must be a number"))?;
        let longitude = self
            .form
            .longitude
            .trim()
            .parse::<f64>()
            .map_err(|_| String::from("Longitude must be a number"))?;

        Ok(NewPoint {
            name: self.form.name.clone(),
            email: self.form.email.clone(),
            whatsapp: self.form.whatsapp.clone(),
            province,
            city,
            latitude,
            longitude,
            categories: self.form.categories.clone(),
            image: None,
        })
    }
}
