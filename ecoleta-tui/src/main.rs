//! Terminal UI for Ecoleta: browse collection points by region and waste
//! category, and register new points.

mod app;
mod input;
mod ui;

use std::{io, sync::Arc, time::Duration as StdDuration};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ecoleta_core::{
    model::{Category, Coordinates, ImageUpload, NewPoint, Region, RegionId},
    ports::PortError,
    selection::SelectionVersion,
    service::{EcoletaService, Providers},
};
use ecoleta_provider_backend::{
    BackendCatalogPort, BackendPointQueryPort, BackendPointRegistrationPort,
};
use ecoleta_provider_georef::GeorefRegionPort;

use crate::app::{App, FetchOutcome};
use crate::input::Action;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the alternate screen stays intact.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .compact()
        .init();

    // HTTP + service setup
    let client = Client::builder().user_agent("ecoleta/0.1").build()?;

    let regions = match std::env::var("ECOLETA_GEOREF_URL") {
        Ok(url) => GeorefRegionPort::with_base_url(client.clone(), url),
        Err(_) => GeorefRegionPort::new(client.clone()),
    };
    let (catalog, queries, registrations) = match std::env::var("ECOLETA_API_URL") {
        Ok(url) => (
            BackendCatalogPort::with_base_url(client.clone(), url.clone()),
            BackendPointQueryPort::with_base_url(client.clone(), url.clone()),
            BackendPointRegistrationPort::with_base_url(client, url),
        ),
        Err(_) => (
            BackendCatalogPort::new(client.clone()),
            BackendPointQueryPort::new(client.clone()),
            BackendPointRegistrationPort::new(client),
        ),
    };

    let service = Arc::new(EcoletaService::new(Providers {
        regions: Arc::new(regions),
        catalog: Arc::new(catalog),
        queries: Arc::new(queries),
        registrations: Arc::new(registrations),
    }));

    // One-shot geolocation fix; absence is the permission-denied signal.
    let viewport = std::env::var("ECOLETA_POSITION")
        .ok()
        .as_deref()
        .and_then(parse_position);

    // App state + outcome channel
    let mut app = App::new(viewport);
    let (tx, rx) = unbounded_channel::<FetchOutcome>();

    app.is_loading = true;
    spawn_reference_fetches(&service, &tx);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app, &service, tx, rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    service: &Arc<EcoletaService>,
    tx: UnboundedSender<FetchOutcome>,
    mut rx: UnboundedReceiver<FetchOutcome>,
) -> Result<()> {
    loop {
        // Drain completed fetches before drawing.
        while let Ok(outcome) = rx.try_recv() {
            let refresh = app.apply(outcome);
            if refresh {
                spawn_point_query(service, &tx, app.selection.version(), &app);
            }
        }

        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            let action = input::handle_key_event(key, &mut app);

            match action {
                Action::Quit => break,
                Action::None => {}
                Action::FetchCities(version, province) => {
                    app.is_loading = true;
                    app.status_message = None;
                    spawn_city_fetch(service, &tx, version, province);
                }
                Action::QueryPoints(version) => {
                    app.is_loading = true;
                    app.status_message = None;
                    spawn_point_query(service, &tx, version, &app);
                }
                Action::SubmitRegistration => match app.submission() {
                    Ok(submission) => {
                        app.is_loading = true;
                        app.status_message = None;
                        spawn_registration(
                            service,
                            &tx,
                            submission,
                            app.form.image_path.trim().to_owned(),
                            app.cities.clone(),
                            app.categories.clone(),
                        );
                    }
                    Err(message) => {
                        app.status_message = Some(message);
                    }
                },
                Action::ReloadReferenceData => {
                    app.is_loading = true;
                    app.status_message = None;
                    spawn_reference_fetches(service, &tx);
                }
            }
        }
    }

    Ok(())
}

fn spawn_reference_fetches(service: &Arc<EcoletaService>, tx: &UnboundedSender<FetchOutcome>) {
    let provinces_service = Arc::clone(service);
    let provinces_tx = tx.clone();
    tokio::spawn(async move {
        let result = provinces_service.provinces().await;
        let _ = provinces_tx.send(FetchOutcome::Provinces(result));
    });

    let catalog_service = Arc::clone(service);
    let catalog_tx = tx.clone();
    tokio::spawn(async move {
        let result = catalog_service.categories().await;
        let _ = catalog_tx.send(FetchOutcome::Categories(result));
    });
}

fn spawn_city_fetch(
    service: &Arc<EcoletaService>,
    tx: &UnboundedSender<FetchOutcome>,
    version: SelectionVersion,
    province: RegionId,
) {
    let service = Arc::clone(service);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = service.cities(province).await;
        let _ = tx.send(FetchOutcome::Cities(version, result));
    });
}

fn spawn_point_query(
    service: &Arc<EcoletaService>,
    tx: &UnboundedSender<FetchOutcome>,
    version: SelectionVersion,
    app: &App,
) {
    let province = app.selection.province();
    let city = app.selection.city();
    let categories = app.selection.categories().clone();

    let service = Arc::clone(service);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = service.find_points(province, city, &categories).await;
        let _ = tx.send(FetchOutcome::Points(version, result));
    });
}

fn spawn_registration(
    service: &Arc<EcoletaService>,
    tx: &UnboundedSender<FetchOutcome>,
    mut submission: NewPoint,
    image_path: String,
    known_cities: Vec<Region>,
    catalog: Vec<Category>,
) {
    let service = Arc::clone(service);
    let tx = tx.clone();
    tokio::spawn(async move {
        if !image_path.is_empty() {
            match tokio::fs::read(&image_path).await {
                Ok(bytes) => {
                    let file_name = std::path::Path::new(&image_path)
                        .file_name()
                        .map_or_else(|| image_path.clone(), |name| name.to_string_lossy().into_owned());
                    submission.image = Some(ImageUpload { file_name, bytes });
                }
                Err(err) => {
                    let _ = tx.send(FetchOutcome::Registered(Err(PortError::invalid(
                        "image",
                        err.to_string(),
                    ))));
                    return;
                }
            }
        }

        debug!(name = %submission.name, "submitting registration");
        let result = service
            .register_point(&submission, &known_cities, &catalog)
            .await;
        let _ = tx.send(FetchOutcome::Registered(result));
    });
}

/// Parse a "lat,long" pair; anything malformed means no fix.
fn parse_position(raw: &str) -> Option<Coordinates> {
    let (lat, long) = raw.split_once(',')?;
    Some(Coordinates {
        lat: lat.trim().parse().ok()?,
        long: long.trim().parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::parse_position;

    #[test]
    fn parses_a_latitude_longitude_pair() {
        let coords = parse_position("-34.6037, -58.3816").expect("valid pair");
        assert_eq!(coords.lat, -34.6037);
        assert_eq!(coords.long, -58.3816);
    }

    #[test]
    fn malformed_positions_yield_no_fix() {
        assert!(parse_position("").is_none());
        assert!(parse_position("-34.6037").is_none());
        assert!(parse_position("south,west").is_none());
    }
}
