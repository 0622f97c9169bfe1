use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ecoleta_core::{model::RegionId, selection::SelectionVersion};

use crate::app::{App, FormFocus, RegionColumn, Screen};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
    /// Spawn the dependent city fetch for the newly selected province.
    FetchCities(SelectionVersion, RegionId),
    /// Re-run the point query for the current selection.
    QueryPoints(SelectionVersion),
    /// Validate the form and run `service.register_point`(...)
    SubmitRegistration,
    /// Refetch provinces and the category catalog.
    ReloadReferenceData,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{BackTab, Backspace, Char, Down, Enter, Esc, Left, Right, Tab, Up};

    // Global quit shortcut; plain 'q' only outside the text form.
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    if key.code == Char('q')
        && key.modifiers.is_empty()
        && !matches!(app.screen, Screen::RegisterForm)
    {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::RegionSelect => match key.code {
            Up | Char('k') => match app.region_column {
                RegionColumn::Provinces => {
                    if app.province_index > 0 {
                        app.province_index -= 1;
                    }
                }
                RegionColumn::Cities => {
                    if app.city_index > 0 {
                        app.city_index -= 1;
                    }
                }
            },
            Down | Char('j') => match app.region_column {
                RegionColumn::Provinces => {
                    if app.province_index + 1 < app.provinces.len() {
                        app.province_index += 1;
                    }
                }
                RegionColumn::Cities => {
                    if app.city_index + 1 < app.cities.len() {
                        app.city_index += 1;
                    }
                }
            },
            Tab | Left | Right => {
                app.region_column = match app.region_column {
                    RegionColumn::Provinces => RegionColumn::Cities,
                    RegionColumn::Cities => RegionColumn::Provinces,
                };
            }
            Enter | Char(' ') => match app.region_column {
                RegionColumn::Provinces => {
                    if let Some((version, province)) = app.choose_highlighted_province() {
                        action = Action::FetchCities(version, province);
                    }
                }
                RegionColumn::Cities => {
                    if let Some(version) = app.choose_highlighted_city() {
                        action = Action::QueryPoints(version);
                    }
                }
            },
            Char('g') => {
                action = Action::ReloadReferenceData;
            }
            _ => {}
        },

        Screen::PointBrowse => match key.code {
            Up | Char('k') => {
                if app.point_index > 0 {
                    app.point_index -= 1;
                }
            }
            Down | Char('j') => {
                if app.point_index + 1 < app.points.len() {
                    app.point_index += 1;
                }
            }
            Left | Char('h') => {
                if app.category_index > 0 {
                    app.category_index -= 1;
                }
            }
            Right | Char('l') => {
                if app.category_index + 1 < app.categories.len() {
                    app.category_index += 1;
                }
            }
            Char(' ') => {
                if let Some(version) = app.toggle_highlighted_category() {
                    action = Action::QueryPoints(version);
                }
            }
            Char('n') => {
                app.open_register_form();
            }
            Char('g') => {
                action = Action::ReloadReferenceData;
            }
            Esc | Char('b') => {
                app.screen = Screen::RegionSelect;
            }
            _ => {}
        },

        Screen::RegisterForm => match key.code {
            Esc => {
                app.screen = Screen::PointBrowse;
            }
            Tab => {
                app.form.focus = app.form.focus.next();
            }
            BackTab => {
                app.form.focus = app.form.focus.previous();
            }
            Up => {
                if app.form.focus == FormFocus::Categories && app.form.category_index > 0 {
                    app.form.category_index -= 1;
                }
            }
            Down => {
                if app.form.focus == FormFocus::Categories
                    && app.form.category_index + 1 < app.categories.len()
                {
                    app.form.category_index += 1;
                }
            }
            Enter => {
                action = Action::SubmitRegistration;
            }
            Char(' ') if app.form.focus == FormFocus::Categories => {
                if let Some(category) = app.categories.get(app.form.category_index) {
                    let id = category.id;
                    if !app.form.categories.remove(&id) {
                        app.form.categories.insert(id);
                    }
                }
            }
            Char(character) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                    && let Some(field) = app.form.active_field_mut()
                {
                    field.push(character);
                }
            }
            Backspace => {
                if let Some(field) = app.form.active_field_mut() {
                    field.pop();
                }
            }
            _ => {}
        },
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecoleta_core::model::{Coordinates, Region};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn app_with_provinces() -> App {
        let mut app = App::new(None);
        app.provinces = vec![
            Region {
                id: RegionId(2),
                name: String::from("Buenos Aires"),
                parent: None,
                centroid: Coordinates { lat: -36.67, long: -60.56 },
            },
            Region {
                id: RegionId(3),
                name: String::from("Córdoba"),
                parent: None,
                centroid: Coordinates { lat: -32.14, long: -63.80 },
            },
        ];
        app
    }

    #[test]
    fn enter_on_a_province_requests_the_city_fetch() {
        let mut app = app_with_provinces();
        let action = handle_key_event(key(KeyCode::Enter), &mut app);
        assert!(matches!(action, Action::FetchCities(_, RegionId(2))));
        assert_eq!(app.region_column, RegionColumn::Cities);
    }

    #[test]
    fn enter_on_an_empty_city_column_does_nothing() {
        let mut app = app_with_provinces();
        handle_key_event(key(KeyCode::Enter), &mut app);
        // City list still empty while the dependent fetch is outstanding.
        let action = handle_key_event(key(KeyCode::Enter), &mut app);
        assert!(matches!(action, Action::None));
    }

    #[test]
    fn typing_into_the_form_does_not_quit() {
        let mut app = App::new(None);
        app.screen = Screen::RegisterForm;
        let action = handle_key_event(key(KeyCode::Char('q')), &mut app);
        assert!(matches!(action, Action::None));
        assert_eq!(app.form.name, "q");
    }
}
