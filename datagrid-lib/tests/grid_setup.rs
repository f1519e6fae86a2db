//! Integration tests for grid configuration: static config application,
//! column visibility management, and registration-time gating.

mod common;

use std::sync::Arc;

use datagrid_lib::{Grid, GridConfig, Tweak};
use datagrid_lib::action::MassAction;
use datagrid_lib::column::Column;
use datagrid_lib::http::GridServices;
use datagrid_lib::model::Row;
use datagrid_lib::source::VectorSource;

use common::{DenyAll, MemorySession, MockRequest, StubRouter, empty_session, people_grid, people_rows};

fn configured_grid(config: GridConfig) -> Grid {
    let mut grid = Grid::with_config(common::services(empty_session()), "books", config);
    grid.add_column(Column::new("id", "Id").primary(true));
    grid.add_column(Column::new("name", "Name"));
    grid
}

#[test]
fn test_initialize_applies_config() {
    let mut grid = configured_grid(
        GridConfig::new()
            .with_route("books_list")
            .with_persistence(true)
            .with_sort_by("name")
            .with_order("DESC")
            .with_max_per_page(25)
            .with_max_results(500)
            .with_page(2)
            .with_source(Box::new(VectorSource::new("people", people_rows()))),
    );
    grid.initialize().unwrap();

    assert_eq!(grid.route_url().as_deref(), Some("/books_list"));
    assert!(grid.is_persisted());
    assert_eq!(grid.default_order(), Some("name|desc"));
    assert_eq!(grid.limits().get(&25), Some(&"25".to_string()));
    assert_eq!(grid.max_results(), Some(500));
    assert_eq!(grid.page(), 2);
}

#[test]
fn test_initialize_without_config_is_noop() {
    let mut grid = people_grid(empty_session());
    grid.initialize().unwrap();
    assert_eq!(grid.page(), 0);
    assert!(grid.limits().is_empty());
}

#[test]
fn test_sort_by_without_order_keeps_trailing_separator() {
    let mut grid = configured_grid(GridConfig::new().with_sort_by("name"));
    grid.initialize().unwrap();
    assert_eq!(grid.default_order(), Some("name|"));
}

#[test]
fn test_config_source_does_not_replace_existing() {
    let mut grid = Grid::with_config(
        common::services(empty_session()),
        "books",
        GridConfig::new().with_source(Box::new(VectorSource::new("extra", Vec::new()))),
    );
    grid.add_column(Column::new("id", "Id").primary(true));
    grid.set_source(Box::new(VectorSource::new("kept", people_rows())))
        .unwrap();
    grid.initialize().unwrap();
    grid.handle_request(&MockRequest::new()).unwrap();
    // The explicitly attached source stays in place.
    assert_eq!(grid.rows().unwrap().len(), 3);
}

#[test]
fn test_config_disables_filtering_and_sorting() {
    let mut grid = configured_grid(
        GridConfig::new().with_filterable(false).with_sortable(false),
    );
    grid.initialize().unwrap();
    assert!(!grid.column("name").unwrap().is_filterable());
    assert!(!grid.column("name").unwrap().is_sortable());
}

#[test]
fn test_visible_columns_whitelist() {
    let mut grid = people_grid(empty_session());
    grid.set_visible_columns(["name"]);
    grid.handle_request(&MockRequest::new()).unwrap();
    let visible: Vec<_> = grid.columns().iter_visible().map(Column::id).collect();
    assert_eq!(visible, ["name"]);
}

#[test]
fn test_hidden_columns() {
    let mut grid = people_grid(empty_session());
    grid.set_hidden_columns(["age"]);
    grid.handle_request(&MockRequest::new()).unwrap();
    let visible: Vec<_> = grid.columns().iter_visible().map(Column::id).collect();
    assert_eq!(visible, ["id", "name"]);
}

#[test]
fn test_show_overrides_hidden() {
    let mut grid = people_grid(empty_session());
    grid.set_hidden_columns(["age"]);
    grid.show_columns(["age"]);
    grid.handle_request(&MockRequest::new()).unwrap();
    assert!(grid.columns().get("age").unwrap().is_visible());
}

#[test]
fn test_role_gated_column_hidden() {
    let session = Arc::new(MemorySession::default());
    let services = GridServices::new(Arc::new(StubRouter), Arc::new(DenyAll), session);
    let mut grid = Grid::new(services, "books");
    grid.add_column(Column::new("id", "Id").primary(true));
    grid.add_column(Column::new("salary", "Salary").with_role("ROLE_HR"));
    grid.set_source(Box::new(VectorSource::new(
        "people",
        vec![Row::new().set("id", 1i64).set("salary", 100i64)],
    )))
    .unwrap();
    grid.handle_request(&MockRequest::new()).unwrap();
    assert!(!grid.columns().get("salary").unwrap().is_visible());
}

#[test]
fn test_role_gated_registrations_dropped() {
    let session = Arc::new(MemorySession::default());
    let services = GridServices::new(Arc::new(StubRouter), Arc::new(DenyAll), session);
    let mut grid = Grid::new(services, "books");
    grid.add_mass_action(MassAction::new("Purge").with_role("ROLE_ADMIN"));
    assert!(grid.mass_actions().is_empty());
}

#[test]
fn test_columns_reorder() {
    let mut grid = people_grid(empty_session());
    grid.handle_request(&MockRequest::new()).unwrap();
    grid.set_columns_order(&["age", "id"], true);
    let ids: Vec<_> = grid.columns().iter().map(Column::id).collect();
    assert_eq!(ids, ["age", "id", "name"]);
}

#[test]
fn test_tweaks_get_sequential_ids() {
    let mut grid = people_grid(empty_session());
    grid.add_tweak("First", Tweak::new(), None, None).unwrap();
    grid.add_tweak("Second", Tweak::new(), None, None).unwrap();
    let keys: Vec<_> = grid.tweaks().keys().cloned().collect();
    assert_eq!(keys, ["0", "1"]);
}

#[test]
fn test_route_url_falls_back_to_request_route() {
    let mut grid = people_grid(empty_session());
    assert_eq!(grid.route_url(), None);
    grid.handle_request(&MockRequest::new()).unwrap();
    assert_eq!(grid.route_url().as_deref(), Some("/grid"));
}

#[test]
fn test_section_visibility_flags() {
    let mut grid = people_grid(empty_session());
    grid.handle_request(&MockRequest::new()).unwrap();
    assert!(grid.is_title_section_visible());
    assert!(grid.is_filter_section_visible());

    let mut grid = people_grid(empty_session());
    grid.hide_titles();
    grid.hide_filters();
    grid.handle_request(&MockRequest::new()).unwrap();
    assert!(!grid.is_title_section_visible());
    assert!(!grid.is_filter_section_visible());
}

#[test]
fn test_route_parameters_reach_router() {
    struct EchoRouter;
    impl datagrid_lib::http::Router for EchoRouter {
        fn generate(
            &self,
            route: &str,
            parameters: &indexmap::IndexMap<String, String>,
        ) -> String {
            let query: Vec<String> = parameters
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            format!("/{route}?{}", query.join("&"))
        }
    }

    let session = Arc::new(MemorySession::default());
    let services = GridServices::new(
        Arc::new(EchoRouter),
        Arc::new(common::GrantAll),
        session,
    );
    let mut grid = Grid::with_config(
        services,
        "books",
        GridConfig::new()
            .with_route("books_list")
            .with_route_parameter("shelf", "top"),
    );
    grid.initialize().unwrap();
    assert_eq!(grid.route_url().as_deref(), Some("/books_list?shelf=top"));
}
