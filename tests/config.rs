mod common;

use bridge_map::{
    config::{DashboardConfig, View},
    filter::{Choice, Range},
    record::RouteType,
};
use common::TestWorkspace;

#[test]
fn saved_defaults_load_back_unchanged() {
    let workspace = TestWorkspace::new();
    let path = workspace.path().join("dashboard.yaml");
    DashboardConfig::default().save(&path).expect("save config");
    let loaded = DashboardConfig::load(&path).expect("load config");
    assert_eq!(loaded, DashboardConfig::default());
}

#[test]
fn single_state_deployment_overrides_zoom_and_states() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "utah.yaml",
        "viewport:\n  selection_zoom: 5\n\
heatmap:\n  states: [Utah]\n\
scatter:\n  states: [Utah]\n  route_type: State highway\n\
sliders:\n  ratings:\n    low: 0\n    high: 9\n",
    );
    let config = DashboardConfig::load(&path).expect("load config");
    assert_eq!(config.viewport.selection_zoom, 5);

    let scatter = config.view_spec(View::Scatter).expect("scatter spec");
    assert!(scatter.regions.matches("Utah"));
    assert!(!scatter.regions.matches("Ohio"));
    assert_eq!(scatter.route_type, Choice::Only(RouteType::State));
    assert_eq!(scatter.ratings, Range::new(0, 9));
    assert_eq!(scatter.years, Range::new(1697, 2023));
}

#[test]
fn missing_config_path_uses_built_in_defaults() {
    let config = DashboardConfig::load_or_default(None).expect("defaults");
    assert_eq!(config, DashboardConfig::default());
}

#[test]
fn invalid_config_reports_the_file() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("bad.yaml", "sliders:\n  spans:\n    low: 20\n    high: 3\n");
    let err = DashboardConfig::load(&path).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("bad.yaml"));
    assert!(message.contains("Span slider"));
}

#[test]
fn unreadable_yaml_is_an_error() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("broken.yaml", "viewport: [not, a, map\n");
    assert!(DashboardConfig::load(&path).is_err());
    assert!(DashboardConfig::load(&workspace.path().join("absent.yaml")).is_err());
}
