//! End-to-end tests for the workspace running on the in-process service.

use std::fs;
use std::io::Write;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::{NamedTempFile, TempDir};

use prepper::{
    AnalysisService, Dataset, LocalService, PrepError, PrepperConfig, RecommendationKind,
    TransformRequest, VizKind, Workspace,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn create_survey_data() -> NamedTempFile {
    create_test_file(
        "id,age,city,income,flag\n\
         1,34,Oslo,52000,yes\n\
         2,,Bergen,61000,yes\n\
         3,45,,58000,yes\n\
         4,29,Oslo,,yes\n\
         5,,Oslo,49000,yes\n\
         6,52,Bergen,75000,yes\n\
         7,41,Oslo,66000,yes\n\
         8,38,Bergen,59000,yes\n\
         9,,Oslo,62000,yes\n\
         10,47,Oslo,71000,yes\n",
    )
}

fn open_workspace(config: PrepperConfig) -> Workspace {
    let file = create_survey_data();
    let mut ws = Workspace::from_config(config).expect("Failed to build workspace");
    ws.open(Dataset::from_path(file.path()).expect("Failed to read dataset"))
        .expect("Failed to open dataset");
    ws
}

fn impute_mean(column: &str) -> TransformRequest {
    TransformRequest::from_parts("impute", [column], &json!({ "method": "mean" })).unwrap()
}

// =============================================================================
// Session lifecycle
// =============================================================================

#[test]
fn test_open_populates_preview_and_stats() {
    let ws = open_workspace(PrepperConfig::default());

    assert_eq!(
        ws.preview().columns,
        vec!["id", "age", "city", "income", "flag"]
    );
    assert_eq!(ws.preview().row_count(), 10);
    assert_eq!(ws.preview().rows[1].get("age"), Some(&Value::Null));
    assert_eq!(ws.column_stats().len(), 5);
    assert_eq!(ws.undo_depth(), 0);
    assert!(!ws.can_undo());
}

#[test]
fn test_row_limit_caps_preview() {
    let ws = open_workspace(PrepperConfig {
        row_limit: 3,
        ..PrepperConfig::default()
    });
    assert_eq!(ws.preview().row_count(), 3);
    // stats still cover the whole table
    assert_eq!(ws.column_stats()["id"].count, 10);
}

#[test]
fn test_reopen_resets_history() {
    let mut ws = open_workspace(PrepperConfig::default());
    ws.apply(impute_mean("age")).unwrap();
    assert_eq!(ws.undo_depth(), 1);

    let other = create_test_file("x,y\n1,2\n");
    ws.open(Dataset::from_path(other.path()).unwrap()).unwrap();
    assert_eq!(ws.undo_depth(), 0);
    assert!(!ws.can_undo());
    assert_eq!(ws.preview().columns, vec!["x", "y"]);
    assert!(ws.dismissals().is_empty());
}

#[test]
fn test_reopen_releases_previous_session() {
    let service = Arc::new(LocalService::new());
    let mut ws = Workspace::new(service.clone(), PrepperConfig::default());

    for i in 0..5 {
        let csv = format!("a,b\n{},x\n", i);
        ws.open(Dataset::from_bytes("d.csv", csv)).unwrap();
        ws.apply(TransformRequest::from_parts("drop", ["b"], &json!({})).unwrap())
            .unwrap();
    }

    assert_eq!(service.session_count(), 1);
    let live = ws.session().map(|s| s.id.clone()).unwrap();
    assert_eq!(service.stack_depth(&live), 2);
}

#[test]
fn test_rejected_dataset() {
    let service = Arc::new(LocalService::new());
    let mut ws = Workspace::new(service, PrepperConfig::default());
    let err = ws.open(Dataset::from_bytes("empty.csv", "")).unwrap_err();
    assert!(matches!(err, PrepError::SessionCreation { .. }));
    assert!(ws.session().is_none());
}

// =============================================================================
// Transformations and undo
// =============================================================================

#[test]
fn test_apply_then_undo_restores_table() {
    let mut ws = open_workspace(PrepperConfig::default());
    let before = ws.preview().clone();

    ws.apply(impute_mean("age")).unwrap();
    assert!(ws.preview().column("age").iter().all(|v| !v.is_null()));
    assert_eq!(ws.undo_depth(), 1);
    assert!(ws.can_undo());

    ws.undo().unwrap();
    assert_eq!(ws.preview(), &before);
    assert_eq!(ws.undo_depth(), 0);
    assert!(!ws.can_undo());
}

#[test]
fn test_undo_at_depth_zero_is_rejected() {
    let mut ws = open_workspace(PrepperConfig::default());
    let before = ws.preview().clone();
    let err = ws.undo().unwrap_err();
    assert!(matches!(err, PrepError::NothingToUndo(_)));
    assert_eq!(ws.preview(), &before);
}

#[test]
fn test_scale_text_column_is_transformation_error() {
    let mut ws = open_workspace(PrepperConfig::default());
    let request = TransformRequest::from_parts("scale", ["city"], &json!({})).unwrap();

    let err = ws.apply(request).unwrap_err();
    assert!(matches!(err, PrepError::Transformation(_)));
    assert_eq!(ws.undo_depth(), 0);
}

#[test]
fn test_onehot_appends_columns() {
    let mut ws = open_workspace(PrepperConfig::default());
    let request = TransformRequest::from_parts("encode", ["city"], &json!({})).unwrap();
    ws.apply(request).unwrap();

    assert_eq!(
        ws.preview().columns,
        vec!["id", "age", "income", "flag", "city_Bergen", "city_Oslo"]
    );
    assert_eq!(ws.preview().rows[0].get("city_Oslo"), Some(&json!(true)));
    assert!(ws.column_stats().contains_key("city_Oslo"));
}

#[test]
fn test_history_records_transformations() {
    let mut ws = open_workspace(PrepperConfig::default());
    ws.apply(impute_mean("age")).unwrap();
    ws.apply(TransformRequest::from_parts("drop", ["flag"], &json!({})).unwrap())
        .unwrap();

    let actions: Vec<&str> = ws.history().iter().map(|r| r.action().as_str()).collect();
    assert_eq!(actions, vec!["impute", "drop"]);
    assert_eq!(ws.history()[1].columns, vec!["flag"]);
}

// =============================================================================
// Stats, ranking and recommendations
// =============================================================================

#[test]
fn test_default_display_columns_are_healthiest() {
    let ws = open_workspace(PrepperConfig {
        display_columns: 2,
        ..PrepperConfig::default()
    });
    assert_eq!(ws.display_columns(), ["city", "age"]);
}

#[test]
fn test_display_selection_survives_transformations() {
    let mut ws = open_workspace(PrepperConfig::default());
    ws.select_display_columns(["income", "flag"]).unwrap();

    ws.apply(impute_mean("age")).unwrap();
    assert_eq!(ws.display_columns(), ["income", "flag"]);

    ws.apply(TransformRequest::from_parts("drop", ["income"], &json!({})).unwrap())
        .unwrap();
    assert_eq!(ws.display_columns(), ["flag"]);

    // emptied by a drop, and refreshes after transformations never reset it
    ws.apply(TransformRequest::from_parts("drop", ["flag"], &json!({})).unwrap())
        .unwrap();
    assert!(ws.display_columns().is_empty());
}

#[test]
fn test_visible_recommendations() {
    let ws = open_workspace(PrepperConfig::default());
    let recs = ws.visible_recommendations();

    let pairs: Vec<(&str, RecommendationKind)> =
        recs.iter().map(|r| (r.column.as_str(), r.kind)).collect();
    assert_eq!(
        pairs,
        vec![
            ("id", RecommendationKind::DropSuggested),
            ("age", RecommendationKind::ImputeSuggested),
            ("income", RecommendationKind::DropSuggested),
            ("flag", RecommendationKind::DropSuggested),
        ]
    );
    assert_eq!(recs[1].text, "Consider imputing missing values.");
}

#[test]
fn test_one_click_dismissal_follows_stats() {
    let mut ws = open_workspace(PrepperConfig::default());

    let applied = ws
        .apply_recommendation("age", "Consider imputing missing values.")
        .unwrap();
    assert!(applied);
    assert_eq!(ws.undo_depth(), 1);
    assert!(!ws.visible_recommendations().iter().any(|r| r.column == "age"));
    // imputing cleared the text, so nothing is left to dismiss
    assert!(ws.dismissals().for_column("age").is_none());

    // undo regenerates the recommendation and it shows again
    ws.undo().unwrap();
    assert!(ws
        .visible_recommendations()
        .iter()
        .any(|r| r.column == "age" && r.text == "Consider imputing missing values."));
}

#[test]
fn test_dismissal_pruned_when_column_dropped() {
    let mut ws = open_workspace(PrepperConfig::default());
    ws.dismiss("flag", "Consider dropping this column as it is nearly constant.");
    assert_eq!(ws.dismissals().len(), 1);

    ws.apply(TransformRequest::from_parts("drop", ["flag"], &json!({})).unwrap())
        .unwrap();
    assert!(ws.dismissals().is_empty());
}

#[test]
fn test_heatmap_and_viz() {
    let mut ws = open_workspace(PrepperConfig::default());
    let heatmap = ws.heatmap();
    assert_eq!(heatmap.columns.len(), 5);
    assert_eq!(heatmap.rows.len(), 4);

    ws.set_viz("age", VizKind::Histogram).unwrap();
    assert_eq!(ws.viz_for("age"), Some(VizKind::Histogram));
    assert!(ws.set_viz("city", VizKind::Box).is_err());
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_export_to_file() {
    let mut ws = open_workspace(PrepperConfig::default());
    ws.apply(TransformRequest::from_parts("drop", ["income", "flag"], &json!({})).unwrap())
        .unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clean.csv");
    ws.export_to(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 11);
    assert_eq!(lines[0], "\"id\",\"age\",\"city\"");
    assert_eq!(lines[1], "\"1\",\"34\",\"Oslo\"");
    assert_eq!(lines[2], "\"2\",\"\",\"Bergen\"");
}

#[test]
fn test_service_is_shareable() {
    let service: Arc<dyn AnalysisService> = Arc::new(LocalService::new());
    let file = create_survey_data();
    let dataset = Dataset::from_path(file.path()).unwrap();

    let mut a = Workspace::new(Arc::clone(&service), PrepperConfig::default());
    let mut b = Workspace::new(service, PrepperConfig::default());
    a.open(dataset.clone()).unwrap();
    b.open(dataset).unwrap();

    a.apply(impute_mean("age")).unwrap();
    assert_eq!(a.undo_depth(), 1);
    assert_eq!(b.undo_depth(), 0);
    assert_eq!(b.preview().rows[1].get("age"), Some(&Value::Null));
}
