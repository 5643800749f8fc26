use anydash::config::{BarLabelFormat, DashboardConfig};
use anydash::data::{apply_filters, load_upload, FilterSelection, Upload};
use anydash::pipeline::{compute, run, Dataset, UserChoices};

const SAMPLE: &str = "A,V\nx,1\ny,2\nx,3\n";

fn upload(csv: &str) -> Upload {
    Upload::new("sample.csv", csv.as_bytes().to_vec())
}

fn dataset(csv: &str) -> Dataset {
    Dataset::from_upload(&upload(csv), &DashboardConfig::default()).unwrap()
}

fn only_x() -> FilterSelection {
    let mut selection = FilterSelection::new();
    selection.set("A", ["x"]);
    selection
}

#[test]
fn filtered_view_keeps_matching_rows() {
    let data = dataset(SAMPLE);
    let filtered = apply_filters(&data.table, &only_x(), &data.classification.categorical).unwrap();

    assert_eq!(
        filtered.text_values("A").unwrap(),
        vec![Some("x".to_string()), Some("x".to_string())]
    );
    assert_eq!(
        filtered.numeric_values("V").unwrap(),
        vec![Some(1.0), Some(3.0)]
    );
}

#[test]
fn filtered_row_count_never_exceeds_table() {
    let data = dataset("Region,Segment,Sales\nEast,A,1\nWest,B,2\nEast,B,3\nNorth,A,4\n");
    let config = DashboardConfig::default();

    let unfiltered = compute(&data, &FilterSelection::new(), &UserChoices::default(), &config)
        .unwrap();
    assert_eq!(unfiltered.filtered_rows, unfiltered.total_rows);

    let mut selections = Vec::new();
    for region in ["East", "West", "South"] {
        for segment in [None, Some("A"), Some("B")] {
            let mut selection = FilterSelection::new();
            selection.set("Region", [region]);
            if let Some(segment) = segment {
                selection.set("Segment", [segment]);
            }
            selections.push(selection);
        }
    }

    for selection in &selections {
        let model = compute(&data, selection, &UserChoices::default(), &config).unwrap();
        assert!(model.filtered_rows <= model.total_rows);
    }
}

#[test]
fn applying_filters_twice_changes_nothing() {
    let data = dataset(SAMPLE);
    let categorical = &data.classification.categorical;
    let once = apply_filters(&data.table, &only_x(), categorical).unwrap();
    let twice = apply_filters(&once, &only_x(), categorical).unwrap();
    assert!(once.same_content(&twice));
}

#[test]
fn bar_chart_means_before_and_after_filter() {
    let data = dataset(SAMPLE);
    let config = DashboardConfig::default();
    let choices = UserChoices::default();

    let before = compute(&data, &FilterSelection::new(), &choices, &config).unwrap();
    let groups: Vec<(String, f64)> = before
        .bar
        .unwrap()
        .groups
        .into_iter()
        .map(|g| (g.category, g.mean))
        .collect();
    assert_eq!(groups, vec![("x".to_string(), 2.0), ("y".to_string(), 2.0)]);

    let after = compute(&data, &only_x(), &choices, &config).unwrap();
    let bar = after.bar.unwrap();
    assert_eq!(bar.groups.len(), 1);
    assert_eq!(bar.groups[0].category, "x");
    assert_eq!(bar.groups[0].mean, 2.0);
    assert_eq!(bar.groups[0].label, "$2.00");
}

#[test]
fn bar_labels_follow_configured_format() {
    let data = dataset("A,V\nx,1234.5\n");
    let config = DashboardConfig {
        bar_label: BarLabelFormat::Plain,
        ..Default::default()
    };
    let model = compute(&data, &FilterSelection::new(), &UserChoices::default(), &config).unwrap();
    assert_eq!(model.bar.unwrap().groups[0].label, "1234.50");
}

#[test]
fn pie_chart_counts_category_occurrences() {
    let data = dataset(SAMPLE);
    let model = compute(
        &data,
        &FilterSelection::new(),
        &UserChoices::default(),
        &DashboardConfig::default(),
    )
    .unwrap();

    let counts: Vec<(String, usize)> = model
        .pie
        .unwrap()
        .slices
        .into_iter()
        .map(|s| (s.label, s.count))
        .collect();
    assert_eq!(counts, vec![("x".to_string(), 2), ("y".to_string(), 1)]);
}

#[test]
fn time_series_buckets_by_month() {
    let data = dataset("Date,V\n2023-01-05,10\n2023-01-20,20\n");
    let model = compute(
        &data,
        &FilterSelection::new(),
        &UserChoices::default(),
        &DashboardConfig::default(),
    )
    .unwrap();

    let series = model.time_series.unwrap();
    assert_eq!(series.date_column, "Date");
    assert_eq!(series.points.len(), 1);
    assert_eq!(series.points[0].month.to_string(), "2023-01");
    assert_eq!(series.points[0].mean, 15.0);
}

#[test]
fn export_round_trips_the_filtered_view() {
    let config = DashboardConfig::default();
    let data = dataset("Region,Sales,Note\nEast,1.5,a\nWest,2,\nEast,3.25,\"c, d\"\n");
    let mut selection = FilterSelection::new();
    selection.set("Region", ["East"]);

    let model = compute(&data, &selection, &UserChoices::default(), &config).unwrap();
    assert_eq!(model.export.file_name, "Filtered_Data.csv");
    assert_eq!(model.export.mime, "text/csv");

    let reloaded = load_upload(
        &Upload::new("Filtered_Data.csv", model.export.bytes.clone()),
        &config,
    )
    .unwrap();
    let filtered = apply_filters(&data.table, &selection, &data.classification.categorical)
        .unwrap();

    assert_eq!(reloaded.column_names(), filtered.column_names());
    assert_eq!(
        reloaded.numeric_values("Sales").unwrap(),
        filtered.numeric_values("Sales").unwrap()
    );
    assert_eq!(
        reloaded.text_values("Note").unwrap(),
        vec![Some("a".to_string()), Some("c, d".to_string())]
    );
}

#[test]
fn missing_upload_stops_cleanly() {
    let result = run(
        None,
        &FilterSelection::new(),
        &UserChoices::default(),
        &DashboardConfig::default(),
    )
    .unwrap();
    assert!(result.is_none());
}

#[test]
fn full_run_from_upload() {
    let model = run(
        Some(&upload(SAMPLE)),
        &only_x(),
        &UserChoices::default(),
        &DashboardConfig::default(),
    )
    .unwrap()
    .unwrap();
    assert_eq!(model.total_rows, 3);
    assert_eq!(model.filtered_rows, 2);
    let stats = model.statistics.unwrap();
    assert_eq!(stats[0].column, "V");
    assert_eq!(stats[0].count, 2);
    assert_eq!(stats[0].mean, 2.0);
}

#[test]
fn boolean_column_is_filterable() {
    let data = dataset("Flag,V\nTrue,1\nFalse,2\nTrue,3\n");
    assert!(data.classification.is_categorical("Flag"));
    let flag = data
        .filter_options
        .iter()
        .find(|f| f.column == "Flag")
        .unwrap();
    assert_eq!(flag.values, vec!["true", "false"]);

    let mut selection = FilterSelection::new();
    selection.set("Flag", ["true"]);
    let model = compute(
        &data,
        &selection,
        &UserChoices::default(),
        &DashboardConfig::default(),
    )
    .unwrap();
    assert_eq!(model.filtered_rows, 2);
    assert_eq!(model.bar.unwrap().groups[0].mean, 2.0);
    assert!(model.time_series.is_none());
}
