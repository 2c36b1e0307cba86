//! Integration tests for rendering a column stack over a CSV input.

use std::fs;
use std::path::PathBuf;

use colstack_binning::BinError;
use colstack_model::{BinInclude, ColumnOptions, ColumnStack, CreateFunc, ScalarType};
use colstack_transform::{StackHandler, TransformError, text_values};
use polars::prelude::AnyValue;
use tempfile::TempDir;

const INPUT: &str = "\
pat_id,country,location_code,dob,lot1,aspirin
1,gb,83476,1970-01-01,2010-06-15,yes
2,fr,12345,1985-03-20,2012-01-01,no
3,gb,55555,1992-11-30,2013-05-05,
4,us,,1960-07-04,2011-02-02,true
";

const PAYLOAD: &str = r#"{
    "columnOptions": [
        {"name": "pat_id", "dtype": "str"},
        {"name": "country", "dtype": "cat"},
        {"name": "location_code", "dtype": "int"},
        {"name": "dob", "dtype": "date"},
        {"name": "lot1", "dtype": "date"},
        {"name": "aspirin", "dtype": "bool"},
        {
            "name": "age_at_lot1",
            "dtype": "float",
            "create_func": "get_age_float",
            "create_args": ["lot1", "dob"],
            "bins": {
                "<20": "[..20)",
                "20s": "[20..30)",
                "30s": "[30..40)",
                "40s": "[40..50)",
                "50+": "[50..)"
            }
        }
    ]
}"#;

fn input_file() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test-col-ops.csv");
    fs::write(&path, INPUT).unwrap();
    (dir, path)
}

fn handler() -> (TempDir, StackHandler) {
    let (dir, path) = input_file();
    (dir, StackHandler::from_csv(&path).unwrap())
}

fn loaded() -> (TempDir, StackHandler) {
    let (dir, mut handler) = handler();
    handler.load_json(PAYLOAD).unwrap();
    (dir, handler)
}

fn texts(handler: &StackHandler, column: &str) -> Vec<Option<String>> {
    text_values(handler.frame().column(column).unwrap()).unwrap()
}

#[test]
fn test_ingest_csv() {
    let (_dir, handler) = handler();
    let frame_names: Vec<String> = handler
        .frame()
        .get_column_names()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(handler.column_names(), frame_names);
}

#[test]
fn test_load_config() {
    let (_dir, handler) = loaded();

    assert!(handler.column_names().contains(&"age_at_lot1".to_string()));
    assert!(handler.frame().column("age_at_lot1").is_ok());
    assert!(handler.column_names().contains(&"age_at_lot1_binned".to_string()));

    let labels = texts(&handler, "age_at_lot1_binned");
    assert!(labels.contains(&Some("20s".to_string())));
    insta::assert_snapshot!(
        labels.iter().flatten().cloned().collect::<Vec<_>>().join(", "),
        @"40s, 20s, 20s, 50+"
    );
}

#[test]
fn test_typed_columns() {
    let (_dir, handler) = loaded();

    assert_eq!(handler.column_type("country").unwrap(), ScalarType::Category);
    assert_eq!(handler.column_type("dob").unwrap(), ScalarType::Date);
    assert_eq!(handler.column_type("aspirin").unwrap(), ScalarType::Bool);
    assert_eq!(
        texts(&handler, "aspirin"),
        vec![
            Some("true".to_string()),
            Some("false".to_string()),
            None,
            Some("true".to_string()),
        ]
    );
}

#[test]
fn test_apply_filters() {
    let (_dir, mut handler) = loaded();
    assert!(texts(&handler, "country").contains(&Some("fr".to_string())));

    let country = handler.stack_mut().get_mut("country").unwrap();
    country.filters = serde_json::from_str(r#"{"__eq__": "gb"}"#).unwrap();
    handler.render().unwrap();

    assert!(!texts(&handler, "country").contains(&Some("fr".to_string())));
    assert_eq!(handler.frame().height(), 2);
    assert_eq!(texts(&handler, "age_at_lot1_binned").len(), 2);
}

#[test]
fn test_amend_dump() {
    let (_dir, mut handler) = loaded();
    let location = handler.frame().column("location_code").unwrap().get(0).unwrap();
    assert_eq!(location, AnyValue::Int64(83476));

    handler
        .stack_mut()
        .get_mut("location_code")
        .unwrap()
        .set_dtype("str")
        .unwrap();
    handler.render().unwrap();

    let location = handler.frame().column("location_code").unwrap().get(0).unwrap();
    assert_eq!(location, AnyValue::String("83476"));

    let dump = handler.dump().unwrap();
    assert!(dump.is_object());
    assert_eq!(dump["columnOptions"][2]["dtype"], "str");
    assert!(dump["columnOptions"][2].get("bins").is_none());
}

#[test]
fn test_dump_reloads() {
    let (_dir, mut handler) = loaded();
    let dump = handler.dump().unwrap();
    let reloaded: ColumnStack = serde_json::from_value(dump).unwrap();
    assert_eq!(&reloaded, handler.stack());

    handler.load(reloaded).unwrap();
    assert_eq!(handler.frame().height(), 4);
}

#[test]
fn test_set_friendly_name() {
    let (_dir, mut handler) = loaded();
    let country = handler.stack_mut().get_mut("country").unwrap();
    country.set_friendly_name("Country of Birth");
    assert_eq!(
        handler.stack().get("country").unwrap().friendly_name.as_deref(),
        Some("Country of Birth")
    );
}

#[test]
fn test_append_columns() {
    let (_dir, mut handler) = loaded();

    let mut extra = ColumnStack::default();
    extra.append_column(ColumnOptions {
        create_func: Some(CreateFunc::CopyCol),
        create_args: vec!["country".to_string()],
        bins: [("western", "[gb,fr]")].into_iter().collect(),
        bin_include: BinInclude::new(true, false),
        bin_name: Some("region".to_string()),
        ..ColumnOptions::new("country_copy")
    });

    handler.append_columns(extra).unwrap();

    assert_eq!(texts(&handler, "country_copy"), texts(&handler, "country"));
    assert_eq!(
        handler.bin_groups("country_copy").unwrap(),
        vec![
            ("western".to_string(), vec![0, 1, 2]),
            ("other".to_string(), vec![3]),
        ]
    );
    assert!(
        handler
            .column_names()
            .ends_with(&["country_copy".to_string(), "region".to_string()])
    );
}

#[test]
fn test_namespace_and_parse_functions() {
    let (_dir, mut handler) = handler();
    handler
        .load_json(
            r#"{
                "nameSpace": {"birth": "dob"},
                "columnOptions": [
                    {
                        "name": "birth",
                        "parse_funcs": ["to_date_str"],
                        "parse_kwargs": [{"input_format": "%Y-%m-%d", "output_format": "%d/%m/%Y"}]
                    }
                ]
            }"#,
        )
        .unwrap();

    assert_eq!(
        texts(&handler, "birth")[0].as_deref(),
        Some("01/01/1970")
    );
    assert_eq!(texts(&handler, "dob")[0].as_deref(), Some("1970-01-01"));
}

fn location_bins(overlap: Option<&str>) -> String {
    let policy = overlap.map_or_else(String::new, |p| format!(r#", "bin_overlap": "{p}""#));
    format!(
        r#"{{"columnOptions": [{{
            "name": "location_code",
            "dtype": "int",
            "bins": {{"z_low": "[..60000]", "a_high": "[20000..]"}}{policy}
        }}]}}"#
    )
}

#[test]
fn test_overlapping_bins_reported_with_column() {
    let (_dir, mut handler) = handler();
    let err = handler.load_json(&location_bins(None)).unwrap_err();

    let TransformError::Bin { column, source } = err else {
        panic!("expected a bin error, got {err}");
    };
    assert_eq!(column, "location_code");
    assert!(matches!(
        source,
        BinError::OverlappingBin { row: 2, ref bins } if bins == &["z_low", "a_high"]
    ));
}

#[test]
fn test_overlapping_bins_explicit_reject() {
    let (_dir, mut handler) = handler();
    let err = handler.load_json(&location_bins(Some("reject"))).unwrap_err();
    assert!(
        err.to_string().contains("location_code"),
        "unexpected error: {err}"
    );
    assert!(matches!(
        err,
        TransformError::Bin { source: BinError::OverlappingBin { row: 2, .. }, .. }
    ));
}

#[test]
fn test_overlapping_bins_last_wins() {
    let (_dir, mut handler) = handler();
    handler.load_json(&location_bins(Some("last_wins"))).unwrap();

    assert_eq!(
        texts(&handler, "location_code_binned"),
        vec![
            Some("a_high".to_string()),
            Some("z_low".to_string()),
            Some("a_high".to_string()),
            None,
        ]
    );
    assert_eq!(
        handler.bin_groups("location_code").unwrap(),
        vec![
            ("a_high".to_string(), vec![0, 2]),
            ("z_low".to_string(), vec![1]),
        ]
    );

    let dump = handler.dump().unwrap();
    let keys: Vec<_> = dump["columnOptions"][0]["bins"]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(keys, vec!["z_low", "a_high"]);
    assert_eq!(dump["columnOptions"][0]["bin_overlap"], "last_wins");
}

#[test]
fn test_ne_filter_keeps_null_rows() {
    let (_dir, mut handler) = loaded();
    let location = handler.stack_mut().get_mut("location_code").unwrap();
    location.filters = serde_json::from_str(r#"{"__ne__": 12345}"#).unwrap();
    handler.render().unwrap();

    assert_eq!(
        texts(&handler, "pat_id"),
        vec![
            Some("1".to_string()),
            Some("3".to_string()),
            Some("4".to_string()),
        ]
    );
}

#[test]
fn test_unknown_dtype_rejected_on_load() {
    let (_dir, mut handler) = handler();
    let err = handler
        .load_json(r#"{"columnOptions": [{"name": "country", "dtype": "money"}]}"#)
        .unwrap_err();
    assert!(err.to_string().contains("money"));
}
