//! End-to-end checks of load → filter → aggregate → export, plus
//! property tests over random campaign tables.

use campaign_core::{Table, Value};
use campaign_reporting::aggregate::{marketing_row_metrics, MARKETING_SUM_COLUMNS};
use campaign_reporting::{
    append_missing_metrics, read_table, render_document, to_csv, MetricsAggregator, ValueFilter,
};
use proptest::prelude::*;

const SAMPLE: &str = "\
date,channel,impressions,clicks,conversions,cost
2024-01-01,Email,1000,50,5,25.50
2024-01-01,Search,4000,120,12,180.00
2024-01-02,Email,1200,60,0,30.00
2024-01-02,Social,3000,45,3,60.25
2024-01-03,Search,3800,100,10,170.00
";

fn channel_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Email".to_string()),
        Just("Search".to_string()),
        Just("Social".to_string()),
        Just("Display, video".to_string()),
        Just(" Print ".to_string()),
    ]
}

fn row_strategy() -> impl Strategy<Value = Vec<Value>> {
    (
        channel_strategy(),
        prop_oneof![Just(0i64), 1i64..100_000],
        0i64..5_000,
        0i64..50,
        0i64..100_000,
    )
        .prop_map(|(channel, impressions, clicks, conversions, cents)| {
            vec![
                Value::Text(channel),
                Value::Int(impressions),
                Value::Int(clicks),
                Value::Int(conversions),
                Value::Float(cents as f64 / 100.0),
            ]
        })
}

fn table_strategy() -> impl Strategy<Value = Table> {
    prop::collection::vec(row_strategy(), 0..40).prop_map(|rows| {
        Table::from_rows(
            ["channel", "impressions", "clicks", "conversions", "cost"],
            rows,
        )
        .unwrap()
    })
}

fn column_sum(table: &Table, column: &str) -> f64 {
    table
        .column_values(column)
        .unwrap()
        .map(|v| v.as_f64().unwrap())
        .sum()
}

#[test]
fn test_sample_pipeline() {
    let raw = read_table(SAMPLE.as_bytes()).unwrap();
    let filter = ValueFilter::new("channel", vec!["Email".into(), "Search".into()]);
    let filtered = filter.apply(&raw).unwrap();
    assert_eq!(filtered.row_count(), 4);

    let summary = MetricsAggregator::marketing().aggregate(&filtered).unwrap();
    assert_eq!(summary.row_count(), 2);
    assert_eq!(summary.get(0, "channel"), Some(&Value::from("Email")));
    assert_eq!(summary.get(0, "impressions"), Some(&Value::Int(2200)));
    assert_eq!(summary.get(0, "CTR (%)"), Some(&Value::Float(5.0)));
    assert_eq!(summary.get(0, "CPA (€)"), Some(&Value::Float(11.1)));
    assert_eq!(summary.get(1, "CTR (%)"), Some(&Value::Float(2.82)));
    assert_eq!(summary.get(1, "CPA (€)"), Some(&Value::Float(15.91)));

    let csv = String::from_utf8(to_csv(&summary).unwrap()).unwrap();
    assert!(csv.starts_with("channel,impressions,clicks,conversions,cost,CTR (%),CPA (€)\n"));

    let with_metrics = append_missing_metrics(&filtered, &marketing_row_metrics()).unwrap();
    let pdf = render_document(&with_metrics, "Marketing Analytics Report", 210.0, 297.0)
        .unwrap();
    assert!(pdf.starts_with(b"%PDF-1.3"));
    let doc = lopdf::Document::load_mem(&pdf).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn test_summary_with_euro_header_cannot_be_rendered() {
    let raw = read_table(SAMPLE.as_bytes()).unwrap();
    let summary = MetricsAggregator::marketing().aggregate(&raw).unwrap();
    assert!(render_document(&summary, "Marketing Analytics Report", 210.0, 297.0).is_err());
}

proptest! {
    #[test]
    fn prop_totals_are_conserved(table in table_strategy()) {
        let summary = MetricsAggregator::marketing().aggregate(&table).unwrap();
        for column in MARKETING_SUM_COLUMNS {
            let before = column_sum(&table, column);
            let after = column_sum(&summary, column);
            prop_assert!((before - after).abs() < 1e-6, "{column}: {before} != {after}");
        }
    }

    #[test]
    fn prop_zero_denominator_yields_zero(table in table_strategy()) {
        let summary = MetricsAggregator::marketing().aggregate(&table).unwrap();
        for row in 0..summary.row_count() {
            let conversions = summary.get(row, "conversions").unwrap().as_f64().unwrap();
            let cpa = summary.get(row, "CPA (€)").unwrap().as_f64().unwrap();
            prop_assert!(cpa.is_finite());
            if conversions == 0.0 {
                prop_assert_eq!(cpa, 0.0);
            }
            let impressions = summary.get(row, "impressions").unwrap().as_f64().unwrap();
            let ctr = summary.get(row, "CTR (%)").unwrap().as_f64().unwrap();
            prop_assert!(ctr.is_finite());
            if impressions == 0.0 {
                prop_assert_eq!(ctr, 0.0);
            }
        }
    }

    #[test]
    fn prop_one_row_per_distinct_channel(table in table_strategy()) {
        let summary = MetricsAggregator::marketing().aggregate(&table).unwrap();
        prop_assert_eq!(summary.row_count(), table.distinct("channel").unwrap().len());
        prop_assert_eq!(summary.column_count(), 7);
    }

    #[test]
    fn prop_csv_round_trip(table in table_strategy()) {
        let parsed = read_table(to_csv(&table).unwrap().as_slice()).unwrap();
        prop_assert_eq!(parsed, table);
    }
}
