use co2_insights::analysis::regression::RegressionResult;
use co2_insights::data::loader::read_csv;
use co2_insights::{Analysis, AnalysisConfig};

/// Three entities, 1960 and 1961 each; 1961 GDP per capita: A > B > C.
/// Plus rows the inclusion filter must drop.
const THREE_ENTITIES: &str = "\
country,iso_code,year,co2,co2_per_capita,gdp,population
Alpha,AAA,1960,100,10,1000000,100
Beta,BBB,1960,40,4,400000,100
Gamma,CCC,1960,10,1,100000,100
Alpha,AAA,1961,120,12,5000000,100
Beta,BBB,1961,50,5,2000000,100
Gamma,CCC,1961,20,2,500000,100
Alpha,AAA,1959,1,1,1,1
Beta,BBB,1962,50,5,2000000,0
Gamma,CCC,1962,,3,500000,100
Gamma,CCC,1963,10,NA,500000,100
World,,1961,190,6,,300
";

fn run(csv: &str) -> Analysis {
    let rows = read_csv(csv.as_bytes()).expect("fixture parses");
    Analysis::run(&rows, &AnalysisConfig::default())
}

#[test]
fn end_to_end_three_entities() {
    let analysis = run(THREE_ENTITIES);

    // Loader: 11 rows read, 1959 / zero population / missing co2_per_capita /
    // missing GDP dropped. Missing total co2 alone does not drop a row.
    assert_eq!(analysis.filter_stats.rows_read, 11);
    assert_eq!(analysis.filter_stats.rows_kept, 7);
    assert_eq!(analysis.records.len(), 7);

    // Snapshots: latest qualifying year per entity.
    let latest: Vec<(&str, i32)> = analysis
        .snapshots
        .iter()
        .map(|s| (s.entity_code.as_str(), s.year))
        .collect();
    assert_eq!(latest, vec![("AAA", 1961), ("BBB", 1961), ("CCC", 1962)]);

    // Quartiles: three distinct bins, ordered by GDP per capita.
    let bins: Vec<(&str, u8)> = analysis
        .quartiles
        .iter()
        .map(|q| (q.entity_code.as_str(), q.quartile))
        .collect();
    assert_eq!(bins, vec![("AAA", 3), ("BBB", 2), ("CCC", 1)]);

    // Global series: one row per year, ascending.
    let means: Vec<Option<f64>> = analysis
        .global_series
        .iter()
        .map(|p| p.mean_co2_per_capita)
        .collect();
    assert_eq!(means, vec![Some(5.0), Some(19.0 / 3.0), Some(3.0)]);

    // YoY: first missing, then 100 * (19/3 - 5) / 5.
    assert_eq!(analysis.year_over_year[0].percent_change, None);
    let second = analysis.year_over_year[1].percent_change.unwrap();
    assert!((second - 80.0 / 3.0).abs() < 1e-9);

    // Cumulative: sums 15, 19, 3.
    let cumulative: Vec<f64> = analysis.cumulative.iter().map(|p| p.cumulative).collect();
    assert_eq!(cumulative, vec![15.0, 34.0, 37.0]);

    // Heatmap: every record of the three coded entities joins.
    let cells = analysis.heatmap.len();
    assert_eq!(cells, 7);
    assert_eq!(analysis.heatmap[0].year, 1960);
    assert_eq!(analysis.heatmap[0].quartile, 1);
    assert_eq!(analysis.heatmap[0].mean_co2_per_capita, Some(1.0));

    // Regression over three snapshots is defined.
    match &analysis.regression {
        RegressionResult::Fitted(fit) => {
            assert_eq!(fit.n_observations, 3);
            assert!(fit.slope > 0.0);
            assert!((0.0..=1.0).contains(&fit.r_squared));
            assert!((0.0..=1.0).contains(&fit.p_value));
        }
        other => panic!("expected a fit, got {other:?}"),
    }

    // Top emitters per person, latest year.
    assert_eq!(analysis.top_co2_per_capita[0].entity_code, "AAA");
    assert_eq!(analysis.top_total_co2.len(), 2);
}

#[test]
fn two_entities_give_undefined_regression() {
    let csv = "\
country,iso_code,year,co2,co2_per_capita,gdp,population
Alpha,AAA,2000,1,1,100,10
Beta,BBB,2000,1,2,200,10
";
    let analysis = run(csv);
    assert_eq!(analysis.snapshots.len(), 2);
    assert!(analysis.regression.is_undefined());
}

#[test]
fn report_serializes_to_json() {
    let analysis = run(THREE_ENTITIES);
    let json = serde_json::to_value(&analysis).unwrap();

    assert_eq!(json["regression"]["status"], "fitted");
    assert_eq!(json["config"]["min_year"], 1960);
    assert_eq!(json["global_series"][0]["date"], "1960-01-01");
    assert!(json["year_over_year"][0]["percent_change"].is_null());
    assert!(json.get("records").is_none());
}
