use sqlrun_core::{
    RelationName, Value,
    materialize::{MaterializeOptions, Materializer, SampleSpec},
};

#[path = "support/fake_warehouse.rs"]
mod fake_warehouse;

use fake_warehouse::FakeWarehouse;

const SCRIPT: &str = "SELECT cs.id, b.cpf\nFROM prod.sims cs\nJOIN prod.borrowers b ON b.id = cs.borrower_id;\n";

fn warehouse() -> FakeWarehouse {
    let mut warehouse = FakeWarehouse::default();
    warehouse.set_rows("SELECT COUNT(*) AS n FROM prod.sims", &["N"], vec![vec![Value::Integer(1_000)]]);
    warehouse.set_rows(
        "SELECT COUNT(*) AS n FROM sandbox.ENRICHED_SAMPLE_100",
        &["N"],
        vec![vec![Value::Integer(100)]],
    );
    warehouse.set_rows(
        "SELECT COUNT(*) AS n FROM sandbox.ENRICHED",
        &["N"],
        vec![vec![Value::Integer(990)]],
    );
    warehouse
}

fn options(sample: bool, only_sample: bool, keep_sample: bool) -> MaterializeOptions {
    MaterializeOptions {
        target: RelationName::parse("sandbox.ENRICHED").expect("valid relation"),
        sample: sample.then(|| SampleSpec::parse("prod.sims cs", 100).expect("valid sample")),
        only_sample,
        keep_sample,
    }
}

#[test]
fn full_build_drops_target_and_legacy_then_creates() {
    let mut warehouse = warehouse();
    let mut out = Vec::new();

    let summary = Materializer::new(&mut warehouse)
        .run(SCRIPT, &options(false, false, false), &mut out)
        .expect("materialize should succeed");

    assert_eq!(
        warehouse.executed_sql(),
        [
            "DROP TABLE IF EXISTS sandbox.ENRICHED",
            "DROP TABLE IF EXISTS sandbox.ENRICHED_V1",
            "CREATE TABLE sandbox.ENRICHED AS SELECT cs.id, b.cpf\nFROM prod.sims cs\nJOIN prod.borrowers b ON b.id = cs.borrower_id",
            "SELECT COUNT(*) AS n FROM sandbox.ENRICHED",
        ]
    );
    assert!(summary.sample.is_none());
    assert_eq!(summary.full.map(|build| build.rows), Some(990));

    let output = String::from_utf8(out).expect("utf-8 output");
    assert!(output.contains("CTAS FULL: sandbox.ENRICHED"));
    assert!(output.contains("Rows materialized = 990"));
}

#[test]
fn sampled_build_estimates_and_cleans_up() {
    let mut warehouse = warehouse();
    let mut out = Vec::new();

    let summary = Materializer::new(&mut warehouse)
        .run(SCRIPT, &options(true, false, false), &mut out)
        .expect("materialize should succeed");

    let executed = warehouse.executed_sql();
    assert_eq!(executed[0], "SELECT COUNT(*) AS n FROM prod.sims");
    assert_eq!(executed[1], "DROP TABLE IF EXISTS sandbox.ENRICHED_SAMPLE_100");
    assert!(executed[2].starts_with("CREATE TABLE sandbox.ENRICHED_SAMPLE_100 AS"));
    assert!(executed[2].contains("FROM (SELECT * FROM prod.sims LIMIT 100) cs"));
    assert_eq!(
        executed.last().map(String::as_str),
        Some("DROP TABLE IF EXISTS sandbox.ENRICHED_SAMPLE_100")
    );

    let sample = summary.sample.expect("sample build recorded");
    assert_eq!(sample.universe_rows, 1_000);
    assert_eq!(sample.build.rows, 100);
    assert!(sample.estimate.is_some());
    assert!(summary.full.is_some());

    let output = String::from_utf8(out).expect("utf-8 output");
    assert!(output.contains("Linear full-build estimate (min) ~"));
    assert!(output.contains("Removing sample table: sandbox.ENRICHED_SAMPLE_100"));
}

#[test]
fn only_sample_skips_the_full_build() {
    let mut warehouse = warehouse();
    let mut out = Vec::new();

    let summary = Materializer::new(&mut warehouse)
        .run(SCRIPT, &options(true, true, false), &mut out)
        .expect("materialize should succeed");

    assert!(summary.full.is_none());
    assert!(
        !warehouse
            .executed_sql()
            .iter()
            .any(|sql| sql.starts_with("CREATE TABLE sandbox.ENRICHED AS"))
    );
    let output = String::from_utf8(out).expect("utf-8 output");
    assert!(output.contains("--only-sample"));
}

#[test]
fn keep_sample_leaves_the_sample_table() {
    let mut warehouse = warehouse();
    let mut out = Vec::new();

    Materializer::new(&mut warehouse)
        .run(SCRIPT, &options(true, false, true), &mut out)
        .expect("materialize should succeed");

    let drops = warehouse
        .executed_sql()
        .iter()
        .filter(|sql| sql.as_str() == "DROP TABLE IF EXISTS sandbox.ENRICHED_SAMPLE_100")
        .count();
    assert_eq!(drops, 1);
}
