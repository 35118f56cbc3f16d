use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

use autograde::{
    ConfigError, GradingError,
    context::NoContext,
    detect::ImplementationDetector,
    grade::{
        ComponentStatus, GradeReport, GradingEngine, LetterGrade, PartialCredit, SourceQuality,
        Stage, TestOutcome,
        validate::{REQUIRED_REPORT_FIELDS, validate_report},
    },
    paths::SubmissionPaths,
    registry::{ComponentCheck, ComponentRegistry, ComponentSpec},
    runner::{ScopedTestResult, TestRunner},
};
use serde_json::{Value, json};
use uuid::Uuid;

/// Returns canned results per selector and records call order.
#[derive(Default)]
struct ScriptedRunner {
    results: HashMap<String, ScopedTestResult>,
    calls:   Mutex<Vec<String>>,
}

impl ScriptedRunner {
    fn with(mut self, selector: &str, result: ScopedTestResult) -> Self {
        self.results.insert(selector.to_string(), result);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl TestRunner for ScriptedRunner {
    async fn run_scoped_test(
        &self,
        selector: &str,
        _working_dir: &Path,
        _timeout: Duration,
    ) -> ScopedTestResult {
        self.calls
            .lock()
            .expect("calls lock")
            .push(selector.to_string());
        self.results
            .get(selector)
            .cloned()
            .unwrap_or_else(|| ScopedTestResult::fail("no such test"))
    }
}

/// Treats exactly the listed functions as implemented.
struct FixedDetector(HashSet<String>);

impl FixedDetector {
    fn implemented(names: &[&str]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

impl ImplementationDetector for FixedDetector {
    fn is_implemented(&self, function_name: &str) -> bool {
        self.0.contains(function_name)
    }
}

fn component(id: &str, points: f64) -> ComponentSpec {
    ComponentSpec::builder()
        .id(id)
        .name(format!("Component {id}"))
        .points(points)
        .description(format!("do {id}"))
        .concepts(vec!["indexing".to_string(), "merging".to_string()])
        .function(format!("{id}_fn"))
        .check(ComponentCheck::Test {
            selector: format!("Test{id}"),
        })
        .build()
}

fn full_context() -> Value {
    json!({
        "skills_assessed": ["pandas"],
        "industry_relevance": "data work",
        "career_preparation": "analyst roles",
    })
}

fn engine(
    registry: ComponentRegistry,
    runner: ScriptedRunner,
    detector: FixedDetector,
    policy: PartialCredit,
) -> GradingEngine<ScriptedRunner, FixedDetector, Value> {
    GradingEngine::builder()
        .assignment("Demo Assignment")
        .module("Module 1")
        .registry(registry)
        .runner(runner)
        .detector(detector)
        .context(full_context())
        .policy(policy)
        .timeout(Duration::from_secs(5))
        .build()
}

fn two_by_five() -> ComponentRegistry {
    ComponentRegistry::new(vec![component("A", 5.0), component("B", 5.0)], Some(10.0))
        .expect("valid registry")
}

async fn e2e_report() -> GradeReport {
    let runner = ScriptedRunner::default()
        .with("TestA", ScopedTestResult::pass())
        .with("TestB", ScopedTestResult::fail("E   AssertionError: expected 3 rows"));
    let detector = FixedDetector::implemented(&["A_fn"]);
    engine(two_by_five(), runner, detector, PartialCredit::default())
        .run()
        .await
        .expect("grading run")
}

#[tokio::test]
async fn half_passing_submission_scores_fifty_percent() {
    let report = e2e_report().await;

    assert_eq!(report.total_points, 5.0);
    assert_eq!(report.possible_points, 10.0);
    assert_eq!(report.percentage, 50.0);
    assert_eq!(report.letter_grade, LetterGrade::F);
    assert!(!report.is_passing());
    assert_eq!(
        report.detailed_breakdown["B"].status,
        ComponentStatus::NotImplemented
    );
    assert_eq!(report.detailed_breakdown["A"].status, ComponentStatus::Passed);
    assert_eq!(report.detailed_breakdown["A"].points_earned, 5.0);
    assert_eq!(report.performance_summary.components_passing, 1);
    assert_eq!(report.performance_summary.components_implemented, 1);
    assert_eq!(report.performance_summary.total_components, 2);
    assert_eq!(report.performance_summary.pass_rate, 50.0);
    assert_eq!(report.performance_summary.implementation_rate, 50.0);
    assert_eq!(report.professional_context, full_context());
    assert!(report.execution_summary.standardized_output);
}

#[tokio::test]
async fn feedback_and_recommendations_follow_status() {
    let report = e2e_report().await;

    assert_eq!(
        report.detailed_breakdown["A"].feedback,
        "✅ Excellent implementation of Component A"
    );
    let b = &report.detailed_breakdown["B"].feedback;
    assert!(b.starts_with("❌ Component B function not found or not properly defined"));
    assert!(b.contains("💡 Implement: do B"));
    assert!(b.contains("🔍 Review concepts: indexing, merging"));

    assert_eq!(report.improvement_recommendations, [
        "Implement Component B: do B",
        "Focus on edge cases and error handling in your implementations",
    ]);
}

#[tokio::test]
async fn components_run_in_registry_order() {
    let registry = ComponentRegistry::new(
        vec![component("z", 1.0), component("a", 1.0), component("m", 1.0)],
        None,
    )
    .expect("valid registry");
    let runner = ScriptedRunner::default();
    let engine = engine(
        registry,
        runner,
        FixedDetector::implemented(&[]),
        PartialCredit::default(),
    );
    engine.run().await.expect("grading run");

    assert_eq!(engine.runner().calls(), ["Testz", "Testa", "Testm"]);
}

#[tokio::test]
async fn implemented_but_failing_uses_partial_credit_policy() {
    let run = |policy: PartialCredit| async move {
        let runner = ScriptedRunner::default()
            .with("TestA", ScopedTestResult::pass())
            .with("TestB", ScopedTestResult::fail("E   KeyError: 'station_id'"));
        let detector = FixedDetector::implemented(&["A_fn", "B_fn"]);
        engine(two_by_five(), runner, detector, policy)
            .run()
            .await
            .expect("grading run")
    };

    let none = run(PartialCredit::Disabled).await;
    assert_eq!(none.detailed_breakdown["B"].points_earned, 0.0);
    assert_eq!(
        none.detailed_breakdown["B"].status,
        ComponentStatus::ImplementedWithErrors
    );
    assert!(
        none.detailed_breakdown["B"]
            .feedback
            .contains("⚠️ Component B implemented but has issues | Error: E   KeyError: 'station_id'")
    );
    assert_eq!(
        none.improvement_recommendations[0],
        "Fix Component B - focus on: indexing, merging"
    );

    let flat = run(PartialCredit::Flat { points: 1.0 }).await;
    assert_eq!(flat.detailed_breakdown["B"].points_earned, 1.0);
    assert_eq!(flat.total_points, 6.0);

    let fraction = run(PartialCredit::Fraction { fraction: 0.5 }).await;
    assert_eq!(fraction.detailed_breakdown["B"].points_earned, 2.5);
    assert_eq!(fraction.percentage, 75.0);
    assert_eq!(fraction.letter_grade, LetterGrade::C);
    assert!(fraction.is_passing());
}

#[tokio::test]
async fn partial_credit_never_exceeds_component_points() {
    let runner = ScriptedRunner::default().with("TestA", ScopedTestResult::fail("boom"));
    let registry = ComponentRegistry::new(vec![component("A", 2.0)], None).expect("registry");
    let report = engine(
        registry,
        runner,
        FixedDetector::implemented(&["A_fn"]),
        PartialCredit::Flat { points: 10.0 },
    )
    .run()
    .await
    .expect("grading run");

    assert_eq!(report.total_points, 2.0);
    assert_eq!(
        report.detailed_breakdown["A"].status,
        ComponentStatus::ImplementedWithErrors
    );
}

#[tokio::test]
async fn invalid_policy_is_a_configuration_error() {
    let err = engine(
        two_by_five(),
        ScriptedRunner::default(),
        FixedDetector::implemented(&[]),
        PartialCredit::Fraction { fraction: 1.5 },
    )
    .run()
    .await
    .expect_err("invalid fraction");
    assert!(matches!(
        err,
        GradingError::Config(ConfigError::InvalidPolicy(_))
    ));
}

#[tokio::test]
async fn passing_stub_earns_nothing() {
    let runner = ScriptedRunner::default()
        .with("TestA", ScopedTestResult::pass())
        .with("TestB", ScopedTestResult::pass());
    let report = engine(
        two_by_five(),
        runner,
        FixedDetector::implemented(&["A_fn"]),
        PartialCredit::default(),
    )
    .run()
    .await
    .expect("grading run");

    let b = &report.detailed_breakdown["B"];
    assert_eq!(b.status, ComponentStatus::NotImplemented);
    assert_eq!(b.points_earned, 0.0);
    assert_eq!(report.total_points, 5.0);
}

#[tokio::test]
async fn component_without_function_counts_as_implemented() {
    let spec = ComponentSpec::builder()
        .id("integration")
        .name("Integration")
        .points(3.0)
        .check(ComponentCheck::Test {
            selector: "TestIntegration".to_string(),
        })
        .build();
    let registry = ComponentRegistry::new(vec![spec], None).expect("registry");
    let runner =
        ScriptedRunner::default().with("TestIntegration", ScopedTestResult::fail("failed"));
    let report = engine(
        registry,
        runner,
        FixedDetector::implemented(&[]),
        PartialCredit::default(),
    )
    .run()
    .await
    .expect("grading run");

    assert_eq!(
        report.detailed_breakdown["integration"].status,
        ComponentStatus::ImplementedWithErrors
    );
    assert_eq!(report.improvement_recommendations[0], "Fix Integration");
}

#[tokio::test]
async fn timed_out_component_fails_without_aborting_the_run() {
    let runner = ScriptedRunner::default()
        .with("TestA", ScopedTestResult::fail(autograde::runner::TIMEOUT_DIAGNOSTIC))
        .with("TestB", ScopedTestResult::pass());
    let report = engine(
        two_by_five(),
        runner,
        FixedDetector::implemented(&["A_fn", "B_fn"]),
        PartialCredit::default(),
    )
    .run()
    .await
    .expect("grading run");

    assert_eq!(report.total_points, 5.0);
    assert!(
        report.detailed_breakdown["A"]
            .feedback
            .contains("execution timed out")
    );
}

#[test]
fn missing_results_are_synthesized_as_not_implemented() {
    let engine = engine(
        two_by_five(),
        ScriptedRunner::default(),
        FixedDetector::implemented(&[]),
        PartialCredit::default(),
    );
    let mut results = HashMap::new();
    results.insert("A".to_string(), TestOutcome {
        passed:                  true,
        score:                   5.0,
        error:                   None,
        implementation_detected: true,
        execution_time:          0.1,
    });

    let report = engine.aggregate(results).expect("aggregate");
    assert_eq!(report.total_points, 5.0);
    assert_eq!(
        report.detailed_breakdown["B"].status,
        ComponentStatus::NotImplemented
    );
    assert_eq!(report.detailed_breakdown["B"].points_earned, 0.0);
}

#[test]
fn unknown_result_id_is_a_configuration_error() {
    let engine = engine(
        two_by_five(),
        ScriptedRunner::default(),
        FixedDetector::implemented(&[]),
        PartialCredit::default(),
    );
    let mut results = HashMap::new();
    results.insert("C".to_string(), TestOutcome::missing());

    let err = engine.aggregate(results).expect_err("unknown id");
    assert!(matches!(
        err,
        GradingError::Config(ConfigError::UnknownComponent(id)) if id == "C"
    ));
}

#[test]
fn external_scores_are_kept_within_component_points() {
    let engine = engine(
        two_by_five(),
        ScriptedRunner::default(),
        FixedDetector::implemented(&[]),
        PartialCredit::default(),
    );
    let mut results = HashMap::new();
    results.insert("A".to_string(), TestOutcome {
        passed:                  false,
        score:                   42.0,
        error:                   Some("bad".to_string()),
        implementation_detected: true,
        execution_time:          0.0,
    });
    results.insert("B".to_string(), TestOutcome {
        passed:                  false,
        score:                   -3.0,
        error:                   Some("bad".to_string()),
        implementation_detected: true,
        execution_time:          0.0,
    });

    let report = engine.aggregate(results).expect("aggregate");
    assert_eq!(report.detailed_breakdown["A"].points_earned, 5.0);
    assert_eq!(report.detailed_breakdown["B"].points_earned, 0.0);
}

#[test]
fn passing_result_without_a_detected_implementation_earns_nothing() {
    let engine = engine(
        two_by_five(),
        ScriptedRunner::default(),
        FixedDetector::implemented(&[]),
        PartialCredit::default(),
    );
    let mut results = HashMap::new();
    results.insert("A".to_string(), TestOutcome {
        passed:                  true,
        score:                   5.0,
        error:                   None,
        implementation_detected: false,
        execution_time:          0.0,
    });
    results.insert("B".to_string(), TestOutcome {
        passed:                  false,
        score:                   2.0,
        error:                   Some("E   assert 1 == 2".to_string()),
        implementation_detected: false,
        execution_time:          0.0,
    });

    let report = engine.aggregate(results).expect("aggregate");
    let a = &report.detailed_breakdown["A"];
    assert_eq!(a.points_earned, 0.0);
    assert_eq!(a.status, ComponentStatus::NotImplemented);
    assert_eq!(report.detailed_breakdown["B"].points_earned, 0.0);
    assert_eq!(report.total_points, 0.0);
    assert_eq!(report.performance_summary.components_passing, 0);
}

/// Never answers within any reasonable budget.
struct HangingRunner;

impl TestRunner for HangingRunner {
    async fn run_scoped_test(
        &self,
        _selector: &str,
        _working_dir: &Path,
        _timeout: Duration,
    ) -> ScopedTestResult {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        ScopedTestResult::pass()
    }
}

#[tokio::test]
async fn engine_abandons_a_runner_that_ignores_its_budget() {
    let engine = GradingEngine::builder()
        .assignment("Hanging")
        .module("Module 1")
        .registry(two_by_five())
        .runner(HangingRunner)
        .detector(FixedDetector::implemented(&["A_fn", "B_fn"]))
        .context(full_context())
        .timeout(Duration::from_millis(200))
        .runner_grace(Duration::from_millis(100))
        .build();

    let report = tokio::time::timeout(Duration::from_secs(3), engine.run())
        .await
        .expect("run finishes within its budgets")
        .expect("grading run");

    assert_eq!(report.total_points, 0.0);
    for id in ["A", "B"] {
        let entry = &report.detailed_breakdown[id];
        assert_eq!(entry.status, ComponentStatus::ImplementedWithErrors);
        assert!(entry.feedback.contains(autograde::runner::TIMEOUT_DIAGNOSTIC));
    }
}

#[tokio::test]
async fn breakdown_keeps_registry_order() {
    let registry = ComponentRegistry::new(
        vec![component("zeta", 1.0), component("alpha", 1.0), component("mid", 1.0)],
        None,
    )
    .expect("valid registry");
    let report = engine(
        registry,
        ScriptedRunner::default().with("Testalpha", ScopedTestResult::pass()),
        FixedDetector::implemented(&["alpha_fn"]),
        PartialCredit::default(),
    )
    .run()
    .await
    .expect("grading run");

    let ids: Vec<&str> = report.detailed_breakdown.keys().map(String::as_str).collect();
    assert_eq!(ids, ["zeta", "alpha", "mid"]);

    let json = report.to_json().expect("serialize");
    let zeta = json.find("\"zeta\"").expect("zeta key");
    let alpha = json.find("\"alpha\"").expect("alpha key");
    assert!(zeta < alpha);

    let parsed: GradeReport = serde_json::from_str(&json).expect("parse report");
    let parsed_ids: Vec<&str> = parsed.detailed_breakdown.keys().map(String::as_str).collect();
    assert_eq!(parsed_ids, ids);
}

#[tokio::test]
async fn grading_time_is_elapsed_seconds() {
    let report = e2e_report().await;
    let seconds = report.execution_summary.grading_time;
    assert!(seconds.is_finite() && seconds >= 0.0);

    let value = serde_json::to_value(&report).expect("serialize");
    assert!(value["execution_summary"]["grading_time"].is_number());
    assert!(value["timestamp"].is_string());
}

#[tokio::test]
async fn feedback_carries_the_full_diagnostic() {
    let diagnostic = "FAILED tests/test_demo.py::TestB\nE   assert 2 == 3\nE   assert 4 == 5\n";
    let runner = ScriptedRunner::default()
        .with("TestA", ScopedTestResult::pass())
        .with("TestB", ScopedTestResult::fail(diagnostic));
    let report = engine(
        two_by_five(),
        runner,
        FixedDetector::implemented(&["A_fn", "B_fn"]),
        PartialCredit::default(),
    )
    .run()
    .await
    .expect("grading run");

    let feedback = &report.detailed_breakdown["B"].feedback;
    assert!(feedback.contains("E   assert 2 == 3\nE   assert 4 == 5"));
    assert!(feedback.contains("FAILED tests/test_demo.py::TestB"));

    let table = autograde::emit::console::table_feedback(feedback);
    assert_eq!(
        table,
        "⚠️ Component B implemented but has issues | Error: assert 2 == 3 | 🔍 Review concepts: \
         indexing, merging"
    );
}

#[tokio::test]
async fn repeated_runs_are_identical_apart_from_timestamps() {
    let first = e2e_report().await;
    let second = e2e_report().await;

    assert_eq!(
        serde_json::to_string(&first.detailed_breakdown).expect("serialize"),
        serde_json::to_string(&second.detailed_breakdown).expect("serialize")
    );
    assert_eq!(first.total_points, second.total_points);
    assert_eq!(first.possible_points, second.possible_points);
    assert_eq!(first.percentage, second.percentage);
    assert_eq!(first.letter_grade, second.letter_grade);
    assert_eq!(first.performance_summary, second.performance_summary);
    assert_eq!(
        first.improvement_recommendations,
        second.improvement_recommendations
    );
}

#[test]
fn letter_grade_lower_bounds_are_inclusive() {
    assert_eq!(LetterGrade::from_percentage(100.0), LetterGrade::A);
    assert_eq!(LetterGrade::from_percentage(90.0), LetterGrade::A);
    assert_eq!(LetterGrade::from_percentage(89.9), LetterGrade::B);
    assert_eq!(LetterGrade::from_percentage(80.0), LetterGrade::B);
    assert_eq!(LetterGrade::from_percentage(70.0), LetterGrade::C);
    assert_eq!(LetterGrade::from_percentage(69.99), LetterGrade::D);
    assert_eq!(LetterGrade::from_percentage(60.0), LetterGrade::D);
    assert_eq!(LetterGrade::from_percentage(59.9), LetterGrade::F);
    assert_eq!(LetterGrade::from_percentage(0.0), LetterGrade::F);
}

#[tokio::test]
async fn pass_predicate_uses_the_literal_threshold() {
    let mut report = e2e_report().await;

    report.percentage = 70.0;
    assert!(report.is_passing());
    report.percentage = 69.99;
    assert!(!report.is_passing());
    assert_eq!(report.display_percentage(), "70.0");
}

#[tokio::test]
async fn recommendation_bands_depend_on_pass_rate() {
    let all_fail = engine(
        two_by_five(),
        ScriptedRunner::default(),
        FixedDetector::implemented(&[]),
        PartialCredit::default(),
    )
    .run()
    .await
    .expect("grading run");
    assert_eq!(all_fail.performance_summary.pass_rate, 0.0);
    assert_eq!(all_fail.improvement_recommendations, [
        "Implement Component A: do A",
        "Implement Component B: do B",
        "Review assignment instructions and examples carefully",
        "Test functions individually before running full test suite",
    ]);

    let runner = ScriptedRunner::default()
        .with("TestA", ScopedTestResult::pass())
        .with("TestB", ScopedTestResult::pass());
    let all_pass = engine(
        two_by_five(),
        runner,
        FixedDetector::implemented(&["A_fn", "B_fn"]),
        PartialCredit::default(),
    )
    .run()
    .await
    .expect("grading run");
    assert!(all_pass.improvement_recommendations.is_empty());
    assert_eq!(all_pass.letter_grade, LetterGrade::A);
}

#[tokio::test]
async fn missing_required_file_stops_the_run() {
    let root = temp_root();
    let engine = GradingEngine::builder()
        .assignment("Demo")
        .module("Module 1")
        .registry(two_by_five())
        .runner(ScriptedRunner::default())
        .detector(FixedDetector::implemented(&[]))
        .context(full_context())
        .paths(SubmissionPaths::new(root.clone()))
        .required_files(vec![PathBuf::from("src/pandas_basics.py")])
        .build();

    let err = engine.run().await.expect_err("missing file");
    assert!(matches!(
        err,
        GradingError::Config(ConfigError::MissingRequiredFile(path))
            if path.ends_with("src/pandas_basics.py")
    ));

    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn source_quality_component_is_scored_from_the_file() {
    let root = temp_root();
    fs::create_dir_all(root.join("src")).expect("create src");

    let mut text = String::from("# Station analysis helpers\nimport pandas as pd\n\n");
    for name in ["load", "filter", "stats", "join"] {
        text.push_str(&format!(
            "def {name}(df):\n    result = df.copy()\n    return result\n\n"
        ));
    }
    while text.len() < 600 {
        text.push_str("# padding comment line for a realistic file size\n");
    }
    fs::write(root.join("src/analysis.py"), &text).expect("write source");
    fs::write(root.join("src/tiny.py"), "import pandas\n").expect("write tiny");

    let quality = |file: &str| {
        let mut check = SourceQuality::new(file);
        check.required_imports = vec!["pandas".to_string()];
        check.required_functions = ["load", "filter", "stats", "join", "save"]
            .map(String::from)
            .to_vec();
        check.min_functions = Some(4);
        ComponentCheck::SourceQuality(check)
    };
    let registry = ComponentRegistry::new(
        vec![
            ComponentSpec::builder()
                .id("quality")
                .name("Code Quality")
                .points(1.0)
                .check(quality("src/analysis.py"))
                .build(),
            ComponentSpec::builder()
                .id("tiny")
                .name("Tiny File")
                .points(1.0)
                .check(quality("src/tiny.py"))
                .build(),
            ComponentSpec::builder()
                .id("absent")
                .name("Absent File")
                .points(1.0)
                .check(quality("src/absent.py"))
                .build(),
        ],
        None,
    )
    .expect("registry");

    let engine = GradingEngine::builder()
        .assignment("Demo")
        .module("Module 1")
        .registry(registry)
        .runner(ScriptedRunner::default())
        .detector(FixedDetector::implemented(&[]))
        .context(full_context())
        .paths(SubmissionPaths::new(root.clone()))
        .build();
    let report = engine.run().await.expect("grading run");

    assert_eq!(report.detailed_breakdown["quality"].status, ComponentStatus::Passed);
    assert_eq!(report.detailed_breakdown["quality"].points_earned, 1.0);
    assert_eq!(report.detailed_breakdown["tiny"].points_earned, 0.0);
    assert_eq!(
        report.detailed_breakdown["tiny"].status,
        ComponentStatus::ImplementedWithErrors
    );
    assert!(
        report.detailed_breakdown["tiny"]
            .feedback
            .contains("file too small")
    );
    assert_eq!(
        report.detailed_breakdown["absent"].status,
        ComponentStatus::NotImplemented
    );
    assert!(engine.runner().calls().is_empty());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn source_quality_scores_in_tenths() {
    let mut check = SourceQuality::new("unused.py");
    check.min_bytes = 0;
    check.required_imports = vec!["pandas".to_string()];
    check.required_functions = vec!["load".to_string()];

    let (tenths, _) = check.grade_text(b"def load(df):\n    return df\n");
    assert_eq!(tenths, 4);

    let (tenths, notes) = check.grade_text(b"import numpy\n");
    assert_eq!(tenths, 0);
    assert!(notes.iter().any(|n| n.contains("Missing imports: pandas")));

    let (tenths, _) = check.grade_text(b"import pandas\n# notes\ndef load(df):\n    return df\n");
    assert_eq!(tenths, 10);
}

#[test]
fn some_required_functions_earn_half_the_function_share() {
    let mut check = SourceQuality::new("unused.py");
    check.min_bytes = 0;
    check.required_functions = ["a", "b", "c", "d"].map(String::from).to_vec();
    check.min_functions = Some(4);
    check.partial_functions = Some(2);

    let two = b"def a():\n    return 1\n\ndef b():\n    return 2\n";
    let (tenths, notes) = check.grade_text(two);
    assert_eq!(tenths, 3 + 2);
    assert!(notes.iter().any(|n| n.contains("Found 2/4 required functions")));

    let (tenths, _) = check.grade_text(b"def a():\n    return 1\n");
    assert_eq!(tenths, 3);

    let all = b"def a(): return 1\ndef b(): return 2\ndef c(): return 3\ndef d(): return 4\n";
    let (tenths, _) = check.grade_text(all);
    assert_eq!(tenths, 3 + 4);
}

#[test]
fn stages_cannot_be_skipped() {
    let stage = Stage::Init
        .advance(Stage::TestsRun)
        .and_then(|s| s.advance(Stage::Aggregated))
        .and_then(|s| s.advance(Stage::Validated))
        .and_then(|s| s.advance(Stage::Done))
        .expect("full sequence");
    assert_eq!(stage, Stage::Done);

    assert!(matches!(
        Stage::Init.advance(Stage::Aggregated),
        Err(GradingError::Stage {
            from: Stage::Init,
            to:   Stage::Aggregated,
        })
    ));
    assert!(Stage::Done.advance(Stage::Init).is_err());
    assert!(Stage::TestsRun.advance(Stage::TestsRun).is_err());
}

#[tokio::test]
async fn validation_reports_missing_context_fields() {
    let report = e2e_report().await;
    assert!(validate_report(&report).is_empty());

    let mut sparse = report.clone();
    sparse.professional_context = json!({ "skills_assessed": [] });
    let missing = validate_report(&sparse);
    assert_eq!(missing, [
        "professional_context.industry_relevance",
        "professional_context.career_preparation",
    ]);

    let value = serde_json::to_value(&report).expect("serialize");
    for field in REQUIRED_REPORT_FIELDS {
        assert!(value.get(field).is_some(), "missing {field}");
    }
    assert!(value["detailed_breakdown"]["A"].get("execution_time").is_none());
}

#[tokio::test]
async fn empty_context_is_reported_but_does_not_fail_the_run() {
    let runner = ScriptedRunner::default().with("TestA", ScopedTestResult::pass());
    let registry = ComponentRegistry::new(vec![component("A", 1.0)], None).expect("registry");

    let report = GradingEngine::builder()
        .assignment("No Context")
        .registry(registry)
        .runner(runner)
        .detector(FixedDetector::implemented(&["A_fn"]))
        .context(NoContext)
        .module("")
        .build()
        .run()
        .await
        .expect("grading run");

    assert_eq!(report.professional_context, json!({}));
    assert_eq!(report.percentage, 100.0);
    assert_eq!(validate_report(&report), [
        "professional_context.skills_assessed",
        "professional_context.industry_relevance",
        "professional_context.career_preparation",
    ]);
}

fn temp_root() -> PathBuf {
    let root = std::env::temp_dir().join(format!("autograde-engine-{}", Uuid::new_v4()));
    fs::create_dir_all(&root).expect("create temp root");
    root
}
