use assert_cmd::prelude::*;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;

fn squiggle() -> Command {
    Command::cargo_bin("squiggle").unwrap()
}

#[test]
fn eval_prints_result() {
    squiggle().args(["-e", "1 + 2"]).assert().success().stdout(contains("3\n"));
}

#[test]
fn errors_go_to_stderr_and_fail() {
    squiggle()
        .args(["-e", "x + 1"])
        .assert()
        .failure()
        .stderr(contains("Error(x is not defined)"));
    squiggle()
        .args(["-e", "Scale.linear({min: 5, max: 3})"])
        .assert()
        .failure()
        .stderr(contains("Max must be greater than min"));
}

#[test]
fn reads_program_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "a = 2\nb = a * 21\nb").unwrap();
    squiggle().arg(file.path()).assert().success().stdout(contains("42\n"));
}

#[test]
fn bindings_are_listed_before_result() {
    squiggle()
        .args(["-e", "a = 1\nb = a + 1\nb * 10", "--bindings"])
        .assert()
        .success()
        .stdout(contains("a = 1\nb = 2\n20\n"));
}

#[test]
fn dump_ast_prints_sexpr() {
    squiggle()
        .args(["-e", "x = 1\nx + 2", "--dump-ast"])
        .assert()
        .success()
        .stdout(contains("(Program (Let x 1)"));
}

#[test]
fn dump_expr_text_and_json() {
    squiggle()
        .args(["-e", "1 + 2 * x", "--dump-expr"])
        .assert()
        .success()
        .stdout(contains("(add 1 (multiply 2 x))\n"));
    squiggle()
        .args(["-e", "f(1)", "--dump-expr-json"])
        .assert()
        .success()
        .stdout(contains("{\n").and(contains("\"Call\"")));
}

#[test]
fn environment_file_and_flags() {
    let mut env = tempfile::NamedTempFile::new().unwrap();
    write!(env, r#"{{"sampleCount": 20, "seed": 7}}"#).unwrap();
    let code = "List.length(SampleSet.toList(SampleSet.fromDist(normal(0, 1))))";
    squiggle()
        .args(["-e", code, "--environment"])
        .arg(env.path())
        .assert()
        .success()
        .stdout(contains("20\n"));
    squiggle()
        .args(["-e", code, "--environment"])
        .arg(env.path())
        .args(["--sample-count", "30"])
        .assert()
        .success()
        .stdout(contains("30\n"));
}

#[test]
fn oversized_sample_count_is_rejected() {
    squiggle()
        .args(["-e", "1", "--sample-count", "100000000000"])
        .assert()
        .failure()
        .stderr(contains("sample count must be at most 10000000"));
}

#[test]
fn compare_ids_prints_cache_rows() {
    squiggle()
        .args(["-e", "v = {a: 1, b: 4}\nfn(x, y) = v[x] / v[y]", "--compare-ids", "a,b"])
        .assert()
        .success()
        .stdout(contains("\"firstItem\": \"b\"").and(contains("\"median\": 4.0")));
}

#[test]
fn parse_errors_fail() {
    squiggle().args(["-e", "x = (1"]).assert().failure().stderr(contains("Error("));
}
