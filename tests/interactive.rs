//! Interactive flow driven through piped stdin, one byte per keypress.
//!
//! Menu items are picked with digits since arrow keys cannot be piped.

mod common;

use common::{stderr, stdout, Fixture};

#[test]
fn assembles_and_launches_confirmed_arguments() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    // recon; decline -json; verbose; query "foo"; accept confirmation.
    let output = fixture.run(&[], "1n3foo\n\n");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("=== Skywalker Recon CLI ==="));
    assert!(out.contains("Do you want to set -json? (Y/N) N"));
    assert!(out.contains("Execute recon with arguments: -loglevel verbose -query foo?"));
    assert_eq!(
        fixture.recorded_args("recon").expect("recon ran"),
        ["-loglevel", "verbose", "-query", "foo"]
    );
}

#[test]
fn declining_everything_exits_cleanly_without_launch() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    let output = fixture.run(&[], "2n\n");

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("[INFO] No arguments selected. Exiting."));
    assert!(!out.contains("Execute flags"));
    assert!(fixture.recorded_args("flags").is_none());
}

#[test]
fn missing_source_behaves_like_an_empty_surface() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    let output = fixture.run(&[], "4");

    assert!(output.status.success());
    assert!(stderr(&output).contains("[ERROR] Could not find script"));
    assert!(stdout(&output).contains("[INFO] No arguments selected. Exiting."));
}

#[test]
fn negative_confirmation_cancels_launch() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    // recon; set -json; quiet; skip query; refuse.
    let output = fixture.run(&[], "1y1\nn\n");

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Execute recon with arguments: -json -loglevel quiet?"));
    assert!(out.contains("Execution cancelled."));
    assert!(fixture.recorded_args("recon").is_none());
}

#[test]
fn end_of_input_is_a_clean_exit() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    let output = fixture.run(&[], "1y");

    assert!(output.status.success());
    assert!(stdout(&output).contains("[INFO] Exiting..."));
    assert!(fixture.recorded_args("recon").is_none());
}

#[test]
fn confirmed_flag_launches_scenario() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    let output = fixture.run(&[], "2y\n");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(fixture.recorded_args("flags").expect("flags ran"), ["-csv"]);
}
