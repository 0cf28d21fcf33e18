//! End-to-end pipeline runner tests over scripted mock models.

use conclave_models::{MockModel, ModelParameters};
use conclave_orchestrator::{Agent, AssistantAgent, PipelineRunner};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn scripted_agent(name: &str, group: &str, responses: Vec<&str>) -> Arc<dyn Agent> {
    Arc::new(AssistantAgent::new(
        name,
        group,
        format!("You are {name}."),
        Arc::new(MockModel::with_responses(
            "mock",
            responses.into_iter().map(String::from).collect(),
        )),
        ModelParameters::default(),
    ))
}

/// Agent backed by the echoing mock: its response embeds the last message it
/// saw, which makes input threading observable from the outside.
fn echo_agent(name: &str, group: &str) -> Arc<dyn Agent> {
    Arc::new(AssistantAgent::new(
        name,
        group,
        format!("You are {name}."),
        Arc::new(MockModel::new(format!("{name}-model"))),
        ModelParameters::default(),
    ))
}

fn council() -> Vec<Arc<dyn Agent>> {
    vec![
        scripted_agent("Planner", "plan", vec!["Yes, with caveats."]),
        scripted_agent("ExpertA", "discuss", vec!["Upside is real.", "Still convinced."]),
        scripted_agent("ExpertB", "discuss", vec!["Risk is low.", "Agreed."]),
    ]
}

#[tokio::test]
async fn test_single_agent_stage_output_is_raw_response() {
    let dir = TempDir::new().unwrap();
    let runner = PipelineRunner::new().with_log_dir(dir.path());

    let run = runner
        .run(
            "Should we launch?",
            &council(),
            &["plan".to_string()],
        )
        .await
        .unwrap();

    // No speaker prefix for a single-agent stage.
    assert_eq!(run.final_output, "Yes, with caveats.");
    assert_eq!(run.session.stage_output("plan"), Some("Yes, with caveats."));
}

#[tokio::test]
async fn test_multi_agent_stage_capped_and_alternating() {
    let dir = TempDir::new().unwrap();
    let runner = PipelineRunner::new()
        .with_termination_count(3)
        .with_log_dir(dir.path());

    let run = runner
        .run(
            "Should we launch?",
            &council(),
            &["plan".to_string(), "discuss".to_string()],
        )
        .await
        .unwrap();

    let discuss = run.session.stage_output("discuss").unwrap();
    assert_eq!(
        discuss,
        "Source: ExpertA\nContent: Upside is real.\n\n\
         Source: ExpertB\nContent: Risk is low.\n\n\
         Source: ExpertA\nContent: Still convinced."
    );
    // Final output is the last stage's output, not the planner's.
    assert_eq!(run.final_output, discuss);
}

#[tokio::test]
async fn test_empty_group_is_skipped_and_input_threads_through() {
    let dir = TempDir::new().unwrap();
    let runner = PipelineRunner::new().with_log_dir(dir.path());

    let agents = vec![
        scripted_agent("Planner", "plan", vec!["Yes, with caveats."]),
        echo_agent("Decider", "decide"),
    ];
    let run = runner
        .run(
            "Should we launch?",
            &agents,
            &["plan".to_string(), "ghost".to_string(), "decide".to_string()],
        )
        .await
        .unwrap();

    // The unmatched stage records nothing and does not alter the input.
    assert!(run.session.stage_output("ghost").is_none());
    let stages: Vec<&str> = run
        .session
        .stage_outputs
        .iter()
        .map(|(group, _)| group.as_str())
        .collect();
    assert_eq!(stages, vec!["plan", "decide"]);

    // The decide stage saw the plan stage's output as its input.
    assert!(run.final_output.contains("Yes, with caveats."));
}

#[tokio::test]
async fn test_session_log_written_with_all_sections() {
    let dir = TempDir::new().unwrap();
    let runner = PipelineRunner::new()
        .with_termination_count(2)
        .with_log_dir(dir.path());

    let run = runner
        .run(
            "Should we launch?",
            &council(),
            &["plan".to_string(), "discuss".to_string()],
        )
        .await
        .unwrap();

    let path = run.log_path.expect("log should have been written");
    let contents = fs::read_to_string(path).unwrap();

    assert!(contents.contains("=== Task ===\n\nShould we launch?"));
    assert!(contents.contains("=== PLAN ===\n\nYes, with caveats."));
    assert!(contents.contains("=== DISCUSS ===\n\nSource: ExpertA\nContent: Upside is real."));
    assert!(contents.contains("=== Elapsed Time ===\n\n"));
    assert!(contents.trim_end().ends_with("seconds"));
}

#[tokio::test]
async fn test_failed_log_write_is_nonfatal() {
    let dir = TempDir::new().unwrap();
    // A plain file occupies the log directory path, so the write must fail.
    let blocked = dir.path().join("logs");
    fs::write(&blocked, "not a directory").unwrap();

    let runner = PipelineRunner::new().with_log_dir(&blocked);
    let run = runner
        .run("Should we launch?", &council(), &["plan".to_string()])
        .await
        .unwrap();

    // The in-memory result is still delivered even though nothing persisted.
    assert!(run.log_path.is_none());
    assert_eq!(run.final_output, "Yes, with caveats.");
    assert_eq!(run.session.stage_output("plan"), Some("Yes, with caveats."));
}

#[tokio::test]
async fn test_run_with_no_matching_stages_returns_empty_output() {
    let dir = TempDir::new().unwrap();
    let runner = PipelineRunner::new().with_log_dir(dir.path());

    let run = runner
        .run("task", &council(), &["ghost".to_string()])
        .await
        .unwrap();

    assert_eq!(run.final_output, "");
    assert!(run.session.stage_outputs.is_empty());
}
