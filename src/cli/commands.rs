//! Status, sequences and events commands

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;

use super::output;
use crate::config::Config;
use crate::models::{Trace, group_by_context};
use crate::services::BridgeSession;
use crate::store::{EffectKind, RootAction, RootState};

/// Load the root state once and print a summary
///
/// The summary is printed even if loading failed part way.
pub async fn run_status(config: &Config) -> Result<()> {
    let mut session = BridgeSession::from_config(config)?;
    let result = session.load().await;

    println!("{}", output::format_status(&session.snapshot()));
    result.map(|_| ())
}

/// Load the root state and print each project's sequences as they arrive
pub async fn run_sequences(config: &Config, page_size: Option<u32>) -> Result<()> {
    let mut config = config.clone();
    if page_size.is_some() {
        config.page_size = page_size;
    }

    let mut session = BridgeSession::from_config(&config)?;
    session.load_root_state();

    let mut failures = 0;
    while !session.store().read(RootState::is_idle) {
        let Some(action) = session.process_next().await else {
            break;
        };
        match action {
            RootAction::ProjectsLoaded(projects) if projects.is_empty() => {
                println!("No projects found");
            }
            RootAction::LatestSequencesLoaded {
                project_name,
                sequences,
                ..
            } => {
                println!(
                    "{}",
                    output::format_project_sequences(&project_name, &sequences)
                );
            }
            RootAction::EffectFailed {
                effect: EffectKind::Projects,
                message,
            } => bail!(message),
            RootAction::EffectFailed { message, .. } => {
                eprintln!("Error: {}", message);
                failures += 1;
            }
            _ => {}
        }
    }

    if failures > 0 {
        bail!("Sequences of {} project(s) could not be loaded", failures);
    }
    Ok(())
}

/// Event files are either a bare array or an API page (`{"events": [...]}`)
#[derive(Deserialize)]
#[serde(untagged)]
enum EventsFile {
    List(Vec<Trace>),
    Page { events: Vec<Trace> },
}

/// Parse an events document
pub fn parse_events(content: &str) -> Result<Vec<Trace>> {
    let file: EventsFile = serde_json::from_str(content).context("Failed to parse events")?;
    Ok(match file {
        EventsFile::List(events) | EventsFile::Page { events } => events,
    })
}

/// Classify the events in a file and print them grouped by context
pub fn run_events(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read events file: {}", path.display()))?;
    let events = parse_events(&content)
        .with_context(|| format!("Invalid events file: {}", path.display()))?;

    tracing::debug!("Loaded {} events from {}", events.len(), path.display());

    if events.is_empty() {
        println!("No events");
        return Ok(());
    }
    println!("{}", output::format_trace_groups(&group_by_context(events)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_events_array_and_page() {
        let array = r#"[{
            "id": "1",
            "shkeptncontext": "ctx",
            "time": "2021-03-04T10:00:00Z",
            "type": "sh.keptn.event.deployment.finished"
        }]"#;
        let events = parse_events(array).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].label(), "Deployment finished");

        let page = r#"{"events": [], "totalCount": 0}"#;
        assert!(parse_events(page).unwrap().is_empty());

        assert!(parse_events(r#"{"states": []}"#).is_err());
    }
}
