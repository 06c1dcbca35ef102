//! Plain-text rendering of root state, sequences and traces

use crate::constants::DEFAULT_SUPPORTED_SHIPYARD_VERSION;
use crate::models::{Project, SequenceState, Trace};
use crate::store::{ApiCall, RootState};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shipyard version the control plane supports, falling back to the default
pub fn supported_shipyard_version(state: &RootState) -> String {
    state
        .metadata
        .data
        .as_ref()
        .and_then(|m| m.shipyardversion.clone())
        .unwrap_or_else(|| DEFAULT_SUPPORTED_SHIPYARD_VERSION.to_string())
}

/// Summary of bridge info, metadata and projects
pub fn format_status(state: &RootState) -> String {
    let supported = supported_shipyard_version(state);
    let mut lines = Vec::new();

    match &state.keptn_info.data {
        Some(info) => {
            let version = info
                .bridge_info
                .bridge_version
                .as_deref()
                .unwrap_or("unknown");
            match info.bridge_update_available() {
                Some(newer) => lines.push(format!(
                    "Bridge:    {} (update available: {})",
                    version, newer
                )),
                None => lines.push(format!("Bridge:    {}", version)),
            }
        }
        None => lines.push(format!("Bridge:    {}", unavailable(&state.keptn_info))),
    }

    match &state.metadata.data {
        Some(metadata) => {
            lines.push(format!(
                "Keptn:     {}",
                metadata.keptnversion.as_deref().unwrap_or("unknown")
            ));
            lines.push(format!(
                "Namespace: {}",
                metadata.namespace.as_deref().unwrap_or("unknown")
            ));
        }
        None => lines.push(format!("Keptn:     {}", unavailable(&state.metadata))),
    }
    lines.push(format!("Shipyard:  {}", supported));

    match &state.projects.data {
        Some(projects) => {
            lines.push(format!("Projects ({}):", projects.len()));
            lines.extend(projects.iter().map(|p| format_project(p, &supported)));
        }
        None => lines.push(format!("Projects:  {}", unavailable(&state.projects))),
    }

    lines.join("\n")
}

fn unavailable<T>(call: &ApiCall<T>) -> String {
    match &call.error {
        Some(error) => format!("unavailable ({})", error),
        None => call.status.to_string(),
    }
}

/// One project line: stages, services and shipyard support
pub fn format_project(project: &Project, supported_shipyard: &str) -> String {
    let shipyard = project.shipyard_version.as_deref().unwrap_or("none");
    let support = if project.is_shipyard_not_supported(supported_shipyard) {
        " (not supported)"
    } else {
        ""
    };

    format!(
        "  {}  stages: {}  services: {}  shipyard: {}{}",
        project.project_name,
        project.stage_names().join(", "),
        project.distinct_service_names().join(", "),
        shipyard,
        support
    )
}

/// Latest sequences of one project
pub fn format_project_sequences(project_name: &str, sequences: &[SequenceState]) -> String {
    if sequences.is_empty() {
        return format!("{} (no sequences)", project_name);
    }

    let mut lines = vec![format!("{} ({} sequences)", project_name, sequences.len())];
    for sequence in sequences {
        let time = sequence
            .time
            .map(|t| t.format(TIME_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "  {}  {}  {}  {}  {}",
            time,
            sequence.service,
            sequence.name,
            sequence.status_label(),
            sequence.shkeptncontext
        ));
    }
    lines.join("\n")
}

/// Classification tag shown next to a trace
pub fn trace_status(trace: &Trace) -> Option<&'static str> {
    if trace.is_problem_resolved() {
        Some("resolved")
    } else if trace.is_declined() {
        Some("declined")
    } else if trace.is_failed() {
        Some("failed")
    } else if trace.is_problem() {
        Some("problem")
    } else if trace.is_warning() {
        Some("warning")
    } else if trace.is_successful() {
        Some("passed")
    } else {
        None
    }
}

/// One trace line
pub fn format_trace(trace: &Trace) -> String {
    let mut parts = vec![
        trace.time.format(TIME_FORMAT).to_string(),
        format!("[{}]", trace.icon()),
        trace.label().to_string(),
    ];
    if let Some(stage) = trace.stage() {
        parts.push(format!("stage={}", stage));
    }
    if let Some(image) = trace.short_image_name() {
        parts.push(format!("image={}", image));
    }
    if let Some(score) = trace.evaluation_score() {
        parts.push(format!("score={}", score));
    }
    if let Some(status) = trace_status(trace) {
        parts.push(format!("<{}>", status));
    }
    parts.join("  ")
}

/// Traces grouped by context, one block per context
pub fn format_trace_groups(groups: &[(String, Vec<Trace>)]) -> String {
    groups
        .iter()
        .map(|(context, traces)| {
            let mut lines = vec![context.clone()];
            lines.extend(traces.iter().map(|t| format!("  {}", format_trace(t))));
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event_types::{DEPLOYMENT_FINISHED, EVALUATION_FINISHED, PROBLEM_DETECTED};
    use crate::models::{
        KeptnInfo, Metadata, SequenceStage, SequenceStatus, Stage, TraceData, group_by_context,
    };
    use crate::models::trace::EvaluationData;
    use crate::store::RootAction;
    use chrono::{TimeZone, Utc};

    fn at(minute: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 4, 10, minute, 0).unwrap()
    }

    #[test]
    fn test_format_traces() {
        let deployment = Trace::new(
            "1",
            "ctx-1",
            DEPLOYMENT_FINISHED,
            at(1),
            Some(TraceData {
                stage: Some("dev".to_string()),
                result: Some("pass".to_string()),
                image: Some("docker.io/keptnexamples/carts:0.12.1".to_string()),
                ..Default::default()
            }),
        );
        let evaluation = Trace::new(
            "2",
            "ctx-1",
            EVALUATION_FINISHED,
            at(2),
            Some(TraceData {
                stage: Some("dev".to_string()),
                result: Some("warning".to_string()),
                evaluation: Some(EvaluationData {
                    score: Some(72.5),
                    ..Default::default()
                }),
                ..Default::default()
            }),
        );
        let problem = Trace::new(
            "3",
            "ctx-2",
            PROBLEM_DETECTED,
            at(0),
            Some(TraceData {
                state: Some("RESOLVED".to_string()),
                ..Default::default()
            }),
        );

        let groups = group_by_context(vec![evaluation, problem, deployment]);
        insta::assert_snapshot!(format_trace_groups(&groups), @r"
        ctx-1
          2021-03-04 10:01:00  [deploy]  Deployment finished  stage=dev  image=carts:0.12.1  <passed>
          2021-03-04 10:02:00  [traffic-light]  Evaluation finished  stage=dev  score=72.5  <warning>

        ctx-2
          2021-03-04 10:00:00  [criticalevent]  Problem resolved  <resolved>
        ");
    }

    #[test]
    fn test_format_project_sequences() {
        let sequence = SequenceState {
            shkeptncontext: "ctx-1".to_string(),
            name: "delivery".to_string(),
            project: "sockshop".to_string(),
            service: "carts".to_string(),
            state: SequenceStatus::Started,
            time: Some(at(5)),
            problem_title: None,
            stages: vec![SequenceStage {
                name: "staging".to_string(),
                ..Default::default()
            }],
        };

        insta::assert_snapshot!(format_project_sequences("sockshop", &[sequence]), @r"
        sockshop (1 sequences)
          2021-03-04 10:05:00  carts  delivery  running in staging  ctx-1
        ");
        assert_eq!(
            format_project_sequences("empty", &[]),
            "empty (no sequences)"
        );
    }

    #[test]
    fn test_format_status() {
        let mut state = RootState::new(None);
        state.reduce(&RootAction::LoadRootState);
        state.reduce(&RootAction::KeptnInfoLoaded(KeptnInfo {
            bridge_info: crate::models::BridgeInfo {
                bridge_version: Some("0.8.0".to_string()),
                ..Default::default()
            },
            available_versions: None,
        }));
        state.reduce(&RootAction::MetadataLoaded(Metadata {
            namespace: Some("keptn".to_string()),
            keptnversion: Some("0.8.0".to_string()),
            shipyardversion: Some("0.2.0".to_string()),
            ..Default::default()
        }));

        let mut sockshop = Project::new(
            "sockshop",
            vec![Stage::new("dev", &["carts", "orders"]), Stage::new("staging", &["carts"])],
        );
        sockshop.shipyard_version = Some("spec.keptn.sh/0.2.0".to_string());
        let legacy = Project::new("legacy", vec![Stage::new("prod", &["web"])]);
        state.reduce(&RootAction::ProjectsLoaded(vec![sockshop, legacy]));

        insta::assert_snapshot!(format_status(&state), @r"
        Bridge:    0.8.0
        Keptn:     0.8.0
        Namespace: keptn
        Shipyard:  0.2.0
        Projects (2):
          sockshop  stages: dev, staging  services: carts, orders  shipyard: spec.keptn.sh/0.2.0
          legacy  stages: prod  services: web  shipyard: none (not supported)
        ");
    }

    #[test]
    fn test_format_status_while_loading() {
        let mut state = RootState::new(None);
        state.reduce(&RootAction::LoadRootState);
        state.reduce(&RootAction::MetadataErrored("HTTP 503".to_string()));

        insta::assert_snapshot!(format_status(&state), @r"
        Bridge:    loading
        Keptn:     unavailable (HTTP 503)
        Shipyard:  0.2.0
        Projects:  loading
        ");
    }
}
