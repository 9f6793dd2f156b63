#[cfg(test)]
mod tests {
    use crate::agent::*;
    use crate::config::*;
    use crate::error::*;
    use crate::event::*;
    use crate::message::*;
    use crate::report::*;
    use crate::session::*;
    use chrono::{Duration, TimeZone, Utc};

    fn at(secs: i64) -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
    }

    fn state_with_agents(names: &[&str]) -> SessionState {
        let mut state = SessionState::new(60);
        for (i, name) in names.iter().enumerate() {
            state.agents.push(Agent::new(AgentDraft::new(*name, "argues"), i));
        }
        state
    }

    // ─── Agent Tests ─────────────────────────────────────────

    #[test]
    fn test_agent_new_defaults() {
        let agent = Agent::new(AgentDraft::new("  Ada ", " skeptical "), 0);
        assert_eq!(agent.name, "Ada");
        assert_eq!(agent.behavior, "skeptical");
        assert_eq!(agent.memory_summary, DEFAULT_MEMORY_SUMMARY);
        assert_eq!(agent.color, AGENT_PALETTE[0]);
        assert!(!agent.id.is_empty());
    }

    #[test]
    fn test_agent_color_wraps_palette() {
        let agent = Agent::new(AgentDraft::new("K", "b"), 12);
        assert_eq!(agent.color, AGENT_PALETTE[2]);
    }

    #[test]
    fn test_agent_ids_unique() {
        let a = Agent::new(AgentDraft::new("A", "b"), 0);
        let b = Agent::new(AgentDraft::new("A", "b"), 0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_agent_draft_validation() {
        assert!(AgentDraft::new("Ada", "calm").validate().is_ok());
        assert!(matches!(
            AgentDraft::new("  ", "calm").validate(),
            Err(SynapseError::Validation(_))
        ));
        assert!(matches!(
            AgentDraft::new("Ada", "").validate(),
            Err(SynapseError::Validation(_))
        ));
    }

    // ─── Message Tests ───────────────────────────────────────

    #[test]
    fn test_message_system() {
        let msg = Message::system("Is free will real?", at(0));
        assert!(msg.is_system);
        assert_eq!(msg.agent_id, SYSTEM_AGENT_ID);
        assert_eq!(msg.agent_name, SYSTEM_AGENT_NAME);
        assert!(msg.parent_id.is_none());
    }

    #[test]
    fn test_message_agent_lines() {
        let msg = Message::agent("a1", "Ada", "I disagree.", Some("m0".into()), at(1));
        assert!(!msg.is_system);
        assert_eq!(msg.bracketed_line(), "[Ada]: I disagree.");
        assert_eq!(msg.plain_line(), "Ada: I disagree.");
        assert_eq!(msg.parent_id.as_deref(), Some("m0"));
    }

    #[test]
    fn test_message_serializes_camel_case() {
        let msg = Message::agent("a1", "Ada", "hi", None, at(0));
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("agentId"));
        assert!(json.contains("isSystem"));
        assert!(!json.contains("parentId"));
    }

    // ─── SessionState Tests ──────────────────────────────────

    #[test]
    fn test_session_new_is_idle() {
        let state = SessionState::new(300);
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.elapsed, 0);
        assert!(!state.is_playing());
        assert!(state.last_speaker().is_none());
    }

    #[test]
    fn test_last_speaker_ignores_system() {
        let mut state = state_with_agents(&["A", "B"]);
        let a = state.agents[0].id.clone();
        state.messages.push(Message::system("T", at(0)));
        assert!(state.last_speaker().is_none());
        state.messages.push(Message::agent(&a, "A", "x", None, at(1)));
        state.messages.push(Message::system("note", at(2)));
        assert_eq!(state.last_speaker(), Some(a.as_str()));
    }

    #[test]
    fn test_recent_non_system_keeps_order() {
        let mut state = state_with_agents(&["A"]);
        state.messages.push(Message::system("T", at(0)));
        for i in 0..5 {
            state.messages.push(Message::agent("a", "A", format!("m{}", i), None, at(i + 1)));
        }
        let recent = state.recent_non_system(3);
        let contents: Vec<&str> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m2", "m3", "m4"]);
        assert_eq!(state.recent_entries(10).len(), 6);
        assert_eq!(state.non_system_count(), 5);
    }

    #[test]
    fn test_parent_lookup_by_identity() {
        let mut state = SessionState::new(60);
        let root = Message::agent("a", "A", "root", None, at(0));
        let reply = Message::agent("b", "B", "reply", Some(root.id.clone()), at(1));
        state.messages.push(reply.clone());
        state.messages.push(root.clone());
        assert_eq!(state.parent_of(&reply).map(|m| m.id.clone()), Some(root.id.clone()));
        assert!(state.parent_of(&root).is_none());
    }

    #[test]
    fn test_display_order_sorts_by_timestamp() {
        let mut state = SessionState::new(60);
        state.messages.push(Message::agent("a", "A", "late", None, at(5)));
        state.messages.push(Message::agent("b", "B", "early", None, at(1)));
        state.messages.push(Message::agent("c", "C", "tie", None, at(5)));
        let ordered: Vec<&str> = state
            .display_order()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(ordered, vec!["early", "late", "tie"]);
    }

    #[test]
    fn test_is_live_checks_epoch_and_budget() {
        let mut state = SessionState::new(10);
        state.phase = Phase::Running;
        state.epoch = 3;
        assert!(state.is_live(3));
        assert!(!state.is_live(2));
        state.elapsed = 10;
        assert!(!state.is_live(3));
    }

    #[test]
    fn test_hms_helpers() {
        assert_eq!(duration_from_hms(1, 2, 3), 3723);
        assert_eq!(format_hms(3723), "01:02:03");
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(Phase::Finished.to_string(), "finished");
    }

    // ─── Config Tests ────────────────────────────────────────

    #[test]
    fn test_config_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.pacing.min_delay_ms, 4000);
        assert_eq!(config.pacing.max_delay_ms, 10000);
        assert_eq!(config.max_agents, 10);
        assert_eq!(config.memory_cadence, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config = SimulationConfig::from_json(
            r#"{"generation": {"endpoint": "https://example.test/ask"}, "tick_interval_ms": 500}"#,
        )
        .unwrap();
        assert_eq!(config.generation.endpoint, "https://example.test/ask");
        assert_eq!(config.generation.backend, GenerationBackend::FormEndpoint);
        assert_eq!(config.tick_interval_ms, 500);
        assert_eq!(config.report_window, 120);
    }

    #[test]
    fn test_config_rejects_inverted_pacing() {
        let mut config = SimulationConfig::default();
        config.pacing.min_delay_ms = 11_000;
        assert!(matches!(config.validate(), Err(SynapseError::Config(_))));
    }

    #[test]
    fn test_config_rejects_bad_probability() {
        let result = SimulationConfig::from_json(r#"{"reply_probability": 1.5}"#);
        assert!(matches!(result, Err(SynapseError::Config(_))));
    }

    #[test]
    fn test_config_invalid_json() {
        let result = SimulationConfig::from_json("{not json");
        assert!(matches!(result, Err(SynapseError::Serialization(_))));
    }

    // ─── Report Tests ────────────────────────────────────────

    #[test]
    fn test_report_fields_cover_all_slots() {
        let mut data = ReportData::default();
        for field in ReportField::all() {
            data.set_field(*field, field.key().to_string());
        }
        assert_eq!(data.dominant_agents, "dominantAgents");
        assert_eq!(data.behavioral_stability, "behavioralStability");
        assert!(data.overall_conclusion.is_empty());
        assert_eq!(ReportField::all().len(), 6);
    }

    #[test]
    fn test_report_sections_numbered() {
        let report = ExperimentReport {
            topic: "T".into(),
            generated_at: at(0),
            elapsed: 65,
            duration: 300,
            data: ReportData {
                conflicts: "Ada and Bo clashed.".into(),
                ..Default::default()
            },
        };
        let sections = report.sections();
        assert_eq!(sections.len(), 6);
        assert_eq!(sections[0].title, "1. DOMINANT AGENTS");
        assert_eq!(sections[2].content, "Ada and Bo clashed.");
        let text = report.to_plain_text();
        assert!(text.starts_with("SYNAPSE RESEARCH REPORT"));
        assert!(text.contains("Duration: 00:01:05 / 00:05:00"));
        assert!(report.file_stem().starts_with("SYNAPSE_ANALYTICS_2023-"));
    }

    #[test]
    fn test_to_plain_text_strips_markdown() {
        let raw = "## Summary\n- **Ada** led the `debate`\n* Bo followed";
        assert_eq!(to_plain_text(raw), "Summary Ada led the debate Bo followed");
    }

    #[test]
    fn test_to_plain_text_keeps_lone_markers() {
        assert_eq!(to_plain_text("2*3 equals 6"), "2*3 equals 6");
        assert_eq!(to_plain_text("a * b and snake__case"), "a * b and snake__case");
        assert_eq!(to_plain_text("*Bo* doubts it"), "Bo doubts it");
        assert_eq!(to_plain_text("use `x*y` here"), "use x*y here");
    }

    #[test]
    fn test_clamp_words() {
        assert_eq!(clamp_words("one two  three four", 2), "one two");
        assert_eq!(clamp_words("short", 80), "short");
    }

    // ─── Event & Error Tests ─────────────────────────────────

    #[test]
    fn test_event_serialization_tagged() {
        let event = SimulationEvent::Tick { elapsed: 4 };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"Tick""#));
        let back: SimulationEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_error_display() {
        let err = SynapseError::InsufficientData { required: 5, found: 4 };
        assert_eq!(err.to_string(), "Insufficient data: need at least 5 messages, found 4");
        assert_eq!(
            SynapseError::Generation("HTTP 503".into()).to_string(),
            "Generation error: HTTP 503"
        );
        let err = SynapseError::InvalidTransition {
            action: "restart".into(),
            phase: Phase::Running.to_string(),
        };
        assert_eq!(err.to_string(), "Cannot restart while running");
    }
}
