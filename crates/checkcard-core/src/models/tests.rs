#[cfg(test)]
mod model_tests {
    use serde_json::{json, Map, Value};

    use crate::models::{Actor, CheckcardRecord, DataSection, LifecycleStatus, StepMetadata};

    fn create_test_metadata() -> StepMetadata {
        StepMetadata {
            step_id: "B1".to_string(),
            step_index: 3,
            step_name: "Planner Specify Phase".to_string(),
            agent: "planner".to_string(),
            description: "Generate the specification".to_string(),
            created_at: None,
        }
    }

    fn create_test_outputs() -> Map<String, Value> {
        let mut outputs = Map::new();
        outputs.insert("spec_file_path".to_string(), json!("specs/001/spec.md"));
        outputs
    }

    #[test]
    fn test_lifecycle_status_round_trips_through_strings() {
        for status in LifecycleStatus::ALL {
            assert_eq!(status.as_str().parse::<LifecycleStatus>(), Ok(status));
        }
        assert!("done".parse::<LifecycleStatus>().is_err());
        assert!("Completed".parse::<LifecycleStatus>().is_err());
    }

    #[test]
    fn test_lifecycle_status_open_states() {
        assert!(LifecycleStatus::Pending.is_open());
        assert!(LifecycleStatus::InProgress.is_open());
        assert!(!LifecycleStatus::Completed.is_open());
        assert!(!LifecycleStatus::Failed.is_open());
    }

    #[test]
    fn test_actor_parsing() {
        assert_eq!("Planner".parse::<Actor>(), Ok(Actor::Planner));
        assert_eq!(
            "database_architect".parse::<Actor>(),
            Ok(Actor::DatabaseArchitect)
        );
        assert_eq!(Actor::DatabaseArchitect.to_string(), "database-architect");
        assert!("janitor".parse::<Actor>().is_err());
    }

    #[test]
    fn test_actor_serializes_kebab_case() {
        let value = serde_json::to_value(Actor::DatabaseArchitect).unwrap();
        assert_eq!(value, json!("database-architect"));
    }

    #[test]
    fn test_record_serializes_only_present_lifecycle_fields() {
        let record = CheckcardRecord::new(
            create_test_metadata(),
            DataSection::with_outputs(create_test_outputs()),
        );
        let value = record.to_value().unwrap();

        assert_eq!(value["metadata"]["step_id"], "B1");
        assert_eq!(value["data"]["outputs"]["spec_file_path"], "specs/001/spec.md");
        assert!(value.get("status").is_none());
        assert!(value["data"].get("inputs").is_none());
    }

    #[test]
    fn test_record_builders_set_lifecycle_fields() {
        let record = CheckcardRecord::new(
            create_test_metadata(),
            DataSection::with_outputs(create_test_outputs()),
        )
        .with_status(LifecycleStatus::Completed)
        .with_timing("2025-01-15T10:30:00Z", "2025-01-15T10:45:00Z", 15.0);

        assert_eq!(record.lifecycle_status(), Some(LifecycleStatus::Completed));
        assert_eq!(record.started_at, Some(json!("2025-01-15T10:30:00Z")));
        assert_eq!(record.duration_minutes, Some(json!(15.0)));

        let failed = record.with_status(LifecycleStatus::Failed).with_error("boom");
        assert_eq!(failed.error, Some(json!("boom")));
    }

    #[test]
    fn test_unknown_status_is_kept_raw() {
        let record: CheckcardRecord = serde_json::from_value(json!({
            "metadata": {
                "step_id": "B1",
                "step_index": 3,
                "step_name": "Planner Specify Phase",
                "agent": "planner",
                "description": "d"
            },
            "data": {"outputs": {}},
            "status": "finished"
        }))
        .unwrap();

        assert_eq!(record.status, Some(json!("finished")));
        assert_eq!(record.lifecycle_status(), None);
    }

    #[test]
    fn test_legacy_agent_data_key_is_accepted() {
        let record: CheckcardRecord = serde_json::from_value(json!({
            "metadata": {
                "step_id": "B1",
                "step_index": 3,
                "step_name": "Planner Specify Phase",
                "agent": "planner",
                "description": "d"
            },
            "agent_data": {"outputs": {"spec_file_path": "a.md"}}
        }))
        .unwrap();

        assert_eq!(record.data.outputs["spec_file_path"], "a.md");
    }

    #[test]
    fn test_section_key() {
        assert_eq!(CheckcardRecord::section_key("F1"), "stepF1");
    }
}
