//! The standard specify / clarify / plan / tasks workflow.

use super::{
    InputSpec, NestedRequirement, OutputField, RegistryBuilder, StepBehavior, StepDefinition,
    StepRegistry, StructuralRules, ValueKind,
};
use crate::models::Actor;

const SPEC_PATH_PROMPT: &str = "Spec file path (e.g. .specify/specs/001-feature/spec.md)";

/// Builder pre-loaded with the standard steps A1 to F1.
pub fn speckit_builder() -> RegistryBuilder {
    RegistryBuilder::new()
        .step("A1", user_request())
        .step("B1", specify())
        .step("C1", clarify())
        .step("D1", plan())
        .step("E1", plan_review())
        .step("F1", tasks())
}

/// The standard steps are fixed and covered by the registry tests, so they
/// are indexed without re-running the whole-graph checks.
pub(super) fn speckit_registry() -> StepRegistry {
    speckit_builder().into_unchecked()
}

fn user_request() -> StepDefinition {
    StepDefinition::new(Actor::Orchestrator, 1, "User Request + Orchestrator Dialog")
        .describe("Orchestrator refines the user story with the user")
        .output(OutputField::text(
            "user_initial_input",
            "What did the user ask for?",
        ))
        .output(OutputField::boolean(
            "user_approved_stepA2",
            "Did the user approve the user story? (true/false)",
        ))
        .output(OutputField::text(
            "description_of_feature",
            "Summary of the approved user story [max. 500 chars]",
        ))
        .output(OutputField::text(
            "user_story",
            "Complete user story (WHO does WHAT and WHY) [max. 2000 chars]",
        ))
        .tool(OutputField::list(
            "file_context_accessed",
            "File context accessed (optional)",
        ))
        .tool(OutputField::list(
            "mcp_servers_accessed",
            "MCP servers accessed (optional)",
        ))
        .tool(OutputField::list(
            "claude_skills_accessed",
            "Skills accessed (optional, paths)",
        ))
        .rules(
            StructuralRules::standard("A1", Actor::Orchestrator).nested(
                NestedRequirement::new("data.tools")
                    .field("file_context_accessed", ValueKind::List)
                    .field("mcp_servers_accessed", ValueKind::List)
                    .field("claude_skills_accessed", ValueKind::List)
                    .optional(),
            ),
        )
        .instructions([
            "1. Engage in Socratic dialog with user to understand their feature request",
            "2. Ask clarifying questions to refine requirements",
            "3. Create a complete user story following WHO/WHAT/WHY format",
            "4. Get user approval for the user story",
            "5. Track which tools/context you accessed (files, MCP servers, skills)",
        ])
}

fn specify() -> StepDefinition {
    StepDefinition::new(Actor::Planner, 3, "Planner Specify Phase")
        .describe("Planner researches the codebase and writes the specification")
        .input(InputSpec::from_step("A1").map("user_story", "outputs.user_story"))
        .output(OutputField::text("spec_file_path", SPEC_PATH_PROMPT))
        .rules(StructuralRules::standard("B1", Actor::Planner))
        .instructions([
            "1. Read the user story from the inputs",
            "2. Research the codebase using available tools (Read, Grep, Glob)",
            "3. Execute /speckit.specify command with the user story",
            "4. Generate specification document (spec.md)",
            "5. Provide the spec file path in outputs",
        ])
}

fn clarify() -> StepDefinition {
    StepDefinition::new(Actor::Orchestrator, 4, "Orchestrator Clarify Phase")
        .describe("Orchestrator clarifies the specification with the user")
        .input(InputSpec::from_step("B1").map("spec_file_path", "outputs.spec_file_path"))
        .output(OutputField::boolean(
            "user_approved_clarification",
            "Did the user approve the clarification? (true/false)",
        ))
        .output(OutputField::text("clarify_summary", "Clarification summary"))
        .output(OutputField::text("spec_file_path", SPEC_PATH_PROMPT))
        .rules(StructuralRules::standard("C1", Actor::Orchestrator))
        .instructions([
            "1. Read the spec file path from inputs",
            "2. Review the specification with the user",
            "3. Execute /speckit.clarify if needed to address unclear areas",
            "4. Iterate with user until spec is approved",
            "5. Provide approval status and final spec path",
        ])
}

fn plan() -> StepDefinition {
    StepDefinition::new(Actor::Planner, 5, "Planner Plan Phase")
        .describe("Planner creates the technical plan from the specification")
        .input(InputSpec::from_step("C1").map("spec_file_path", "outputs.spec_file_path"))
        .output(OutputField::text("spec_file_path", SPEC_PATH_PROMPT))
        .output(OutputField::text(
            "plan_file_path",
            "Plan file path (e.g. .specify/plans/001-feature/plan.md)",
        ))
        .output(OutputField::text(
            "plan_analyze_summary_path",
            "Plan analyze summary path",
        ))
        .output(OutputField::text("research_path", "Research path"))
        .output(OutputField::text("data_model_path", "Data model path"))
        .output(OutputField::text("contracts_path", "Contracts path"))
        .output(OutputField::text("quickstart_path", "Quickstart path"))
        .rules(StructuralRules::standard("D1", Actor::Planner))
        .instructions([
            "1. Read the approved spec file path from inputs",
            "2. Use MCP tools to gather library docs (context7, shadcn, supabase)",
            "3. Execute /speckit.plan command",
            "4. Generate plan.md and all artifacts (research, data-model, contracts, quickstart)",
            "5. Provide all file paths in outputs",
        ])
}

fn plan_review() -> StepDefinition {
    StepDefinition::new(Actor::Orchestrator, 6, "Orchestrator Plan Review Phase")
        .describe("Orchestrator reviews the plan and gets user approval")
        .input(
            InputSpec::from_step("D1")
                .map("plan_file_path", "outputs.plan_file_path")
                .map("plan_analyze_summary_path", "outputs.plan_analyze_summary_path"),
        )
        .output(OutputField::boolean(
            "user_approved_plan",
            "Did the user approve the plan? (true/false)",
        ))
        .output(OutputField::text(
            "plan_summary_path",
            "Plan summary path (may be changed by user iteration)",
        ))
        .rules(StructuralRules::standard("E1", Actor::Orchestrator))
        .instructions([
            "1. Read plan file paths from inputs",
            "2. Execute /speckit.analyze to review plan quality",
            "3. Present plan summary to user (focus on plan.md, brief analyze.md mention)",
            "4. Get user approval (allow up to 3 review iterations)",
            "5. Provide approval status and final plan path",
        ])
}

fn tasks() -> StepDefinition {
    StepDefinition::new(Actor::Planner, 7, "Planner Tasks Phase")
        .describe("Planner breaks the plan down into actionable tasks")
        .input(InputSpec::from_step("E1").map("plan_file_path", "outputs.plan_summary_path"))
        .output(OutputField::json("tasks_json", "Task list as a JSON array"))
        .output(OutputField::text(
            "task_file_path",
            "Where should tasks be saved? (e.g. .specify/tasks/001-feature/tasks.md)",
        ))
        .behavior(StepBehavior::TaskListValidated {
            field: "tasks_json".to_string(),
        })
        .rules(StructuralRules::standard("F1", Actor::Planner))
        .instructions([
            "1. Read the approved plan path from inputs",
            "2. Execute /speckit.tasks command",
            "3. Generate task breakdown as JSON array",
            "4. Provide tasks JSON - it will be automatically validated",
            "5. Provide file path where tasks should be saved",
        ])
}
