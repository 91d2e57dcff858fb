//! MCP tool implementations — maps tool calls to store and search reads.
//!
//! The descriptor set is static per server version. Handlers validate
//! their own arguments, resolve the project strictly by caller
//! ownership, and render fixed-format text; every failure is a typed
//! [`ToolError`] the dispatcher serializes, nothing escapes as a panic.

use std::sync::Arc;

use serde_json::{json, Value};
use thiserror::Error;

use super::types::{ToolDefinition, ToolsCallResult};
use crate::search::{SearchEngine, SearchResults, MATCHES_PER_VIDEO};
use crate::store::{ContentStore, Project, Rule, StoreError};

/// Default video count for search-transcript when the caller sends none.
const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Typed failures from tool validation and execution.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Missing required parameter: {0}")]
    MissingParam(&'static str),

    /// Nonexistent and other-owner projects are reported identically.
    #[error("Project not found")]
    ProjectNotFound,

    /// Collaborator failure; the dispatcher logs it and surfaces a
    /// generic internal error with no detail.
    #[error("store failure: {0}")]
    Internal(StoreError),
}

/// Dependencies a tool call reads through. Constructed once at startup
/// and shared across requests; the handlers themselves are stateless.
pub struct ToolContext {
    store: Arc<dyn ContentStore>,
    search: SearchEngine,
}

impl ToolContext {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        let search = SearchEngine::new(Arc::clone(&store));
        Self { store, search }
    }
}

/// Return the list of all available tools with their JSON schemas.
pub fn list_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "search-transcript".to_string(),
            description: "Search a project's video transcripts for a phrase. \
                Returns context snippets around each occurrence, per video, \
                with true match counts."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "projectId": {
                        "type": "string",
                        "description": "Project id or slug owned by the caller"
                    },
                    "query": {
                        "type": "string",
                        "description": "Literal phrase to look for (case-insensitive)"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum matching videos to return (default: 10, max: 50)",
                        "default": 10
                    }
                },
                "required": ["projectId", "query"]
            }),
        },
        ToolDefinition {
            name: "get-brand-rules".to_string(),
            description: "Get a project's brand and styling rules as a \
                category-grouped summary."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "projectId": {
                        "type": "string",
                        "description": "Project id or slug owned by the caller"
                    }
                },
                "required": ["projectId"]
            }),
        },
        ToolDefinition {
            name: "list-rules".to_string(),
            description: "List every rule in a project with category and \
                priority, highest priority first."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "projectId": {
                        "type": "string",
                        "description": "Project id or slug owned by the caller"
                    }
                },
                "required": ["projectId"]
            }),
        },
    ]
}

/// Dispatch a tool call to the appropriate handler.
pub async fn call_tool(
    ctx: &ToolContext,
    user_id: &str,
    name: &str,
    arguments: &Value,
) -> Result<ToolsCallResult, ToolError> {
    match name {
        "search-transcript" => handle_search(ctx, user_id, arguments).await,
        "get-brand-rules" => handle_brand_rules(ctx, user_id, arguments).await,
        "list-rules" => handle_list_rules(ctx, user_id, arguments).await,
        _ => Err(ToolError::UnknownTool(name.to_string())),
    }
}

/// Extract a required, non-blank string argument.
fn require_str<'a>(args: &'a Value, key: &'static str) -> Result<&'a str, ToolError> {
    match args.get(key).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(ToolError::MissingParam(key)),
    }
}

/// Resolve the referenced project strictly within the caller's scope.
async fn resolve_project(
    ctx: &ToolContext,
    user_id: &str,
    args: &Value,
) -> Result<Project, ToolError> {
    let project_ref = require_str(args, "projectId")?;
    match ctx.store.project_for_owner(user_id, project_ref).await {
        Ok(project) => Ok(project),
        Err(StoreError::NotFound) => Err(ToolError::ProjectNotFound),
        Err(e) => Err(ToolError::Internal(e)),
    }
}

async fn handle_search(
    ctx: &ToolContext,
    user_id: &str,
    args: &Value,
) -> Result<ToolsCallResult, ToolError> {
    let query = require_str(args, "query")?;
    let project = resolve_project(ctx, user_id, args).await?;
    let limit = args
        .get("limit")
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_SEARCH_LIMIT);

    let results = ctx
        .search
        .search(&project, query, limit)
        .await
        .map_err(ToolError::Internal)?;

    Ok(ToolsCallResult::text(render_search(&project, query, &results)))
}

async fn handle_brand_rules(
    ctx: &ToolContext,
    user_id: &str,
    args: &Value,
) -> Result<ToolsCallResult, ToolError> {
    let project = resolve_project(ctx, user_id, args).await?;
    let rules = ctx
        .store
        .rules(&project.id)
        .await
        .map_err(ToolError::Internal)?;

    Ok(ToolsCallResult::text(render_brand_rules(&project, &rules)))
}

async fn handle_list_rules(
    ctx: &ToolContext,
    user_id: &str,
    args: &Value,
) -> Result<ToolsCallResult, ToolError> {
    let project = resolve_project(ctx, user_id, args).await?;
    let rules = ctx
        .store
        .rules(&project.id)
        .await
        .map_err(ToolError::Internal)?;

    Ok(ToolsCallResult::text(render_rule_listing(&project, &rules)))
}

// ─── Text Rendering ─────────────────────────────────────────────

fn render_search(project: &Project, query: &str, results: &SearchResults) -> String {
    if results.results.is_empty() {
        return format!(
            "No matches for \"{}\" across {} video(s) in {}.",
            query, results.total_videos, project.name
        );
    }

    let total_matches: usize = results.results.iter().map(|v| v.total_matches).sum();
    let mut out = format!(
        "Found {} match(es) in {} of {} video(s) in {} for \"{}\":\n",
        total_matches,
        results.results.len(),
        results.total_videos,
        project.name,
        query
    );
    for video in &results.results {
        out.push_str(&format!("\n{} ({})\n", video.title, video.media_id));
        for snippet in &video.snippets {
            out.push_str(&format!("  - \"{}\"\n", snippet));
        }
        if video.total_matches > video.snippets.len() {
            out.push_str(&format!(
                "  (showing {} of {} matches)\n",
                MATCHES_PER_VIDEO, video.total_matches
            ));
        }
    }
    out
}

fn render_brand_rules(project: &Project, rules: &[Rule]) -> String {
    if rules.is_empty() {
        return format!("No brand rules defined for {}.", project.name);
    }

    let mut categories: Vec<&str> = rules.iter().map(|r| r.category.as_str()).collect();
    categories.sort_unstable();
    categories.dedup();

    let mut out = format!("Brand rules for {}:\n", project.name);
    for category in categories {
        out.push_str(&format!("\n[{}]\n", category));
        let mut in_category: Vec<&Rule> =
            rules.iter().filter(|r| r.category == category).collect();
        in_category.sort_by_key(|r| std::cmp::Reverse(r.priority));
        for rule in in_category {
            out.push_str(&format!("- {}: {}\n", rule.name, rule.content));
        }
    }
    out
}

fn render_rule_listing(project: &Project, rules: &[Rule]) -> String {
    if rules.is_empty() {
        return format!("No rules defined for {}.", project.name);
    }

    let mut ordered: Vec<&Rule> = rules.iter().collect();
    ordered.sort_by_key(|r| std::cmp::Reverse(r.priority));

    let mut out = format!("Rules for {} ({}):\n", project.name, ordered.len());
    for (idx, rule) in ordered.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. {} [{}] (priority {})\n   {}\n",
            idx + 1,
            rule.name,
            rule.category,
            rule.priority,
            rule.content
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Transcript};

    fn seeded_context() -> ToolContext {
        let store = MemoryStore::new()
            .with_project(Project {
                id: "p1".to_string(),
                owner_id: "user-1".to_string(),
                name: "Demo".to_string(),
                slug: "demo".to_string(),
            })
            .with_transcript(Transcript {
                id: "t1".to_string(),
                project_id: "p1".to_string(),
                title: "Launch retro".to_string(),
                media_id: "media-t1".to_string(),
                playback_url: "https://cdn.example/t1".to_string(),
                text: "we talked about state management in the app".to_string(),
            })
            .with_rule(Rule {
                id: "r1".to_string(),
                project_id: "p1".to_string(),
                transcript_id: None,
                name: "Tone".to_string(),
                content: "Friendly, never salesy".to_string(),
                category: "voice".to_string(),
                priority: 5,
            })
            .with_rule(Rule {
                id: "r2".to_string(),
                project_id: "p1".to_string(),
                transcript_id: Some("t1".to_string()),
                name: "Colors".to_string(),
                content: "Always the teal palette".to_string(),
                category: "visual".to_string(),
                priority: 9,
            });
        ToolContext::new(Arc::new(store))
    }

    #[tokio::test]
    async fn unknown_tool_is_typed() {
        let ctx = seeded_context();
        let err = call_tool(&ctx, "user-1", "drop-tables", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn missing_and_blank_arguments_are_rejected() {
        let ctx = seeded_context();
        let err = call_tool(&ctx, "user-1", "search-transcript", &json!({"projectId": "demo"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::MissingParam("query")));

        // A whitespace-only query must never reach the engine.
        let err = call_tool(
            &ctx,
            "user-1",
            "search-transcript",
            &json!({"projectId": "demo", "query": "   "}),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ToolError::MissingParam("query")));
    }

    #[tokio::test]
    async fn foreign_project_reads_as_not_found() {
        let ctx = seeded_context();
        let err = call_tool(&ctx, "user-2", "list-rules", &json!({"projectId": "demo"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ProjectNotFound));
    }

    #[tokio::test]
    async fn search_renders_one_line_per_snippet() {
        let ctx = seeded_context();
        let result = call_tool(
            &ctx,
            "user-1",
            "search-transcript",
            &json!({"projectId": "demo", "query": "state management"}),
        )
        .await
        .unwrap();

        let text = &result.content[0].text;
        assert!(text.contains("Launch retro (media-t1)"));
        let match_lines: Vec<&str> = text.lines().filter(|l| l.starts_with("  - ")).collect();
        assert_eq!(match_lines.len(), 1);
        assert!(match_lines[0].contains("state management"));
    }

    #[tokio::test]
    async fn brand_rules_group_by_category() {
        let ctx = seeded_context();
        let result = call_tool(&ctx, "user-1", "get-brand-rules", &json!({"projectId": "p1"}))
            .await
            .unwrap();

        let text = &result.content[0].text;
        assert!(text.starts_with("Brand rules for Demo:"));
        let visual = text.find("[visual]").unwrap();
        let voice = text.find("[voice]").unwrap();
        assert!(visual < voice);
        assert!(text.contains("- Colors: Always the teal palette"));
    }

    #[tokio::test]
    async fn rule_listing_orders_by_priority_descending() {
        let ctx = seeded_context();
        let result = call_tool(&ctx, "user-1", "list-rules", &json!({"projectId": "demo"}))
            .await
            .unwrap();

        let text = &result.content[0].text;
        assert!(text.contains("Rules for Demo (2):"));
        assert!(text.contains("1. Colors [visual] (priority 9)"));
        assert!(text.contains("2. Tone [voice] (priority 5)"));
    }
}
