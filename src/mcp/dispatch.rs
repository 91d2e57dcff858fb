//! Protocol Dispatcher — one stateless cycle per request.
//!
//! Received → Authenticated → Tier-Checked → Method-Routed →
//! {Succeeded | Failed}. The dispatcher owns its collaborators as
//! constructor-injected trait objects, holds no cross-request state,
//! and is the only place typed failures become wire-format error
//! envelopes. Logging happens here, at the boundary, not in handlers.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use super::tools::{self, ToolContext, ToolError};
use super::types::*;
use crate::auth::AuthProvider;
use crate::store::{ContentStore, SubscriptionStore};
use crate::tiers::{required_tier, Capability, Tier, TierResolver};

/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub struct Dispatcher {
    auth: Arc<dyn AuthProvider>,
    tiers: TierResolver,
    tools: ToolContext,
}

impl Dispatcher {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        subscriptions: Arc<dyn SubscriptionStore>,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        Self {
            auth,
            tiers: TierResolver::new(subscriptions),
            tools: ToolContext::new(store),
        }
    }

    /// Handle one raw request body and produce its response, or `None`
    /// for notifications (which never get a wire response).
    pub async fn dispatch(&self, bearer: Option<&str>, body: &str) -> Option<JsonRpcResponse> {
        // Best-effort id salvage so even pre-parse failures echo the
        // caller's correlation id when the body carries one.
        let salvaged_id = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("id").cloned())
            .unwrap_or(Value::Null);

        // Received → Authenticated.
        let user_id = match bearer {
            Some(token) => match self.auth.resolve_bearer(token).await {
                Ok(user_id) => user_id,
                Err(e) => {
                    warn!(error = %e, "bearer credential rejected");
                    return Some(auth_required(salvaged_id));
                }
            },
            None => {
                debug!("request without bearer credential");
                return Some(auth_required(salvaged_id));
            }
        };

        // Authenticated → Tier-Checked. Resolved freshly per request;
        // subscription state is externally mutable.
        let tier = self.tiers.resolve(&user_id).await;

        // Tier-Checked → Method-Routed.
        let request: JsonRpcRequest = match serde_json::from_str(body) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "invalid JSON-RPC request");
                return Some(JsonRpcResponse::error(
                    salvaged_id,
                    codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        self.route(&user_id, tier, request).await
    }

    async fn route(
        &self,
        user_id: &str,
        tier: Tier,
        request: JsonRpcRequest,
    ) -> Option<JsonRpcResponse> {
        let id = request.id;

        match request.method.as_str() {
            "initialize" => {
                info!(user = %user_id, "client initializing");
                let result = InitializeResult {
                    protocol_version: PROTOCOL_VERSION.to_string(),
                    capabilities: ServerCapabilities {
                        tools: ToolCapability {},
                    },
                    server_info: ServerInfo {
                        name: "reelbrief".to_string(),
                        version: env!("CARGO_PKG_VERSION").to_string(),
                    },
                };
                Some(JsonRpcResponse::success(
                    id,
                    serde_json::to_value(result).unwrap(),
                ))
            }

            "notifications/initialized" => {
                info!(user = %user_id, "client initialized");
                None // Notifications don't get responses
            }

            "tools/list" => {
                debug!("listing tools");
                let result = ToolsListResult {
                    tools: tools::list_tools(),
                };
                Some(JsonRpcResponse::success(
                    id,
                    serde_json::to_value(result).unwrap(),
                ))
            }

            "tools/call" => {
                // The whole tool-invocation class shares one capability;
                // refusal happens before any content-store read.
                if !tier.grants(Capability::ToolInvocation) {
                    let required = required_tier(Capability::ToolInvocation);
                    info!(user = %user_id, tier = %tier, "tool invocation refused, upgrade required");
                    return Some(JsonRpcResponse::error_with_data(
                        id,
                        codes::UPGRADE_REQUIRED,
                        format!(
                            "Upgrade required: tool invocation needs the {} tier or higher",
                            required
                        ),
                        Some(
                            serde_json::to_value(UpgradeDetail {
                                current_tier: tier,
                                required_tier: required,
                            })
                            .unwrap(),
                        ),
                    ));
                }

                let params: ToolsCallParams = match serde_json::from_value(request.params) {
                    Ok(p) => p,
                    Err(e) => {
                        return Some(JsonRpcResponse::error(
                            id,
                            codes::INVALID_PARAMS,
                            format!("Invalid params: {}", e),
                        ));
                    }
                };

                debug!(tool = %params.name, user = %user_id, "calling tool");
                match tools::call_tool(&self.tools, user_id, &params.name, &params.arguments).await
                {
                    Ok(result) => Some(JsonRpcResponse::success(
                        id,
                        serde_json::to_value(result).unwrap(),
                    )),
                    Err(e) => Some(tool_failure(id, &params.name, e)),
                }
            }

            // Reserved for future extension; the collections are empty,
            // not absent.
            "resources/list" => Some(JsonRpcResponse::success(id, json!({ "resources": [] }))),
            "prompts/list" => Some(JsonRpcResponse::success(id, json!({ "prompts": [] }))),

            "ping" => Some(JsonRpcResponse::success(id, Value::Object(Default::default()))),

            _ => {
                warn!(method = %request.method, "unknown method");
                Some(JsonRpcResponse::error(
                    id,
                    codes::METHOD_NOT_FOUND,
                    format!("Method not found: {}", request.method),
                ))
            }
        }
    }
}

fn auth_required(id: Value) -> JsonRpcResponse {
    JsonRpcResponse::error(
        id,
        codes::AUTH_REQUIRED,
        "Authentication required".to_string(),
    )
}

/// Serialize a typed tool failure. Internal detail never reaches the
/// wire; it is logged here and replaced with a generic message.
fn tool_failure(id: Value, tool: &str, err: ToolError) -> JsonRpcResponse {
    match err {
        ToolError::UnknownTool(_) => {
            JsonRpcResponse::error(id, codes::METHOD_NOT_FOUND, err.to_string())
        }
        ToolError::MissingParam(_) | ToolError::ProjectNotFound => {
            JsonRpcResponse::error(id, codes::INVALID_PARAMS, err.to_string())
        }
        ToolError::Internal(e) => {
            error!(tool = %tool, error = %e, "tool handler failed");
            JsonRpcResponse::error(id, codes::INTERNAL_ERROR, "Internal error".to_string())
        }
    }
}
