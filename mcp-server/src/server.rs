//! MedShare MCP Server implementation
//!
//! Exposes the moderation queue, the public catalogue and engagement actions
//! as tools. Every call is made as the user whose API key is configured.

use crate::client::{
    ApiError, BrowseQuery, EngageMetadata, EngageRequest, MedShareClient, ReviewQueueQuery,
    ReviewRequest,
};
use anyhow::Result;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{
    handler::server::tool::ToolRouter,
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::Deserialize;

/// Provenance tag attached to downloads made through this server
const DOWNLOAD_SOURCE: &str = "mcp";

/// MedShare MCP Server
#[derive(Clone)]
pub struct MedShareServer {
    client: MedShareClient,
    tool_router: ToolRouter<Self>,
}

impl MedShareServer {
    pub fn from_env() -> Result<Self> {
        let client = MedShareClient::from_env()?;
        Ok(Self::new(client))
    }

    pub fn new(client: MedShareClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }
}

fn into_tool_result(result: Result<String, ApiError>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(content) => Ok(CallToolResult::success(vec![Content::text(content)])),
        Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
    }
}

// --- Tool Parameter Types ---

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ReviewQueueParams {
    /// Status filter: "all", "verification", "published", or "rejected"
    #[serde(default)]
    pub filter: Option<String>,
    /// Sort order: "newest", "oldest", or "category"
    #[serde(default)]
    pub sort_by: Option<String>,
    /// 1-based page number
    #[serde(default)]
    pub page: Option<u64>,
    /// Page size (max 100)
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ApproveParams {
    /// UUID of the model
    pub model_id: String,
    /// Internal note visible to moderators only
    #[serde(default)]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RejectParams {
    /// UUID of the model
    pub model_id: String,
    /// Reason shown to the author; must not be blank
    pub reason: String,
    /// Internal note visible to moderators only
    #[serde(default)]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ModelIdParams {
    /// UUID of the model
    pub model_id: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct BrowseParams {
    /// Exact category name, e.g. "Cardiology"
    #[serde(default)]
    pub category: Option<String>,
    /// Case-insensitive text matched against title and description
    #[serde(default)]
    pub query: Option<String>,
    /// Include models flagged as NSFW
    #[serde(default)]
    pub include_nsfw: Option<bool>,
    /// 1-based page number
    #[serde(default)]
    pub page: Option<u64>,
    /// Page size (max 100)
    #[serde(default)]
    pub limit: Option<u64>,
}

impl From<ReviewQueueParams> for ReviewQueueQuery {
    fn from(params: ReviewQueueParams) -> Self {
        Self {
            filter: params.filter,
            sort_by: params.sort_by,
            page: params.page,
            limit: params.limit,
        }
    }
}

impl From<BrowseParams> for BrowseQuery {
    fn from(params: BrowseParams) -> Self {
        Self {
            category: params.category,
            q: params.query,
            include_nsfw: params.include_nsfw,
            page: params.page,
            limit: params.limit,
        }
    }
}

#[tool_router]
impl MedShareServer {
    // === Moderation ===

    #[tool(
        description = "List submitted models for review with per-status counts. Requires a moderator key."
    )]
    async fn review_queue(
        &self,
        params: Parameters<ReviewQueueParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = ReviewQueueQuery::from(params.0);
        into_tool_result(self.client.review_queue(&query).await)
    }

    #[tool(description = "Count models pending, approved and rejected. Requires a moderator key.")]
    async fn review_stats(&self) -> Result<CallToolResult, McpError> {
        into_tool_result(self.client.review_stats().await)
    }

    #[tool(description = "Approve a model so it becomes visible to everyone it is shared with.")]
    async fn approve(&self, params: Parameters<ApproveParams>) -> Result<CallToolResult, McpError> {
        let request = ReviewRequest {
            action: "approve",
            rejection_reason: None,
            admin_notes: params.0.admin_notes,
        };
        into_tool_result(self.client.review(&params.0.model_id, &request).await)
    }

    #[tool(description = "Reject a model with a reason the author will see. The author can fix and resubmit.")]
    async fn reject(&self, params: Parameters<RejectParams>) -> Result<CallToolResult, McpError> {
        let request = ReviewRequest {
            action: "reject",
            rejection_reason: Some(params.0.reason),
            admin_notes: params.0.admin_notes,
        };
        into_tool_result(self.client.review(&params.0.model_id, &request).await)
    }

    // === Catalogue ===

    #[tool(description = "Show a model with its counters and what you are allowed to do with it.")]
    async fn view_model(
        &self,
        params: Parameters<ModelIdParams>,
    ) -> Result<CallToolResult, McpError> {
        into_tool_result(self.client.view_model(&params.0.model_id).await)
    }

    #[tool(description = "Browse published public models, newest first.")]
    async fn browse(&self, params: Parameters<BrowseParams>) -> Result<CallToolResult, McpError> {
        let query = BrowseQuery::from(params.0);
        into_tool_result(self.client.browse(&query).await)
    }

    // === Engagement ===

    #[tool(description = "Like a published model. Liking twice is rejected.")]
    async fn like(&self, params: Parameters<ModelIdParams>) -> Result<CallToolResult, McpError> {
        let request = EngageRequest {
            action: "like",
            metadata: None,
        };
        into_tool_result(self.client.engage(&params.0.model_id, &request).await)
    }

    #[tool(description = "Remove your like from a model.")]
    async fn unlike(&self, params: Parameters<ModelIdParams>) -> Result<CallToolResult, McpError> {
        let request = EngageRequest {
            action: "unlike",
            metadata: None,
        };
        into_tool_result(self.client.engage(&params.0.model_id, &request).await)
    }

    #[tool(
        description = "Download a published model. Repeat downloads within five minutes are not counted again."
    )]
    async fn download(&self, params: Parameters<ModelIdParams>) -> Result<CallToolResult, McpError> {
        let request = EngageRequest {
            action: "download",
            metadata: Some(EngageMetadata {
                source: DOWNLOAD_SOURCE.to_string(),
            }),
        };
        into_tool_result(self.client.engage(&params.0.model_id, &request).await)
    }
}

#[tool_handler]
impl ServerHandler for MedShareServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "medshare".into(),
                title: Some("MedShare MCP Server".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                r#"MedShare - Medical 3D Model Library

SETUP: Set MEDSHARE_API_KEY to a key from POST /users/register.

MODERATORS:
1. 'review_stats' - How many models are waiting
2. 'review_queue' - Page through submissions (filter: verification)
3. 'view_model' - Inspect a submission
4. 'approve' or 'reject' - Rejections need a reason the author can act on

EVERYONE:
- 'browse' - Published public models, optionally by category or text
- 'view_model' - Full details and your permissions
- 'like' / 'unlike' - Only on published public models you did not author
- 'download' - Counted at most once per five minutes per user"#
                    .into(),
            ),
        }
    }
}
