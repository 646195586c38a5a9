use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::*,
    schemars,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::catalogue::{Catalogue, FeaturedRow};
use crate::media::MediaType;
use crate::search::SearchSession;

const FEATURED_URI_PREFIX: &str = "catalogue://featured/";

// Tool request/response types
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchMediaRequest {
    #[schemars(description = "Title text to search for")]
    pub query: String,
    #[serde(rename = "type")]
    #[schemars(description = "Optional content type filter: movie, series or episode")]
    pub media_type: Option<String>,
    #[schemars(description = "Page number, starting at 1 (default: 1)")]
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetMediaRequest {
    #[schemars(description = "IMDb identifier of the title, e.g. tt0468569")]
    pub id: String,
}

/// Missing, empty and "all" mean no filter
fn parse_filter(value: Option<&str>) -> Result<Option<MediaType>, String> {
    match value.map(str::trim) {
        None => Ok(None),
        Some(value) if value.is_empty() || value.eq_ignore_ascii_case("all") => Ok(None),
        Some(value) => value.parse::<MediaType>().map(Some),
    }
}

#[derive(Debug, Clone)]
pub struct CatalogueServer {
    pub catalogue: Arc<Catalogue>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl CatalogueServer {
    pub fn new(catalogue: Arc<Catalogue>) -> Self {
        Self {
            catalogue,
            tool_router: Self::tool_router(),
        }
    }

    fn create_resource(&self, uri: &str, name: &str, description: &str) -> Resource {
        let mut resource = RawResource::new(uri, name.to_string());
        resource.description = Some(description.to_string());
        resource.mime_type = Some("application/json".to_string());
        resource.no_annotation()
    }

    #[tool(description = "Search movies, series and episodes by title, one page of 10 results at a time")]
    async fn search_media(
        &self,
        Parameters(req): Parameters<SearchMediaRequest>,
    ) -> Result<CallToolResult, McpError> {
        let filter = match parse_filter(req.media_type.as_deref()) {
            Ok(filter) => filter,
            Err(e) => return Ok(CallToolResult::error(vec![Content::text(e)])),
        };

        let mut session = SearchSession::new(self.catalogue.search_engine().clone(), req.query);
        session.set_filter(filter);
        session.go_to_page(req.page.unwrap_or(1).max(1));

        let view = session.refresh().await;
        if session.failed() {
            return Ok(CallToolResult::error(vec![Content::text(format!(
                "Error searching for \"{}\": the lookup service is unavailable",
                session.query().text
            ))]));
        }

        let content = serde_json::to_string_pretty(&view)
            .unwrap_or_else(|e| format!("Error serializing results: {e}"));
        Ok(CallToolResult::success(vec![Content::text(content)]))
    }

    #[tool(description = "Get full details of a title and related titles")]
    async fn get_media(
        &self,
        Parameters(req): Parameters<GetMediaRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self.catalogue.media_detail(&req.id).await {
            Ok(view) => {
                let content = serde_json::to_string_pretty(&view)
                    .unwrap_or_else(|e| format!("Error serializing media: {e}"));
                Ok(CallToolResult::success(vec![Content::text(content)]))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Error fetching media {}: {e}",
                req.id
            ))])),
        }
    }

    #[tool(description = "Get the featured movies, series and episodes rows")]
    async fn get_featured(&self) -> Result<CallToolResult, McpError> {
        let rows = self.catalogue.home().await;
        let content = serde_json::to_string_pretty(&json!({ "rows": rows }))
            .unwrap_or_else(|e| format!("Error serializing rows: {e}"));
        Ok(CallToolResult::success(vec![Content::text(content)]))
    }
}

#[tool_handler]
impl ServerHandler for CatalogueServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "media-catalogue".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some("Media catalogue server provides movie, series and episode metadata. You can search titles page by page, filter by content type, open a title's details and browse featured rows.".to_string()),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources = FeaturedRow::ALL
            .iter()
            .map(|row| {
                self.create_resource(
                    &format!("{FEATURED_URI_PREFIX}{}", row.slug()),
                    row.title(),
                    &format!("{} on the catalogue home page", row.title()),
                )
            })
            .collect();

        Ok(ListResourcesResult {
            resources,
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        self.read_featured(uri).await
    }
}

impl CatalogueServer {
    /// Contents of a `catalogue://featured/<row>` resource
    async fn read_featured(&self, uri: String) -> Result<ReadResourceResult, McpError> {
        let Some(row) = uri
            .strip_prefix(FEATURED_URI_PREFIX)
            .and_then(FeaturedRow::from_slug)
        else {
            return Err(McpError::resource_not_found(
                format!("Unknown resource: {uri}"),
                Some(json!({ "uri": uri })),
            ));
        };

        match self.catalogue.content_row(row).await {
            Ok(content_row) => {
                let content = serde_json::to_string_pretty(&content_row)
                    .map_err(|e| McpError::internal_error(e.to_string(), None))?;

                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(content, uri)],
                })
            }
            Err(e) => Err(McpError::internal_error(
                format!("Failed to load {}: {e}", row.title()),
                Some(json!({ "uri": uri })),
            )),
        }
    }
}
