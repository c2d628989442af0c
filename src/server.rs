//! MCP server handler exposing the dispatcher through `rmcp`.
//!
//! Tool results are always returned as a single text block. Failures are
//! reported in the text itself and never as protocol errors.

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};

use crate::dispatcher::{Dispatcher, ToolCallRequest};
use crate::tools::ToolDefinition;

pub const SERVER_NAME: &str = "jaqpot-mcp-server";

const INSTRUCTIONS: &str = "Jaqpot MCP: use search_models to find models, get_model_summary to \
    see the features a model expects, then predict with a dataset of feature-name/value objects. \
    get_model_info returns the full model description.";

#[derive(Debug, Clone)]
pub struct JaqpotServer {
    dispatcher: Arc<Dispatcher>,
}

impl JaqpotServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

/// Convert a tool definition into its MCP description.
pub fn mcp_tool(definition: &ToolDefinition) -> Tool {
    Tool::new(
        definition.name,
        definition.description,
        definition.input_schema(),
    )
}

impl ServerHandler for JaqpotServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let tools = self.dispatcher.registry().list().map(mcp_tool).collect();
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let request = ToolCallRequest::from((request.name.into_owned(), request.arguments));
        let text = self.dispatcher.dispatch(request).await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}
