//! Drives the `jaqpot-mcp` server as a child process over stdio.
//!
//! `JAQPOT_API_KEY` and `JAQPOT_API_SECRET` must be set; they are inherited by
//! the server process. `JAQPOT_MCP_BIN` overrides the server executable
//! (default: `jaqpot-mcp` on the `PATH`).

use jaqpot_mcp::rmcp::model::{CallToolRequestParam, RawContent};
use jaqpot_mcp::rmcp::transport::TokioChildProcess;
use jaqpot_mcp::rmcp::ServiceExt;
use serde_json::{json, Value};
use tokio::process::Command;

fn request(name: &'static str, args: Value) -> CallToolRequestParam {
    CallToolRequestParam {
        name: name.into(),
        arguments: args.as_object().cloned(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bin = std::env::var("JAQPOT_MCP_BIN").unwrap_or_else(|_| "jaqpot-mcp".to_string());
    let client = ().serve(TokioChildProcess::new(Command::new(bin))?).await?;

    let tools = client.list_tools(None).await?;
    println!("Available tools:");
    for tool in &tools.tools {
        println!("- {}: {}", tool.name, tool.description.as_deref().unwrap_or(""));
    }

    let calls = [
        ("get_model_info", json!({"model_id": 1})),
        ("get_model_summary", json!({"model_id": 1})),
        ("search_models", json!({"query": "solubility", "page": 0, "size": 5})),
        (
            "predict",
            json!({
                "model_id": 1,
                "dataset": [{"feature1": 1.0, "feature2": 2.0, "feature3": 3.0}]
            }),
        ),
    ];

    for (name, args) in calls {
        println!("\n=== {} {} ===", name, args);
        let result = client.call_tool(request(name, args)).await?;
        for content in result.content {
            if let RawContent::Text(text) = content.raw {
                println!("{}", text.text);
            }
        }
    }

    client.cancel().await?;
    Ok(())
}
