//! Serving tools, resources, prompts and completions over a session.

use mcpmux_core::capability::{ClientCapabilities, ClientInfo};
use mcpmux_core::error::{McpError, INVALID_PARAMS, METHOD_NOT_FOUND, RESOURCE_NOT_FOUND};
use mcpmux_core::types::{
    CallToolResult, Completion, CompletionRef, CreateMessageRequest, CreateMessageResult,
    GetPromptResult, ListToolsResult, LoggingLevel, LoggingMessageNotification, Prompt,
    PromptMessage, ReadResourceResult, Resource, ResourceContents, ResourceTemplate, Tool,
};
use mcpmux_server::{Server, ServerBuilder};
use mcpmux_session::{Session, SessionBuilder};
use mcpmux_transport::MemoryTransport;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(serde::Deserialize, schemars::JsonSchema)]
#[allow(dead_code)]
struct SumArgs {
    a: i64,
    b: i64,
}

fn demo_server() -> Server {
    ServerBuilder::new("demo", "1.0.0")
        .instructions("A demo server.")
        .tool(
            Tool::new("sum").description("Add two numbers").schema_for::<SumArgs>(),
            |args, _| async move {
                let a = args["a"].as_i64().ok_or_else(|| McpError::invalid_params("sum", "a"))?;
                let b = args["b"].as_i64().ok_or_else(|| McpError::invalid_params("sum", "b"))?;
                Ok(CallToolResult::text((a + b).to_string()))
            },
        )
        .tool(Tool::new("fail"), |_, _| async {
            Err(McpError::internal("the tool broke"))
        })
        .tool(Tool::new("chatty"), |_, ctx| async move {
            ctx.debug("debug detail").await?;
            ctx.warning("something odd").await?;
            Ok(CallToolResult::text("done"))
        })
        .tool(Tool::new("ask_model"), |_, ctx| async move {
            let reply = ctx
                .create_message(CreateMessageRequest::simple("Write a haiku", 50))
                .await?;
            Ok(CallToolResult::text(reply.as_text().unwrap_or_default()))
        })
        .resource(Resource::new("config://settings", "settings"), |req, _| async move {
            Ok(ResourceContents::text(req.uri, r#"{"theme": "dark"}"#))
        })
        .resource_template(
            ResourceTemplate::new("file://documents/{name}", "document"),
            |req, _| async move {
                let name = req.variable("name").unwrap_or_default().to_string();
                Ok(ResourceContents::text(req.uri, format!("Content of {name}")))
            },
        )
        .prompt(
            Prompt::new("review_code").required_arg("code"),
            |args, _| async move {
                let code = args.get("code").cloned().unwrap_or_default();
                Ok(GetPromptResult::messages(vec![PromptMessage::user(format!(
                    "Please review this code:\n\n{code}"
                ))]))
            },
        )
        .completion(|req, _| async move {
            let values = match &req.reference {
                CompletionRef::Prompt { name } if name == "review_code" => {
                    vec!["python".to_string(), "rust".to_string()]
                }
                _ => Vec::new(),
            };
            let prefix = req.argument.value.clone();
            Ok(Completion::from_values(
                values.into_iter().filter(|v| v.starts_with(&prefix)).collect(),
            ))
        })
        .build()
}

async fn connect(server: &Server, client: SessionBuilder) -> (Session, Session) {
    let (client_end, server_end) = MemoryTransport::pair();
    let served = server.serve(server_end).await.expect("serve");
    let client = timeout(TEST_TIMEOUT, client.connect(client_end))
        .await
        .expect("handshake timed out")
        .expect("client session");
    (client, served)
}

fn plain_client() -> SessionBuilder {
    SessionBuilder::client(ClientInfo::new("test", "1.0.0"), ClientCapabilities::new())
}

// =============================================================================
// Tools
// =============================================================================

#[tokio::test]
async fn test_tools_are_listed_in_registration_order() -> Result<(), Box<dyn std::error::Error>> {
    let (client, _) = connect(&demo_server(), plain_client()).await;

    let negotiated = client.negotiated().unwrap();
    assert_eq!(negotiated.server_info().name, "demo");
    assert_eq!(negotiated.result.instructions.as_deref(), Some("A demo server."));

    let listed: ListToolsResult = client.call_typed("tools/list", None).await?;
    let names: Vec<_> = listed.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["sum", "fail", "chatty", "ask_model"]);
    assert_eq!(listed.tools[0].input_schema["properties"]["a"]["type"], "integer");
    Ok(())
}

#[tokio::test]
async fn test_list_ignores_cursor_and_returns_one_page() -> Result<(), Box<dyn std::error::Error>> {
    let (client, _) = connect(&demo_server(), plain_client()).await;

    let listed = timeout(
        TEST_TIMEOUT,
        client.call("tools/list", Some(json!({"cursor": "page-2"}))),
    )
    .await??;
    assert_eq!(listed["tools"].as_array().map(Vec::len), Some(4));
    assert!(listed.get("nextCursor").is_none());
    Ok(())
}

#[tokio::test]
async fn test_tool_call_and_tool_errors() -> Result<(), Box<dyn std::error::Error>> {
    let (client, _) = connect(&demo_server(), plain_client()).await;

    let result: CallToolResult = client
        .call_typed("tools/call", Some(json!({"name": "sum", "arguments": {"a": 5, "b": 3}})))
        .await?;
    assert_eq!(result.first_text(), Some("8"));
    assert!(!result.is_error());

    let failed: CallToolResult = client
        .call_typed("tools/call", Some(json!({"name": "fail"})))
        .await?;
    assert!(failed.is_error());
    assert!(failed.first_text().unwrap().contains("the tool broke"));

    let err = client
        .call("tools/call", Some(json!({"name": "missing"})))
        .await
        .unwrap_err();
    assert_eq!(err.code(), INVALID_PARAMS);

    let err = client.call("tools/call", None).await.unwrap_err();
    assert_eq!(err.code(), INVALID_PARAMS);
    Ok(())
}

// =============================================================================
// Resources and prompts
// =============================================================================

#[tokio::test]
async fn test_resources_and_templates() -> Result<(), Box<dyn std::error::Error>> {
    let (client, _) = connect(&demo_server(), plain_client()).await;

    let listed = client.call("resources/list", None).await?;
    assert_eq!(listed["resources"][0]["uri"], "config://settings");
    let templates = client.call("resources/templates/list", None).await?;
    assert_eq!(
        templates["resourceTemplates"][0]["uriTemplate"],
        "file://documents/{name}"
    );

    let read: ReadResourceResult = client
        .call_typed("resources/read", Some(json!({"uri": "file://documents/report.txt"})))
        .await?;
    assert_eq!(read.contents[0].as_text(), Some("Content of report.txt"));

    let err = client
        .call("resources/read", Some(json!({"uri": "file://nowhere"})))
        .await
        .unwrap_err();
    assert_eq!(err.code(), RESOURCE_NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_prompt_rendering_checks_arguments() -> Result<(), Box<dyn std::error::Error>> {
    let (client, _) = connect(&demo_server(), plain_client()).await;

    let rendered: GetPromptResult = client
        .call_typed(
            "prompts/get",
            Some(json!({"name": "review_code", "arguments": {"code": "fn main() {}"}})),
        )
        .await?;
    assert_eq!(
        rendered.messages[0].content.as_text(),
        Some("Please review this code:\n\nfn main() {}")
    );

    let err = client
        .call("prompts/get", Some(json!({"name": "review_code"})))
        .await
        .unwrap_err();
    assert_eq!(err.code(), INVALID_PARAMS);
    assert!(err.to_string().contains("code"), "{err}");
    Ok(())
}

#[tokio::test]
async fn test_completion() -> Result<(), Box<dyn std::error::Error>> {
    let (client, _) = connect(&demo_server(), plain_client()).await;

    let result = client
        .call(
            "completion/complete",
            Some(json!({
                "ref": {"type": "ref/prompt", "name": "review_code"},
                "argument": {"name": "language", "value": "py"}
            })),
        )
        .await?;
    assert_eq!(result["completion"]["values"], json!(["python"]));

    // no completion provider means no route
    let bare = ServerBuilder::new("bare", "1.0.0").build();
    let (client, _) = connect(&bare, plain_client()).await;
    let err = client
        .call(
            "completion/complete",
            Some(json!({
                "ref": {"type": "ref/prompt", "name": "x"},
                "argument": {"name": "y", "value": ""}
            })),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), METHOD_NOT_FOUND);
    Ok(())
}

// =============================================================================
// Logging and server-initiated requests
// =============================================================================

#[tokio::test]
async fn test_log_level_suppresses_lower_levels() -> Result<(), Box<dyn std::error::Error>> {
    let seen: Arc<Mutex<Vec<(LoggingLevel, Value)>>> = Arc::default();
    let sink = seen.clone();
    let client = plain_client().on_notification("notifications/message", move |n| {
        let log: LoggingMessageNotification = n.params_as().unwrap();
        sink.lock().unwrap().push((log.level, log.data));
    });
    let (client, _) = connect(&demo_server(), client).await;

    client.call("tools/call", Some(json!({"name": "chatty"}))).await?;
    assert_eq!(seen.lock().unwrap().len(), 2);

    seen.lock().unwrap().clear();
    client
        .call("logging/setLevel", Some(json!({"level": "warning"})))
        .await?;
    client.call("tools/call", Some(json!({"name": "chatty"}))).await?;
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(LoggingLevel::Warning, json!("something odd"))]
    );
    Ok(())
}

#[tokio::test]
async fn test_sampling_needs_client_capability() -> Result<(), Box<dyn std::error::Error>> {
    let (client, _) = connect(&demo_server(), plain_client()).await;
    let result: CallToolResult = client
        .call_typed("tools/call", Some(json!({"name": "ask_model"})))
        .await?;
    assert!(result.is_error());
    assert!(result.first_text().unwrap().contains("sampling"));
    Ok(())
}

#[tokio::test]
async fn test_sampling_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let client = SessionBuilder::client(
        ClientInfo::new("sampler", "1.0.0"),
        ClientCapabilities::new().with_sampling(),
    )
    .serve_callback("sampling/createMessage", |_, params| async move {
        let request: CreateMessageRequest = serde_json::from_value(params.unwrap_or_default())?;
        let prompt = request.last_user_text().unwrap_or_default().to_string();
        let reply = CreateMessageResult::assistant_text(format!("echo: {prompt}"), "test-model");
        Ok(serde_json::to_value(reply)?)
    });
    let (client, _) = connect(&demo_server(), client).await;

    let result: CallToolResult = timeout(
        TEST_TIMEOUT,
        client.call_typed("tools/call", Some(json!({"name": "ask_model"}))),
    )
    .await??;
    assert_eq!(result.first_text(), Some("echo: Write a haiku"));
    Ok(())
}
