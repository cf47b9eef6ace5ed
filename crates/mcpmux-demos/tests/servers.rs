//! Each example server driven by a real client over a memory transport.

use mcpmux_client::{Client, ClientBuilder, ClientHandler, ElicitationHandler, SamplingHandler};
use mcpmux_core::error::McpError;
use mcpmux_core::types::{
    CompletionRef, CreateMessageRequest, CreateMessageResult, ElicitRequest, ElicitResult,
    LoggingLevel, LoggingMessageNotification, Role,
};
use mcpmux_transport::MemoryTransport;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

async fn connect<H: ClientHandler + 'static>(name: &str, builder: ClientBuilder, handler: H) -> Client {
    let server = mcpmux_demos::server(name).expect("known example");
    let (client_end, server_end) = MemoryTransport::pair();
    server.serve(server_end).await.expect("serve");
    timeout(TEST_TIMEOUT, builder.build_with_handler(client_end, handler))
        .await
        .expect("handshake timed out")
        .expect("client")
}

/// Records the server notifications a test cares about.
#[derive(Clone, Default)]
struct Collector {
    logs: Arc<Mutex<Vec<LoggingMessageNotification>>>,
    resource_changes: Arc<Mutex<usize>>,
}

impl ClientHandler for Collector {
    async fn on_log_message(&self, log: LoggingMessageNotification) {
        self.logs.lock().unwrap().push(log);
    }

    async fn on_resources_list_changed(&self) {
        *self.resource_changes.lock().unwrap() += 1;
    }
}

async fn settle(cond: impl Fn() -> bool) {
    timeout(TEST_TIMEOUT, async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition never held");
}

// =============================================================================
// Tools, resources, prompts
// =============================================================================

#[tokio::test]
async fn test_basic_tools() -> Result<(), Box<dyn std::error::Error>> {
    let client = connect("basic_tool", ClientBuilder::new(), mcpmux_client::NoOpHandler).await;
    assert_eq!(client.server_info().name, "Tool Example");
    assert!(client.server_capabilities().has_tools());

    let result = client.call_tool("sum", json!({"a": 5, "b": 3})).await?;
    assert_eq!(result.content.len(), 1);
    assert_eq!(result.first_text(), Some("8"));

    let weather = client.call_tool("get_weather", json!({"city": "London"})).await?;
    assert_eq!(weather.content.len(), 1);
    assert!(weather.first_text().unwrap().contains("Weather in London: 22degreesC"));

    let bad = client.call_tool("sum", json!({"a": "five"})).await?;
    assert!(bad.is_error());
    Ok(())
}

#[tokio::test]
async fn test_basic_resources() -> Result<(), Box<dyn std::error::Error>> {
    let client = connect("basic_resource", ClientBuilder::new(), mcpmux_client::NoOpHandler).await;
    assert_eq!(client.server_info().name, "Resource Example");
    assert!(client.server_capabilities().has_resources());

    let doc = client.read_resource("file://documents/readme").await?;
    assert_eq!(doc.len(), 1);
    assert!(doc[0].as_text().unwrap().contains("Content of readme"));

    let settings = client.read_resource("config://settings").await?;
    assert_eq!(settings.len(), 1);
    let settings: Value = serde_json::from_str(settings[0].as_text().unwrap())?;
    assert_eq!(settings["theme"], "dark");
    assert_eq!(settings["language"], "en");
    Ok(())
}

#[tokio::test]
async fn test_basic_prompts() -> Result<(), Box<dyn std::error::Error>> {
    let client = connect("basic_prompt", ClientBuilder::new(), mcpmux_client::NoOpHandler).await;
    assert_eq!(client.server_info().name, "Prompt Example");
    assert!(client.server_capabilities().has_prompts());

    let prompts = client.list_prompts().await?;
    assert!(prompts.iter().any(|p| p.name == "review_code"));

    let code = HashMap::from([("code".to_string(), "def hello():\n    print('Hello')".to_string())]);
    let review = client.get_prompt("review_code", code).await?;
    assert_eq!(review.messages.len(), 1);
    let text = review.messages[0].content.as_text().unwrap();
    assert!(text.contains("Please review this code:"));
    assert!(text.contains("def hello():"));

    let error = HashMap::from([(
        "error".to_string(),
        "TypeError: 'NoneType' object is not subscriptable".to_string(),
    )]);
    let debug = client.get_prompt("debug_error", error).await?;
    let roles: Vec<_> = debug.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::User, Role::Assistant]);
    assert!(debug.messages[0].content.as_text().unwrap().contains("I'm seeing this error:"));
    assert!(debug.messages[1].content.as_text().unwrap().contains("TypeError"));
    assert!(debug.messages[2].content.as_text().unwrap().contains("I'll help debug that"));
    Ok(())
}

// =============================================================================
// Progress, sampling, elicitation
// =============================================================================

#[tokio::test]
async fn test_tool_progress() -> Result<(), Box<dyn std::error::Error>> {
    let collector = Collector::default();
    let client = connect("tool_progress", ClientBuilder::new(), collector.clone()).await;
    assert_eq!(client.server_info().name, "Progress Example");

    let updates = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);
    let steps = 3;
    let result = client
        .call_tool_with_progress(
            "long_running_task",
            json!({"task_name": "Test Task", "steps": steps}),
            move |p| {
                sink.lock().unwrap().push((p.progress, p.total, p.message.clone()));
            },
        )
        .await?;
    assert!(result.first_text().unwrap().contains("Task 'Test Task' completed"));

    let updates = updates.lock().unwrap().clone();
    assert_eq!(updates.len(), steps);
    for (i, (progress, total, message)) in updates.iter().enumerate() {
        let expected = (i + 1) as f64 / steps as f64;
        assert!((progress - expected).abs() < 0.01, "step {i}: {progress}");
        assert_eq!(*total, Some(1.0));
        let message = message.as_deref().unwrap_or_default();
        assert!(message.contains(&format!("Step {}/{steps}", i + 1)), "{message}");
    }

    settle(|| !collector.logs.lock().unwrap().is_empty()).await;
    Ok(())
}

#[tokio::test]
async fn test_sampling() -> Result<(), Box<dyn std::error::Error>> {
    let handler = SamplingHandler::new(|_: CreateMessageRequest| async {
        Ok(CreateMessageResult::assistant_text(
            "This is a simulated LLM response for testing",
            "test-model",
        ))
    });
    let client = connect("sampling", ClientBuilder::new().with_sampling(), handler).await;
    assert_eq!(client.server_info().name, "Sampling Example");
    assert!(client.server_capabilities().has_tools());

    let result = timeout(TEST_TIMEOUT, client.call_tool("generate_poem", json!({"topic": "nature"})))
        .await??;
    assert_eq!(result.content.len(), 1);
    assert!(result.first_text().unwrap().contains("This is a simulated LLM response"));
    Ok(())
}

#[tokio::test]
async fn test_sampling_without_client_support() -> Result<(), Box<dyn std::error::Error>> {
    let client = connect("sampling", ClientBuilder::new(), mcpmux_client::NoOpHandler).await;
    let result = client.call_tool("generate_poem", json!({"topic": "nature"})).await?;
    assert!(result.is_error());
    Ok(())
}

fn booking_handler(request: ElicitRequest) -> Result<ElicitResult, McpError> {
    if request.message.contains("No tables available") {
        Ok(ElicitResult::accept(
            json!({"checkAlternative": true, "alternativeDate": "2024-12-26"}),
        ))
    } else {
        Ok(ElicitResult::decline())
    }
}

#[tokio::test]
async fn test_elicitation() -> Result<(), Box<dyn std::error::Error>> {
    let handler = ElicitationHandler::new(|request: ElicitRequest| async move { booking_handler(request) });
    let client = connect("elicitation", ClientBuilder::new().with_elicitation(), handler).await;
    assert_eq!(client.server_info().name, "Elicitation Example");

    let full = timeout(
        TEST_TIMEOUT,
        client.call_tool(
            "book_table",
            json!({"date": "2024-12-25", "time": "19:00", "party_size": 4}),
        ),
    )
    .await??;
    assert_eq!(full.content.len(), 1);
    assert!(full.first_text().unwrap().contains("[SUCCESS] Booked for 2024-12-26"));

    let free = client
        .call_tool(
            "book_table",
            json!({"date": "2024-12-20", "time": "20:00", "party_size": 2}),
        )
        .await?;
    assert!(free.first_text().unwrap().contains("[SUCCESS] Booked for 2024-12-20 at 20:00"));
    Ok(())
}

#[tokio::test]
async fn test_elicitation_declined() -> Result<(), Box<dyn std::error::Error>> {
    let handler = ElicitationHandler::new(|_: ElicitRequest| async { Ok(ElicitResult::decline()) });
    let client = connect("elicitation", ClientBuilder::new().with_elicitation(), handler).await;

    let result = client
        .call_tool(
            "book_table",
            json!({"date": "2024-12-25", "time": "19:00", "party_size": 4}),
        )
        .await?;
    assert_eq!(result.first_text(), Some("[CANCELLED] Booking cancelled"));
    Ok(())
}

// =============================================================================
// Notifications and completion
// =============================================================================

#[tokio::test]
async fn test_notifications() -> Result<(), Box<dyn std::error::Error>> {
    let collector = Collector::default();
    let client = connect("notifications", ClientBuilder::new(), collector.clone()).await;
    assert_eq!(client.server_info().name, "Notifications Example");

    let result = client.call_tool("process_data", json!({"data": "test_data"})).await?;
    assert_eq!(result.content.len(), 1);
    assert!(result.first_text().unwrap().contains("Processed: test_data"));

    settle(|| *collector.resource_changes.lock().unwrap() > 0).await;
    let levels: BTreeSet<_> = collector.logs.lock().unwrap().iter().map(|l| l.level).collect();
    assert_eq!(
        levels,
        BTreeSet::from([
            LoggingLevel::Debug,
            LoggingLevel::Info,
            LoggingLevel::Warning,
            LoggingLevel::Error,
        ])
    );
    Ok(())
}

#[tokio::test]
async fn test_notifications_respect_log_level() -> Result<(), Box<dyn std::error::Error>> {
    let collector = Collector::default();
    let client = connect("notifications", ClientBuilder::new(), collector.clone()).await;

    client.set_logging_level(LoggingLevel::Warning).await?;
    client.call_tool("process_data", json!({"data": "quiet"})).await?;

    settle(|| *collector.resource_changes.lock().unwrap() > 0).await;
    let levels: Vec<_> = collector.logs.lock().unwrap().iter().map(|l| l.level).collect();
    assert_eq!(levels, vec![LoggingLevel::Warning, LoggingLevel::Error]);
    Ok(())
}

#[tokio::test]
async fn test_completion() -> Result<(), Box<dyn std::error::Error>> {
    let client = connect("completion", ClientBuilder::new(), mcpmux_client::NoOpHandler).await;
    assert_eq!(client.server_info().name, "Example");
    assert!(client.server_capabilities().has_resources());
    assert!(client.server_capabilities().has_prompts());

    let owner = HashMap::from([("owner".to_string(), "modelcontextprotocol".to_string())]);
    let repos = client
        .complete_with_context(
            CompletionRef::resource("github://repos/{owner}/{repo}"),
            "repo",
            "",
            owner,
        )
        .await?;
    assert_eq!(repos.values, vec!["python-sdk", "typescript-sdk", "specification"]);

    let languages = client
        .complete(CompletionRef::prompt("review_code"), "language", "py")
        .await?;
    assert!(languages.values.contains(&"python".to_string()));
    assert!(languages.values.iter().all(|lang| lang.starts_with("py")));

    let repo = client
        .read_resource("github://repos/modelcontextprotocol/python-sdk")
        .await?;
    assert_eq!(repo[0].as_text(), Some("Repository: modelcontextprotocol/python-sdk"));
    Ok(())
}
