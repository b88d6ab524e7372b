//! Statecraft CLI binary entry point.

use std::sync::Arc;

use clap::Parser;
use futures::StreamExt;
use tracing_subscriber::EnvFilter;

use statecraft::agent::Agent;
use statecraft::cli::{demos, Cli, Commands, ModelArgs, SessionArgs, ToolArgs};
use statecraft::config::{load_state_file, StatecraftConfig};
use statecraft::runner::{RunConfig, Runner};
use statecraft::session::{Event, InMemorySessionService, SessionService, State};
use statecraft::tools::{ToolArguments, ToolExecutionContext};
use statecraft::types::{Content, FunctionResponse};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Session(args) => handle_session(args).await,
        Commands::Tool(args) => handle_tool(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn handle_session(args: SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let initial_state = match &args.state_file {
        Some(path) => load_state_file(path)?,
        None => demos::default_state(),
    };

    let sessions = Arc::new(InMemorySessionService::new());
    let session = sessions
        .create_session(
            demos::APP_NAME,
            demos::USER_ID,
            args.session_id.as_deref(),
            initial_state,
        )
        .await?;

    println!("CREATED NEW SESSION:");
    println!("\tSession ID: {}", session.id);

    let agent = demos::question_answering_agent(&args.model.model);
    let runner = build_runner(agent, sessions.clone())?;
    run_turn(&runner, &session.id, &args.message, &args.model).await?;

    println!("==== Session Event Exploration ====");
    let session = sessions
        .get_session(demos::APP_NAME, demos::USER_ID, &session.id)
        .await?;
    println!("=== Final Session State ===");
    print_state(&session.state);

    Ok(())
}

async fn handle_tool(args: ToolArgs) -> Result<(), Box<dyn std::error::Error>> {
    let sessions = Arc::new(InMemorySessionService::new());
    let session = sessions
        .create_session(demos::APP_NAME, demos::USER_ID, None, State::new())
        .await?;

    let agent = demos::tool_agent(&args.model.model);
    let runner = build_runner(agent, sessions)?;
    run_turn(&runner, &session.id, &args.message, &args.model).await
}

fn build_runner(
    agent: Agent,
    sessions: Arc<InMemorySessionService>,
) -> Result<Runner, Box<dyn std::error::Error>> {
    let config = StatecraftConfig::from_env();
    Ok(Runner::from_config(agent, demos::APP_NAME, sessions, &config)?)
}

/// Tool round-trips allowed before a turn is abandoned.
const MAX_TOOL_ROUNDS: usize = 5;

/// Send `message`, answering any function calls locally until the model
/// produces a final response.
async fn run_turn(
    runner: &Runner,
    session_id: &str,
    message: &str,
    model: &ModelArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut next_message = Content::user(message);

    for _ in 0..MAX_TOOL_ROUNDS {
        let mut events = runner.run_with_config(
            demos::USER_ID,
            session_id,
            next_message,
            RunConfig::streaming(model.streaming),
        );

        let mut pending_calls = None;
        while let Some(event) = events.next().await {
            let event = event?;
            if event.partial {
                if let Some(text) = event.text() {
                    eprint!("{text}");
                }
                continue;
            }
            if event.is_final_response() {
                println!("Final Response: {}", event.text().unwrap_or_default());
                return Ok(());
            }
            pending_calls = Some(event);
        }

        let Some(event) = pending_calls else {
            return Ok(());
        };
        next_message = answer_function_calls(runner, session_id, &event).await?;
    }

    Err(format!("no final response after {MAX_TOOL_ROUNDS} tool rounds").into())
}

/// Run the tools the model asked for and package their results as the
/// next user turn.
async fn answer_function_calls(
    runner: &Runner,
    session_id: &str,
    event: &Event,
) -> Result<Content, Box<dyn std::error::Error>> {
    let session = runner
        .session_service()
        .get_session(runner.app_name(), demos::USER_ID, session_id)
        .await?;
    let ctx = ToolExecutionContext::for_session(&session);

    let mut responses = Vec::new();
    let calls = event
        .content
        .as_ref()
        .map(|c| c.function_calls())
        .unwrap_or_default();
    for call in calls {
        println!("Tool requested: {}({})", call.name, call.args);
        let result = match runner.agent().find_tool(&call.name) {
            Some(tool) => tool
                .execute(&ToolArguments::new(call.args.clone()), &ctx)
                .await
                .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() })),
            None => serde_json::json!({ "error": format!("unknown tool `{}`", call.name) }),
        };
        println!("  -> {result}");
        responses.push(FunctionResponse::for_call(call, result));
    }

    Ok(Content::function_results(responses))
}

fn print_state(state: &State) {
    for (key, value) in state.iter() {
        match value.as_str() {
            Some(s) => println!("{key}: {s}"),
            None => println!("{key}: {value}"),
        }
    }
}
