//! `aura chat`: single-message or interactive chat in the terminal.

use std::io::Write;
use std::sync::Arc;

use aura_agent::{AgentLoop, AgentStreamEvent, ContextBuilder};
use aura_config::AppConfig;
use aura_core::message::Message;
use aura_core::tool::ExecutionContext;
use aura_gateway::FALLBACK_REPLY;
use aura_tools::TaskStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

pub async fn run(
    message: Option<String>,
    stream: bool,
    user: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  WARNING: No API key configured, replies will be the fallback message.");
        eprintln!("  Set GROQ_API_KEY (or AURA_API_KEY) or add api_key to:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
    }

    let provider = aura_providers::build_from_config(&config);
    let tools = Arc::new(aura_tools::default_registry(
        &config.tools,
        Arc::new(TaskStore::new()),
    ));
    let tool_count = tools.len();
    let agent = AgentLoop::from_config(provider, tools, &config);
    let context = ContextBuilder::from_config(&config.context);
    let ctx = user.map(ExecutionContext::for_user).unwrap_or_default();

    if let Some(msg) = message {
        // Single message mode
        let messages = context.trim(vec![Message::user(msg)]);
        let reply = ask(&agent, messages, &ctx, stream).await?;
        if !stream {
            println!("{reply}");
        }
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  Aura: interactive mode");
    println!();
    println!("  Provider:  {}", config.provider);
    println!("  Model:     {}", config.model);
    println!("  Tools:     {tool_count}");
    println!("  Caller:    {}", ctx.caller());
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut history: Vec<Message> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  You > ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            print!("  You > ");
            std::io::stdout().flush()?;
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        let user_message = Message::user(line);
        let messages = context.build(&history, user_message.clone());

        match ask(&agent, messages, &ctx, stream).await {
            Ok(reply) => {
                if !stream {
                    println!();
                    for line in reply.lines() {
                        println!("  Assistant > {line}");
                    }
                }
                println!();
                history.push(user_message);
                history.push(Message::assistant(reply));
            }
            Err(e) => {
                eprintln!("  [Error] {e}");
                println!();
            }
        }

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}

/// Run one request. With `stream`, tokens are printed as they arrive.
async fn ask(
    agent: &AgentLoop,
    messages: Vec<Message>,
    ctx: &ExecutionContext,
    stream: bool,
) -> Result<String, aura_core::Error> {
    let result = if stream {
        let (tx, mut rx) = mpsc::channel::<AgentStreamEvent>(64);
        let printer = tokio::spawn(async move {
            let mut stdout = std::io::stdout();
            while let Some(event) = rx.recv().await {
                if let AgentStreamEvent::Token { token } = event {
                    print!("{token}");
                    let _ = stdout.flush();
                }
            }
            println!();
        });
        let result = agent.run(messages, ctx, Some(&tx)).await;
        drop(tx);
        let _ = printer.await;
        result
    } else {
        agent.run(messages, ctx, None).await
    };

    match result {
        Ok(run) => {
            debug!(steps = run.steps, tool_calls = run.tool_calls_made, "Agent run finished");
            Ok(run.answer)
        }
        Err(e) if e.is_not_configured() => {
            if stream {
                println!("{FALLBACK_REPLY}");
            }
            Ok(FALLBACK_REPLY.to_string())
        }
        Err(e) => Err(e),
    }
}
