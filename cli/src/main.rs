//! Shuttle CLI binary: stateless chat, remembering chat, the ReAct arithmetic agent and the
//! document drafter.
//!
//! Subcommands: `chat`, `memory`, `react`, `drafter`, `tools` (list a tool set).

mod logging;
mod printer;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use cli::{build_llm, format_history, loop_config, ModelOverrides};
use config::ModelSettings;
use shuttle::{
    arithmetic_registry, document_registry, run_react, ChatMode, ChatSession, DocumentSession,
    DraftOutcome, Drafter, Message, StdinInput, ToolChoiceMode, ToolSpec, TranscriptStore,
    DEFAULT_REACT_QUERY,
};
use tracing::info;

use printer::{EventPrinter, OrderedInput, PrintOptions};

const DEFAULT_HISTORY_FILE: &str = "conversation_history.txt";

#[derive(Parser, Debug)]
#[command(name = "shuttle")]
#[command(about = "Shuttle: chat, ReAct and drafting agents over a tool-use loop")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// Model name (overrides MODEL / config.toml)
    #[arg(long, global = true, value_name = "NAME")]
    model: Option<String>,

    /// Sampling temperature, 0 to 2
    #[arg(long, global = true, value_parser = config::parse_temperature)]
    temperature: Option<f32>,

    /// Per-call model timeout in seconds
    #[arg(long, global = true, value_name = "SECS", value_parser = config::parse_timeout)]
    timeout_secs: Option<Duration>,

    /// Tool choice sent with tool-bound requests: auto, none or required
    #[arg(long, global = true, value_name = "MODE")]
    tool_choice: Option<ToolChoiceMode>,

    /// Print loop events: phases, tool calls, tool results, token usage
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print model replies token by token as they stream in
    #[arg(long, global = true)]
    stream: bool,

    /// Print the final conversation history as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chat without memory: each message is sent on its own
    Chat,
    /// Chat that remembers the conversation and persists it to a transcript file
    Memory {
        /// Transcript file to resume from and save to
        #[arg(long, value_name = "PATH", env = "SHUTTLE_HISTORY", default_value = DEFAULT_HISTORY_FILE)]
        history: PathBuf,
        /// Save the transcript after every turn instead of only at exit
        #[arg(long)]
        autosave: bool,
    },
    /// Run one query through the arithmetic ReAct agent
    React {
        /// Query (default: the add-then-multiply example)
        message: Option<String>,
    },
    /// Draft a document interactively until it is saved
    Drafter {
        /// Directory saved documents are written to
        #[arg(long, value_name = "DIR", env = "SHUTTLE_DRAFT_DIR", default_value = ".")]
        out_dir: PathBuf,
    },
    /// List the tools an agent binds
    Tools {
        #[arg(value_enum)]
        set: ToolSet,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ToolSet {
    React,
    Drafter,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    config::load_and_apply("shuttle", None)?;
    logging::init()?;

    if let Command::Tools { set } = &args.cmd {
        return print_tools(&tool_specs(*set), args.json);
    }

    let overrides = ModelOverrides {
        model: args.model.clone(),
        temperature: args.temperature,
        timeout: args.timeout_secs,
        tool_choice: args.tool_choice,
    };
    let settings = overrides.apply(ModelSettings::from_env()?);
    info!(model = %settings.model, provider = ?settings.provider, "model settings resolved");
    let print = |show_turns: bool| PrintOptions {
        verbose: args.verbose,
        show_turns,
        stream: args.stream,
    };
    let stream = args.stream;
    // Streamed replies are printed by the event printer.
    let print_reply = |reply: &str| {
        if !stream {
            println!("\nAI: {}", reply)
        }
    };

    match args.cmd {
        Command::Chat => {
            let llm = Arc::new(build_llm(&settings, vec![], overrides.tool_choice));
            let mut session = ChatSession::new(llm, ChatMode::Stateless, loop_config(&settings));
            let (ctx, printer) = EventPrinter::spawn(print(false));
            let mut input = OrderedInput::new(StdinInput::new(), printer.as_ref());
            session.run_interactive(&mut input, &ctx, print_reply).await?;
            finish(ctx, printer).await;
            if args.json {
                print_json(session.history().as_slice())?;
            }
        }
        Command::Memory { history, autosave } => {
            let llm = Arc::new(build_llm(&settings, vec![], overrides.tool_choice));
            let store = TranscriptStore::new(history.clone());
            let mut session =
                ChatSession::from_transcript(llm, loop_config(&settings), store, autosave).await?;
            if session.history().is_empty() {
                println!("No previous conversation history found. Starting fresh.");
            } else {
                println!("Loaded {} previous messages.", session.history().len());
            }
            let (ctx, printer) = EventPrinter::spawn(print(false));
            let mut input = OrderedInput::new(StdinInput::new(), printer.as_ref());
            session.run_interactive(&mut input, &ctx, print_reply).await?;
            finish(ctx, printer).await;
            println!("Conversation history saved to {}", history.display());
            if args.json {
                print_json(session.history().as_slice())?;
            }
        }
        Command::React { message } => {
            let query = message.unwrap_or_else(|| DEFAULT_REACT_QUERY.to_string());
            let tools = tool_specs(ToolSet::React);
            let llm = Arc::new(build_llm(&settings, tools, overrides.tool_choice));
            let (ctx, printer) = EventPrinter::spawn(print(args.verbose));
            let state = run_react(llm, &query, loop_config(&settings), &ctx).await?;
            finish(ctx, printer).await;
            if args.json {
                print_json(state.history.as_slice())?;
            } else {
                println!("{}", format_history(state.history.as_slice()));
            }
        }
        Command::Drafter { out_dir } => {
            let document = Arc::new(DocumentSession::new(out_dir));
            let tools = document_registry(Arc::clone(&document)).list();
            let llm = Arc::new(build_llm(&settings, tools, overrides.tool_choice));
            let mut drafter = Drafter::new(llm, document, loop_config(&settings));
            let (ctx, printer) = EventPrinter::spawn(print(true));
            println!("\n ===== DRAFTER =====");
            let mut input = OrderedInput::new(StdinInput::new(), printer.as_ref());
            let outcome = drafter.run(&mut input, &ctx).await?;
            finish(ctx, printer).await;
            if !matches!(outcome, DraftOutcome::Finished(_)) {
                println!("\nDocument was not saved.");
            }
            println!("\n ===== DRAFTER FINISHED =====");
            if args.json {
                print_json(drafter.state().history.as_slice())?;
            }
        }
        Command::Tools { .. } => {}
    }
    Ok(())
}

fn tool_specs(set: ToolSet) -> Vec<ToolSpec> {
    match set {
        ToolSet::React => arithmetic_registry().list(),
        ToolSet::Drafter => document_registry(Arc::new(DocumentSession::new("."))).list(),
    }
}

fn print_tools(specs: &[ToolSpec], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(specs)?);
        return Ok(());
    }
    for spec in specs {
        println!("{}: {}", spec.name, spec.description.as_deref().unwrap_or(""));
        println!("  input_schema: {}", spec.input_schema);
    }
    Ok(())
}

fn print_json(messages: &[Message]) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(messages)?);
    Ok(())
}

async fn finish(ctx: shuttle::RunContext, printer: Option<EventPrinter>) {
    if let Some(printer) = printer {
        printer.finish(ctx).await;
    }
}
