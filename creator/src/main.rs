//! Agent Creator - fill in an agent form, get a task document, run it.

mod artifacts;
mod form;

use agent::{
    ApiKey, Capability, CrewExecutor, DEFAULT_DEADLINE, DEFAULT_MAX_STEPS, Error, Executor,
    Result, RunResult, Runner, Session, Template,
};
use clap::{Args, Parser, Subcommand};
use form::FormArgs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Assemble an agent and task into a YAML document and run it under a deadline
#[derive(Parser)]
#[command(name = "agent-creator")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the document from the form and run it
    Run(RunArgs),

    /// Print the document that `run` would submit
    Show {
        #[command(flatten)]
        form: FormArgs,
    },

    /// List the available templates
    Templates,

    /// List the tools a task can enable
    Tools,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    form: FormArgs,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model used by the agents; it must support function calling
    #[arg(long, default_value = agent::llm::DEFAULT_MODEL)]
    model: String,

    /// Model that serves InternetSearchTool; it must be a `*-search-preview`
    /// model, the only ones that accept web search
    #[arg(long, default_value = agent::llm::DEFAULT_SEARCH_MODEL)]
    search_model: String,

    /// Seconds to wait for the result. A run that times out is abandoned,
    /// not killed, and may keep using the API until it finishes
    #[arg(long, default_value_t = DEFAULT_DEADLINE.as_secs())]
    timeout: u64,

    /// Model turns allowed per task
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Seconds between progress reports, 0 disables them
    #[arg(long, default_value_t = 10)]
    progress: u64,

    /// Directory to save the document and the result in
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Append a markdown transcript of the agents' conversation to this file
    #[arg(long)]
    transcript: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {}", err);
    }

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "aborted");
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Templates => {
            for template in Template::all() {
                let tools = template
                    .capabilities
                    .iter()
                    .map(Capability::name)
                    .collect::<Vec<_>>();
                println!("{:<10} {} [{}]", template.name, template.summary, tools.join(", "));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Tools => {
            for capability in Capability::all() {
                println!("{:<20} {}", capability.name(), capability.description());
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Show { form } => {
            print!("{}", form.spec()?.to_yaml()?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run(args) => run_task(args).await,
    }
}

fn session(args: &RunArgs) -> Session {
    let mut runner = Runner::new(Duration::from_secs(args.timeout));
    if args.progress > 0 {
        runner = runner.with_progress(Duration::from_secs(args.progress), |p| {
            info!(
                elapsed_secs = p.elapsed.as_secs(),
                percent = (p.fraction() * 100.0).round() as u32,
                "waiting for the agents"
            );
        });
    }

    let model = args.model.clone();
    let search_model = args.search_model.clone();
    let max_steps = args.max_steps;
    let transcript = args.transcript.clone();

    Session::new(runner, move |key: &ApiKey| {
        let mut executor = CrewExecutor::openai(&model, &search_model, key).max_steps(max_steps);
        if let Some(path) = &transcript {
            executor = executor.transcript(path);
        }
        let executor: Arc<dyn Executor + Send + Sync> = Arc::new(executor);
        Ok(executor)
    })
}

async fn run_task(args: RunArgs) -> Result<ExitCode> {
    let spec = args.form.spec()?;
    let session = session(&args);

    let outcome = session
        .submit(args.api_key.as_deref().unwrap_or_default(), &spec)
        .await?;

    println!("# Agent document\n\n```yaml\n{}```\n", outcome.document);

    let output = match &outcome.result {
        RunResult::Success(output) => Some(output.as_str()),
        _ => None,
    };
    if let Some(dir) = &args.out_dir {
        artifacts::save(dir, &outcome.document, output)?;
    }

    let code = match outcome.into_result() {
        Ok(output) => {
            println!("# Agent output\n\n{}", output);
            ExitCode::SUCCESS
        }
        Err(Error::EmptyResult) => {
            warn!("the agents finished without producing any output");
            eprintln!("warning: {}", Error::EmptyResult);
            ExitCode::SUCCESS
        }
        Err(err @ Error::Timeout(_)) => {
            eprintln!(
                "error: {}. The task may still be running in the background; retry with a larger --timeout.",
                err
            );
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    };

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use agent::Capability;
    use clap::Parser;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "agent-creator",
            "run",
            "--template",
            "space",
            "--tool",
            "MemoryTool",
            "--tool",
            "internetsearchtool",
            "--timeout",
            "60",
            "--api-key",
            "sk-test",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.timeout, 60);
        assert_eq!(args.api_key.as_deref(), Some("sk-test"));
        assert_eq!(
            args.form.tools,
            [Capability::Memory, Capability::InternetSearch]
        );
        assert_eq!(args.model, "gpt-4o");
        assert_eq!(args.search_model, "gpt-4o-search-preview");
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["agent-creator", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.timeout, 300);
        assert_eq!(args.form.template, "biotech");

        let cli = Cli::try_parse_from([
            "agent-creator",
            "run",
            "--search-model",
            "gpt-4o-mini-search-preview",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.search_model, "gpt-4o-mini-search-preview");
    }

    #[test]
    fn test_unknown_tool_rejected() {
        assert!(Cli::try_parse_from(["agent-creator", "show", "--tool", "Calculator"]).is_err());
    }
}
