use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::client::DEFAULT_RPC_URL;
use console::panels::Phase;
use console::{Answer, Call, Confirmation, ReadPanel, RpcClient, WritePanel};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Command-line console for the Redis tool proxy.
#[derive(Parser)]
#[command(name = "console", version, about)]
struct Cli {
    /// Base URL of the `/trpc` link
    #[arg(long, env = "CONSOLE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find all keys matching the given pattern
    Keys { pattern: String },
    /// Get the value of a key
    Get { key: String },
    /// Set the string value of a key
    Set {
        key: String,
        value: String,
        /// Skip the overwrite confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Delete a key
    Del {
        key: String,
        /// Skip the confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Remove all keys from all databases
    Flushall {
        /// Confirmation token, instead of typing it at the prompt
        #[arg(long)]
        confirm: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_stderr();

    let cli = Cli::parse();
    let client = RpcClient::new(cli.url);

    let phase = match cli.command {
        Command::Keys { pattern } => read(&client, ReadPanel::keys(), pattern).await,
        Command::Get { key } => read(&client, ReadPanel::get(), key).await,
        Command::Set { key, value, yes } => {
            let mut panel = WritePanel::set();
            panel.set_key(key);
            panel.set_value(value);
            write(&client, panel, yes.then_some(Answer::Accept)).await
        }
        Command::Del { key, yes } => {
            let mut panel = WritePanel::delete();
            panel.set_key(key);
            write(&client, panel, yes.then_some(Answer::Accept)).await
        }
        Command::Flushall { confirm } => write(&client, WritePanel::flush_all(), confirm.map(Answer::Typed)).await,
    };

    match phase {
        Ok(Phase::Success(out)) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Ok(Phase::Failed(message)) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
        Ok(_) => {
            eprintln!("cancelled");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn read(client: &RpcClient, mut panel: ReadPanel, input: String) -> anyhow::Result<Phase> {
    let Some(call) = panel.set_input(input) else {
        anyhow::bail!("input must not be empty");
    };
    run(client, call, |r| panel.resolve(r)).await;
    Ok(panel.phase().clone())
}

async fn write(client: &RpcClient, mut panel: WritePanel, preset: Option<Answer>) -> anyhow::Result<Phase> {
    let Some(confirmation) = panel.submit() else {
        anyhow::bail!("required input is empty");
    };
    let answer = match preset {
        Some(answer) => answer,
        None => ask(&confirmation).await?,
    };
    if let Some(call) = panel.confirm(answer) {
        run(client, call, |r| panel.resolve(r)).await;
    }
    Ok(panel.phase().clone())
}

async fn run(client: &RpcClient, call: Call, resolve: impl FnOnce(Result<console::Output, String>)) {
    let result = client.execute(&call).await.map_err(|e| e.to_string());
    resolve(result);
}

async fn ask(confirmation: &Confirmation) -> anyhow::Result<Answer> {
    let mut stdout = tokio::io::stdout();
    let hint = match confirmation {
        Confirmation::YesNo(_) => " [y/N] ",
        Confirmation::Token { .. } => " ",
    };
    stdout.write_all(format!("{}{hint}", confirmation.prompt()).as_bytes()).await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    let typed = line.trim_end_matches(['\r', '\n']).to_string();

    Ok(match confirmation {
        Confirmation::YesNo(_) if matches!(typed.trim().to_ascii_lowercase().as_str(), "y" | "yes") => Answer::Accept,
        Confirmation::YesNo(_) => Answer::Decline,
        Confirmation::Token { .. } => Answer::Typed(typed),
    })
}
