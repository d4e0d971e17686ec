use anyhow::Context;
use biblio_app::App;
use biblio_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "biblio", version, about = "Library catalog service")]
struct Cli {
    /// Environment overlay to load (local, staging, production)
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Print the resolved configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_for(cli.env.as_deref())
        .with_context(|| "failed to load biblio settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            biblio_telemetry::init(&settings.telemetry)?;
            biblio_app::bootstrap::serve(&settings).await
        }
        Command::Migrate => {
            biblio_telemetry::init(&settings.telemetry)?;
            let app = App::assemble(&settings).await?;
            let applied = app.migrate().await?;
            tracing::info!(count = applied.len(), "migrations applied");
            for key in applied {
                println!("{key}");
            }
            Ok(())
        }
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .with_context(|| "failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
    }
}
