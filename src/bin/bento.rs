use bento_profile_api::cli::{self, utils, Cli};
use bento_profile_api::client::ClientError;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let output_format = cli.format;

    if let Err(e) = cli::run(cli).await {
        let status = e.downcast_ref::<ClientError>().and_then(ClientError::status);
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => utils::output_error(&output_format, &e.to_string(), status)?,
        }
        std::process::exit(1);
    }

    Ok(())
}
