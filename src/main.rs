use clap::Parser;

#[tokio::main]
async fn main() {
    // A missing .env is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    let cli = fetchgate::cli::Cli::parse();
    if let Err(e) = fetchgate::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
