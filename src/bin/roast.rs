use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use roast_my_fridge::client::{render, HttpProxyTransport, Outcome, Session};

const DEFAULT_LOG_FILTER: &str = "info";

/// Get your fridge roasted, then get a recipe.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// What's in the fridge, e.g. `roast two eggs, old ketchup, a lemon`
    ingredients: Vec<String>,

    /// Base URL of the Roast My Fridge proxy
    #[arg(long, env = "ROAST_PROXY_URL", default_value = "http://127.0.0.1:8080")]
    proxy_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();
    let ingredients = args.ingredients.join(" ");

    let mut session = Session::new(HttpProxyTransport::new(&args.proxy_url));
    if !session.submit(&ingredients).await {
        anyhow::bail!("tell me what's in your fridge first");
    }

    println!("{}", render(session.state()));
    if let Outcome::Failure(_) = session.state().outcome {
        std::process::exit(1);
    }
    Ok(())
}
