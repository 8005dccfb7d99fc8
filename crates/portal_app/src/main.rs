mod platform;

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "portal")]
#[command(about = "Terminal client for the sales portal API")]
struct Args {
    /// Page to open: dash, itens, resumo, jobs or lookup.
    #[arg(long, default_value = "dash")]
    page: String,

    /// RON configuration file. Missing means defaults.
    #[arg(long, default_value = platform::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Overrides the API base URL from the config file.
    #[arg(long)]
    base_url: Option<String>,

    /// Stores a bearer token before starting.
    #[arg(long)]
    set_token: Option<String>,

    /// Clears the stored token before starting.
    #[arg(long)]
    logout: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    platform::run_app(platform::LaunchOptions {
        page: args.page,
        config_path: args.config,
        base_url: args.base_url,
        set_token: args.set_token,
        logout: args.logout,
    })
}
