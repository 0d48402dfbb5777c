use std::{net::IpAddr, path::PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "livereload", version, about = "Live reload for static sites")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG wins when set
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON configuration file; flags override its values
    #[arg(short, long, global = true, env = "LIVERELOAD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve a directory and reload connected pages on SIGHUP
    Serve(ServeArgs),
    /// Connect to a page's notification endpoint and react to reloads
    Listen(ListenArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port on which to listen for requests [default: 4000]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address on which to listen for requests [default: 0.0.0.0]
    #[arg(short, long)]
    pub addr: Option<IpAddr>,

    /// Run as a plain static http server, rather than injecting the script that lets pages
    /// reload (this also disables listening for SIGHUP and the notification endpoint)
    #[arg(short = 's', long = "static")]
    pub static_only: bool,

    pub directory: PathBuf,
}

#[derive(Debug, Args)]
pub struct ListenArgs {
    /// URL of the page being watched, e.g. http://localhost:4000/
    pub page_url: Option<String>,

    /// Path of the notification endpoint [default: /ws]
    #[arg(long)]
    pub path: Option<String>,

    /// Give up after this many consecutive failed reconnects (0 = never reconnect)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Shell command to run on every reload notification
    #[arg(short, long)]
    pub exec: Option<String>,
}
