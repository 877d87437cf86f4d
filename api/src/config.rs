use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
pub struct Config {
    #[clap(long, env, default_value_t = String::from("127.0.0.1"))]
    pub host: String,
    #[clap(short, long, env, default_value_t = 7205)]
    pub port: u16,

    #[clap(long, env, default_value_t = String::from("production"))]
    pub env: String,

    #[clap(long, env)]
    pub honeycomb_team: Option<String>,
    #[clap(long, env, default_value_t = String::from("dev"))]
    pub honeycomb_dataset: String,

    /// A JSON file containing a list of `{"name", "email"}` users to create at startup.
    /// Each user gets an API key, which is printed to stdout.
    #[clap(long, env = "BOOTSTRAP_FILE")]
    pub bootstrap: Option<PathBuf>,
}

impl Config {
    /// Production mode hides error details from clients.
    pub fn production(&self) -> bool {
        self.env != "development" && self.env != "test" && !cfg!(debug_assertions)
    }
}
