use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to .env file (e.g., .env.polkadot)
    #[arg(short, long, default_value = ".env")]
    pub env_file: String,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Load the .env file named by the arguments, ignoring a missing file
    pub fn load_env(&self) {
        let _ = dotenv::from_filename(&self.env_file);
    }
}
