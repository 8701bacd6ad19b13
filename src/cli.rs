use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ottstream")]
#[command(author, version, about = "OTT video streaming server")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the streaming server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Import a video file into the library
    AddVideo {
        /// Source media file
        #[arg(required = true)]
        file: PathBuf,

        /// Video title (defaults to the file stem)
        #[arg(short, long)]
        title: Option<String>,

        /// Video description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Create a user account
    AddUser {
        /// Login id
        login: String,

        /// Password (hashed before storage)
        password: String,

        /// Display name (defaults to the login)
        #[arg(short, long)]
        display_name: Option<String>,
    },

    /// Generate a bcrypt password hash
    HashPassword {
        /// Password to hash
        password: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
