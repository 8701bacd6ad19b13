mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

use ottstream::server::auth::hash_password;
use ottstream::{config, ingest, server};
use ottstream_db::pool::init_pool;

const BANNER: &str = r#"
       _   _       _
  ___ | |_| |_ ___| |_ _ __ ___  __ _ _ __ ___
 / _ \| __| __/ __| __| '__/ _ \/ _` | '_ ` _ \
| (_) | |_| |_\__ \ |_| | |  __/ (_| | | | | | |
 \___/ \__|\__|___/\__|_|  \___|\__,_|_| |_| |_|
"#;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "ottstream=trace,ottstream_db=debug,ottstream_common=debug,tower_http=debug"
                .to_string()
        } else {
            "ottstream=debug,ottstream_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            println!("{}", BANNER);
            println!("ottstream {}", env!("CARGO_PKG_VERSION"));

            let mut config = config::load_config_or_default(cli.config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let db = open_database(&config)?;

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(server::start_server(config, db))
        }
        Commands::AddVideo {
            file,
            title,
            description,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let db = open_database(&config)?;

            let title = title.unwrap_or_else(|| {
                file.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "Untitled".to_string())
            });

            let video = ingest::add_video(&config, &db, &file, &title, &description)?;
            println!("Imported '{}' as {}", video.title, video.id);
            Ok(())
        }
        Commands::AddUser {
            login,
            password,
            display_name,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let db = open_database(&config)?;

            let hash = hash_password(&password)?;
            let display = display_name.unwrap_or_else(|| login.clone());

            let conn = db.get()?;
            let user = ottstream_db::queries::users::create_user(&conn, &login, &hash, &display)?;
            println!("Created user '{}' ({})", user.login_id, user.id);
            Ok(())
        }
        Commands::HashPassword { password } => {
            let hash = hash_password(&password)?;
            println!("{}", hash);
            Ok(())
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate(path.as_deref())
        }
        Commands::Version => {
            println!("ottstream {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn open_database(config: &config::Config) -> Result<ottstream_db::pool::DbPool> {
    let db_path = config.database.path.to_string_lossy();
    tracing::info!("Opening database at {}", db_path);
    Ok(init_pool(&db_path)?)
}

fn validate(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            config::load_config(p)?;
            println!("Config OK: {:?}", p);
        }
        None => {
            config::load_config_or_default(None)?;
            println!("Config OK");
        }
    }
    Ok(())
}
