//! Loads the invitation list into the guest table.
//!
//! The input is a text file with one guest or family name per line; blank
//! lines and lines starting with `#` are skipped.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use wedding_rsvp::directory::register_guest;
use wedding_rsvp::store::{MysqlStore, RecordStore};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Guest list, one name per line.
    file: PathBuf,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Remove every existing guest (and their RSVP) first.
    #[arg(long)]
    replace: bool,
}

fn guest_names(contents: &str) -> Vec<&str> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

#[rocket::main]
async fn main() {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(&args.file)?;
    let names = guest_names(&contents);
    let store = MysqlStore::connect(&args.database_url)?;

    if args.replace {
        let removed = store.delete_all_guests().await?;
        info!("Removed {removed} existing guests");
    }

    for name in &names {
        let guest = register_guest(&store, name).await?;
        info!("Added {} ({})", guest.name, guest.id);
    }

    info!("All {} guests added", names.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::guest_names;

    #[test]
    fn skips_blank_and_comment_lines() {
        let names = guest_names("# families\nLee Family\n\n  Ortiz Family  \n# friends\nSam Hill\n");
        assert_eq!(names, ["Lee Family", "Ortiz Family", "Sam Hill"]);
    }
}
