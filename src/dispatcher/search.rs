use anyhow::{Context, Result};
use tracing::info;

use crate::cli::formatters;
use fundwatch::reports::ChartRange;
use fundwatch::utils::validate_code;

pub async fn dispatch_search(code: &str, range: ChartRange, json_output: bool) -> Result<()> {
    let fetcher = super::build_fetcher()?;
    let result = fetcher
        .search_fund(code, range)
        .await
        .with_context(|| format!("Search for fund {} failed", code))?;

    if json_output {
        println!("{}", formatters::format_json(&result));
    } else {
        print!("{}", formatters::format_search(&result));
    }
    Ok(())
}

pub async fn dispatch_info(code: &str, json_output: bool) -> Result<()> {
    validate_code(code)?;
    info!("Loading profile for {}", code);

    let fetcher = super::build_fetcher()?;
    let profile = fetcher
        .fetch_profile(code)
        .await
        .with_context(|| format!("Failed to load profile for fund {}", code))?;

    if json_output {
        println!("{}", formatters::format_json(&profile));
    } else {
        println!();
        print!("{}", formatters::format_profile(&profile));
    }
    Ok(())
}
