use std::time::{Duration, Instant};

use anyhow::Context;
use rmc_auth::TokenProvider;
use rmc_catalog::{CatalogClient, CatalogQuery};

use crate::cli::QueryArgs;
use crate::config::AppConfig;

/// Batch sent when `query` is run without part numbers.
pub const SAMPLE_PART_NUMBERS: [&str; 3] = ["PN1000", "PN-0500", "PN 07-23 "];

/// Build the query from the command line.
///
/// Without part numbers the sample batch is sent in test mode.
#[must_use]
pub fn build_query(args: &QueryArgs) -> CatalogQuery {
    let (parts, test_mode) = if args.part_numbers.is_empty() {
        (SAMPLE_PART_NUMBERS.map(str::to_owned).to_vec(), true)
    } else {
        (args.part_numbers.clone(), args.test_mode)
    };
    CatalogQuery::new(parts)
        .with_pn_matching(args.pn_matching.clone())
        .with_apply_filter_quantity(args.apply_filter_quantity)
        .with_ignore_empty_parts(args.ignore_empty_parts)
        .with_test_mode(test_mode)
}

fn token_provider(config: &AppConfig) -> anyhow::Result<TokenProvider> {
    let provider_config = config.token_provider_config()?;
    TokenProvider::new(&provider_config).context("failed to set up the token provider")
}

/// Run one query and print the response.
///
/// A failed query is reported on stderr and is not an error of the command.
///
/// # Errors
/// Only for setup failures (bad configuration, HTTP client construction).
pub async fn query(config: &AppConfig, args: &QueryArgs) -> anyhow::Result<()> {
    config.validate()?;
    let catalog = CatalogClient::new(&config.catalog_client_config()?, token_provider(config)?)
        .context("failed to set up the catalog client")?;
    let query = build_query(args);

    match catalog.query(&query).await {
        Ok(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Err(e) => {
            tracing::error!(error = %e, "catalog query failed");
            eprintln!("Error during catalog query: {e}");
        }
    }
    Ok(())
}

/// Fetch a token and print its remaining lifetime.
///
/// # Errors
/// Returns setup failures and the token endpoint's error.
pub async fn token(config: &AppConfig) -> anyhow::Result<()> {
    config.token_provider_config()?.validate()?;
    let provider = token_provider(config)?;
    provider
        .get_token(false)
        .await
        .context("failed to obtain an access token")?;

    let remaining = provider
        .cached_expiry()
        .map_or(Duration::ZERO, |expiry| {
            expiry.saturating_duration_since(Instant::now())
        });
    println!(
        "access token acquired; refresh due in {}",
        humantime::format_duration(Duration::from_secs(remaining.as_secs()))
    );
    Ok(())
}

/// Validate the configuration and print it with the secret masked.
///
/// # Errors
/// Returns the first validation failure.
pub fn check(config: &AppConfig) -> anyhow::Result<()> {
    config.validate()?;
    println!("{}", config.to_redacted_json()?);
    println!("configuration is valid");
    Ok(())
}
