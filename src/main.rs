use anyhow::{bail, Context, Result};
use housing_comps::scrapers::{BrowserFetcher, HttpFetcher, ReplayFetcher};
use housing_comps::{Config, DocumentFetcher, FetcherKind, GeoBounds, SearchOrchestrator, SearchParams};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: housing-comps <city> <state> <min_price> <max_price> [west east south north]";

fn parse_args(args: &[String]) -> Result<SearchParams> {
    if args.len() != 4 && args.len() != 8 {
        bail!(USAGE);
    }

    let min_price = args[2]
        .replace(',', "")
        .parse()
        .with_context(|| format!("Invalid minimum price: {}", args[2]))?;
    let max_price = args[3]
        .replace(',', "")
        .parse()
        .with_context(|| format!("Invalid maximum price: {}", args[3]))?;

    let mut params = SearchParams::new(&args[0], &args[1], min_price, max_price);

    if args.len() == 8 {
        let mut edges = [0.0f64; 4];
        for (edge, raw) in edges.iter_mut().zip(&args[4..]) {
            *edge = raw
                .parse()
                .with_context(|| format!("Invalid map bound: {raw}"))?;
        }
        let [west, east, south, north] = edges;
        params = params.with_bounds(GeoBounds::new(west, east, south, north));
    }

    Ok(params)
}

fn build_fetcher(config: &Config) -> Result<Arc<dyn DocumentFetcher>> {
    Ok(match config.fetcher {
        FetcherKind::Http => Arc::new(HttpFetcher::new(&config.user_agent, config.http_timeout)?),
        FetcherKind::Browser => Arc::new(BrowserFetcher::new(config.browser_settle)?),
        FetcherKind::Replay => {
            let dir = config
                .replay_dir
                .as_ref()
                .context("Replay fetcher selected without a capture directory")?;
            Arc::new(ReplayFetcher::from_dir(dir)?)
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let params = parse_args(&args)?;
    let config = Config::from_env().context("Failed to load configuration")?;

    info!("🏠 Housing Comps - subject and comparables search");

    let fetcher = build_fetcher(&config)?;
    info!("Fetching through {}", fetcher.source_name());

    let orchestrator = SearchOrchestrator::new(fetcher, config.site_url.clone())
        .with_request_delay(config.request_delay)
        .with_comparables_cap(config.comparables_cap);

    let response = orchestrator.search(&params).await;

    // Display results
    if let Some(error) = &response.error {
        eprintln!("❌ {error}");
    } else {
        match &response.subject_property {
            Some(subject) => eprintln!("Subject: {subject}"),
            None => eprintln!("Subject: none found"),
        }
        for (i, comp) in response.comparables.iter().enumerate() {
            eprintln!("{}. {}", i + 1, comp);
        }
    }

    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_price_range() {
        let params = parse_args(&args(&["Austin", "TX", "300,000", "500000"])).unwrap();
        assert_eq!(params.locality, "Austin");
        assert_eq!(params.min_price, 300_000);
        assert_eq!(params.max_price, 500_000);
        assert!(params.bounds.is_none());
    }

    #[test]
    fn parses_bounds() {
        let params = parse_args(&args(&[
            "Austin", "TX", "1", "2", "-97.9", "-97.5", "30.1", "30.5",
        ]))
        .unwrap();
        assert_eq!(params.bounds, Some(GeoBounds::new(-97.9, -97.5, 30.1, 30.5)));
    }

    #[test]
    fn rejects_partial_bounds_and_bad_numbers() {
        assert!(parse_args(&args(&["Austin", "TX", "1", "2", "-97.9"])).is_err());
        assert!(parse_args(&args(&["Austin", "TX", "cheap", "2"])).is_err());
    }
}
