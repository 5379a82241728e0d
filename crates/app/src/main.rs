use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use localfinder_core::{
    format_answer, place_cards, CategoryTag, EnvLocation, FixedLocation, GeminiClient,
    GeminiConfig, GeoLocation, LocationProvider, PlaceSearch, Radius, SearchError,
    SearchFilters, SearchResult, SearchSession, Span, TextBlock, CURRENT_LOCATION_QUERY,
    DEFAULT_ENDPOINT, DEFAULT_MODEL,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "localfinder", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model identifier
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Gemini REST endpoint
    #[arg(long, env = "GEMINI_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
}

#[derive(Subcommand)]
enum Command {
    /// Find markets, pharmacies and barbershops around an address or your location.
    Search(SearchArgs),
}

#[derive(Args)]
struct SearchArgs {
    /// Address or free-text location.
    #[arg(long, default_value = "")]
    query: String,
    /// Category to restrict to (mercado, farmacia, beleza). Repeatable.
    #[arg(long = "category")]
    categories: Vec<CategoryTag>,
    /// Maximum distance: 1km, 5km, 10km or any.
    #[arg(long, default_value = "any")]
    radius: Radius,
    /// Use the device location from LOCALFINDER_LATITUDE / LOCALFINDER_LONGITUDE.
    #[arg(long, default_value_t = false, conflicts_with_all = ["latitude", "longitude"])]
    near_me: bool,
    /// Latitude to bias results toward.
    #[arg(long, requires = "longitude", allow_hyphen_values = true)]
    latitude: Option<f64>,
    /// Longitude to bias results toward.
    #[arg(long, requires = "latitude", allow_hyphen_values = true)]
    longitude: Option<f64>,
    /// Print the normalized result as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "localfinder boot"
    );

    match cli.command {
        Command::Search(args) => {
            let session = SearchSession::new();
            let filters = SearchFilters::new(args.categories.clone(), args.radius);

            let located = match resolve_location(&session, &args) {
                Ok(location) => location,
                Err(message) => {
                    eprintln!("{message}");
                    return Ok(());
                }
            };

            let query = match located {
                Some(_) if args.query.trim().is_empty() => CURRENT_LOCATION_QUERY.to_string(),
                _ => args.query.clone(),
            };

            if query.trim().is_empty() {
                println!("Digite um endereço (ex: Av. Paulista, 1000) ou use --near-me.");
                return Ok(());
            }

            let config = resolve_config(cli.api_key, GeminiConfig::from_env)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?
                .with_model(cli.model)
                .with_endpoint(cli.endpoint);

            let client =
                GeminiClient::new(config).map_err(|error| anyhow::anyhow!(error.to_string()))?;
            info!(model = client.model(), query = %query, "searching places");
            let search = PlaceSearch::new(client);

            let state = session
                .submit(&search, &query, &filters, located)
                .await
                .unwrap_or_default();

            if let Some(message) = state.error {
                warn!(error = %message, "search failed");
                anyhow::bail!(message);
            }

            if let Some(result) = state.result {
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    print_result(&result);
                }
            }
        }
    }

    Ok(())
}

/// A blank `--api-key` counts as absent so the environment fallback still applies.
fn resolve_config<F>(api_key: Option<String>, from_env: F) -> Result<GeminiConfig, SearchError>
where
    F: FnOnce() -> Result<GeminiConfig, SearchError>,
{
    match api_key.filter(|key| !key.trim().is_empty()) {
        Some(api_key) => Ok(GeminiConfig::new(api_key)),
        None => from_env(),
    }
}

fn resolve_location(
    session: &SearchSession,
    args: &SearchArgs,
) -> Result<Option<GeoLocation>, String> {
    let provider: Box<dyn LocationProvider> = match (args.near_me, args.latitude, args.longitude) {
        (true, _, _) => Box::new(EnvLocation),
        (false, Some(latitude), Some(longitude)) => Box::new(FixedLocation(GeoLocation {
            latitude,
            longitude,
        })),
        _ => return Ok(None),
    };

    session.begin_locate().map_err(|error| error.user_message())?;
    let located = provider.current_location();
    session.finish_locate();

    located.map(Some).map_err(|error| {
        warn!(error = %error, "geolocation unavailable");
        error.user_message()
    })
}

fn print_result(result: &SearchResult) {
    println!("Análise e Recomendações\n");
    for block in format_answer(&result.text) {
        match block {
            TextBlock::Break => println!(),
            TextBlock::Header(spans) => println!("\x1b[1m{}\x1b[0m", render_spans(&spans)),
            TextBlock::ListItem(spans) => println!("  • {}", render_spans(&spans)),
            TextBlock::Paragraph(spans) => println!("{}", render_spans(&spans)),
        }
    }

    let cards = place_cards(result);
    println!();
    if cards.is_empty() {
        println!("Locais Encontrados no Mapa");
        println!("Nenhum cartão de local gerado.");
        println!(
            "O Gemini analisou a região, mas não retornou pinos de mapa específicos desta vez. \
             Verifique os nomes sugeridos no texto acima e busque diretamente no Google Maps."
        );
        return;
    }

    println!("Locais Encontrados no Mapa ({} resultados)", cards.len());
    for card in cards {
        println!("[{}] {}", card.kind.label(), card.title);
        println!("  Ver Rota e Distância: {}", card.uri);
    }
}

fn render_spans(spans: &[Span]) -> String {
    spans
        .iter()
        .map(|span| match span {
            Span::Plain(text) => text.clone(),
            Span::Strong(text) => format!("\x1b[1m{text}\x1b[0m"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_api_key_flag_falls_back_to_environment() {
        let config = resolve_config(Some("   ".to_string()), || {
            Ok(GeminiConfig::new("from-api-key-var"))
        })
        .expect("fallback config");
        assert_eq!(config.api_key, "from-api-key-var");
    }

    #[test]
    fn explicit_api_key_flag_wins() {
        let config = resolve_config(Some("flag-key".to_string()), || {
            Err(SearchError::MissingCredential)
        })
        .expect("flag config");
        assert_eq!(config.api_key, "flag-key");
    }

    #[test]
    fn missing_key_everywhere_is_reported() {
        let result = resolve_config(None, || Err(SearchError::MissingCredential));
        assert!(matches!(result, Err(SearchError::MissingCredential)));
    }
}
