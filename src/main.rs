use anyhow::Result;
use clap::Parser;
use prettytable::{Cell, Row as PrettyRow, Table};
use std::sync::Arc;

use kahani::cms::HttpContentStore;
use kahani::discovery::{DiscoveryEngine, Navigation};
use kahani::environment::{get_env_var_as_vec, get_env_var_or};
use kahani::filter::{self, FacetValue, FilterState, MemoryFilterStore};
use kahani::logging::configure_logging;

/// Query the story archive with the same engine the site runs.
#[derive(Parser)]
#[clap(name = "discover", about = "Query the publication's story archive")]
struct Cli {
    /// Category slugs to filter by
    #[clap(short, long)]
    category: Vec<String>,

    /// Author name substring
    #[clap(short, long)]
    author: Option<String>,

    /// Location name substring
    #[clap(short, long)]
    location: Vec<String>,

    /// Language editions to fan out across
    #[clap(short = 'g', long)]
    language: Vec<String>,

    /// Content kinds: article, video, audio, student
    #[clap(short = 'k', long)]
    content: Vec<String>,

    /// Date entries: start:YYYY-MM-DD, end:YYYY-MM-DD, date:YYYY-MM-DD,
    /// or a preset such as past-week
    #[clap(short, long)]
    dates: Vec<String>,

    /// Page to load
    #[clap(short, long, default_value = "1")]
    page: u32,

    /// Viewport width in pixels, decides the page size
    #[clap(short, long, default_value = "1280")]
    viewport: u32,

    /// Locale the results are viewed in
    #[clap(long)]
    locale: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();

    let args = Cli::parse();

    let base_url = get_env_var_or("CMS_BASE_URL", "http://localhost:1337");
    let collection = get_env_var_or("CMS_COLLECTION", "articles");
    let token = get_env_var_or("CMS_API_TOKEN", "");
    let active_locale = args
        .locale
        .clone()
        .unwrap_or_else(|| get_env_var_or("DEFAULT_LOCALE", kahani::DEFAULT_LOCALE));

    let store = HttpContentStore::new(&base_url, &collection)?.with_token(&token);

    // Enter through the same door a routed navigation uses: a query
    // string derived from the arguments.
    let mut engine = DiscoveryEngine::new(
        Arc::new(store),
        Arc::new(MemoryFilterStore::new()),
        &active_locale,
        args.viewport,
        Navigation::Routed(query_from_args(&args)),
    );
    engine.go_to_page(args.page);

    let outcome = engine.refresh().await;

    if let Some(error) = &outcome.error {
        eprintln!("{}", error);
        return Ok(());
    }

    let mut table = Table::new();
    table.add_row(PrettyRow::new(vec![
        Cell::new("ID"),
        Cell::new("Title"),
        Cell::new("Authors"),
        Cell::new("Date"),
        Cell::new("Location"),
        Cell::new("Languages"),
    ]));
    for story in &outcome.stories {
        let languages = story
            .available_languages
            .iter()
            .map(|variant| variant.code.clone())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(PrettyRow::new(vec![
            Cell::new(&story.id.to_string()),
            Cell::new(&story.title),
            Cell::new(&story.authors.join(", ")),
            Cell::new(&story.date),
            Cell::new(&story.location),
            Cell::new(&languages),
        ]));
    }
    table.printstd();

    let pagination = outcome.pagination;
    println!(
        "Page {} of {} ({} stories, {} per page)",
        pagination.current_page,
        pagination.total_pages,
        pagination.total_items,
        pagination.page_size
    );

    Ok(())
}

fn query_from_args(args: &Cli) -> String {
    let mut filters = FilterState::new();
    for slug in &args.category {
        filters = filters.set(FacetValue::Category(slug.clone()));
    }
    if let Some(author) = &args.author {
        filters = filters.set(FacetValue::Author(author.clone()));
    }
    for name in &args.location {
        filters = filters.set(FacetValue::Location(name.clone()));
    }

    // Language flags win; otherwise DISCOVERY_LANGUAGES seeds the facet.
    let languages = if args.language.is_empty() {
        get_env_var_as_vec("DISCOVERY_LANGUAGES", ',')
    } else {
        args.language.clone()
    };
    for code in &languages {
        filters = filters.set(FacetValue::Language(code.clone()));
    }

    let mut query = filter::to_query(&filters);

    // Raw tokens go through the URL codec, which drops what it cannot
    // parse, same as a hand-edited address bar.
    if !args.content.is_empty() {
        push_pair(&mut query, "content", &args.content.join(","));
    }
    if !args.dates.is_empty() {
        push_pair(&mut query, "dates", &args.dates.join(","));
    }

    query
}

fn push_pair(query: &mut String, key: &str, value: &str) {
    if !query.is_empty() {
        query.push('&');
    }
    query.push_str(key);
    query.push('=');
    query.push_str(value);
}
