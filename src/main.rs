use std::{sync::Arc, time::Duration};

use clap::Parser;
use comick_browser::{
    CatalogService, ChapterSelected, ComickClient, TitleLoadingPipeline, TitleLoadingState, TitleScreen,
    config::{Args, Config},
    logging,
    read_state::JsonReadStateStore,
};
use dialoguer::{Confirm, Select, console::Style, theme::ColorfulTheme};
use indicatif::{ProgressBar, ProgressStyle};

fn state_message(state: &TitleLoadingState) -> &'static str {
    match state {
        TitleLoadingState::Idle => "waiting",
        TitleLoadingState::LoadingDetail => "fetching title",
        TitleLoadingState::LoadingChapters => "fetching chapters",
        TitleLoadingState::Ready(_) => "done",
        TitleLoadingState::Failed(_) => "failed",
    }
}

async fn load_with_spinner(pipeline: &TitleLoadingPipeline) -> anyhow::Result<TitleLoadingState> {
    let spinner = ProgressBar::new_spinner().with_style(
        ProgressStyle::with_template("{spinner:.yellow} {msg}")?.tick_chars("⠒⠖⠔⠴⠤⠦⠢⠲ "),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));

    let mut states = pipeline.subscribe();
    let follow_states = async {
        while states.changed().await.is_ok() {
            spinner.set_message(state_message(&states.borrow_and_update()));
        }
    };

    tokio::select! {
        _ = pipeline.load() => {}
        _ = follow_states => {}
    }
    spinner.finish_and_clear();

    Ok(pipeline.state())
}

fn print_detail(screen: &TitleScreen) {
    let heading = Style::new().bold();
    let dim = Style::new().dim();
    let detail = &screen.detail;

    println!("{}", heading.apply_to(&detail.title));
    for alt in &detail.alternative_titles {
        println!("{}", dim.apply_to(alt));
    }
    if let Some(year) = detail.year {
        println!("year: {year}");
    }
    if let Some(authors) = &detail.authors {
        println!("authors: {authors}");
    }
    if let Some(artists) = &detail.artists {
        println!("artists: {artists}");
    }
    if let Some(cover) = detail.cover_url() {
        println!("cover: {cover}");
    }
    for line in detail.sanitized_description() {
        println!("  {line}");
    }
    if let Some(last) = screen
        .read_state
        .as_ref()
        .and_then(|state| state.last_chapter_id.as_ref())
    {
        println!("last read: {last}");
    }
    println!();
}

fn browse_chapters(
    pipeline: &TitleLoadingPipeline,
    theme: &ColorfulTheme,
) -> anyhow::Result<Option<ChapterSelected>> {
    let mut cursor = 0;
    loop {
        let state = pipeline.state();
        let Some(screen) = state.screen() else {
            return Ok(None);
        };

        let rows = screen.forest.rows();
        if rows.is_empty() {
            println!("no chapters available");
            return Ok(None);
        }

        let choice = Select::with_theme(theme)
            .with_prompt("Chapters (esc to quit)")
            .items(&rows)
            .default(cursor.min(rows.len() - 1))
            .max_length(20)
            .interact_opt()?;
        let Some(index) = choice else {
            return Ok(None);
        };

        cursor = index;
        if let Some(event) = pipeline.activate(&rows[index].id) {
            return Ok(Some(event));
        }
    }
}

/// Lets the user pick a title from search results, or from the trending list
/// when there is no query.
async fn pick_title(
    catalog: &dyn CatalogService,
    query: Option<&str>,
    theme: &ColorfulTheme,
) -> anyhow::Result<Option<String>> {
    let (prompt, titles) = match query {
        Some(query) => (format!("Results for {query:?}"), catalog.search(query).await?),
        None => ("Trending".to_string(), catalog.fetch_trending().await?),
    };
    if titles.is_empty() {
        println!("no titles found");
        return Ok(None);
    }

    let choice = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&titles)
        .default(0)
        .max_length(20)
        .interact_opt()?;
    Ok(choice.map(|index| titles[index].slug.clone()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;
    let args = Args::parse();
    let config = Config::from_args(&args)?;

    let catalog = Arc::new(ComickClient::new(&config)?);
    let read_states = Arc::new(match &config.read_state_path {
        Some(path) => JsonReadStateStore::load(path).await?,
        None => JsonReadStateStore::in_memory(),
    });

    let selection_theme = ColorfulTheme {
        prompt_style: Style::default().blue(),
        active_item_style: Style::default().reverse(),
        ..Default::default()
    };

    let slug = match &args.slug {
        Some(slug) => slug.clone(),
        None => {
            let picked =
                pick_title(catalog.as_ref(), args.search.as_deref(), &selection_theme).await?;
            let Some(slug) = picked else {
                return Ok(());
            };
            slug
        }
    };

    let pipeline = TitleLoadingPipeline::new(slug.clone(), catalog)
        .with_language(config.language.clone())
        .with_read_states(read_states.clone());

    let hid = loop {
        match load_with_spinner(&pipeline).await? {
            TitleLoadingState::Ready(screen) => {
                print_detail(&screen);
                break screen.detail.hid;
            }
            TitleLoadingState::Failed(reason) => {
                eprintln!("{reason}");
                let retry = Confirm::with_theme(&selection_theme)
                    .with_prompt("Retry?")
                    .default(true)
                    .interact()?;
                if !retry {
                    anyhow::bail!("failed to load {slug}");
                }
            }
            other => anyhow::bail!("unexpected loading state: {other:?}"),
        }
    };

    if let Some(event) = browse_chapters(&pipeline, &selection_theme)? {
        println!("{} - {}", event.label, event.reader_url());
        read_states.record(&hid, &event.chapter_id);
        read_states.save().await?;
    }

    Ok(())
}
