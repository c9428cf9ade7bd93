use std::{fs, sync::Arc};

use anyhow::{Context, Result};
use calrss_core::{PUBLIC_LOGIN, prelude::*};
use chrono::NaiveDate;

/// Feed generation command parameters
pub struct GenerateParams {
    pub input: String,
    pub start_date: Option<String>,
    pub days: i64,
    pub max: usize,
    pub repeats: i64,
    pub cat_id: Option<i64>,
    pub showdate: bool,
    pub base_url: String,
    pub output: Option<String>,
}

/// Feed generation command
pub async fn generate_command(params: GenerateParams) -> Result<()> {
    let calendar = Arc::new(
        Calendar::from_path(&params.input)
            .with_context(|| format!("Failed to load calendar from {}", params.input))?,
    );
    println!(
        "✓ Loaded calendar '{}' ({} events)",
        calendar.login,
        calendar.events.len()
    );

    let start_date = params
        .start_date
        .as_deref()
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .with_context(|| format!("Invalid start date '{raw}', expected YYYY-MM-DD"))
        })
        .transpose()?;

    let category = params
        .cat_id
        .and_then(|id| calendar.category_name(id))
        .map(str::to_string);
    if params.cat_id.is_some() && category.is_none() {
        tracing::warn!("Category id {:?} not found in calendar", params.cat_id);
    }

    let subject_is_public = calendar.login == PUBLIC_LOGIN;
    let policy = AccessPolicy::from_remote_access(calendar.prefs.remote_access, subject_is_public);

    let options = FeedOptions {
        start_date,
        days: params.days,
        max_events: params.max.min(MAX_FEED_EVENTS),
        repeats: RepeatPolicy::from_param(params.repeats),
        date_in_title: params.showdate,
        category,
        login: calendar.login.clone(),
        base_url: params.base_url.clone(),
    };

    tracing::info!(
        "Generating feed for '{}': {} days, cap {}",
        calendar.login,
        options.days,
        options.max_events
    );

    let source = JsonEventSource::new(calendar.clone()).with_category(params.cat_id);
    let items = MergeEngine::new(source, policy, options).run().await?;
    println!("✓ Feed contains {} items", items.len());

    let channel = ChannelInfo {
        title: format!("Calendar of {}", display_login(&calendar.login)),
        link: params.base_url,
        description: format!("Upcoming events of {}", display_login(&calendar.login)),
        language: "en-us".to_string(),
    };
    let rss_content = RssGenerator::new(channel).generate(&items)?;

    let output_file = params
        .output
        .unwrap_or_else(|| format!("{}-feed.xml", display_login(&calendar.login)));

    fs::write(&output_file, rss_content)?;
    println!("✓ RSS feed saved to: {}", output_file);

    Ok(())
}

/// Calendar inspection command
pub async fn inspect_command(input: String) -> Result<()> {
    let calendar = Calendar::from_path(&input)
        .with_context(|| format!("Failed to load calendar from {input}"))?;

    println!("Calendar: {}", display_login(&calendar.login));
    println!(
        "Feed enabled: {}, remote access level: {}",
        if calendar.prefs.rss_enabled { "yes" } else { "no" },
        calendar.prefs.remote_access
    );

    if calendar.categories.is_empty() {
        println!("Categories: none");
    } else {
        println!("Categories:");
        for category in &calendar.categories {
            println!("  {} - {}", category.id, category.name);
        }
    }

    println!("Events ({} total):", calendar.events.len());
    for event in &calendar.events {
        let repeat = match event.repeat {
            RepeatKind::None => String::new(),
            kind => format!(" [{kind:?}]"),
        };
        println!("  #{} {} {}{}", event.id, event.date, event.name, repeat);
    }

    Ok(())
}

fn display_login(login: &str) -> &str {
    if login == PUBLIC_LOGIN { "public" } else { login }
}
