use anyhow::{Context, Result};
use colored::Colorize;

use ytmusic_dl::common::api::models::search::{Artist, SearchParams, Suggestion};
use ytmusic_dl::common::logger::PrettyLogger;
use ytmusic_dl::log_info;

use super::App;
use super::download::submit;

pub(crate) fn artist_names(artists: &[Artist]) -> String {
    artists
        .iter()
        .map(|artist| artist.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn run_search(app: &App, params: SearchParams, download: Option<usize>) -> Result<()> {
    let results = app.client.search(&params).await?;
    if results.is_empty() {
        log_info!("没有找到 \"{}\" 的结果", params.query);
        return Ok(());
    }

    // 列表只用于标注状态，拉取失败时按未下载显示
    let _ = app.jobs.refresh().await;
    let snapshot = app.jobs.snapshot();

    PrettyLogger::title(format!("搜索: {}", params.query));
    for (index, result) in results.iter().enumerate() {
        let state = snapshot.derive_entity(&app.urls, result);
        let kind = result
            .result_type
            .as_deref()
            .or(result.category.as_deref())
            .unwrap_or("-");
        let mut line = format!(
            "{:>3}. {} {} {}",
            index + 1,
            PrettyLogger::status_badge(state),
            result.display_title().bold(),
            format!("[{}]", kind).bright_black()
        );
        let artists = artist_names(&result.artists);
        if !artists.is_empty() {
            line.push_str(&format!(" - {}", artists));
        }
        if let Some(duration) = &result.duration {
            line.push_str(&format!(" ({})", duration));
        }
        println!("{}", line);
    }

    if let Some(n) = download {
        let result = n
            .checked_sub(1)
            .and_then(|i| results.get(i))
            .with_context(|| format!("没有第 {} 个结果", n))?;
        let url = app
            .urls
            .url_for(result)
            .with_context(|| format!("\"{}\" 没有可下载的链接", result.display_title()))?;
        submit(app, &url, None).await?;
    }
    Ok(())
}

fn render_suggestion(suggestion: &Suggestion) -> String {
    match suggestion {
        Suggestion::Detailed { runs, .. } if !runs.is_empty() => runs
            .iter()
            .map(|run| {
                if run.bold {
                    run.text.bold().to_string()
                } else {
                    run.text.clone()
                }
            })
            .collect(),
        other => other.text().to_string(),
    }
}

pub async fn run_suggest(app: &App, query: &str) -> Result<()> {
    let suggestions = app.client.search_suggestions(query).await;
    if suggestions.is_empty() {
        log_info!("没有搜索建议");
        return Ok(());
    }
    for suggestion in &suggestions {
        println!("  {}", render_suggestion(suggestion));
    }
    Ok(())
}
