use anyhow::{Context, Result};
use colored::Colorize;

use ytmusic_dl::common::logger::PrettyLogger;
use ytmusic_dl::downloader::status::with_album_fallback;
use ytmusic_dl::log_info;

use super::App;
use super::download::submit;
use super::search::artist_names;

pub async fn run_album(app: &App, browse_id: &str, download: bool, track: Option<usize>) -> Result<()> {
    let album = app.client.get_album(browse_id).await?;
    let _ = app.jobs.refresh().await;
    let snapshot = app.jobs.snapshot();

    let album_state = snapshot.derive_entity(&app.urls, &album);
    PrettyLogger::title(&album.title);
    println!(
        "{} {} {}",
        PrettyLogger::status_badge(album_state),
        artist_names(&album.artists).bold(),
        album.year.as_deref().unwrap_or("").bright_black()
    );
    PrettyLogger::separator();

    for (index, item) in album.tracks.iter().enumerate() {
        // 曲目没有单独的任务时沿用整张专辑的状态
        let state = with_album_fallback(snapshot.derive_entity(&app.urls, item), album_state);
        let number = item.track_number.unwrap_or(index as u32 + 1);
        let title = item.title.as_deref().unwrap_or("(无标题)");
        let title = if item.is_available == Some(false) {
            title.bright_black().strikethrough().to_string()
        } else {
            title.to_string()
        };
        println!(
            "{:>3}. {} {} {}",
            number,
            PrettyLogger::status_badge(state),
            title,
            item.duration.as_deref().unwrap_or("").bright_black()
        );
    }

    if download {
        let url = app
            .urls
            .url_for(&album)
            .context("专辑没有可下载的链接")?;
        submit(app, &url, None).await?;
    } else if let Some(n) = track {
        let item = n
            .checked_sub(1)
            .and_then(|i| album.tracks.get(i))
            .with_context(|| format!("没有第 {} 首曲目", n))?;
        let url = app.urls.url_for(item).context("该曲目没有可下载的链接")?;
        submit(app, &url, None).await?;
    }
    Ok(())
}

pub async fn run_related(app: &App, video_id: &str) -> Result<()> {
    let sections = app.client.get_related(video_id).await?;
    if sections.iter().all(|section| section.contents.is_empty()) {
        log_info!("没有相关内容");
        return Ok(());
    }

    let _ = app.jobs.refresh().await;
    let snapshot = app.jobs.snapshot();

    for section in &sections {
        if section.contents.is_empty() {
            continue;
        }
        PrettyLogger::title(&section.title);
        for item in &section.contents {
            let state = snapshot.derive_entity(&app.urls, item);
            let mut line = format!(
                "  {} {}",
                PrettyLogger::status_badge(state),
                item.title.as_deref().unwrap_or("(无标题)").bold()
            );
            let artists = artist_names(&item.artists);
            if !artists.is_empty() {
                line.push_str(&format!(" - {}", artists));
            }
            if let Some(url) = app.urls.url_for(item) {
                line.push_str(&format!(" {}", url.bright_black()));
            }
            println!("{}", line);
        }
    }
    Ok(())
}
