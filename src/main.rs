use chrono::Utc;
use page_history::config::Config;
use page_history::display;
use page_history::memory::InMemoryHistory;
use page_history::stats::EditCountKind;
use page_history::{FetchError, HistoryEvent, PageHistory, Viewport};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: page-history <revisions.json> [page title]")?;
    let page = args.next().unwrap_or_else(|| "Main Page".to_string());

    let config = Config::default();
    let json = std::fs::read_to_string(&path)?;
    let fetcher = InMemoryHistory::from_json(&json)?.with_batch_size(config.settings.batch_size);
    let (history, events) = PageHistory::new(page, fetcher, &config.settings);

    let stats = futures::executor::block_on(async {
        let stats = history.load_stats().await;
        history.load_initial().await?;
        // Keep the whole list "on screen" so every page gets pulled in
        while history
            .on_scroll(Viewport::new(0.0, f64::MAX), 0.0)
            .await?
            .is_some()
        {}
        Ok::<_, FetchError>(stats)
    })?;

    let batches = events
        .try_iter()
        .filter(|e| matches!(e, HistoryEvent::SectionsChanged(_)))
        .count();
    tracing::info!(batches, "History loaded");

    println!("=== {} ===\n", history.page());
    if let Some(summary) = stats.summary {
        println!(
            "{} edits since {}",
            summary.total_edits,
            summary.first_edit_date.format("%Y-%m-%d")
        );
    }
    for kind in EditCountKind::ALL {
        if let Some(count) = stats.edit_counts.get(kind) {
            println!("  {:?}: {}", kind, count);
        }
    }

    let now = Utc::now();
    for (index, section) in history.sections().iter().enumerate() {
        println!("\n{}", display::section_header(index, section, now));
        for item in &section.items {
            println!(
                "  {:>10}  {}{}  {:+}  {}",
                display::time_label(item.timestamp, now),
                item.user,
                if item.is_anon { " (anon)" } else { "" },
                item.size_delta,
                item.comment_text().unwrap_or_default()
            );
        }
    }

    history.close();
    Ok(())
}
