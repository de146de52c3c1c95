//! Route resolution
//!
//! `daybook open` takes a path of the published site and shows the same view
//! the site would: dashboard, calendar, timeline or a single entry.

use chrono::Datelike;
use log::debug;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, calendar, list, show, stats};
use crate::error::{Error, Result};
use crate::record::find_by_slug;
use crate::route::Route;
use crate::session::SessionStore;

/// Run the open command
pub async fn run(opts: &GlobalOptions, path: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let route = Route::parse(path, ctx.config.base())
        .ok_or_else(|| Error::NotFound(format!("no view at '{}'", path)))?;
    debug!("Resolved {} to {}", path, route);

    let records = ctx.records().await;
    match route {
        Route::Dashboard => stats::render(ctx.format, &records, ctx.today()),
        Route::Calendar => {
            let today = ctx.today();
            calendar::render_month(ctx.format, &records, today.year(), today.month(), today)
        }
        Route::Timeline => {
            // The timeline view restores this session's filters
            let filter = SessionStore::current()
                .map(|s| s.load().to_filter())
                .unwrap_or_default();
            list::render(ctx.format, &records, &filter, None)
        }
        Route::Diary {
            year: Some(year),
            month: Some(month),
            day: Some(day),
            slug: Some(slug),
        } => {
            let record = find_by_slug(&records, &year, &month, &day, &slug)
                .ok_or_else(|| show::not_found(path))?;
            show::render(ctx.format, &records, record, false)
        }
        Route::Diary { .. } => Err(show::not_found(path)),
    }
}
