use std::fmt::Write;

use crate::{
    bindings::card::UrlCard,
    domain::{models::ShortenedUrl, query_state::QueryState},
};

pub fn render_state(host: &str, state: &QueryState<Vec<ShortenedUrl>>) -> String {
    match state {
        QueryState::Idle => "Enter the admin password with `login <password>`.\n".to_string(),
        QueryState::Loading => "Loading..\n".to_string(),
        QueryState::Error(message) => format!("Error\n{message}\n"),
        QueryState::Success(urls) => render_list(host, urls),
    }
}

pub fn render_list(host: &str, urls: &[ShortenedUrl]) -> String {
    let mut out = String::from("Shortened URLs\n");
    if urls.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }

    let width = urls.len().to_string().len();
    for (i, url) in urls.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>width$}. {host}{}  ->  {}",
            i + 1,
            url.short_url,
            url.target_url
        );
        if !url.comment.is_empty() {
            let _ = writeln!(out, "{:width$}  {}", "", url.comment);
        }
    }
    out
}

pub fn render_pending_delete(host: &str, card: &UrlCard, window_ms: u128) -> String {
    format!(
        "{} {host}{}: repeat within {window_ms} ms to delete, or use `delete!`\n",
        card.delete_label(),
        card.record().short_url,
    )
}
