//! Plain-text rendering of a [`ViewSnapshot`] for the terminal front end.

use chrono::{ DateTime, Local, Utc };
use std::fmt::Write;

use crate::controller::ViewSnapshot;
use crate::models::{ ContentItem, ContentKind, Rating };

const FULL_STAR: char = '★';
const HALF_STAR: char = '◐';
const EMPTY_STAR: char = '☆';

pub fn render_stars(rating: Option<Rating>) -> String {
    let (full, half) = match rating {
        Some(r) => (r.full_stars(), r.has_half_star()),
        None => (0, false),
    };
    (1..=5u8)
        .map(|i| {
            if i <= full {
                FULL_STAR
            } else if half && i == full + 1 {
                HALF_STAR
            } else {
                EMPTY_STAR
            }
        })
        .collect()
}

pub fn format_timestamp(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(utc) => utc.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}

pub fn loading_message(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Joke => "Thinking of a funny joke...",
        ContentKind::Dish => "Cooking up something delicious...",
    }
}

fn default_title(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Joke => "Latest Joke",
        ContentKind::Dish => "Delicious Dish",
    }
}

fn with_article(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Joke => "a joke",
        ContentKind::Dish => "a delicious dish",
    }
}

fn render_current(out: &mut String, item: &ContentItem) {
    let title: &str = if item.title.trim().is_empty() { default_title(item.kind) } else { &item.title };
    let _ = writeln!(out, "== {} ==", title);
    if let Some(url) = item.image_url.as_deref().filter(|u| !u.is_empty()) {
        let _ = writeln!(out, "[image] {}", url);
    }
    let _ = writeln!(out, "{}", item.body);
    if !item.is_error() {
        let _ = writeln!(out, "{}  (id {})", render_stars(item.rating), item.id);
    }
}

fn render_list_entry(out: &mut String, item: &ContentItem) {
    let _ = writeln!(out, "- {}  [{}]", item.title, item.id);
    let _ = writeln!(out, "  {}", item.body);
    if let Some(url) = item.image_url.as_deref().filter(|u| !u.is_empty()) {
        let _ = writeln!(out, "  [image] {}", url);
    }
    if item.rating.is_some() {
        let _ = writeln!(out, "  {}", render_stars(item.rating));
    }
    let _ = writeln!(out, "  {} · {}", format_timestamp(item.created_at), item.kind.label());
}

pub fn render_snapshot(snapshot: &ViewSnapshot) -> String {
    let kind = snapshot.active_kind;
    let mut out = String::new();

    if snapshot.is_loading {
        let _ = writeln!(out, "{}", loading_message(kind));
    } else if let Some(item) = &snapshot.current_item {
        render_current(&mut out, item);
    } else {
        let _ = writeln!(out, "No {} generated yet", kind);
        let _ = writeln!(out, "Generate {} to see it here!", with_article(kind));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Your {}", kind.plural());
    if snapshot.history_for_active_kind.is_empty() {
        let _ = writeln!(
            out,
            "No {} yet. Generate some to see them here!",
            kind.plural().to_lowercase()
        );
    }
    for item in &snapshot.history_for_active_kind {
        render_list_entry(&mut out, item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeneratedPayload;

    fn rating(v: f64) -> Option<Rating> {
        Some(Rating::new(v).unwrap())
    }

    fn dish(id: &str, rated: Option<Rating>) -> ContentItem {
        let mut item = ContentItem::from_payload(
            id.into(),
            ContentKind::Dish,
            GeneratedPayload {
                title: "Margherita Pizza".into(),
                body: "Classic pizza.".into(),
                image_url: Some("https://example.com/pizza.jpg".into()),
            },
            1_700_000_000_000
        );
        item.rating = rated;
        item
    }

    #[test]
    fn stars_cover_whole_and_half_ratings() {
        assert_eq!(render_stars(None), "☆☆☆☆☆");
        assert_eq!(render_stars(rating(3.0)), "★★★☆☆");
        assert_eq!(render_stars(rating(3.5)), "★★★◐☆");
        assert_eq!(render_stars(rating(0.5)), "◐☆☆☆☆");
        assert_eq!(render_stars(rating(5.0)), "★★★★★");
    }

    #[test]
    fn timestamps_render_as_dates() {
        let text = format_timestamp(1_700_000_000_000);
        assert_eq!(text.len(), "2023-11-14 22:13:20".len());
        assert!(text.starts_with("2023-11-1"));
    }

    #[test]
    fn empty_view_prompts_for_generation() {
        let snapshot = ViewSnapshot {
            active_kind: ContentKind::Dish,
            is_loading: false,
            current_item: None,
            history_for_active_kind: Vec::new(),
        };
        let text = render_snapshot(&snapshot);
        assert!(text.contains("No dish generated yet"));
        assert!(text.contains("Your Dishes"));
        assert!(text.contains("No dishes yet. Generate some to see them here!"));
    }

    #[test]
    fn loading_replaces_current_item() {
        let snapshot = ViewSnapshot {
            active_kind: ContentKind::Joke,
            is_loading: true,
            current_item: None,
            history_for_active_kind: Vec::new(),
        };
        assert!(render_snapshot(&snapshot).starts_with("Thinking of a funny joke..."));
    }

    #[test]
    fn list_shows_stars_only_for_rated_items() {
        let snapshot = ViewSnapshot {
            active_kind: ContentKind::Dish,
            is_loading: false,
            current_item: Some(dish("2", rating(4.5))),
            history_for_active_kind: vec![dish("2", rating(4.5)), dish("1", None)],
        };
        let text = render_snapshot(&snapshot);
        assert!(text.contains("== Margherita Pizza =="));
        assert!(text.contains("[image] https://example.com/pizza.jpg"));
        assert_eq!(text.matches("★★★★◐").count(), 2);
        assert!(!text.contains("☆☆☆☆☆"));
        assert!(text.contains("· Dish"));
    }

    #[test]
    fn error_item_has_no_rating_row() {
        let snapshot = ViewSnapshot {
            active_kind: ContentKind::Joke,
            is_loading: false,
            current_item: Some(ContentItem::error(ContentKind::Joke, 0)),
            history_for_active_kind: Vec::new(),
        };
        let text = render_snapshot(&snapshot);
        assert!(text.contains("Oops! Couldn't fetch a joke. Try again later!"));
        assert!(!text.contains(EMPTY_STAR));
    }
}
