use chrono::{DateTime, Utc};
use mj_core::{Event, EventProximity};
use std::fmt::Write;

use crate::format::{escape, escape_attr, format_date_time, format_time, INVALID_DATE};

fn event_when(event: &Event, now: DateTime<Utc>) -> String {
    match (event.starts_at(), event.proximity(now)) {
        (Some(at), EventProximity::Today) => format!("🎯 Днес • {}", format_time(&at)),
        (Some(at), _) => format_date_time(&at),
        (None, _) => INVALID_DATE.to_string(),
    }
}

fn event_details(event: &Event, html: &mut String) {
    if let Some(description) = event.description.as_deref().filter(|d| !d.trim().is_empty()) {
        let _ = write!(html, "<p class=\"event-description\">{}</p>", escape(description));
    }
    let _ = write!(
        html,
        "<div class=\"event-details\"><div class=\"event-location\">📍 {}</div>",
        escape(&event.location)
    );
    if let Some(organizer) = event.organizer.as_deref().filter(|o| !o.trim().is_empty()) {
        let _ = write!(html, "<div class=\"event-organizer\">👤 Организатор: {}</div>", escape(organizer));
    }
    html.push_str("</div>");
}

pub fn render_timeline_node(event: &Event, now: DateTime<Utc>) -> String {
    let proximity = event.proximity(now);
    let mut html = format!("<div class=\"public-event-card {}\">", proximity.css_class());
    match proximity {
        EventProximity::Today => html.push_str("<span class=\"date-badge today\">ДНЕС</span>"),
        EventProximity::Soon => html.push_str("<span class=\"date-badge soon\">СКОРО</span>"),
        _ => {}
    }
    let _ = write!(
        html,
        "<div class=\"event-date\">{}</div><h3 class=\"event-title\">{}</h3>",
        event_when(event, now),
        escape(&event.title)
    );
    event_details(event, &mut html);
    html.push_str("</div>");
    html
}

/// Public calendar: upcoming events only, soonest first, with a counter.
pub fn render_timeline(events: &[Event], now: DateTime<Utc>) -> String {
    if events.is_empty() {
        return "<div class=\"no-events-card\"><div class=\"no-events-icon\">📅</div>\
                <h3>Все още няма събития</h3><p>Календарът е празен. Провери отново скоро!</p></div>"
            .to_string();
    }
    let mut upcoming: Vec<&Event> = events.iter().filter(|e| e.is_upcoming(now)).collect();
    if upcoming.is_empty() {
        return "<div class=\"no-events-card\"><div class=\"no-events-icon\">⏳</div>\
                <h3>Няма предстоящи събития</h3><p>Всички събития са изминали.</p></div>"
            .to_string();
    }
    upcoming.sort_by_key(|e| e.timestamp);

    let mut html = format!(
        "<div class=\"events-counter\"><span class=\"counter-badge\">{}</span>\
         <span class=\"counter-text\">предстоящи събития</span></div><div class=\"events-timeline\">",
        upcoming.len()
    );
    for event in upcoming {
        html.push_str(&render_timeline_node(event, now));
    }
    html.push_str("</div>");
    html
}

pub fn render_admin_event_card(event: &Event, now: DateTime<Utc>) -> String {
    let state = if event.is_upcoming(now) { "upcoming" } else { "past" };
    let mut html = format!(
        "<div class=\"admin-event-card {}\">\
         <button class=\"delete-event-btn\" data-event-id=\"{}\">✕</button>\
         <div class=\"admin-event-date\"><strong>{}</strong></div>\
         <h3 class=\"admin-event-title\">{}</h3>",
        state,
        escape_attr(&event.id),
        event.starts_at().map(|at| format_date_time(&at)).unwrap_or_else(|| INVALID_DATE.to_string()),
        escape(&event.title)
    );
    event_details(event, &mut html);
    html.push_str("</div>");
    html
}

/// Admin list in store order (ascending by start time).
pub fn render_admin_events(events: &[Event], now: DateTime<Utc>) -> String {
    if events.is_empty() {
        return "<div class=\"no-events\">Все още няма събития</div>".to_string();
    }
    events.iter().map(|event| render_admin_event_card(event, now)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: &str, title: &str, at: DateTime<Utc>) -> Event {
        Event {
            id: id.to_string(),
            title: title.to_string(),
            description: Some("Носете тетрадки".to_string()),
            location: "Кабинет 12".to_string(),
            organizer: None,
            timestamp: at.timestamp_millis(),
            created: 0,
        }
    }

    #[test]
    fn test_timeline_classes_and_order() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();
        let events = vec![
            event("-f", "Далечно", Utc.with_ymd_and_hms(2024, 7, 1, 15, 0, 0).unwrap()),
            event("-p", "Минало", Utc.with_ymd_and_hms(2024, 6, 1, 15, 0, 0).unwrap()),
            event("-t", "Днешно", Utc.with_ymd_and_hms(2024, 6, 10, 15, 0, 0).unwrap()),
            event("-s", "Скорошно", Utc.with_ymd_and_hms(2024, 6, 12, 15, 0, 0).unwrap()),
        ];
        let html = render_timeline(&events, now);
        assert!(html.contains("<span class=\"counter-badge\">3</span>"));
        assert!(!html.contains("Минало"));
        assert!(html.contains("public-event-card today"));
        assert!(html.contains("🎯 Днес • 15:00"));
        assert!(html.contains("public-event-card soon"));
        assert!(html.contains("public-event-card future"));

        let today = html.find("Днешно").unwrap();
        let soon = html.find("Скорошно").unwrap();
        let later = html.find("Далечно").unwrap();
        assert!(today < soon && soon < later);
    }

    #[test]
    fn test_timeline_empty_states() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();
        assert!(render_timeline(&[], now).contains("Все още няма събития"));
        let past = vec![event("-p", "Минало", Utc.with_ymd_and_hms(2024, 6, 1, 15, 0, 0).unwrap())];
        assert!(render_timeline(&past, now).contains("Няма предстоящи събития"));
    }

    #[test]
    fn test_admin_cards() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();
        let events = vec![
            event("-p", "Минало", Utc.with_ymd_and_hms(2024, 6, 1, 15, 0, 0).unwrap()),
            event("-u", "<b>Бъдещо</b>", Utc.with_ymd_and_hms(2024, 6, 11, 15, 0, 0).unwrap()),
        ];
        let html = render_admin_events(&events, now);
        assert!(html.contains("admin-event-card past"));
        assert!(html.contains("admin-event-card upcoming"));
        assert!(html.contains("data-event-id=\"-u\""));
        assert!(html.contains("вторник, 11 юни 2024 г., 15:00"));
        assert!(html.contains("&lt;b&gt;Бъдещо&lt;/b&gt;"));
        assert_eq!(render_admin_events(&[], now), "<div class=\"no-events\">Все още няма събития</div>");
    }
}
