//! iCalendar (RFC 5545) rendering of a [`Feed`].

use super::CALENDAR_DOMAIN;
use crate::models::{CalendarEvent, Feed};
use chrono::{DateTime, Duration, Utc};
use ical::generator::{Emitter, IcalCalendarBuilder, IcalEvent, Property};
use ical::{ical_param, ical_property};

const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Escape a TEXT value: backslash, semicolon, comma and newline
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

pub fn format_utc(at: &DateTime<Utc>) -> String {
    at.format(UTC_FORMAT).to_string()
}

/// 24 hours -> "PT24H"
pub fn format_duration(duration: &Duration) -> String {
    let seconds = duration.num_seconds();
    if seconds % 3600 == 0 {
        format!("PT{}H", seconds / 3600)
    } else {
        format!("PT{}S", seconds)
    }
}

// `IcalEventBuilder` always tags DTSTART with TZID or VALUE=DATE, which is
// wrong for UTC stamps, so events are assembled from `ical_property!`.
fn to_ical_event(event: &CalendarEvent, stamp: &str) -> IcalEvent {
    let mut ical_event = IcalEvent::new();
    let properties = &mut ical_event.properties;

    properties.push(ical_property!("UID", event.uid.as_str()));
    properties.push(ical_property!("SEQUENCE", "0"));
    properties.push(ical_property!("DTSTAMP", stamp));
    properties.push(ical_property!("DTSTART", format_utc(&event.start)));
    properties.push(ical_property!("DTEND", format_utc(&event.end)));
    properties.push(ical_property!("SUMMARY", escape_text(&event.summary)));
    if !event.location.is_empty() {
        properties.push(ical_property!("LOCATION", escape_text(&event.location)));
    }
    if !event.description.is_empty() {
        properties.push(ical_property!(
            "DESCRIPTION",
            escape_text(&event.description)
        ));
    }
    properties.push(ical_property!(
        "URL",
        event.url.as_str(),
        ical_param!("VALUE", "URI")
    ));

    ical_event
}

/// Render the whole feed as a VCALENDAR document
pub fn render(feed: &Feed) -> String {
    let ttl = format_duration(&feed.ttl);
    let name = escape_text(&feed.name);
    let stamp = format_utc(&feed.generated_at);

    let calendar = feed.events.iter().fold(
        IcalCalendarBuilder::version("2.0")
            .gregorian()
            .prodid(format!(
                "-//{}//{}//EN",
                CALENDAR_DOMAIN,
                feed.league.product()
            ))
            .set(ical_property!("NAME", name.as_str()))
            .set(ical_property!("X-WR-CALNAME", name.as_str()))
            .set(ical_property!("URL", feed.url.as_str()))
            .set(ical_property!(
                "REFRESH-INTERVAL",
                ttl.as_str(),
                ical_param!("VALUE", "DURATION")
            ))
            .set(ical_property!("X-PUBLISHED-TTL", ttl.as_str())),
        |builder, event| builder.add_event(to_ical_event(event, &stamp)),
    );

    calendar.build().generate()
}
