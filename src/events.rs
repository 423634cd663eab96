//! Event list loading and ground-track matching.
//!
//! Events come from an operator-supplied text file, one per line:
//! `year month day hour minute <label...>`. Matching against the track
//! is by exact minute; both sides are truncated to whole minutes first.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::track::TrackSample;

pub struct Event {
    pub time: NaiveDateTime,
    pub label: String,
}

/// An event resolved onto its ground-track sample.
pub struct EventMarker {
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub label: String,
}

/// Parse the whole event file. Malformed lines are logged and skipped.
pub fn parse_events(text: &str) -> Vec<Event> {
    let mut events = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(event) => events.push(event),
            None => log::warn!("skipping malformed event on line {}: {:?}", lineno + 1, line),
        }
    }
    events
}

fn parse_line(line: &str) -> Option<Event> {
    let mut fields = line.split_whitespace();
    let year: i32 = fields.next()?.parse().ok()?;
    let month: u32 = fields.next()?.parse().ok()?;
    let day: u32 = fields.next()?.parse().ok()?;
    let hour: u32 = fields.next()?.parse().ok()?;
    let minute: u32 = fields.next()?.parse().ok()?;
    let label = fields.collect::<Vec<_>>().join(" ");
    let time = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)?;
    Some(Event { time, label })
}

fn minute_index(time: DateTime<Utc>) -> i64 {
    time.timestamp().div_euclid(60)
}

fn event_minute(event: &Event) -> i64 {
    event.time.and_utc().timestamp().div_euclid(60)
}

/// Place every event falling strictly inside the track's time span on
/// its matching sample. The second return is the stale-list flag: true
/// when the last event in the file ends before the track does, the cue
/// that the list no longer covers the displayed window.
pub fn match_events(events: &[Event], track: &[TrackSample]) -> (Vec<EventMarker>, bool) {
    let (Some(first), Some(last)) = (track.first(), track.last()) else {
        return (Vec::new(), false);
    };
    let start_minute = minute_index(first.time);
    let end_minute = minute_index(last.time);

    let mut markers = Vec::new();
    for event in events {
        let minute = event_minute(event);
        if minute <= start_minute || minute >= end_minute {
            continue;
        }
        if let Some(sample) = track.iter().find(|s| minute_index(s.time) == minute) {
            markers.push(EventMarker {
                lon_deg: sample.lon_deg,
                lat_deg: sample.lat_deg,
                label: event.label.clone(),
            });
        }
    }

    let stale = events.last().map_or(false, |e| event_minute(e) < end_minute);
    (markers, stale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn event(line: &str) -> Event {
        parse_line(line).unwrap()
    }

    // Synthetic track whose samples carry their index in the longitude
    // field, with a 30 s sub-minute phase to exercise truncation.
    fn synthetic_track() -> Vec<TrackSample> {
        let origin = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 30).unwrap();
        (0..100)
            .map(|i| TrackSample {
                time: origin + Duration::minutes(i),
                lon_deg: i as f64,
                lat_deg: -(i as f64),
            })
            .collect()
    }

    #[test]
    fn parses_time_and_label() {
        let e = event("2025 3 1 12 34 Perigee passage");
        assert_eq!(e.time, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(12, 34, 0).unwrap());
        assert_eq!(e.label, "Perigee passage");
    }

    #[test]
    fn label_tokens_rejoin_with_single_spaces() {
        let e = event("2025  3  1  4  5   ADR   maneuver ");
        assert_eq!(e.label, "ADR maneuver");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let events = parse_events("not an event\n2025 3 1 0 0 ok\n2025 13 1 0 0 bad month\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].label, "ok");
    }

    #[test]
    fn event_matches_sample_despite_sub_minute_phase() {
        let track = synthetic_track();
        let events = vec![event("2025 3 1 12 5 obs start")];
        let (markers, _) = match_events(&events, &track);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].lon_deg, 5.0);
        assert_eq!(markers[0].label, "obs start");
    }

    #[test]
    fn span_endpoints_are_excluded() {
        let track = synthetic_track();
        let events = vec![
            event("2025 3 1 12 0 at start"),
            event("2025 3 1 13 39 at end"),
            event("2025 3 1 11 59 before"),
            event("2025 3 1 13 40 after"),
        ];
        let (markers, _) = match_events(&events, &track);
        assert!(markers.is_empty());
    }

    #[test]
    fn stale_flag_follows_last_event_only() {
        let track = synthetic_track();
        let exhausted = vec![event("2025 3 1 12 5 a"), event("2025 3 1 13 0 b")];
        let (_, stale) = match_events(&exhausted, &track);
        assert!(stale);

        let covered = vec![event("2025 3 1 12 5 a"), event("2025 3 2 0 0 later")];
        let (_, stale) = match_events(&covered, &track);
        assert!(!stale);

        let (_, stale) = match_events(&[], &track);
        assert!(!stale);
    }
}
