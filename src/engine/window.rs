use crate::model::{LockWindow, Ms, Span};

const MS_PER_MINUTE: Ms = 60_000;
const MS_PER_DAY: Ms = 86_400_000;

/// Minute of day `[0, 1440)` on the canonical clock.
pub fn minute_of_day(at: Ms) -> u32 {
    (at.rem_euclid(MS_PER_DAY) / MS_PER_MINUTE) as u32
}

/// Both boundaries are inclusive. `start_minute > end_minute` means the
/// window spans across midnight.
pub fn window_contains_minute(window: &LockWindow, minute: u32) -> bool {
    if !window.enabled {
        return false;
    }
    let (s, e) = (window.start_minute, window.end_minute);
    if s <= e {
        s <= minute && minute <= e
    } else {
        minute >= s || minute <= e
    }
}

/// Endpoint-only membership: an interval counts as inside the window when
/// either of its endpoints' time of day does. An interval that strictly
/// contains the window without an endpoint inside it is not detected —
/// kept as-is for compatibility with the recorded approval history.
pub fn span_touches_window(span: &Span, window: &LockWindow) -> bool {
    window_contains_minute(window, minute_of_day(span.start))
        || window_contains_minute(window, minute_of_day(span.end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    const H: Ms = 3_600_000;
    const DAY: Ms = 86_400_000;

    fn window(start_minute: u32, end_minute: u32, enabled: bool) -> LockWindow {
        LockWindow {
            id: Ulid::new(),
            start_minute,
            end_minute,
            enabled,
        }
    }

    #[test]
    fn minute_of_day_wraps_days() {
        assert_eq!(minute_of_day(0), 0);
        assert_eq!(minute_of_day(23 * H), 23 * 60);
        assert_eq!(minute_of_day(5 * DAY + 12 * H), 12 * 60);
        // Pre-epoch instants still land in [0, 1440)
        assert_eq!(minute_of_day(-H), 23 * 60);
    }

    #[test]
    fn wrapping_window_membership() {
        // 22:00–06:00
        let w = window(22 * 60, 6 * 60, true);
        assert!(window_contains_minute(&w, 23 * 60));
        assert!(window_contains_minute(&w, 5 * 60));
        assert!(!window_contains_minute(&w, 12 * 60));
    }

    #[test]
    fn non_wrapping_window_boundaries_inclusive() {
        let w = window(9 * 60, 17 * 60, true);
        assert!(window_contains_minute(&w, 9 * 60));
        assert!(window_contains_minute(&w, 17 * 60));
        assert!(!window_contains_minute(&w, 17 * 60 + 1));
        assert!(!window_contains_minute(&w, 8 * 60 + 59));
    }

    #[test]
    fn wrapping_window_boundaries_inclusive() {
        let w = window(22 * 60, 6 * 60, true);
        assert!(window_contains_minute(&w, 22 * 60));
        assert!(window_contains_minute(&w, 6 * 60));
        assert!(!window_contains_minute(&w, 6 * 60 + 1));
    }

    #[test]
    fn disabled_window_never_matches() {
        let w = window(0, 1439, false);
        assert!(!window_contains_minute(&w, 12 * 60));
        assert!(!span_touches_window(&Span::new(0, DAY), &w));
    }

    #[test]
    fn span_endpoint_inside_window() {
        let w = window(22 * 60, 6 * 60, true);
        // 23:00 → 00:30 next day: both endpoints inside
        assert!(span_touches_window(&Span::new(23 * H, 24 * H + H / 2), &w));
        // 12:00 → 14:00: neither endpoint inside
        assert!(!span_touches_window(&Span::new(12 * H, 14 * H), &w));
        // 20:00 → 23:00: only the end inside
        assert!(span_touches_window(&Span::new(20 * H, 23 * H), &w));
    }

    #[test]
    fn span_containing_whole_window_is_missed() {
        // Documented approximation: neither endpoint falls inside the
        // 12:00–13:00 window, even though the span covers it entirely.
        let w = window(12 * 60, 13 * 60, true);
        assert!(!span_touches_window(&Span::new(10 * H, 15 * H), &w));
    }
}
