//! Spoken-duration estimate from speaker notes.

use crate::config::Config;
use crate::feedback::TimeEstimate;
use crate::text::SpeakerNotes;
use crate::types::Deck;

/// Slides without notes tolerated before the estimate is abandoned.
const MAX_SLIDES_WITHOUT_NOTES: usize = 2;

/// `HH:MM:SS`, seconds truncated.
pub fn format_hms(seconds: f64) -> String {
    let secs = seconds.max(0.0) as u64;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// `MM:SS`, seconds truncated.
pub fn format_ms(seconds: f64) -> String {
    let secs = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", (secs / 60) % 60, secs % 60)
}

/// Speaking time for one slide's notes, excluding the gap to the next slide.
pub fn slide_seconds(notes: &SpeakerNotes, config: &Config) -> f64 {
    notes.breaks as f64 * config.seconds_per_break
        + notes.pauses() as f64 * config.seconds_per_pause
        + notes.words() as f64 * config.seconds_per_word
}

/// Estimate the talk length, stopping at the first backup slide.
///
/// Returns `None` when more than two slides have no notes: a partial number
/// would be misleading.
pub fn estimate_presentation_length(deck: &Deck, config: &Config) -> Option<TimeEstimate> {
    let mut total = 0.0;
    let mut slides_without_notes = 0;
    let mut slide_times = Vec::new();
    let mut cumul_slide_times = Vec::new();

    for (index, slide) in deck.slides.iter().enumerate() {
        let notes = SpeakerNotes::parse(slide.notes.as_deref().unwrap_or_default());
        if notes.is_empty() {
            slides_without_notes += 1;
        }
        if slides_without_notes > MAX_SLIDES_WITHOUT_NOTES {
            log::debug!("Slide {}: too many slides without notes to estimate", index + 1);
            return None;
        }

        if slide.is_backup() {
            break;
        }

        cumul_slide_times.push(format_hms(total));
        let seconds = slide_seconds(&notes, config);
        total += seconds + config.seconds_between_slides;
        slide_times.push(format_ms(seconds));
    }

    Some(TimeEstimate {
        total: format_hms(total),
        slide_times,
        cumul_slide_times,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::deck;
    use crate::types::Slide;

    fn config() -> Config {
        Config {
            seconds_per_word: 0.5,
            seconds_per_pause: 1.0,
            seconds_per_break: 3.0,
            seconds_between_slides: 2.0,
            ..Config::default()
        }
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_hms(0.0), "00:00:00");
        assert_eq!(format_hms(3725.9), "01:02:05");
        assert_eq!(format_ms(65.2), "01:05");
        assert_eq!(format_ms(3600.0 + 5.0), "00:05");
    }

    #[test]
    fn test_slide_seconds() {
        let notes = SpeakerNotes::parse("One two three. Four! [break]");
        // 3 s break + 2 pauses + 4 words
        assert_eq!(slide_seconds(&notes, &config()), 3.0 + 2.0 + 2.0);
    }

    #[test]
    fn test_all_slides_with_notes() {
        let slides = (0..5).map(|_| Slide::new().with_notes("Hello world.")).collect();
        let estimate = estimate_presentation_length(&deck(slides), &config()).unwrap();
        // Each slide: 1 pause + 2 words = 2 s, plus 2 s between slides.
        assert_eq!(estimate.total, "00:00:20");
        assert_eq!(estimate.slide_times, vec!["00:02"; 5]);
        assert_eq!(
            estimate.cumul_slide_times,
            vec!["00:00:00", "00:00:04", "00:00:08", "00:00:12", "00:00:16"]
        );
    }

    #[test]
    fn test_too_many_slides_without_notes() {
        let slides = vec![
            Slide::new().with_notes("Hello world."),
            Slide::new(),
            Slide::new().with_notes("   "),
            Slide::new().with_notes("Hello world."),
            Slide::new(),
        ];
        assert_eq!(estimate_presentation_length(&deck(slides), &config()), None);
    }

    #[test]
    fn test_break_only_notes_count_as_notes() {
        let slides = vec![
            Slide::new(),
            Slide::new().with_notes("[break]"),
            Slide::new().with_notes("[pause]"),
            Slide::new(),
        ];
        let estimate = estimate_presentation_length(&deck(slides), &config()).unwrap();
        // Two breaks of 3 s plus 2 s between each of the four slides.
        assert_eq!(estimate.total, "00:00:14");
        assert_eq!(estimate.slide_times, vec!["00:00", "00:03", "00:03", "00:00"]);
    }

    #[test]
    fn test_two_slides_without_notes_tolerated() {
        let slides = vec![
            Slide::new(),
            Slide::new().with_notes("Hello world."),
            Slide::new(),
        ];
        let estimate = estimate_presentation_length(&deck(slides), &config()).unwrap();
        assert_eq!(estimate.slide_times.len(), 3);
    }

    #[test]
    fn test_stops_at_backup() {
        let slides = vec![
            Slide::new().with_notes("Hello world."),
            Slide::new().with_notes("Hello world."),
            Slide::new().with_title("Backup").with_notes("Extra."),
            Slide::new().with_notes("Never timed."),
        ];
        let estimate = estimate_presentation_length(&deck(slides), &config()).unwrap();
        assert_eq!(estimate.slide_times.len(), 2);
        assert_eq!(estimate.total, "00:00:08");
    }
}
