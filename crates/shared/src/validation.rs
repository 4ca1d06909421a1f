//! Presence and ordering rules applied to an event draft before it is sent.

use std::fmt;

use crate::protocol::{parse_calendar_date, EventDraft};

/// A single rule the draft breaks. Variants are declared in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Violation {
    TitleRequired,
    DescriptionRequired,
    StartDateRequired,
    EndDateRequired,
    EndBeforeStart,
    GuestsNotPositive,
    ImageRequired,
}

impl Violation {
    pub fn message(self) -> &'static str {
        match self {
            Violation::TitleRequired => "Title is required.",
            Violation::DescriptionRequired => "Description is required.",
            Violation::StartDateRequired => "Start date is required.",
            Violation::EndDateRequired => "End date is required.",
            Violation::EndBeforeStart => "End date cannot be before start date.",
            Violation::GuestsNotPositive => "Total guests must be greater than zero.",
            Violation::ImageRequired => "At least one image must be selected.",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Checks `draft` and returns every broken rule, in a fixed order.
///
/// A date that does not read as a calendar date counts as missing. An image
/// is required only when the event has none stored yet, so an edit of an
/// event that already owns images may leave the selection empty.
pub fn validate_draft(
    draft: &EventDraft,
    pending_images: usize,
    stored_images: usize,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    if draft.title.trim().is_empty() {
        violations.push(Violation::TitleRequired);
    }
    if draft.description.trim().is_empty() {
        violations.push(Violation::DescriptionRequired);
    }
    let start = parse_calendar_date(&draft.start_date);
    let end = parse_calendar_date(&draft.end_date);
    if start.is_none() {
        violations.push(Violation::StartDateRequired);
    }
    if end.is_none() {
        violations.push(Violation::EndDateRequired);
    }
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            violations.push(Violation::EndBeforeStart);
        }
    }
    if draft.total_guests <= 0 {
        violations.push(Violation::GuestsNotPositive);
    }
    if pending_images == 0 && stored_images == 0 {
        violations.push(Violation::ImageRequired);
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> EventDraft {
        EventDraft {
            title: "Launch".into(),
            description: "Kickoff".into(),
            start_date: "2024-01-01".into(),
            end_date: "2024-01-02".into(),
            total_guests: 5,
        }
    }

    #[test]
    fn valid_draft_with_image_has_no_violations() {
        assert!(validate_draft(&valid_draft(), 1, 0).is_empty());
    }

    #[test]
    fn empty_draft_reports_every_rule_in_order() {
        let violations = validate_draft(&EventDraft::default(), 0, 0);
        assert_eq!(
            violations,
            vec![
                Violation::TitleRequired,
                Violation::DescriptionRequired,
                Violation::StartDateRequired,
                Violation::EndDateRequired,
                Violation::GuestsNotPositive,
                Violation::ImageRequired,
            ]
        );
    }

    #[test]
    fn end_before_start_is_reported() {
        let draft = EventDraft {
            start_date: "2024-05-10".into(),
            end_date: "2024-05-01".into(),
            ..valid_draft()
        };
        assert_eq!(
            validate_draft(&draft, 1, 0),
            vec![Violation::EndBeforeStart]
        );
    }

    #[test]
    fn unreadable_dates_count_as_missing() {
        let draft = EventDraft {
            start_date: "2024-05-10".into(),
            end_date: "05/01/2024".into(),
            ..valid_draft()
        };
        assert_eq!(
            validate_draft(&draft, 1, 0),
            vec![Violation::EndDateRequired]
        );

        let draft = EventDraft {
            start_date: "soon".into(),
            end_date: "soon".into(),
            ..valid_draft()
        };
        assert_eq!(
            validate_draft(&draft, 1, 0),
            vec![Violation::StartDateRequired, Violation::EndDateRequired]
        );
    }

    #[test]
    fn same_day_event_is_allowed() {
        let draft = EventDraft {
            end_date: "2024-01-01".into(),
            ..valid_draft()
        };
        assert!(validate_draft(&draft, 1, 0).is_empty());
    }

    #[test]
    fn whitespace_only_text_counts_as_missing() {
        let draft = EventDraft {
            title: "   ".into(),
            description: "\n".into(),
            ..valid_draft()
        };
        assert_eq!(
            validate_draft(&draft, 1, 0),
            vec![Violation::TitleRequired, Violation::DescriptionRequired]
        );
    }

    #[test]
    fn stored_images_satisfy_image_rule() {
        assert!(validate_draft(&valid_draft(), 0, 2).is_empty());
        assert_eq!(
            validate_draft(&valid_draft(), 0, 0),
            vec![Violation::ImageRequired]
        );
    }

    #[test]
    fn validation_is_deterministic() {
        let draft = EventDraft {
            total_guests: -1,
            ..valid_draft()
        };
        assert_eq!(validate_draft(&draft, 0, 0), validate_draft(&draft, 0, 0));
    }
}
