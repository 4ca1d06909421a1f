use thiserror::Error;

use crate::validation::Violation;

/// Local, pre-submit rejection of an event draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn messages(&self) -> Vec<&'static str> {
        self.violations.iter().map(|v| v.message()).collect()
    }
}

fn render_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.message())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_messages_in_order() {
        let err = ValidationError::new(vec![Violation::TitleRequired, Violation::GuestsNotPositive]);
        assert_eq!(
            err.to_string(),
            "Title is required. Total guests must be greater than zero."
        );
    }
}
