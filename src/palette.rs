use log::warn;

use crate::records::Outcome;

/// Colour used for any category missing from a fixed lookup.
pub const FALLBACK_COLOR: &str = "#95a5a6";

pub fn outcome_color(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Yes => "#e74c3c",
        Outcome::No => "#27ae60",
    }
}

/// Work type categories known to the treemap colour table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkType {
    Private,
    SelfEmployed,
    Government,
    Children,
    NeverWorked,
}

impl WorkType {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Private" => Some(WorkType::Private),
            "Self-employed" => Some(WorkType::SelfEmployed),
            "Govt_job" => Some(WorkType::Government),
            "children" => Some(WorkType::Children),
            "Never_worked" => Some(WorkType::NeverWorked),
            _ => None,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            WorkType::Private => "#3498db",
            WorkType::SelfEmployed => "#9b59b6",
            WorkType::Government => "#f39c12",
            WorkType::Children => "#1abc9c",
            WorkType::NeverWorked => "#34495e",
        }
    }
}

/// Treemap colour for a work type label; unmapped labels get [`FALLBACK_COLOR`].
pub fn work_type_color(label: &str) -> &'static str {
    match WorkType::from_label(label) {
        Some(work_type) => work_type.color(),
        None => {
            warn!("no colour mapped for work type {:?}, using fallback", label);
            FALLBACK_COLOR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_work_types_have_distinct_colors() {
        let labels = ["Private", "Self-employed", "Govt_job", "children", "Never_worked"];
        let mut colors: Vec<&str> = labels.iter().map(|l| work_type_color(l)).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), labels.len());
        assert!(!colors.contains(&FALLBACK_COLOR));
    }

    #[test]
    fn unmapped_work_type_falls_back() {
        assert_eq!(work_type_color("Astronaut"), FALLBACK_COLOR);
    }

    #[test]
    fn outcome_colors_differ() {
        assert_ne!(outcome_color(Outcome::Yes), outcome_color(Outcome::No));
    }
}
