use serde::{Deserialize, Serialize};

/// adherence 対象 task の 1 日分の完了状況
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Adherence {
    /// No adherence-impacting task existed.
    NoTasks,
    /// Tasks existed but nothing was scheduled that day.
    NoEvents,
    /// Average completion in `[0, 1]`.
    Progress(f64),
}

impl Adherence {
    /// `fractions` の平均（空なら `NoEvents`）
    pub fn from_fractions(fractions: &[f64]) -> Self {
        if fractions.is_empty() {
            return Adherence::NoEvents;
        }
        let average = fractions.iter().sum::<f64>() / fractions.len() as f64;
        Adherence::Progress(average.clamp(0.0, 1.0))
    }

    pub fn progress(&self) -> Option<f64> {
        match self {
            Adherence::Progress(p) => Some(*p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_fractions_unweighted() {
        assert_eq!(Adherence::from_fractions(&[1.0, 0.5, 0.0]), Adherence::Progress(0.5));
        assert_eq!(Adherence::from_fractions(&[]), Adherence::NoEvents);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let v = serde_json::to_value(Adherence::Progress(0.25)).unwrap();
        assert_eq!(v["kind"], "progress");
        assert_eq!(v["value"], 0.25);

        let v = serde_json::to_value(Adherence::NoTasks).unwrap();
        assert_eq!(v["kind"], "no_tasks");
    }
}
