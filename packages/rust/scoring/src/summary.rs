//! Grand total and per-mark-value subtotals.

use serde::{Deserialize, Serialize};

use gatecalc_shared::EvaluationRow;

/// Questions sharing one maximum mark value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkGroup {
    pub max_marks: f64,
    pub questions: usize,
    pub earned: f64,
    pub possible: f64,
}

/// Aggregate result over all evaluation rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub total: f64,
    pub max_total: f64,
    /// Ascending by `max_marks`.
    pub groups: Vec<MarkGroup>,
}

impl ScoreSummary {
    pub fn from_rows(rows: &[EvaluationRow]) -> Self {
        let mut groups: Vec<MarkGroup> = Vec::new();

        for row in rows {
            match groups.iter_mut().find(|g| approx_eq(g.max_marks, row.max_marks)) {
                Some(group) => {
                    group.questions += 1;
                    group.earned += row.marks;
                    group.possible += row.max_marks;
                }
                None => groups.push(MarkGroup {
                    max_marks: row.max_marks,
                    questions: 1,
                    earned: row.marks,
                    possible: row.max_marks,
                }),
            }
        }
        groups.sort_by(|a, b| a.max_marks.total_cmp(&b.max_marks));

        Self {
            total: rows.iter().map(|r| r.marks).sum(),
            max_total: rows.iter().map(|r| r.max_marks).sum(),
            groups,
        }
    }

    /// The group for questions worth `max_marks`, if any question is.
    pub fn group(&self, max_marks: f64) -> Option<&MarkGroup> {
        self.groups.iter().find(|g| approx_eq(g.max_marks, max_marks))
    }
}

/// Relative comparison with a 1e-9 tolerance.
fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatecalc_shared::{QuestionType, ResponseStatus};

    fn row(q_no: u32, marks: f64, max_marks: f64) -> EvaluationRow {
        EvaluationRow {
            q_no,
            question_id: u64::from(q_no),
            q_type: QuestionType::Mcq,
            status: ResponseStatus::Answered,
            student_answer: "A".into(),
            correct_answer: "A".into(),
            marks,
            max_marks,
        }
    }

    #[test]
    fn groups_by_mark_value() {
        let rows = [
            row(1, 2.0, 2.0),
            row(2, 1.0, 1.0),
            row(3, -1.0 / 3.0, 1.0),
            row(4, 0.0, 2.0),
        ];
        let summary = ScoreSummary::from_rows(&rows);

        assert!((summary.total - (3.0 - 1.0 / 3.0)).abs() < 1e-12);
        assert_eq!(summary.max_total, 6.0);
        assert_eq!(summary.groups.len(), 2);
        assert_eq!(summary.groups[0].max_marks, 1.0);
        assert_eq!(summary.groups[0].questions, 2);
        assert_eq!(summary.groups[1].possible, 4.0);

        let two = summary.group(2.0).expect("two-mark group");
        assert_eq!(two.earned, 2.0);
        assert!(summary.group(3.0).is_none());
    }

    #[test]
    fn nearly_equal_marks_share_a_group() {
        let rows = [row(1, 1.0, 1.0), row(2, 0.0, 1.0 + 1e-12)];
        assert_eq!(ScoreSummary::from_rows(&rows).groups.len(), 1);
    }

    #[test]
    fn empty_rows_give_empty_summary() {
        assert_eq!(ScoreSummary::from_rows(&[]), ScoreSummary::default());
    }
}
