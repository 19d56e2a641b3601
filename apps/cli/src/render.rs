//! Score output: CSV-style detail lines and totals, or the JSON report.

use std::fmt::Write as _;
use std::str::FromStr;

use gatecalc_core::EvaluationReport;

/// Output format for `gatecalc score`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

const DETAIL_HEADER: &str = "q_no,qid,type,status,student,correct,marks";

/// Render the text report: optional per-question lines, then totals.
pub(crate) fn render_text(report: &EvaluationReport, detailed: bool) -> String {
    let mut out = String::new();

    if detailed {
        let _ = writeln!(out, "{DETAIL_HEADER}");
        for row in &report.rows {
            let _ = writeln!(
                out,
                "{},{},{},{},{},{},{:.2}",
                row.q_no,
                row.question_id,
                row.q_type,
                row.status,
                row.student_answer,
                row.correct_answer,
                row.marks
            );
        }
    }

    let summary = &report.summary;
    let _ = writeln!(
        out,
        "Total Marks: {:.2} / {:.2}",
        summary.total, summary.max_total
    );
    for group in &summary.groups {
        let _ = writeln!(
            out,
            "{}-mark questions subtotal: {:.2}",
            mark_label(group.max_marks),
            group.earned
        );
    }

    out
}

/// Render the full report as pretty-printed JSON.
pub(crate) fn render_json(report: &EvaluationReport) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(json)
}

fn mark_label(marks: f64) -> String {
    if marks.fract() == 0.0 {
        format!("{marks:.0}")
    } else {
        marks.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatecalc_core::SourceDigests;
    use gatecalc_scoring::{Evaluation, PairingDiagnostics};
    use gatecalc_shared::{EvaluationRow, QuestionType, ResponseStatus};

    fn report() -> EvaluationReport {
        let row = |q_no: u32, q_type: QuestionType, student: &str, correct: &str, marks: f64, max: f64| {
            EvaluationRow {
                q_no,
                question_id: 6_402_741_000 + u64::from(q_no),
                q_type,
                status: if student == "--" {
                    ResponseStatus::NotAnswered
                } else {
                    ResponseStatus::Answered
                },
                student_answer: student.into(),
                correct_answer: correct.into(),
                marks,
                max_marks: max,
            }
        };
        let evaluation = Evaluation {
            rows: vec![
                row(1, QuestionType::Mcq, "C", "B", -1.0 / 3.0, 1.0),
                row(2, QuestionType::Msq, "A;C", "A;C", 2.0, 2.0),
                row(3, QuestionType::Nat, "--", "1 to 2", 0.0, 2.0),
            ],
            pairing: PairingDiagnostics::default(),
        };
        EvaluationReport::new(evaluation, SourceDigests::default())
    }

    #[test]
    fn summary_only_by_default() {
        let text = render_text(&report(), false);
        assert_eq!(
            text,
            "Total Marks: 1.67 / 5.00\n\
             1-mark questions subtotal: -0.33\n\
             2-mark questions subtotal: 2.00\n"
        );
    }

    #[test]
    fn detailed_lists_every_row() {
        let text = render_text(&report(), true);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], DETAIL_HEADER);
        assert_eq!(lines[1], "1,6402741001,MCQ,Answered,C,B,-0.33");
        assert_eq!(lines[2], "2,6402741002,MSQ,Answered,A;C,A;C,2.00");
        assert_eq!(lines[3], "3,6402741003,NAT,Not Answered,--,1 to 2,0.00");
        assert!(lines[4].starts_with("Total Marks:"));
    }

    #[test]
    fn json_contains_rows_and_summary() {
        let json = render_json(&report()).expect("render");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value["rows"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["rows"][0]["q_type"], "MCQ");
        assert_eq!(value["summary"]["groups"][1]["max_marks"], 2.0);
    }

    #[test]
    fn output_format_parses_config_values() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn mark_labels() {
        assert_eq!(mark_label(1.0), "1");
        assert_eq!(mark_label(2.0), "2");
        assert_eq!(mark_label(1.5), "1.5");
    }
}
