use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A 1-5 rating given by the judging model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ScoreNumber(u8);

impl TryFrom<u8> for ScoreNumber {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&value) {
            Ok(ScoreNumber(value))
        } else {
            Err(format!("score must be between 1 and 5, got {value}"))
        }
    }
}

impl From<ScoreNumber> for u8 {
    fn from(score: ScoreNumber) -> Self {
        score.0
    }
}

impl ScoreNumber {
    pub fn get(self) -> u8 {
        self.0
    }
}

/// `[score, explanation]`
pub type Score = (ScoreNumber, String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreType {
    Adequacy,
    Fluency,
    Terminology,
    Hallucination,
    Punctuation,
}

impl ScoreType {
    pub const ALL: [ScoreType; 5] = [
        ScoreType::Adequacy,
        ScoreType::Fluency,
        ScoreType::Terminology,
        ScoreType::Hallucination,
        ScoreType::Punctuation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreType::Adequacy => "adequacy",
            ScoreType::Fluency => "fluency",
            ScoreType::Terminology => "terminology",
            ScoreType::Hallucination => "hallucination",
            ScoreType::Punctuation => "punctuation",
        }
    }
}

impl Display for ScoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub src: String,
    pub trg: String,
    #[serde(rename = "ref")]
    pub reference: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub translation: Translation,
    pub scores: Option<BTreeMap<ScoreType, Score>>,
}

/// Written judgement per score type, from `summary.json`.
pub type Summary = BTreeMap<ScoreType, String>;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Analysis {
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Counts for scores 1 through 5.
    pub histogram: [usize; 5],
}

pub fn summarize(values: &[ScoreNumber]) -> Analysis {
    let mut histogram = [0usize; 5];
    for v in values {
        histogram[usize::from(v.get() - 1)] += 1;
    }

    let mut sorted: Vec<f64> = values.iter().map(|v| f64::from(v.get())).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let median = match sorted.len() {
        0 => None,
        n if n % 2 == 0 => Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0),
        n => Some(sorted[n / 2]),
    };
    let mean = if sorted.is_empty() {
        None
    } else {
        Some(sorted.iter().sum::<f64>() / sorted.len() as f64)
    };

    Analysis {
        count: values.len(),
        mean,
        median,
        histogram,
    }
}

/// Group scores by type and summarize each. Evaluations the judge didn't
/// score are skipped.
pub fn analyze_evals(evals: &[Evaluation]) -> BTreeMap<ScoreType, Analysis> {
    let mut by_type: BTreeMap<ScoreType, Vec<ScoreNumber>> =
        ScoreType::ALL.into_iter().map(|t| (t, Vec::new())).collect();

    let mut unscored = 0;
    for evaluation in evals {
        let Some(scores) = &evaluation.scores else {
            unscored += 1;
            continue;
        };
        for (score_type, (score, _)) in scores {
            by_type.entry(*score_type).or_default().push(*score);
        }
    }
    if unscored > 0 {
        log::debug!("{unscored} of {} evaluations have no scores", evals.len());
    }

    by_type
        .into_iter()
        .map(|(score_type, values)| (score_type, summarize(&values)))
        .collect()
}

fn histogram_bar(count: usize, total: usize, width: usize) -> String {
    if total == 0 {
        return String::new();
    }
    let filled = (count * width + total / 2) / total;
    "█".repeat(filled)
}

pub fn write_analysis(
    out: &mut impl Write,
    analysis: &BTreeMap<ScoreType, Analysis>,
    summary: &Summary,
) -> Result<()> {
    for (score_type, data) in analysis {
        let mean = data.mean.map(|m| format!("{m:.2}")).unwrap_or_else(|| "-".into());
        let median = data.median.map(|m| m.to_string()).unwrap_or_else(|| "-".into());
        let summary_text = summary.get(score_type).map(String::as_str).unwrap_or("-");

        writeln!(out, "{score_type}")?;
        writeln!(out, "  mean    {mean} – {summary_text}")?;
        writeln!(out, "  median  {median}")?;
        for (index, count) in data.histogram.iter().enumerate() {
            writeln!(
                out,
                "  {}  {:>5}  {}",
                index + 1,
                count,
                histogram_bar(*count, data.count, 40)
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}
