//! Result types for pairwise testing and regression.

use crate::correct::CorrectionMethod;
use crate::error::Result;
use crate::model::lm::LinearFit;
use crate::test::PValueResult;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Star-style significance classification of a p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignificanceSymbol {
    /// p < 0.001
    ThreeStars,
    /// p < 0.01
    TwoStars,
    /// p < 0.05
    OneStar,
    /// Not significant
    NotSignificant,
    /// Not determined (NaN)
    NotDetermined,
}

impl SignificanceSymbol {
    /// Classify a p-value.
    pub fn from_pvalue(p: f64) -> Self {
        if p.is_nan() {
            Self::NotDetermined
        } else if p < 0.001 {
            Self::ThreeStars
        } else if p < 0.01 {
            Self::TwoStars
        } else if p < 0.05 {
            Self::OneStar
        } else {
            Self::NotSignificant
        }
    }

    /// Symbol drawn above a comparison bracket.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::ThreeStars => "***",
            Self::TwoStars => "**",
            Self::OneStar => "*",
            Self::NotSignificant => "ns",
            Self::NotDetermined => "nd",
        }
    }
}

/// Render a p-value either as stars or as `label = 0.0123` / `label < 0.0001`.
pub fn render_pvalue(p: f64, numeric: bool, label: &str) -> String {
    if p.is_nan() || !numeric {
        return SignificanceSymbol::from_pvalue(p).symbol().to_string();
    }
    if p >= 0.0001 {
        format!("{} = {:.4}", label, p)
    } else {
        format!("{} < 0.0001", label)
    }
}

/// Annotation text for one comparison.
///
/// Degenerate results show their short reason label. When a corrected value
/// is available the text reads `p | q`.
pub fn annotation(p: &PValueResult, q: Option<f64>, numeric: bool) -> String {
    let p_value = match p {
        PValueResult::Value(v) => *v,
        PValueResult::NotDetermined(reason) => return reason.short_label().to_string(),
    };
    let p_text = render_pvalue(p_value, numeric, "p");
    match q {
        Some(q) => format!("{} | {}", p_text, render_pvalue(q, numeric, "q")),
        None => p_text,
    }
}

/// One row of a pairwise p-value table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PValueRow {
    pub compound: String,
    /// Isotopologue label when rows are per `(Compound, C_Label)`.
    pub c_label: Option<i64>,
    /// Uncorrected results, one per comparison.
    pub p_values: Vec<PValueResult>,
    /// Corrected values, one per comparison; NaN where not determined.
    pub q_values: Vec<f64>,
}

/// Wide table of p- and q-values: one row per compound, one column pair per comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PValueTable {
    /// Comparison labels (`"A vs B"`), in column order.
    pub comparisons: Vec<String>,
    pub method: CorrectionMethod,
    pub rows: Vec<PValueRow>,
}

impl PValueTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn cell(
        &self,
        compound: &str,
        c_label: Option<i64>,
        comparison: &str,
    ) -> Option<(&PValueRow, usize)> {
        let col = self.comparisons.iter().position(|c| c == comparison)?;
        let row = self
            .rows
            .iter()
            .find(|r| r.compound == compound && r.c_label == c_label)?;
        Some((row, col))
    }

    /// Uncorrected result for a compound and comparison label.
    pub fn get_p(
        &self,
        compound: &str,
        c_label: Option<i64>,
        comparison: &str,
    ) -> Option<&PValueResult> {
        self.cell(compound, c_label, comparison)
            .map(|(row, col)| &row.p_values[col])
    }

    /// Corrected value for a compound and comparison label.
    pub fn get_q(&self, compound: &str, c_label: Option<i64>, comparison: &str) -> Option<f64> {
        self.cell(compound, c_label, comparison)
            .map(|(row, col)| row.q_values[col])
    }

    /// Column headers for TSV output.
    pub fn headers(&self) -> Vec<String> {
        let mut header = vec!["Compound".to_string()];
        if self.rows.iter().any(|r| r.c_label.is_some()) {
            header.push("C_Label".to_string());
        }
        for label in &self.comparisons {
            header.push(format!("p | {}", label));
            if self.method != CorrectionMethod::None {
                header.push(format!("q | {} ({})", label, self.method.name()));
            }
        }
        header
    }

    /// Write the table to a TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.to_writer(BufWriter::new(file))
    }

    /// Write the table as TSV to any writer.
    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        let with_labels = self.rows.iter().any(|r| r.c_label.is_some());
        writeln!(writer, "{}", self.headers().join("\t"))?;
        for row in &self.rows {
            let mut fields = vec![row.compound.clone()];
            if with_labels {
                fields.push(row.c_label.map(|l| l.to_string()).unwrap_or_default());
            }
            for (p, q) in row.p_values.iter().zip(&row.q_values) {
                fields.push(format_float(p.p_value()));
                if self.method != CorrectionMethod::None {
                    fields.push(format_float(*q));
                }
            }
            writeln!(writer, "{}", fields.join("\t"))?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Outcome of regressing one compound on an external variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressionOutcome {
    Fitted(LinearFit),
    /// Not determined, with the reason shown to the user.
    NotDetermined(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionRecord {
    pub compound: String,
    pub outcome: RegressionOutcome,
}

impl RegressionRecord {
    /// The fit, if one was determined.
    pub fn fit(&self) -> Option<&LinearFit> {
        match &self.outcome {
            RegressionOutcome::Fitted(fit) => Some(fit),
            RegressionOutcome::NotDetermined(_) => None,
        }
    }

    /// The reason a fit is missing.
    pub fn nd_reason(&self) -> Option<&str> {
        match &self.outcome {
            RegressionOutcome::Fitted(_) => None,
            RegressionOutcome::NotDetermined(reason) => Some(reason),
        }
    }
}

/// Regression results of every compound against one variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionSet {
    pub variable: String,
    pub records: Vec<RegressionRecord>,
}

impl RegressionSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record for a compound.
    pub fn get(&self, compound: &str) -> Option<&RegressionRecord> {
        self.records.iter().find(|r| r.compound == compound)
    }

    /// Write results to a TSV file.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "Compound\tslope\tintercept\tr_value\tr_squared\tp_value\tstd_err\tND Reason"
        )?;
        for record in &self.records {
            match &record.outcome {
                RegressionOutcome::Fitted(fit) => writeln!(
                    writer,
                    "{}\t{:.6}\t{:.6}\t{:.4}\t{:.4}\t{:.2e}\t{:.6}\t",
                    record.compound,
                    fit.slope,
                    fit.intercept,
                    fit.r_value,
                    fit.r_squared(),
                    fit.p_value,
                    fit.std_err
                )?,
                RegressionOutcome::NotDetermined(reason) => {
                    writeln!(writer, "{}\t\t\t\t\t\t\t{}", record.compound, reason)?
                }
            }
        }
        writer.flush()?;
        Ok(())
    }
}

fn format_float(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{:.6e}", value)
    }
}
