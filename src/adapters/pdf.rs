//! One-page PDF health report rendered with `printpdf`.

use std::io::BufWriter;

use chrono::{DateTime, Utc};
use printpdf::path::PaintMode;
use printpdf::*;
use serde_json::{Map, Value};

use crate::domain::{parse_number, Condition, RiskPercent, RiskTriple, Vital};

pub const REPORT_FILE_NAME: &str = "healix_report.pdf";

const MISSING: &str = "N/A";
const LINE_WIDTH: usize = 90;
const MAX_TEXT_LINES: usize = 2;
const MAX_REDUCTION_LINES: usize = 3;
/// A box turns red above this percentage.
const RED_ABOVE: u8 = 50;
const DISCLAIMER: &str =
    "Disclaimer: This is an AI-generated estimate. Please consult a doctor for medical advice.";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("PDF font error: {0}")]
    Font(String),

    #[error("PDF save error: {0}")]
    Save(String),
}

/// Everything printed on the report, already reduced to display strings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub username: String,
    pub generated_at: DateTime<Utc>,
    /// `(vital, display value)` in fixed order; missing values read `N/A`.
    pub metrics: Vec<(Vital, String)>,
    pub risks: RiskTriple,
    pub causes: String,
    pub reduction_steps: String,
    pub diet_plan: String,
    pub recommendation: String,
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => MISSING.to_string(),
    }
}

fn text_or_missing(payload: &Map<String, Value>, key: &str) -> String {
    match payload.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => MISSING.to_string(),
    }
}

impl ReportDocument {
    /// Build from a download request body (the shape `/predict` returns).
    #[must_use]
    pub fn from_payload(payload: &Map<String, Value>, username: &str, generated_at: DateTime<Utc>) -> Self {
        let estimates = payload.get("estimates").and_then(Value::as_object);
        let metrics = Vital::ALL
            .iter()
            .map(|v| (*v, display_value(estimates.and_then(|e| e.get(v.key())))))
            .collect();

        let risk = |key: &str| {
            payload
                .get(key)
                .and_then(parse_number)
                .map(RiskPercent::from_percentage)
                .unwrap_or_default()
        };

        Self {
            username: username.to_string(),
            generated_at,
            metrics,
            risks: RiskTriple::new(risk("diabetes"), risk("heart"), risk("kidney")),
            causes: text_or_missing(payload, "causes"),
            reduction_steps: text_or_missing(payload, "reduction_steps"),
            diet_plan: text_or_missing(payload, "diet_plan"),
            recommendation: text_or_missing(payload, "recommendation"),
        }
    }

    fn metric(&self, vital: Vital) -> &str {
        self.metrics
            .iter()
            .find(|(v, _)| *v == vital)
            .map_or(MISSING, |(_, s)| s.as_str())
    }
}

/// Greedy word wrap; words longer than `width` are split.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Built-in PDF fonts only cover Latin-1; anything else prints as `?`.
fn printable(text: &str) -> String {
    text.chars()
        .map(|c| if (' '..='\u{ff}').contains(&c) && !c.is_control() { c } else { '?' })
        .collect()
}

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn metric_label(vital: Vital) -> &'static str {
    match vital {
        Vital::Age => "Age",
        Vital::Bmi => "BMI",
        Vital::Bp => "Blood Pressure",
        Vital::Glucose => "Glucose",
        Vital::Chol => "Cholesterol",
        Vital::MaxHeartRate => "Max Heart Rate",
    }
}

fn metric_unit(vital: Vital) -> &'static str {
    match vital {
        Vital::Age | Vital::Bmi => "",
        Vital::Bp => " mmHg",
        Vital::Glucose | Vital::Chol => " mg/dL",
        Vital::MaxHeartRate => " bpm",
    }
}

/// Render the report to PDF bytes.
///
/// # Errors
/// Returns error if fonts cannot be registered or the document cannot be written.
pub fn render_report(report: &ReportDocument) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) = PdfDocument::new("HEALIX AI Health Report", Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Font(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Font(e.to_string()))?;
    let oblique = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|e| ReportError::Font(e.to_string()))?;

    let black = rgb(0.0, 0.0, 0.0);
    let mut y = Mm(280.0);

    // Title
    layer.set_fill_color(rgb(0.0, 0.39, 0.0));
    layer.use_text("HEALIX AI - Health Report", 24.0, Mm(18.0), y, &bold);
    y -= Mm(16.0);

    layer.set_fill_color(black.clone());
    layer.use_text(format!("User: {}", printable(&report.username)), 12.0, Mm(18.0), y, &font);
    y -= Mm(7.0);
    layer.use_text(
        format!("Date: {}", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
        12.0,
        Mm(18.0),
        y,
        &font,
    );
    y -= Mm(14.0);

    // Metrics, two columns
    layer.use_text("Health Metrics Used:", 14.0, Mm(18.0), y, &bold);
    y -= Mm(9.0);
    for pair in Vital::ALL.chunks(2) {
        for (column, vital) in pair.iter().enumerate() {
            let x = if column == 0 { Mm(25.0) } else { Mm(88.0) };
            let text = format!(
                "{}: {}{}",
                metric_label(*vital),
                printable(report.metric(*vital)),
                metric_unit(*vital)
            );
            layer.use_text(text, 12.0, x, y, &font);
        }
        y -= Mm(7.0);
    }
    y -= Mm(10.0);

    // Risk boxes
    layer.use_text("Risk Analysis Results:", 14.0, Mm(18.0), y, &bold);
    y -= Mm(6.0);
    let box_top = y;
    for (i, condition) in Condition::ALL.iter().enumerate() {
        let x = 18.0 + 60.0 * i as f32;
        let risk = report.risks.get(*condition);

        layer.set_outline_color(rgb(0.5, 0.5, 0.5));
        layer.set_fill_color(rgb(0.96, 0.96, 0.96));
        layer.add_rect(
            Rect::new(Mm(x), box_top - Mm(18.0), Mm(x + 53.0), box_top).with_mode(PaintMode::FillStroke),
        );

        layer.set_fill_color(black.clone());
        layer.use_text(format!("{} Risk", condition.label()), 12.0, Mm(x + 4.0), box_top - Mm(6.0), &bold);

        let color = if risk.value() > RED_ABOVE {
            rgb(0.8, 0.0, 0.0)
        } else {
            rgb(0.0, 0.5, 0.0)
        };
        layer.set_fill_color(color);
        layer.use_text(risk.to_string(), 14.0, Mm(x + 4.0), box_top - Mm(14.0), &bold);
    }
    y = box_top - Mm(30.0);
    layer.set_fill_color(black);

    let section = |title: &str, lines: Vec<String>, y: &mut Mm| {
        layer.use_text(title, 12.0, Mm(18.0), *y, &bold);
        *y -= Mm(5.5);
        for line in lines {
            layer.use_text(printable(&line), 11.0, Mm(18.0), *y, &font);
            *y -= Mm(5.0);
        }
        *y -= Mm(6.0);
    };

    let two_lines = |text: &str| -> Vec<String> {
        wrap_text(text, LINE_WIDTH).into_iter().take(MAX_TEXT_LINES).collect()
    };

    section("Potential Causes:", two_lines(&report.causes), &mut y);
    section(
        "How to Reduce Risk:",
        report
            .reduction_steps
            .lines()
            .filter(|l| !l.trim().is_empty())
            .take(MAX_REDUCTION_LINES)
            .map(|l| l.chars().take(LINE_WIDTH).collect())
            .collect(),
        &mut y,
    );
    section("Recommended Dietary Plan:", two_lines(&report.diet_plan), &mut y);
    section("General Recommendations:", two_lines(&report.recommendation), &mut y);

    layer.set_fill_color(rgb(0.5, 0.5, 0.5));
    layer.use_text(DISCLAIMER, 10.0, Mm(18.0), y, &oblique);

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Save(e.to_string()))?;
    buf.into_inner()
        .map_err(|e| ReportError::Save(e.to_string()))
}
