//! # Input Form
//!
//! One bounded slider per feature, grouped into Vitals / Lifestyle / Blood Tests.
//! Grouping is presentation only. Controls take their range from the reference
//! table and start at the reference mean.
//!
//! The form never scores on its own: a [`FeatureRecord`] is materialized only
//! from an explicit submission (the "Calculate Risk Score" trigger), and the
//! page is rendered server-side.

use html_escape::{encode_double_quoted_attribute, encode_text};
use std::collections::HashMap;
use std::fmt::Write as _;

use crate::engine::Assessment;
use crate::error::{Result, RiskError};
use crate::feature::{Category, Feature, FeatureRecord};
use crate::reference::{ReferenceTable, ValidRange};
use crate::report::REPORT_FILE_NAME;

pub const PAGE_TITLE: &str = "Hypertension Risk Score Estimator";
pub const TRIGGER_LABEL: &str = "Calculate Risk Score";
pub const DOWNLOAD_LABEL: &str = "Download Your Report as CSV";

/// Paths the rendered page posts to; must match the router.
pub const ASSESS_PATH: &str = "/assess";
pub const REPORT_PATH: &str = "/report.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub feature: Feature,
    pub label: String,
    pub range: ValidRange,
    pub default: f64,
}

impl Control {
    fn new(table: &ReferenceTable, feature: Feature) -> Self {
        let def = table.get(feature);
        Self {
            feature,
            label: format!("{} ({})", feature.display_name(), def.unit),
            range: def.range,
            default: def.mean,
        }
    }

    /// The value a slider would actually hold: clamped to `[min, max]` and
    /// snapped to the step grid anchored at `min`.
    pub fn snap(&self, v: f64) -> f64 {
        let ValidRange { min, max, step } = self.range;
        let clamped = v.clamp(min, max);
        let steps = ((clamped - min) / step).round();
        // Trim float noise from the multiplication (0.1 + 0.2 style drift).
        let snapped = ((min + steps * step) * 1e9).round() / 1e9;
        snapped.clamp(min, max)
    }

    /// Parse one submitted field.
    pub fn parse(&self, raw: &str) -> Result<f64> {
        let invalid = || RiskError::InvalidValue {
            feature: self.feature,
            raw: raw.to_string(),
        };
        let v: f64 = raw.trim().parse().map_err(|_| invalid())?;
        if !v.is_finite() {
            return Err(invalid());
        }
        Ok(self.snap(v))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormGroup {
    pub category: Category,
    pub controls: Vec<Control>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputForm {
    groups: Vec<FormGroup>,
}

impl InputForm {
    pub fn from_table(table: &ReferenceTable) -> Self {
        let groups = Category::ALL
            .into_iter()
            .map(|category| FormGroup {
                category,
                controls: category
                    .features()
                    .iter()
                    .map(|&f| Control::new(table, f))
                    .collect(),
            })
            .collect();
        Self { groups }
    }

    pub fn groups(&self) -> &[FormGroup] {
        &self.groups
    }

    pub fn controls(&self) -> impl Iterator<Item = &Control> + '_ {
        self.groups.iter().flat_map(|g| g.controls.iter())
    }

    pub fn control(&self, feature: Feature) -> Option<&Control> {
        self.controls().find(|c| c.feature == feature)
    }

    /// Slider start positions.
    pub fn defaults(&self) -> FeatureRecord {
        let mut slots = [None; Feature::COUNT];
        for c in self.controls() {
            slots[c.feature.index()] = Some(c.default);
        }
        FeatureRecord::from_fn(|f| slots[f.index()].unwrap_or_default())
    }

    /// Turn a submitted `name=value` map into a complete record.
    ///
    /// Unknown names and unparsable values are rejected; a missing field is a
    /// [`RiskError::MissingValue`] (the sliders always post every field).
    pub fn materialize(&self, submission: &HashMap<String, String>) -> Result<FeatureRecord> {
        let mut slots = [None; Feature::COUNT];
        for (name, raw) in submission {
            let feature = Feature::parse(name)?;
            let control = self
                .control(feature)
                .ok_or(RiskError::MissingValue(feature))?;
            slots[feature.index()] = Some(control.parse(raw)?);
        }
        FeatureRecord::from_slots(slots)
    }

    /// Full HTML page. `values` sets slider positions (defaults when `None`);
    /// `outcome` adds the score panel and download button.
    pub fn render(&self, values: Option<&FeatureRecord>, outcome: Option<&Assessment>) -> String {
        let values = values.copied().unwrap_or_else(|| self.defaults());
        let mut html = String::with_capacity(8 * 1024);

        let _ = write!(
            html,
            "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>{css}</style>\n</head>\n<body>\n<h1>🩺 {title}</h1>\n<p>This app estimates your <strong>Hypertension Risk Score</strong> based on lifestyle, vitals, and blood test inputs. Results are shown below with color-coded guidance.</p>\n",
            title = encode_text(PAGE_TITLE),
            css = PAGE_CSS,
        );

        let _ = write!(html, "<form method=\"post\" action=\"{ASSESS_PATH}\">\n");
        for g in &self.groups {
            let _ = write!(
                html,
                "<fieldset class=\"tab\" id=\"{id}\">\n<legend>{icon} {title}</legend>\n",
                id = g.category.title().to_ascii_lowercase().replace(' ', "-"),
                icon = g.category.icon(),
                title = encode_text(g.category.title()),
            );
            for c in &g.controls {
                push_slider(&mut html, c, values.get(c.feature));
            }
            html.push_str("</fieldset>\n");
        }
        let _ = write!(
            html,
            "<button type=\"submit\">🔎 {}</button>\n</form>\n",
            encode_text(TRIGGER_LABEL)
        );

        if let Some(a) = outcome {
            push_outcome(&mut html, self, a);
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

fn push_slider(html: &mut String, c: &Control, value: f64) {
    let name = c.feature.name();
    let _ = write!(
        html,
        "<label for=\"{name}\">{label}</label>\n<input type=\"range\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\" oninput=\"this.nextElementSibling.value=this.value\">\n<output>{value}</output>\n",
        label = encode_text(&c.label),
        min = c.range.min,
        max = c.range.max,
        step = c.range.step,
        value = c.snap(value),
    );
}

fn push_outcome(html: &mut String, form: &InputForm, a: &Assessment) {
    let score = a.score();
    let severity = a.tier.severity();
    let _ = write!(
        html,
        "<section id=\"result\">\n<h2>🧮 Your Estimated Hypertension Risk Score: {score}/100</h2>\n<progress value=\"{progress}\" max=\"1\"></progress>\n<p class=\"tier {class}\">{icon} {message}</p>\n",
        progress = score.progress(),
        class = severity.css_class(),
        icon = a.tier.icon(),
        message = encode_text(a.tier.message()),
    );

    // Download re-posts the same inputs; the server rebuilds the report.
    let _ = write!(html, "<form method=\"post\" action=\"{REPORT_PATH}\">\n");
    for c in form.controls() {
        let _ = write!(
            html,
            "<input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
            c.feature.name(),
            encode_double_quoted_attribute(&a.record.get(c.feature).to_string()),
        );
    }
    let _ = write!(
        html,
        "<button type=\"submit\" title=\"{file}\">⬇️ {label}</button>\n</form>\n</section>\n",
        file = encode_double_quoted_attribute(REPORT_FILE_NAME),
        label = encode_text(DOWNLOAD_LABEL),
    );
}

const PAGE_CSS: &str = "body{font-family:sans-serif;max-width:46rem;margin:2rem auto;padding:0 1rem}\
fieldset.tab{margin:1rem 0;border-radius:.5rem}\
label{display:block;margin-top:.6rem}\
input[type=range]{width:80%}\
progress{width:100%;height:1.2rem}\
.tier{padding:.6rem;border-radius:.4rem}\
.success{background:#e6f4ea}.warning{background:#fff4e5}.error{background:#fdecea}";
