//! Evidence pack artifacts: the JSON snapshot for download and the prefilled
//! mail links for assessor handoff and early access.

use chrono::{DateTime, SecondsFormat, Utc};
use shared::{
    domain::{CompanyInfo, ControlState, ControlStatus, ReadinessMetrics, ReadinessSnapshot},
    export::{ExportedControl, StructuredExport, EMPTY_NOTES_PLACEHOLDER},
};

use crate::{catalog::ControlCatalog, mailto::compose_link};

pub const EARLY_ACCESS_ADDRESS: &str = "rob@leanspace.co";
const EARLY_ACCESS_SUBJECT: &str = "Early access: Cyber Essentials Evidence Pack";
const HANDOFF_SUBJECT_PREFIX: &str = "Cyber Essentials Assessor Handoff – ";
const FILENAME_PREFIX: &str = "ce-evidence-pack-";
const FALLBACK_SLUG: &str = "export";

fn metrics_for(snapshot: &ReadinessSnapshot) -> ReadinessMetrics {
    ReadinessMetrics::new(
        snapshot.count_with_status(ControlStatus::Done),
        ControlCatalog::len(),
    )
}

pub fn build_snapshot_export(
    snapshot: &ReadinessSnapshot,
    now: DateTime<Utc>,
) -> StructuredExport {
    StructuredExport {
        exported_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        company: snapshot.company.clone(),
        readiness_summary: metrics_for(snapshot).summary(),
        controls: snapshot
            .controls
            .iter()
            .map(|control| ExportedControl {
                area: control.area,
                control: control.label.clone(),
                status: control.status,
                notes: if control.notes.is_empty() {
                    EMPTY_NOTES_PLACEHOLDER.to_string()
                } else {
                    control.notes.clone()
                },
            })
            .collect(),
    }
}

pub fn render_export_json(export: &StructuredExport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(export)
}

/// Lowercased company name with each whitespace run collapsed to `-`.
pub fn export_slug(company_name: &str) -> String {
    if company_name.is_empty() {
        return FALLBACK_SLUG.to_string();
    }

    let mut collapsed = String::with_capacity(company_name.len());
    let mut in_whitespace = false;
    for ch in company_name.chars() {
        if is_slug_whitespace(ch) {
            if !in_whitespace {
                collapsed.push('-');
            }
            in_whitespace = true;
        } else {
            collapsed.push(ch);
            in_whitespace = false;
        }
    }
    // Lowercase the whole string so context-sensitive mappings (final sigma) apply.
    collapsed.to_lowercase()
}

/// Unicode whitespace as ECMAScript `\s` sees it: U+FEFF counts, U+0085 does not.
fn is_slug_whitespace(ch: char) -> bool {
    (ch.is_whitespace() && ch != '\u{85}') || ch == '\u{feff}'
}

pub fn export_filename(company_name: &str) -> String {
    format!("{FILENAME_PREFIX}{}.json", export_slug(company_name))
}

fn control_line(control: &ControlState) -> String {
    let mut line = format!(
        "{} {}: {}",
        control.status.marker(),
        control.area,
        control.label
    );
    if !control.notes.is_empty() {
        line.push_str(" — ");
        line.push_str(&control.notes);
    }
    line
}

pub fn build_handoff_message(snapshot: &ReadinessSnapshot) -> String {
    let company = &snapshot.company;
    let mut lines = vec![
        "Hi,".to_string(),
        String::new(),
        "I'd like to arrange an assessor handoff for Cyber Essentials certification.".to_string(),
        String::new(),
        format!("Company: {}", company.name),
        format!("Contact: {}", company.email),
        format!("Readiness: {}", metrics_for(snapshot).summary()),
        String::new(),
        "Control summary:".to_string(),
    ];
    lines.extend(snapshot.controls.iter().map(control_line));
    lines.extend(
        [
            "",
            "I've also attached the JSON evidence pack.",
            "",
            "Please get in touch to arrange a call.",
            "",
            "Thanks",
        ]
        .map(String::from),
    );
    lines.join("\n")
}

/// `mailto:` link with no recipient, so the operator picks the assessor.
pub fn build_handoff_link(snapshot: &ReadinessSnapshot) -> String {
    let subject = format!("{HANDOFF_SUBJECT_PREFIX}{}", snapshot.company.name);
    compose_link("", &subject, &build_handoff_message(snapshot))
}

pub fn build_early_access_message(company: &CompanyInfo) -> String {
    build_early_access_link(EARLY_ACCESS_ADDRESS, company)
}

pub fn build_early_access_link(address: &str, company: &CompanyInfo) -> String {
    let name = non_empty_or(&company.name, "[your company]");
    let email = non_empty_or(&company.email, "[your email]");
    let body = format!(
        "Hi,\n\nI'm interested in the Cyber Essentials Evidence Pack Builder.\n\nCompany: {name}\nEmail: {email}\n\nPlease get in touch.\n\nThanks"
    );
    compose_link(address, EARLY_ACCESS_SUBJECT, &body)
}

fn non_empty_or<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}
