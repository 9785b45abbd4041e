//! HTML report formatter
//!
//! A standalone page rendered with Tera. Autoescaping is on, so project
//! names, paths and failure reasons are always escaped.

use super::ReportFormatter;
use crate::report::error::ReportResult;
use crate::report::evidence::EvidenceReport;
use crate::report::format::ReportFormat;
use serde::Serialize;
use tera::{Context, Tera};

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{{ title }}</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 1200px;
            margin: 0 auto;
            padding: 20px;
            background: #f5f5f5;
        }
        .container {
            background: white;
            border-radius: 8px;
            padding: 20px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }
        h1 {
            color: #2c3e50;
            border-bottom: 2px solid #3498db;
            padding-bottom: 10px;
        }
        .result {
            margin: 20px 0;
            padding: 15px;
            border-left: 4px solid #3498db;
            background: #f8f9fa;
        }
        .project-name {
            font-weight: 600;
            font-size: 1.2em;
            color: #2c3e50;
        }
        .file-link {
            margin-left: 20px;
            padding: 3px 0;
        }
        .lines {
            color: #7f8c8d;
            margin-left: 10px;
        }
        .no-results {
            padding: 20px;
            text-align: center;
            color: #7f8c8d;
        }
        .banner {
            padding: 10px 15px;
            margin: 15px 0;
            border-radius: 4px;
            background: #fdecea;
            border: 1px solid #e74c3c;
        }
        .failures li {
            font-family: 'Courier New', monospace;
            font-size: 0.9em;
        }
        .metadata {
            font-size: 0.9em;
            color: #7f8c8d;
            font-style: italic;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>{{ title }}</h1>
        <p class="metadata">Generated on {{ generated_at }} from <a href="{{ base_url }}">{{ base_url }}</a></p>
{% if fatal %}
        <div class="banner fatal">Scan aborted: {{ fatal }}</div>
{% elif incomplete %}
        <div class="banner incomplete">Run incomplete: scanned {{ projects_scanned }} of {{ projects_total }} discovered projects before cancellation.</div>
{% endif %}
        <p>Found {{ file_count }} files with Keycloak configurations across {{ project_count }} projects.</p>
{% if projects %}
{% for project in projects %}
        <div class="result">
            <div class="project-name">{{ project.name }}</div>
            <div>Repository: <a href="{{ project.url }}">{{ project.url }}</a></div>
            <div>Files with Keycloak configurations:</div>
{% for file in project.files %}
            <div class="file-link">
                <a href="{{ file.url }}">{{ file.path }}</a><span class="lines">lines {{ file.lines }}</span>
            </div>
{% endfor %}
        </div>
{% endfor %}
{% else %}
        <div class="no-results">No Keycloak configurations found in any repositories.</div>
{% endif %}
{% if failures %}
        <h2>Recorded failures</h2>
        <ul class="failures">
{% for failure in failures %}
            <li>{{ failure }}</li>
{% endfor %}
        </ul>
{% endif %}
    </div>
</body>
</html>
"#;

#[derive(Serialize)]
struct PageFile<'a> {
    path: &'a str,
    url: &'a str,
    lines: String,
}

#[derive(Serialize)]
struct PageProject<'a> {
    name: &'a str,
    url: &'a str,
    files: Vec<PageFile<'a>>,
}

#[derive(Serialize)]
struct Page<'a> {
    title: &'a str,
    generated_at: String,
    base_url: &'a str,
    file_count: usize,
    project_count: usize,
    projects_total: usize,
    projects_scanned: usize,
    projects: Vec<PageProject<'a>>,
    failures: Vec<String>,
    incomplete: bool,
    fatal: Option<&'a str>,
}

pub struct HtmlFormatter {
    title: String,
}

impl Default for HtmlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlFormatter {
    pub fn new() -> Self {
        Self {
            title: "Keycloak Configuration Search Report".to_string(),
        }
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    fn page<'a>(&'a self, report: &'a EvidenceReport) -> Page<'a> {
        let projects = report
            .records
            .iter()
            .map(|record| PageProject {
                name: &record.project_name,
                url: &record.repository_url,
                files: record
                    .files()
                    .map(|(path, url, lines)| PageFile {
                        path,
                        url,
                        lines: lines
                            .iter()
                            .map(|n| n.to_string())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
                    .collect(),
            })
            .collect();

        Page {
            title: &self.title,
            generated_at: report.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            base_url: &report.base_url,
            file_count: report.file_count(),
            project_count: report.project_count(),
            projects_total: report.projects_total,
            projects_scanned: report.projects_scanned,
            projects,
            failures: report.failures.iter().map(|f| f.to_string()).collect(),
            incomplete: report.incomplete,
            fatal: report.fatal.as_deref(),
        }
    }
}

impl ReportFormatter for HtmlFormatter {
    fn format(&self, report: &EvidenceReport) -> ReportResult<String> {
        let context = Context::from_serialize(self.page(report))?;
        Ok(Tera::one_off(TEMPLATE, &context, true)?)
    }

    fn format_type(&self) -> ReportFormat {
        ReportFormat::Html
    }
}
