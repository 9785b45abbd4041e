//! Report formats

use std::path::Path;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Output format for the evidence report
#[derive(EnumIter, clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReportFormat {
    /// Top-level JSON array of project records
    #[default]
    Json,
    /// Standalone HTML page
    Html,
}

impl ReportFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Html => "html",
        }
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Json => &["jsn"],
            Self::Html => &["htm", "xhtml"],
        }
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::iter().map(|fmt| fmt.name())
    }

    /// Match a format name or extension, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        let lowercase = name.to_lowercase();
        Self::iter()
            .find(|fmt| fmt.name() == lowercase || fmt.aliases().contains(&lowercase.as_str()))
    }

    /// Detect the format from a file extension
    pub fn from_file_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }

    /// `report.json` or `report.html`
    pub fn default_output(&self) -> String {
        format!("report.{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_name() {
        assert_eq!(ReportFormat::from_name("json"), Some(ReportFormat::Json));
        assert_eq!(ReportFormat::from_name("HTML"), Some(ReportFormat::Html));
        assert_eq!(ReportFormat::from_name("htm"), Some(ReportFormat::Html));
        assert_eq!(ReportFormat::from_name("csv"), None);
    }

    #[test]
    fn test_format_from_file_path() {
        assert_eq!(
            ReportFormat::from_file_path(Path::new("out/report.html")),
            Some(ReportFormat::Html)
        );
        assert_eq!(
            ReportFormat::from_file_path(Path::new("findings.JSON")),
            Some(ReportFormat::Json)
        );
        assert_eq!(ReportFormat::from_file_path(Path::new("report")), None);
        assert_eq!(ReportFormat::from_file_path(Path::new("report.txt")), None);
    }

    #[test]
    fn test_default_output_names() {
        assert_eq!(ReportFormat::Json.default_output(), "report.json");
        assert_eq!(ReportFormat::Html.default_output(), "report.html");
        assert_eq!(ReportFormat::names().collect::<Vec<_>>(), vec!["json", "html"]);
    }
}
