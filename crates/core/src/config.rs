use serde::Deserialize;
use std::path::Path;

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `CAMPAIGN_REPORT__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub document: DocumentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_group_by")]
    pub group_by: String,
}

/// Physical layout of exported documents. Lengths are in millimetres,
/// the font size in points.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    #[serde(default = "default_page_width_mm")]
    pub page_width_mm: f64,
    #[serde(default = "default_page_height_mm")]
    pub page_height_mm: f64,
    #[serde(default = "default_margin_mm")]
    pub margin_mm: f64,
    #[serde(default = "default_bottom_margin_mm")]
    pub bottom_margin_mm: f64,
    #[serde(default = "default_font_size_pt")]
    pub font_size_pt: f64,
    #[serde(default = "default_repeat_header")]
    pub repeat_header: bool,
}

// Default functions
fn default_data_path() -> String {
    "marketing_data.csv".to_string()
}
fn default_title() -> String {
    "Marketing Analytics Report".to_string()
}
fn default_group_by() -> String {
    "channel".to_string()
}
fn default_page_width_mm() -> f64 {
    210.0
}
fn default_page_height_mm() -> f64 {
    297.0
}
fn default_margin_mm() -> f64 {
    10.0
}
fn default_bottom_margin_mm() -> f64 {
    20.0
}
fn default_font_size_pt() -> f64 {
    12.0
}
fn default_repeat_header() -> bool {
    true
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            group_by: default_group_by(),
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            page_width_mm: default_page_width_mm(),
            page_height_mm: default_page_height_mm(),
            margin_mm: default_margin_mm(),
            bottom_margin_mm: default_bottom_margin_mm(),
            font_size_pt: default_font_size_pt(),
            repeat_header: default_repeat_header(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `file`, or from `campaign-report.toml` if
    /// present, then `CAMPAIGN_REPORT__*` environment variables. An
    /// explicitly named file must exist.
    pub fn load_from(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("campaign-report").required(false),
        };

        let builder = config::Config::builder().add_source(file_source).add_source(
            config::Environment::with_prefix("CAMPAIGN_REPORT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
