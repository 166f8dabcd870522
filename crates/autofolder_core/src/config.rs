//! Save-hook configuration.
//!
//! # Responsibility
//! - Accept the host's loosely typed, string-keyed properties.
//! - Turn them into one validated [`AutofolderConfig`] before any store work.
//!
//! # Invariants
//! - At least one parent template is configured.
//! - The generated-folder template is never one of the parent templates,
//!   otherwise a generated folder would itself qualify as a new parent.
//! - Every alias/title format renders non-empty output.

use crate::date_format::{validate_format, DateFormatError};
use crate::model::resource::TemplateId;
use chrono::{Datelike, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

static LIST_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*,\s*").expect("valid list separator regex"));

const DEFAULT_FOLDER_STRUCTURE: &str = "y/m";
const DEFAULT_DATE_FIELD: &str = "publishedon";

/// Configuration failure. Aborts the hook before the store is touched.
#[derive(Debug)]
pub enum ConfigError {
    /// No usable parent template id was supplied.
    MissingParentTemplates,
    /// Generated folders would use a parent template.
    GeneratedTemplateIsParent(TemplateId),
    /// A template list entry is not an integer.
    InvalidTemplateId { property: &'static str, value: String },
    /// Folder structure contains a token other than `y`, `m` or `d`.
    UnknownFolderPart(String),
    /// No date field is configured.
    MissingDateFields,
    /// One alias/title format cannot be rendered.
    InvalidFormat {
        property: &'static str,
        source: DateFormatError,
    },
    /// Property file could not be read.
    Io(std::io::Error),
    /// Property file is not valid TOML for [`AutofolderProperties`].
    Parse(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingParentTemplates => write!(f, "no valid parent template ids supplied"),
            Self::GeneratedTemplateIsParent(id) => write!(
                f,
                "generated template {id} must not be one of the parent templates"
            ),
            Self::InvalidTemplateId { property, value } => {
                write!(f, "invalid template id `{value}` in `{property}`")
            }
            Self::UnknownFolderPart(token) => write!(
                f,
                "unknown folder structure token `{token}`; expected y|m|d"
            ),
            Self::MissingDateFields => write!(f, "at least one date field is required"),
            Self::InvalidFormat { property, source } => write!(f, "`{property}`: {source}"),
            Self::Io(err) => write!(f, "failed to read properties: {err}"),
            Self::Parse(err) => write!(f, "failed to parse properties: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidFormat { source, .. } => Some(source),
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

/// One level of the generated folder hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FolderPart {
    Year,
    Month,
    Day,
}

impl FolderPart {
    /// Parses one structure token (`y`, `m`, `d`, case-insensitive).
    pub fn parse(token: &str) -> Result<Self, ConfigError> {
        match token.trim().to_ascii_lowercase().as_str() {
            "y" => Ok(Self::Year),
            "m" => Ok(Self::Month),
            "d" => Ok(Self::Day),
            other => Err(ConfigError::UnknownFolderPart(other.to_string())),
        }
    }

    /// Token used in the `folder_structure` property.
    pub fn token(self) -> &'static str {
        match self {
            Self::Year => "y",
            Self::Month => "m",
            Self::Day => "d",
        }
    }

    /// Numeric date component used as the generated folder's menu index.
    ///
    /// Keeps siblings in chronological order regardless of creation order.
    pub fn menu_index(self, date: &NaiveDateTime) -> i64 {
        match self {
            Self::Year => i64::from(date.year()),
            Self::Month => i64::from(date.month()),
            Self::Day => i64::from(date.day()),
        }
    }
}

/// Parses a slash-separated structure such as `"y/m/d"`.
///
/// Blank segments are dropped, so `""` yields an empty structure.
pub fn parse_folder_structure(value: &str) -> Result<Vec<FolderPart>, ConfigError> {
    value
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(FolderPart::parse)
        .collect()
}

/// Alias and title format for one folder level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPair {
    pub alias: String,
    pub title: String,
}

impl FormatPair {
    fn new(alias: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            title: title.into(),
        }
    }
}

/// Per-level alias/title formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartFormats {
    pub year: FormatPair,
    pub month: FormatPair,
    pub day: FormatPair,
}

impl Default for PartFormats {
    fn default() -> Self {
        Self {
            year: FormatPair::new("Y", "Y"),
            month: FormatPair::new("m", "F"),
            day: FormatPair::new("d", "d"),
        }
    }
}

impl PartFormats {
    /// Returns the format pair configured for `part`.
    pub fn for_part(&self, part: FolderPart) -> &FormatPair {
        match part {
            FolderPart::Year => &self.year,
            FolderPart::Month => &self.month,
            FolderPart::Day => &self.day,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (property, format) in [
            ("year_alias_format", &self.year.alias),
            ("year_title_format", &self.year.title),
            ("month_alias_format", &self.month.alias),
            ("month_title_format", &self.month.title),
            ("day_alias_format", &self.day.alias),
            ("day_title_format", &self.day.title),
        ] {
            validate_format(format)
                .map_err(|source| ConfigError::InvalidFormat { property, source })?;
        }
        Ok(())
    }
}

/// Raw hook properties as the host stores them.
///
/// Lists are comma separated; the folder structure is slash separated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AutofolderProperties {
    pub parent_templates: String,
    pub generated_template: String,
    pub folder_structure: String,
    pub filter_templates: String,
    pub date_fields: String,
    pub year_alias_format: String,
    pub year_title_format: String,
    pub month_alias_format: String,
    pub month_title_format: String,
    pub day_alias_format: String,
    pub day_title_format: String,
}

impl Default for AutofolderProperties {
    fn default() -> Self {
        let formats = PartFormats::default();
        Self {
            parent_templates: String::new(),
            generated_template: String::new(),
            folder_structure: DEFAULT_FOLDER_STRUCTURE.to_string(),
            filter_templates: String::new(),
            date_fields: DEFAULT_DATE_FIELD.to_string(),
            year_alias_format: formats.year.alias,
            year_title_format: formats.year.title,
            month_alias_format: formats.month.alias,
            month_title_format: formats.month.title,
            day_alias_format: formats.day.alias,
            day_title_format: formats.day.title,
        }
    }
}

impl AutofolderProperties {
    /// Parses properties from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    /// Reads properties from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_toml_str(&text)
    }
}

/// Validated hook configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutofolderConfig {
    /// Templates whose resources receive generated date folders.
    pub parent_templates: Vec<TemplateId>,
    /// Template assigned to generated folders.
    pub generated_template: TemplateId,
    /// Folder levels, outermost first.
    pub folder_structure: Vec<FolderPart>,
    /// Item templates the hook acts on. Empty means "act on nothing".
    pub filter_templates: Vec<TemplateId>,
    /// Date field per parent template, matched by position.
    pub date_fields: Vec<String>,
    pub formats: PartFormats,
}

impl AutofolderConfig {
    /// Builds and validates configuration from raw properties.
    pub fn from_properties(props: &AutofolderProperties) -> Result<Self, ConfigError> {
        let mut date_fields = split_list(&props.date_fields)
            .map(str::to_string)
            .collect::<Vec<_>>();
        if date_fields.is_empty() {
            date_fields.push(DEFAULT_DATE_FIELD.to_string());
        }

        let generated_template = match props.generated_template.trim() {
            "" => 0,
            value => parse_template_id("generated_template", value)?,
        };

        let config = Self {
            parent_templates: parse_template_list("parent_templates", &props.parent_templates)?,
            generated_template,
            folder_structure: parse_folder_structure(&props.folder_structure)?,
            filter_templates: parse_template_list("filter_templates", &props.filter_templates)?,
            date_fields,
            formats: PartFormats {
                year: FormatPair::new(&props.year_alias_format, &props.year_title_format),
                month: FormatPair::new(&props.month_alias_format, &props.month_title_format),
                day: FormatPair::new(&props.day_alias_format, &props.day_title_format),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parent_templates.is_empty() {
            return Err(ConfigError::MissingParentTemplates);
        }
        if self.parent_templates.contains(&self.generated_template) {
            return Err(ConfigError::GeneratedTemplateIsParent(
                self.generated_template,
            ));
        }
        if self.date_fields.is_empty() {
            return Err(ConfigError::MissingDateFields);
        }
        self.formats.validate()
    }

    /// Whether an item with `template` is handled by the hook.
    pub fn filters_template(&self, template: TemplateId) -> bool {
        self.filter_templates.contains(&template)
    }

    /// Whether a parent with `template` receives generated folders.
    pub fn is_parent_template(&self, template: TemplateId) -> bool {
        self.parent_templates.contains(&template)
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    LIST_SEPARATOR_RE
        .split(value.trim())
        .filter(|item| !item.is_empty())
}

// Zero is the host's "no template" value and is dropped from lists.
fn parse_template_list(
    property: &'static str,
    value: &str,
) -> Result<Vec<TemplateId>, ConfigError> {
    let mut ids = Vec::new();
    for item in split_list(value) {
        let id = parse_template_id(property, item)?;
        if id != 0 {
            ids.push(id);
        }
    }
    Ok(ids)
}

fn parse_template_id(property: &'static str, value: &str) -> Result<TemplateId, ConfigError> {
    value
        .trim()
        .parse::<TemplateId>()
        .map_err(|_| ConfigError::InvalidTemplateId {
            property,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::{
        parse_folder_structure, AutofolderConfig, AutofolderProperties, ConfigError, FolderPart,
    };
    use chrono::NaiveDate;

    fn props(parents: &str, generated: &str) -> AutofolderProperties {
        AutofolderProperties {
            parent_templates: parents.to_string(),
            generated_template: generated.to_string(),
            filter_templates: "3".to_string(),
            ..AutofolderProperties::default()
        }
    }

    #[test]
    fn defaults_match_host_property_defaults() {
        let config = AutofolderConfig::from_properties(&props("2", "5")).unwrap();
        assert_eq!(
            config.folder_structure,
            vec![FolderPart::Year, FolderPart::Month]
        );
        assert_eq!(config.date_fields, vec!["publishedon".to_string()]);
        assert_eq!(config.formats.month.alias, "m");
        assert_eq!(config.formats.month.title, "F");
    }

    #[test]
    fn template_lists_trim_and_drop_zero() {
        let config = AutofolderConfig::from_properties(&props(" 2, 4 ,0,,6", "")).unwrap();
        assert_eq!(config.parent_templates, vec![2, 4, 6]);
        assert_eq!(config.generated_template, 0);
    }

    #[test]
    fn empty_parent_templates_are_rejected() {
        let err = AutofolderConfig::from_properties(&props(" , 0", "5")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingParentTemplates));
    }

    #[test]
    fn generated_template_colliding_with_parent_is_rejected() {
        let err = AutofolderConfig::from_properties(&props("2,4", "4")).unwrap_err();
        assert!(matches!(err, ConfigError::GeneratedTemplateIsParent(4)));
    }

    #[test]
    fn non_numeric_template_is_rejected() {
        let err = AutofolderConfig::from_properties(&props("2,blog", "5")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidTemplateId { property: "parent_templates", ref value } if value == "blog"
        ));
    }

    #[test]
    fn folder_structure_parsing() {
        assert_eq!(
            parse_folder_structure(" Y / m /d ").unwrap(),
            vec![FolderPart::Year, FolderPart::Month, FolderPart::Day]
        );
        assert!(parse_folder_structure("").unwrap().is_empty());
        assert!(matches!(
            parse_folder_structure("y/w"),
            Err(ConfigError::UnknownFolderPart(token)) if token == "w"
        ));
    }

    #[test]
    fn blank_format_is_rejected() {
        let mut raw = props("2", "5");
        raw.day_title_format = " ".to_string();
        let err = AutofolderConfig::from_properties(&raw).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidFormat {
                property: "day_title_format",
                ..
            }
        ));
    }

    #[test]
    fn blank_date_fields_fall_back_to_publishedon() {
        let mut raw = props("2", "5");
        raw.date_fields = " ".to_string();
        let config = AutofolderConfig::from_properties(&raw).unwrap();
        assert_eq!(config.date_fields, vec!["publishedon".to_string()]);
    }

    #[test]
    fn toml_properties_keep_defaults_for_missing_keys() {
        let raw = AutofolderProperties::from_toml_str(
            r#"
            parent_templates = "2,4"
            generated_template = "7"
            folder_structure = "y/m/d"
            date_fields = "publishedon,pub_date"
            "#,
        )
        .unwrap();
        assert_eq!(raw.filter_templates, "");
        assert_eq!(raw.month_title_format, "F");

        let config = AutofolderConfig::from_properties(&raw).unwrap();
        assert_eq!(config.folder_structure.len(), 3);
        assert_eq!(config.date_fields, vec!["publishedon", "pub_date"]);
    }

    #[test]
    fn menu_index_uses_numeric_component() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(FolderPart::Year.menu_index(&date), 2023);
        assert_eq!(FolderPart::Month.menu_index(&date), 6);
        assert_eq!(FolderPart::Day.menu_index(&date), 5);
    }
}
