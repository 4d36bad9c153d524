//! Declarative per-site extraction configuration.
//!
//! A [`SiteConfig`] describes how to pull review records out of one family of
//! saved pages: how candidate review-text nodes are matched, how the
//! enclosing review container is found, and which pattern rule fills each
//! output column. Per-site behavior is data, not code — the built-in presets
//! and any JSON config file share one schema and drive the same engine.
//!
//! Configurations are validated and compiled (regexes, tag selector) up
//! front; a malformed config is a [`ConfigError`] before any document is
//! touched.

use std::fs;
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::review::{REVIEW_TEXT_COLUMN, USERNAME_COLUMN};

/// Built-in preset names, in menu order.
pub const PRESET_NAMES: &[&str] = &["yelp", "tripadvisor", "google", "custom"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid pattern for {context}: {source}")]
    InvalidPattern {
        context: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid candidate tag '{tag}'")]
    InvalidTag { tag: String },

    #[error("output columns must include '{column}'")]
    MissingColumn { column: &'static str },

    #[error("alias references unknown column '{column}'")]
    UnknownAliasColumn { column: String },

    #[error("max_ancestor_levels must be at least 1")]
    ZeroAncestorBudget,

    #[error("year filter range {start}..={end} is inverted")]
    InvertedYearRange { start: i32, end: i32 },

    #[error("unknown site preset '{name}'")]
    UnknownPreset { name: String },

    #[error("cannot read config file {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Rule matching candidate review-text nodes: a tag name plus any number of
/// exact attribute values and attribute regex patterns, all of which must
/// hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRule {
    pub tag: String,
    #[serde(default)]
    pub attr_equals: Vec<AttrEquals>,
    #[serde(default)]
    pub attr_patterns: Vec<AttrPattern>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttrEquals {
    pub attr: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttrPattern {
    pub attr: String,
    pub pattern: String,
}

/// Rule locating the author-identity element: validates a container choice
/// and supplies the username text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRule {
    pub tag: String,
    pub attr: String,
    pub pattern: String,
}

/// One output column paired with the rule that fills it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub column: String,
    #[serde(flatten)]
    pub rule: FieldRule,
}

/// The extraction rule kinds. Columns without a rule are left blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldRule {
    /// Regex over the container's space-joined text; first capture group if
    /// present, else the whole match.
    Text { pattern: String },
    /// Case-insensitive regex over a descendant attribute (e.g. an
    /// accessibility label); the value is the first digit run of the first
    /// matching attribute.
    Attribute { attr: String, pattern: String },
    /// Regex over every class token of every descendant, with an integer
    /// divide applied to the captured number (`bubble_50` -> `5`).
    ClassToken {
        pattern: String,
        #[serde(default = "default_divisor")]
        divide_by: u32,
    },
    /// Regex with two or three digit groups over the container text,
    /// rendered as `"N reviews, M photos"`. Heuristic: the digit runs have
    /// no structural anchor and can match unrelated numbers.
    Composite { pattern: String },
    /// Exact tag + attribute value locating a badge element; the value is
    /// its trimmed text.
    Badge {
        tag: String,
        attr: String,
        value: String,
    },
}

/// Mirror one extracted column into a second output column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldAlias {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YearFilter {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub start_year: i32,
    #[serde(default)]
    pub end_year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,
    pub review_text: MatchRule,
    #[serde(default)]
    pub container_tag: Option<String>,
    #[serde(default = "default_ancestor_levels")]
    pub max_ancestor_levels: usize,
    pub identity: IdentityRule,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    pub columns: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<FieldAlias>,
    #[serde(default)]
    pub year_filter: YearFilter,
    #[serde(default)]
    pub output_file: Option<String>,
}

fn default_file_pattern() -> String {
    "*.html".to_string()
}

fn default_ancestor_levels() -> usize {
    10
}

fn default_divisor() -> u32 {
    10
}

impl SiteConfig {
    /// Look up a built-in preset by name (case-insensitive).
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name.to_ascii_lowercase().as_str() {
            "yelp" => Ok(presets::yelp()),
            "tripadvisor" => Ok(presets::tripadvisor()),
            "google" => Ok(presets::google()),
            "custom" => Ok(presets::custom()),
            _ => Err(ConfigError::UnknownPreset {
                name: name.to_string(),
            }),
        }
    }

    /// Load a configuration from a JSON file sharing the preset schema.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::File {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate the configuration and compile its patterns for extraction.
    pub fn compile(&self) -> Result<CompiledConfig, ConfigError> {
        for required in [USERNAME_COLUMN, REVIEW_TEXT_COLUMN] {
            if !self.columns.iter().any(|c| c == required) {
                return Err(ConfigError::MissingColumn { column: required });
            }
        }
        if self.max_ancestor_levels == 0 {
            return Err(ConfigError::ZeroAncestorBudget);
        }
        for alias in &self.aliases {
            for column in [&alias.source, &alias.target] {
                if !self.columns.iter().any(|c| c == column) {
                    return Err(ConfigError::UnknownAliasColumn {
                        column: column.clone(),
                    });
                }
            }
        }
        let year_range = if self.year_filter.enabled {
            let (start, end) = (self.year_filter.start_year, self.year_filter.end_year);
            if start > end {
                return Err(ConfigError::InvertedYearRange { start, end });
            }
            Some((start, end))
        } else {
            None
        };

        let selector = Selector::parse(&self.review_text.tag).map_err(|_| {
            ConfigError::InvalidTag {
                tag: self.review_text.tag.clone(),
            }
        })?;
        let attr_patterns = self
            .review_text
            .attr_patterns
            .iter()
            .map(|p| {
                compile_pattern(&p.pattern, &format!("candidate attribute '{}'", p.attr))
                    .map(|re| (p.attr.clone(), re))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let identity = CompiledIdentityRule {
            tag: self.identity.tag.clone(),
            attr: self.identity.attr.clone(),
            pattern: compile_pattern(&self.identity.pattern, "identity rule")?,
        };

        let fields = self
            .fields
            .iter()
            .map(|f| Ok((f.column.clone(), compile_field_rule(&f.column, &f.rule)?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(CompiledConfig {
            name: self.name.clone(),
            file_pattern: self.file_pattern.clone(),
            candidate_rule: CompiledMatchRule {
                selector,
                attr_equals: self
                    .review_text
                    .attr_equals
                    .iter()
                    .map(|e| (e.attr.clone(), e.value.clone()))
                    .collect(),
                attr_patterns,
            },
            container_tag: self.container_tag.clone(),
            max_ancestor_levels: self.max_ancestor_levels,
            identity,
            fields,
            columns: self.columns.clone(),
            aliases: self.aliases.clone(),
            year_range,
            output_file: self.output_file.clone(),
        })
    }
}

fn compile_pattern(pattern: &str, context: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        context: context.to_string(),
        source,
    })
}

fn compile_field_rule(column: &str, rule: &FieldRule) -> Result<CompiledFieldRule, ConfigError> {
    let context = format!("field '{column}'");
    Ok(match rule {
        FieldRule::Text { pattern } => CompiledFieldRule::Text(compile_pattern(pattern, &context)?),
        FieldRule::Attribute { attr, pattern } => CompiledFieldRule::Attribute {
            attr: attr.clone(),
            pattern: RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| ConfigError::InvalidPattern {
                    context,
                    source,
                })?,
        },
        FieldRule::ClassToken { pattern, divide_by } => CompiledFieldRule::ClassToken {
            pattern: compile_pattern(pattern, &context)?,
            divide_by: *divide_by,
        },
        FieldRule::Composite { pattern } => {
            CompiledFieldRule::Composite(compile_pattern(pattern, &context)?)
        }
        FieldRule::Badge { tag, attr, value } => CompiledFieldRule::Badge {
            tag: tag.clone(),
            attr: attr.clone(),
            value: value.clone(),
        },
    })
}

/// A [`SiteConfig`] with its patterns compiled, ready to drive extraction.
#[derive(Debug, Clone)]
pub struct CompiledConfig {
    pub name: String,
    pub file_pattern: String,
    pub candidate_rule: CompiledMatchRule,
    pub container_tag: Option<String>,
    pub max_ancestor_levels: usize,
    pub identity: CompiledIdentityRule,
    pub fields: Vec<(String, CompiledFieldRule)>,
    pub columns: Vec<String>,
    pub aliases: Vec<FieldAlias>,
    /// `Some((start, end))` when the year filter is enabled.
    pub year_range: Option<(i32, i32)>,
    pub output_file: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CompiledMatchRule {
    pub selector: Selector,
    pub attr_equals: Vec<(String, String)>,
    pub attr_patterns: Vec<(String, Regex)>,
}

impl CompiledMatchRule {
    /// Whether an element satisfies every attribute constraint. The tag is
    /// matched by the selector, not here.
    pub fn attrs_match(&self, element: ElementRef<'_>) -> bool {
        let value = element.value();
        self.attr_equals
            .iter()
            .all(|(attr, expected)| value.attr(attr) == Some(expected.as_str()))
            && self
                .attr_patterns
                .iter()
                .all(|(attr, pattern)| value.attr(attr).is_some_and(|v| pattern.is_match(v)))
    }
}

#[derive(Debug, Clone)]
pub struct CompiledIdentityRule {
    pub tag: String,
    pub attr: String,
    pub pattern: Regex,
}

impl CompiledIdentityRule {
    pub fn matches(&self, element: ElementRef<'_>) -> bool {
        let value = element.value();
        value.name() == self.tag
            && value.attr(&self.attr).is_some_and(|v| self.pattern.is_match(v))
    }
}

#[derive(Debug, Clone)]
pub enum CompiledFieldRule {
    Text(Regex),
    Attribute { attr: String, pattern: Regex },
    ClassToken { pattern: Regex, divide_by: u32 },
    Composite(Regex),
    Badge { tag: String, attr: String, value: String },
}

/// Built-in site presets. These are data: the same engine runs all of them.
pub mod presets {
    use super::*;

    fn text(column: &str, pattern: &str) -> FieldSpec {
        FieldSpec {
            column: column.to_string(),
            rule: FieldRule::Text {
                pattern: pattern.to_string(),
            },
        }
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    /// Yelp review pages: review text in `<span lang="en" class="raw...">`,
    /// one `<li>` per review, usernames behind `/user_details` profile
    /// links, star rating in an accessibility label, Elite badge mirrored
    /// into two columns.
    pub fn yelp() -> SiteConfig {
        SiteConfig {
            name: "yelp".to_string(),
            file_pattern: "*.html".to_string(),
            review_text: MatchRule {
                tag: "span".to_string(),
                attr_equals: vec![AttrEquals {
                    attr: "lang".to_string(),
                    value: "en".to_string(),
                }],
                attr_patterns: vec![AttrPattern {
                    attr: "class".to_string(),
                    pattern: "raw".to_string(),
                }],
            },
            container_tag: Some("li".to_string()),
            max_ancestor_levels: 10,
            identity: IdentityRule {
                tag: "a".to_string(),
                attr: "href".to_string(),
                pattern: "/user_details".to_string(),
            },
            fields: vec![
                text(
                    "from",
                    r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?,\s*[A-Z]{2})\b",
                ),
                text(
                    "written_date",
                    r"((?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+\d{1,2},\s+\d{4})",
                ),
                FieldSpec {
                    column: "rating".to_string(),
                    rule: FieldRule::Attribute {
                        attr: "aria-label".to_string(),
                        pattern: r"\d+\s*star".to_string(),
                    },
                },
                text("daya_tarik_wisata", r"Helpful\s*(\d+)"),
                FieldSpec {
                    column: "contribution".to_string(),
                    rule: FieldRule::Composite {
                        pattern: r"(\d+)\s*(\d+)\s*(\d+)".to_string(),
                    },
                },
                FieldSpec {
                    column: "status".to_string(),
                    rule: FieldRule::Badge {
                        tag: "a".to_string(),
                        attr: "href".to_string(),
                        value: "/elite".to_string(),
                    },
                },
            ],
            columns: columns(&[
                "username",
                "from",
                "written_date",
                "rating",
                "title",
                "review_text",
                "tema_pengalaman",
                "daya_tarik_wisata",
                "status",
                "contribution",
            ]),
            aliases: vec![FieldAlias {
                source: "status".to_string(),
                target: "tema_pengalaman".to_string(),
            }],
            year_filter: YearFilter {
                enabled: true,
                start_year: 2019,
                end_year: 2025,
            },
            output_file: Some("yelp_reviews.csv".to_string()),
        }
    }

    /// TripAdvisor review pages: rating encoded in a `bubble_NN` class.
    pub fn tripadvisor() -> SiteConfig {
        SiteConfig {
            name: "tripadvisor".to_string(),
            file_pattern: "*.html".to_string(),
            review_text: MatchRule {
                tag: "div".to_string(),
                attr_equals: vec![],
                attr_patterns: vec![AttrPattern {
                    attr: "class".to_string(),
                    pattern: "review-text".to_string(),
                }],
            },
            container_tag: Some("div".to_string()),
            max_ancestor_levels: 5,
            identity: IdentityRule {
                tag: "a".to_string(),
                attr: "class".to_string(),
                pattern: "member".to_string(),
            },
            fields: vec![
                text("from", r"\b([A-Za-z\s]+,\s*[A-Za-z\s]+)\b"),
                text(
                    "written_date",
                    r"((?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{4})",
                ),
                FieldSpec {
                    column: "rating".to_string(),
                    rule: FieldRule::ClassToken {
                        pattern: r"bubble_(\d+)".to_string(),
                        divide_by: 10,
                    },
                },
                text("daya_tarik_wisata", r"(\d+)\s*helpful"),
            ],
            columns: columns(&[
                "username",
                "from",
                "written_date",
                "rating",
                "title",
                "review_text",
                "tema_pengalaman",
                "daya_tarik_wisata",
            ]),
            aliases: vec![],
            year_filter: YearFilter {
                enabled: true,
                start_year: 2019,
                end_year: 2025,
            },
            output_file: Some("tripadvisor_reviews.csv".to_string()),
        }
    }

    /// Google review pages: relative dates ("3 years ago"), so the year
    /// filter stays off.
    pub fn google() -> SiteConfig {
        SiteConfig {
            name: "google".to_string(),
            file_pattern: "*.html".to_string(),
            review_text: MatchRule {
                tag: "span".to_string(),
                attr_equals: vec![],
                attr_patterns: vec![AttrPattern {
                    attr: "class".to_string(),
                    pattern: "review-content".to_string(),
                }],
            },
            container_tag: Some("div".to_string()),
            max_ancestor_levels: 8,
            identity: IdentityRule {
                tag: "div".to_string(),
                attr: "class".to_string(),
                pattern: "reviewer-name".to_string(),
            },
            fields: vec![
                text("from", r"Local Guide"),
                text(
                    "written_date",
                    r"(\d+\s*(?:day|week|month|year)s?\s*ago)",
                ),
                FieldSpec {
                    column: "rating".to_string(),
                    rule: FieldRule::Attribute {
                        attr: "aria-label".to_string(),
                        pattern: r"(\d+)\s*stars?".to_string(),
                    },
                },
            ],
            columns: columns(&["username", "from", "written_date", "rating", "review_text"]),
            aliases: vec![],
            year_filter: YearFilter::default(),
            output_file: Some("google_reviews.csv".to_string()),
        }
    }

    /// Template for a new site; adjust the rules to the page family.
    pub fn custom() -> SiteConfig {
        SiteConfig {
            name: "custom".to_string(),
            file_pattern: "*.html".to_string(),
            review_text: MatchRule {
                tag: "div".to_string(),
                attr_equals: vec![],
                attr_patterns: vec![AttrPattern {
                    attr: "class".to_string(),
                    pattern: "review".to_string(),
                }],
            },
            container_tag: Some("div".to_string()),
            max_ancestor_levels: 5,
            identity: IdentityRule {
                tag: "span".to_string(),
                attr: "class".to_string(),
                pattern: "username".to_string(),
            },
            fields: vec![
                text("from", r"([A-Za-z\s]+,\s*[A-Za-z\s]+)"),
                text("written_date", r"(\w+\s+\d+,\s+\d{4})"),
                FieldSpec {
                    column: "rating".to_string(),
                    rule: FieldRule::Attribute {
                        attr: "aria-label".to_string(),
                        pattern: r"\d+\s*star".to_string(),
                    },
                },
            ],
            columns: columns(&["username", "from", "written_date", "rating", "review_text"]),
            aliases: vec![],
            year_filter: YearFilter::default(),
            output_file: Some("custom_reviews.csv".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_presets_compile() {
        for name in PRESET_NAMES {
            let config = SiteConfig::preset(name).unwrap();
            assert_eq!(&config.name, name);
            config.compile().unwrap();
        }
    }

    #[test]
    fn unknown_preset_is_an_error() {
        assert!(matches!(
            SiteConfig::preset("myspace"),
            Err(ConfigError::UnknownPreset { .. })
        ));
    }

    #[test]
    fn missing_review_text_column_fails_compile() {
        let mut config = presets::yelp();
        config.columns.retain(|c| c != REVIEW_TEXT_COLUMN);
        assert!(matches!(
            config.compile(),
            Err(ConfigError::MissingColumn { column: "review_text" })
        ));
    }

    #[test]
    fn invalid_field_pattern_fails_compile() {
        let mut config = presets::yelp();
        config.fields.push(FieldSpec {
            column: "title".to_string(),
            rule: FieldRule::Text {
                pattern: "([unclosed".to_string(),
            },
        });
        assert!(matches!(
            config.compile(),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn alias_to_unknown_column_fails_compile() {
        let mut config = presets::yelp();
        config.aliases.push(FieldAlias {
            source: "status".to_string(),
            target: "no_such_column".to_string(),
        });
        assert!(matches!(
            config.compile(),
            Err(ConfigError::UnknownAliasColumn { .. })
        ));
    }

    #[test]
    fn inverted_year_range_fails_compile() {
        let mut config = presets::yelp();
        config.year_filter.start_year = 2030;
        assert!(matches!(
            config.compile(),
            Err(ConfigError::InvertedYearRange { .. })
        ));
    }

    #[test]
    fn zero_ancestor_budget_fails_compile() {
        let mut config = presets::yelp();
        config.max_ancestor_levels = 0;
        assert!(matches!(
            config.compile(),
            Err(ConfigError::ZeroAncestorBudget)
        ));
    }

    #[test]
    fn disabled_year_filter_compiles_to_no_range() {
        let compiled = presets::google().compile().unwrap();
        assert_eq!(compiled.year_range, None);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = presets::tripadvisor();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SiteConfig = serde_json::from_str(&json).unwrap();
        parsed.compile().unwrap();
        assert_eq!(parsed.name, "tripadvisor");
        assert_eq!(parsed.max_ancestor_levels, 5);
    }
}
