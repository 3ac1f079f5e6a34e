//! Platform and category tags
//!
//! Both are closed enumerations; every per-platform capability is selected by
//! matching on these rather than by comparing strings at runtime.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A remote catalog platform hosting models and datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Huggingface,
    ModelScope,
}

impl Platform {
    /// Canonical name used in output directory names and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Huggingface => "huggingface",
            Self::ModelScope => "modelscope",
        }
    }

    /// Parses a platform name, accepting a few common aliases
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "huggingface" | "hf" => Some(Self::Huggingface),
            "modelscope" | "ms" => Some(Self::ModelScope),
            _ => None,
        }
    }

    /// Default API endpoint
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Huggingface => "https://huggingface.co",
            Self::ModelScope => "https://modelscope.cn",
        }
    }

    /// Whether this platform can crawl items of the given category
    pub fn supports(&self, category: Category) -> bool {
        match self {
            Self::Huggingface => true,
            Self::ModelScope => category == Category::Model,
        }
    }

    pub fn all() -> [Self; 2] {
        [Self::Huggingface, Self::ModelScope]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown platform '{}'", s))
    }
}

/// Kind of item being crawled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Model,
    Dataset,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Dataset => "dataset",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "model" | "models" => Some(Self::Model),
            "dataset" | "datasets" => Some(Self::Dataset),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown category '{}'", s))
    }
}
