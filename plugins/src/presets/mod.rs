//! Ready-made report pipelines.

pub mod contract;
pub mod market;

use std::fmt;
use std::str::FromStr;

use dossier_core::artifacts::SpiderChart;
use dossier_core::config::ReportConfig;
use dossier_core::error::ExecutorError;
use dossier_core::pipeline::{Pipeline, Variables};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Market,
    Contract,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Market, Preset::Contract];

    pub fn name(self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Contract => "contract",
        }
    }

    /// Variables every template of the preset needs.
    pub fn required_variables(self) -> &'static [&'static str] {
        match self {
            Self::Market => market::VARIABLES,
            Self::Contract => &[],
        }
    }

    pub fn pipeline(self, report: &ReportConfig) -> Result<Pipeline, ExecutorError> {
        match self {
            Self::Market => market::pipeline(report),
            Self::Contract => contract::pipeline(report),
        }
    }

    /// Document title for one invocation.
    pub fn title(self, vars: &Variables, document_name: Option<&str>) -> String {
        match self {
            Self::Market => market::title(vars),
            Self::Contract => contract::title(document_name),
        }
    }

    pub fn charts(self, report: &ReportConfig) -> Vec<SpiderChart> {
        match self {
            Self::Market => report.charts.iter().map(SpiderChart::from).collect(),
            Self::Contract => Vec::new(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown preset '{s}' (expected market or contract)"))
    }
}

/// Make configuration text safe to embed in a prompt template.
pub(crate) fn literal(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}
