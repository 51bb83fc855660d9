use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Visual template of a printed or emailed voucher.
///
/// Parsed case-insensitively (`template3`, `TEMPLATE3`) and always
/// rendered in the canonical `Template{N}` form.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Template {
    #[default]
    Template1,
    Template2,
    Template3,
    Template4,
    Template5,
}

impl Template {
    /// Canonical wire name.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl TryFrom<String> for Template {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(value.trim())
    }
}
