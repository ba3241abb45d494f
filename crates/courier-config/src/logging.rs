//! Log output formats for courier processes.
//!
//! `courierd` reads the format from `COURIER_LOG_FORMAT`, `--log-format`, or
//! the `log_format` key of its configuration file. Deployments behind a log
//! shipper keep the JSON default so controller and request span fields stay
//! machine readable; `compact` suits a developer tailing one service.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Output formats supported by the service log subscriber.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, for log shippers.
    #[default]
    Json,
    /// Single-line human output for terminals.
    Compact,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;
