//! Environment variables for configuring the default sink from services.
//!
//! These are purely helpers; [`LogSink`](crate::log_sink::LogSink) itself
//! never reads the environment.

use crate::encoder::{make_encoder, parse_format, FormatError};
use crate::option::{self, SinkOption};
use crate::output::SharedWriter;

/// Verbosity threshold, a non-negative integer.
pub const LOGERR_VERBOSITY_ENV: &str = "LOGERR_VERBOSITY";

/// Encoder name: `json` or `text`.
pub const LOGERR_FORMAT_ENV: &str = "LOGERR_FORMAT";

/// Output stream: `stdout` or `stderr`.
pub const LOGERR_OUTPUT_ENV: &str = "LOGERR_OUTPUT";

/// Error returned when an environment variable holds an unusable value.
#[derive(thiserror::Error, Debug)]
pub enum EnvError {
    #[error("{var}={value:?} is not a valid verbosity")]
    Verbosity {
        var: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("LOGERR_FORMAT: {0}")]
    Format(#[from] FormatError),

    #[error("{var}={value:?} is not a known output, expected \"stdout\" or \"stderr\"")]
    Output { var: &'static str, value: String },
}

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Sink options derived from the `LOGERR_*` variables.
pub fn options_from_env() -> Result<Vec<SinkOption>, EnvError> {
    options_from(|key| std::env::var(key).ok())
}

/// [`options_from_env`] with an explicit lookup, for callers that keep
/// configuration elsewhere.
pub fn options_from<F>(lookup: F) -> Result<Vec<SinkOption>, EnvError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut options = Vec::new();

    if let Some(value) = lookup(LOGERR_VERBOSITY_ENV) {
        let verbosity = value.trim().parse::<u32>().map_err(|source| EnvError::Verbosity {
            var: LOGERR_VERBOSITY_ENV,
            value: value.clone(),
            source,
        })?;
        options.push(option::verbosity(verbosity));
    }

    if let Some(value) = lookup(LOGERR_FORMAT_ENV) {
        options.push(option::encoder(make_encoder(parse_format(&value)?)));
    }

    if let Some(value) = lookup(LOGERR_OUTPUT_ENV) {
        let output = match value.trim().to_ascii_lowercase().as_str() {
            "stdout" => SharedWriter::stdout(),
            "stderr" => SharedWriter::stderr(),
            _ => {
                return Err(EnvError::Output {
                    var: LOGERR_OUTPUT_ENV,
                    value,
                })
            }
        };
        options.push(option::output(output));
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Fields;
    use crate::log_sink::LogSink;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn unset_variables_add_nothing() {
        assert!(options_from(lookup(&[])).unwrap().is_empty());
    }

    #[test]
    fn verbosity_and_format_are_applied() {
        let opts = options_from(lookup(&[
            (LOGERR_VERBOSITY_ENV, " 4 "),
            (LOGERR_FORMAT_ENV, "text"),
            (LOGERR_OUTPUT_ENV, "stderr"),
        ]))
        .unwrap();
        assert_eq!(opts.len(), 3);

        let sink = LogSink::with_options("svc", Fields::new(), opts);
        assert_eq!(sink.verbosity(), 4);
    }

    #[test]
    fn malformed_values_are_errors() {
        let err = options_from(lookup(&[(LOGERR_VERBOSITY_ENV, "-1")])).err().unwrap();
        assert!(matches!(err, EnvError::Verbosity { .. }));

        let err = options_from(lookup(&[(LOGERR_FORMAT_ENV, "yaml")])).err().unwrap();
        assert!(matches!(err, EnvError::Format(FormatError::Unknown(_))));

        let err = options_from(lookup(&[(LOGERR_OUTPUT_ENV, "/var/log/app")])).err().unwrap();
        assert!(matches!(err, EnvError::Output { .. }));
    }

    #[test]
    fn env_or_falls_back() {
        assert_eq!(env_or("LOGERR_TEST_SURELY_UNSET_VAR", "dflt"), "dflt");
    }
}
