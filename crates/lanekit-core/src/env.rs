//! Environment snapshot and value normalisation.
//!
//! CI servers frequently hand variables over with the quotes of the job
//! definition still attached (`'/opt/prov'`), so every lookup goes through
//! [`strip_quotes`] before the value is used to build a path.

use std::collections::BTreeMap;

/// Variable set to `YES` by the Jenkins job wrapper.
pub const JENKINS_MARKER: &str = "EXEC_RUNNING_ON_JENKINS";

/// Variables whose presence means the host is a CI worker.
const HOST_CI_MARKERS: &[&str] = &[
    "CI",
    "JENKINS_URL",
    "JENKINS_HOME",
    "TRAVIS",
    "CIRCLECI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "BITRISE_IO",
    "BUILDKITE",
    "TF_BUILD",
    "TEAMCITY_VERSION",
    "XCS",
    "CODEBUILD_BUILD_ID",
];

/// Strips any run of leading and trailing single or double quotes.
///
/// Mixed runs are stripped too: `'"abc"'` becomes `abc`. Quotes inside the
/// value are left alone.
pub fn strip_quotes(input: &str) -> &str {
    input.trim_matches(&['\'', '"'][..])
}

/// [`strip_quotes`] for optional values; `None` stays `None`.
pub fn strip_quotes_opt(input: Option<&str>) -> Option<&str> {
    input.map(strip_quotes)
}

/// Immutable snapshot of environment variables.
///
/// Taken once at startup so that every action of a run sees the same values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Captures the current process environment.
    ///
    /// Variables that are not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Builds an environment from explicit name/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns a copy with one variable set.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Returns the value exactly as it was captured.
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Returns the quote-stripped value, treating an empty result as unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        strip_quotes_opt(self.raw(name)).filter(|value| !value.is_empty())
    }

    /// Looks up a required variable, recording its name in `missing` when absent.
    ///
    /// Returns an empty string for absent variables so that callers can keep
    /// collecting every missing name before failing once.
    pub(crate) fn require(&self, name: &str, missing: &mut Vec<String>) -> String {
        match self.get(name) {
            Some(value) => value.to_string(),
            None => {
                missing.push(name.to_string());
                String::new()
            }
        }
    }

    /// True when the Jenkins wrapper marked this run with `YES`.
    pub fn is_jenkins(&self) -> bool {
        self.get(JENKINS_MARKER) == Some("YES")
    }

    /// Detects a CI host from the well-known marker variables.
    ///
    /// `CI=false` and `CI=0` are treated as explicitly local.
    pub fn detect_host_ci(&self) -> bool {
        HOST_CI_MARKERS.iter().any(|marker| match self.get(marker) {
            Some(value) if *marker == "CI" => {
                !value.eq_ignore_ascii_case("false") && value != "0"
            }
            Some(_) => true,
            None => false,
        })
    }
}
