//! Health checks for `dm doctor`.
//!
//! Every check is independent and produces one or more [`Check`] rows. A
//! failed config load is reported and the remaining checks run against the
//! default configuration.

use crate::config::Config;
use crate::error::Result;
use crate::launcher::pack;
use crate::paths;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Timeout for each HTTP probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Outcome of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Healthy.
    Ok,
    /// Works, but something looks off.
    Warn,
    /// Broken; `dm doctor` exits non-zero.
    Fail,
}

impl Status {
    /// Short marker for text output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Fail => "FAIL",
        }
    }
}

/// One check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    /// What was checked.
    pub name: String,

    /// Outcome.
    pub status: Status,

    /// Human-readable detail.
    pub detail: String,
}

impl Check {
    fn new(name: impl Into<String>, status: Status, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            detail: detail.into(),
        }
    }
}

/// All check results, in the order they ran.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    /// Check rows.
    pub checks: Vec<Check>,
}

impl Report {
    /// Whether any check failed. Warnings do not count.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|c| c.status == Status::Fail)
    }

    /// Number of checks with the given status.
    #[must_use]
    pub fn count(&self, status: Status) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }
}

/// Issues HTTP GET requests for endpoint checks.
pub trait HttpProbe {
    /// GET `url`, returning the status code of a successful response.
    ///
    /// # Errors
    ///
    /// Returns a description of the failure (connection error or
    /// non-success status).
    fn get(&self, url: &str) -> std::result::Result<u16, String>;
}

/// [`HttpProbe`] backed by `ureq`.
pub struct UreqProbe {
    agent: ureq::Agent,
}

impl UreqProbe {
    /// Create a probe with the default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(PROBE_TIMEOUT).build(),
        }
    }
}

impl Default for UreqProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpProbe for UreqProbe {
    fn get(&self, url: &str) -> std::result::Result<u16, String> {
        match self.agent.get(url).call() {
            Ok(response) => Ok(response.status()),
            Err(ureq::Error::Status(code, _)) => Err(format!("HTTP {code}")),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// Inputs for a doctor run.
pub struct Doctor<'a> {
    /// dm home directory.
    pub home: &'a Path,

    /// HTTP probe for the agent and endpoint checks.
    pub probe: &'a dyn HttpProbe,

    /// Environment lookup.
    pub env: &'a dyn Fn(&str) -> Option<String>,
}

impl Doctor<'_> {
    /// Run every check. `loaded` is the outcome of loading the config.
    #[must_use]
    pub fn run(&self, loaded: &Result<Config>) -> Report {
        let mut report = Report::default();
        let fallback = Config::default();

        let config = match loaded {
            Ok(config) => {
                report
                    .checks
                    .push(Check::new("config", Status::Ok, "configuration loaded"));
                config
            }
            Err(e) => {
                report
                    .checks
                    .push(Check::new("config", Status::Fail, e.to_string()));
                &fallback
            }
        };

        report.checks.push(check_home(self.home));
        report.checks.extend(check_jumps(config));
        report.checks.extend(check_projects(config));
        report.checks.extend(check_plugin_dirs(config, self.home));
        report.checks.extend(check_packs(config, self.home));
        report.checks.push(self.check_agent(config));
        report.checks.extend(self.check_endpoints(config));
        report.checks.extend(self.check_env(config));

        debug!(
            ok = report.count(Status::Ok),
            warn = report.count(Status::Warn),
            fail = report.count(Status::Fail),
            "doctor finished"
        );
        report
    }

    fn check_agent(&self, config: &Config) -> Check {
        let agent = &config.agent;
        match agent.provider.to_ascii_lowercase().as_str() {
            "ollama" => {
                let url = format!("{}/api/tags", agent.ollama_url.trim_end_matches('/'));
                match self.probe.get(&url) {
                    Ok(code) => Check::new("agent", Status::Ok, format!("ollama reachable ({code})")),
                    Err(e) => Check::new(
                        "agent",
                        Status::Warn,
                        format!("ollama not reachable at {url}: {e}"),
                    ),
                }
            }
            "openai" => {
                let var = &agent.openai_key_env;
                if (self.env)(var).is_some_and(|v| !v.is_empty()) {
                    Check::new("agent", Status::Ok, format!("openai key set in {var}"))
                } else {
                    Check::new("agent", Status::Fail, format!("{var} is not set"))
                }
            }
            "none" => Check::new("agent", Status::Ok, "agent disabled"),
            other => Check::new(
                "agent",
                Status::Warn,
                format!("unknown provider '{other}'"),
            ),
        }
    }

    fn check_endpoints(&self, config: &Config) -> Vec<Check> {
        config
            .doctor
            .endpoints
            .iter()
            .map(|url| {
                let name = format!("endpoint {url}");
                match self.probe.get(url) {
                    Ok(code) => Check::new(name, Status::Ok, format!("HTTP {code}")),
                    Err(e) => Check::new(name, Status::Warn, e),
                }
            })
            .collect()
    }

    fn check_env(&self, config: &Config) -> Vec<Check> {
        config
            .doctor
            .env
            .iter()
            .map(|var| {
                let name = format!("env {var}");
                if (self.env)(var).is_some_and(|v| !v.is_empty()) {
                    Check::new(name, Status::Ok, "set")
                } else {
                    Check::new(name, Status::Warn, "not set")
                }
            })
            .collect()
    }
}

fn check_home(home: &Path) -> Check {
    let probe = home.join(".doctor-write-test");
    let result = fs::create_dir_all(home)
        .and_then(|()| fs::write(&probe, b"ok"))
        .and_then(|()| fs::remove_file(&probe));

    match result {
        Ok(()) => Check::new("home", Status::Ok, format!("{} is writable", home.display())),
        Err(e) => Check::new(
            "home",
            Status::Fail,
            format!("{} is not writable: {e}", home.display()),
        ),
    }
}

fn dir_check(name: String, raw: &str, path: &Path) -> Check {
    if path.is_dir() {
        Check::new(name, Status::Ok, path.display().to_string())
    } else if path.exists() {
        Check::new(name, Status::Warn, format!("{raw} is not a directory"))
    } else {
        Check::new(name, Status::Warn, format!("{raw} does not exist"))
    }
}

fn check_jumps(config: &Config) -> Vec<Check> {
    config
        .jumps
        .iter()
        .map(|(name, raw)| dir_check(format!("jump {name}"), raw, &paths::expand(raw)))
        .collect()
}

fn check_projects(config: &Config) -> Vec<Check> {
    config
        .projects
        .iter()
        .map(|(name, project)| {
            dir_check(
                format!("project {name}"),
                &project.path,
                &paths::expand(&project.path),
            )
        })
        .collect()
}

fn check_plugin_dirs(config: &Config, home: &Path) -> Vec<Check> {
    config
        .plugin_dirs(home)
        .iter()
        .map(|dir| {
            let shown = dir.display().to_string();
            dir_check(format!("plugins {shown}"), &shown, dir)
        })
        .collect()
}

fn check_packs(config: &Config, home: &Path) -> Vec<Check> {
    let dir = config.packs_dir(home);
    let available = pack::list(&dir, &config.packs.enabled).unwrap_or_default();

    config
        .packs
        .enabled
        .iter()
        .map(|name| {
            let label = format!("pack {name}");
            if available.iter().any(|p| &p.name == name) {
                Check::new(label, Status::Ok, "enabled")
            } else {
                Check::new(
                    label,
                    Status::Warn,
                    format!("not found in {}", dir.display()),
                )
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Probe that answers from a fixed table and records requests.
    #[derive(Default)]
    struct StubProbe {
        up: Vec<String>,
        seen: RefCell<Vec<String>>,
    }

    impl HttpProbe for StubProbe {
        fn get(&self, url: &str) -> std::result::Result<u16, String> {
            self.seen.borrow_mut().push(url.to_string());
            if self.up.iter().any(|u| u == url) {
                Ok(200)
            } else {
                Err("connection refused".to_string())
            }
        }
    }

    fn config(json: serde_json::Value) -> Config {
        serde_json::from_value(json).unwrap()
    }

    fn run(config: Config, home: &Path, probe: &StubProbe, vars: &[(&str, &str)]) -> Report {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let env = move |name: &str| vars.get(name).cloned();
        Doctor {
            home,
            probe,
            env: &env,
        }
        .run(&Ok(config))
    }

    fn find<'a>(report: &'a Report, name: &str) -> &'a Check {
        report
            .checks
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("no check named {name}"))
    }

    #[test]
    fn healthy_default_config() {
        let dir = TempDir::new().unwrap();
        let probe = StubProbe {
            up: vec!["http://localhost:11434/api/tags".to_string()],
            ..StubProbe::default()
        };
        fs::create_dir_all(dir.path().join("plugins")).unwrap();

        let report = run(Config::default(), dir.path(), &probe, &[]);
        assert!(!report.has_failures());
        assert_eq!(find(&report, "config").status, Status::Ok);
        assert_eq!(find(&report, "home").status, Status::Ok);
        assert_eq!(find(&report, "agent").status, Status::Ok);
        assert!(!dir.path().join(".doctor-write-test").exists());
    }

    #[test]
    fn missing_paths_warn() {
        let dir = TempDir::new().unwrap();
        let gone = dir.path().join("gone").display().to_string();
        let cfg = config(serde_json::json!({
            "jumps": { "here": dir.path(), "gone": gone },
            "projects": { "site": { "path": gone } },
            "packs": { "enabled": ["missing"] },
        }));

        let report = run(cfg, dir.path(), &StubProbe::default(), &[]);
        assert_eq!(find(&report, "jump here").status, Status::Ok);
        assert_eq!(find(&report, "jump gone").status, Status::Warn);
        assert_eq!(find(&report, "project site").status, Status::Warn);
        assert_eq!(find(&report, "pack missing").status, Status::Warn);
        assert!(!report.has_failures());
    }

    #[test]
    fn ollama_down_is_a_warning() {
        let dir = TempDir::new().unwrap();
        let probe = StubProbe::default();
        let cfg = config(serde_json::json!({
            "agent": { "provider": "ollama", "ollama_url": "http://gpu:11434/" }
        }));

        let report = run(cfg, dir.path(), &probe, &[]);
        assert_eq!(find(&report, "agent").status, Status::Warn);
        assert_eq!(probe.seen.borrow()[0], "http://gpu:11434/api/tags");
        assert!(!report.has_failures());
    }

    #[test]
    fn openai_without_key_fails() {
        let dir = TempDir::new().unwrap();
        let cfg = config(serde_json::json!({
            "agent": { "provider": "openai", "openai_key_env": "MY_KEY" }
        }));

        let report = run(cfg.clone(), dir.path(), &StubProbe::default(), &[]);
        assert_eq!(find(&report, "agent").status, Status::Fail);
        assert!(report.has_failures());

        let report = run(cfg, dir.path(), &StubProbe::default(), &[("MY_KEY", "sk-1")]);
        assert_eq!(find(&report, "agent").status, Status::Ok);
    }

    #[test]
    fn endpoints_and_env_vars() {
        let dir = TempDir::new().unwrap();
        let probe = StubProbe {
            up: vec!["http://up".to_string()],
            ..StubProbe::default()
        };
        let cfg = config(serde_json::json!({
            "agent": { "provider": "none" },
            "doctor": {
                "endpoints": ["http://up", "http://down"],
                "env": ["EDITOR", "PAGER"]
            }
        }));

        let report = run(cfg, dir.path(), &probe, &[("EDITOR", "vim")]);
        assert_eq!(find(&report, "endpoint http://up").status, Status::Ok);
        assert_eq!(find(&report, "endpoint http://down").status, Status::Warn);
        assert_eq!(find(&report, "env EDITOR").status, Status::Ok);
        assert_eq!(find(&report, "env PAGER").status, Status::Warn);

        let agent = find(&report, "agent");
        assert_eq!(agent.status, Status::Ok);
        assert_eq!(agent.detail, "agent disabled");
        assert_eq!(probe.seen.borrow().len(), 2);
    }

    #[test]
    fn unknown_provider_warns() {
        let dir = TempDir::new().unwrap();
        let cfg = config(serde_json::json!({ "agent": { "provider": "claude" } }));
        let report = run(cfg, dir.path(), &StubProbe::default(), &[]);
        assert_eq!(find(&report, "agent").status, Status::Warn);
    }

    #[test]
    fn broken_config_fails_but_other_checks_run() {
        let dir = TempDir::new().unwrap();
        let env = |_: &str| -> Option<String> { None };
        let report = Doctor {
            home: dir.path(),
            probe: &StubProbe::default(),
            env: &env,
        }
        .run(&Err(Error::Config("bad json".to_string())));

        assert!(report.has_failures());
        assert_eq!(find(&report, "config").status, Status::Fail);
        assert_eq!(find(&report, "home").status, Status::Ok);
    }

    #[test]
    fn report_serializes_lowercase_status() {
        let report = Report {
            checks: vec![Check::new("home", Status::Warn, "x")],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["checks"][0]["status"], "warn");
    }
}
