//! Layering of defaults, TOML files, `MOCKSQL_*` variables and flags.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use mocksql_config::{Config, LogFormat, OrthoConfig};
use once_cell::sync::Lazy;
use rstest::{fixture, rstest};
use tempfile::TempDir;

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Serialises environment access and restores every variable it touched.
struct EnvScope {
    previous: Vec<(&'static str, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvScope {
    fn lock() -> Self {
        let guard = ENV_MUTEX
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        Self {
            previous: Vec::new(),
            _guard: guard,
        }
    }

    fn set(&mut self, key: &'static str, value: impl AsRef<OsStr>) {
        self.previous.push((key, std::env::var_os(key)));
        unsafe { std::env::set_var(key, value) };
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        while let Some((key, value)) = self.previous.pop() {
            match value {
                Some(old) => unsafe { std::env::set_var(key, old) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
    }
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn write(&self, name: &str, toml: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, toml).expect("write configuration");
        path
    }
}

#[fixture]
fn workspace() -> Workspace {
    Workspace {
        dir: TempDir::new().expect("create temp dir"),
    }
}

fn args(extra: &[&OsStr]) -> Vec<OsString> {
    let mut all = vec![OsString::from("mocksql")];
    all.extend(extra.iter().map(|arg| (*arg).to_owned()));
    all
}

#[rstest]
fn no_sources_yield_defaults() {
    let _env = EnvScope::lock();

    let config = Config::load_from_iter(args(&[])).expect("load config");

    assert_eq!(config, Config::default());
}

#[rstest]
fn file_values_replace_defaults(workspace: Workspace) {
    let _env = EnvScope::lock();
    let path = workspace.write(
        "mocksql.toml",
        "log_format = \"compact\"\nreserved_schema_prefix = \"tmp\"\n",
    );

    let config = Config::load_from_iter(args(&[OsStr::new("--config-path"), path.as_os_str()]))
        .expect("load config");

    assert_eq!(config.log_format(), LogFormat::Compact);
    assert_eq!(config.reserved_schema_prefix(), "tmp");
    assert_eq!(config.accepted_user(), "mock");
}

#[rstest]
fn environment_overrides_file(workspace: Workspace) {
    let mut env = EnvScope::lock();
    let path = workspace.write("mocksql.toml", "accepted_user = \"from_file\"\n");
    env.set("MOCKSQL_ACCEPTED_USER", "from_env");

    let config = Config::load_from_iter(args(&[OsStr::new("--config-path"), path.as_os_str()]))
        .expect("load config");

    assert_eq!(config.accepted_user(), "from_env");
}

#[rstest]
fn config_path_variable_is_honoured(workspace: Workspace) {
    let mut env = EnvScope::lock();
    let path = workspace.write("env.toml", "log_filter = \"mocksql=trace\"\n");
    env.set("MOCKSQL_CONFIG_PATH", path.as_os_str());

    let config = Config::load_from_iter(args(&[])).expect("load config");

    assert_eq!(config.log_filter(), "mocksql=trace");
}

#[rstest]
fn flags_override_environment() {
    let mut env = EnvScope::lock();
    env.set("MOCKSQL_ACCEPTED_USER", "from_env");

    let config = Config::load_from_iter(args(&[
        OsStr::new("--accepted-user"),
        OsStr::new("from_flag"),
    ]))
    .expect("load config");

    assert_eq!(config.accepted_user(), "from_flag");
}

#[rstest]
fn unknown_log_format_flag_is_rejected() {
    let _env = EnvScope::lock();

    let outcome = Config::load_from_iter(args(&[
        OsStr::new("--log-format"),
        OsStr::new("yaml"),
    ]));

    assert!(outcome.is_err());
}

#[rstest]
fn malformed_file_is_rejected(workspace: Workspace) {
    let _env = EnvScope::lock();
    let path = workspace.write("broken.toml", "log_format = compact\n");

    let error = Config::load_from_iter(args(&[OsStr::new("--config-path"), path.as_os_str()]))
        .expect_err("loading must fail");

    assert!(!error.to_string().is_empty());
}
