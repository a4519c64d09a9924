#![forbid(unsafe_code)]

use anyhow::{Result, anyhow};
use log::{info, error, LevelFilter};
use serde::Deserialize;
use std::{env, fs, path::Path};
use fs_mistrust::Mistrust;
use std::os::unix::fs::PermissionsExt;
use lazy_static::lazy_static;
use structopt::StructOpt;

use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;

// Server Utilities
use crate::utils::errors::Errors;
use crate::utils::snippets_utils::get_absolute_path;

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Directory and file locations. Unless otherwise noted, all files and directories
// are relative to the root directory.
const ENV_SNIPPETS_ROOT_DIR : &str = "SNIPPETS_ROOT_DIR";
const DEFAULT_ROOT_DIR      : &str = "~/.snippets";
const CONFIG_DIR            : &str = "/config";
const LOGS_DIR              : &str = "/logs";
const CERTS_DIR             : &str = "/certs";
const LOG4RS_CONFIG_FILE    : &str = "/log4rs.yml";    // relative to config dir
const SNIPPETS_CONFIG_FILE  : &str = "/snippets.toml"; // relative to config dir
const TLS_KEY_FILE          : &str = "/key.pem";       // relative to certs dir
const TLS_CERT_FILE         : &str = "/cert.pem";      // relative to certs dir

// Console logging used when no log4rs configuration file exists.
const DEFAULT_LOG_PATTERN   : &str = "{d(%Y-%m-%dT%H:%M:%S%.3fZ)(utc)} {h({l})} {t} - {m}{n}";

// Networking.
const DEFAULT_HTTP_ADDR     : &str = "http://localhost";
const DEFAULT_HTTP_PORT     : u16  = 3000;

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Assign the command line arguments before anything else is initialized.
lazy_static! {
    pub static ref SNIPPETS_ARGS: SnippetsArgs = init_snippets_args();
}

// ***************************************************************************
//                             Directory Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// SnippetsDirs:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct SnippetsDirs {
    pub root_dir: String,
    pub config_dir: String,
    pub logs_dir: String,
    pub certs_dir: String,
}

// ***************************************************************************
//                               Config Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// SnippetsArgs:
// ---------------------------------------------------------------------------
#[derive(Debug, StructOpt)]
#[structopt(name = "snippets_args", about = "Command line arguments for Snippets Server.")]
pub struct SnippetsArgs {
    /// Specify the server's root data directory.
    ///
    /// This directory contains the configuration, log and certificate
    /// directories the server uses during execution.
    #[structopt(short, long)]
    pub root_dir: Option<String>,

    /// Create the data directories and then exit.
    ///
    /// The data directories will be rooted at a root directory calculated
    /// using the following priority order:
    ///
    ///   1. If set, the value of the SNIPPETS_ROOT_DIR environment,
    ///
    ///   2. Otherwise, if set, the value of the --root-dir command line argument,
    ///
    ///   3. Otherwise, ~/.snippets
    ///
    #[structopt(short, long)]
    pub create_dirs_only: bool,
}

// ---------------------------------------------------------------------------
// Parms:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct Parms {
    pub config_file: String,
    pub config: Config,
}

// ---------------------------------------------------------------------------
// RuntimeCtx:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct RuntimeCtx {
    pub parms: Parms,
    pub snippets_args: &'static SnippetsArgs,
    pub snippets_dirs: SnippetsDirs,
}

impl RuntimeCtx {
    /// The base URL advertised in the generated OpenAPI document.
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.parms.config.http_addr, self.parms.config.http_port)
    }

    /// The socket address the server listens on.
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.parms.config.http_port)
    }

    pub fn tls_key_file(&self) -> String {
        self.snippets_dirs.certs_dir.clone() + TLS_KEY_FILE
    }

    pub fn tls_cert_file(&self) -> String {
        self.snippets_dirs.certs_dir.clone() + TLS_CERT_FILE
    }
}

// ---------------------------------------------------------------------------
// Config:
// ---------------------------------------------------------------------------
// Any key missing from the configuration file takes its default value.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub http_addr: String,
    pub http_port: u16,
    pub tls_enabled: bool,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Snippets Server".to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            tls_enabled: false,
        }
    }
}

// ***************************************************************************
//                            Directory Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_snippets_args:
// ---------------------------------------------------------------------------
/** Get the command line arguments. */
fn init_snippets_args() -> SnippetsArgs {
    let args = SnippetsArgs::from_args();
    println!("{:?}", args);
    args
}

// ---------------------------------------------------------------------------
// init_snippets_dirs:
// ---------------------------------------------------------------------------
/** Calculate the external data directories, creating any that don't exist. */
pub fn init_snippets_dirs() -> Result<SnippetsDirs> {
    // Initialize the mistrust object.
    let mistrust = get_mistrust()?;

    // Check that each path is absolute and is a directory with the
    // proper permission assign if it exists.  If it doesn't exist,
    // create it.
    let root_dir = get_root_dir();
    check_snippets_dir(&root_dir, "root directory", &mistrust)?;

    let config_dir = root_dir.clone() + CONFIG_DIR;
    check_snippets_dir(&config_dir, "config directory", &mistrust)?;

    let logs_dir = root_dir.clone() + LOGS_DIR;
    check_snippets_dir(&logs_dir, "logs directory", &mistrust)?;

    let certs_dir = root_dir.clone() + CERTS_DIR;
    check_snippets_dir(&certs_dir, "certs directory", &mistrust)?;

    // Package up and return the directories.
    Ok(SnippetsDirs {root_dir, config_dir, logs_dir, certs_dir})
}

// ---------------------------------------------------------------------------
// check_snippets_dir:
// ---------------------------------------------------------------------------
/** Check that the path is absolute and, if it exists, that is has the proper
 * permissions assigned.  If it doesn't exist, create it.  The mistrust package
 * creates directories with 0o700 permissions.
 */
fn check_snippets_dir(dir: &str, msgname: &str, mistrust: &Mistrust) -> Result<()> {
    // Get the path object.
    let path = Path::new(dir);
    if !path.is_absolute() {
        return Err(anyhow!("The {} path must be absolute: {}", msgname, dir));
    }
    if path.exists() {
        // Make sure the path represents a directory.
        if !path.is_dir() {
            return Err(anyhow!("The {} path must be a directory: {}", msgname, dir));
        }

        // Make sure the directory has rwx for owner only.
        let perm = path.metadata()?.permissions().mode();
        if perm & 0o777 != 0o700 {
            return Err(anyhow!("The {} path must have 0o700 permissions: {}", msgname, dir));
        }
    } else {
        // Create the directory with the correct permissions.
        if let Err(e) = mistrust.make_directory(path) {
            return Err(anyhow!("Make directory error for {:?}: {}", path, e));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// get_mistrust:
// ---------------------------------------------------------------------------
/** Configure a new mistrust object for initial directory processing. */
fn get_mistrust() -> Result<Mistrust> {
    match Mistrust::builder()
        .ignore_prefix(get_absolute_path("~"))
        .trust_group(0)
        .build() {
            Ok(m) => Ok(m),
            Err(e) => Err(anyhow!("Mistrust configuration error: {}", e)),
        }
}

// ---------------------------------------------------------------------------
// get_root_dir:
// ---------------------------------------------------------------------------
fn get_root_dir() -> String {
    // Order of precedence:
    //  1. Environment variable
    //  2. Command line --root-dir argument
    //  3. Default location
    //
    let root_dir = env::var(ENV_SNIPPETS_ROOT_DIR).unwrap_or_else(
        |_| {
            match SNIPPETS_ARGS.root_dir.clone() {
                Some(r) => r,
                None => DEFAULT_ROOT_DIR.to_string(),
            }
        });

    // Canonicalize the path.
    get_absolute_path(&root_dir)
}

// ***************************************************************************
//                               Log Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_log:
// ---------------------------------------------------------------------------
/** Initialize log4rs from the configuration file in the config directory.  If
 * there's no such file, log to the console at info level.
 */
pub fn init_log(dirs: &SnippetsDirs) -> Result<()> {
    let logconfig = dirs.config_dir.clone() + LOG4RS_CONFIG_FILE;
    if Path::new(&logconfig).exists() {
        if let Err(e) = log4rs::init_file(&logconfig, Default::default()) {
            println!("{}", e);
            return Err(anyhow!(Errors::Log4rsInitialization(logconfig)));
        }
        info!("Log4rs initialized using: {}", logconfig);
    } else {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(DEFAULT_LOG_PATTERN)))
            .build();
        let config = LogConfig::builder()
            .appender(Appender::builder().build("stdout", Box::new(stdout)))
            .build(Root::builder().appender("stdout").build(LevelFilter::Info))?;
        log4rs::init_config(config)?;
        info!("Log4rs configuration file not found at {}, logging to console.", logconfig);
    }
    Ok(())
}

/// ***************************************************************************
//                             Parms Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_parms:
// ---------------------------------------------------------------------------
/** Retrieve the application parameters from the configuration file in the
 * config directory.  If the file can't be read, default values are used.
 */
fn get_parms(dirs: &SnippetsDirs) -> Result<Parms> {
    // Get the config file path from its data directory.
    let config_file = dirs.config_dir.clone() + SNIPPETS_CONFIG_FILE;

    // Read the cofiguration file.
    let config_file_abs = get_absolute_path(&config_file);
    info!("{}", Errors::ReadingConfigFile(config_file_abs.clone()));
    let contents = match fs::read_to_string(&config_file_abs) {
        Ok(c) => c,
        Err(_) => {
            info!("Unable to read configuration at {}. Using default values.", config_file);
            return Ok(Parms { config_file: Default::default(), config: Config::new() });
        }
    };

    let config = parse_config(&contents, &config_file_abs)?;
    Ok(Parms { config_file: config_file_abs, config })
}

// ---------------------------------------------------------------------------
// parse_config:
// ---------------------------------------------------------------------------
fn parse_config(contents: &str, config_file: &str) -> Result<Config> {
    match toml::from_str(contents) {
        Ok(c)  => Ok(c),
        Err(e) => {
            let msg = format!("{}\n   {}", Errors::TOMLParseError(config_file.to_string()), e);
            error!("{}", msg);
            Err(anyhow!(msg))
        }
    }
}

// ***************************************************************************
//                             Config Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_runtime_context:
// ---------------------------------------------------------------------------
pub fn init_runtime_context(snippets_dirs: SnippetsDirs) -> Result<RuntimeCtx> {
    let parms = get_parms(&snippets_dirs)?;
    Ok(RuntimeCtx {parms, snippets_args: &SNIPPETS_ARGS, snippets_dirs})
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::{parse_config, Config, DEFAULT_HTTP_ADDR, DEFAULT_HTTP_PORT};

    #[test]
    fn default_config() {
        let config = Config::new();
        assert_eq!(config.title, "Snippets Server");
        assert_eq!(config.http_addr, DEFAULT_HTTP_ADDR);
        assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
        assert!(!config.tls_enabled);
    }

    #[test]
    fn parse_full_config() {
        let contents = r#"
            title = "Team Snippets"
            http_addr = "https://snippets.example.org"
            http_port = 8443
            tls_enabled = true
        "#;
        let config = parse_config(contents, "snippets.toml").unwrap();
        assert_eq!(config.title, "Team Snippets");
        assert_eq!(config.http_addr, "https://snippets.example.org");
        assert_eq!(config.http_port, 8443);
        assert!(config.tls_enabled);
    }

    #[test]
    fn parse_partial_config() {
        let config = parse_config("http_port = 8080\n", "snippets.toml").unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.http_addr, DEFAULT_HTTP_ADDR);
        assert!(!config.tls_enabled);
    }

    #[test]
    fn parse_bad_config() {
        let err = parse_config("http_port = \"not a port\"", "/x/snippets.toml").unwrap_err();
        assert!(err.to_string().contains("Unable to parse TOML file: /x/snippets.toml"));
    }
}
