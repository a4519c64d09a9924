#![forbid(unsafe_code)]

use poem_openapi::Object;
use thiserror::Error;

/// Error enumerates the errors returned by this application.
#[derive(Error, Debug)]
pub enum Errors {
    /// Input parameter logging.
    #[error("snippets_server input parameters:\n{}", .0)]
    InputParms(String),

    /// Inaccessible logger configuration file.
    #[error("Unable to access the Log4rs configuration file: {}", .0)]
    Log4rsInitialization(String),

    #[error("Reading application configuration file: {}", .0)]
    ReadingConfigFile(String),

    #[error("Unable to parse TOML file: {}", .0)]
    TOMLParseError(String),

    #[error("Snippets Server Error: {}", .0)]
    ServerError(String),
}

// ***************************************************************************
//                             HTTP Error Body
// ***************************************************************************
/// The body returned with every non-2xx response.
#[derive(Object, Debug)]
pub struct HttpResult {
    pub result_code: String,
    pub result_msg: String,
}

impl HttpResult {
    pub fn new(result_code: String, result_msg: String) -> Self {
        Self {result_code, result_msg}
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::{Errors, HttpResult};

    #[test]
    fn error_messages() {
        let e = Errors::TOMLParseError("/tmp/snippets.toml".to_string());
        assert_eq!(e.to_string(), "Unable to parse TOML file: /tmp/snippets.toml");

        let e = Errors::ServerError("boom".to_string());
        assert_eq!(e.to_string(), "Snippets Server Error: boom");
    }

    #[test]
    fn http_result_fields() {
        let r = HttpResult::new(400.to_string(), "bad body".to_string());
        assert_eq!(r.result_code, "400");
        assert_eq!(r.result_msg, "bad body");
    }
}
