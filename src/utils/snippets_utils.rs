#![forbid(unsafe_code)]

use path_absolutize::Absolutize;
use std::ops::Deref;
use std::path::Path;
use chrono::{Utc, SecondsFormat};

use poem::Request;

use log::{debug, LevelFilter};

// ***************************************************************************
// GENERAL PUBLIC FUNCTIONS
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_absolute_path:
// ---------------------------------------------------------------------------
/** Replace tilde (~) and environment variable values in a path name and
 * then construct the absolute path name.  Unlike canonicalize, absolutize
 * does not care whether the file exists or what the file really is.
 * 
 * On any expansion or conversion failure the original path is returned.
 */
pub fn get_absolute_path(path: &str) -> String {
    // Replace ~ and environment variable values if possible.
    let s = match shellexpand::full(path) {
        Ok(x) => x,
        Err(_) => return path.to_owned(),
    };

    // Convert to absolute path if necessary.
    let p = Path::new(s.deref());
    let p1 = match p.absolutize() {
        Ok(x) => x,
        Err(_) => return path.to_owned(),
    };
    let p2 = match p1.to_str() {
        Some(x) => x,
        None => return path.to_owned(),
    };

    p2.to_owned()
}

// ---------------------------------------------------------------------------
// timestamp_str:
// ---------------------------------------------------------------------------
/** Get the current UTC timestamp as a string in rfc3339 format, which looks
 * like this:  2022-09-13T14:14:42.719849Z
 */
pub fn timestamp_str() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ***************************************************************************
//                                  Traits
// ***************************************************************************
pub trait RequestDebug {
    type Req;
    fn get_request_info(&self) -> String;
}

// ---------------------------------------------------------------------------
// debug_request:
// ---------------------------------------------------------------------------
// Dump http request information to the log.
pub fn debug_request(http_req: &Request, req: &impl RequestDebug) {
    // Check that debug or higher logging is in effect.
    let level = log::max_level();
    if level < LevelFilter::Debug {
        return;
    }
    
    // Accumulate the output.
    let mut s = "\n".to_string();

    // Restate the method and URI.
    let uri = http_req.uri();
    s += format!("  {} URI: {:?}\n", http_req.method(), uri).as_str();

    // Accumulate the headers
    for v in http_req.headers().iter() {
         s += format!("  Header: {} = {:?} \n", v.0, v.1).as_str();
    };

    // Add the request's information.
    s += req.get_request_info().as_str();

    // Write the single log record.
    debug!("{}", s);
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::{get_absolute_path, timestamp_str};
    use chrono::DateTime;

    #[test]
    fn absolute_path_is_unchanged() {
        assert_eq!(get_absolute_path("/var/tmp/snippets"), "/var/tmp/snippets");
    }

    #[test]
    fn relative_path_is_absolutized() {
        let p = get_absolute_path("config/snippets.toml");
        assert!(p.starts_with('/'));
        assert!(p.ends_with("/config/snippets.toml"));
    }

    #[test]
    fn timestamp_is_rfc3339() {
        let ts = timestamp_str();
        assert!(ts.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
