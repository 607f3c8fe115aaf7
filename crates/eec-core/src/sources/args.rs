//! Command-line argument layer
//!
//! ```text
//! --db-host=example   -> dbHost  = example
//! --verbose           -> verbose = true
//! positional          -> (skipped)
//! ```

use crate::normalize::normalize;
use crate::resolved::{ResolvedConfig, Source};

/// Value given to a `--flag` with no `=`
pub const FLAG_VALUE: &str = "true";

/// Split one argument into a normalized key and its value
///
/// Returns `None` for arguments that do not start with `--` and for those
/// whose key normalizes to nothing (`--`, `--=x`). Every `--` in the
/// argument is removed before splitting on the first `=`.
pub fn parse_arg(arg: &str) -> Option<(String, String)> {
    if !arg.starts_with("--") {
        return None;
    }

    let stripped = arg.replace("--", "");
    let (raw_key, value) = match stripped.split_once('=') {
        Some((key, value)) => (key, value.to_string()),
        None => (stripped.as_str(), FLAG_VALUE.to_string()),
    };

    let key = normalize(raw_key, None);
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Write every `--key=value` argument into `config`
///
/// The first element is the program path and is never read. Returns the
/// number of arguments written.
pub fn load_args<S: AsRef<str>>(args: &[S], config: &mut ResolvedConfig) -> usize {
    let mut count = 0;
    for arg in args.iter().skip(1).map(AsRef::as_ref) {
        match parse_arg(arg) {
            Some((key, value)) => {
                config.insert(key, value, Source::Args);
                count += 1;
            }
            None => tracing::trace!(arg, "Skipping argument"),
        }
    }
    count
}
