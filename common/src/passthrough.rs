//! Splitting of `--`-separated argument layers.
//!
//! `barnum [OPTS] -- DELEGATE_ARGS -- CONTROL_ARGS`: the first separator ends
//! barnum's own arguments, the second (seen only by the delegate layer) ends the
//! delegate's. Forwarded lists are kept as opaque words.

pub const SEPARATOR: &str = "--";
pub const DEFAULT_CONTROL_COMMAND: &str = "status";

/// Splits `args` at the first [`SEPARATOR`]. The separator itself is dropped.
pub fn split<I, S>(args: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut own = Vec::new();
    let mut forwarded = Vec::new();
    let mut seen_separator = false;

    for arg in args {
        let arg: String = arg.into();
        if !seen_separator && arg == SEPARATOR {
            seen_separator = true;
            continue;
        }
        if seen_separator {
            forwarded.push(arg);
        } else {
            own.push(arg);
        }
    }

    (own, forwarded)
}

/// Inverse of [`split`]: `own -- forwarded`, without a separator when nothing
/// is forwarded.
pub fn rejoin(own: Vec<String>, forwarded: Vec<String>) -> Vec<String> {
    if forwarded.is_empty() {
        return own;
    }
    own.into_iter()
        .chain(std::iter::once(SEPARATOR.to_string()))
        .chain(forwarded)
        .collect()
}

/// Arguments handed to the control tool by a delegate layer that received
/// `delegate_args`.
///
/// The delegate's own words come first, followed by everything after its
/// separator; with neither present the command defaults to `status`.
pub fn control_args(delegate_args: &[String]) -> Vec<String> {
    let (command, trailing) = split(delegate_args.iter().cloned());
    compose_control_args(command, trailing)
}

pub fn compose_control_args(command: Vec<String>, trailing: Vec<String>) -> Vec<String> {
    if command.is_empty() && trailing.is_empty() {
        return vec![DEFAULT_CONTROL_COMMAND.to_string()];
    }
    command.into_iter().chain(trailing).collect()
}
