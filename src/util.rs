use std::env;
use std::io;
use std::path::PathBuf;
use std::process::Command as ProcessCommand;

pub(crate) fn env_optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

pub(crate) fn env_u64(name: &str, default: u64) -> Result<u64, Box<dyn std::error::Error>> {
    match env_optional(name) {
        Some(value) => Ok(value
            .parse::<u64>()
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("Invalid {name}")))?),
        None => Ok(default),
    }
}

pub(crate) fn env_u32(name: &str, default: u32) -> Result<u32, Box<dyn std::error::Error>> {
    match env_optional(name) {
        Some(value) => Ok(value
            .parse::<u32>()
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("Invalid {name}")))?),
        None => Ok(default),
    }
}

/// Interpreter override from the environment, shlex-split so a wrapper
/// command like `ssh mac osascript` works. `None` means the stock
/// interpreter.
pub(crate) fn interpreter_override(name: &str) -> Option<Vec<String>> {
    let raw = env_optional(name)?;
    let parts = shlex::split(&raw)?;
    if parts.is_empty() { None } else { Some(parts) }
}

pub(crate) fn build_interpreter_command(interpreter: &[String]) -> ProcessCommand {
    let mut cmd = ProcessCommand::new(&interpreter[0]);
    cmd.args(&interpreter[1..]);

    // Process group isolation: the child becomes its own process group leader
    // so a timed-out script can be killed as a tree without touching us.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    cmd
}

/// Kill a child process and its entire process group.
/// On Unix, sends SIGTERM first for graceful shutdown, then SIGKILL after 2 seconds.
#[cfg(unix)]
pub(crate) fn kill_process_tree(child: &mut std::process::Child) {
    let pid = child.id() as i32;
    unsafe {
        libc::kill(-pid, libc::SIGTERM);
    }
    std::thread::sleep(std::time::Duration::from_secs(2));
    match child.try_wait() {
        Ok(Some(_)) => {}
        _ => unsafe {
            libc::killpg(pid, libc::SIGKILL);
        },
    }
    let _ = child.wait();
}

#[cfg(not(unix))]
pub(crate) fn kill_process_tree(child: &mut std::process::Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Quote a string for interpolation inside an AppleScript double-quoted
/// literal. Escapes backslashes, quotes, and control characters that would
/// otherwise break out of the quoted context.
pub(crate) fn applescript_quote(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .replace('\0', "")
}

pub(crate) fn expand_tilde(path: &str) -> String {
    if path == "~" {
        if let Some(home) = env_optional("HOME") {
            return home;
        }
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = env_optional("HOME") {
            return format!("{}/{rest}", home.trim_end_matches('/'));
        }
    }
    path.to_string()
}

pub(crate) fn read_script_source(
    expr: Option<String>,
    file: Option<PathBuf>,
) -> Result<String, Box<dyn std::error::Error>> {
    match (expr, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => Ok(std::fs::read_to_string(&path)?),
        (None, None) => {
            Err(io::Error::new(io::ErrorKind::InvalidInput, "Missing --expr or --file").into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_escapes_breakout_characters() {
        assert_eq!(applescript_quote(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(applescript_quote("a\\b"), "a\\\\b");
        assert_eq!(applescript_quote("line1\nline2"), "line1\\nline2");
        assert_eq!(applescript_quote("tab\there"), "tab\\there");
        assert_eq!(applescript_quote("nul\0byte"), "nulbyte");
    }

    #[test]
    fn quote_passes_plain_text() {
        assert_eq!(applescript_quote("Quarterly Report"), "Quarterly Report");
    }

    #[test]
    fn tilde_expansion() {
        unsafe {
            std::env::set_var("HOME", "/home/tester");
        }
        assert_eq!(expand_tilde("~/Desktop"), "/home/tester/Desktop");
        assert_eq!(expand_tilde("~"), "/home/tester");
        assert_eq!(expand_tilde("/tmp/out"), "/tmp/out");
    }
}
