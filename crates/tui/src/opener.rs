//! Opens URLs with the platform's default handler.

use std::process::{Command, Stdio};
use std::thread;

use moviefinder_core::{LinkOpener, NavigationError};
use tracing::debug;

pub struct SystemLinkOpener {
    program: &'static str,
    args: &'static [&'static str],
}

impl SystemLinkOpener {
    pub fn new() -> Self {
        let (program, args): (&'static str, &'static [&'static str]) = if cfg!(target_os = "macos") {
            ("open", &[])
        } else if cfg!(target_os = "windows") {
            // No shell, so '&' in query strings survives
            ("rundll32", &["url.dll,FileProtocolHandler"])
        } else {
            ("xdg-open", &[])
        };
        Self { program, args }
    }

    fn command(&self, url: &str) -> Command {
        let mut command = Command::new(self.program);
        // Output would corrupt the UI
        command
            .args(self.args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}

impl Default for SystemLinkOpener {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkOpener for SystemLinkOpener {
    fn open(&self, url: &str) -> Result<(), NavigationError> {
        debug!(program = self.program, "Opening {}", url);
        let mut child = self
            .command(url)
            .spawn()
            .map_err(|e| NavigationError::OpenFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        // Reap the handler so it does not linger as a zombie
        let program = self.program;
        thread::spawn(move || match child.wait() {
            Ok(status) => debug!(program, %status, "Link handler exited"),
            Err(e) => debug!(program, "Failed to wait for link handler: {}", e),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_is_passed_as_one_argument() {
        let opener = SystemLinkOpener::new();
        let url = "https://www.imdb.com/find?q=Am%C3%A9lie&s=tt&ttype=ft";
        let command = opener.command(url);

        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args.last().copied(), Some(std::ffi::OsStr::new(url)));
        assert_eq!(args.len(), opener.args.len() + 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_open_succeeds_when_handler_starts() {
        let opener = SystemLinkOpener {
            program: "true",
            args: &[],
        };
        assert!(opener.open("https://www.themoviedb.org/movie/194").is_ok());
    }

    #[test]
    fn test_missing_handler_is_open_failed() {
        let opener = SystemLinkOpener {
            program: "moviefinder-no-such-handler",
            args: &[],
        };
        match opener.open("https://www.themoviedb.org/movie/194") {
            Err(NavigationError::OpenFailed { url, .. }) => {
                assert_eq!(url, "https://www.themoviedb.org/movie/194");
            }
            other => panic!("expected OpenFailed, got {:?}", other),
        }
    }
}
