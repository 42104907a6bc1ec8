//! ANSI color helpers for CLI output.

/// Wraps text in ANSI escapes when color is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Color unless `NO_COLOR` is set in the environment.
    pub fn from_env(enabled: bool) -> Self {
        Self::new(enabled && std::env::var_os("NO_COLOR").is_none())
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.enabled {
            format!("\x1b[{}m{}\x1b[0m", code, s)
        } else {
            s.to_string()
        }
    }

    pub fn green(&self, s: &str) -> String {
        self.paint("32", s)
    }

    pub fn red(&self, s: &str) -> String {
        self.paint("31", s)
    }

    pub fn yellow(&self, s: &str) -> String {
        self.paint("33", s)
    }

    pub fn cyan(&self, s: &str) -> String {
        self.paint("36", s)
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint("1", s)
    }

    pub fn gray(&self, s: &str) -> String {
        self.paint("90", s)
    }

    /// Right-aligned bold green label, e.g. `     Created`.
    pub fn status_label(&self, label: &str) -> String {
        self.paint("1;32", &format!("{:>12}", label))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(true)
    }
}
