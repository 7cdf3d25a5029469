//! Terminal helpers shared by the command-line front end.

use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    /// Always use ANSI colors.
    Always,
    /// Never use ANSI colors.
    Never,
}

impl ColorChoice {
    /// Decide whether to color, given whether the output is a terminal.
    ///
    /// `NO_COLOR` (any non-empty value) turns `Auto` off.
    pub fn should_color(&self, is_terminal: bool) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                is_terminal && std::env::var_os("NO_COLOR").map_or(true, |v| v.is_empty())
            }
        }
    }

    /// [`ColorChoice::should_color`] for stdout.
    pub fn for_stdout(&self) -> bool {
        self.should_color(std::io::stdout().is_terminal())
    }
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}
