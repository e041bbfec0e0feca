//! Terminal styling for report headings

use std::io::IsTerminal;

const RESET: &str = "\x1b[0m";

/// ANSI style for a heading or status word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Bold,
    Red,
    Green,
    Yellow,
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Bold => "\x1b[1m",
            Style::Red => "\x1b[1;31m",
            Style::Green => "\x1b[1;32m",
            Style::Yellow => "\x1b[1;33m",
        }
    }
}

/// True when stdout is a terminal and `NO_COLOR` is unset
#[must_use]
pub fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

/// Wrap `text` in `style` when colour is enabled
#[must_use]
pub fn paint(style: Style, text: &str) -> String {
    paint_if(color_enabled(), style, text)
}

/// Wrap `text` in `style` when `enabled`
#[must_use]
pub fn paint_if(enabled: bool, style: Style, text: &str) -> String {
    if enabled {
        format!("{}{text}{RESET}", style.code())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_when_disabled() {
        assert_eq!(paint_if(false, Style::Red, "FAILED"), "FAILED");
        assert_eq!(paint_if(true, Style::Green, "OK"), "\x1b[1;32mOK\x1b[0m");
    }
}
