use crate::level::Level;
use console::Style;
use std::borrow::Cow;
use std::collections::HashMap;

/// Terminal styles applied to the level field of console output.
///
/// Each logger owns its own table, so tests and independent loggers never
/// share style state. Styles are always forced on; whether they are used at
/// all is decided by the destination (see [`LineAssembler`](crate::assembler::LineAssembler)).
#[derive(Debug, Clone)]
pub struct LevelStyles {
    styles: HashMap<Level, Style>,
}

impl LevelStyles {
    /// A table with no styles; every level renders as plain text.
    pub fn plain() -> Self {
        Self {
            styles: HashMap::new(),
        }
    }

    /// Set or replace the style used for `level`.
    pub fn with(mut self, level: Level, style: Style) -> Self {
        self.styles.insert(level, style.force_styling(true));
        self
    }

    /// Remove the style of `level`, leaving it unstyled.
    pub fn without(mut self, level: Level) -> Self {
        self.styles.remove(&level);
        self
    }

    /// Level name wrapped in its escape sequence, or the bare name when the
    /// level has no style.
    pub fn render(&self, level: Level) -> Cow<'static, str> {
        match self.styles.get(&level) {
            Some(style) => Cow::Owned(style.apply_to(level.as_str()).to_string()),
            None => Cow::Borrowed(level.as_str()),
        }
    }
}

impl Default for LevelStyles {
    fn default() -> Self {
        Self::plain()
            .with(Level::Debug, Style::new().magenta())
            .with(Level::Info, Style::new().blue())
            .with(Level::Warn, Style::new().yellow())
            .with(Level::Error, Style::new().red())
            .with(Level::Fatal, Style::new().red().bold())
            .with(Level::Critical, Style::new().red().bold())
    }
}
