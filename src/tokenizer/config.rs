/// Per-tokenizer session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Promote unquoted `--name` tokens to the flag list.
    pub auto_detect_flags: bool,
    /// Turn an unquoted, unescaped `null` (any case) into an absent argument.
    pub null_as_absent: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_detect_flags: true,
            null_as_absent: false,
        }
    }
}
