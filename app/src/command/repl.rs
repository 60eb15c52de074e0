/// Commands understood by the interactive chat loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplCommand {
    /// Leave the session
    Exit,
    /// Drop all turns
    Clear,
    /// Show the context, or replace it when text is given
    Context(Option<String>),
    /// Print the transcript
    History,
    /// Print the structured summaries as JSON
    Summaries,
    Help,
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line typed at the prompt. Returns `None` for ordinary questions.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if matches!(line, "exit" | "quit" | "q") {
            return Some(Self::Exit);
        }

        let rest = line.strip_prefix('/')?;
        let (name, arg) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(name, arg)| (name, arg.trim()));

        let command = match name.to_lowercase().as_str() {
            "exit" | "quit" => Self::Exit,
            "clear" | "reset" => Self::Clear,
            "context" => Self::Context((!arg.is_empty()).then(|| arg.to_string())),
            "history" | "transcript" => Self::History,
            "summaries" | "json" => Self::Summaries,
            "help" => Self::Help,
            other => Self::Unknown(other.to_string()),
        };
        Some(command)
    }

    #[must_use]
    pub const fn help_text() -> &'static str {
        r"
Commands:
  /clear            Clear the conversation history
  /context [text]   Show the steering context, or replace it
  /history          Show the transcript so far
  /summaries        Show the structured data collected from replies
  /help             Show this help
  exit, quit        End the session

Anything else is sent to the assistant as a question.
"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_question() {
        assert_eq!(ReplCommand::parse("What is Rust?"), None);
        assert_eq!(ReplCommand::parse("  quitting time  "), None);
    }

    #[test]
    fn exit_words_and_commands() {
        assert_eq!(ReplCommand::parse("quit"), Some(ReplCommand::Exit));
        assert_eq!(ReplCommand::parse(" q "), Some(ReplCommand::Exit));
        assert_eq!(ReplCommand::parse("/EXIT"), Some(ReplCommand::Exit));
    }

    #[test]
    fn context_with_and_without_argument() {
        assert_eq!(
            ReplCommand::parse("/context"),
            Some(ReplCommand::Context(None))
        );
        assert_eq!(
            ReplCommand::parse("/context   Answer like a pirate.  "),
            Some(ReplCommand::Context(Some("Answer like a pirate.".to_string())))
        );
    }

    #[test]
    fn aliases_and_unknown_commands() {
        assert_eq!(ReplCommand::parse("/reset"), Some(ReplCommand::Clear));
        assert_eq!(ReplCommand::parse("/transcript"), Some(ReplCommand::History));
        assert_eq!(ReplCommand::parse("/json"), Some(ReplCommand::Summaries));
        assert_eq!(
            ReplCommand::parse("/frobnicate now"),
            Some(ReplCommand::Unknown("frobnicate".to_string()))
        );
    }
}
