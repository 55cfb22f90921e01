//! Line-oriented interactive shell.
//!
//! Each line is one command. Selection positions are shown and accepted
//! 1-based; the session underneath is 0-based.

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read files (or glob patterns) and append them to the selection.
    Add(Vec<String>),
    /// Remove the file at a 1-based position.
    Remove(usize),
    /// List the selection.
    List,
    /// Merge the selection and write the result.
    Merge,
    /// Report what a merge would produce.
    Plan,
    /// Remove everything from the selection.
    Clear,
    /// Show the command summary.
    Help,
    /// Leave the shell.
    Quit,
    /// Blank line.
    Empty,
}

pub const HELP: &str = "\
Commands:
  add <path>...   add files or glob patterns to the selection
  rm <n>          remove the file at position n
  ls              list the selection
  merge           merge the selection into the next output file
  plan            show what merge would produce, without writing
  clear           remove every file from the selection
  help            show this help
  quit            leave the shell";

impl Command {
    /// Parse one input line.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Self::Empty);
        };
        let args: Vec<String> = words.map(str::to_string).collect();

        match verb {
            "add" | "a" => {
                if args.is_empty() {
                    Err("usage: add <path>...".to_string())
                } else {
                    Ok(Self::Add(args))
                }
            }
            "rm" | "remove" => match args.as_slice() {
                [position] => match position.parse::<usize>() {
                    Ok(n) if n > 0 => Ok(Self::Remove(n)),
                    _ => Err(format!("not a position: {position}")),
                },
                _ => Err("usage: rm <n>".to_string()),
            },
            "ls" | "list" => Ok(Self::List),
            "merge" | "m" => Ok(Self::Merge),
            "plan" => Ok(Self::Plan),
            "clear" => Ok(Self::Clear),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("unknown command: {other} (try 'help')")),
        }
    }
}

/// Whether a confirmation answer means yes.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
