/// One line of operator input.
///
/// Anything not starting with `:` is treated as decoded QR text, so a
/// keyboard-wedge scanner can type straight into the terminal.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Decode(&'a str),
    Start,
    Stop,
    List,
    Clear,
    Reject { id: &'a str, reason: &'a str },
    Help,
    Quit,
    Invalid(String),
}

pub const HELP: &str = "\
Scan a badge, or type one of:
  :start                 activate the scanner
  :stop                  release the scanner
  :list                  list every checked-in ID
  :clear                 delete every check-in
  :reject <id> <reason>  block an ID from checking in
  :quit                  exit";

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Command<'a> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix(':') else {
            return Command::Decode(line);
        };

        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        match name {
            "start" => Command::Start,
            "stop" => Command::Stop,
            "list" => Command::List,
            "clear" => Command::Clear,
            "help" | "?" => Command::Help,
            "quit" | "q" => Command::Quit,
            "reject" => match args.split_once(char::is_whitespace) {
                Some((id, reason)) if !reason.trim().is_empty() => Command::Reject {
                    id,
                    reason: reason.trim(),
                },
                _ => Command::Invalid("usage: :reject <id> <reason>".to_string()),
            },
            other => Command::Invalid(format!("unknown command ':{}' (try :help)", other)),
        }
    }
}
