use std::{path::PathBuf, str::FromStr};

use strum::EnumString;
use thiserror::Error;

use crate::domain::models::normalize_short_path;

pub const HELP: &str = "\
Commands:
  login <password>                 set the admin password and load the list
  list                             show the current list
  refresh                          fetch the list again
  new <short|-> <target> [comment] create a short URL ('-' leaves the short path empty)
  copy <item>                      copy the public URL
  qr <item> [file]                 save the QR code as PNG
  delete <item>                    delete after confirming (run twice)
  delete! <item>                   delete without confirming
  help                             show this help
  quit                             leave
Items are referenced by list number or short path.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
enum Keyword {
    #[strum(serialize = "login", serialize = "password")]
    Login,
    #[strum(serialize = "list", serialize = "ls")]
    List,
    #[strum(serialize = "refresh", serialize = "reload")]
    Refresh,
    #[strum(serialize = "new", serialize = "create")]
    New,
    #[strum(serialize = "copy", serialize = "cp")]
    Copy,
    #[strum(serialize = "qr")]
    Qr,
    #[strum(serialize = "delete", serialize = "rm")]
    Delete,
    #[strum(serialize = "delete!", serialize = "rm!")]
    ForceDelete,
    #[strum(serialize = "help", serialize = "?")]
    Help,
    #[strum(serialize = "quit", serialize = "exit")]
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRef {
    /// 1-based position in the rendered list.
    Index(usize),
    ShortUrl(String),
}

impl FromStr for ItemRef {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::MissingItem);
        }
        match s.parse::<usize>() {
            Ok(0) => Err(ParseError::MissingItem),
            Ok(index) => Ok(ItemRef::Index(index)),
            Err(_) => Ok(ItemRef::ShortUrl(normalize_short_path(s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(String),
    List,
    Refresh,
    New {
        short_path: String,
        target_url: String,
        comment: String,
    },
    Copy(ItemRef),
    Qr {
        item: ItemRef,
        file: Option<PathBuf>,
    },
    Delete {
        item: ItemRef,
        bypass: bool,
    },
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command '{0}'; type 'help' for a list")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Missing item: use a list number (starting at 1) or a short path")]
    MissingItem,
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (s, ""),
    }
}

impl Command {
    /// Parses one input line; blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = split_word(line);
        let keyword =
            Keyword::from_str(word).map_err(|_| ParseError::Unknown(word.to_string()))?;

        let command = match keyword {
            Keyword::Login => {
                if rest.is_empty() {
                    return Err(ParseError::Usage("login <password>"));
                }
                Command::Login(rest.to_string())
            }
            Keyword::List => Command::List,
            Keyword::Refresh => Command::Refresh,
            Keyword::New => {
                let (short, rest) = split_word(rest);
                let (target, comment) = split_word(rest);
                if short.is_empty() || target.is_empty() {
                    return Err(ParseError::Usage("new <short|-> <target> [comment]"));
                }
                Command::New {
                    short_path: if short == "-" { String::new() } else { short.to_string() },
                    target_url: target.to_string(),
                    comment: comment.trim_end().to_string(),
                }
            }
            Keyword::Copy => Command::Copy(rest.parse()?),
            Keyword::Qr => {
                let (item, file) = split_word(rest);
                Command::Qr {
                    item: item.parse()?,
                    file: (!file.is_empty()).then(|| PathBuf::from(file.trim_end())),
                }
            }
            Keyword::Delete | Keyword::ForceDelete => Command::Delete {
                item: rest.parse()?,
                bypass: keyword == Keyword::ForceDelete,
            },
            Keyword::Help => Command::Help,
            Keyword::Quit => Command::Quit,
        };
        Ok(Some(command))
    }
}
