//! # Driver Commands
//!
//! Requests arrive at the driver's interrupt service routine as a command name,
//! an optional file name, and optional data.  The command names form a closed set,
//! anything else is a protocol error that the kernel treats as a trap.
//!
//! This module also defines the `OutputSink` the driver reports to, and the `run`
//! subcommand that feeds command lines to a driver.

pub mod run;

use std::fmt;
use std::str::FromStr;
use regex::Regex;

#[derive(thiserror::Error,Debug,PartialEq,Eq)]
pub enum CommandError {
    #[error("Invalid HDD Driver command.")]
    InvalidCommand,
    #[error("Command line could not be interpreted")]
    BadSyntax
}

/// Commands understood by the hard drive driver
#[derive(PartialEq,Eq,Clone,Copy,Debug)]
pub enum Command {
    Create,
    Read,
    Write,
    Delete,
    List,
    Format,
    SwapWrite,
    SwapRead,
    SwapDelete
}

impl Command {
    /// Swap commands report failures to the log only
    pub fn is_swap(&self) -> bool {
        match self {
            Self::SwapWrite | Self::SwapRead | Self::SwapDelete => true,
            _ => false
        }
    }
}

impl FromStr for Command {
    type Err = CommandError;
    fn from_str(s: &str) -> Result<Self,Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "delete" => Ok(Self::Delete),
            "list" => Ok(Self::List),
            "format" => Ok(Self::Format),
            "swap-write" => Ok(Self::SwapWrite),
            "swap-read" => Ok(Self::SwapRead),
            "swap-delete" => Ok(Self::SwapDelete),
            _ => Err(CommandError::InvalidCommand)
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f,"create"),
            Self::Read => write!(f,"read"),
            Self::Write => write!(f,"write"),
            Self::Delete => write!(f,"delete"),
            Self::List => write!(f,"list"),
            Self::Format => write!(f,"format"),
            Self::SwapWrite => write!(f,"swap-write"),
            Self::SwapRead => write!(f,"swap-read"),
            Self::SwapDelete => write!(f,"swap-delete")
        }
    }
}

/// Parameters of one interrupt
#[derive(PartialEq,Eq,Clone,Debug)]
pub struct Request {
    pub command: Command,
    pub filename: Option<String>,
    pub data: Option<String>
}

impl Request {
    pub fn new(command: Command,filename: Option<&str>,data: Option<&str>) -> Self {
        Self {
            command,
            filename: filename.map(|s| s.to_string()),
            data: data.map(|s| s.to_string())
        }
    }
    /// Build a request from the loosely typed interrupt parameters
    pub fn parse(command: &str,filename: Option<&str>,data: Option<&str>) -> Result<Self,CommandError> {
        Ok(Self::new(Command::from_str(command)?,filename,data))
    }
    /// Parse a line of the form `<command> [filename] [data...]`.
    /// Data runs to the end of the line, a pair of enclosing double quotes is removed.
    /// Returns None for blank lines and lines starting with `#`.
    pub fn from_line(line: &str) -> Result<Option<Self>,CommandError> {
        let trimmed = line.trim();
        if trimmed.len()==0 || trimmed.starts_with('#') {
            return Ok(None);
        }
        let patt = Regex::new(r"^(\S+)(?:\s+(\S+))?(?:\s+(.*))?$").expect("failed to parse regex");
        let caps = match patt.captures(trimmed) {
            Some(c) => c,
            None => return Err(CommandError::BadSyntax)
        };
        let command = caps.get(1).map(|m| m.as_str()).ok_or(CommandError::BadSyntax)?;
        let filename = caps.get(2).map(|m| m.as_str());
        let data = caps.get(3).map(|m| unquote(m.as_str()));
        Ok(Some(Self::parse(command,filename,data)?))
    }
}

fn unquote(s: &str) -> &str {
    if s.len()>=2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len()-1]
    } else {
        s
    }
}

/// Write-only text sink the driver reports results to
pub trait OutputSink {
    /// Put a complete message on its own line
    fn put_message(&mut self,msg: &str);
    /// Put text at the current position
    fn put_text(&mut self,txt: &str);
    /// End the current line
    fn advance_line(&mut self);
}

/// Sink that writes to stdout
pub struct Console;

impl OutputSink for Console {
    fn put_message(&mut self,msg: &str) {
        println!("{}",msg);
    }
    fn put_text(&mut self,txt: &str) {
        print!("{}",txt);
    }
    fn advance_line(&mut self) {
        println!();
    }
}

/// Sink that keeps everything in memory, line by line
#[derive(Default)]
pub struct Transcript {
    lines: Vec<String>,
    curr: String
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }
    /// Completed lines, the line in progress is not included
    pub fn lines(&self) -> &Vec<String> {
        &self.lines
    }
    /// Everything written so far including the line in progress
    pub fn text(&self) -> String {
        let mut ans = self.lines.join("\n");
        if self.curr.len() > 0 {
            if ans.len() > 0 {
                ans += "\n";
            }
            ans += &self.curr;
        }
        ans
    }
    pub fn clear(&mut self) {
        self.lines.clear();
        self.curr.clear();
    }
}

impl OutputSink for Transcript {
    fn put_message(&mut self,msg: &str) {
        if self.curr.len() > 0 {
            self.advance_line();
        }
        self.lines.push(msg.to_string());
    }
    fn put_text(&mut self,txt: &str) {
        self.curr += txt;
    }
    fn advance_line(&mut self) {
        self.lines.push(std::mem::take(&mut self.curr));
    }
}
