//! # File System Module
//!
//! The file system imposes files and a directory on the raw blocks of an `img::BlockDevice`.
//! It is organized in three layers:
//! * `record` encodes and decodes single blocks (status, link pointer, payload)
//! * `walker` generates block addresses in order and reads the blocks along the way
//! * `driver` implements the file operations and the interrupt service routine
//!
//! ## Layout
//!
//! Track 0 is the directory.  Each directory entry is one block whose payload is the file name,
//! and whose link pointer locates the first block of the file contents.  The block at (0,0,0) is
//! the master boot record, it is written by `format` and otherwise left alone.
//! All other tracks hold file contents.  The blocks of a file form a chain through their link
//! pointers, the last block links to (0,0,0), which means no link.
//!
//! This module also contains the `Tsb` structure, which locates a block.

pub mod record;
pub mod walker;
pub mod driver;

use std::fmt;
use std::str::FromStr;
use crate::img;

/// Track that holds the directory
pub const DIRECTORY_TRACK: usize = 0;

/// Enumerates file system errors.  The `Display` trait will print the message shown to the user.
#[derive(thiserror::Error,Debug,PartialEq,Eq)]
pub enum Error {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("File contains nothing.")]
    EmptyFile,
    #[error("Error: File already exists.")]
    FileExists(String),
    #[error("Cannot create file; directory full.")]
    DirectoryFull,
    #[error("Not enough free space for contents.")]
    DiskFull,
    #[error("Cannot delete MBR.")]
    Reserved,
    #[error("Invalid file name: {0}")]
    BadName(String),
    #[error("Bad data format: {0}")]
    FileFormat(String),
    #[error("File chain is damaged.")]
    DamagedChain,
    #[error("Device error: {0}")]
    Device(#[from] img::Error)
}

/// Block address given as (track,sector,block).
/// The zero address doubles as the null link.
#[derive(PartialEq,Eq,PartialOrd,Ord,Clone,Copy,Hash,Debug,Default)]
pub struct Tsb {
    pub track: usize,
    pub sector: usize,
    pub block: usize
}

impl Tsb {
    pub const ZERO: Tsb = Tsb { track: 0, sector: 0, block: 0 };
    pub fn new(track: usize,sector: usize,block: usize) -> Self {
        Self {
            track,
            sector,
            block
        }
    }
    pub fn is_zero(&self) -> bool {
        *self==Self::ZERO
    }
}

impl fmt::Display for Tsb {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,"{}:{}:{}",self.track,self.sector,self.block)
    }
}

/// Parse `t:s:b` or `t,s,b`
impl FromStr for Tsb {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self,Self::Err> {
        let fields: Vec<&str> = s.split(|c| c==':' || c==',').map(|x| x.trim()).collect();
        if fields.len()!=3 {
            return Err(Error::FileFormat(format!("address `{}` needs three coordinates",s)));
        }
        let mut vals = [0;3];
        for i in 0..3 {
            vals[i] = match usize::from_str(fields[i]) {
                Ok(v) => v,
                Err(_) => return Err(Error::FileFormat(format!("address `{}` has a bad coordinate",s)))
            };
        }
        Ok(Self::new(vals[0],vals[1],vals[2]))
    }
}
