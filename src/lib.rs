//! # `simhdd` main library
//!
//! This library simulates the hard drive of an educational operating system, together with
//! the small linked-allocation file system the OS keeps on it.
//!
//! ## Architecture
//!
//! Operations are built around two objects:
//! * `img::BlockDevice` stores fixed size blocks addressed by (track,sector,block), it does not try to interpret them
//! * `fs::driver::Driver` imposes the file system on the device and services driver interrupts
//!
//! When a `Driver` is created it takes ownership of some `BlockDevice`.
//! Nothing persists beyond the lifetime of the device object.
//!
//! ## File System
//!
//! * track 0 is the directory, one block per file name
//! * all other tracks hold file contents, chained together by link pointers
//! * block (0,0,0) is the master boot record
//!
//! Each block is a record with a status byte, a three byte link, and a payload.
//! See `fs::record` for the encoding and `fs::walker` for the order in which blocks are searched.
//!
//! ## Commands
//!
//! The kernel talks to the driver through `Driver::isr`, passing a command name, a file name,
//! and data.  Results are reported to a `commands::OutputSink`.  The `commands` module also
//! has the `run` subcommand used by the `simhdd` binary.

pub mod fs;
pub mod img;
pub mod commands;

use std::fmt::Write;
use colored::Colorize;
use fs::Tsb;
use fs::record::Status;
use num_traits::FromPrimitive;

pub type DYNERR = Box<dyn std::error::Error>;
pub type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Create a freshly formatted in-memory drive with default geometry
pub fn boot() -> Result<fs::driver::Driver,fs::Error> {
    fs::driver::Driver::boot(img::Geometry::default())
}

/// Display a block in rows of hex and ascii.
/// The header shows the address, the status, and the link.
pub fn display_block(addr: Tsb,block: &[u8]) -> String {
    let mut ans = String::new();
    if block.len() > img::RECORD_HEADER_LEN {
        let status = match Status::from_u8(block[0]) {
            Some(Status::Available) => "available".dimmed(),
            Some(Status::Text) => "text".green(),
            Some(Status::Binary) => "binary".cyan(),
            None => "invalid".red()
        };
        writeln!(&mut ans,"{} {} link {}:{}:{}",addr,status,block[1],block[2],block[3]).expect("unreachable");
    }
    let mut slice_start = 0;
    while slice_start < block.len() {
        let slice_end = usize::min(slice_start + 16,block.len());
        let slice = &block[slice_start..slice_end];
        let txt: Vec<u8> = slice.iter().map(|c| match *c {
            x if x<32 => '.' as u8,
            x if x<127 => x,
            _ => '.' as u8
        }).collect();
        write!(&mut ans,"{:04X} : ",slice_start).expect("unreachable");
        for byte in slice {
            write!(&mut ans,"{:02X} ",byte).expect("unreachable");
        }
        for _blank in slice_end..slice_start+16 {
            ans += "   ";
        }
        writeln!(&mut ans,"| {}",String::from_utf8_lossy(&txt)).expect("unreachable");
        slice_start += 16;
    }
    ans.trim_end().to_string()
}
