//! ## Run subcommand
//!
//! Boots a freshly formatted drive and feeds it driver command lines, either from a
//! script file or from stdin.  Besides the driver commands, a line `inspect <t:s:b>`
//! shows a hex dump of one block.

use std::io::{BufRead,Write};
use std::str::FromStr;
use log::{info,error};
use super::{Request,OutputSink,Console};
use crate::fs::Tsb;
use crate::fs::driver::Driver;
use crate::img::Geometry;
use crate::{STDRESULT,DYNERR};

const RCH: &str = "unreachable was reached";

/// Build the geometry from the common command line options
pub fn geometry_from_args(cmd: &clap::ArgMatches) -> Result<Geometry,DYNERR> {
    let tracks = *cmd.get_one::<usize>("tracks").expect(RCH);
    let sectors = *cmd.get_one::<usize>("sectors").expect(RCH);
    let blocks = *cmd.get_one::<usize>("blocks").expect(RCH);
    let block_size = *cmd.get_one::<usize>("block-size").expect(RCH);
    Ok(Geometry::new(tracks,sectors,blocks,block_size)?)
}

/// Hex dump of the block at `addr`, given as `t:s:b`
fn inspect(driver: &Driver,addr: &str) -> Result<String,DYNERR> {
    let addr = Tsb::from_str(addr)?;
    let dat = driver.get_img().read_block(addr)?;
    Ok(crate::display_block(addr,&dat))
}

/// Execute command lines until the reader is exhausted.
/// An unknown command stops the run with the protocol error.
pub fn run_lines(driver: &mut Driver,reader: &mut dyn BufRead,sink: &mut dyn OutputSink,prompt: bool) -> STDRESULT {
    let mut line = String::new();
    loop {
        if prompt {
            print!("> ");
            std::io::stdout().flush()?;
        }
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let mut words = line.split_whitespace();
        if words.next()==Some("inspect") {
            match inspect(driver,words.next().unwrap_or("")) {
                Ok(listing) => sink.put_message(&listing),
                Err(e) => sink.put_message(&format!("Cannot inspect block: {}",e))
            }
            continue;
        }
        match Request::from_line(&line) {
            Ok(Some(req)) => driver.service(&req,sink),
            Ok(None) => continue,
            Err(e) => {
                error!("{} ({})",e,line.trim());
                return Err(Box::new(e));
            }
        }
    }
}

pub fn run(cmd: &clap::ArgMatches) -> STDRESULT {
    let geometry = geometry_from_args(cmd)?;
    let mut driver = Driver::from_img(Box::new(crate::img::hdd::HardDrive::create(geometry)));
    if let Some(name) = cmd.get_one::<String>("mbr") {
        driver.set_mbr_name(name)?;
    }
    driver.format()?;
    info!("booted drive with geometry {}",geometry);
    let mut console = Console;
    match cmd.get_one::<String>("script") {
        Some(path) => {
            let file = std::fs::File::open(path)?;
            let mut reader = std::io::BufReader::new(file);
            run_lines(&mut driver,&mut reader,&mut console,false)?;
        },
        None => {
            let prompt = atty::is(atty::Stream::Stdin);
            let stdin = std::io::stdin();
            let mut reader = stdin.lock();
            run_lines(&mut driver,&mut reader,&mut console,prompt)?;
        }
    }
    if cmd.get_flag("dump") {
        let indent = cmd.get_one::<u16>("indent").copied();
        println!("{}",driver.get_img().to_json(indent)?);
    }
    Ok(())
}
