//! ### Address-space walker
//!
//! Walks block addresses in row-major (track,sector,block) order between an inclusive start
//! and an inclusive termination.  By default the walk starts just after the master boot record
//! and terminates at the last block on the device.
//!
//! The `Cursor` only produces addresses, the `Walker` also reads the block at each one.
//! Both are single pass: once exhausted they stay exhausted, construct a new one to walk again.

use log::debug;
use super::Tsb;
use crate::img::{self,Geometry,BlockDevice};

/// Address following `addr`, or None if we run off the last track
fn successor(geometry: &Geometry,addr: Tsb) -> Option<Tsb> {
    let mut ans = addr;
    ans.block += 1;
    if ans.block >= geometry.blocks() {
        ans.block = 0;
        ans.sector += 1;
        if ans.sector >= geometry.sectors() {
            ans.sector = 0;
            ans.track += 1;
            if ans.track >= geometry.tracks() {
                return None;
            }
        }
    }
    Some(ans)
}

/// Bounded sequence of block addresses
#[derive(Clone,Debug)]
pub struct Cursor {
    geometry: Geometry,
    start: Option<Tsb>,
    end: Tsb,
    pending: Option<Tsb>,
    started: bool
}

impl Cursor {
    /// Cursor covering everything but the master boot record
    pub fn new(geometry: Geometry) -> Self {
        let start = successor(&geometry,Tsb::ZERO);
        Self {
            geometry,
            start,
            end: geometry.last(),
            pending: start,
            started: false
        }
    }
    /// Cursor covering every block, including the master boot record
    pub fn whole_device(geometry: Geometry) -> Self {
        let mut ans = Self::new(geometry);
        ans.set_start(Some(0),Some(0),Some(0));
        ans
    }
    /// Cursor covering a single track
    pub fn track(geometry: Geometry,track: usize) -> Self {
        let mut ans = Self::new(geometry);
        ans.set_start(Some(track),Some(0),Some(0));
        ans.set_termination(Some(track),Some(geometry.sectors()-1),Some(geometry.blocks()-1));
        ans
    }
    /// Set the first address (inclusive), a `None` coordinate keeps its previous value.
    /// Has no effect once the walk has begun.
    pub fn set_start(&mut self,track: Option<usize>,sector: Option<usize>,block: Option<usize>) {
        if self.started {
            debug!("start cannot move after the walk began");
            return;
        }
        let prev = self.start.unwrap_or(self.geometry.last());
        let start = Tsb::new(track.unwrap_or(prev.track),sector.unwrap_or(prev.sector),block.unwrap_or(prev.block));
        self.start = Some(start);
        self.pending = Some(start);
    }
    /// Set the last address (inclusive), a `None` coordinate keeps its previous value.
    pub fn set_termination(&mut self,track: Option<usize>,sector: Option<usize>,block: Option<usize>) {
        self.end = Tsb::new(track.unwrap_or(self.end.track),sector.unwrap_or(self.end.sector),block.unwrap_or(self.end.block));
    }
    pub fn is_terminated(&self) -> bool {
        self.started && self.pending.is_none()
    }
}

impl Iterator for Cursor {
    type Item = Tsb;
    fn next(&mut self) -> Option<Tsb> {
        self.started = true;
        let addr = self.pending?;
        if addr > self.end || !self.geometry.contains(addr) {
            debug!("walk ended before {}",addr);
            self.pending = None;
            return None;
        }
        self.pending = match addr==self.end {
            true => None,
            false => successor(&self.geometry,addr)
        };
        Some(addr)
    }
}

/// Walks a cursor over a device, yielding each address with the raw block found there
pub struct Walker<'a> {
    dev: &'a dyn BlockDevice,
    cursor: Cursor
}

impl<'a> Walker<'a> {
    /// Walker covering everything but the master boot record
    pub fn new(dev: &'a dyn BlockDevice) -> Self {
        Self {
            dev,
            cursor: Cursor::new(dev.geometry())
        }
    }
    /// Walker over an already configured cursor
    pub fn with_cursor(dev: &'a dyn BlockDevice,cursor: Cursor) -> Self {
        Self {
            dev,
            cursor
        }
    }
    pub fn set_start(&mut self,track: Option<usize>,sector: Option<usize>,block: Option<usize>) {
        self.cursor.set_start(track,sector,block);
    }
    pub fn set_termination(&mut self,track: Option<usize>,sector: Option<usize>,block: Option<usize>) {
        self.cursor.set_termination(track,sector,block);
    }
    pub fn is_terminated(&self) -> bool {
        self.cursor.is_terminated()
    }
}

impl<'a> Iterator for Walker<'a> {
    type Item = Result<(Tsb,Vec<u8>),img::Error>;
    fn next(&mut self) -> Option<Self::Item> {
        let addr = self.cursor.next()?;
        Some(self.dev.read_block(addr).map(|dat| (addr,dat)))
    }
}
