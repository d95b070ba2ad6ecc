//! # Block Device Module
//!
//! Block devices are represented by objects implementing the `BlockDevice` trait.
//! At present the only implementation is the in-memory `hdd::HardDrive`.
//! This object is best thought of as the platters plus the controller that runs them.
//!
//! ## Basic Functions
//!
//! The trait reads and writes whole blocks addressed by a `fs::Tsb`.
//! There are no partial writes, every write replaces the complete block.
//! The device knows nothing about records, links, or files, that is the job of `fs`.
//!
//! ## Storage Format
//!
//! Internally blocks are plain bytes.  The served format, i.e., what a display or
//! an external inspector sees, is the uppercase hex string of the block with no
//! separators.  Conversion to and from hex only happens at this boundary, see
//! `BlockDevice::read_hex` and `BlockDevice::write_hex`.
//!
//! ## Geometry
//!
//! Geometry is fixed when the device is created and is read-only afterwards.
//! The link pointer of a block record stores one byte per coordinate, so no
//! coordinate may exceed 256 positions.  The whole drive is kept in memory, so its
//! total size is limited to `MAX_DEVICE_BYTES`.

pub mod hdd;

use std::fmt;
use log::error;
use crate::fs::Tsb;

pub const DEFAULT_TRACKS: usize = 4;
pub const DEFAULT_SECTORS: usize = 8;
pub const DEFAULT_BLOCKS: usize = 8;
pub const DEFAULT_BLOCK_SIZE: usize = 64;
/// status byte plus three link bytes
pub const RECORD_HEADER_LEN: usize = 4;

const MAX_COORDINATE: usize = 256;
const MIN_BLOCK_SIZE: usize = 8;
const MAX_BLOCK_SIZE: usize = 4096;
/// the whole drive lives in memory
pub const MAX_DEVICE_BYTES: usize = 1 << 24;

/// Enumerates block device errors.  The `Display` trait will print equivalent long message.
#[derive(thiserror::Error,Debug,PartialEq,Eq)]
pub enum Error {
    #[error("geometric coordinate out of range")]
    GeometryMismatch,
    #[error("block size did not match the request")]
    BlockSizeMismatch,
    #[error("geometry is not supported")]
    UnsupportedGeometry,
    #[error("block data is not valid hex")]
    HexFormat
}

/// Fixed geometry of a block device.
#[derive(PartialEq,Eq,Clone,Copy,Debug)]
pub struct Geometry {
    tracks: usize,
    sectors: usize,
    blocks: usize,
    block_size: usize
}

impl Geometry {
    /// Create a geometry, refusing anything the block record encoding cannot address.
    /// There must be at least one data track besides the directory track.
    pub fn new(tracks: usize,sectors: usize,blocks: usize,block_size: usize) -> Result<Self,Error> {
        if tracks<2 || tracks>MAX_COORDINATE {
            error!("track count {} is out of range 2..={}",tracks,MAX_COORDINATE);
            return Err(Error::UnsupportedGeometry);
        }
        if sectors<1 || sectors>MAX_COORDINATE || blocks<1 || blocks>MAX_COORDINATE {
            error!("sectors {} and blocks {} must be in range 1..={}",sectors,blocks,MAX_COORDINATE);
            return Err(Error::UnsupportedGeometry);
        }
        if block_size<MIN_BLOCK_SIZE || block_size>MAX_BLOCK_SIZE {
            error!("block size {} is out of range {}..={}",block_size,MIN_BLOCK_SIZE,MAX_BLOCK_SIZE);
            return Err(Error::UnsupportedGeometry);
        }
        let total = tracks.checked_mul(sectors)
            .and_then(|x| x.checked_mul(blocks))
            .and_then(|x| x.checked_mul(block_size));
        match total {
            Some(bytes) if bytes <= MAX_DEVICE_BYTES => {},
            _ => {
                error!("drive would exceed {} bytes",MAX_DEVICE_BYTES);
                return Err(Error::UnsupportedGeometry);
            }
        }
        Ok(Self {
            tracks,
            sectors,
            blocks,
            block_size
        })
    }
    pub fn tracks(&self) -> usize {
        self.tracks
    }
    pub fn sectors(&self) -> usize {
        self.sectors
    }
    /// blocks per sector
    pub fn blocks(&self) -> usize {
        self.blocks
    }
    pub fn block_size(&self) -> usize {
        self.block_size
    }
    /// bytes available for data in each block record
    pub fn payload_len(&self) -> usize {
        self.block_size - RECORD_HEADER_LEN
    }
    /// total number of blocks on the device
    pub fn block_count(&self) -> usize {
        self.tracks * self.sectors * self.blocks
    }
    pub fn contains(&self,addr: Tsb) -> bool {
        addr.track < self.tracks && addr.sector < self.sectors && addr.block < self.blocks
    }
    /// The highest address on the device
    pub fn last(&self) -> Tsb {
        Tsb::new(self.tracks-1,self.sectors-1,self.blocks-1)
    }
    /// Position of the address in row-major order
    pub fn offset(&self,addr: Tsb) -> Result<usize,Error> {
        if !self.contains(addr) {
            error!("exceeded bounds: maxima are track {}, sector {}, block {}",self.tracks-1,self.sectors-1,self.blocks-1);
            return Err(Error::GeometryMismatch);
        }
        Ok((addr.track*self.sectors + addr.sector)*self.blocks + addr.block)
    }
    pub fn to_json(&self) -> json::JsonValue {
        json::object! {
            tracks: self.tracks,
            sectors: self.sectors,
            blocks: self.blocks,
            block_size: self.block_size
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            tracks: DEFAULT_TRACKS,
            sectors: DEFAULT_SECTORS,
            blocks: DEFAULT_BLOCKS,
            block_size: DEFAULT_BLOCK_SIZE
        }
    }
}

/// Allows the geometry to be displayed to the console using `println!`.  This also
/// derives `to_string`, so the structure can be converted to `String`.
impl fmt::Display for Geometry {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,"{}/{}/{}/{}",self.tracks,self.sectors,self.blocks,self.block_size)
    }
}

/// The main trait for working with a block device.
/// The corresponding trait object serves as storage for `fs::driver::Driver`.
pub trait BlockDevice {
    fn geometry(&self) -> Geometry;
    /// Read the whole block at `addr`.  A block that was never written reads as the format fill.
    fn read_block(&self,addr: Tsb) -> Result<Vec<u8>,Error>;
    /// Replace the whole block at `addr`, `dat` must be exactly one block long.
    fn write_block(&mut self,addr: Tsb,dat: &[u8]) -> Result<(),Error>;
    /// Read a block in the served format, uppercase hex with no separators.
    fn read_hex(&self,addr: Tsb) -> Result<String,Error> {
        Ok(hex::encode_upper(self.read_block(addr)?))
    }
    /// Write a block given in the served format.  Either case of hex digit is accepted.
    fn write_hex(&mut self,addr: Tsb,hex_str: &str) -> Result<(),Error> {
        match hex::decode(hex_str) {
            Ok(dat) => self.write_block(addr,&dat),
            Err(e) => {
                error!("could not decode block for {}: {}",addr,e);
                Err(Error::HexFormat)
            }
        }
    }
    /// Write the device contents into a JSON string, blocks appear in address order.
    fn to_json(&self,indent: Option<u16>) -> Result<String,Error> {
        let geometry = self.geometry();
        let mut blocks = json::JsonValue::new_object();
        for t in 0..geometry.tracks() {
            for s in 0..geometry.sectors() {
                for b in 0..geometry.blocks() {
                    let addr = Tsb::new(t,s,b);
                    blocks[addr.to_string()] = json::JsonValue::String(self.read_hex(addr)?);
                }
            }
        }
        let root = json::object! {
            geometry: geometry.to_json(),
            blocks: blocks
        };
        if let Some(spaces) = indent {
            Ok(json::stringify_pretty(root,spaces))
        } else {
            Ok(json::stringify(root))
        }
    }
}
