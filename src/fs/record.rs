//! ### Block Records
//!
//! Every block on the drive holds one record:
//! ```text
//! byte    0      1      2      3      4 ... block_size-1
//!      status  track sector  block   payload
//! ```
//! The link (track,sector,block) locates the next block of a chain, zero means there is none.
//! The payload is zero padded out to the end of the block.
//!
//! Text payloads carry UTF-8 with a single null terminator after the last byte of the data.
//! Binary payloads are exactly the bytes given, the caller is responsible for knowing the length.

use log::{trace,debug};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt;
use super::{Tsb,Error};
use crate::img::{self,BlockDevice,RECORD_HEADER_LEN};

/// Enumerates the block status, available conversions are:
/// * Status to u8: `as u8`
/// * u8 to Status: `Status::from_u8` (use FromPrimitive trait)
#[derive(FromPrimitive,PartialEq,Eq,Clone,Copy,Debug)]
pub enum Status {
    Available = 0x00,
    Text = 0x01,
    Binary = 0x02
}

/// Logical data recovered from a record
#[derive(PartialEq,Eq,Clone,Debug)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>)
}

/// Text as is, binary as uppercase hex
impl fmt::Display for Payload {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f,"{}",s),
            Self::Binary(v) => write!(f,"{}",hex::encode_upper(v))
        }
    }
}

/// Structured representation of one block
#[derive(PartialEq,Eq,Clone,Debug)]
pub struct BlockRecord {
    pub status: Status,
    pub link: Tsb,
    data: Vec<u8>
}

impl BlockRecord {
    /// Create an available record with a zeroed payload of `payload_len` bytes
    pub fn new(payload_len: usize) -> Self {
        Self {
            status: Status::Available,
            link: Tsb::ZERO,
            data: vec![0;payload_len]
        }
    }
    /// Create a text record that has to fit in one block, such as a directory entry.
    pub fn single_text(txt: &str,payload_len: usize) -> Result<Self,Error> {
        let mut chunks = chunk(txt,false,payload_len)?;
        if chunks.len()>1 {
            return Err(Error::FileFormat(format!("text needs {} blocks, only 1 allowed",chunks.len())));
        }
        Ok(chunks.remove(0))
    }
    /// Decode a record from the flattened bytes of a block
    pub fn from_bytes(dat: &[u8]) -> Result<Self,Error> {
        if dat.len()<=RECORD_HEADER_LEN {
            return Err(Error::FileFormat(format!("block record of {} bytes is too short",dat.len())));
        }
        let status = match Status::from_u8(dat[0]) {
            Some(s) => s,
            None => return Err(Error::FileFormat(format!("unknown status byte {:02X}",dat[0])))
        };
        Ok(Self {
            status,
            link: Tsb::new(dat[1] as usize,dat[2] as usize,dat[3] as usize),
            data: dat[RECORD_HEADER_LEN..].to_vec()
        })
    }
    /// Decode a record from the served hex format, whitespace is ignored
    pub fn from_hex(hex_str: &str) -> Result<Self,Error> {
        let compact: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.len()==0 {
            return Err(Error::FileFormat("empty block string".to_string()));
        }
        match hex::decode(&compact) {
            Ok(dat) => Self::from_bytes(&dat),
            Err(e) => Err(Error::FileFormat(e.to_string()))
        }
    }
    /// Return flattened bytes (written to the device)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut ans: Vec<u8> = Vec::with_capacity(RECORD_HEADER_LEN + self.data.len());
        ans.push(self.status as u8);
        ans.push(self.link.track as u8);
        ans.push(self.link.sector as u8);
        ans.push(self.link.block as u8);
        ans.extend_from_slice(&self.data);
        ans
    }
    /// Return the served format
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.to_bytes())
    }
    /// Length of the flattened structure
    pub fn len(&self) -> usize {
        RECORD_HEADER_LEN + self.data.len()
    }
    pub fn is_available(&self) -> bool {
        self.status==Status::Available
    }
    pub fn is_linked(&self) -> bool {
        !self.link.is_zero()
    }
    /// Payload region including any padding
    pub fn raw_payload(&self) -> &[u8] {
        &self.data
    }
    /// Logical data held by the record, None if the record is available.
    /// Text loses its terminator and padding, binary keeps the whole payload region.
    pub fn payload(&self) -> Option<Payload> {
        match self.status {
            Status::Available => None,
            Status::Text => {
                let mut end = self.data.len();
                while end>0 && self.data[end-1]==0 {
                    end -= 1;
                }
                Some(Payload::Text(String::from_utf8_lossy(&self.data[0..end]).to_string()))
            },
            Status::Binary => Some(Payload::Binary(self.data.clone()))
        }
    }
    /// Mark as available, the payload is kept
    pub fn release(&mut self) {
        self.status = Status::Available;
    }
}

/// Pad `src` with zeros out to `len`
fn quantize(src: &[u8],len: usize) -> Vec<u8> {
    let mut padded = src.to_vec();
    padded.resize(len,0);
    padded
}

fn chunk_text(txt: &str,payload_len: usize) -> Result<Vec<BlockRecord>,Error> {
    if txt.as_bytes().contains(&0) {
        return Err(Error::FileFormat("text cannot contain a null character".to_string()));
    }
    let mut terminated = txt.as_bytes().to_vec();
    terminated.push(0);
    let mut ans: Vec<BlockRecord> = Vec::new();
    let mut start = 0;
    while start < terminated.len() {
        let mut end = usize::min(start+payload_len,terminated.len());
        // never split a character across blocks
        while end < terminated.len() && !txt.is_char_boundary(end) {
            end -= 1;
        }
        ans.push(BlockRecord {
            status: Status::Text,
            link: Tsb::ZERO,
            data: quantize(&terminated[start..end],payload_len)
        });
        start = end;
    }
    Ok(ans)
}

fn chunk_binary(hex_str: &str,payload_len: usize) -> Result<Vec<BlockRecord>,Error> {
    let dat = match hex::decode(hex_str) {
        Ok(v) => v,
        Err(hex::FromHexError::OddLength) => return Err(Error::FileFormat("Binary data must be a whole number of bytes.".to_string())),
        Err(e) => return Err(Error::FileFormat(e.to_string()))
    };
    let mut ans: Vec<BlockRecord> = dat.chunks(payload_len).map(|c| BlockRecord {
        status: Status::Binary,
        link: Tsb::ZERO,
        data: quantize(c,payload_len)
    }).collect();
    if ans.len()==0 {
        ans.push(BlockRecord {
            status: Status::Binary,
            link: Tsb::ZERO,
            data: vec![0;payload_len]
        });
    }
    Ok(ans)
}

/// Split data into the records needed to store it, in chain order with zero links.
/// Binary data is given as a hex string.  There is always at least one record.
pub fn chunk(data: &str,is_binary: bool,payload_len: usize) -> Result<Vec<BlockRecord>,Error> {
    let ans = match is_binary {
        true => chunk_binary(data,payload_len)?,
        false => chunk_text(data,payload_len)?
    };
    debug!("data needs {} blocks",ans.len());
    Ok(ans)
}

/// A record together with the address it lives at.
/// Handles are transient, the record on the device is the only lasting copy.
#[derive(Clone,Debug)]
pub struct FileHandle {
    pub addr: Tsb,
    pub record: BlockRecord
}

impl FileHandle {
    pub fn new(addr: Tsb,record: BlockRecord) -> Self {
        Self {
            addr,
            record
        }
    }
    /// Read and decode the record at `addr`
    pub fn load(dev: &dyn BlockDevice,addr: Tsb) -> Result<Self,Error> {
        let dat = dev.read_block(addr)?;
        Ok(Self::new(addr,BlockRecord::from_bytes(&dat)?))
    }
    /// Read the record this one links to
    pub fn load_linked(&self,dev: &dyn BlockDevice) -> Result<Self,Error> {
        Self::load(dev,self.record.link)
    }
    pub fn save(&self,dev: &mut dyn BlockDevice) -> Result<(),img::Error> {
        trace!("save record at {}",self.addr);
        dev.write_block(self.addr,&self.record.to_bytes())
    }
    /// Mark as available and persist
    pub fn release(&mut self,dev: &mut dyn BlockDevice) -> Result<(),img::Error> {
        self.record.release();
        self.save(dev)
    }
}
