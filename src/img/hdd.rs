//! ## In-memory hard drive
//!
//! The drive is a sequential dump of all the blocks in row-major (track,sector,block) order.
//! Contents live only as long as the object, nothing is saved to the host.

use log::{trace,error};
use crate::img;
use crate::fs::Tsb;

/// Byte used to fill a blank drive
pub const FORMAT_FILL: u8 = 0;

/// Wrapper for the drive data.
pub struct HardDrive {
    geometry: img::Geometry,
    data: Vec<u8>
}

impl HardDrive {
    /// Create a blank drive, every block holds the format fill.
    pub fn create(geometry: img::Geometry) -> Self {
        Self {
            geometry,
            data: vec![FORMAT_FILL;geometry.block_count()*geometry.block_size()]
        }
    }
    fn byte_offset(&self,addr: Tsb) -> Result<usize,img::Error> {
        Ok(self.geometry.offset(addr)? * self.geometry.block_size())
    }
}

impl Default for HardDrive {
    fn default() -> Self {
        Self::create(img::Geometry::default())
    }
}

impl img::BlockDevice for HardDrive {
    fn geometry(&self) -> img::Geometry {
        self.geometry
    }
    fn read_block(&self,addr: Tsb) -> Result<Vec<u8>,img::Error> {
        trace!("read {}",addr);
        let offset = self.byte_offset(addr)?;
        Ok(self.data[offset..offset+self.geometry.block_size()].to_vec())
    }
    fn write_block(&mut self,addr: Tsb,dat: &[u8]) -> Result<(),img::Error> {
        trace!("write {}",addr);
        let offset = self.byte_offset(addr)?;
        if dat.len()!=self.geometry.block_size() {
            error!("block at {} needs {} bytes, got {}",addr,self.geometry.block_size(),dat.len());
            return Err(img::Error::BlockSizeMismatch);
        }
        self.data[offset..offset+dat.len()].copy_from_slice(dat);
        Ok(())
    }
}
