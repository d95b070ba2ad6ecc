//! ### Hard drive device driver
//!
//! The driver owns the block device and implements the file operations on it.
//! Requests from the kernel come in through `Driver::isr`, which runs the operation
//! to completion, reports to an `OutputSink`, and then calls the update hook so that
//! a display can refresh itself.
//!
//! Allocation is first fit in address order.  Writing a file always releases its old
//! chain first, so a write that runs out of space leaves the directory entry linked to
//! blocks that are already available.

use log::{trace,debug,info,warn,error};
use super::record::{self,BlockRecord,FileHandle,Payload};
use super::walker::{Cursor,Walker};
use super::{Tsb,Error,DIRECTORY_TRACK};
use crate::img::{self,BlockDevice,Geometry};
use crate::img::hdd::{HardDrive,FORMAT_FILL};
use crate::commands::{Command,CommandError,OutputSink,Request};

/// Name stored in the master boot record
pub const MBR_NAME: &str = "MBR";

/// Called with the device after every serviced interrupt
pub type UpdateHook = Box<dyn FnMut(&dyn BlockDevice)>;

/// The primary interface for file operations.
pub struct Driver {
    img: Box<dyn BlockDevice>,
    mbr_name: String,
    swap_buffer: Option<String>,
    update_hook: Option<UpdateHook>
}

impl Driver {
    /// Create a driver using the given device as storage.
    /// The driver takes ownership of the device, it is not formatted.
    pub fn from_img(img: Box<dyn BlockDevice>) -> Self {
        Self {
            img,
            mbr_name: MBR_NAME.to_string(),
            swap_buffer: None,
            update_hook: None
        }
    }
    /// Create a fresh in-memory drive with the given geometry and format it.
    pub fn boot(geometry: Geometry) -> Result<Self,Error> {
        let mut ans = Self::from_img(Box::new(HardDrive::create(geometry)));
        ans.format()?;
        Ok(ans)
    }
    /// Change the reserved name and rewrite the master boot record with it.
    /// Refused if a file already has the name.
    pub fn set_mbr_name(&mut self,name: &str) -> Result<(),Error> {
        let payload_len = self.geometry().payload_len();
        validate_name(name,payload_len)?;
        match self.find_file(name) {
            Ok(_) => return Err(Error::FileExists(name.to_string())),
            Err(Error::FileNotFound(_)) => {},
            Err(e) => return Err(e)
        }
        self.mbr_name = name.to_string();
        let mbr = FileHandle::new(Tsb::ZERO,BlockRecord::single_text(name,payload_len)?);
        mbr.save(self.img.as_mut())?;
        Ok(())
    }
    pub fn mbr_name(&self) -> &str {
        &self.mbr_name
    }
    pub fn get_img(&self) -> &dyn BlockDevice {
        self.img.as_ref()
    }
    pub fn geometry(&self) -> Geometry {
        self.img.geometry()
    }
    /// Install the hook called after each interrupt, replacing any previous one
    pub fn set_update_hook(&mut self,hook: UpdateHook) {
        self.update_hook = Some(hook);
    }
    /// Data retrieved by the last successful `swap-read`
    pub fn swap_buffer(&self) -> Option<&str> {
        self.swap_buffer.as_deref()
    }
    pub fn take_swap_buffer(&mut self) -> Option<String> {
        self.swap_buffer.take()
    }
    /// Directory blocks, the master boot record is excluded
    fn directory_walker(&self) -> Walker<'_> {
        let geometry = self.geometry();
        let mut cursor = Cursor::new(geometry);
        cursor.set_termination(Some(DIRECTORY_TRACK),Some(geometry.sectors()-1),Some(geometry.blocks()-1));
        Walker::with_cursor(self.img.as_ref(),cursor)
    }
    /// Everything after the directory track
    fn data_walker(&self) -> Walker<'_> {
        let mut cursor = Cursor::new(self.geometry());
        cursor.set_start(Some(DIRECTORY_TRACK+1),Some(0),Some(0));
        Walker::with_cursor(self.img.as_ref(),cursor)
    }
    /// Scan the directory for a live entry with the given name
    fn find_file(&self,name: &str) -> Result<FileHandle,Error> {
        for item in self.directory_walker() {
            let (addr,dat) = item?;
            let rec = BlockRecord::from_bytes(&dat)?;
            if let Some(Payload::Text(fname)) = rec.payload() {
                if fname==name {
                    trace!("found {} at {}",name,addr);
                    return Ok(FileHandle::new(addr,rec));
                }
            }
        }
        Err(Error::FileNotFound(name.to_string()))
    }
    /// First available directory entry
    fn find_free_entry(&self) -> Result<FileHandle,Error> {
        for item in self.directory_walker() {
            let (addr,dat) = item?;
            let rec = BlockRecord::from_bytes(&dat)?;
            if rec.is_available() {
                return Ok(FileHandle::new(addr,rec));
            }
        }
        Err(Error::DirectoryFull)
    }
    /// First `count` available data blocks in address order, or fewer if the disk runs out
    fn find_free_blocks(&self,count: usize) -> Result<Vec<Tsb>,Error> {
        let mut ans: Vec<Tsb> = Vec::new();
        if count==0 {
            return Ok(ans);
        }
        for item in self.data_walker() {
            let (addr,dat) = item?;
            if BlockRecord::from_bytes(&dat)?.is_available() {
                ans.push(addr);
                if ans.len()==count {
                    break;
                }
            }
        }
        Ok(ans)
    }
    /// Load the chain of content blocks hanging off `head`, not including `head`.
    /// Chains longer than the device, or that wander into the directory, are damaged.
    fn get_chain(&self,head: &FileHandle) -> Result<Vec<FileHandle>,Error> {
        let mut ans: Vec<FileHandle> = Vec::new();
        let mut curr = head.clone();
        let max_reps = self.geometry().block_count();
        while curr.record.is_linked() {
            if ans.len() >= max_reps || curr.record.link.track==DIRECTORY_TRACK {
                error!("chain from {} is damaged at {}",head.addr,curr.record.link);
                return Err(Error::DamagedChain);
            }
            curr = curr.load_linked(self.img.as_ref())?;
            ans.push(curr.clone());
        }
        Ok(ans)
    }
    /// Mark every block in the chain as available, `head` too if `inclusive`
    fn release_chain(&mut self,head: &mut FileHandle,inclusive: bool) -> Result<(),Error> {
        let chain = self.get_chain(head)?;
        debug!("releasing {} blocks after {}",chain.len(),head.addr);
        for mut link in chain {
            link.release(self.img.as_mut())?;
        }
        if inclusive {
            head.release(self.img.as_mut())?;
        }
        Ok(())
    }
    /// Create an empty file.  If `for_swap` an existing file of the same name is accepted as is.
    pub fn create(&mut self,name: &str,for_swap: bool) -> Result<(),Error> {
        info!("Creating file: {}",name);
        let payload_len = self.geometry().payload_len();
        validate_name(name,payload_len)?;
        if name==self.mbr_name {
            return Err(Error::BadName(name.to_string()));
        }
        match self.find_file(name) {
            Ok(_) if for_swap => return Ok(()),
            Ok(_) => return Err(Error::FileExists(name.to_string())),
            Err(Error::FileNotFound(_)) => {},
            Err(e) => return Err(e)
        }
        let mut entry = self.find_free_entry()?;
        entry.record = BlockRecord::single_text(name,payload_len)?;
        entry.save(self.img.as_mut())?;
        Ok(())
    }
    /// Read the whole file.  Text comes back as is, binary as uppercase hex of every block.
    pub fn read(&self,name: &str) -> Result<String,Error> {
        info!("Reading file: {}",name);
        let entry = self.find_file(name)?;
        if !entry.record.is_linked() {
            return Err(Error::EmptyFile);
        }
        let mut contents = String::new();
        for link in self.get_chain(&entry)? {
            if let Some(payload) = link.record.payload() {
                contents += &payload.to_string();
            }
        }
        Ok(contents)
    }
    /// Replace the contents of an existing file.  Binary data is given as hex.
    pub fn write(&mut self,name: &str,data: &str,is_binary: bool) -> Result<(),Error> {
        info!("Writing to file: {} {}",name,data);
        let mut entry = self.find_file(name)?;
        let files = record::chunk(data,is_binary,self.geometry().payload_len())?;
        self.release_chain(&mut entry,false)?;
        let found = self.find_free_blocks(files.len())?;
        if found.len() < files.len() {
            warn!("need {} blocks, found {}",files.len(),found.len());
            return Err(Error::DiskFull);
        }
        entry.record.link = found[0];
        entry.save(self.img.as_mut())?;
        for (i,mut rec) in files.into_iter().enumerate() {
            rec.link = match i+1 < found.len() {
                true => found[i+1],
                false => Tsb::ZERO
            };
            FileHandle::new(found[i],rec).save(self.img.as_mut())?;
        }
        Ok(())
    }
    /// Delete the file and release all its blocks
    pub fn delete(&mut self,name: &str) -> Result<(),Error> {
        info!("Deleting file: {}",name);
        if name==self.mbr_name {
            return Err(Error::Reserved);
        }
        let mut entry = self.find_file(name)?;
        self.release_chain(&mut entry,true)
    }
    /// Names of all files in directory order
    pub fn list(&self) -> Result<Vec<String>,Error> {
        let mut ans: Vec<String> = Vec::new();
        for item in self.directory_walker() {
            let (_addr,dat) = item?;
            let rec = BlockRecord::from_bytes(&dat)?;
            if let Some(payload) = rec.payload() {
                ans.push(payload.to_string());
            }
        }
        Ok(ans)
    }
    /// Fill every block, then write the master boot record
    pub fn format(&mut self) -> Result<(),Error> {
        info!("Formatting hard drive...");
        let geometry = self.geometry();
        let fill = vec![FORMAT_FILL;geometry.block_size()];
        for addr in Cursor::whole_device(geometry) {
            self.img.write_block(addr,&fill)?;
        }
        let mbr = FileHandle::new(Tsb::ZERO,BlockRecord::single_text(&self.mbr_name,geometry.payload_len())?);
        mbr.save(self.img.as_mut())?;
        Ok(())
    }
    /// Create if needed and write binary data
    pub fn swap_write(&mut self,name: &str,data: &str) -> Result<(),Error> {
        self.create(name,true)?;
        self.write(name,data,true)
    }
    pub fn swap_read(&self,name: &str) -> Result<String,Error> {
        self.read(name)
    }
    pub fn swap_delete(&mut self,name: &str) -> Result<(),Error> {
        self.delete(name)
    }
    /// Hex of every block arranged as [track][sector][block], for displays
    pub fn contents(&self) -> Result<Vec<Vec<Vec<String>>>,img::Error> {
        let geometry = self.geometry();
        let mut ans = Vec::new();
        for t in 0..geometry.tracks() {
            let mut track = Vec::new();
            for s in 0..geometry.sectors() {
                let mut sector = Vec::new();
                for b in 0..geometry.blocks() {
                    sector.push(self.img.read_hex(Tsb::new(t,s,b))?);
                }
                track.push(sector);
            }
            ans.push(track);
        }
        Ok(ans)
    }
    fn dispatch(&mut self,req: &Request,sink: &mut dyn OutputSink) -> Result<(),Error> {
        let name = req.filename.as_deref().unwrap_or("");
        let data = req.data.as_deref().unwrap_or("");
        match req.command {
            Command::Create => {
                self.create(name,false)?;
                sink.put_message("File created.");
            },
            Command::Read => {
                let contents = self.read(name)?;
                sink.put_message(&contents);
            },
            Command::Write => {
                self.write(name,data,false)?;
                sink.put_message("File written.");
            },
            Command::Delete => {
                self.delete(name)?;
                sink.put_message("File deleted.");
            },
            Command::List => {
                let names = self.list()?;
                sink.advance_line();
                for fname in names {
                    sink.put_text(&format!(" {}",fname));
                    sink.advance_line();
                }
            },
            Command::Format => {
                self.format()?;
                sink.put_message("Format successful.");
            },
            Command::SwapWrite => self.swap_write(name,data)?,
            Command::SwapRead => {
                self.swap_buffer = Some(self.swap_read(name)?);
            },
            Command::SwapDelete => self.swap_delete(name)?
        }
        Ok(())
    }
    /// Service a parsed request.  Regular commands report errors to the sink,
    /// swap commands only log them.  The update hook runs afterwards either way.
    pub fn service(&mut self,req: &Request,sink: &mut dyn OutputSink) {
        if let Err(e) = self.dispatch(req,sink) {
            if req.command.is_swap() {
                warn!("Swap file error: {}",e);
            } else {
                debug!("{} failed: {}",req.command,e);
                sink.put_message(&e.to_string());
            }
        }
        if let Some(hook) = self.update_hook.as_mut() {
            hook(self.img.as_ref());
        }
    }
    /// Interrupt service routine.  An unknown command is a protocol error that is
    /// returned to the kernel rather than reported to the sink.
    pub fn isr(&mut self,command: &str,filename: Option<&str>,data: Option<&str>,sink: &mut dyn OutputSink) -> Result<(),CommandError> {
        let req = match Request::parse(command,filename,data) {
            Ok(r) => r,
            Err(e) => {
                error!("{} ({})",e,command);
                return Err(e);
            }
        };
        self.service(&req,sink);
        Ok(())
    }
}

/// File names are nonempty text that fits one directory block with its terminator
fn validate_name(name: &str,payload_len: usize) -> Result<(),Error> {
    if name.len()==0 {
        return Err(Error::BadName(name.to_string()));
    }
    match BlockRecord::single_text(name,payload_len) {
        Ok(_) => Ok(()),
        Err(e) => {
            debug!("file name rejected: {}",e);
            Err(Error::BadName(name.to_string()))
        }
    }
}
