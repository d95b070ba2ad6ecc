// test of the interrupt service routine and what it reports
use std::rc::Rc;
use std::cell::Cell;
use simhdd::commands::{CommandError,Transcript};
use simhdd::img::{Geometry,BlockDevice};
use simhdd::fs::driver::Driver;

#[test]
fn messages() {
    let mut disk = simhdd::boot().expect("boot failed");
    let mut out = Transcript::new();
    disk.isr("create",Some("a.txt"),None,&mut out).expect("isr failed");
    disk.isr("create",Some("a.txt"),None,&mut out).expect("isr failed");
    disk.isr("read",Some("a.txt"),None,&mut out).expect("isr failed");
    disk.isr("write",Some("a.txt"),Some("hello"),&mut out).expect("isr failed");
    disk.isr("read",Some("a.txt"),None,&mut out).expect("isr failed");
    disk.isr("delete",Some("MBR"),None,&mut out).expect("isr failed");
    disk.isr("delete",Some("a.txt"),None,&mut out).expect("isr failed");
    disk.isr("format",None,None,&mut out).expect("isr failed");
    assert_eq!(out.lines(),&vec![
        "File created.".to_string(),
        "Error: File already exists.".to_string(),
        "File contains nothing.".to_string(),
        "File written.".to_string(),
        "hello".to_string(),
        "Cannot delete MBR.".to_string(),
        "File deleted.".to_string(),
        "Format successful.".to_string()
    ]);
}

#[test]
fn listing() {
    let mut disk = simhdd::boot().expect("boot failed");
    let mut out = Transcript::new();
    disk.isr("list",None,None,&mut out).expect("isr failed");
    assert_eq!(out.lines(),&vec![String::new()]);
    out.clear();
    disk.isr("create",Some("a.txt"),None,&mut out).expect("isr failed");
    disk.isr("create",Some("b.txt"),None,&mut out).expect("isr failed");
    out.clear();
    disk.isr("list",None,None,&mut out).expect("isr failed");
    assert_eq!(out.lines(),&vec![String::new()," a.txt".to_string()," b.txt".to_string()]);
}

#[test]
fn missing_file_name() {
    let mut disk = simhdd::boot().expect("boot failed");
    let mut out = Transcript::new();
    disk.isr("create",None,None,&mut out).expect("isr failed");
    assert_eq!(out.lines().len(),1);
    assert!(out.lines()[0].starts_with("Invalid file name"));
    assert!(disk.list().expect("list failed").is_empty());
}

#[test]
fn directory_full_message() {
    let geometry = Geometry::new(2,1,2,64).expect("bad geometry");
    let mut disk = Driver::boot(geometry).expect("boot failed");
    let mut out = Transcript::new();
    disk.isr("create",Some("a"),None,&mut out).expect("isr failed");
    disk.isr("create",Some("b"),None,&mut out).expect("isr failed");
    assert_eq!(out.lines()[1],"Cannot create file; directory full.");
    disk.isr("write",Some("a"),Some(&"x".repeat(200)),&mut out).expect("isr failed");
    assert_eq!(out.lines()[2],"Not enough free space for contents.");
}

#[test]
fn swap_errors_are_quiet() {
    let mut disk = simhdd::boot().expect("boot failed");
    let mut out = Transcript::new();
    disk.isr("swap-read",Some("nothing"),None,&mut out).expect("isr failed");
    disk.isr("swap-delete",Some("nothing"),None,&mut out).expect("isr failed");
    disk.isr("swap-write",Some(".swap0"),Some("XYZ"),&mut out).expect("isr failed");
    assert!(out.lines().is_empty());
    assert_eq!(out.text(),"");
    assert_eq!(disk.swap_buffer(),None);
}

#[test]
fn swap_read_fills_buffer() {
    let mut disk = simhdd::boot().expect("boot failed");
    let mut out = Transcript::new();
    disk.isr("swap-write",Some(".swap0"),Some("00A9FF"),&mut out).expect("isr failed");
    disk.isr("swap-write",Some(".swap0"),Some("0102"),&mut out).expect("isr failed");
    disk.isr("swap-read",Some(".swap0"),None,&mut out).expect("isr failed");
    assert!(out.lines().is_empty());
    let buf = disk.take_swap_buffer().expect("no swap data");
    assert_eq!(buf.len(),120);
    assert!(buf.starts_with("0102"));
    assert_eq!(disk.swap_buffer(),None);
    disk.isr("swap-delete",Some(".swap0"),None,&mut out).expect("isr failed");
    assert!(disk.list().expect("list failed").is_empty());
}

#[test]
fn unknown_command_is_trapped() {
    let mut disk = simhdd::boot().expect("boot failed");
    let count = Rc::new(Cell::new(0));
    let counter = count.clone();
    disk.set_update_hook(Box::new(move |_dev: &dyn BlockDevice| counter.set(counter.get()+1)));
    let mut out = Transcript::new();
    assert_eq!(disk.isr("frobnicate",Some("a"),None,&mut out),Err(CommandError::InvalidCommand));
    assert_eq!(CommandError::InvalidCommand.to_string(),"Invalid HDD Driver command.");
    assert!(out.lines().is_empty());
    assert_eq!(count.get(),0);
}

#[test]
fn update_hook_sees_every_interrupt() {
    let mut disk = simhdd::boot().expect("boot failed");
    let count = Rc::new(Cell::new(0));
    let last_mbr = Rc::new(Cell::new(0u8));
    let counter = count.clone();
    let mbr = last_mbr.clone();
    disk.set_update_hook(Box::new(move |dev: &dyn BlockDevice| {
        counter.set(counter.get()+1);
        let dat = dev.read_block(simhdd::fs::Tsb::ZERO).expect("read failed");
        mbr.set(dat[0]);
    }));
    let mut out = Transcript::new();
    disk.isr("create",Some("a"),None,&mut out).expect("isr failed");
    disk.isr("read",Some("missing"),None,&mut out).expect("isr failed");
    disk.isr("swap-read",Some("missing"),None,&mut out).expect("isr failed");
    disk.isr("format",None,None,&mut out).expect("isr failed");
    assert_eq!(count.get(),4);
    assert_eq!(last_mbr.get(),1);
}

#[test]
fn format_leaves_empty_listing() {
    let mut disk = simhdd::boot().expect("boot failed");
    let mut out = Transcript::new();
    disk.isr("create",Some("a.txt"),None,&mut out).expect("isr failed");
    disk.isr("write",Some("a.txt"),Some("some words"),&mut out).expect("isr failed");
    disk.isr("format",None,None,&mut out).expect("isr failed");
    assert_eq!(out.lines().last().unwrap(),"Format successful.");
    out.clear();
    disk.isr("list",None,None,&mut out).expect("isr failed");
    assert_eq!(out.lines(),&vec![String::new()]);
    assert_eq!(out.text(),"");
}
