// test of block record encoding and chunking
use simhdd::fs::{Tsb,Error};
use simhdd::fs::record::{self,BlockRecord,Payload,Status};

const PAYLOAD_LEN: usize = 60;

fn join_payloads(recs: &Vec<BlockRecord>) -> String {
    let mut ans = String::new();
    for rec in recs {
        if let Some(p) = rec.payload() {
            ans += &p.to_string();
        }
    }
    ans
}

#[test]
fn text_layout() {
    let rec = BlockRecord::single_text("hello",PAYLOAD_LEN).expect("chunk failed");
    let hex_str = rec.to_hex();
    assert_eq!(hex_str.len(),128);
    assert_eq!(&hex_str[0..8],"01000000");
    assert_eq!(&hex_str[8..20],"68656C6C6F00");
    assert!(hex_str[20..].chars().all(|c| c=='0'));
}

#[test]
fn link_layout() {
    let mut rec = BlockRecord::single_text("x",PAYLOAD_LEN).expect("chunk failed");
    rec.link = Tsb::new(3,7,7);
    assert_eq!(&rec.to_hex()[0..8],"01030707");
    let back = BlockRecord::from_hex(&rec.to_hex()).expect("decode failed");
    assert_eq!(back.link,Tsb::new(3,7,7));
    assert!(back.is_linked());
}

#[test]
fn round_trip() {
    let mut recs = record::chunk("some text that is long enough to need more than one block of storage",false,PAYLOAD_LEN).expect("chunk failed");
    recs.append(&mut record::chunk("00FFAB10",true,PAYLOAD_LEN).expect("chunk failed"));
    recs[0].link = Tsb::new(1,2,3);
    for rec in recs {
        let back = BlockRecord::from_bytes(&rec.to_bytes()).expect("decode failed");
        assert_eq!(back.status,rec.status);
        assert_eq!(back.link,rec.link);
        assert_eq!(back.payload(),rec.payload());
        let from_hex = BlockRecord::from_hex(&rec.to_hex()).expect("decode failed");
        assert_eq!(from_hex,rec);
    }
}

#[test]
fn lower_case_and_whitespace_accepted() {
    let rec = BlockRecord::from_hex("01 000000 6869 00").expect("decode failed");
    assert_eq!(rec.payload(),Some(Payload::Text("hi".to_string())));
    let rec = BlockRecord::from_hex("02000000abcd").expect("decode failed");
    assert_eq!(rec.payload(),Some(Payload::Binary(vec![0xab,0xcd])));
}

#[test]
fn malformed_blocks() {
    assert!(matches!(BlockRecord::from_hex(""),Err(Error::FileFormat(_))));
    assert!(matches!(BlockRecord::from_hex("0100000"),Err(Error::FileFormat(_))));
    assert!(matches!(BlockRecord::from_hex("0100000G00"),Err(Error::FileFormat(_))));
    assert!(matches!(BlockRecord::from_hex("05000000AA"),Err(Error::FileFormat(_))));
    assert!(matches!(BlockRecord::from_bytes(&[1,0,0,0]),Err(Error::FileFormat(_))));
}

#[test]
fn available_has_no_payload() {
    let mut rec = BlockRecord::single_text("gone",PAYLOAD_LEN).expect("chunk failed");
    rec.release();
    assert_eq!(rec.status,Status::Available);
    assert_eq!(rec.payload(),None);
    // release keeps the bytes
    assert_eq!(&rec.raw_payload()[0..4],"gone".as_bytes());
}

#[test]
fn text_chunking_is_complete() {
    let mut long = String::new();
    for i in 0..40 {
        long += &format!("line {} of the file\n",i);
    }
    let recs = record::chunk(&long,false,PAYLOAD_LEN).expect("chunk failed");
    assert_eq!(recs.len(),(long.len()+1+PAYLOAD_LEN-1)/PAYLOAD_LEN);
    assert!(recs.iter().all(|r| r.status==Status::Text && r.len()==64));
    assert_eq!(join_payloads(&recs),long);
}

#[test]
fn text_chunking_keeps_characters_whole() {
    let txt = "\u{00e9}t\u{00e9} \u{1F600}".repeat(20);
    let recs = record::chunk(&txt,false,PAYLOAD_LEN).expect("chunk failed");
    for rec in &recs {
        assert!(std::str::from_utf8(rec.raw_payload()).is_ok());
    }
    assert_eq!(join_payloads(&recs),txt);
}

#[test]
fn terminator_spills_into_new_block() {
    let txt = "a".repeat(PAYLOAD_LEN);
    let recs = record::chunk(&txt,false,PAYLOAD_LEN).expect("chunk failed");
    assert_eq!(recs.len(),2);
    assert_eq!(recs[1].payload(),Some(Payload::Text(String::new())));
    assert_eq!(join_payloads(&recs),txt);
}

#[test]
fn empty_data_still_needs_a_block() {
    let recs = record::chunk("",false,PAYLOAD_LEN).expect("chunk failed");
    assert_eq!(recs.len(),1);
    assert_eq!(recs[0].payload(),Some(Payload::Text(String::new())));
    let recs = record::chunk("",true,PAYLOAD_LEN).expect("chunk failed");
    assert_eq!(recs.len(),1);
    assert_eq!(recs[0].status,Status::Binary);
}

#[test]
fn text_with_null_refused() {
    assert!(matches!(record::chunk("a\0b",false,PAYLOAD_LEN),Err(Error::FileFormat(_))));
}

#[test]
fn binary_chunking_is_complete() {
    let dat: Vec<u8> = (0..150).map(|x| x as u8).collect();
    let recs = record::chunk(&hex::encode(&dat),true,PAYLOAD_LEN).expect("chunk failed");
    assert_eq!(recs.len(),3);
    let mut joined: Vec<u8> = Vec::new();
    for rec in &recs {
        assert_eq!(rec.status,Status::Binary);
        joined.extend_from_slice(rec.raw_payload());
    }
    let mut expected = dat.clone();
    expected.resize(3*PAYLOAD_LEN,0);
    assert_eq!(joined,expected);
    assert_eq!(join_payloads(&recs),hex::encode_upper(&expected));
}

#[test]
fn odd_binary_refused() {
    assert!(matches!(record::chunk("ABC",true,PAYLOAD_LEN),Err(Error::FileFormat(_))));
    assert!(matches!(record::chunk("XY",true,PAYLOAD_LEN),Err(Error::FileFormat(_))));
}

#[test]
fn name_too_long() {
    assert!(BlockRecord::single_text(&"n".repeat(PAYLOAD_LEN-1),PAYLOAD_LEN).is_ok());
    assert!(BlockRecord::single_text(&"n".repeat(PAYLOAD_LEN),PAYLOAD_LEN).is_err());
}
