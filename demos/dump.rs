use arib_si::{Demux, Section};
use std::env;
use std::fs::File;

fn main() {
    pretty_env_logger::init();
    let args = env::args();
    if args.len() < 2 {
        panic!("No file argument");
    }
    let file_path = args.skip(1).next().unwrap();

    let file = File::open(file_path).expect("unable to open!");
    let mut demux = Demux::default();
    demux
        .run(file, |section| match section {
            Section::Pat(pat) => println!("{:x?}", pat),
            Section::Pmt(pmt) => println!("{:x?}", pmt),
            Section::Eit(eit) => println!("{:x?}", eit),
        })
        .expect("parse error");
}
