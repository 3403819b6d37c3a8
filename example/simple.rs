use skipdb::logger::new_logger;
use skipdb::{Options, SkipList};
use slog::Level;
use std::fs;

const STORE_FILE: &str = "store/dumpFile";

fn main() {
    let list: SkipList<i32, String> = {
        let mut opt = Options::with_max_level(6);
        opt.info_log = Some(new_logger(std::io::stdout(), Level::Debug));
        SkipList::new(opt)
    };

    for (k, v) in [(1, "a"), (3, "b"), (7, "c"), (8, "d"), (9, "e"), (19, "f")] {
        list.insert(k, v.to_string()).unwrap();
    }
    assert!(list.insert(19, "g".to_string()).is_err());
    println!("skiplist size: {}", list.len());
    print!("{}", list);

    fs::create_dir_all("store").unwrap();
    list.dump_file(STORE_FILE).unwrap();

    for k in [9, 18] {
        match list.get(&k) {
            Ok(v) => println!("Found key: {}, value: {}", k, v),
            Err(e) => println!("key {}: {}", k, e),
        }
    }

    list.delete(&3).unwrap();
    list.delete(&7).unwrap();
    assert!(list.delete(&7).is_err());
    println!("skiplist size: {}", list.len());
    print!("{}", list);

    let restored: SkipList<i32, String> = SkipList::new(Options::with_max_level(6));
    let n = restored.load_file(STORE_FILE).unwrap();
    println!("restored {} records from {}", n, STORE_FILE);
    print!("{}", restored);
}
