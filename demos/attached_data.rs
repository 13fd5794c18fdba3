//! Attached data - ad hoc key/value state on an object.
//!
//! This example demonstrates:
//! - Embedding an `AttachedData` store in a host object
//! - Typed reads with and without defaults
//! - Deleting entries, including the error on a missing key
//!
//! Run with:
//!
//! ```sh
//! cargo run --example attached_data
//! ```

use taskscope::AttachedData;

struct Connection {
    peer: String,
    data: AttachedData,
}

impl Connection {
    fn new(peer: &str) -> Self {
        Self {
            peer: peer.to_string(),
            data: AttachedData::new(),
        }
    }
}

fn main() {
    let mut conn = Connection::new("10.0.0.7:4222");

    conn.data.set("attempts", 1u32);
    conn.data.set("greeting", String::from("hello"));

    println!("peer {} carries {:?}", conn.peer, conn.data);
    println!("attempts: {:?}", conn.data.get::<u32>("attempts"));
    println!("timeout_ms (defaulted): {}", conn.data.get_or("timeout_ms", &500u64));

    conn.data.delete("greeting").expect("greeting was just set");
    match conn.data.delete("greeting") {
        Ok(()) => unreachable!(),
        Err(e) => println!("second delete: {e}"),
    }

    println!("remaining entries: {}", conn.data.len());
}
