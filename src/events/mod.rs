//! # Events Module
//!
//! Progress published by the scanner while it walks and hashes.
//!
//! A scan emits `ScanEvent::Started`, walk progress, `Discovered`, then one
//! hashing pass per media kind (`PassStarted`, per-file `Progress`,
//! `BatchFlushed` after each transaction, `PassCompleted`) and finally
//! `ScanEvent::Completed` with the folder's figures. Nobody has to listen;
//! a scanner built without [`EventSender`] publishes into the void.
//!
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//! let listener = std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Hash(HashEvent::Progress(p)) = event {
//!             eprintln!("{} {}/{}", p.kind, p.completed, p.total);
//!         }
//!     }
//! });
//!
//! Scanner::new(&store, ScanConfig::default())
//!     .with_events(sender)
//!     .scan(Path::new("/photos"))?;
//! listener.join().ok();
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
