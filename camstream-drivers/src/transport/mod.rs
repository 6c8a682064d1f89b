//! Transport implementations

pub mod io;

pub use io::IoTransport;
