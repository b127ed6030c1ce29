//! Setting families of the MS3 barcode reader, grouped like the chapters of
//! the user manual.

mod host;
mod read_cycle;
mod scanner;
mod symbology;

pub use host::*;
pub use read_cycle::*;
pub use scanner::*;
pub use symbology::*;
