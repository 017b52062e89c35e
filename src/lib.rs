//! Reader for DEWESoft DXD/DXZ recordings.
//!
//! Channel metadata comes from the setup document embedded in the file when
//! there is one, and is otherwise inferred from header bytes. Samples are
//! decoded per channel into `(time, values)` in engineering units.
//!
//! ```no_run
//! use dxd_reader::parser::DxdParser;
//!
//! let mut parser = DxdParser::open("run_01.dxd")?;
//! for name in parser.get_channel_names() {
//!     let (time, values) = parser.get_channel_data(&name)?;
//!     println!("{}: {} samples over {:.3} s", name, values.len(), time.last().unwrap_or(&0.0));
//! }
//! # Ok::<(), dxd_reader::parser::DxdError>(())
//! ```

pub mod parser;

pub use parser::{
    detect_dxd_format, is_dxd_file, load_dxd_files, ChannelData, ChannelDescriptor, DxdError,
    DxdParser, FormatReport, LoaderConfig,
};
