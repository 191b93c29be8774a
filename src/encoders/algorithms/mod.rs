pub mod errors;
pub mod radix;

pub use errors::{CodecError, DecodeError};
pub use radix::{DecodeOptions, EncodeOptions, RadixCodec};
