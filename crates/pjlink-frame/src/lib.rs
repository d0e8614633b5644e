//! PJLink class 1 command/response line framing.
//!
//! Every request and response is a single carriage-return terminated line:
//! - Request: `%1` + 4-byte body + space + parameter + `\r`
//! - Response: `%1` + 4-byte body + `=` + parameter + `\r`
//!
//! Parameters are at most 128 bytes. A response parameter of `ERR1`..`ERR4`
//! is a device-side error and is surfaced as [`DeviceError`] rather than
//! as payload.

pub mod body;
pub mod codec;
pub mod device;
pub mod error;
pub mod exchange;
pub mod reader;
pub mod writer;

pub use body::{
    body_name, Body, AVMT, CLSS, ERST, INF1, INF2, INFO, INPT, INST, LAMP, NAME, POWR,
};
pub use codec::{
    encode_command, Command, Response, HEADER_SIZE, MAX_PARAM_LEN, QUERY, TERMINATOR,
};
pub use device::DeviceError;
pub use error::{FrameError, Result};
pub use exchange::{send_command, Reply};
pub use reader::{decode_response, read_until, read_up_to};
pub use writer::{write_all_flush, write_command};
