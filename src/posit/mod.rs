pub mod convert;
pub mod core;
pub mod decode;
pub mod encode;
pub mod environment;
pub mod fused;
pub mod value;

pub use self::{
    convert::{to_posit, to_real},
    core::{DecodedPosit, ExactValue, UnpackedPosit},
    decode::decode,
    encode::{encode, encode_fields},
    environment::{EnvironmentRegistry, PositEnvironment, STANDARD_EXPONENT_SIZE},
    fused::{fused_dot, fused_sum},
    value::Posit,
};
