//! Library side of the `markview` binary, split out so the transforms can be tested
//! without spawning the executable.

pub mod transforms;
