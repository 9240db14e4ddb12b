mod fixture_scratch;

pub use fixture_scratch::*;
