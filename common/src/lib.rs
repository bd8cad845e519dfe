pub mod bit_buffer2;
pub mod buffer2;
pub mod parallel;
