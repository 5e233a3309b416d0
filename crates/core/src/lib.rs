pub mod audio;
pub mod fluency;
pub mod pipeline;
pub mod rubric;
pub mod scoring;
pub mod shared;
