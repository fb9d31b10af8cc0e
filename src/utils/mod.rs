pub mod img_stuffs;
pub mod misc;
