pub mod au;
pub mod pcm;
