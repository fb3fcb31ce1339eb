use crate::codec::pcm::Sample;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DetectionEvent {
    Key(char),
}

pub trait Detector {
    fn advance(&mut self, sample: Sample) -> Option<DetectionEvent>;
}

pub mod goertzel;
pub mod dtmf;
