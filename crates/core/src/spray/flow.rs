//! Flow telemetry ingest
//!
//! The sprayer reports its flow rate and dispensed volume as separate named
//! floats. Each sample overwrites the matching field; the other keeps its
//! last known value. Readings are never reset.

use super::codec::FlowSample;

/// Last known flow telemetry
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlowReading {
    /// Flow rate (l/min)
    pub flowrate: f32,
    /// Dispensed volume
    pub volume: f32,
}

/// Holds the latest flow reading
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowIngest {
    reading: FlowReading,
    samples: u32,
}

impl FlowIngest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one sample and return the updated reading to be logged.
    pub fn apply(&mut self, sample: FlowSample) -> FlowReading {
        match sample {
            FlowSample::Rate(rate) => self.reading.flowrate = rate,
            FlowSample::Volume(volume) => self.reading.volume = volume,
        }
        self.samples = self.samples.wrapping_add(1);
        self.reading
    }

    pub fn reading(&self) -> FlowReading {
        self.reading
    }

    /// Number of samples applied so far
    pub fn samples(&self) -> u32 {
        self.samples
    }
}
