mod limit;
mod sensor_sample;

pub use limit::LimitRepository;
pub use sensor_sample::{SampleFilter, SensorSampleRepository};
