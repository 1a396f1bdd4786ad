pub mod measurement;
pub mod plate;
pub mod profile;
pub mod result;
pub mod weight;

pub use measurement::NewMeasurement;
pub use plate::{NewPlate, Plate};
pub use profile::{NewProfile, Profile};
pub use result::{InferenceResult, Nutrition, Prediction};
pub use weight::{WeightSample, WeightSource};
