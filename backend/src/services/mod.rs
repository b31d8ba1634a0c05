pub mod assessment;
pub mod jobs;
pub mod location;
pub mod prediction;
pub mod sources;

pub use assessment::{AreaAssessor, AssessmentOptions, AssessmentRequest, SoilAssessmentService};
pub use jobs::{InMemoryJobStore, JobManager, JobStore};
pub use location::{GeocodeMatch, Geocoder, LocationResolver};
pub use prediction::{ModelPrediction, ModelResponse, NutrientModel, PredictionEngine};
pub use sources::{SiteConditions, SoilBaselineSource, VegetationIndexSource, WeatherSource};
