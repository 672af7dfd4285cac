pub mod azimuth;
pub mod corrections;
pub mod correlation;
pub mod input;
pub mod profile;
pub mod selection;
pub mod serialization;
pub mod store;
pub mod summary;

mod traits;

pub use corrections::{CorrectionKind, CorrectionNode, CorrectionProjector, ProjectionDirection};
pub use input::{
    DEFAULT_INPUT_PATTERN, InputFileError, discover_alignment_inputs, load_alignment_results,
};
pub use profile::{OutputMode, ProfileBuilder, run_profile_pipeline};
pub use selection::{RangeWindow, SelectionWindow, StationSelector};
pub use store::{JsonProfileStore, load_profile_batch};
pub use summary::render_profile_summary;
pub use traits::ProfileStore;
