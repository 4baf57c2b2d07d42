//! Conversion of NDJSON resource files into FHIR batch Bundles.
//!
//! ```no_run
//! use octofhir_loader::{BundleSize, open_ndjson};
//!
//! # fn main() -> octofhir_loader::Result<()> {
//! let mut file = open_ndjson("Patient.ndjson".as_ref(), BundleSize::new(100)?)?;
//! for bundle in file.resources() {
//!     let bundle = bundle?;
//!     println!("{} resources", bundle.resource_count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bulk_data_file;
pub mod bundle;
pub mod bundle_size;
pub mod config;
pub mod error;
pub mod source;

pub use bulk_data_file::{BulkDataFile, ResourceBundles};
pub use bundle::{
    BUNDLE_RESOURCE_TYPE, BatchBundle, BundleEntry, BundleRequest, HttpVerb, ProcessedResource,
    build_bundle, request_for,
};
pub use bundle_size::BundleSize;
pub use config::LoaderConfig;
pub use error::{ErrorCategory, LoaderError, Result};
pub use source::{bundle_file_name, discover_ndjson_files, is_ndjson, open_ndjson, source_name};
