//! Docex Document Normalizer
//!
//! Decodes a raw document payload, enforces the size limit, and produces a
//! page-segmented representation plus classification signals.
//!
//! # Supported types
//!
//! - **pdf**: per-page text via lopdf; embedded JPEG page images when present
//! - **docx**: per-section text via zip + quick-xml; embedded media images
//! - **png / jpg**: a single page, quality rated by resolution and contrast
//!
//! # Example
//!
//! ```
//! use docex_domain::DocumentPayload;
//! use docex_normalizer::{Normalizer, PayloadError};
//!
//! let normalizer = Normalizer::default();
//! let err = normalizer
//!     .normalize(&DocumentPayload::Bytes(vec![1, 2, 3]), "tiff")
//!     .unwrap_err();
//! assert!(matches!(err, PayloadError::UnsupportedType(_)));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod decode;
pub mod docx;
pub mod error;
pub mod normalizer;
pub mod pdf;
pub mod raster;
pub mod types;

pub use config::NormalizerConfig;
pub use error::{PayloadError, Result};
pub use normalizer::Normalizer;
pub use types::{NormalizedDocument, Page, PageImage};
