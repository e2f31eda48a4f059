//! API request and response data models.
//!
//! These structures define the public JSON contract of the gallery. The
//! stored [`ImageRecord`](crate::store::ImageRecord) is serialized as-is;
//! everything else here is a thin envelope around it.

pub mod images;
