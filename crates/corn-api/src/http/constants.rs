//! Shared HTTP constants (headers, problem URIs, content types).

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

pub(crate) const CONTENT_TYPE_ZIP: &str = "application/zip";
pub(crate) const CONTENT_TYPE_PROMETHEUS: &str = "text/plain; version=0.0.4";
pub(crate) const ARCHIVE_DISPOSITION: &str = "attachment; filename=\"corn.zip\"";

pub(crate) const PROBLEM_INTERNAL: &str = "/problems/internal";
pub(crate) const PROBLEM_BAD_REQUEST: &str = "/problems/bad-request";
pub(crate) const PROBLEM_GENERATION_FAILED: &str = "/problems/generation-failed";
pub(crate) const PROBLEM_ARCHIVE_FAILED: &str = "/problems/archive-failed";
