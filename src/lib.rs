pub mod cms;
pub mod discovery;
pub mod environment;
pub mod filter;
pub mod logging;
pub mod pagination;
pub mod query;
pub mod story;

pub const TARGET_CMS_REQUEST: &str = "cms_request";
pub const TARGET_FILTER: &str = "filter";
pub const TARGET_DISCOVERY: &str = "discovery";

/// Locale the engine falls back to when a requested locale has no content.
pub const DEFAULT_LOCALE: &str = "en";

/// Attribution shown when the content store omits an author or category name.
pub const PUBLICATION_NAME: &str = "Kahani";
