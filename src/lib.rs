pub mod enrichment;
pub mod identity;
pub mod logging;
pub mod lookup;
pub mod name;
pub mod payments;
pub mod pipeline;
pub mod publications;
pub mod registry;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_DB: &str = "db_query";
