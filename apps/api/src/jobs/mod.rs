// Job resource: CRUD plus the public /search proxy to the external
// job-search API. All search traffic goes through the gateway in
// crate::search; handlers never call the provider directly.

pub mod handlers;
