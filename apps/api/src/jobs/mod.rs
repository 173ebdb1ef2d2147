// Job catalog: the relational store of job roles and its HTTP endpoints.
// Creating or re-indexing a role also writes its vector to the similarity index.

pub mod handlers;
pub mod store;
