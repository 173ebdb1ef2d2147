// Career matching: profile → embedding → similarity search → per-role
// skill gaps, learning suggestions and progression → summarized response.
// All embedding and index traffic goes through the gateway and index traits.

pub mod advisor;
pub mod handlers;
pub mod learning;
pub mod profile;
pub mod progression;
pub mod skill_gap;
