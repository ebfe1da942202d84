//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services are stateless: the snapshot and id sequence they work on are
//! passed in by the controller.

mod mutation;

pub use mutation::MutationService;
