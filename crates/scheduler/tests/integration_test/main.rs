/// Integration tests for the scheduler covering lifecycle and heartbeat
/// behavior, the capacity/similarity scenarios, and snapshot persistence.

mod helpers;
mod lifecycle;
mod persistence;
mod scenarios;
