//! Behaviour suites for the scripted handler and its bootstrap.

mod concurrent_dispatch;
mod support;
