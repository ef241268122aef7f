//! Integration tests spanning the world, orchestrator and built-in systems
