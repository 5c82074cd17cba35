//! Backend integration tests using only the public emitter API
