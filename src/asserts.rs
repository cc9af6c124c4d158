//! Compile-time checks on the public types.

use static_assertions::assert_impl_all;

use crate::{CompilationRequest, Config, Error, NanopbOutput, PbOutput, PlatformProfile};

// Results cross thread boundaries in callers that fan out over schemas.
assert_impl_all!(NanopbOutput: Send, Sync, Clone);
assert_impl_all!(PbOutput: Send, Sync, Clone);
assert_impl_all!(CompilationRequest: Send, Sync, Clone);
assert_impl_all!(Config: Send, Sync, Clone);
assert_impl_all!(PlatformProfile: Send, Sync);
assert_impl_all!(Error: Send, Sync, std::error::Error);
