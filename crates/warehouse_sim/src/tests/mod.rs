//! Cross-module scenarios driven through the public simulation API

mod support;
