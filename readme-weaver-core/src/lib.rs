#![doc = "readme-weaver-core: core logic library for readme-weaver."]

//! This crate holds the whole README pipeline: ignore rules, content extraction,
//! the file and directory summarisers, the conversational README synthesizer,
//! the repository walk and the operator-driven revision loop.
//! Talking to a concrete model is left to implementors of [`contract::Backend`].
//!
//! # Usage
//! Build a [`config::GenerateConfig`], pick a backend and a [`operator::Console`],
//! then call [`pipeline::generate_readme`].

pub mod config;
pub mod contract;
pub mod download;
pub mod extract;
pub mod ignore;
pub mod operator;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod retry;
pub mod summarize;
pub mod synthesize;
pub mod traverse;
pub mod versions;
