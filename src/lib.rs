//! Noor library: Quran content, reader state and AI prompt flows.

use clap::ValueEnum;

pub mod core;
pub mod flows;
pub mod inference;
pub mod quran;
pub mod store;

#[cfg(test)]
pub mod test_support;

/// Which completion provider to use. `Configured` defers to config and env.
#[derive(Clone, Debug, Default, ValueEnum)]
pub enum Provider {
    #[default]
    Configured,
    #[value(name = "openrouter")]
    OpenRouter,
    #[value(name = "lmstudio")]
    LmStudio,
}
