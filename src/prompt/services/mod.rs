//! Application services for the prompt catalogue.

mod catalog;

pub use catalog::{
    CreatePromptRequest, PromptCatalogError, PromptCatalogResult, PromptCatalogService,
    UpdatePromptRequest,
};
