pub mod api;
pub mod assembler;
pub mod config;
pub mod data_models;
pub mod errors;
pub mod fetcher;
pub mod orchestrator;
pub mod scrapper;
pub mod validator;
pub mod xml_tools;
